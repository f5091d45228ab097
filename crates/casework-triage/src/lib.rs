//! Pure classification rules for case failures.
//!
//! Every function here is total: unknown or empty failure types resolve to
//! the lowest-risk classification instead of an error, and no function holds
//! state, so they can be called from any number of instances at once.

mod classifier;
mod rca;
mod strategy;

pub use classifier::{category, classify, is_recoverable, normalize_failure_type, severity};
pub use rca::{
    REVIEW_WINDOW_DAYS, build_rca, corrective_actions, implementation_window, preventive_measures,
    rca_category, root_causes,
};
pub use strategy::select_strategy;
