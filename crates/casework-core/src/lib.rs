pub mod action;
pub mod error;
pub mod failure;
pub mod rca;
pub mod state;

pub use action::*;
pub use error::*;
pub use failure::*;
pub use rca::*;
pub use state::*;
