use casework_core::{FAILED_COMPENSATION_PREFIX, NOT_COMPENSATED_PREFIX};
use serde::Serialize;

use crate::audit::{CompensationStep, summarize};

/// Result of one compensation run.
///
/// `compensation_complete` is derived from the recorded tags and cannot be
/// set independently: it is true exactly when no tag marks a failed or
/// unhandled reversal.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RecoveryOutcome {
    compensated_actions: Vec<String>,
    compensation_complete: bool,
    steps: Vec<CompensationStep>,
}

impl RecoveryOutcome {
    pub(crate) fn from_steps(steps: Vec<CompensationStep>) -> Self {
        let compensated_actions: Vec<String> = steps.iter().map(|s| s.tag.clone()).collect();
        let compensation_complete = compensated_actions.iter().all(|tag| is_reversal_tag(tag));
        Self {
            compensated_actions,
            compensation_complete,
            steps,
        }
    }

    #[must_use]
    pub fn compensated_actions(&self) -> &[String] {
        &self.compensated_actions
    }

    #[must_use]
    pub fn compensation_complete(&self) -> bool {
        self.compensation_complete
    }

    #[must_use]
    pub fn steps(&self) -> &[CompensationStep] {
        &self.steps
    }

    #[must_use]
    pub fn summary(&self) -> String {
        summarize(&self.steps)
    }
}

fn is_reversal_tag(tag: &str) -> bool {
    !tag.starts_with(FAILED_COMPENSATION_PREFIX) && !tag.starts_with(NOT_COMPENSATED_PREFIX)
}
