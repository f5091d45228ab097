use casework_core::{ActionRecord, ActionType};
use chrono::{DateTime, Utc};
use serde::Serialize;

use crate::handler::HandlerError;

/// Result of visiting one ledger record during compensation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
#[non_exhaustive]
pub enum StepStatus {
    /// The handler reversed the action.
    Compensated,
    /// The handler failed, panicked or timed out.
    Failed,
    /// No handler is registered for the action type.
    Unhandled,
}

/// Audit entry for one visited ledger record.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CompensationStep {
    pub sequence_index: u64,
    pub action_type: ActionType,
    pub status: StepStatus,
    /// Tag appended to the outcome for this record.
    pub tag: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
    pub started_at: DateTime<Utc>,
    pub completed_at: DateTime<Utc>,
}

/// Audit log of a compensation walk, in visiting (reverse append) order.
#[derive(Debug, Default)]
pub struct CompensationAuditLog {
    steps: Vec<CompensationStep>,
}

impl CompensationAuditLog {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    pub(crate) fn record_compensated(
        &mut self,
        record: &ActionRecord,
        tag: &str,
        started_at: DateTime<Utc>,
    ) {
        self.push(record, StepStatus::Compensated, tag.to_string(), None, started_at);
    }

    pub(crate) fn record_failed(
        &mut self,
        record: &ActionRecord,
        error: &HandlerError,
        started_at: DateTime<Utc>,
    ) {
        self.push(
            record,
            StepStatus::Failed,
            record.action_type.failed_compensation_tag(),
            Some(error.to_string()),
            started_at,
        );
    }

    pub(crate) fn record_unhandled(&mut self, record: &ActionRecord, started_at: DateTime<Utc>) {
        self.push(
            record,
            StepStatus::Unhandled,
            record.action_type.not_compensated_tag(),
            None,
            started_at,
        );
    }

    fn push(
        &mut self,
        record: &ActionRecord,
        status: StepStatus,
        tag: String,
        error: Option<String>,
        started_at: DateTime<Utc>,
    ) {
        self.steps.push(CompensationStep {
            sequence_index: record.sequence_index,
            action_type: record.action_type.clone(),
            status,
            tag,
            error,
            started_at,
            completed_at: Utc::now(),
        });
    }

    #[must_use]
    pub fn steps(&self) -> &[CompensationStep] {
        &self.steps
    }

    pub(crate) fn into_steps(self) -> Vec<CompensationStep> {
        self.steps
    }
}

/// One line per visited record.
pub(crate) fn summarize(steps: &[CompensationStep]) -> String {
    steps
        .iter()
        .map(|step| {
            let marker = match step.status {
                StepStatus::Compensated => "↩",
                StepStatus::Failed => "⚠",
                StepStatus::Unhandled => "?",
            };
            format!("{marker} #{} {} -> {}", step.sequence_index, step.action_type, step.tag)
        })
        .collect::<Vec<_>>()
        .join("\n")
}
