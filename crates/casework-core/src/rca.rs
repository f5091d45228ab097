use std::fmt;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::failure::{FailureRecord, Severity};

#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Impact {
    #[serde(default)]
    pub affected_beneficiaries: u32,
    #[serde(default)]
    pub affected_processes: u32,
    #[serde(default)]
    pub estimated_cost: f64,
}

/// Progress of a corrective action. Transitions after creation belong to the
/// external tracking system.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum CorrectiveActionStatus {
    #[default]
    Pendente,
    EmAndamento,
    Concluida,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum CorrectiveActionKind {
    #[default]
    Corretiva,
    Preventiva,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CorrectiveAction {
    pub cause: String,
    pub description: String,
    #[serde(rename = "type")]
    pub kind: CorrectiveActionKind,
    /// Severity of the failure the action addresses.
    pub priority: Severity,
    pub status: CorrectiveActionStatus,
}

/// Area an RCA is filed under, derived from the failure type.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum RcaCategory {
    Tecnologia,
    Processo,
    Pessoas,
    Integracao,
    #[default]
    Outros,
}

impl RcaCategory {
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Tecnologia => "TECNOLOGIA",
            Self::Processo => "PROCESSO",
            Self::Pessoas => "PESSOAS",
            Self::Integracao => "INTEGRACAO",
            Self::Outros => "OUTROS",
        }
    }
}

impl fmt::Display for RcaCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum RcaStatus {
    #[default]
    Aberta,
    EmAndamento,
    Encerrada,
}

/// Root-cause analysis artifact, append-only once recorded.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RcaRecord {
    pub rca_id: String,
    pub failure_record: FailureRecord,
    pub impact: Impact,
    pub category: RcaCategory,
    pub root_causes: Vec<String>,
    /// Optional "five whys" chain supplied by the analyst.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub five_whys: Vec<String>,
    pub corrective_actions: Vec<CorrectiveAction>,
    pub preventive_measures: Vec<String>,
    pub implementation_deadline: DateTime<Utc>,
    pub review_date: DateTime<Utc>,
    pub status: RcaStatus,
    pub actions_implemented: usize,
    pub actions_total: usize,
    pub registered_at: DateTime<Utc>,
}
