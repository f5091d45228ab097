use std::collections::HashSet;
use std::ops::Deref;
use std::sync::Arc;

use casework_core::{ActionMetadata, ActionRecord, ActionType};
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::error::SagaError;

/// Append-only record of the actions a workflow instance has applied.
///
/// The ledger has a single writer during forward execution. Once execution
/// stops it is consumed by [`ActionLedger::snapshot`]; there is no way to
/// remove or rewrite a record.
#[derive(Debug, Default)]
pub struct ActionLedger {
    records: Vec<ActionRecord>,
}

impl ActionLedger {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Record a completed business step. The sequence index is assigned from
    /// the append position.
    pub fn append(&mut self, action_type: ActionType, metadata: ActionMetadata) -> &ActionRecord {
        let sequence_index = self.records.len() as u64;
        debug!(%action_type, sequence_index, "appending action to ledger");
        self.records.push(ActionRecord {
            action_type,
            sequence_index,
            metadata,
        });
        &self.records[self.records.len() - 1]
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.records.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// Seal the ledger into an immutable, ordered view.
    #[must_use]
    pub fn snapshot(self) -> LedgerSnapshot {
        LedgerSnapshot {
            records: self.records.into(),
        }
    }
}

/// Immutable, validated view of a ledger in append order.
///
/// Snapshots built from external input (for example a serialized ledger) are
/// checked so that sequence indices are unique and strictly increasing.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "Vec<ActionRecord>", into = "Vec<ActionRecord>")]
pub struct LedgerSnapshot {
    records: Arc<[ActionRecord]>,
}

impl LedgerSnapshot {
    #[must_use]
    pub fn empty() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn records(&self) -> &[ActionRecord] {
        &self.records
    }
}

impl Deref for LedgerSnapshot {
    type Target = [ActionRecord];

    fn deref(&self) -> &Self::Target {
        &self.records
    }
}

impl TryFrom<Vec<ActionRecord>> for LedgerSnapshot {
    type Error = SagaError;

    fn try_from(records: Vec<ActionRecord>) -> Result<Self, Self::Error> {
        let mut seen = HashSet::with_capacity(records.len());
        let mut previous: Option<u64> = None;

        for record in &records {
            let index = record.sequence_index;
            if !seen.insert(index) {
                return Err(SagaError::DuplicateSequenceIndex { index });
            }
            if let Some(previous) = previous {
                if index < previous {
                    return Err(SagaError::OutOfOrderSequenceIndex { previous, index });
                }
            }
            previous = Some(index);
        }

        Ok(Self {
            records: records.into(),
        })
    }
}

impl From<LedgerSnapshot> for Vec<ActionRecord> {
    fn from(snapshot: LedgerSnapshot) -> Self {
        snapshot.records.to_vec()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn record(action: &str, index: u64) -> ActionRecord {
        ActionRecord {
            action_type: ActionType::from(action),
            sequence_index: index,
            metadata: ActionMetadata::new(),
        }
    }

    #[test]
    fn append_assigns_consecutive_indices() {
        let mut ledger = ActionLedger::new();

        let first = ledger
            .append(ActionType::AutorizacaoCriada, ActionMetadata::new())
            .sequence_index;
        let second = ledger
            .append(ActionType::PagamentoReservado, ActionMetadata::new())
            .sequence_index;

        assert_eq!(first, 0);
        assert_eq!(second, 1);
        assert_eq!(ledger.len(), 2);
    }

    #[test]
    fn snapshot_preserves_append_order() {
        let mut ledger = ActionLedger::new();
        ledger.append(ActionType::AutorizacaoCriada, ActionMetadata::new());
        ledger.append(ActionType::PagamentoReservado, ActionMetadata::new());

        let snapshot = ledger.snapshot();

        let types: Vec<_> = snapshot.iter().map(|r| r.action_type.as_str()).collect();
        assert_eq!(types, ["AUTORIZACAO_CRIADA", "PAGAMENTO_RESERVADO"]);
    }

    #[test]
    fn new_ledger_is_empty() {
        let ledger = ActionLedger::new();

        assert!(ledger.is_empty());
        assert!(ledger.snapshot().is_empty());
    }

    #[test]
    fn duplicate_indices_are_rejected() {
        let result = LedgerSnapshot::try_from(vec![record("A", 0), record("B", 0)]);

        assert!(matches!(
            result,
            Err(SagaError::DuplicateSequenceIndex { index: 0 })
        ));
    }

    #[test]
    fn descending_indices_are_rejected() {
        let result = LedgerSnapshot::try_from(vec![record("A", 5), record("B", 2)]);

        assert!(matches!(
            result,
            Err(SagaError::OutOfOrderSequenceIndex {
                previous: 5,
                index: 2
            })
        ));
    }

    #[test]
    fn gaps_between_indices_are_allowed() -> anyhow::Result<()> {
        let snapshot = LedgerSnapshot::try_from(vec![record("A", 1), record("B", 7)])?;

        assert_eq!(snapshot.len(), 2);
        Ok(())
    }

    #[test]
    fn deserializing_malformed_ledger_fails() {
        let json = r#"[
            {"actionType": "AUTORIZACAO_CRIADA", "sequenceIndex": 0},
            {"actionType": "PAGAMENTO_RESERVADO", "sequenceIndex": 0}
        ]"#;

        let result: Result<LedgerSnapshot, _> = serde_json::from_str(json);

        let err = result.expect_err("duplicate index should fail");
        assert!(err.to_string().contains("more than once"));
    }

    #[test]
    fn serialized_snapshot_is_a_plain_array() -> anyhow::Result<()> {
        let mut ledger = ActionLedger::new();
        ledger.append(ActionType::CarePlanCriado, ActionMetadata::new());

        let value = serde_json::to_value(ledger.snapshot())?;

        assert!(value.is_array());
        assert_eq!(value[0]["actionType"], "CARE_PLAN_CRIADO");
        Ok(())
    }
}
