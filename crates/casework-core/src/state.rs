use std::fmt;

use serde::{Deserialize, Serialize};

use crate::error::{CoreError, Result};
use crate::failure::Strategy;

/// Lifecycle of a single failure occurrence.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum RecoveryState {
    New,
    Classified,
    StrategySelected,
    RetryScheduled,
    Compensating,
    Compensated,
    PartiallyCompensated,
    RotaAlternativaAcionada,
    Escalated,
    AwaitingManual,
    Closed,
}

impl RecoveryState {
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::New => "NEW",
            Self::Classified => "CLASSIFIED",
            Self::StrategySelected => "STRATEGY_SELECTED",
            Self::RetryScheduled => "RETRY_SCHEDULED",
            Self::Compensating => "COMPENSATING",
            Self::Compensated => "COMPENSATED",
            Self::PartiallyCompensated => "PARTIALLY_COMPENSATED",
            Self::RotaAlternativaAcionada => "ROTA_ALTERNATIVA_ACIONADA",
            Self::Escalated => "ESCALATED",
            Self::AwaitingManual => "AWAITING_MANUAL",
            Self::Closed => "CLOSED",
        }
    }

    /// State entered once `strategy` has been selected.
    #[must_use]
    pub fn entered_by(strategy: Strategy) -> Self {
        match strategy {
            Strategy::Retry => Self::RetryScheduled,
            Strategy::Compensacao => Self::Compensating,
            Strategy::RotaAlternativa => Self::RotaAlternativaAcionada,
            Strategy::EscalacaoSuporte => Self::Escalated,
            Strategy::ManualIntervention => Self::AwaitingManual,
        }
    }

    #[must_use]
    pub fn allowed_transitions(self) -> &'static [RecoveryState] {
        use RecoveryState::{
            AwaitingManual, Classified, Closed, Compensated, Compensating, Escalated, New,
            PartiallyCompensated, RetryScheduled, RotaAlternativaAcionada, StrategySelected,
        };
        match self {
            New => &[Classified],
            Classified => &[StrategySelected],
            StrategySelected => &[
                RetryScheduled,
                Compensating,
                RotaAlternativaAcionada,
                Escalated,
                AwaitingManual,
            ],
            Compensating => &[Compensated, PartiallyCompensated],
            RetryScheduled | Compensated | PartiallyCompensated | RotaAlternativaAcionada
            | Escalated | AwaitingManual => &[Closed],
            Closed => &[],
        }
    }

    #[must_use]
    pub fn can_transition_to(self, to: Self) -> bool {
        self.allowed_transitions().contains(&to)
    }
}

impl fmt::Display for RecoveryState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Ordered history of the states a failure occurrence passed through.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StateTrail {
    states: Vec<RecoveryState>,
}

impl Default for StateTrail {
    fn default() -> Self {
        Self::new()
    }
}

impl StateTrail {
    #[must_use]
    pub fn new() -> Self {
        Self {
            states: vec![RecoveryState::New],
        }
    }

    #[must_use]
    pub fn current(&self) -> RecoveryState {
        self.states
            .last()
            .copied()
            .unwrap_or(RecoveryState::New)
    }

    /// # Errors
    ///
    /// Returns `CoreError::IllegalTransition` if `to` is not reachable from
    /// the current state.
    pub fn advance(&mut self, to: RecoveryState) -> Result<()> {
        let from = self.current();
        if !from.can_transition_to(to) {
            return Err(CoreError::IllegalTransition { from, to });
        }
        self.states.push(to);
        Ok(())
    }

    #[must_use]
    pub fn states(&self) -> &[RecoveryState] {
        &self.states
    }

    #[must_use]
    pub fn is_closed(&self) -> bool {
        self.current() == RecoveryState::Closed
    }
}
