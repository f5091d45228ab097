use std::convert::Infallible;
use std::fmt;
use std::hash::{Hash, Hasher};
use std::str::FromStr;

use indexmap::IndexMap;
use serde::{Deserialize, Deserializer, Serialize, Serializer};

/// Correlation identifiers needed to reverse an applied action.
pub type ActionMetadata = IndexMap<String, String>;

/// Tag prefix recorded when a registered handler fails to reverse an action.
pub const FAILED_COMPENSATION_PREFIX: &str = "FALHA_COMPENSACAO_";

/// Tag prefix recorded when no handler is registered for an action type.
pub const NOT_COMPENSATED_PREFIX: &str = "NAO_COMPENSADO_";

/// Business action applied by a workflow instance.
///
/// Known variants carry their reversal tag and the metadata key holding the
/// identifier the external system needs to undo them. Anything else is kept
/// verbatim in [`ActionType::Other`].
///
/// Equality and hashing go through the wire name, so an `Other` that spells a
/// known action is the same action as its named variant.
#[derive(Debug, Clone)]
pub enum ActionType {
    AutorizacaoCriada,
    BeneficiarioAtualizado,
    NotificacaoEnviada,
    PagamentoReservado,
    CarePlanCriado,
    DadosExternosSalvos,
    Other(String),
}

impl ActionType {
    #[must_use]
    pub fn standard() -> [Self; 6] {
        [
            Self::AutorizacaoCriada,
            Self::BeneficiarioAtualizado,
            Self::NotificacaoEnviada,
            Self::PagamentoReservado,
            Self::CarePlanCriado,
            Self::DadosExternosSalvos,
        ]
    }

    #[must_use]
    pub fn as_str(&self) -> &str {
        match self {
            Self::AutorizacaoCriada => "AUTORIZACAO_CRIADA",
            Self::BeneficiarioAtualizado => "BENEFICIARIO_ATUALIZADO",
            Self::NotificacaoEnviada => "NOTIFICACAO_ENVIADA",
            Self::PagamentoReservado => "PAGAMENTO_RESERVADO",
            Self::CarePlanCriado => "CARE_PLAN_CRIADO",
            Self::DadosExternosSalvos => "DADOS_EXTERNOS_SALVOS",
            Self::Other(name) => name,
        }
    }

    /// The named variant when an `Other` spells a known action.
    #[must_use]
    pub fn canonical(&self) -> Self {
        match self {
            Self::Other(name) => Self::from(name.as_str()),
            known => known.clone(),
        }
    }

    /// Tag recorded once the action has been successfully reversed.
    #[must_use]
    pub fn reversed_tag(&self) -> Option<&'static str> {
        match self.canonical() {
            Self::AutorizacaoCriada => Some("AUTORIZACAO_CANCELADA"),
            Self::BeneficiarioAtualizado => Some("BENEFICIARIO_REVERTIDO"),
            Self::NotificacaoEnviada => Some("NOTIFICACAO_CANCELADA"),
            Self::PagamentoReservado => Some("PAGAMENTO_LIBERADO"),
            Self::CarePlanCriado => Some("CARE_PLAN_REMOVIDO"),
            Self::DadosExternosSalvos => Some("DADOS_EXTERNOS_REMOVIDOS"),
            Self::Other(_) => None,
        }
    }

    /// Metadata key carrying the identifier of the applied effect.
    #[must_use]
    pub fn correlation_key(&self) -> Option<&'static str> {
        match self.canonical() {
            Self::AutorizacaoCriada => Some("numeroAutorizacao"),
            Self::BeneficiarioAtualizado => Some("beneficiarioId"),
            Self::NotificacaoEnviada => Some("notificacaoId"),
            Self::PagamentoReservado => Some("pagamentoId"),
            Self::CarePlanCriado => Some("carePlanId"),
            Self::DadosExternosSalvos | Self::Other(_) => None,
        }
    }

    #[must_use]
    pub fn failed_compensation_tag(&self) -> String {
        format!("{FAILED_COMPENSATION_PREFIX}{}", self.as_str())
    }

    #[must_use]
    pub fn not_compensated_tag(&self) -> String {
        format!("{NOT_COMPENSATED_PREFIX}{}", self.as_str())
    }
}

impl From<&str> for ActionType {
    fn from(value: &str) -> Self {
        match value {
            "AUTORIZACAO_CRIADA" => Self::AutorizacaoCriada,
            "BENEFICIARIO_ATUALIZADO" => Self::BeneficiarioAtualizado,
            "NOTIFICACAO_ENVIADA" => Self::NotificacaoEnviada,
            "PAGAMENTO_RESERVADO" => Self::PagamentoReservado,
            "CARE_PLAN_CRIADO" => Self::CarePlanCriado,
            "DADOS_EXTERNOS_SALVOS" => Self::DadosExternosSalvos,
            other => Self::Other(other.to_string()),
        }
    }
}

impl PartialEq for ActionType {
    fn eq(&self, other: &Self) -> bool {
        self.as_str() == other.as_str()
    }
}

impl Eq for ActionType {}

impl Hash for ActionType {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.as_str().hash(state);
    }
}

impl FromStr for ActionType {
    type Err = Infallible;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Ok(Self::from(s))
    }
}

impl fmt::Display for ActionType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl Serialize for ActionType {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(self.as_str())
    }
}

impl<'de> Deserialize<'de> for ActionType {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let raw = String::deserialize(deserializer)?;
        Ok(Self::from(raw.as_str()))
    }
}

/// One applied business action, appended once and never mutated.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ActionRecord {
    pub action_type: ActionType,
    pub sequence_index: u64,
    #[serde(default)]
    pub metadata: ActionMetadata,
}
