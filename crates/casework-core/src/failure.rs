use std::fmt;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Failure types with fixed classification rules.
pub mod failure_types {
    pub const ERRO_SISTEMA: &str = "ERRO_SISTEMA";
    pub const INTEGRACAO_FALHOU: &str = "INTEGRACAO_FALHOU";
    pub const VALIDACAO_DOCUMENTO: &str = "VALIDACAO_DOCUMENTO";
    pub const PAGAMENTO_FALHOU: &str = "PAGAMENTO_FALHOU";
    pub const DADOS_INVALIDOS: &str = "DADOS_INVALIDOS";
    pub const TIMEOUT: &str = "TIMEOUT";
    pub const SERVICO_INDISPONIVEL: &str = "SERVICO_INDISPONIVEL";
    pub const FRAUDE_DETECTADA: &str = "FRAUDE_DETECTADA";
    pub const CADASTRO_DUPLICADO: &str = "CADASTRO_DUPLICADO";
}

#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default, Serialize, Deserialize,
)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Severity {
    #[default]
    Baixa,
    Media,
    Alta,
    Critica,
}

impl Severity {
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Baixa => "BAIXA",
            Self::Media => "MEDIA",
            Self::Alta => "ALTA",
            Self::Critica => "CRITICA",
        }
    }

    /// `ALTA` and `CRITICA` always reach the escalation gateway.
    #[must_use]
    pub fn demands_escalation(self) -> bool {
        matches!(self, Self::Alta | Self::Critica)
    }
}

impl fmt::Display for Severity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Category {
    Tecnica,
    Negocio,
    Integracao,
    #[default]
    Desconhecida,
}

impl Category {
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Tecnica => "TECNICA",
            Self::Negocio => "NEGOCIO",
            Self::Integracao => "INTEGRACAO",
            Self::Desconhecida => "DESCONHECIDA",
        }
    }
}

impl fmt::Display for Category {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Strategy {
    Retry,
    RotaAlternativa,
    Compensacao,
    EscalacaoSuporte,
    ManualIntervention,
}

impl Strategy {
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Retry => "RETRY",
            Self::RotaAlternativa => "ROTA_ALTERNATIVA",
            Self::Compensacao => "COMPENSACAO",
            Self::EscalacaoSuporte => "ESCALACAO_SUPORTE",
            Self::ManualIntervention => "MANUAL_INTERVENTION",
        }
    }

    #[must_use]
    pub fn implies_compensation(self) -> bool {
        self == Self::Compensacao
    }
}

impl fmt::Display for Strategy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Derived classification of one failure occurrence.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Classification {
    pub severity: Severity,
    pub category: Category,
    pub recoverable: bool,
    pub strategy: Strategy,
}

impl Classification {
    #[must_use]
    pub fn requires_escalation(&self) -> bool {
        self.severity.demands_escalation() || !self.recoverable
    }
}

/// Immutable record of a classified failure.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FailureRecord {
    pub failure_id: String,
    pub case_id: String,
    pub failure_type: String,
    pub stage: String,
    pub error_message: String,
    pub occurred_at: DateTime<Utc>,
    #[serde(flatten)]
    pub classification: Classification,
}
