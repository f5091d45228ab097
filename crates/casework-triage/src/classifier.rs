use casework_core::failure_types::{
    CADASTRO_DUPLICADO, DADOS_INVALIDOS, ERRO_SISTEMA, FRAUDE_DETECTADA, INTEGRACAO_FALHOU,
    PAGAMENTO_FALHOU, SERVICO_INDISPONIVEL, TIMEOUT, VALIDACAO_DOCUMENTO,
};
use casework_core::{Category, Classification, Severity};

use crate::strategy::select_strategy;

const SEVERITY_RULES: [(Severity, &[&str]); 3] = [
    (Severity::Critica, &[ERRO_SISTEMA, INTEGRACAO_FALHOU]),
    (Severity::Alta, &[VALIDACAO_DOCUMENTO, PAGAMENTO_FALHOU]),
    (Severity::Media, &[DADOS_INVALIDOS, TIMEOUT]),
];

// First bucket with a matching keyword wins.
const CATEGORY_KEYWORDS: [(Category, &[&str]); 3] = [
    (Category::Tecnica, &["SISTEMA", "TECNICO"]),
    (Category::Negocio, &["VALIDACAO", "DADOS"]),
    (Category::Integracao, &["INTEGRACAO", "API"]),
];

const NEVER_RECOVERABLE: [&str; 2] = [FRAUDE_DETECTADA, CADASTRO_DUPLICADO];

pub(crate) const TRANSIENT: [&str; 2] = [TIMEOUT, SERVICO_INDISPONIVEL];

/// Canonical spelling used by every rule: trimmed, ASCII upper case.
#[must_use]
pub fn normalize_failure_type(failure_type: &str) -> String {
    failure_type.trim().to_ascii_uppercase()
}

/// Severity depends on the failure type alone; `stage` is accepted so callers
/// pass the full failure context, but no stage currently changes the result.
#[must_use]
pub fn severity(failure_type: &str, stage: &str) -> Severity {
    let _ = stage;
    let failure_type = normalize_failure_type(failure_type);
    SEVERITY_RULES
        .iter()
        .find(|(_, types)| types.contains(&failure_type.as_str()))
        .map_or(Severity::Baixa, |(severity, _)| *severity)
}

#[must_use]
pub fn category(failure_type: &str) -> Category {
    let failure_type = normalize_failure_type(failure_type);
    CATEGORY_KEYWORDS
        .iter()
        .find(|(_, keywords)| keywords.iter().any(|k| failure_type.contains(*k)))
        .map_or(Category::Desconhecida, |(category, _)| *category)
}

/// Deny-list first, then allow-list, then "anything short of critical".
#[must_use]
pub fn is_recoverable(failure_type: &str, severity: Severity) -> bool {
    let failure_type = normalize_failure_type(failure_type);
    if NEVER_RECOVERABLE.contains(&failure_type.as_str()) {
        return false;
    }
    if TRANSIENT.contains(&failure_type.as_str()) {
        return true;
    }
    severity != Severity::Critica
}

#[must_use]
pub fn classify(failure_type: &str, stage: &str) -> Classification {
    let severity = severity(failure_type, stage);
    let category = category(failure_type);
    let recoverable = is_recoverable(failure_type, severity);
    let strategy = select_strategy(failure_type, severity, category, recoverable);
    Classification {
        severity,
        category,
        recoverable,
        strategy,
    }
}

#[cfg(test)]
mod tests {
    use casework_core::Strategy;

    use super::*;

    const STAGES: [&str; 4] = ["", "CADASTRO", "VALIDACAO_DOCUMENTOS", "ATIVACAO"];
    const ALL_SEVERITIES: [Severity; 4] = [
        Severity::Baixa,
        Severity::Media,
        Severity::Alta,
        Severity::Critica,
    ];

    #[test]
    fn system_error_is_critical_for_every_stage() {
        for stage in STAGES {
            assert_eq!(severity("ERRO_SISTEMA", stage), Severity::Critica);
        }
    }

    #[test]
    fn severity_table() {
        assert_eq!(severity("INTEGRACAO_FALHOU", ""), Severity::Critica);
        assert_eq!(severity("VALIDACAO_DOCUMENTO", ""), Severity::Alta);
        assert_eq!(severity("PAGAMENTO_FALHOU", ""), Severity::Alta);
        assert_eq!(severity("DADOS_INVALIDOS", ""), Severity::Media);
        assert_eq!(severity("TIMEOUT", ""), Severity::Media);
        assert_eq!(severity("SERVICO_INDISPONIVEL", ""), Severity::Baixa);
    }

    #[test]
    fn unknown_and_empty_types_default_to_lowest_risk() {
        assert_eq!(severity("SOMETHING_ODD", "X"), Severity::Baixa);
        assert_eq!(severity("", ""), Severity::Baixa);
        assert_eq!(category(""), Category::Desconhecida);
        assert_eq!(category("SOMETHING_ODD"), Category::Desconhecida);
    }

    #[test]
    fn input_is_normalized_before_matching() {
        assert_eq!(severity("  erro_sistema ", ""), Severity::Critica);
        assert_eq!(category("falha_api_parceiro"), Category::Integracao);
    }

    #[test]
    fn category_keywords() {
        assert_eq!(category("ERRO_SISTEMA"), Category::Tecnica);
        assert_eq!(category("PROBLEMA_TECNICO"), Category::Tecnica);
        assert_eq!(category("VALIDACAO_DOCUMENTO"), Category::Negocio);
        assert_eq!(category("DADOS_INVALIDOS"), Category::Negocio);
        assert_eq!(category("INTEGRACAO_FALHOU"), Category::Integracao);
        assert_eq!(category("API_GATEWAY_ERRO"), Category::Integracao);
    }

    #[test]
    fn first_matching_bucket_wins() {
        assert_eq!(category("INTEGRACAO_SISTEMA"), Category::Tecnica);
        assert_eq!(category("API_DADOS"), Category::Negocio);
    }

    #[test]
    fn timeout_is_recoverable_for_every_severity() {
        for severity in ALL_SEVERITIES {
            assert!(is_recoverable("TIMEOUT", severity));
            assert!(is_recoverable("SERVICO_INDISPONIVEL", severity));
        }
    }

    #[test]
    fn deny_list_is_never_recoverable() {
        for severity in ALL_SEVERITIES {
            assert!(!is_recoverable("FRAUDE_DETECTADA", severity));
            assert!(!is_recoverable("CADASTRO_DUPLICADO", severity));
        }
    }

    #[test]
    fn other_types_are_recoverable_unless_critical() {
        assert!(is_recoverable("PAGAMENTO_FALHOU", Severity::Alta));
        assert!(!is_recoverable("ERRO_SISTEMA", Severity::Critica));
        assert!(!is_recoverable("ANYTHING", Severity::Critica));
    }

    #[test]
    fn classify_timeout() {
        let classification = classify("TIMEOUT", "ATIVACAO");

        assert_eq!(classification.severity, Severity::Media);
        assert!(classification.recoverable);
        assert_eq!(classification.strategy, Strategy::Retry);
    }

    #[test]
    fn classify_fraud() {
        let classification = classify("FRAUDE_DETECTADA", "CADASTRO");

        assert!(!classification.recoverable);
        assert_eq!(classification.strategy, Strategy::ManualIntervention);
        assert!(classification.requires_escalation());
    }

    #[test]
    fn classification_is_deterministic() {
        for failure_type in ["TIMEOUT", "ERRO_SISTEMA", "X", "", "API_FALHOU"] {
            assert_eq!(classify(failure_type, "S"), classify(failure_type, "S"));
        }
    }
}
