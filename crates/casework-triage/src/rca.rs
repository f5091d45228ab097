use casework_core::{
    CorrectiveAction, CorrectiveActionKind, CorrectiveActionStatus, FailureRecord, Impact,
    RcaCategory, RcaRecord, RcaStatus, Severity,
};
use chrono::{DateTime, TimeDelta, Utc};

use crate::classifier::normalize_failure_type;

const ROOT_CAUSE_RULES: [(&str, &[&str]); 3] = [
    (
        "SLA",
        &["Falta de automação no processo", "Recursos insuficientes"],
    ),
    (
        "ERRO",
        &[
            "Falta de validação de dados",
            "Tratamento inadequado de exceções",
        ],
    ),
    (
        "INTEGRACAO",
        &["Timeout em API externa", "Falta de mecanismo de retry"],
    ),
];

const UNKNOWN_ROOT_CAUSE: &str = "Causa a ser investigada";

// First bucket with a matching keyword wins.
const RCA_CATEGORY_KEYWORDS: [(RcaCategory, &[&str]); 4] = [
    (RcaCategory::Tecnologia, &["SISTEMA", "TECNICO"]),
    (RcaCategory::Processo, &["PROCESSO", "FLUXO"]),
    (RcaCategory::Pessoas, &["TREINAMENTO", "CONHECIMENTO"]),
    (RcaCategory::Integracao, &["INTEGRACAO", "INTERFACE"]),
];

/// Days until an open RCA is reviewed.
pub const REVIEW_WINDOW_DAYS: i64 = 30;

#[must_use]
pub fn rca_category(failure_type: &str) -> RcaCategory {
    let failure_type = normalize_failure_type(failure_type);
    RCA_CATEGORY_KEYWORDS
        .iter()
        .find(|(_, keywords)| keywords.iter().any(|k| failure_type.contains(*k)))
        .map_or(RcaCategory::Outros, |(category, _)| *category)
}

/// Standing measures that keep the category's failures from recurring.
/// Integration and uncategorized failures have none.
#[must_use]
pub fn preventive_measures(category: RcaCategory) -> Vec<String> {
    let measures: &[&str] = match category {
        RcaCategory::Tecnologia => &[
            "Implementar monitoramento proativo",
            "Adicionar testes automatizados",
        ],
        RcaCategory::Processo => &[
            "Revisar e documentar processo",
            "Implementar controles preventivos",
        ],
        RcaCategory::Pessoas => &["Treinamento e capacitação", "Atualizar documentação"],
        RcaCategory::Integracao | RcaCategory::Outros => &[],
    };
    measures.iter().map(ToString::to_string).collect()
}

/// Candidate root causes for a failure type, by keyword.
#[must_use]
pub fn root_causes(failure_type: &str) -> Vec<String> {
    let failure_type = normalize_failure_type(failure_type);
    ROOT_CAUSE_RULES
        .iter()
        .find(|(keyword, _)| failure_type.contains(*keyword))
        .map_or_else(
            || vec![UNKNOWN_ROOT_CAUSE.to_string()],
            |(_, causes)| causes.iter().map(ToString::to_string).collect(),
        )
}

#[must_use]
pub fn corrective_actions(causes: &[String], priority: Severity) -> Vec<CorrectiveAction> {
    causes
        .iter()
        .map(|cause| CorrectiveAction {
            cause: cause.clone(),
            description: format!("Implementar correção para: {cause}"),
            kind: CorrectiveActionKind::Corretiva,
            priority,
            status: CorrectiveActionStatus::Pendente,
        })
        .collect()
}

/// Time allowed to implement corrective actions.
#[must_use]
pub fn implementation_window(severity: Severity) -> TimeDelta {
    match severity {
        Severity::Critica => TimeDelta::days(7),
        Severity::Alta => TimeDelta::days(15),
        Severity::Media => TimeDelta::days(30),
        Severity::Baixa => TimeDelta::days(60),
    }
}

/// Assemble the RCA artifact for a classified failure.
///
/// Causes supplied by the caller replace the keyword-derived ones; an empty
/// list falls back to [`root_causes`].
#[must_use]
pub fn build_rca(
    rca_id: impl Into<String>,
    failure_record: FailureRecord,
    impact: Option<Impact>,
    supplied_causes: Vec<String>,
    now: DateTime<Utc>,
) -> RcaRecord {
    let root_causes = if supplied_causes.is_empty() {
        root_causes(&failure_record.failure_type)
    } else {
        supplied_causes
    };
    let severity = failure_record.classification.severity;
    let category = rca_category(&failure_record.failure_type);
    let corrective_actions = corrective_actions(&root_causes, severity);
    let actions_total = corrective_actions.len();

    RcaRecord {
        rca_id: rca_id.into(),
        failure_record,
        impact: impact.unwrap_or_default(),
        category,
        root_causes,
        five_whys: Vec::new(),
        corrective_actions,
        preventive_measures: preventive_measures(category),
        implementation_deadline: now + implementation_window(severity),
        review_date: now + TimeDelta::days(REVIEW_WINDOW_DAYS),
        status: RcaStatus::Aberta,
        actions_implemented: 0,
        actions_total,
        registered_at: now,
    }
}
