use casework_core::failure_types::VALIDACAO_DOCUMENTO;
use casework_core::{Category, Severity, Strategy};

use crate::classifier::{TRANSIENT, normalize_failure_type};

/// Ordered decision list; the first matching rule wins.
///
/// `severity` takes part in the classification that produced `recoverable`
/// but no rule below inspects it directly.
#[must_use]
pub fn select_strategy(
    failure_type: &str,
    severity: Severity,
    category: Category,
    recoverable: bool,
) -> Strategy {
    let _ = severity;
    let failure_type = normalize_failure_type(failure_type);

    if !recoverable {
        return Strategy::ManualIntervention;
    }
    if TRANSIENT.contains(&failure_type.as_str()) {
        return Strategy::Retry;
    }
    if failure_type == VALIDACAO_DOCUMENTO {
        return Strategy::RotaAlternativa;
    }
    if category == Category::Integracao {
        return Strategy::Compensacao;
    }
    Strategy::EscalacaoSuporte
}
