mod audit_recorder;
mod escalation_gateway;
mod event_publisher;
mod handlers;
mod json_lines;

pub use audit_recorder::FileSystemAuditRecorder;
pub use escalation_gateway::JsonLinesEscalationGateway;
pub use event_publisher::JsonLinesEventPublisher;
pub use handlers::{OutboxCompensationHandler, standard_registry};
