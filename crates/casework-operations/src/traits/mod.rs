mod audit_recorder;
mod escalation_gateway;
mod event_publisher;

pub use audit_recorder::AuditRecorder;
pub use escalation_gateway::EscalationGateway;
pub use event_publisher::EventPublisher;
