use crate::document::Document;
use crate::error::DomainError;

/// Edits a domain description before it is handed back to the orchestrator.
pub trait DomainTransform: Send + Sync {
    fn apply(&self, doc: &mut Document) -> Result<(), DomainError>;
}

/// Leaves the domain description untouched.
#[derive(Debug, Default, Clone, Copy)]
pub struct Identity;

impl DomainTransform for Identity {
    fn apply(&self, doc: &mut Document) -> Result<(), DomainError> {
        tracing::debug!(root = doc.name(), "leaving domain description unchanged");
        Ok(())
    }
}
