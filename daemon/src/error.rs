use permhook_domain::DomainError;
use permhook_enforcer::EnforcerError;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum HookError {
    #[error("failed to unmarshal given machine spec: {0}")]
    MalformedMachineSpec(#[from] serde_json::Error),

    #[error("failed to unmarshal given domain spec: {0}")]
    MalformedDomain(#[source] DomainError),

    #[error("failed to transform domain spec: {0}")]
    Transform(#[source] DomainError),

    #[error("disk permission pass failed: {0}")]
    Permissions(#[from] EnforcerError),

    #[error("disk permission task failed: {0}")]
    Task(#[from] tokio::task::JoinError),
}

impl From<HookError> for tonic::Status {
    fn from(err: HookError) -> Self {
        match err {
            HookError::MalformedMachineSpec(_) | HookError::MalformedDomain(_) => {
                tonic::Status::invalid_argument(err.to_string())
            }
            HookError::Transform(_) | HookError::Permissions(_) | HookError::Task(_) => {
                tonic::Status::internal(err.to_string())
            }
        }
    }
}
