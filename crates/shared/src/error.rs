use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum DomainError {
    #[error("invalid content uri '{uri}': {reason}")]
    InvalidContentUri { uri: String, reason: String },
    #[error("content uri '{uri}' has no provider authority")]
    MissingAuthority { uri: String },
}
