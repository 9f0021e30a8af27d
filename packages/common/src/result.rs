use crate::error::HostError;

/// Result type returned by every host binding operation
pub type HostResult<T> = Result<T, HostError>;
