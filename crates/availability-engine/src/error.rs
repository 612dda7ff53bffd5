//! Error types for availability-engine operations.

use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum EngineError {
    /// The provider id does not resolve to a known provider.
    ///
    /// [`AvailabilityService`](crate::service::AvailabilityService) turns this
    /// into an empty slot list or `false`; it only surfaces from the lower
    /// level loader and store APIs.
    #[error("Provider not found: {0}")]
    NotFound(String),

    /// A zero service duration or slot granularity reached the slot walk.
    #[error("Invalid duration: {0} minutes (must be positive)")]
    InvalidDuration(u32),

    #[error("Invalid working hours: {0}")]
    InvalidWorkingHours(String),

    /// An intake check refused the request before it reached the engine.
    #[error("Rejected: {0}")]
    Rejected(String),

    #[error("Persistence failure: {0}")]
    Persistence(String),

    #[error("Invalid configuration: {0}")]
    Config(String),

    #[error("Invalid schedule document: {0}")]
    Document(String),
}

pub type Result<T> = std::result::Result<T, EngineError>;
