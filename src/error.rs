use thiserror::Error;

#[derive(Error, Debug)]
pub enum AgencyError {
    /// A referenced entity (client, agent, service, contract, payment) is absent.
    #[error("not found: {0}")]
    NotFound(String),
    /// Malformed input to a constructor or transition.
    #[error("validation error: {0}")]
    Validation(String),
    /// Illegal state transition or unmet business gate.
    #[error("domain error: {0}")]
    Domain(String),
    /// Storage or serialization fault outside the domain rules.
    #[error("internal error: {0}")]
    Internal(Box<dyn std::error::Error + Send + Sync>),
}

impl AgencyError {
    pub fn internal<E>(err: E) -> Self
    where
        E: std::error::Error + Send + Sync + 'static,
    {
        Self::Internal(Box::new(err))
    }
}

pub type Result<T, E = AgencyError> = std::result::Result<T, E>;
