use thiserror::Error;

#[derive(Clone, Debug, Error, PartialEq, Eq)]
pub enum DomainError {
    #[error("domain invariant violation: {0}")]
    InvariantViolation(String),
}

#[derive(Clone, Debug, Error, PartialEq, Eq)]
pub enum ApplicationError {
    #[error(transparent)]
    Domain(#[from] DomainError),
    #[error("persistence failure: {0}")]
    Persistence(String),
    #[error("configuration failure: {0}")]
    Configuration(String),
}

impl ApplicationError {
    /// Read failures from the rule/campaign store cannot be absorbed: without a
    /// complete candidate set no safe selection is possible.
    pub fn is_retryable(&self) -> bool {
        matches!(self, Self::Persistence(_))
    }
}

#[cfg(test)]
mod tests {
    use super::{ApplicationError, DomainError};

    #[test]
    fn domain_error_wraps_into_application_error() {
        let error = ApplicationError::from(DomainError::InvariantViolation(
            "campaign ends before it starts".to_owned(),
        ));
        assert!(matches!(error, ApplicationError::Domain(_)));
        assert!(!error.is_retryable());
    }

    #[test]
    fn persistence_errors_are_retryable() {
        let error = ApplicationError::Persistence("database lock timeout".to_owned());
        assert!(error.is_retryable());
    }
}
