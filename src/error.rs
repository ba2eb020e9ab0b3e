use thiserror::Error;

/// Error type for the whole crate
#[derive(Error, Debug)]
pub enum Error {
    // Configuration errors
    #[error("Configuration error: {0}")]
    Config(#[from] config::ConfigError),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    // Client errors
    #[error("Invalid input: {field} - {reason}")]
    InvalidInput { field: String, reason: String },

    #[error("Authentication failed: {0}")]
    AuthenticationFailed(String),

    // Source errors
    #[error("Rate limit exceeded")]
    RateLimitExceeded,

    #[error("Service temporarily unavailable: {service} - {reason}")]
    ServiceUnavailable { service: String, reason: String },

    #[error("Timeout error: request timed out")]
    Timeout,

    // Parse errors
    #[error("Parse error in {context}: {message}")]
    Parse { context: String, message: String },

    // Result storage errors
    #[error("Repository error: {0}")]
    Repository(#[from] crate::repositories::RepositoryError),

    // Provider errors
    #[error("Provider error: {0}")]
    Provider(String),
}

pub type Result<T> = std::result::Result<T, Error>;

// Provider error conversion
impl From<crate::client::providers::ProviderError> for Error {
    fn from(err: crate::client::providers::ProviderError) -> Self {
        use crate::client::providers::ProviderError;

        match err {
            ProviderError::Network(msg) => Self::Provider(format!("Network error: {msg}")),
            ProviderError::Parse(msg) => Self::Parse {
                context: "provider".to_string(),
                message: msg,
            },
            ProviderError::RateLimit => Self::RateLimitExceeded,
            ProviderError::Auth(msg) => Self::AuthenticationFailed(msg),
            ProviderError::InvalidQuery(msg) => Self::InvalidInput {
                field: "query".to_string(),
                reason: msg,
            },
            ProviderError::ServiceUnavailable(msg) => Self::ServiceUnavailable {
                service: "provider".to_string(),
                reason: msg,
            },
            ProviderError::Timeout => Self::Timeout,
            ProviderError::Other(msg) => Self::Provider(msg),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::client::providers::ProviderError;

    #[test]
    fn test_provider_error_conversion() {
        let err: Error = ProviderError::RateLimit.into();
        assert!(matches!(err, Error::RateLimitExceeded));

        let err: Error = ProviderError::Auth("bad key".to_string()).into();
        assert!(matches!(err, Error::AuthenticationFailed(ref msg) if msg == "bad key"));

        let err: Error = ProviderError::Network("connection reset".to_string()).into();
        assert_eq!(err.to_string(), "Provider error: Network error: connection reset");
    }

    #[test]
    fn test_timeout_message_does_not_invent_a_duration() {
        let err: Error = ProviderError::Timeout.into();
        assert!(matches!(err, Error::Timeout));
        assert_eq!(err.to_string(), "Timeout error: request timed out");
    }

    #[test]
    fn test_error_display() {
        let err = Error::InvalidInput {
            field: "search.page_size".to_string(),
            reason: "must be greater than zero".to_string(),
        };
        assert_eq!(
            err.to_string(),
            "Invalid input: search.page_size - must be greater than zero"
        );
    }
}
