use thiserror::Error;

#[derive(Debug, Error)]
pub enum PapergraphError {
    #[error("HTTP request error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// The backend answered with a top-level `error` string. The message is kept verbatim.
    #[error("{0}")]
    Api(String),

    #[error("Invalid URL: {0}")]
    InvalidUrl(String),

    #[error("Configuration error: {0}")]
    Config(String),
}

impl PapergraphError {
    /// Network and parse failures, as opposed to an `error` reported by the backend.
    pub fn is_transport(&self) -> bool {
        matches!(self, PapergraphError::Http(_) | PapergraphError::Serialization(_))
    }

    /// The backend-supplied message, if this is an application-level failure.
    pub fn api_message(&self) -> Option<&str> {
        match self {
            PapergraphError::Api(msg) => Some(msg),
            _ => None,
        }
    }
}

pub type Result<T> = std::result::Result<T, PapergraphError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn api_error_displays_message_verbatim() {
        let err = PapergraphError::Api("Paper already collected".to_string());
        assert_eq!(err.to_string(), "Paper already collected");
        assert_eq!(err.api_message(), Some("Paper already collected"));
        assert!(!err.is_transport());
    }

    #[test]
    fn parse_failure_is_transport() {
        let err: PapergraphError = serde_json::from_str::<serde_json::Value>("<html>")
            .unwrap_err()
            .into();
        assert!(err.is_transport());
        assert_eq!(err.api_message(), None);
    }
}
