//! Error types for fss-cmk-core

use thiserror::Error;

/// Result type alias using fss-cmk-core's Error type
pub type Result<T> = std::result::Result<T, Error>;

/// Core error types for fss-cmk
#[derive(Error, Debug)]
pub enum Error {
    /// Protection group identifier does not carry a region segment
    #[error(
        "Malformed protection group identifier '{identifier}': expected at least 4 \
         dot-separated segments, found {found}"
    )]
    MalformedIdentifier { identifier: String, found: usize },

    /// Remote service answered with a non-success status
    #[error("{service} request failed ({status}): {code} - {message}")]
    Service {
        service: String,
        status: u16,
        code: String,
        message: String,
        request_id: Option<String>,
    },

    /// Network or TLS failure talking to a remote service
    #[error("Transport error talking to {service}: {message}")]
    Transport { service: String, message: String },

    /// Credential or signer failure
    #[error("Authentication error: {message}")]
    Auth { message: String },

    /// Invalid configuration file, profile or key
    #[error("Invalid configuration: {message}")]
    InvalidConfig { message: String },

    /// JSON parsing error
    #[error("JSON parsing error: {0}")]
    Json(#[from] serde_json::Error),

    /// IO error
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl Error {
    /// Create a malformed identifier error
    pub fn malformed_identifier(identifier: impl Into<String>, found: usize) -> Self {
        Self::MalformedIdentifier {
            identifier: identifier.into(),
            found,
        }
    }

    /// Create a transport error
    pub fn transport(service: impl Into<String>, message: impl Into<String>) -> Self {
        Self::Transport {
            service: service.into(),
            message: message.into(),
        }
    }

    /// Create an authentication error
    pub fn auth(message: impl Into<String>) -> Self {
        Self::Auth {
            message: message.into(),
        }
    }

    /// Create an invalid config error
    pub fn invalid_config(message: impl Into<String>) -> Self {
        Self::InvalidConfig {
            message: message.into(),
        }
    }

    /// Short operator-facing reason for the failure.
    ///
    /// Service errors give status, code and remote message; transport errors
    /// give the underlying message; everything else its display string.
    pub fn reason(&self) -> String {
        match self {
            Self::Service {
                status,
                code,
                message,
                ..
            } => format!("{} {} - {}", status, code, message),
            Self::Transport { message, .. } => message.clone(),
            other => other.to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_malformed_identifier_message() {
        let err = Error::malformed_identifier("ocid1.drprotectiongroup.oc1", 3);
        let msg = err.to_string();
        assert!(msg.contains("ocid1.drprotectiongroup.oc1"));
        assert!(msg.contains("found 3"));
    }

    #[test]
    fn test_service_reason() {
        let err = Error::Service {
            service: "disaster-recovery".to_string(),
            status: 404,
            code: "NotAuthorizedOrNotFound".to_string(),
            message: "Authorization failed or requested resource not found".to_string(),
            request_id: Some("req-1".to_string()),
        };
        assert_eq!(
            err.reason(),
            "404 NotAuthorizedOrNotFound - Authorization failed or requested resource not found"
        );
    }

    #[test]
    fn test_transport_reason() {
        let err = Error::transport("identity", "connection refused");
        assert_eq!(err.reason(), "connection refused");
        assert!(err.to_string().contains("identity"));
    }
}
