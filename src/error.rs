//! Error handling for remote calls and configuration.

use reqwest::StatusCode;

pub type Result<T> = std::result::Result<T, ClientError>;

#[derive(Debug, thiserror::Error)]
pub enum ClientError {
    #[error("Not found: {resource}")]
    NotFound { resource: String },

    #[error("Remote service returned {status}: {message}")]
    Remote { status: StatusCode, message: String },

    #[error("Service unavailable: {service}")]
    ServiceUnavailable { service: String },

    #[error("Timeout error: {operation}")]
    Timeout { operation: String },

    #[error("Unexpected response: {message}")]
    Decode { message: String },

    #[error("Configuration error: {message}")]
    Configuration { message: String },

    #[error("HTTP client error: {0}")]
    HttpClient(#[from] reqwest::Error),
}

impl ClientError {
    pub fn not_found(resource: impl Into<String>) -> Self {
        Self::NotFound {
            resource: resource.into(),
        }
    }

    pub fn remote(status: StatusCode, message: impl Into<String>) -> Self {
        Self::Remote {
            status,
            message: message.into(),
        }
    }

    pub fn service_unavailable(service: impl Into<String>) -> Self {
        Self::ServiceUnavailable {
            service: service.into(),
        }
    }

    pub fn timeout(operation: impl Into<String>) -> Self {
        Self::Timeout {
            operation: operation.into(),
        }
    }

    pub fn decode(message: impl Into<String>) -> Self {
        Self::Decode {
            message: message.into(),
        }
    }

    pub fn configuration(message: impl Into<String>) -> Self {
        Self::Configuration {
            message: message.into(),
        }
    }

    pub fn is_not_found(&self) -> bool {
        matches!(self, ClientError::NotFound { .. })
    }

    pub fn error_code(&self) -> &'static str {
        match self {
            ClientError::NotFound { .. } => "NOT_FOUND",
            ClientError::Remote { .. } => "REMOTE_ERROR",
            ClientError::ServiceUnavailable { .. } => "SERVICE_UNAVAILABLE",
            ClientError::Timeout { .. } => "TIMEOUT",
            ClientError::Decode { .. } => "DECODE_ERROR",
            ClientError::Configuration { .. } => "CONFIG_ERROR",
            ClientError::HttpClient(_) => "HTTP_CLIENT_ERROR",
        }
    }

    /// Text shown to the user in place of the failed content.
    pub fn user_message(&self, action: &str) -> String {
        match self {
            ClientError::NotFound { resource } => format!("{} was not found.", resource),
            ClientError::ServiceUnavailable { .. } => {
                format!("{} failed: the service is not reachable.", action)
            }
            ClientError::Timeout { .. } => format!("{} failed: the service did not answer in time.", action),
            other => format!("{} failed: {}", action, other),
        }
    }
}
