// Dashboard error taxonomy
use thiserror::Error;

#[derive(Debug, Clone, Error, PartialEq)]
pub enum DashboardError {
    /// Missing or expired session
    #[error("authentication required: {0}")]
    Auth(String),

    /// Read-only role attempting a mutation
    #[error("permission denied: {0}")]
    PermissionDenied(String),

    #[error("not found: {0}")]
    NotFound(String),

    /// Empty or malformed required field
    #[error("invalid {field}: {message}")]
    Validation { field: String, message: String },

    #[error("network error: {0}")]
    Network(String),

    #[error("request timed out: {0}")]
    Timeout(String),

    #[error("server error ({status}): {message}")]
    Server { status: u16, message: String },

    /// Mutation attempted outside edit mode
    #[error("dashboard is not in edit mode")]
    NotEditing,

    #[error("failed to decode response: {0}")]
    Decode(String),

    #[error("export failed: {0}")]
    Export(String),
}

impl DashboardError {
    pub fn validation(field: &str, message: &str) -> Self {
        Self::Validation {
            field: field.to_string(),
            message: message.to_string(),
        }
    }

    /// Classify a failed remote call by status code, falling back to the
    /// error message when no status is available.
    pub fn classify(status: Option<u16>, message: &str) -> Self {
        match status {
            Some(401) => return Self::Auth(message.to_string()),
            Some(403) => return Self::PermissionDenied(message.to_string()),
            Some(404) => return Self::NotFound(message.to_string()),
            Some(400) | Some(422) => {
                return Self::Validation {
                    field: "request".to_string(),
                    message: message.to_string(),
                };
            }
            Some(408) | Some(504) => return Self::Timeout(message.to_string()),
            Some(code) if code >= 500 => {
                return Self::Server {
                    status: code,
                    message: message.to_string(),
                };
            }
            _ => {}
        }

        let lower = message.to_lowercase();
        if lower.contains("timeout") || lower.contains("timed out") {
            Self::Timeout(message.to_string())
        } else if lower.contains("network")
            || lower.contains("connection")
            || lower.contains("failed to fetch")
        {
            Self::Network(message.to_string())
        } else if lower.contains("unauthorized") || lower.contains("jwt") {
            Self::Auth(message.to_string())
        } else {
            Self::Server {
                status: status.unwrap_or(0),
                message: message.to_string(),
            }
        }
    }

    /// Text shown to the user for this failure.
    pub fn user_message(&self) -> String {
        match self {
            Self::Auth(_) => "Your session has expired. Please sign in again.".to_string(),
            Self::PermissionDenied(_) => {
                "You don't have permission to change this dashboard.".to_string()
            }
            Self::NotFound(_) => {
                "That preset no longer exists. Showing the default layout.".to_string()
            }
            Self::Validation { field, message } => format!("{}: {}", field, message),
            Self::Network(_) => {
                "Network error. Check your connection and try again.".to_string()
            }
            Self::Timeout(_) => "The request timed out. Please try again.".to_string(),
            Self::Server { .. } => "The server had a problem. Please try again later.".to_string(),
            Self::NotEditing => "Enter edit mode to change the layout.".to_string(),
            Self::Decode(_) => "Received an unexpected response from the server.".to_string(),
            Self::Export(_) => "The report could not be generated.".to_string(),
        }
    }
}

impl From<reqwest::Error> for DashboardError {
    fn from(err: reqwest::Error) -> Self {
        if err.is_timeout() {
            Self::Timeout(err.to_string())
        } else if err.is_connect() || err.is_request() {
            Self::Network(err.to_string())
        } else if err.is_decode() {
            Self::Decode(err.to_string())
        } else {
            Self::classify(err.status().map(|s| s.as_u16()), &err.to_string())
        }
    }
}

impl From<serde_json::Error> for DashboardError {
    fn from(err: serde_json::Error) -> Self {
        Self::Decode(err.to_string())
    }
}

pub type DashboardResult<T> = Result<T, DashboardError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_classify_by_status() {
        assert!(matches!(DashboardError::classify(Some(401), "x"), DashboardError::Auth(_)));
        assert!(matches!(
            DashboardError::classify(Some(403), "x"),
            DashboardError::PermissionDenied(_)
        ));
        assert!(matches!(DashboardError::classify(Some(404), "x"), DashboardError::NotFound(_)));
        assert!(matches!(
            DashboardError::classify(Some(422), "x"),
            DashboardError::Validation { .. }
        ));
        assert_eq!(
            DashboardError::classify(Some(503), "down"),
            DashboardError::Server {
                status: 503,
                message: "down".to_string()
            }
        );
    }

    #[test]
    fn test_classify_by_message() {
        assert!(matches!(
            DashboardError::classify(None, "operation timed out"),
            DashboardError::Timeout(_)
        ));
        assert!(matches!(
            DashboardError::classify(None, "Connection refused"),
            DashboardError::Network(_)
        ));
        assert!(matches!(
            DashboardError::classify(None, "something odd"),
            DashboardError::Server { status: 0, .. }
        ));
    }

    #[test]
    fn test_user_messages_are_distinct() {
        let errors = [
            DashboardError::Auth(String::new()),
            DashboardError::PermissionDenied(String::new()),
            DashboardError::NotFound(String::new()),
            DashboardError::Network(String::new()),
            DashboardError::Timeout(String::new()),
            DashboardError::Server {
                status: 500,
                message: String::new(),
            },
        ];
        let messages: std::collections::HashSet<String> =
            errors.iter().map(|e| e.user_message()).collect();
        assert_eq!(messages.len(), errors.len());
        assert!(DashboardError::Auth(String::new())
            .user_message()
            .contains("sign in again"));
    }
}
