use std::{collections::BTreeMap, fmt};

/// Shown instead of transport or server details.
pub const GENERIC_ERROR_MESSAGE: &str = "Something went wrong, please try again later";

/// Per-field messages returned by the server for rejected input.
pub type FieldErrors = BTreeMap<String, String>;

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum AppError {
    Config(String),
    Network(String),
    Timeout(String),
    /// The access or refresh credential was rejected (HTTP 401).
    Unauthorized { status: u16, message: String },
    /// Input rejected by the server with a per-field message map.
    Fields {
        status: u16,
        message: String,
        errors: FieldErrors,
    },
    Http { status: u16, message: String },
    Parse(String),
    Serialization(String),
    Storage(String),
}

impl AppError {
    /// HTTP status carried by the failure, if it came from a response.
    #[must_use]
    pub fn status(&self) -> Option<u16> {
        match self {
            AppError::Unauthorized { status, .. }
            | AppError::Fields { status, .. }
            | AppError::Http { status, .. } => Some(*status),
            _ => None,
        }
    }

    /// Transient or infrastructure failures that only deserve a generic message.
    #[must_use]
    pub fn is_infra(&self) -> bool {
        match self {
            AppError::Network(_) | AppError::Timeout(_) | AppError::Parse(_) => true,
            AppError::Http { status, .. } => *status >= 500,
            _ => false,
        }
    }

    /// Message suitable for a notification.
    #[must_use]
    pub fn user_message(&self) -> String {
        if self.is_infra() {
            return GENERIC_ERROR_MESSAGE.to_string();
        }
        match self {
            AppError::Unauthorized { message, .. }
            | AppError::Fields { message, .. }
            | AppError::Http { message, .. } => message.clone(),
            _ => self.to_string(),
        }
    }
}

impl fmt::Display for AppError {
    fn fmt(&self, formatter: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AppError::Config(message) => write!(formatter, "Config error: {message}"),
            AppError::Network(message) => write!(formatter, "Network error: {message}"),
            AppError::Timeout(message) => write!(formatter, "Timeout: {message}"),
            AppError::Unauthorized { status, message } => {
                write!(formatter, "Unauthorized ({status}): {message}")
            }
            AppError::Fields {
                status,
                message,
                errors,
            } => {
                write!(formatter, "Rejected ({status}): {message}")?;
                for (field, error) in errors {
                    write!(formatter, "; {field}: {error}")?;
                }
                Ok(())
            }
            AppError::Http { status, message } => {
                write!(formatter, "Request failed ({status}): {message}")
            }
            AppError::Parse(message) => write!(formatter, "Response error: {message}"),
            AppError::Serialization(message) => {
                write!(formatter, "Request error: {message}")
            }
            AppError::Storage(message) => write!(formatter, "Storage error: {message}"),
        }
    }
}

impl std::error::Error for AppError {}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn infra_classification() {
        assert!(AppError::Network("down".to_string()).is_infra());
        assert!(AppError::Timeout("slow".to_string()).is_infra());
        assert!(
            AppError::Http {
                status: 502,
                message: "bad gateway".to_string()
            }
            .is_infra()
        );
        assert!(
            !AppError::Http {
                status: 400,
                message: "still valid".to_string()
            }
            .is_infra()
        );
        assert!(
            !AppError::Unauthorized {
                status: 401,
                message: "expired".to_string()
            }
            .is_infra()
        );
    }

    #[test]
    fn user_message_hides_infrastructure_details() {
        let err = AppError::Network("connection refused (os error 111)".to_string());
        assert_eq!(
            err.user_message(),
            "Something went wrong, please try again later"
        );

        let err = AppError::Http {
            status: 404,
            message: "User not found".to_string(),
        };
        assert_eq!(err.user_message(), "User not found");
    }

    #[test]
    fn display_lists_field_errors() {
        let mut errors = FieldErrors::new();
        errors.insert("email".to_string(), "Email is already taken".to_string());
        let err = AppError::Fields {
            status: 400,
            message: "Validation error".to_string(),
            errors,
        };
        assert_eq!(
            err.to_string(),
            "Rejected (400): Validation error; email: Email is already taken"
        );
        assert_eq!(err.status(), Some(400));
    }
}
