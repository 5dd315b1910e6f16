//! Error types for the banking client
//!
//! This module defines every error the client can surface. Each variant carries
//! enough context (HTTP status, response body, lookup key) for the caller to
//! decide how to abort the current workflow step.
//!
//! # Error Categories
//!
//! - **Authentication Errors**: unknown region, keypad fetch, security check, invalid layout
//! - **Retrieval Errors**: operations pages and the other listing endpoints
//! - **Lookup Errors**: account or card searches that find nothing
//! - **Plumbing Errors**: transport, I/O, malformed JSON, configuration, fixtures
//!
//! None of these are retried automatically.

use thiserror::Error;

/// Main error type for the banking client
///
/// All payloads are owned strings so the error stays `Clone + PartialEq`,
/// which keeps assertions in tests simple.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum BankError {
    /// No regional bank prefix is known for the department
    #[error("Unknown region for department {department}")]
    UnknownRegion {
        /// Department code as given by the caller
        department: String,
    },

    /// The keypad layout request did not succeed
    #[error("Keypad fetch failed: {status} - {body}")]
    KeypadFetch {
        /// HTTP status returned by the server
        status: u16,
        /// Raw response body
        body: String,
    },

    /// The credential submission was rejected
    #[error("Security check failed: {status} - {body}")]
    SecurityCheck {
        /// HTTP status returned by the server
        status: u16,
        /// Raw response body
        body: String,
    },

    /// The keypad layout does not contain one of the PIN digits
    #[error("Invalid keypad layout: digit {digit} not found")]
    InvalidLayout {
        /// The PIN digit that could not be placed
        digit: u8,
    },

    /// A transactions page request did not succeed
    ///
    /// Operations already accumulated by the same call are discarded.
    #[error("Operations fetch failed: {status} - {body}")]
    OperationsFetch {
        /// HTTP status returned by the server
        status: u16,
        /// Raw response body
        body: String,
    },

    /// Any other endpoint answered with a non-success status
    #[error("{endpoint} failed: {status} - {body}")]
    Http {
        /// Logical endpoint name (accounts, cards, iban, ...)
        endpoint: String,
        /// HTTP status returned by the server
        status: u16,
        /// Raw response body
        body: String,
    },

    /// A search over accounts or cards found nothing
    #[error("{kind} not found: {key}")]
    NotFound {
        /// What was searched for
        kind: String,
        /// The search key
        key: String,
    },

    /// The request never produced an HTTP response
    #[error("Transport error: {message}")]
    Transport {
        /// Description of the transport failure
        message: String,
    },

    /// A response body could not be decoded
    #[error("Parse error{}: {message}", context.as_ref().map(|c| format!(" in {}", c)).unwrap_or_default())]
    Parse {
        /// Endpoint or document being decoded (if known)
        context: Option<String>,
        /// Description of the decoding failure
        message: String,
    },

    /// A mock fixture could not be read or written
    #[error("Fixture error for {path}: {message}")]
    Fixture {
        /// Path of the fixture file
        path: String,
        /// Description of the failure
        message: String,
    },

    /// Configuration or user input is invalid
    #[error("Configuration error: {message}")]
    Config {
        /// Description of the configuration problem
        message: String,
    },

    /// I/O error outside of fixture handling
    #[error("I/O error: {message}")]
    Io {
        /// Description of the I/O error
        message: String,
    },
}

impl From<std::io::Error> for BankError {
    fn from(error: std::io::Error) -> Self {
        BankError::Io {
            message: error.to_string(),
        }
    }
}

impl From<serde_json::Error> for BankError {
    fn from(error: serde_json::Error) -> Self {
        BankError::Parse {
            context: None,
            message: error.to_string(),
        }
    }
}

impl From<reqwest::Error> for BankError {
    fn from(error: reqwest::Error) -> Self {
        BankError::Transport {
            message: error.to_string(),
        }
    }
}

// Helper functions for creating common errors

impl BankError {
    /// Create an UnknownRegion error
    pub fn unknown_region(department: &str) -> Self {
        BankError::UnknownRegion {
            department: department.to_string(),
        }
    }

    /// Create an Http error for a non-core endpoint
    pub fn http(endpoint: &str, status: u16, body: &str) -> Self {
        BankError::Http {
            endpoint: endpoint.to_string(),
            status,
            body: body.to_string(),
        }
    }

    /// Create a NotFound error
    pub fn not_found(kind: &str, key: &str) -> Self {
        BankError::NotFound {
            kind: kind.to_string(),
            key: key.to_string(),
        }
    }

    /// Create a Parse error tied to an endpoint or document
    pub fn parse(context: &str, message: impl ToString) -> Self {
        BankError::Parse {
            context: Some(context.to_string()),
            message: message.to_string(),
        }
    }

    /// Create a Config error
    pub fn config(message: impl ToString) -> Self {
        BankError::Config {
            message: message.to_string(),
        }
    }

    /// Create a Fixture error
    pub fn fixture(path: &std::path::Path, message: impl ToString) -> Self {
        BankError::Fixture {
            path: path.display().to_string(),
            message: message.to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[rstest]
    #[case::unknown_region(
        BankError::UnknownRegion { department: "99".to_string() },
        "Unknown region for department 99"
    )]
    #[case::keypad_fetch(
        BankError::KeypadFetch { status: 503, body: "unavailable".to_string() },
        "Keypad fetch failed: 503 - unavailable"
    )]
    #[case::security_check(
        BankError::SecurityCheck { status: 401, body: "denied".to_string() },
        "Security check failed: 401 - denied"
    )]
    #[case::invalid_layout(
        BankError::InvalidLayout { digit: 7 },
        "Invalid keypad layout: digit 7 not found"
    )]
    #[case::operations_fetch(
        BankError::OperationsFetch { status: 500, body: "oops".to_string() },
        "Operations fetch failed: 500 - oops"
    )]
    #[case::http(
        BankError::Http { endpoint: "cards".to_string(), status: 404, body: "".to_string() },
        "cards failed: 404 - "
    )]
    #[case::not_found(
        BankError::NotFound { kind: "account".to_string(), key: "123".to_string() },
        "account not found: 123"
    )]
    #[case::parse_with_context(
        BankError::Parse { context: Some("keypad".to_string()), message: "missing field".to_string() },
        "Parse error in keypad: missing field"
    )]
    #[case::parse_without_context(
        BankError::Parse { context: None, message: "EOF".to_string() },
        "Parse error: EOF"
    )]
    fn test_error_display(#[case] error: BankError, #[case] expected: &str) {
        assert_eq!(error.to_string(), expected);
    }

    #[rstest]
    #[case::unknown_region(
        BankError::unknown_region("2A"),
        BankError::UnknownRegion { department: "2A".to_string() }
    )]
    #[case::http(
        BankError::http("logout", 500, "err"),
        BankError::Http { endpoint: "logout".to_string(), status: 500, body: "err".to_string() }
    )]
    #[case::not_found(
        BankError::not_found("card", "1098"),
        BankError::NotFound { kind: "card".to_string(), key: "1098".to_string() }
    )]
    fn test_helper_functions(#[case] result: BankError, #[case] expected: BankError) {
        assert_eq!(result, expected);
    }

    #[test]
    fn test_io_error_conversion() {
        let io_error =
            std::io::Error::new(std::io::ErrorKind::PermissionDenied, "Permission denied");
        let error: BankError = io_error.into();
        assert!(matches!(error, BankError::Io { .. }));
        assert_eq!(error.to_string(), "I/O error: Permission denied");
    }

    #[test]
    fn test_json_error_conversion() {
        let json_error = serde_json::from_str::<serde_json::Value>("{").unwrap_err();
        let error: BankError = json_error.into();
        assert!(matches!(error, BankError::Parse { context: None, .. }));
    }
}
