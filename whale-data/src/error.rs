use serde_json::Value;
use thiserror::Error;

/// All errors generated in `whale-data`.
///
/// Malformed response bodies are not errors: they are coerced to empty record sequences
/// by [`Record::collect`](whale_analytics::Record::collect).
#[derive(Debug, Clone, PartialEq, Error)]
pub enum DataError {
    #[error("network error - unable to connect to server: {0}")]
    Transport(String),

    #[error("HTTP {status}: {reason}")]
    Http {
        status: u16,
        reason: String,
        body: Option<Value>,
    },

    #[error("invalid API url: {0}")]
    InvalidUrl(String),
}

impl DataError {
    /// Determine if a failed request is worth repeating.
    pub fn is_retryable(&self) -> bool {
        match self {
            DataError::Transport(_) => true,
            DataError::Http { status, .. } => *status >= 500,
            _ => false,
        }
    }

    /// HTTP status code, if the server answered at all.
    pub fn status(&self) -> Option<u16> {
        match self {
            DataError::Http { status, .. } => Some(*status),
            _ => None,
        }
    }
}

impl From<url::ParseError> for DataError {
    fn from(value: url::ParseError) -> Self {
        Self::InvalidUrl(value.to_string())
    }
}

impl From<reqwest::Error> for DataError {
    fn from(value: reqwest::Error) -> Self {
        match value.status() {
            Some(status) => Self::Http {
                status: status.as_u16(),
                reason: status.canonical_reason().unwrap_or_default().to_string(),
                body: None,
            },
            None => Self::Transport(value.to_string()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_data_error_is_retryable() {
        struct TestCase {
            input: DataError,
            expected: bool,
        }

        let tests = vec![
            TestCase {
                // TC0: is retryable w/ DataError::Transport
                input: DataError::Transport("connection refused".to_string()),
                expected: true,
            },
            TestCase {
                // TC1: is retryable w/ DataError::Http 503
                input: DataError::Http {
                    status: 503,
                    reason: "Service Unavailable".to_string(),
                    body: None,
                },
                expected: true,
            },
            TestCase {
                // TC2: is not retryable w/ DataError::Http 404
                input: DataError::Http {
                    status: 404,
                    reason: "Not Found".to_string(),
                    body: Some(json!({"detail": "Not Found"})),
                },
                expected: false,
            },
            TestCase {
                // TC3: is not retryable w/ DataError::InvalidUrl
                input: DataError::InvalidUrl("relative URL without a base".to_string()),
                expected: false,
            },
        ];

        for (index, test) in tests.into_iter().enumerate() {
            let actual = test.input.is_retryable();
            assert_eq!(actual, test.expected, "TC{} failed", index);
        }
    }

    #[test]
    fn test_data_error_display() {
        let error = DataError::Http {
            status: 500,
            reason: "Internal Server Error".to_string(),
            body: None,
        };
        assert_eq!(error.to_string(), "HTTP 500: Internal Server Error");
        assert_eq!(error.status(), Some(500));
        assert_eq!(DataError::Transport("x".to_string()).status(), None);
    }
}
