//! Structured error type shared by the library and the CLI layer.
//!
//! Every failure carries a stable dotted code (for the JSON envelope and
//! scripting), a human message, optional structured details, and operator
//! hints. Per-PR cleanup failures are NOT represented here — they are data
//! (`CleanupOutcome::Failed`), not control flow.

use serde::Serialize;
use serde_json::{json, Value};

pub type Result<T> = std::result::Result<T, Error>;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorCode {
    ConfigMissingKey,
    ConfigInvalidJson,
    ValidationMissingArgument,
    ValidationInvalidArgument,
    PlatformRequestFailed,
    GithubRequestFailed,
    CleanupScriptFailed,
    InternalIoError,
    InternalJsonError,
}

impl ErrorCode {
    pub fn as_str(&self) -> &'static str {
        match self {
            ErrorCode::ConfigMissingKey => "config.missing_key",
            ErrorCode::ConfigInvalidJson => "config.invalid_json",
            ErrorCode::ValidationMissingArgument => "validation.missing_argument",
            ErrorCode::ValidationInvalidArgument => "validation.invalid_argument",
            ErrorCode::PlatformRequestFailed => "platform.request_failed",
            ErrorCode::GithubRequestFailed => "github.request_failed",
            ErrorCode::CleanupScriptFailed => "cleanup.script_failed",
            ErrorCode::InternalIoError => "internal.io_error",
            ErrorCode::InternalJsonError => "internal.json_error",
        }
    }
}

/// Operator-facing suggestion attached to an error.
#[derive(Debug, Clone, Serialize)]
pub struct Hint {
    pub message: String,
}

#[derive(Debug, Clone)]
pub struct Error {
    pub code: ErrorCode,
    pub message: String,
    pub details: Value,
    pub hints: Vec<Hint>,
    pub retryable: Option<bool>,
}

impl std::fmt::Display for Error {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}: {}", self.code.as_str(), self.message)
    }
}

impl std::error::Error for Error {}

impl Error {
    pub fn new(code: ErrorCode, message: impl Into<String>, details: Value) -> Self {
        Self {
            code,
            message: message.into(),
            details,
            hints: Vec::new(),
            retryable: None,
        }
    }

    pub fn with_hint(mut self, hint: impl Into<String>) -> Self {
        self.hints.push(Hint {
            message: hint.into(),
        });
        self
    }

    pub fn with_retryable(mut self, retryable: bool) -> Self {
        self.retryable = Some(retryable);
        self
    }

    pub fn validation_invalid_argument(
        field: &str,
        message: impl Into<String>,
        value: Option<String>,
        hints: Option<Vec<String>>,
    ) -> Self {
        let mut err = Self::new(
            ErrorCode::ValidationInvalidArgument,
            message,
            json!({ "field": field, "value": value }),
        );
        for hint in hints.unwrap_or_default() {
            err = err.with_hint(hint);
        }
        err
    }

    pub fn validation_missing_argument(fields: Vec<String>) -> Self {
        Self::new(
            ErrorCode::ValidationMissingArgument,
            format!("Missing required argument(s): {}", fields.join(", ")),
            json!({ "fields": fields }),
        )
    }

    pub fn config_missing_key(key: &str, context: Option<String>) -> Self {
        Self::new(
            ErrorCode::ConfigMissingKey,
            format!("Missing required config key '{}'", key),
            json!({ "key": key, "context": context }),
        )
    }

    pub fn config_invalid_json(message: impl Into<String>, path: Option<String>) -> Self {
        Self::new(
            ErrorCode::ConfigInvalidJson,
            message,
            json!({ "path": path }),
        )
    }

    pub fn platform_request_failed(message: impl Into<String>, namespace: &str) -> Self {
        Self::new(
            ErrorCode::PlatformRequestFailed,
            message,
            json!({ "namespace": namespace }),
        )
        .with_retryable(true)
    }

    pub fn github_request_failed(message: impl Into<String>, owner: &str, repo: &str) -> Self {
        Self::new(
            ErrorCode::GithubRequestFailed,
            message,
            json!({ "owner": owner, "repo": repo }),
        )
        .with_retryable(true)
    }

    pub fn cleanup_script_failed(pr: u64, message: impl Into<String>) -> Self {
        Self::new(
            ErrorCode::CleanupScriptFailed,
            message,
            json!({ "pr": pr }),
        )
    }

    pub fn internal_io(message: impl Into<String>, context: Option<String>) -> Self {
        Self::new(
            ErrorCode::InternalIoError,
            message,
            json!({ "context": context }),
        )
    }

    pub fn internal_json(message: impl Into<String>, context: Option<String>) -> Self {
        Self::new(
            ErrorCode::InternalJsonError,
            message,
            json!({ "context": context }),
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn code_strings_are_dotted() {
        assert_eq!(ErrorCode::ConfigMissingKey.as_str(), "config.missing_key");
        assert_eq!(
            ErrorCode::PlatformRequestFailed.as_str(),
            "platform.request_failed"
        );
        assert_eq!(ErrorCode::InternalIoError.as_str(), "internal.io_error");
    }

    #[test]
    fn missing_argument_lists_all_fields() {
        let err =
            Error::validation_missing_argument(vec!["app".to_string(), "dev".to_string()]);
        assert!(err.message.contains("app"));
        assert!(err.message.contains("dev"));
        assert_eq!(err.code, ErrorCode::ValidationMissingArgument);
    }

    #[test]
    fn with_hint_accumulates() {
        let err = Error::config_missing_key("token", None)
            .with_hint("Set OC_TOKEN in the environment")
            .with_hint("Or pass --token");
        assert_eq!(err.hints.len(), 2);
    }

    #[test]
    fn upstream_errors_are_retryable() {
        let err = Error::platform_request_failed("connection refused", "myapp-dev");
        assert_eq!(err.retryable, Some(true));
    }
}
