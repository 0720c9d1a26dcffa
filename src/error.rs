//! Error types for the create-todo screen and its API client.
//!
//! Two layers:
//!
//! - `ApiError`: what went wrong talking to the todo service. These are
//!   logged for diagnostics but never shown to the user.
//! - `FormError`: the screen's user-visible error line. Each variant renders
//!   as one fixed message, so the `Display` impl *is* the UI text.

use thiserror::Error;

/// Failure of a `TodoApi::create_todo` call.
///
/// `#[derive(Error)]` from `thiserror` generates the `std::error::Error` and
/// `Display` impls from the `#[error(...)]` attributes. `#[from]` additionally
/// generates a `From` impl, so `?` converts a `reqwest::Error` into
/// `ApiError::Transport` automatically.
#[derive(Debug, Error)]
pub enum ApiError {
    /// Connection refused, DNS failure, timeout, TLS error, ...
    #[error("request failed: {0}")]
    Transport(#[from] reqwest::Error),

    /// The server answered with a non-2xx status.
    #[error("HTTP {status}: {body}")]
    Status { status: u16, body: String },

    /// The response body was not a todo record.
    #[error("could not decode response: {0}")]
    Decode(#[from] serde_json::Error),

    #[error("invalid API base URL: {0}")]
    InvalidBaseUrl(String),

    /// The spawned request task panicked or was cancelled before it produced
    /// a result. The screen treats it like any other failed request.
    #[error("request task failed: {0}")]
    Task(#[from] tokio::task::JoinError),
}

/// The error line shown on the form.
///
/// At most one is present at a time: the screen stores an
/// `Option<FormError>` and each new error replaces the previous one.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum FormError {
    /// Title or user ID missing (after trimming). No API call is made.
    #[error("Please enter a title and user ID")]
    Validation,

    /// User ID is not a base-10 integer. No API call is made.
    #[error("User ID must be a number")]
    Format,

    /// The API call succeeded but returned no record.
    #[error("Failed to create todo")]
    EmptyResult,

    /// The API call failed. The underlying `ApiError` is logged, not shown.
    #[error("An error occurred while creating the todo")]
    Transport,
}

#[cfg(test)]
mod tests {
    use super::*;

    /// The user-facing strings are part of the screen's contract.
    #[test]
    fn form_error_messages() {
        assert_eq!(FormError::Validation.to_string(), "Please enter a title and user ID");
        assert_eq!(FormError::Format.to_string(), "User ID must be a number");
        assert_eq!(FormError::EmptyResult.to_string(), "Failed to create todo");
        assert_eq!(
            FormError::Transport.to_string(),
            "An error occurred while creating the todo"
        );
    }

    #[test]
    fn status_error_includes_code_and_body() {
        let err = ApiError::Status {
            status: 503,
            body: "unavailable".into(),
        };
        assert_eq!(err.to_string(), "HTTP 503: unavailable");
    }

    #[tokio::test]
    async fn panicked_task_converts_into_task_error() {
        let joined: Result<(), _> = tokio::spawn(async { panic!("boom") }).await;
        let err: ApiError = joined.unwrap_err().into();
        assert!(matches!(err, ApiError::Task(_)));
        assert!(err.to_string().starts_with("request task failed"));
    }
}
