//! Error types for the student API client and the create-form draft.
//!
//! # Design
//! Every non-2xx response lands in `Http` with the raw status and body text;
//! callers get no finer classification ("not found" and "server error" look
//! the same). `Transport` and `Decode` both mean the round-trip did not
//! produce usable data.

use snafu::Snafu;

/// Errors returned by `StudentClient` parse methods and `Transport`s.
#[derive(Debug, Snafu)]
#[snafu(visibility(pub(crate)))]
pub enum ApiError {
    /// The server answered with a status outside `200..=299`.
    #[snafu(display("HTTP error! status: {status} - {body}"))]
    Http { status: u16, body: String },

    /// The request never produced a response (connection refused, DNS, I/O).
    #[snafu(display("transport failure: {message}"))]
    Transport { message: String },

    /// The response body was not the JSON shape we expected.
    #[snafu(display("transport failure: invalid JSON response: {source}"))]
    Decode { source: serde_json::Error },

    /// The request payload could not be serialized to JSON.
    #[snafu(display("failed to encode request body: {source}"))]
    Encode { source: serde_json::Error },
}

impl ApiError {
    pub fn transport(message: impl Into<String>) -> Self {
        ApiError::Transport {
            message: message.into(),
        }
    }

    /// HTTP status of the failed response, if the server answered at all.
    pub fn status(&self) -> Option<u16> {
        match self {
            ApiError::Http { status, .. } => Some(*status),
            _ => None,
        }
    }
}

/// Rejections raised while editing the create-form draft.
#[derive(Debug, Clone, PartialEq, Eq, Snafu)]
pub enum DraftError {
    #[snafu(display("year must be a whole number, got {input:?}"))]
    InvalidYear { input: String },

    #[snafu(display("year must be between 1 and 6, got {year}"))]
    YearOutOfRange { year: i64 },

    #[snafu(display("unknown draft field {name:?}"))]
    UnknownField { name: String },
}
