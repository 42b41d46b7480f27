use reqwest::StatusCode;
use serde::Deserialize;
use thiserror::Error;

/// Classified failure of a single search.
///
/// The `Display` output of every variant is meant to be shown to the user as-is.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum FetchError {
    #[error("Please enter a city name")]
    InvalidInput,

    #[error("City not found. Please check the spelling and try again.")]
    NotFound,

    #[error("API key error (401): {message}")]
    Unauthorized { message: String },

    #[error("Too many requests. Please try again later.")]
    RateLimited,

    #[error("Server error ({status}): {message}")]
    ServerError { status: u16, message: String },

    #[error("Network error. Please check your internet connection.")]
    NetworkUnreachable,

    /// `detail` is for logs only; the user sees the generic message.
    #[error("An unexpected error occurred. Please try again.")]
    Unexpected { detail: String },
}

/// Error bodies from the provider carry an optional human-readable `message`.
#[derive(Debug, Deserialize)]
struct ProviderErrorBody {
    message: Option<String>,
}

impl FetchError {
    pub fn unexpected(detail: impl Into<String>) -> Self {
        Self::Unexpected {
            detail: detail.into(),
        }
    }

    pub fn server(status: u16, message: impl Into<String>) -> Self {
        Self::ServerError {
            status,
            message: message.into(),
        }
    }

    /// Classify a non-2xx HTTP response.
    pub fn from_status(status: StatusCode, body: &str) -> Self {
        let provider_message = serde_json::from_str::<ProviderErrorBody>(body)
            .ok()
            .and_then(|b| b.message)
            .filter(|m| !m.trim().is_empty());

        match status {
            StatusCode::UNAUTHORIZED => Self::Unauthorized {
                message: provider_message.unwrap_or_else(|| "Invalid API key".to_string()),
            },
            StatusCode::NOT_FOUND => Self::NotFound,
            StatusCode::TOO_MANY_REQUESTS => Self::RateLimited,
            other => Self::ServerError {
                status: other.as_u16(),
                message: provider_message.unwrap_or_else(|| "An error occurred".to_string()),
            },
        }
    }

    /// Classify a `reqwest` failure where no usable response was obtained.
    pub fn from_transport(err: &reqwest::Error) -> Self {
        if err.is_builder() {
            return Self::unexpected(err.to_string());
        }
        if let Some(status) = err.status() {
            return Self::from_status(status, "");
        }
        if err.is_decode() {
            return Self::unexpected(err.to_string());
        }
        // timeouts, refused connections, resets, body read failures
        Self::NetworkUnreachable
    }

    /// Short machine-friendly name, used in log fields.
    pub fn kind(&self) -> &'static str {
        match self {
            Self::InvalidInput => "invalid_input",
            Self::NotFound => "not_found",
            Self::Unauthorized { .. } => "unauthorized",
            Self::RateLimited => "rate_limited",
            Self::ServerError { .. } => "server_error",
            Self::NetworkUnreachable => "network_unreachable",
            Self::Unexpected { .. } => "unexpected",
        }
    }
}
