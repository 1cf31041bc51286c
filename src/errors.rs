use axum::http::StatusCode;
use thiserror::Error;

#[derive(Debug)]
pub struct AppError {
    pub status: StatusCode,
    pub message: String,
}

impl AppError {
    pub fn forbidden(message: impl Into<String>) -> Self {
        Self {
            status: StatusCode::FORBIDDEN,
            message: message.into(),
        }
    }

    pub fn not_found(message: impl Into<String>) -> Self {
        Self {
            status: StatusCode::NOT_FOUND,
            message: message.into(),
        }
    }

    pub fn internal(err: impl std::error::Error) -> Self {
        Self {
            status: StatusCode::INTERNAL_SERVER_ERROR,
            message: err.to_string(),
        }
    }
}

impl axum::response::IntoResponse for AppError {
    fn into_response(self) -> axum::response::Response {
        (self.status, self.message).into_response()
    }
}

/// Raised while wiring the toggle handler; no card is registered when
/// setup fails.
#[derive(Debug, Error)]
pub enum SetupError {
    #[error("csrf token field is missing or empty")]
    MissingCsrfToken,
    #[error("table card {0} is registered twice")]
    DuplicateCard(String),
}

/// Raised by a single toggle request.
#[derive(Debug, Error)]
pub enum ToggleError {
    #[error("toggle request failed: {0}")]
    Transport(#[from] reqwest::Error),
    #[error("toggle endpoint answered {status}: {body}")]
    Status { status: u16, body: String },
    #[error("toggle response is not valid json: {0}")]
    Decode(#[from] serde_json::Error),
    #[error("toggle response has no is_occupied flag")]
    MalformedResponse,
}
