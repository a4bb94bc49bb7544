use axum::http::StatusCode;

/// Failure reported by the loan service client. `Display` is the message
/// shown to the user.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum ServiceError {
    #[error("{message}")]
    Rejected { status: u16, message: String },
    #[error("{message}")]
    NotFound { status: u16, message: String },
    #[error("Unable to reach loan service: {0}")]
    Transport(String),
    #[error("Unexpected response from loan service: {0}")]
    Malformed(String),
}

impl ServiceError {
    pub fn status(&self) -> Option<u16> {
        match self {
            Self::Rejected { status, .. } | Self::NotFound { status, .. } => Some(*status),
            Self::Transport(_) | Self::Malformed(_) => None,
        }
    }
}

#[derive(Debug)]
pub struct AppError {
    pub status: StatusCode,
    pub message: String,
}

impl AppError {
    pub fn bad_request(message: impl Into<String>) -> Self {
        Self {
            status: StatusCode::BAD_REQUEST,
            message: message.into(),
        }
    }
}

impl axum::response::IntoResponse for AppError {
    fn into_response(self) -> axum::response::Response {
        (self.status, self.message).into_response()
    }
}
