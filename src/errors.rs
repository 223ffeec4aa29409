use actix_web::{http::StatusCode, HttpResponse, ResponseError};
use serde::Serialize;
use thiserror::Error;

#[derive(Debug, Clone, Error)]
pub enum AppError {
    #[error("Extraction failed: {0}")]
    Extraction(String),

    #[error("Generation failed: {0}")]
    Generation(String),

    #[error("Invalid payload: {0}")]
    InvalidPayload(String),

    #[error("Transport error: {0}")]
    Transport(String),

    #[error("Webhook verification failed")]
    VerificationFailed,

    #[error("Internal server error: {0}")]
    InternalError(String),
}

impl AppError {
    fn error_code(&self) -> &'static str {
        match self {
            AppError::Extraction(_) => "EXTRACTION_FAILED",
            AppError::Generation(_) => "GENERATION_FAILED",
            AppError::InvalidPayload(_) => "INVALID_PAYLOAD",
            AppError::Transport(_) => "TRANSPORT_ERROR",
            AppError::VerificationFailed => "VERIFICATION_FAILED",
            AppError::InternalError(_) => "INTERNAL_ERROR",
        }
    }
}

#[derive(Debug, Serialize)]
pub struct ErrorResponse {
    pub error: String,
    pub code: u16,
}

impl ResponseError for AppError {
    fn status_code(&self) -> StatusCode {
        match self {
            AppError::InvalidPayload(_) => StatusCode::BAD_REQUEST,
            AppError::VerificationFailed => StatusCode::FORBIDDEN,
            AppError::Extraction(_)
            | AppError::Generation(_)
            | AppError::Transport(_)
            | AppError::InternalError(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    fn error_response(&self) -> HttpResponse {
        log::warn!("{}: {}", self.error_code(), self);
        HttpResponse::build(self.status_code()).json(ErrorResponse {
            error: self.to_string(),
            code: self.status_code().as_u16(),
        })
    }
}

pub type AppResult<T> = Result<T, AppError>;
