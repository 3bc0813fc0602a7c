use actix_web::{http::StatusCode, HttpResponse, ResponseError};
use serde_json::json;

/// Message returned to anonymous callers once their daily quota is spent.
pub const RATE_LIMITED_MESSAGE: &str =
    "Everything is over between you and me for 24hours , Give your own api-key";

#[derive(Debug, thiserror::Error)]
pub enum GenerationError {
    #[error("Validation error: {0}")]
    Validation(String),
    #[error("{}", RATE_LIMITED_MESSAGE)]
    RateLimited,
    #[error("Upstream error: {0}")]
    Upstream(String),
    #[error("Rate limit store error: {0}")]
    Store(String),
    #[error("Configuration error: {0}")]
    Config(String),
    #[error("Request body exceeds {0} bytes")]
    PayloadTooLarge(usize),
}

impl ResponseError for GenerationError {
    fn status_code(&self) -> StatusCode {
        match self {
            GenerationError::Validation(_) => StatusCode::BAD_REQUEST,
            GenerationError::RateLimited => StatusCode::TOO_MANY_REQUESTS,
            GenerationError::PayloadTooLarge(_) => StatusCode::PAYLOAD_TOO_LARGE,
            GenerationError::Upstream(_)
            | GenerationError::Store(_)
            | GenerationError::Config(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    fn error_response(&self) -> HttpResponse {
        let mut builder = HttpResponse::build(self.status_code());
        match self {
            // The browser shows this string as-is, so it is sent as a bare JSON string.
            GenerationError::RateLimited => builder.json(RATE_LIMITED_MESSAGE),
            other => builder.json(json!({ "error": other.to_string() })),
        }
    }
}

pub type Result<T> = std::result::Result<T, GenerationError>;
