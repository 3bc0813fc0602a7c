pub mod config;
pub mod error;
pub mod handler;
pub mod identity;
pub mod logger;
pub mod models;
pub mod ratelimit;
pub mod server;
pub mod together;

#[cfg(test)]
pub(crate) mod testing;

pub use config::{Config, RateLimitConfig, TogetherConfig, UpstashConfig};
pub use error::{GenerationError, Result};
pub use handler::ImageGenerationHandler;
pub use models::{GenerationRequest, GenerationResult, ImageGenerationParams};
pub use ratelimit::{RateLimitDecision, RateLimiter, UpstashRateLimiter};
pub use together::{ImageClient, ImageGenerator};
