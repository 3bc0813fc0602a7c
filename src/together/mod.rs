pub mod image_client;

use crate::{
    error::Result,
    models::{GenerationResult, ImageGenerationParams},
};
use async_trait::async_trait;

pub use image_client::ImageClient;

/// Anything able to turn generation parameters into an image artifact.
#[async_trait]
pub trait ImageGenerator: Send + Sync {
    async fn generate(&self, params: ImageGenerationParams, api_key: &str)
        -> Result<GenerationResult>;
}
