use crate::{
    config::TogetherConfig,
    error::{GenerationError, Result},
    models::{GenerationResult, ImageGenerationParams, TogetherImageResponse},
    together::ImageGenerator,
};
use async_trait::async_trait;
use reqwest::{Client, StatusCode};

/// Together AI `images/generations` client.
#[derive(Clone)]
pub struct ImageClient {
    client: Client,
    base_url: String,
}

impl ImageClient {
    pub fn new(config: &TogetherConfig) -> Self {
        Self {
            client: Client::new(),
            base_url: config.base_url.trim_end_matches('/').to_string(),
        }
    }

    pub fn endpoint(&self) -> String {
        format!("{}/images/generations", self.base_url)
    }

    fn parse_response(status: StatusCode, body: &str) -> Result<GenerationResult> {
        if !status.is_success() {
            return Err(GenerationError::Upstream(format!("{} {}", status.as_u16(), body)));
        }

        let response: TogetherImageResponse = serde_json::from_str(body).map_err(|e| {
            GenerationError::Upstream(format!("Failed to parse image response: {}", e))
        })?;

        response
            .data
            .into_iter()
            .next()
            .ok_or_else(|| GenerationError::Upstream("No images generated".into()))
    }
}

#[async_trait]
impl ImageGenerator for ImageClient {
    async fn generate(
        &self,
        params: ImageGenerationParams,
        api_key: &str,
    ) -> Result<GenerationResult> {
        log::info!("Generating image with model: {}", params.model);
        log::debug!(
            "Image request: {}x{}, {} steps, seed {:?}",
            params.width,
            params.height,
            params.steps,
            params.seed
        );

        let response = self
            .client
            .post(self.endpoint())
            .bearer_auth(api_key)
            .json(&params)
            .send()
            .await
            .map_err(|e| GenerationError::Upstream(format!("Together request failed: {}", e)))?;

        let status = response.status();
        let body = response.text().await.map_err(|e| {
            GenerationError::Upstream(format!("Failed to read image response: {}", e))
        })?;

        Self::parse_response(status, &body)
    }
}
