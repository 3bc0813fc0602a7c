use std::sync::Arc;

use actix_web::http::header::HeaderMap;
use uuid::Uuid;

use crate::{
    config::Config,
    error::{GenerationError, Result},
    identity::client_identity,
    models::{GenerationRequest, GenerationResult, ImageGenerationParams},
    ratelimit::{RateLimiter, UpstashRateLimiter},
    together::{ImageClient, ImageGenerator},
};

/// Serves `POST /api/imageGeneration`.
///
/// Pipeline:
/// 1. Validate the body
/// 2. Pick the upstream key (caller's own, else the server default)
/// 3. Anonymous callers only: count the request against their identity
/// 4. Generate the image with fixed parameters
/// 5. Hand back the first artifact untouched
#[derive(Clone)]
pub struct ImageGenerationHandler {
    generator: Arc<dyn ImageGenerator>,
    rate_limiter: Option<Arc<dyn RateLimiter>>,
    default_api_key: Option<String>,
}

impl ImageGenerationHandler {
    pub fn new(generator: Arc<dyn ImageGenerator>) -> Self {
        Self {
            generator,
            rate_limiter: None,
            default_api_key: None,
        }
    }

    pub fn with_rate_limiter(mut self, rate_limiter: Arc<dyn RateLimiter>) -> Self {
        self.rate_limiter = Some(rate_limiter);
        self
    }

    pub fn with_default_api_key(mut self, api_key: impl Into<String>) -> Self {
        self.default_api_key = Some(api_key.into());
        self
    }

    /// Wires the Together client and, when configured, the Upstash limiter.
    pub fn from_config(config: &Config) -> Result<Self> {
        let mut handler = Self::new(Arc::new(ImageClient::new(&config.together)));

        if let Some(api_key) = &config.together.api_key {
            handler = handler.with_default_api_key(api_key.clone());
        }

        if let Some(upstash) = &config.upstash {
            let limiter = UpstashRateLimiter::new(upstash.clone(), config.rate_limit.clone())?;
            handler = handler.with_rate_limiter(Arc::new(limiter));
        }

        Ok(handler)
    }

    pub fn rate_limited(&self) -> bool {
        self.rate_limiter.is_some()
    }

    /// Caller key first, then the server default. Empty keys count as missing.
    fn select_api_key<'a>(&'a self, request: &'a GenerationRequest) -> Option<&'a str> {
        request
            .caller_api_key()
            .or_else(|| self.default_api_key.as_deref().filter(|key| !key.is_empty()))
    }

    pub async fn handle(&self, headers: &HeaderMap, body: &[u8]) -> Result<GenerationResult> {
        let request_id = Uuid::new_v4();

        let request = GenerationRequest::parse(body).map_err(|e| {
            log::warn!("[req:{}] Rejected request body: {}", request_id, e);
            e
        })?;

        log::debug!(
            "[req:{}] Image request: prompt_len={}, iterative={}, own_key={}",
            request_id,
            request.prompt.len(),
            request.iterative_mode,
            request.caller_api_key().is_some()
        );

        let api_key = self.select_api_key(&request).map(String::from).ok_or_else(|| {
            log::error!("[req:{}] No upstream API key available", request_id);
            GenerationError::Config(
                "No API key supplied and TOGETHER_API_KEY is not set".into(),
            )
        })?;

        if let (Some(limiter), None) = (&self.rate_limiter, request.caller_api_key()) {
            let identity = client_identity(headers);
            let decision = limiter.limit(&identity).await.map_err(|e| {
                log::error!("[req:{}] Rate limit check failed: {}", request_id, e);
                e
            })?;

            if !decision.success {
                log::warn!(
                    "[req:{}] Rate limited {} until {}",
                    request_id,
                    identity,
                    decision.reset
                );
                return Err(GenerationError::RateLimited);
            }

            log::debug!(
                "[req:{}] {} has {} requests left",
                request_id,
                identity,
                decision.remaining
            );
        }

        let params = ImageGenerationParams::for_prompt(request.prompt, request.iterative_mode);
        let result = self.generator.generate(params, &api_key).await.map_err(|e| {
            log::error!("[req:{}] Image generation failed: {}", request_id, e);
            e
        })?;

        log::info!(
            "[req:{}] Image generated in {:.2}s",
            request_id,
            result.timings.inference
        );

        Ok(result)
    }
}
