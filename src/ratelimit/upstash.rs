use crate::{
    config::{RateLimitConfig, UpstashConfig},
    error::{GenerationError, Result},
    ratelimit::{RateLimitDecision, RateLimiter},
};
use async_trait::async_trait;
use chrono::Utc;
use reqwest::Client;
use serde_json::{json, Value};

/// Increments the window counter and arms its expiry on the first hit.
const FIXED_WINDOW_SCRIPT: &str = r#"
local key = KEYS[1]
local window = ARGV[1]
local incrementBy = ARGV[2]

local r = redis.call("INCRBY", key, incrementBy)
if r == tonumber(incrementBy) then
  redis.call("PEXPIRE", key, window)
end

return r
"#;

/// Fixed-window limiter over the Upstash Redis REST API.
pub struct UpstashRateLimiter {
    client: Client,
    base_url: String,
    token: String,
    settings: RateLimitConfig,
}

impl UpstashRateLimiter {
    pub fn new(config: UpstashConfig, settings: RateLimitConfig) -> Result<Self> {
        let base_url = config
            .url
            .ok_or_else(|| GenerationError::Config("Upstash URL is required".into()))?;

        let token = config
            .token
            .ok_or_else(|| GenerationError::Config("Upstash token is required".into()))?;

        Ok(Self {
            client: Client::new(),
            base_url: base_url.trim_end_matches('/').to_string(),
            token,
            settings,
        })
    }

    /// Window index that `now_ms` falls into.
    pub fn bucket(&self, now_ms: u64) -> u64 {
        now_ms / self.settings.window_ms()
    }

    pub fn window_key(&self, identity: &str, bucket: u64) -> String {
        format!("{}:{}:{}", self.settings.prefix, identity, bucket)
    }

    fn decide(&self, used: u64, bucket: u64) -> RateLimitDecision {
        let reset = (bucket + 1) * self.settings.window_ms();
        RateLimitDecision::from_usage(used, self.settings.limit, reset)
    }

    fn parse_reply(reply: &Value) -> Result<u64> {
        if let Some(error) = reply.get("error").and_then(|e| e.as_str()) {
            return Err(GenerationError::Store(format!("Upstash error: {}", error)));
        }

        reply
            .get("result")
            .and_then(|r| r.as_u64())
            .ok_or_else(|| GenerationError::Store(format!("Unexpected Upstash reply: {}", reply)))
    }

    async fn eval_window(&self, key: &str) -> Result<u64> {
        let command = json!([
            "EVAL",
            FIXED_WINDOW_SCRIPT,
            1,
            key,
            self.settings.window_ms(),
            1
        ]);

        let response = self
            .client
            .post(&self.base_url)
            .bearer_auth(&self.token)
            .json(&command)
            .send()
            .await
            .map_err(|e| GenerationError::Store(format!("Upstash request failed: {}", e)))?;

        // Upstash answers command errors with a JSON body and a 4xx status.
        let status = response.status();
        let reply: Value = response.json().await.map_err(|e| {
            GenerationError::Store(format!(
                "Failed to parse Upstash response ({}): {}",
                status, e
            ))
        })?;

        Self::parse_reply(&reply)
    }
}

#[async_trait]
impl RateLimiter for UpstashRateLimiter {
    async fn limit(&self, identity: &str) -> Result<RateLimitDecision> {
        let now_ms = Utc::now().timestamp_millis().max(0) as u64;
        let bucket = self.bucket(now_ms);
        let key = self.window_key(identity, bucket);

        let used = self.eval_window(&key).await?;
        let decision = self.decide(used, bucket);

        log::debug!(
            "Rate limit for {}: {}/{} used, resets at {}",
            identity,
            used,
            decision.limit,
            decision.reset
        );

        Ok(decision)
    }
}
