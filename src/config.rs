use std::env;

pub const DEFAULT_TOGETHER_BASE_URL: &str = "https://api.together.xyz/v1";
pub const DEFAULT_HOST: &str = "127.0.0.1";
pub const DEFAULT_PORT: u16 = 8080;

#[derive(Debug, Clone)]
pub struct UpstashConfig {
    pub url: Option<String>,
    pub token: Option<String>,
}

#[derive(Debug, Clone)]
pub struct TogetherConfig {
    pub api_key: Option<String>,
    pub base_url: String,
}

/// Fixed-window quota applied to callers without their own API key.
#[derive(Debug, Clone, PartialEq)]
pub struct RateLimitConfig {
    pub prefix: String,
    pub limit: u64,
    pub window_minutes: u64,
}

#[derive(Debug, Clone)]
pub struct Config {
    pub host: String,
    pub port: u16,
    pub together: TogetherConfig,
    /// `None` disables rate limiting entirely.
    pub upstash: Option<UpstashConfig>,
    pub rate_limit: RateLimitConfig,
}

impl Default for UpstashConfig {
    fn default() -> Self {
        UpstashConfig {
            url: None,
            token: None,
        }
    }
}

impl UpstashConfig {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_credentials(mut self, url: impl Into<String>, token: impl Into<String>) -> Self {
        self.url = Some(url.into());
        self.token = Some(token.into());
        self
    }

    /// Returns `None` unless `UPSTASH_REDIS_REST_URL` is set.
    pub fn from_env() -> Option<Self> {
        Self::from_lookup(|name| env::var(name).ok())
    }

    fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Option<Self> {
        let url = non_empty(lookup("UPSTASH_REDIS_REST_URL"))?;
        let token = non_empty(lookup("UPSTASH_REDIS_REST_TOKEN"));

        Some(UpstashConfig {
            url: Some(url),
            token,
        })
    }
}

impl Default for TogetherConfig {
    fn default() -> Self {
        TogetherConfig {
            api_key: None,
            base_url: DEFAULT_TOGETHER_BASE_URL.to_string(),
        }
    }
}

impl TogetherConfig {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_api_key(mut self, api_key: impl Into<String>) -> Self {
        self.api_key = Some(api_key.into());
        self
    }

    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into();
        self
    }

    pub fn from_env() -> Self {
        Self::from_lookup(|name| env::var(name).ok())
    }

    fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        let api_key = non_empty(lookup("TOGETHER_API_KEY"));
        let base_url = non_empty(lookup("TOGETHER_BASE_URL"))
            .unwrap_or_else(|| DEFAULT_TOGETHER_BASE_URL.to_string());

        TogetherConfig { api_key, base_url }
    }
}

impl Default for RateLimitConfig {
    fn default() -> Self {
        RateLimitConfig {
            prefix: "contimagen".to_string(),
            limit: 300,
            window_minutes: 1440,
        }
    }
}

impl RateLimitConfig {
    pub fn window_ms(&self) -> u64 {
        self.window_minutes * 60 * 1000
    }
}

impl Default for Config {
    fn default() -> Self {
        Config {
            host: DEFAULT_HOST.to_string(),
            port: DEFAULT_PORT,
            together: TogetherConfig::default(),
            upstash: None,
            rate_limit: RateLimitConfig::default(),
        }
    }
}

impl Config {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_env() -> Self {
        Self::from_lookup(|name| env::var(name).ok())
    }

    fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        let host = non_empty(lookup("HOST")).unwrap_or_else(|| DEFAULT_HOST.to_string());
        let port = lookup("PORT")
            .and_then(|port| port.parse().ok())
            .unwrap_or(DEFAULT_PORT);

        Config {
            host,
            port,
            together: TogetherConfig::from_lookup(&lookup),
            upstash: UpstashConfig::from_lookup(&lookup),
            rate_limit: RateLimitConfig::default(),
        }
    }

    pub fn with_together(mut self, config: TogetherConfig) -> Self {
        self.together = config;
        self
    }

    pub fn with_upstash(mut self, config: UpstashConfig) -> Self {
        self.upstash = Some(config);
        self
    }

    pub fn bind_address(&self) -> (String, u16) {
        (self.host.clone(), self.port)
    }

    pub fn rate_limiting_enabled(&self) -> bool {
        self.upstash.is_some()
    }
}

fn non_empty(value: Option<String>) -> Option<String> {
    value.filter(|v| !v.trim().is_empty())
}
