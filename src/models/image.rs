use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

pub const IMAGE_MODEL: &str = "black-forest-labs/FLUX.1-schnell";
pub const IMAGE_WIDTH: u32 = 1024;
pub const IMAGE_HEIGHT: u32 = 768;
pub const IMAGE_STEPS: u32 = 4;
/// Seed pinned in iterative mode so successive prompts stay visually related.
pub const ITERATIVE_SEED: u64 = 123;

/// Payload sent to the image generation endpoint.
#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct ImageGenerationParams {
    pub model: String,
    pub prompt: String,
    pub width: u32,
    pub height: u32,
    pub steps: u32,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub seed: Option<u64>,
    pub response_format: String,
}

impl ImageGenerationParams {
    pub fn for_prompt(prompt: impl Into<String>, iterative_mode: bool) -> Self {
        Self {
            model: IMAGE_MODEL.to_string(),
            prompt: prompt.into(),
            width: IMAGE_WIDTH,
            height: IMAGE_HEIGHT,
            steps: IMAGE_STEPS,
            seed: iterative_mode.then_some(ITERATIVE_SEED),
            response_format: "base64".to_string(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Timings {
    pub inference: f64,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

/// First image artifact returned upstream, relayed to the browser as-is.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct GenerationResult {
    pub b64_json: String,
    pub timings: Timings,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

#[derive(Debug, Deserialize)]
pub struct TogetherImageResponse {
    pub data: Vec<GenerationResult>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_iterative_mode_pins_seed() {
        let params = ImageGenerationParams::for_prompt("a lighthouse", true);
        let payload = serde_json::to_value(&params).unwrap();
        assert_eq!(
            payload,
            json!({
                "model": "black-forest-labs/FLUX.1-schnell",
                "prompt": "a lighthouse",
                "width": 1024,
                "height": 768,
                "steps": 4,
                "seed": 123,
                "response_format": "base64"
            })
        );
    }

    #[test]
    fn test_non_iterative_mode_omits_seed() {
        let params = ImageGenerationParams::for_prompt("a lighthouse", false);
        let payload = serde_json::to_value(&params).unwrap();
        assert!(payload.get("seed").is_none());
        assert_eq!(payload["prompt"], "a lighthouse");
    }

    #[test]
    fn test_result_preserves_extra_fields() {
        let raw = json!({
            "index": 0,
            "b64_json": "aGVsbG8=",
            "timings": { "inference": 0.42, "queue": 0.05 }
        });
        let result: GenerationResult = serde_json::from_value(raw.clone()).unwrap();
        assert_eq!(result.timings.inference, 0.42);
        assert_eq!(result.timings.extra["queue"], 0.05);
        assert_eq!(serde_json::to_value(&result).unwrap(), raw);
    }
}
