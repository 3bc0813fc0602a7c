use serde::{Deserialize, Deserializer};
use serde_json::Value;

use crate::error::{GenerationError, Result};

/// Body of `POST /api/imageGeneration`.
#[derive(Debug, Clone, Deserialize, PartialEq)]
pub struct GenerationRequest {
    pub prompt: String,
    #[serde(rename = "iterativeMode")]
    pub iterative_mode: bool,
    #[serde(rename = "APIKey", default, deserialize_with = "present_string")]
    pub api_key: Option<String>,
}

/// `APIKey` may be left out, but when present it has to be a string.
fn present_string<'de, D>(deserializer: D) -> std::result::Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    String::deserialize(deserializer).map(Some)
}

impl GenerationRequest {
    pub fn new(prompt: impl Into<String>, iterative_mode: bool) -> Self {
        Self {
            prompt: prompt.into(),
            iterative_mode,
            api_key: None,
        }
    }

    /// Parses and validates a raw request body.
    pub fn parse(body: &[u8]) -> Result<Self> {
        let value: Value = serde_json::from_slice(body)
            .map_err(|e| GenerationError::Validation(format!("Invalid JSON body: {}", e)))?;

        // serde would happily read a struct out of a JSON array
        if !value.is_object() {
            return Err(GenerationError::Validation(
                "Request body must be a JSON object".into(),
            ));
        }

        serde_json::from_value(value).map_err(|e| GenerationError::Validation(e.to_string()))
    }

    /// The caller's own upstream key, if one was actually supplied.
    pub fn caller_api_key(&self) -> Option<&str> {
        self.api_key.as_deref().filter(|key| !key.is_empty())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_minimal_body() {
        let request =
            GenerationRequest::parse(br#"{"prompt":"a red bicycle","iterativeMode":false}"#)
                .unwrap();
        assert_eq!(request, GenerationRequest::new("a red bicycle", false));
        assert_eq!(request.caller_api_key(), None);
    }

    #[test]
    fn test_parse_with_api_key_and_unknown_fields() {
        let request = GenerationRequest::parse(
            br#"{"prompt":"fox","iterativeMode":true,"APIKey":"tg-123","extra":1}"#,
        )
        .unwrap();
        assert!(request.iterative_mode);
        assert_eq!(request.caller_api_key(), Some("tg-123"));
    }

    #[test]
    fn test_empty_prompt_is_accepted() {
        let request = GenerationRequest::parse(br#"{"prompt":"","iterativeMode":false}"#).unwrap();
        assert!(request.prompt.is_empty());
    }

    #[test]
    fn test_empty_api_key_counts_as_absent() {
        let request =
            GenerationRequest::parse(br#"{"prompt":"fox","iterativeMode":true,"APIKey":""}"#)
                .unwrap();
        assert_eq!(request.api_key.as_deref(), Some(""));
        assert_eq!(request.caller_api_key(), None);
    }

    #[test]
    fn test_rejects_malformed_bodies() {
        let bodies: [&[u8]; 8] = [
            b"",
            b"not json",
            br#"{"iterativeMode":false}"#,
            br#"{"prompt":"fox"}"#,
            br#"{"prompt":42,"iterativeMode":false}"#,
            br#"{"prompt":"fox","iterativeMode":"true"}"#,
            br#"{"prompt":"fox","iterativeMode":false,"APIKey":null}"#,
            br#"["fox", false]"#,
        ];

        for body in bodies {
            let err = GenerationRequest::parse(body).unwrap_err();
            assert!(
                matches!(err, GenerationError::Validation(_)),
                "expected validation error for {:?}",
                String::from_utf8_lossy(body)
            );
        }
    }
}
