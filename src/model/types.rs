//! Request and response envelopes for the Bedrock Converse API.
//!
//! Content blocks and response outputs are unions keyed by a single JSON
//! field (`{"text": ...}`, `{"message": ...}`). Only the text and message
//! variants are understood; anything else is kept as `Other(kind)` so the
//! validator can report what it received.

use serde::ser::SerializeMap;
use serde::{Deserialize, Serialize, Serializer};
use serde_json::{Map, Value};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    User,
    Assistant,
}

/// One block of message content.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(try_from = "Map<String, Value>")]
pub enum ContentBlock {
    Text(String),
    /// A block kind this crate does not handle (image, toolUse, ...).
    Other(String),
}

impl ContentBlock {
    pub fn text(value: &str) -> Self {
        ContentBlock::Text(value.to_string())
    }

    /// Wire name of the block kind.
    pub fn kind(&self) -> &str {
        match self {
            ContentBlock::Text(_) => "text",
            ContentBlock::Other(kind) => kind,
        }
    }
}

impl TryFrom<Map<String, Value>> for ContentBlock {
    type Error = String;

    fn try_from(map: Map<String, Value>) -> Result<Self, Self::Error> {
        if let Some(value) = map.get("text") {
            return value
                .as_str()
                .map(ContentBlock::text)
                .ok_or_else(|| "text content block is not a string".to_string());
        }
        map.keys()
            .next()
            .map(|kind| ContentBlock::Other(kind.clone()))
            .ok_or_else(|| "empty content block".to_string())
    }
}

impl Serialize for ContentBlock {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(1))?;
        match self {
            ContentBlock::Text(value) => map.serialize_entry("text", value)?,
            ContentBlock::Other(kind) => map.serialize_entry(kind, &Map::new())?,
        }
        map.end()
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Message {
    pub role: Role,
    #[serde(default)]
    pub content: Vec<ContentBlock>,
}

impl Message {
    /// A user message holding a single text block.
    pub fn user_text(text: &str) -> Self {
        Self {
            role: Role::User,
            content: vec![ContentBlock::text(text)],
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct InferenceConfig {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub max_tokens: Option<u32>,
}

/// Body of a Converse call.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ModelRequest {
    pub model_id: String,
    pub messages: Vec<Message>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub inference_config: Option<InferenceConfig>,
}

impl ModelRequest {
    /// Single-turn request: one user message with the whole prompt.
    pub fn single_prompt(model_id: &str, prompt: &str, max_tokens: Option<u32>) -> Self {
        Self {
            model_id: model_id.to_string(),
            messages: vec![Message::user_text(prompt)],
            inference_config: max_tokens.map(|max_tokens| InferenceConfig {
                max_tokens: Some(max_tokens),
            }),
        }
    }
}

/// The `output` union of a Converse response.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(try_from = "Map<String, Value>")]
pub enum ResponseOutput {
    Message(Message),
    Other(String),
}

impl TryFrom<Map<String, Value>> for ResponseOutput {
    type Error = String;

    fn try_from(mut map: Map<String, Value>) -> Result<Self, Self::Error> {
        if let Some(value) = map.remove("message") {
            return serde_json::from_value(value)
                .map(ResponseOutput::Message)
                .map_err(|e| format!("invalid message output: {e}"));
        }
        map.keys()
            .next()
            .map(|kind| ResponseOutput::Other(kind.clone()))
            .ok_or_else(|| "empty output".to_string())
    }
}

#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct TokenUsage {
    pub input_tokens: u64,
    pub output_tokens: u64,
    pub total_tokens: u64,
}

/// Converse response envelope.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ModelResponse {
    #[serde(default)]
    pub output: Option<ResponseOutput>,
    #[serde(default)]
    pub stop_reason: Option<String>,
    #[serde(default)]
    pub usage: Option<TokenUsage>,
}

impl ModelResponse {
    /// Response carrying an assistant message with the given blocks.
    pub fn message(content: Vec<ContentBlock>) -> Self {
        Self {
            output: Some(ResponseOutput::Message(Message {
                role: Role::Assistant,
                content,
            })),
            ..Self::default()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_request_serializes_to_converse_shape() {
        let request = ModelRequest::single_prompt("model-x", "Summarize:\nhi", None);
        let value = serde_json::to_value(&request).unwrap();

        assert_eq!(
            value,
            json!({
                "modelId": "model-x",
                "messages": [
                    {"role": "user", "content": [{"text": "Summarize:\nhi"}]}
                ]
            })
        );
    }

    #[test]
    fn test_request_with_max_tokens() {
        let request = ModelRequest::single_prompt("m", "p", Some(512));
        let value = serde_json::to_value(&request).unwrap();
        assert_eq!(value["inferenceConfig"], json!({"maxTokens": 512}));
    }

    #[test]
    fn test_parse_message_response() {
        let json = r#"{
            "output": {
                "message": {
                    "role": "assistant",
                    "content": [{"text": "hello"}, {"text": "ignored"}]
                }
            },
            "stopReason": "end_turn",
            "usage": {"inputTokens": 12, "outputTokens": 3, "totalTokens": 15},
            "metrics": {"latencyMs": 420}
        }"#;
        let response: ModelResponse = serde_json::from_str(json).unwrap();

        assert_eq!(
            response.output,
            Some(ResponseOutput::Message(Message {
                role: Role::Assistant,
                content: vec![ContentBlock::text("hello"), ContentBlock::text("ignored")],
            }))
        );
        assert_eq!(response.stop_reason.as_deref(), Some("end_turn"));
        assert_eq!(response.usage.unwrap().total_tokens, 15);
    }

    #[test]
    fn test_unknown_content_block_kept_as_other() {
        let block: ContentBlock =
            serde_json::from_str(r#"{"toolUse": {"toolUseId": "t1", "name": "x", "input": {}}}"#)
                .unwrap();
        assert_eq!(block, ContentBlock::Other("toolUse".to_string()));
        assert_eq!(block.kind(), "toolUse");
    }

    #[test]
    fn test_unknown_output_kept_as_other() {
        let response: ModelResponse =
            serde_json::from_str(r#"{"output": {"audio": {}}}"#).unwrap();
        assert_eq!(
            response.output,
            Some(ResponseOutput::Other("audio".to_string()))
        );
    }

    #[test]
    fn test_missing_output_is_none() {
        let response: ModelResponse = serde_json::from_str(r#"{"stopReason": "x"}"#).unwrap();
        assert_eq!(response.output, None);
    }

    #[test]
    fn test_non_string_text_is_rejected() {
        let result = serde_json::from_str::<ContentBlock>(r#"{"text": 42}"#);
        assert!(result.is_err());
    }

    #[test]
    fn test_empty_block_is_rejected() {
        assert!(serde_json::from_str::<ContentBlock>("{}").is_err());
    }
}
