use super::client::ModelClient;
use super::types::{ContentBlock, ModelRequest, ModelResponse, ResponseOutput};
use crate::error::{RecapError, Result};

/// Extract the reply text from a model response.
///
/// Checks run in a fixed order and each has its own error: no envelope,
/// output not a message, no content blocks, first block not text, empty
/// text. Blocks after the first are ignored.
pub fn validate_response(response: Option<ModelResponse>) -> Result<String> {
    let response = response.ok_or(RecapError::EmptyModelResponse)?;

    if let Some(usage) = &response.usage {
        tracing::debug!(
            input_tokens = usage.input_tokens,
            output_tokens = usage.output_tokens,
            stop_reason = response.stop_reason.as_deref().unwrap_or("unknown"),
            "model usage"
        );
    }

    let message = match response.output {
        Some(ResponseOutput::Message(message)) => message,
        Some(ResponseOutput::Other(kind)) => {
            return Err(RecapError::UnexpectedResponseType { kind });
        }
        None => {
            return Err(RecapError::UnexpectedResponseType {
                kind: "none".to_string(),
            });
        }
    };

    let first = message
        .content
        .into_iter()
        .next()
        .ok_or(RecapError::EmptyModelContent)?;

    match first {
        ContentBlock::Text(text) if text.is_empty() => Err(RecapError::EmptyModelText),
        ContentBlock::Text(text) => Ok(text),
        ContentBlock::Other(kind) => Err(RecapError::UnexpectedContentBlock { kind }),
    }
}

/// Sends a single prompt to a fixed model and returns its reply.
pub struct ModelInvoker<'a> {
    client: &'a dyn ModelClient,
    model_id: String,
    max_tokens: Option<u32>,
}

impl<'a> ModelInvoker<'a> {
    pub fn new(client: &'a dyn ModelClient, model_id: &str) -> Self {
        Self {
            client,
            model_id: model_id.to_string(),
            max_tokens: None,
        }
    }

    pub fn with_max_tokens(mut self, max_tokens: Option<u32>) -> Self {
        self.max_tokens = max_tokens;
        self
    }

    /// One request, no retry. Transport errors propagate unchanged.
    pub async fn invoke(&self, prompt: &str) -> Result<String> {
        tracing::info!("Calling model '{}'...", self.model_id);
        let request = ModelRequest::single_prompt(&self.model_id, prompt, self.max_tokens);
        let response = self.client.converse(&request).await?;
        validate_response(response)
    }
}
