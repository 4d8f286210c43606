//! Transport for model calls (Bedrock Converse through the AWS CLI).

use super::types::{ContentBlock, ModelRequest, ModelResponse};
use crate::defaults;
use crate::error::{RecapError, Result};
use crate::exec::CommandExecutor;
use std::ffi::OsString;
use std::sync::Mutex;

/// Trait for sending a request to a hosted chat model.
///
/// Implementations only move bytes: they return the decoded envelope, or
/// `None` when the service answered with nothing. Shape validation happens
/// in [`super::invoker`].
#[async_trait::async_trait]
pub trait ModelClient: Send + Sync {
    async fn converse(&self, request: &ModelRequest) -> Result<Option<ModelResponse>>;
}

/// Bedrock via `aws bedrock-runtime converse`.
///
/// The request is written to a temporary JSON file and passed with
/// `--cli-input-json file://...`, so prompt size is not bounded by the
/// OS argument length limit.
pub struct BedrockCliClient<E: CommandExecutor> {
    executor: E,
}

impl<E: CommandExecutor> BedrockCliClient<E> {
    pub fn new(executor: E) -> Self {
        Self { executor }
    }
}

#[async_trait::async_trait]
impl<E: CommandExecutor> ModelClient for BedrockCliClient<E> {
    async fn converse(&self, request: &ModelRequest) -> Result<Option<ModelResponse>> {
        let body = serde_json::to_vec(request)?;
        let request_file = tempfile::Builder::new()
            .prefix("recap-converse-")
            .suffix(".json")
            .tempfile()?;
        tokio::fs::write(request_file.path(), body).await?;

        let mut input_uri = OsString::from("file://");
        input_uri.push(request_file.path());
        let args = vec![
            OsString::from("bedrock-runtime"),
            OsString::from("converse"),
            OsString::from("--cli-input-json"),
            input_uri,
            OsString::from("--output"),
            OsString::from("json"),
        ];
        let stdout = self
            .executor
            .execute(defaults::AWS_CLI, &args)
            .await
            .map_err(|e| RecapError::ModelInvocation {
                message: e.to_string(),
            })?;

        parse_response(&stdout)
    }
}

/// Decode the CLI's stdout. Blank output or JSON `null` is no envelope.
pub fn parse_response(stdout: &str) -> Result<Option<ModelResponse>> {
    let trimmed = stdout.trim();
    if trimmed.is_empty() {
        return Ok(None);
    }
    Ok(serde_json::from_str(trimmed)?)
}

#[derive(Debug, Clone)]
enum Reply {
    Envelope(Option<ModelResponse>),
    Transport(String),
}

/// Mock model client for testing.
///
/// Returns the same configured reply to every call and records requests.
#[derive(Debug)]
pub struct MockModelClient {
    reply: Reply,
    requests: Mutex<Vec<ModelRequest>>,
}

impl MockModelClient {
    fn with_reply(reply: Reply) -> Self {
        Self {
            reply,
            requests: Mutex::new(Vec::new()),
        }
    }

    /// Reply with a well-formed message holding one text block.
    pub fn replying(text: &str) -> Self {
        Self::with_response(Some(ModelResponse::message(vec![ContentBlock::text(text)])))
    }

    /// Reply with an arbitrary envelope, or none.
    pub fn with_response(response: Option<ModelResponse>) -> Self {
        Self::with_reply(Reply::Envelope(response))
    }

    /// Fail every call at the transport level.
    pub fn failing(message: &str) -> Self {
        Self::with_reply(Reply::Transport(message.to_string()))
    }

    /// Requests received so far.
    pub fn requests(&self) -> Vec<ModelRequest> {
        self.requests.lock().map(|r| r.clone()).unwrap_or_default()
    }
}

#[async_trait::async_trait]
impl ModelClient for MockModelClient {
    async fn converse(&self, request: &ModelRequest) -> Result<Option<ModelResponse>> {
        if let Ok(mut requests) = self.requests.lock() {
            requests.push(request.clone());
        }
        match &self.reply {
            Reply::Envelope(response) => Ok(response.clone()),
            Reply::Transport(message) => Err(RecapError::ModelInvocation {
                message: message.clone(),
            }),
        }
    }
}
