//! Hosted chat model invocation.

pub mod client;
pub mod invoker;
pub mod types;

pub use client::{BedrockCliClient, MockModelClient, ModelClient};
pub use invoker::{ModelInvoker, validate_response};
pub use types::{ContentBlock, Message, ModelRequest, ModelResponse, ResponseOutput, Role};
