//! recap - Transcribe an audio file and summarize it with a hosted model
//!
//! Converts the input to MP3, uploads it to S3, runs an Amazon Transcribe
//! job, and sends the transcript with a prompt to a Bedrock chat model.

#![warn(clippy::unwrap_used)]
#![warn(clippy::expect_used)]
#![warn(clippy::let_underscore_must_use)]

pub mod app;
#[cfg(feature = "cli")]
pub mod cli;
pub mod config;
pub mod defaults;
#[cfg(feature = "cli")]
pub mod diagnostics;
pub mod error;
pub mod exec;
pub mod logging;
pub mod model;
pub mod output;
pub mod prompt;
pub mod storage;
pub mod transcode;
pub mod transcribe;
pub mod transcript;

// External service seams
pub use exec::{CommandExecutor, SystemCommandExecutor};
pub use model::ModelClient;
pub use storage::ObjectStore;
pub use transcribe::TranscriptionService;

// Pipeline
pub use app::{Collaborators, PipelineError, RunOptions, RunSummary, Stage, run_pipeline};
pub use transcribe::{PollPolicy, await_completion};

// Error handling
pub use error::{RecapError, Result};

// Config
pub use config::Config;

/// Build version string with optional git commit hash.
///
/// Returns `"0.1.0+abc1234"` when git hash is available, `"0.1.0"` otherwise.
pub fn version_string() -> String {
    let version = env!("CARGO_PKG_VERSION");
    match option_env!("GIT_HASH") {
        Some(hash) if !hash.is_empty() => format!("{}+{}", version, hash),
        _ => version.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn version_string_starts_with_cargo_version() {
        let ver = version_string();
        assert!(
            ver.starts_with(env!("CARGO_PKG_VERSION")),
            "version_string should start with CARGO_PKG_VERSION, got: {}",
            ver
        );
    }

    #[test]
    fn version_string_has_hash_suffix_only_with_git_hash() {
        let ver = version_string();
        if option_env!("GIT_HASH").is_some_and(|h| !h.is_empty()) {
            let hash_part = ver.split('+').nth(1).unwrap_or("");
            assert_eq!(hash_part.len(), 7, "Git hash should be 7 chars, got: {}", hash_part);
        } else {
            assert_eq!(ver, env!("CARGO_PKG_VERSION"));
        }
    }
}
