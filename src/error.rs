//! Error types for recap.

use thiserror::Error;

#[derive(Error, Debug)]
pub enum RecapError {
    // Configuration errors
    #[error("Configuration file not found at {path}")]
    ConfigFileNotFound { path: String },

    #[error("Failed to parse configuration: {message}")]
    ConfigParse { message: String },

    #[error("Invalid configuration value for {key}: {message}")]
    ConfigInvalidValue { key: String, message: String },

    #[error("Prompt file not found at {path}")]
    PromptFileNotFound { path: String },

    // External process errors
    #[error("Required tool not found: {tool}")]
    ToolNotFound { tool: String },

    #[error("{command} failed with status {status}: {stderr}")]
    CommandFailed {
        command: String,
        status: String,
        stderr: String,
    },

    // Protocol errors
    #[error("Unexpected response from {source_name}: {message}")]
    Protocol {
        source_name: String,
        message: String,
    },

    #[error("Unrecognized transcription job status: {status}")]
    UnknownJobStatus { status: String },

    // Transcription job errors
    #[error("Transcription job '{job_name}' failed: {reason}")]
    JobFailed { job_name: String, reason: String },

    #[error("Transcription job '{job_name}' still running after {attempts} status checks")]
    PollAttemptsExhausted { job_name: String, attempts: u32 },

    #[error("Transcription job '{job_name}' did not finish within {waited_secs}s")]
    PollTimedOut { job_name: String, waited_secs: u64 },

    #[error("No transcript found in {location}")]
    TranscriptMissing { location: String },

    // Model response errors, in validation order
    #[error("Model invocation failed: {message}")]
    ModelInvocation { message: String },

    #[error("Empty response from model")]
    EmptyModelResponse,

    #[error("Unexpected response type from model: {kind}")]
    UnexpectedResponseType { kind: String },

    #[error("Empty content in model response")]
    EmptyModelContent,

    #[error("Unexpected content block type in model response: {kind}")]
    UnexpectedContentBlock { kind: String },

    #[error("Empty text value in model response")]
    EmptyModelText,

    // General I/O errors
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    // Generic error for cases not covered above
    #[error("{0}")]
    Other(String),
}

// Type alias for convenience
pub type Result<T> = std::result::Result<T, RecapError>;

#[cfg(test)]
mod tests {
    use super::*;
    use std::io;

    #[test]
    fn test_config_file_not_found_display() {
        let error = RecapError::ConfigFileNotFound {
            path: "config.json".to_string(),
        };
        assert_eq!(
            error.to_string(),
            "Configuration file not found at config.json"
        );
    }

    #[test]
    fn test_config_invalid_value_display() {
        let error = RecapError::ConfigInvalidValue {
            key: "bucket".to_string(),
            message: "must not be empty".to_string(),
        };
        assert_eq!(
            error.to_string(),
            "Invalid configuration value for bucket: must not be empty"
        );
    }

    #[test]
    fn test_command_failed_display() {
        let error = RecapError::CommandFailed {
            command: "ffmpeg".to_string(),
            status: "exit status: 1".to_string(),
            stderr: "No such file".to_string(),
        };
        assert_eq!(
            error.to_string(),
            "ffmpeg failed with status exit status: 1: No such file"
        );
    }

    #[test]
    fn test_job_failed_display() {
        let error = RecapError::JobFailed {
            job_name: "talk-DMIN-1".to_string(),
            reason: "unsupported media".to_string(),
        };
        assert_eq!(
            error.to_string(),
            "Transcription job 'talk-DMIN-1' failed: unsupported media"
        );
    }

    #[test]
    fn test_transcript_missing_display() {
        let error = RecapError::TranscriptMissing {
            location: "summary/output/x.json".to_string(),
        };
        assert!(error.to_string().starts_with("No transcript found"));
    }

    #[test]
    fn test_model_validation_errors_are_distinct() {
        let messages = [
            RecapError::EmptyModelResponse.to_string(),
            RecapError::UnexpectedResponseType {
                kind: "unknown".to_string(),
            }
            .to_string(),
            RecapError::EmptyModelContent.to_string(),
            RecapError::UnexpectedContentBlock {
                kind: "image".to_string(),
            }
            .to_string(),
            RecapError::EmptyModelText.to_string(),
        ];
        for (i, a) in messages.iter().enumerate() {
            for b in &messages[i + 1..] {
                assert_ne!(a, b);
            }
        }
    }

    #[test]
    fn test_from_io_error() {
        let io_error = io::Error::new(io::ErrorKind::NotFound, "file not found");
        let error: RecapError = io_error.into();
        assert!(error.to_string().contains("file not found"));
    }

    #[test]
    fn test_from_json_error() {
        let json_error = serde_json::from_str::<serde_json::Value>("{oops").unwrap_err();
        let error: RecapError = json_error.into();
        assert!(error.to_string().starts_with("JSON error"));
    }

    #[test]
    fn test_error_source_chain_io() {
        let io_error = io::Error::new(io::ErrorKind::PermissionDenied, "access denied");
        let error: RecapError = io_error.into();

        let error_trait: &dyn std::error::Error = &error;
        assert!(error_trait.source().is_some());
    }

    #[test]
    fn test_error_is_send_and_sync() {
        fn assert_send<T: Send>() {}
        fn assert_sync<T: Sync>() {}

        assert_send::<RecapError>();
        assert_sync::<RecapError>();
    }
}
