//! Prompt template loading and assembly.

use crate::error::{RecapError, Result};
use std::path::Path;

/// Read the prompt template verbatim.
pub async fn load_prompt(path: &Path) -> Result<String> {
    tokio::fs::read_to_string(path).await.map_err(|e| {
        if e.kind() == std::io::ErrorKind::NotFound {
            RecapError::PromptFileNotFound {
                path: path.display().to_string(),
            }
        } else {
            RecapError::Io(e)
        }
    })
}

/// Prompt sent to the model: the template, one newline, the transcript.
///
/// Neither part is trimmed.
pub fn build_prompt(template: &str, transcript: &str) -> String {
    format!("{template}\n{transcript}")
}
