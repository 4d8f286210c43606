//! Result file writing.

use crate::error::Result;
use std::path::Path;

/// Write the model reply to `path`, replacing any previous result.
pub async fn write_result(path: &Path, text: &str) -> Result<()> {
    tokio::fs::write(path, text).await?;
    tracing::debug!(path = %path.display(), bytes = text.len(), "result written");
    Ok(())
}
