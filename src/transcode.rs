//! Audio conversion via ffmpeg.

use crate::defaults;
use crate::exec::{CommandExecutor, os_args};
use crate::error::Result;
use std::ffi::OsStr;
use std::path::{Path, PathBuf};

/// Path the transcoder writes for `input`: same directory and base name,
/// extension replaced with the target codec's.
pub fn output_path_for(input: &Path) -> PathBuf {
    input.with_extension(defaults::TARGET_EXTENSION)
}

/// Converts input audio to MP3 by shelling out to ffmpeg.
pub struct Transcoder<E: CommandExecutor> {
    executor: E,
}

impl<E: CommandExecutor> Transcoder<E> {
    pub fn new(executor: E) -> Self {
        Self { executor }
    }

    /// Convert `input` and return the path of the MP3 file.
    ///
    /// Inputs that are already MP3 are returned unchanged, since ffmpeg
    /// cannot write over its own input.
    pub async fn convert(&self, input: &Path) -> Result<PathBuf> {
        let output = output_path_for(input);
        if output == input {
            tracing::info!(
                "{} is already {}, skipping conversion",
                input.display(),
                defaults::TARGET_EXTENSION
            );
            return Ok(output);
        }

        tracing::info!("Converting {} to {}...", input.display(), output.display());
        let args = os_args([
            OsStr::new("-y"),
            OsStr::new("-i"),
            input.as_os_str(),
            output.as_os_str(),
        ]);
        self.executor.execute(defaults::FFMPEG, &args).await?;

        Ok(output)
    }
}
