//! Transcript retrieval.
//!
//! Downloads the JSON document the transcription service wrote to the
//! bucket and extracts the plain-text transcript.

use crate::error::{RecapError, Result};
use crate::storage::{ObjectStore, s3_uri};
use crate::transcribe::transcript_key;
use serde::Deserialize;
use std::path::{Path, PathBuf};

/// Output document written by the transcription service.
#[derive(Debug, Clone, Deserialize, PartialEq)]
pub struct TranscriptDocument {
    pub results: TranscriptResults,
}

#[derive(Debug, Clone, Deserialize, PartialEq)]
pub struct TranscriptResults {
    #[serde(default)]
    pub transcripts: Vec<TranscriptEntry>,
}

#[derive(Debug, Clone, Deserialize, PartialEq)]
pub struct TranscriptEntry {
    pub transcript: String,
}

/// Parse a transcript document and return its first transcript.
///
/// Later entries are ignored. An empty sequence is an error.
pub fn parse_transcript(json: &str, location: &str) -> Result<String> {
    let document: TranscriptDocument = serde_json::from_str(json)?;
    document
        .results
        .transcripts
        .into_iter()
        .next()
        .map(|entry| entry.transcript)
        .ok_or_else(|| RecapError::TranscriptMissing {
            location: location.to_string(),
        })
}

/// Downloads and parses transcripts into a local working directory.
pub struct TranscriptFetcher<'a> {
    store: &'a dyn ObjectStore,
    key_prefix: String,
    work_dir: PathBuf,
}

impl<'a> TranscriptFetcher<'a> {
    pub fn new(store: &'a dyn ObjectStore, key_prefix: &str, work_dir: &Path) -> Self {
        Self {
            store,
            key_prefix: key_prefix.to_string(),
            work_dir: work_dir.to_path_buf(),
        }
    }

    /// Local path the transcript for `job_name` is downloaded to.
    ///
    /// Mirrors the bucket key under the working directory.
    pub fn local_path(&self, job_name: &str) -> PathBuf {
        self.work_dir
            .join(transcript_key(&self.key_prefix, job_name))
    }

    /// Fetch the transcript text for a completed job.
    pub async fn fetch(&self, job_name: &str, bucket: &str) -> Result<String> {
        let key = transcript_key(&self.key_prefix, job_name);
        let local = self.local_path(job_name);
        if let Some(parent) = local.parent() {
            tokio::fs::create_dir_all(parent).await?;
        }

        let location = s3_uri(bucket, &key);
        tracing::info!("Fetching transcription result from {}...", location);
        self.store.get(bucket, &key, &local).await?;

        let json = tokio::fs::read_to_string(&local).await?;
        let text = parse_transcript(&json, &location)?;
        tracing::debug!(chars = text.len(), "transcript loaded");
        Ok(text)
    }
}
