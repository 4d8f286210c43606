//! Transcription job orchestration.
//!
//! Submits a job for an uploaded MP3 and drives it to a terminal state:
//! SUBMITTED → QUEUED / IN_PROGRESS (repeated) → COMPLETED | FAILED.
//! The states after submission are observed, never set, by this module.

pub mod job;
pub mod poll;
pub mod service;

pub use job::{JobRequest, JobStatus, TranscriptionJob, job_name, transcript_key, unix_timestamp};
pub use poll::{Backoff, PollPolicy, await_completion};
pub use service::{AwsTranscribeService, ScriptedTranscriptionService, TranscriptionService};

use crate::defaults;
use crate::error::Result;
use crate::storage::s3_uri;

/// Service parameters that do not change between jobs.
#[derive(Debug, Clone, PartialEq)]
pub struct JobSettings {
    pub language_code: String,
    pub sample_rate_hz: u32,
    pub key_prefix: String,
}

impl Default for JobSettings {
    fn default() -> Self {
        Self {
            language_code: defaults::LANGUAGE_CODE.to_string(),
            sample_rate_hz: defaults::SAMPLE_RATE_HZ,
            key_prefix: defaults::KEY_PREFIX.to_string(),
        }
    }
}

/// Submits transcription jobs and waits for them.
pub struct JobOrchestrator<'a> {
    service: &'a dyn TranscriptionService,
    settings: JobSettings,
    policy: PollPolicy,
}

impl<'a> JobOrchestrator<'a> {
    pub fn new(
        service: &'a dyn TranscriptionService,
        settings: JobSettings,
        policy: PollPolicy,
    ) -> Self {
        Self {
            service,
            settings,
            policy,
        }
    }

    /// Build the request for `object_key` submitted at `timestamp`.
    pub fn request_for(&self, bucket: &str, object_key: &str, timestamp: u64) -> JobRequest {
        let name = job_name(object_key, timestamp);
        JobRequest {
            output_key: transcript_key(&self.settings.key_prefix, &name),
            job_name: name,
            language_code: self.settings.language_code.clone(),
            sample_rate_hz: self.settings.sample_rate_hz,
            media_format: defaults::TARGET_EXTENSION.to_string(),
            media_uri: s3_uri(bucket, object_key),
            output_bucket: bucket.to_string(),
        }
    }

    /// Submit a job for `object_key` and return its name.
    pub async fn submit(&self, bucket: &str, object_key: &str) -> Result<String> {
        self.submit_at(bucket, object_key, unix_timestamp()).await
    }

    /// Submit with an explicit timestamp.
    pub async fn submit_at(
        &self,
        bucket: &str,
        object_key: &str,
        timestamp: u64,
    ) -> Result<String> {
        let request = self.request_for(bucket, object_key, timestamp);
        tracing::info!(
            "Starting transcription job '{}' for {}...",
            request.job_name,
            request.media_uri
        );
        self.service.start_job(&request).await?;
        Ok(request.job_name)
    }

    /// Poll `job_name` until it completes, per the configured policy.
    pub async fn await_completion(&self, job_name: &str) -> Result<TranscriptionJob> {
        await_completion(self.service, job_name, &self.policy).await
    }
}
