//! Transcription service access (Amazon Transcribe through the AWS CLI).

use super::job::{JobRequest, JobStatus, TranscriptionJob};
use crate::defaults;
use crate::error::{RecapError, Result};
use crate::exec::{CommandExecutor, os_args};
use serde::Deserialize;
use std::collections::VecDeque;
use std::sync::Mutex;

/// Trait for the managed speech-to-text service.
///
/// Only the observable contract is modeled: start a job, read its status.
#[async_trait::async_trait]
pub trait TranscriptionService: Send + Sync {
    /// Submit a new job.
    async fn start_job(&self, request: &JobRequest) -> Result<()>;

    /// Query the current state of a job.
    async fn job_status(&self, job_name: &str) -> Result<TranscriptionJob>;
}

/// Amazon Transcribe via `aws transcribe`.
pub struct AwsTranscribeService<E: CommandExecutor> {
    executor: E,
}

impl<E: CommandExecutor> AwsTranscribeService<E> {
    pub fn new(executor: E) -> Self {
        Self { executor }
    }
}

#[async_trait::async_trait]
impl<E: CommandExecutor> TranscriptionService for AwsTranscribeService<E> {
    async fn start_job(&self, request: &JobRequest) -> Result<()> {
        let args = vec![
            "transcribe".to_string(),
            "start-transcription-job".to_string(),
            "--transcription-job-name".to_string(),
            request.job_name.clone(),
            "--language-code".to_string(),
            request.language_code.clone(),
            "--media-sample-rate-hertz".to_string(),
            request.sample_rate_hz.to_string(),
            "--media-format".to_string(),
            request.media_format.clone(),
            "--media".to_string(),
            format!("MediaFileUri={}", request.media_uri),
            "--output-bucket-name".to_string(),
            request.output_bucket.clone(),
            "--output-key".to_string(),
            request.output_key.clone(),
        ];
        self.executor
            .execute(defaults::AWS_CLI, &os_args(args))
            .await?;
        Ok(())
    }

    async fn job_status(&self, job_name: &str) -> Result<TranscriptionJob> {
        let args = vec![
            "transcribe".to_string(),
            "get-transcription-job".to_string(),
            "--transcription-job-name".to_string(),
            job_name.to_string(),
        ];
        let stdout = self
            .executor
            .execute(defaults::AWS_CLI, &os_args(args))
            .await?;
        parse_job_response(&stdout)
    }
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "PascalCase")]
struct GetJobResponse {
    transcription_job: Option<JobDescription>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "PascalCase")]
struct JobDescription {
    transcription_job_name: Option<String>,
    transcription_job_status: Option<String>,
    transcript: Option<TranscriptLocation>,
    failure_reason: Option<String>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "PascalCase")]
struct TranscriptLocation {
    transcript_file_uri: Option<String>,
}

/// Parse the JSON printed by `aws transcribe get-transcription-job`.
///
/// A missing job object, a missing status, or a status outside the known
/// set is an error rather than something to retry.
pub fn parse_job_response(json: &str) -> Result<TranscriptionJob> {
    let response: GetJobResponse = serde_json::from_str(json)?;
    let job = response
        .transcription_job
        .ok_or_else(|| RecapError::Protocol {
            source_name: "transcribe".to_string(),
            message: "missing TranscriptionJob".to_string(),
        })?;
    let status: JobStatus = job
        .transcription_job_status
        .as_deref()
        .ok_or_else(|| RecapError::Protocol {
            source_name: "transcribe".to_string(),
            message: "missing TranscriptionJobStatus".to_string(),
        })?
        .parse()?;

    Ok(TranscriptionJob {
        name: job.transcription_job_name.unwrap_or_default(),
        status,
        output_location: job.transcript.and_then(|t| t.transcript_file_uri),
        failure_reason: job.failure_reason,
    })
}

/// Scripted service for testing the poll loop.
///
/// Replays a fixed sequence of status results, one per query, and records
/// every submitted request.
#[derive(Debug, Default)]
pub struct ScriptedTranscriptionService {
    statuses: Mutex<VecDeque<Result<JobStatus>>>,
    submissions: Mutex<Vec<JobRequest>>,
    queries: Mutex<u32>,
    failure_reason: Option<String>,
}

impl ScriptedTranscriptionService {
    pub fn new(statuses: Vec<JobStatus>) -> Self {
        Self {
            statuses: Mutex::new(statuses.into_iter().map(Ok).collect()),
            ..Self::default()
        }
    }

    /// Append a query error after the scripted statuses.
    pub fn then_error(self, error: RecapError) -> Self {
        if let Ok(mut statuses) = self.statuses.lock() {
            statuses.push_back(Err(error));
        }
        self
    }

    /// Reason reported alongside a FAILED status.
    pub fn with_failure_reason(mut self, reason: &str) -> Self {
        self.failure_reason = Some(reason.to_string());
        self
    }

    /// Number of status queries served so far.
    pub fn query_count(&self) -> u32 {
        self.queries.lock().map(|q| *q).unwrap_or(0)
    }

    /// Requests passed to `start_job`.
    pub fn submissions(&self) -> Vec<JobRequest> {
        self.submissions.lock().map(|s| s.clone()).unwrap_or_default()
    }
}

#[async_trait::async_trait]
impl TranscriptionService for ScriptedTranscriptionService {
    async fn start_job(&self, request: &JobRequest) -> Result<()> {
        if let Ok(mut submissions) = self.submissions.lock() {
            submissions.push(request.clone());
        }
        Ok(())
    }

    async fn job_status(&self, job_name: &str) -> Result<TranscriptionJob> {
        if let Ok(mut queries) = self.queries.lock() {
            *queries += 1;
        }
        let next = self
            .statuses
            .lock()
            .ok()
            .and_then(|mut s| s.pop_front())
            .unwrap_or_else(|| Err(RecapError::Other("status script exhausted".to_string())));

        let status = next?;
        let mut job = TranscriptionJob::new(job_name, status);
        if status == JobStatus::Failed {
            job.failure_reason = self.failure_reason.clone();
        }
        Ok(job)
    }
}
