use crate::defaults;
use crate::error::RecapError;
use std::fmt;
use std::str::FromStr;
use std::time::{SystemTime, UNIX_EPOCH};

/// Lifecycle state of a transcription job as reported by the service.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum JobStatus {
    Queued,
    InProgress,
    Completed,
    Failed,
}

impl JobStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            JobStatus::Queued => "QUEUED",
            JobStatus::InProgress => "IN_PROGRESS",
            JobStatus::Completed => "COMPLETED",
            JobStatus::Failed => "FAILED",
        }
    }

    /// Whether the service will never change this status again.
    pub fn is_terminal(&self) -> bool {
        matches!(self, JobStatus::Completed | JobStatus::Failed)
    }
}

impl FromStr for JobStatus {
    type Err = RecapError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "QUEUED" => Ok(JobStatus::Queued),
            "IN_PROGRESS" => Ok(JobStatus::InProgress),
            "COMPLETED" => Ok(JobStatus::Completed),
            "FAILED" => Ok(JobStatus::Failed),
            _ => Err(RecapError::UnknownJobStatus {
                status: s.to_string(),
            }),
        }
    }
}

impl fmt::Display for JobStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Snapshot of a transcription job returned by a status query.
#[derive(Debug, Clone, PartialEq)]
pub struct TranscriptionJob {
    pub name: String,
    pub status: JobStatus,
    pub output_location: Option<String>,
    pub failure_reason: Option<String>,
}

impl TranscriptionJob {
    pub fn new(name: &str, status: JobStatus) -> Self {
        Self {
            name: name.to_string(),
            status,
            output_location: None,
            failure_reason: None,
        }
    }
}

/// Everything the service needs to start a job.
#[derive(Debug, Clone, PartialEq)]
pub struct JobRequest {
    pub job_name: String,
    pub language_code: String,
    pub sample_rate_hz: u32,
    pub media_format: String,
    pub media_uri: String,
    pub output_bucket: String,
    pub output_key: String,
}

/// Derive a job name from the uploaded object key and a Unix timestamp.
///
/// The `.mp3` extension is stripped from the key's basename, then the
/// name tag and timestamp are appended. Characters outside `[0-9A-Za-z._-]`
/// become `-`. The name part is cut so the whole name fits the service's
/// length limit. The result only depends on its inputs, so the same key
/// submitted twice within one second yields the same name.
pub fn job_name(object_key: &str, timestamp: u64) -> String {
    let suffix = format!("{}{timestamp}", defaults::JOB_NAME_TAG);
    let max_stem = defaults::MAX_JOB_NAME_LEN.saturating_sub(suffix.len());
    let basename = object_key.rsplit('/').next().unwrap_or(object_key);
    let stem = basename
        .strip_suffix(&format!(".{}", defaults::TARGET_EXTENSION))
        .unwrap_or(basename);
    let stem: String = stem
        .chars()
        .map(|c| {
            if c.is_ascii_alphanumeric() || matches!(c, '.' | '_' | '-') {
                c
            } else {
                '-'
            }
        })
        .take(max_stem)
        .collect();
    format!("{stem}{suffix}")
}

/// Bucket key where the service writes the transcript for `job_name`.
pub fn transcript_key(prefix: &str, job_name: &str) -> String {
    format!("{}/output/{job_name}.json", prefix.trim_end_matches('/'))
}

/// Seconds since the Unix epoch.
pub fn unix_timestamp() -> u64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_secs())
        .unwrap_or(0)
}
