//! Application entry point.
//!
//! Orchestrates the complete flow:
//! load config + prompt → convert → upload → transcribe → fetch → summarize → write

use crate::config::Config;
use crate::defaults;
use crate::error::RecapError;
use crate::exec::{CommandExecutor, SystemCommandExecutor};
use crate::model::{BedrockCliClient, ModelClient, ModelInvoker};
use crate::output::write_result;
use crate::prompt::{build_prompt, load_prompt};
use crate::storage::{AwsCliStore, ObjectStore};
use crate::transcode::Transcoder;
use crate::transcribe::{
    AwsTranscribeService, JobOrchestrator, JobSettings, PollPolicy, TranscriptionService,
    unix_timestamp,
};
use crate::transcript::TranscriptFetcher;
use std::fmt;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use thiserror::Error;

/// Pipeline step, used to label failures.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Stage {
    Config,
    Prompt,
    Convert,
    Upload,
    Submit,
    Poll,
    Fetch,
    Model,
    Write,
}

impl fmt::Display for Stage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Stage::Config => "reading config",
            Stage::Prompt => "reading prompt",
            Stage::Convert => "converting file",
            Stage::Upload => "copying file to S3",
            Stage::Submit => "starting transcription job",
            Stage::Poll => "waiting for transcription job",
            Stage::Fetch => "getting transcript text",
            Stage::Model => "calling model",
            Stage::Write => "writing result",
        };
        write!(f, "{name}")
    }
}

/// A failure tagged with the stage it happened in.
#[derive(Error, Debug)]
#[error("Error {stage}: {source}")]
pub struct PipelineError {
    pub stage: Stage,
    #[source]
    pub source: RecapError,
}

trait AtStage<T> {
    fn at(self, stage: Stage) -> std::result::Result<T, PipelineError>;
}

impl<T> AtStage<T> for crate::error::Result<T> {
    fn at(self, stage: Stage) -> std::result::Result<T, PipelineError> {
        self.map_err(|source| PipelineError { stage, source })
    }
}

/// File locations and polling behavior for one run.
#[derive(Debug, Clone)]
pub struct RunOptions {
    pub input: PathBuf,
    pub prompt_path: PathBuf,
    pub output_path: PathBuf,
    /// Directory the transcript JSON is downloaded into.
    pub work_dir: PathBuf,
    pub poll: PollPolicy,
    /// Submission time used in the job name; the current time when unset.
    pub timestamp: Option<u64>,
}

impl RunOptions {
    /// Defaults relative to the current directory.
    pub fn new(input: &Path) -> Self {
        Self {
            input: input.to_path_buf(),
            prompt_path: PathBuf::from(defaults::PROMPT_FILE),
            output_path: PathBuf::from(defaults::RESULT_FILE),
            work_dir: PathBuf::from("."),
            poll: PollPolicy::default(),
            timestamp: None,
        }
    }
}

/// External services the pipeline drives.
#[derive(Clone)]
pub struct Collaborators {
    pub executor: Arc<dyn CommandExecutor>,
    pub store: Arc<dyn ObjectStore>,
    pub transcription: Arc<dyn TranscriptionService>,
    pub model: Arc<dyn ModelClient>,
}

impl Collaborators {
    /// ffmpeg and the AWS CLI on `PATH`.
    pub fn system() -> Self {
        let executor: Arc<dyn CommandExecutor> = Arc::new(SystemCommandExecutor::new());
        Self {
            store: Arc::new(AwsCliStore::new(executor.clone())),
            transcription: Arc::new(AwsTranscribeService::new(executor.clone())),
            model: Arc::new(BedrockCliClient::new(executor.clone())),
            executor,
        }
    }
}

/// What a successful run produced.
#[derive(Debug, Clone, PartialEq)]
pub struct RunSummary {
    pub job_name: String,
    pub prompt: String,
    pub output_path: PathBuf,
}

/// Load `config.json`, apply environment overrides and validate the result.
pub fn load_config(path: &Path) -> std::result::Result<Config, PipelineError> {
    Config::load_with_env_overrides(path).at(Stage::Config)
}

/// Run every stage in order, stopping at the first failure.
///
/// Nothing is cleaned up on failure: uploaded objects, submitted jobs and
/// local intermediate files stay where they are.
pub async fn run_pipeline(
    config: &Config,
    options: &RunOptions,
    collaborators: &Collaborators,
) -> std::result::Result<RunSummary, PipelineError> {
    let template = load_prompt(&options.prompt_path).await.at(Stage::Prompt)?;

    let transcoder = Transcoder::new(collaborators.executor.clone());
    let mp3 = transcoder.convert(&options.input).await.at(Stage::Convert)?;

    let key = collaborators
        .store
        .upload(&mp3, &config.bucket, &config.key_prefix)
        .await
        .at(Stage::Upload)?;

    let settings = JobSettings {
        language_code: config.language_code.clone(),
        sample_rate_hz: config.sample_rate_hz,
        key_prefix: config.key_prefix.clone(),
    };
    let orchestrator = JobOrchestrator::new(
        collaborators.transcription.as_ref(),
        settings,
        options.poll.clone(),
    );
    let timestamp = options.timestamp.unwrap_or_else(unix_timestamp);
    let job_name = orchestrator
        .submit_at(&config.bucket, &key, timestamp)
        .await
        .at(Stage::Submit)?;
    orchestrator
        .await_completion(&job_name)
        .await
        .at(Stage::Poll)?;

    let fetcher = TranscriptFetcher::new(
        collaborators.store.as_ref(),
        &config.key_prefix,
        &options.work_dir,
    );
    let transcript = fetcher
        .fetch(&job_name, &config.bucket)
        .await
        .at(Stage::Fetch)?;

    let prompt = build_prompt(&template, &transcript);
    let invoker = ModelInvoker::new(collaborators.model.as_ref(), &config.model_id)
        .with_max_tokens(config.max_tokens);
    let reply = invoker.invoke(&prompt).await.at(Stage::Model)?;

    write_result(&options.output_path, &reply)
        .await
        .at(Stage::Write)?;

    Ok(RunSummary {
        job_name,
        prompt,
        output_path: options.output_path.clone(),
    })
}
