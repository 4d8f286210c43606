//! Default configuration constants for recap.
//!
//! File names, bucket key layout and service parameters used when neither
//! the config file nor the command line says otherwise.

/// Default configuration file, relative to the working directory.
pub const CONFIG_FILE: &str = "config.json";

/// Default prompt template file.
pub const PROMPT_FILE: &str = "prompt.txt";

/// Default result file. Overwritten on every run.
pub const RESULT_FILE: &str = "result.txt";

/// Key prefix for uploaded audio and transcription output in the bucket.
pub const KEY_PREFIX: &str = "summary";

/// Extension the transcoder produces and Transcribe is told to expect.
pub const TARGET_EXTENSION: &str = "mp3";

/// Tag between the media name and the submission timestamp in job names.
pub const JOB_NAME_TAG: &str = "-DMIN-";

/// Longest job name the transcription service accepts.
pub const MAX_JOB_NAME_LEN: usize = 200;

/// Default language code for transcription jobs.
pub const LANGUAGE_CODE: &str = "en-US";

/// Default media sample rate passed to Transcribe, in Hz.
pub const SAMPLE_RATE_HZ: u32 = 48000;

/// Default Bedrock model used for summarization.
pub const MODEL_ID: &str = "anthropic.claude-3-5-sonnet-20240620-v1:0";

/// Default interval between transcription status checks, in seconds.
pub const POLL_INTERVAL_SECS: u64 = 10;

/// Upper bound on a single wait when exponential backoff is enabled, in seconds.
pub const MAX_POLL_INTERVAL_SECS: u64 = 120;

/// Growth factor for exponential backoff between status checks.
pub const BACKOFF_FACTOR: u32 = 2;

/// Tools the pipeline shells out to.
pub const FFMPEG: &str = "ffmpeg";
pub const AWS_CLI: &str = "aws";
