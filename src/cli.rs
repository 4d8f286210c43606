//! Command-line interface for recap
//!
//! Provides argument parsing using clap derive macros.

use crate::defaults;
use crate::transcribe::PollPolicy;
use clap::{Parser, Subcommand};
use clap_complete::Shell;
use std::path::PathBuf;
use std::sync::LazyLock;
use std::time::Duration;

/// Version shown by `--version`, with the git hash when built from a checkout.
static VERSION: LazyLock<String> = LazyLock::new(crate::version_string);

/// Transcribe an audio file and summarize it with a language model
#[derive(Parser, Debug)]
#[command(
    name = "recap",
    version = VERSION.as_str(),
    about = "Transcribe an audio file and summarize it with a language model",
    args_conflicts_with_subcommands = true
)]
pub struct Cli {
    /// Subcommand to execute
    #[command(subcommand)]
    pub command: Option<Commands>,

    /// Audio file to transcribe
    #[arg(value_name = "INPUT")]
    pub input: Option<PathBuf>,

    /// Path to configuration file
    #[arg(long, value_name = "PATH", default_value = defaults::CONFIG_FILE)]
    pub config: PathBuf,

    /// Path to the prompt template
    #[arg(long, value_name = "PATH", default_value = defaults::PROMPT_FILE)]
    pub prompt: PathBuf,

    /// Where to write the model reply
    #[arg(long, short = 'o', value_name = "PATH", default_value = defaults::RESULT_FILE)]
    pub output: PathBuf,

    /// Model identifier (overrides config)
    #[arg(long, value_name = "ID")]
    pub model: Option<String>,

    /// Transcription language code, e.g. en-US (overrides config)
    #[arg(long, value_name = "CODE")]
    pub language: Option<String>,

    /// Wait between job status checks. Examples: 10s, 1m, 1m30s
    #[arg(long, value_name = "DURATION", default_value = "10s", value_parser = parse_duration)]
    pub poll_interval: Duration,

    /// Give up after this many job status checks
    #[arg(long, value_name = "N")]
    pub max_polls: Option<u32>,

    /// Give up waiting for the job after this long. Examples: 30m, 2h
    #[arg(long, value_name = "DURATION", value_parser = parse_duration)]
    pub poll_timeout: Option<Duration>,

    /// Double the wait after each status check, up to two minutes
    #[arg(long)]
    pub exponential_backoff: bool,

    /// Suppress progress output (quiet mode)
    #[arg(short, long, global = true)]
    pub quiet: bool,

    /// Verbose output (-v: commands and token usage, -vv: everything)
    #[arg(short, long, global = true, action = clap::ArgAction::Count)]
    pub verbose: u8,
}

/// Parse a duration string.
///
/// Accepts bare numbers (seconds) and anything `humantime` understands
/// (`30s`, `5m`, `1h30m`).
fn parse_duration(s: &str) -> Result<Duration, String> {
    let s = s.trim();
    if let Ok(secs) = s.parse::<u64>() {
        return Ok(Duration::from_secs(secs));
    }
    humantime::parse_duration(s).map_err(|e| e.to_string())
}

/// Available commands
#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Check that ffmpeg and the AWS CLI are installed
    Check,

    /// Generate shell completions
    Completions {
        /// Shell to generate completions for
        shell: Shell,
    },
}

impl Cli {
    /// Poll policy described by the polling flags.
    pub fn poll_policy(&self) -> PollPolicy {
        let mut policy = PollPolicy::default().with_interval(self.poll_interval);
        if let Some(max) = self.max_polls {
            policy = policy.with_max_attempts(max);
        }
        if let Some(timeout) = self.poll_timeout {
            policy = policy.with_deadline(timeout);
        }
        if self.exponential_backoff {
            policy = policy.exponential();
        }
        policy
    }
}
