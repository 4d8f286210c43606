//! Status polling for transcription jobs.
//!
//! The loop keeps querying until the job reaches a terminal state. How long
//! it waits between queries and when it gives up are decided by a
//! [`PollPolicy`] supplied by the caller. Waiting goes through
//! `tokio::time`, so tests can run the loop on a paused clock.

use super::job::{JobStatus, TranscriptionJob};
use super::service::TranscriptionService;
use crate::defaults;
use crate::error::{RecapError, Result};
use std::time::Duration;
use tokio::time::Instant;

/// How the wait between status queries evolves.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Backoff {
    /// Same interval every time.
    Constant,
    /// Interval multiplied by `factor` after each wait, capped at `max`.
    /// The cap never shortens the base interval.
    Exponential { factor: u32, max: Duration },
}

/// Parameters of the status poll loop.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PollPolicy {
    pub interval: Duration,
    pub backoff: Backoff,
    /// Give up after this many status queries.
    pub max_attempts: Option<u32>,
    /// Give up when the next wait would end past this much total time.
    pub deadline: Option<Duration>,
}

impl Default for PollPolicy {
    /// Constant 10 second interval with no attempt limit and no deadline.
    fn default() -> Self {
        Self {
            interval: Duration::from_secs(defaults::POLL_INTERVAL_SECS),
            backoff: Backoff::Constant,
            max_attempts: None,
            deadline: None,
        }
    }
}

impl PollPolicy {
    pub fn with_interval(mut self, interval: Duration) -> Self {
        self.interval = interval;
        self
    }

    pub fn with_max_attempts(mut self, max_attempts: u32) -> Self {
        self.max_attempts = Some(max_attempts);
        self
    }

    pub fn with_deadline(mut self, deadline: Duration) -> Self {
        self.deadline = Some(deadline);
        self
    }

    /// Exponential backoff using the default factor and cap.
    pub fn exponential(mut self) -> Self {
        self.backoff = Backoff::Exponential {
            factor: defaults::BACKOFF_FACTOR,
            max: Duration::from_secs(defaults::MAX_POLL_INTERVAL_SECS),
        };
        self
    }

    /// Delay before query number `wait + 1` (zero-based wait index).
    pub fn delay_for(&self, wait: u32) -> Duration {
        match self.backoff {
            Backoff::Constant => self.interval,
            Backoff::Exponential { factor, max } => self
                .interval
                .saturating_mul(factor.saturating_pow(wait))
                .min(max.max(self.interval)),
        }
    }
}

/// Poll `job_name` until it completes.
///
/// Returns the final job snapshot on COMPLETED. FAILED, any query or parse
/// error, and exceeding the policy's limits all end the loop with an error.
pub async fn await_completion(
    service: &dyn TranscriptionService,
    job_name: &str,
    policy: &PollPolicy,
) -> Result<TranscriptionJob> {
    tracing::info!("Waiting for transcription job '{}' to complete...", job_name);

    let started = Instant::now();
    let mut attempts: u32 = 0;

    loop {
        let job = service.job_status(job_name).await?;
        attempts += 1;
        tracing::info!(job = job_name, attempt = attempts, "Current status: {}", job.status);

        match job.status {
            JobStatus::Completed => return Ok(job),
            JobStatus::Failed => {
                return Err(RecapError::JobFailed {
                    job_name: job_name.to_string(),
                    reason: job
                        .failure_reason
                        .unwrap_or_else(|| "no failure reason reported".to_string()),
                });
            }
            JobStatus::Queued | JobStatus::InProgress => {}
        }

        if let Some(max) = policy.max_attempts
            && attempts >= max
        {
            return Err(RecapError::PollAttemptsExhausted {
                job_name: job_name.to_string(),
                attempts,
            });
        }

        let delay = policy.delay_for(attempts - 1);
        if let Some(deadline) = policy.deadline
            && started.elapsed() + delay > deadline
        {
            return Err(RecapError::PollTimedOut {
                job_name: job_name.to_string(),
                waited_secs: started.elapsed().as_secs(),
            });
        }

        tracing::debug!(
            job = job_name,
            delay_ms = delay.as_millis() as u64,
            "sleeping before next status check"
        );
        tokio::time::sleep(delay).await;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::transcribe::service::ScriptedTranscriptionService;
    use crate::transcribe::job::JobStatus::*;

    #[test]
    fn test_default_policy_matches_fixed_ten_second_loop() {
        let policy = PollPolicy::default();
        assert_eq!(policy.interval, Duration::from_secs(10));
        assert_eq!(policy.backoff, Backoff::Constant);
        assert_eq!(policy.max_attempts, None);
        assert_eq!(policy.deadline, None);
        assert_eq!(policy.delay_for(0), Duration::from_secs(10));
        assert_eq!(policy.delay_for(50), Duration::from_secs(10));
    }

    #[test]
    fn test_exponential_delay_grows_and_caps() {
        let policy = PollPolicy::default()
            .with_interval(Duration::from_secs(5))
            .exponential();
        assert_eq!(policy.delay_for(0), Duration::from_secs(5));
        assert_eq!(policy.delay_for(1), Duration::from_secs(10));
        assert_eq!(policy.delay_for(2), Duration::from_secs(20));
        assert_eq!(policy.delay_for(10), Duration::from_secs(120));
        // No overflow far out
        assert_eq!(policy.delay_for(u32::MAX), Duration::from_secs(120));
    }

    #[test]
    fn test_exponential_cap_does_not_shorten_long_interval() {
        let policy = PollPolicy::default()
            .with_interval(Duration::from_secs(300))
            .exponential();
        assert_eq!(policy.delay_for(0), Duration::from_secs(300));
        assert_eq!(policy.delay_for(3), Duration::from_secs(300));
    }

    #[tokio::test(start_paused = true)]
    async fn test_completes_after_two_waits() {
        let service = ScriptedTranscriptionService::new(vec![InProgress, InProgress, Completed]);
        let started = Instant::now();

        let job = await_completion(&service, "j", &PollPolicy::default())
            .await
            .unwrap();

        assert_eq!(job.status, Completed);
        assert_eq!(service.query_count(), 3);
        assert_eq!(started.elapsed(), Duration::from_secs(20));
    }

    #[tokio::test(start_paused = true)]
    async fn test_fails_after_one_wait() {
        let service = ScriptedTranscriptionService::new(vec![InProgress, Failed])
            .with_failure_reason("Unsupported media format");
        let started = Instant::now();

        let result = await_completion(&service, "j", &PollPolicy::default()).await;

        assert!(matches!(
            result,
            Err(RecapError::JobFailed { reason, .. }) if reason == "Unsupported media format"
        ));
        assert_eq!(service.query_count(), 2);
        assert_eq!(started.elapsed(), Duration::from_secs(10));
    }

    #[tokio::test(start_paused = true)]
    async fn test_completed_immediately_does_not_wait() {
        let service = ScriptedTranscriptionService::new(vec![Completed]);
        let started = Instant::now();

        await_completion(&service, "j", &PollPolicy::default())
            .await
            .unwrap();

        assert_eq!(started.elapsed(), Duration::ZERO);
    }

    #[tokio::test(start_paused = true)]
    async fn test_queued_is_not_terminal() {
        let service = ScriptedTranscriptionService::new(vec![Queued, InProgress, Completed]);

        let job = await_completion(&service, "j", &PollPolicy::default())
            .await
            .unwrap();
        assert_eq!(job.status, Completed);
        assert_eq!(service.query_count(), 3);
    }

    #[tokio::test(start_paused = true)]
    async fn test_failed_before_completed_wins() {
        let service = ScriptedTranscriptionService::new(vec![Failed, Completed]);

        let result = await_completion(&service, "j", &PollPolicy::default()).await;

        assert!(matches!(result, Err(RecapError::JobFailed { reason, .. }) if reason == "no failure reason reported"));
        assert_eq!(service.query_count(), 1);
    }

    #[tokio::test(start_paused = true)]
    async fn test_query_error_aborts_loop() {
        let service = ScriptedTranscriptionService::new(vec![InProgress]).then_error(
            RecapError::UnknownJobStatus {
                status: "PAUSED".to_string(),
            },
        );

        let result = await_completion(&service, "j", &PollPolicy::default()).await;

        assert!(matches!(result, Err(RecapError::UnknownJobStatus { .. })));
        assert_eq!(service.query_count(), 2);
    }

    #[tokio::test(start_paused = true)]
    async fn test_max_attempts_exhausted() {
        let service =
            ScriptedTranscriptionService::new(vec![InProgress, InProgress, InProgress, Completed]);
        let policy = PollPolicy::default().with_max_attempts(3);

        let result = await_completion(&service, "j", &policy).await;

        assert!(matches!(
            result,
            Err(RecapError::PollAttemptsExhausted { attempts: 3, .. })
        ));
        assert_eq!(service.query_count(), 3);
    }

    #[tokio::test(start_paused = true)]
    async fn test_deadline_stops_before_overrunning() {
        let service = ScriptedTranscriptionService::new(vec![InProgress; 10]);
        let policy = PollPolicy::default().with_deadline(Duration::from_secs(25));
        let started = Instant::now();

        let result = await_completion(&service, "j", &policy).await;

        // Queries at 0s, 10s and 20s; the next wait would end at 30s.
        assert!(matches!(
            result,
            Err(RecapError::PollTimedOut { waited_secs: 20, .. })
        ));
        assert_eq!(service.query_count(), 3);
        assert_eq!(started.elapsed(), Duration::from_secs(20));
    }

    #[tokio::test(start_paused = true)]
    async fn test_exponential_backoff_waits() {
        let service =
            ScriptedTranscriptionService::new(vec![InProgress, InProgress, InProgress, Completed]);
        let policy = PollPolicy::default()
            .with_interval(Duration::from_secs(1))
            .exponential();
        let started = Instant::now();

        await_completion(&service, "j", &policy).await.unwrap();

        // 1s + 2s + 4s
        assert_eq!(started.elapsed(), Duration::from_secs(7));
    }
}
