//! Bounded job polling.

use super::{AnalysisProvider, JobStatus};
use crate::error::{Error, Result};
use std::thread;
use std::time::Duration;

/// Backoff schedule for waiting on an analysis job.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PollOptions {
    /// Delay after the first in-progress status
    pub initial_delay: Duration,

    /// Upper bound for a single delay
    pub max_delay: Duration,

    /// Maximum number of status checks
    pub max_attempts: u32,

    /// Maximum total time spent sleeping
    pub timeout: Duration,
}

impl PollOptions {
    /// Create new poll options with defaults.
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the initial delay.
    pub fn with_initial_delay(mut self, delay: Duration) -> Self {
        self.initial_delay = delay;
        self
    }

    /// Set the maximum delay.
    pub fn with_max_delay(mut self, delay: Duration) -> Self {
        self.max_delay = delay;
        self
    }

    /// Set the maximum number of status checks (at least 1).
    pub fn with_max_attempts(mut self, attempts: u32) -> Self {
        self.max_attempts = attempts.max(1);
        self
    }

    /// Set the overall timeout.
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    fn next_delay(&self, delay: Duration) -> Duration {
        delay.saturating_mul(2).min(self.max_delay)
    }
}

impl Default for PollOptions {
    fn default() -> Self {
        Self {
            initial_delay: Duration::from_secs(1),
            max_delay: Duration::from_secs(30),
            max_attempts: 120,
            timeout: Duration::from_secs(15 * 60),
        }
    }
}

/// Wait until a job finishes, backing off exponentially between checks.
///
/// Returns the completed status, [`Error::JobFailed`] on a terminal failure,
/// or [`Error::JobTimeout`] once attempts or time run out.
pub fn wait_for_job<P: AnalysisProvider + ?Sized>(
    provider: &P,
    job_id: &str,
    options: &PollOptions,
) -> Result<JobStatus> {
    let mut delay = options.initial_delay.min(options.max_delay);
    let mut waited = Duration::ZERO;
    let mut attempts = 0u32;

    loop {
        attempts += 1;
        let response = provider.get_analysis(job_id, None)?;

        match response.job_status {
            JobStatus::Succeeded => return Ok(JobStatus::Succeeded),
            JobStatus::PartialSuccess => {
                log::warn!("Job {} finished with partial success", job_id);
                return Ok(JobStatus::PartialSuccess);
            }
            JobStatus::Failed => {
                return Err(Error::JobFailed {
                    job_id: job_id.to_string(),
                    message: response
                        .status_message
                        .unwrap_or_else(|| "no status message".to_string()),
                });
            }
            JobStatus::InProgress => {}
        }

        if attempts >= options.max_attempts || waited + delay > options.timeout {
            return Err(Error::JobTimeout {
                job_id: job_id.to_string(),
                attempts,
                waited,
            });
        }

        log::debug!(
            "Job {} in progress (attempt {}/{}), retrying in {:.1}s",
            job_id,
            attempts,
            options.max_attempts,
            delay.as_secs_f64()
        );
        thread::sleep(delay);
        waited += delay;
        delay = options.next_delay(delay);
    }
}
