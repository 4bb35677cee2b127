use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Lifecycle state of a dispatched generation job.
///
/// `Succeeded` and `Failed` are terminal — once a job reaches either,
/// no later notification may change it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum JobState {
    /// Submitted to the provider, no conclusive notification yet.
    Pending,
    /// The provider delivered a result; `result_url` points at it.
    Succeeded { result_url: String },
    /// The provider reported a failure with the given reason.
    Failed { reason: String },
}

impl JobState {
    pub fn is_terminal(&self) -> bool {
        !matches!(self, JobState::Pending)
    }
}

impl std::fmt::Display for JobState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            JobState::Pending => write!(f, "PENDING"),
            JobState::Succeeded { .. } => write!(f, "SUCCEEDED"),
            JobState::Failed { .. } => write!(f, "FAILED"),
        }
    }
}

/// One provider-side generation task tracked for the duration of a run.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Job {
    /// Opaque task identifier assigned by the provider at submission.
    pub job_id: String,
    /// Human-readable label: provider name plus image index where applicable.
    pub provider_label: String,
    pub state: JobState,
    pub dispatched_at: DateTime<Utc>,
}

impl Job {
    pub fn new(job_id: String, provider_label: String) -> Self {
        Self {
            job_id,
            provider_label,
            state: JobState::Pending,
            dispatched_at: Utc::now(),
        }
    }
}

/// In-memory map of job_id → [`Job`], scoped to a single generation run.
///
/// Jobs are kept in dispatch order for rendering. The id set is fixed once
/// dispatch completes; the reconciler only mutates states, never membership.
#[derive(Debug, Default)]
pub struct Registry {
    jobs: Vec<Job>,
}

impl Registry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a freshly dispatched job. Called only during the dispatch phase.
    pub fn insert(&mut self, job: Job) {
        debug_assert!(self.get(&job.job_id).is_none(), "duplicate job_id in run");
        self.jobs.push(job);
    }

    pub fn get(&self, job_id: &str) -> Option<&Job> {
        self.jobs.iter().find(|j| j.job_id == job_id)
    }

    pub fn get_mut(&mut self, job_id: &str) -> Option<&mut Job> {
        self.jobs.iter_mut().find(|j| j.job_id == job_id)
    }

    /// Jobs in dispatch order.
    pub fn jobs(&self) -> &[Job] {
        &self.jobs
    }

    pub fn len(&self) -> usize {
        self.jobs.len()
    }

    pub fn is_empty(&self) -> bool {
        self.jobs.is_empty()
    }

    pub fn all_terminal(&self) -> bool {
        self.jobs.iter().all(|j| j.state.is_terminal())
    }

    /// (succeeded, failed, pending) counts for summary display.
    pub fn tally(&self) -> (usize, usize, usize) {
        let mut counts = (0, 0, 0);
        for job in &self.jobs {
            match job.state {
                JobState::Succeeded { .. } => counts.0 += 1,
                JobState::Failed { .. } => counts.1 += 1,
                JobState::Pending => counts.2 += 1,
            }
        }
        counts
    }
}
