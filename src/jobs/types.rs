use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt::Display;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum JobStatus {
    Queued,
    Running,
    Completed,
    Failed,
}

impl JobStatus {
    /// Completed and failed jobs accept no further updates and are
    /// eligible for eviction by the retention sweep.
    pub fn is_terminal(self) -> bool {
        matches!(self, JobStatus::Completed | JobStatus::Failed)
    }
}

impl Display for JobStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{:?}", self)
    }
}

/// One submitted unit of work, polled by the client until it reaches a
/// terminal status. Field names serialize to the camelCase shape the
/// polling frontend expects.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Job {
    pub job_id: String,
    pub status: JobStatus,
    pub progress: u8,
    pub progress_message: String,
    pub result: Option<String>,
    pub error: Option<String>,
    pub created_at: DateTime<Utc>,
}

impl Job {
    pub(crate) fn apply(&mut self, update: JobUpdate) {
        if let Some(status) = update.status {
            self.status = status;
        }
        if let Some(progress) = update.progress {
            self.progress = progress;
        }
        if let Some(message) = update.progress_message {
            self.progress_message = message;
        }
        if let Some(result) = update.result {
            self.result = Some(result);
        }
        if let Some(error) = update.error {
            self.error = Some(error);
        }
    }
}

/// Partial-field merge applied to an existing job record. Only `Some`
/// fields are written.
#[derive(Debug, Clone, Default)]
pub struct JobUpdate {
    pub status: Option<JobStatus>,
    pub progress: Option<u8>,
    pub progress_message: Option<String>,
    pub result: Option<String>,
    pub error: Option<String>,
}

impl JobUpdate {
    pub fn progress(progress: u8, message: impl Into<String>) -> Self {
        Self {
            status: Some(JobStatus::Running),
            progress: Some(progress),
            progress_message: Some(message.into()),
            ..Self::default()
        }
    }

    pub fn completed(result: impl Into<String>) -> Self {
        Self {
            status: Some(JobStatus::Completed),
            progress: Some(100),
            progress_message: Some("Minutes ready".to_string()),
            result: Some(result.into()),
            ..Self::default()
        }
    }

    pub fn failed(error: impl Into<String>) -> Self {
        Self {
            status: Some(JobStatus::Failed),
            progress_message: Some("Job failed".to_string()),
            error: Some(error.into()),
            ..Self::default()
        }
    }
}
