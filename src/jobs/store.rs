use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;

use chrono::Utc;
use tokio::sync::Mutex;
use tokio::task::JoinHandle;
use tracing::info;
use uuid::Uuid;

use super::types::{Job, JobStatus, JobUpdate};

// Retention is deliberately not configurable: a slow client that has not
// collected its result within the window loses it.
const JOB_RETENTION_MINUTES: i64 = 30;
const SWEEP_INTERVAL_SECS: u64 = 300;

/// In-memory registry of job records. Nothing survives a restart.
pub struct JobStore {
    jobs: Mutex<HashMap<String, Job>>,
}

impl JobStore {
    pub fn new() -> Self {
        Self {
            jobs: Mutex::new(HashMap::new()),
        }
    }

    /// Insert a fresh queued record and return its id.
    pub async fn create(&self) -> String {
        let job_id = format!("job-{}", Uuid::new_v4());
        let job = Job {
            job_id: job_id.clone(),
            status: JobStatus::Queued,
            progress: 0,
            progress_message: "Waiting in queue...".to_string(),
            result: None,
            error: None,
            created_at: Utc::now(),
        };
        self.jobs.lock().await.insert(job_id.clone(), job);
        info!("Created job {}", job_id);
        job_id
    }

    pub async fn get(&self, job_id: &str) -> Option<Job> {
        self.jobs.lock().await.get(job_id).cloned()
    }

    /// Merge `update` into the record. Updates against unknown ids (for
    /// example after eviction) and against terminal records are dropped
    /// silently.
    pub async fn update(&self, job_id: &str, update: JobUpdate) {
        let mut jobs = self.jobs.lock().await;
        let Some(job) = jobs.get_mut(job_id) else {
            return;
        };
        if job.status.is_terminal() {
            return;
        }
        job.apply(update);
    }

    pub async fn delete(&self, job_id: &str) {
        if self.jobs.lock().await.remove(job_id).is_some() {
            info!("Deleted job {}", job_id);
        }
    }

    /// Evict terminal records older than `retention`. Queued and running
    /// jobs are kept regardless of age.
    pub async fn sweep_expired(&self, retention: chrono::Duration) -> usize {
        let cutoff = Utc::now() - retention;
        let mut jobs = self.jobs.lock().await;
        let before = jobs.len();
        jobs.retain(|_, job| !(job.status.is_terminal() && job.created_at < cutoff));
        before - jobs.len()
    }

    /// Start the periodic retention sweep.
    pub fn spawn_sweeper(self: Arc<Self>) -> JoinHandle<()> {
        let store = self;
        tokio::spawn(async move {
            let mut interval = tokio::time::interval(Duration::from_secs(SWEEP_INTERVAL_SECS));
            loop {
                interval.tick().await;
                let evicted = store
                    .sweep_expired(chrono::Duration::minutes(JOB_RETENTION_MINUTES))
                    .await;
                if evicted > 0 {
                    info!("Evicted {} expired job records", evicted);
                }
            }
        })
    }
}

impl Default for JobStore {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_create_and_get() {
        let store = JobStore::new();
        let job_id = store.create().await;

        let job = store.get(&job_id).await.unwrap();
        assert_eq!(job.job_id, job_id);
        assert_eq!(job.status, JobStatus::Queued);
        assert_eq!(job.progress, 0);
        assert!(job.result.is_none());
        assert!(job.error.is_none());

        assert!(store.get("job-unknown").await.is_none());
    }

    #[tokio::test]
    async fn test_update_merges_partial_fields() {
        let store = JobStore::new();
        let job_id = store.create().await;

        store
            .update(&job_id, JobUpdate::progress(33, "Transcribing chunk 1/3..."))
            .await;

        let job = store.get(&job_id).await.unwrap();
        assert_eq!(job.status, JobStatus::Running);
        assert_eq!(job.progress, 33);
        assert_eq!(job.progress_message, "Transcribing chunk 1/3...");
        assert!(job.result.is_none());
    }

    #[tokio::test]
    async fn test_update_after_delete_is_noop() {
        let store = JobStore::new();
        let job_id = store.create().await;
        store.delete(&job_id).await;

        store.update(&job_id, JobUpdate::progress(50, "half way")).await;
        assert!(store.get(&job_id).await.is_none());
    }

    #[tokio::test]
    async fn test_terminal_records_are_immutable() {
        let store = JobStore::new();
        let job_id = store.create().await;

        store.update(&job_id, JobUpdate::completed("the minutes")).await;
        store.update(&job_id, JobUpdate::failed("too late")).await;

        let job = store.get(&job_id).await.unwrap();
        assert_eq!(job.status, JobStatus::Completed);
        assert_eq!(job.result.as_deref(), Some("the minutes"));
        assert!(job.error.is_none());
    }

    #[tokio::test]
    async fn test_sweep_evicts_only_expired_terminal_jobs() {
        let store = JobStore::new();
        let completed_old = store.create().await;
        let failed_old = store.create().await;
        let completed_fresh = store.create().await;
        let running_old = store.create().await;
        let queued_old = store.create().await;

        store.update(&completed_old, JobUpdate::completed("done")).await;
        store.update(&failed_old, JobUpdate::failed("boom")).await;
        store.update(&completed_fresh, JobUpdate::completed("done")).await;
        store.update(&running_old, JobUpdate::progress(10, "working")).await;

        // Backdate everything except the fresh completed job.
        {
            let mut jobs = store.jobs.lock().await;
            for id in [&completed_old, &failed_old, &running_old, &queued_old] {
                jobs.get_mut(id.as_str()).unwrap().created_at =
                    Utc::now() - chrono::Duration::minutes(JOB_RETENTION_MINUTES + 15);
            }
        }

        let evicted = store
            .sweep_expired(chrono::Duration::minutes(JOB_RETENTION_MINUTES))
            .await;

        assert_eq!(evicted, 2);
        assert!(store.get(&completed_old).await.is_none());
        assert!(store.get(&failed_old).await.is_none());
        assert!(store.get(&completed_fresh).await.is_some());
        assert!(store.get(&running_old).await.is_some());
        assert!(store.get(&queued_old).await.is_some());
    }
}
