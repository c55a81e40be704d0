use super::{Job, JobStatus};
use crate::audio::Timepoint;
use crate::error::{JobError, Result};
use async_trait::async_trait;
use chrono::Utc;
use dashmap::DashMap;

/// Persists and retrieves job documents. Implementations must make each
/// mutation atomic on a single job id; callers never need cross-job
/// transactions.
#[async_trait]
pub trait JobStore: Send + Sync {
    async fn create(&self, job: Job) -> Result<()>;
    async fn get(&self, job_id: &str) -> Result<Job>;
    async fn set_processing(&self, job_id: &str) -> Result<()>;
    async fn set_completed(
        &self,
        job_id: &str,
        audio_url: String,
        timepoints: Vec<Timepoint>,
    ) -> Result<()>;
    async fn set_failed(&self, job_id: &str, error_msg: String) -> Result<()>;
}

/// In-process job store backed by a sharded concurrent map. Each method
/// only ever touches one entry, so `DashMap`'s per-shard locking gives the
/// single-document atomicity the contract requires without a separate
/// transaction mechanism.
#[derive(Default)]
pub struct InMemoryJobStore {
    jobs: DashMap<String, Job>,
}

impl InMemoryJobStore {
    pub fn new() -> Self {
        Self {
            jobs: DashMap::new(),
        }
    }
}

#[async_trait]
impl JobStore for InMemoryJobStore {
    async fn create(&self, job: Job) -> Result<()> {
        self.jobs.insert(job.id.clone(), job);
        Ok(())
    }

    async fn get(&self, job_id: &str) -> Result<Job> {
        self.jobs
            .get(job_id)
            .map(|entry| entry.clone())
            .ok_or_else(|| JobError::NotFound(job_id.to_string()))
    }

    async fn set_processing(&self, job_id: &str) -> Result<()> {
        let mut entry = self
            .jobs
            .get_mut(job_id)
            .ok_or_else(|| JobError::NotFound(job_id.to_string()))?;
        entry.status = JobStatus::Processing;
        entry.updated_at = Utc::now();
        Ok(())
    }

    async fn set_completed(
        &self,
        job_id: &str,
        audio_url: String,
        timepoints: Vec<Timepoint>,
    ) -> Result<()> {
        let mut entry = self
            .jobs
            .get_mut(job_id)
            .ok_or_else(|| JobError::NotFound(job_id.to_string()))?;
        entry.status = JobStatus::Completed;
        entry.audio_url = Some(audio_url);
        if !timepoints.is_empty() {
            entry.timepoints = Some(timepoints);
        }
        entry.updated_at = Utc::now();
        Ok(())
    }

    async fn set_failed(&self, job_id: &str, error_msg: String) -> Result<()> {
        let mut entry = self
            .jobs
            .get_mut(job_id)
            .ok_or_else(|| JobError::NotFound(job_id.to_string()))?;
        entry.status = JobStatus::Failed;
        entry.error_msg = Some(error_msg);
        entry.updated_at = Utc::now();
        Ok(())
    }
}
