use crate::error::{JobError, Result};
use async_trait::async_trait;
use serde::Serialize;
use std::sync::Mutex;

/// Hands a job id off for asynchronous processing.
#[async_trait]
pub trait TaskQueue: Send + Sync {
    async fn enqueue(&self, job_id: &str) -> Result<()>;
}

#[derive(Serialize)]
struct ProcessTaskPayload<'a> {
    #[serde(rename = "jobId")]
    job_id: &'a str,
}

/// Posts a process-delivery request to this service's own `/jobs/process`
/// endpoint over plain HTTP, in place of a managed task-queue client. There
/// is no task-queue crate anywhere in the reference dependency graphs, so a
/// direct POST (the same wire contract a managed queue would eventually
/// deliver) is the grounded substitute.
pub struct HttpTaskQueue {
    client: reqwest::Client,
    process_url: String,
    api_key: String,
}

impl HttpTaskQueue {
    pub fn new(client: reqwest::Client, service_url: &str, api_key: String) -> Self {
        Self {
            client,
            process_url: format!("{}/jobs/process", service_url.trim_end_matches('/')),
            api_key,
        }
    }
}

#[async_trait]
impl TaskQueue for HttpTaskQueue {
    async fn enqueue(&self, job_id: &str) -> Result<()> {
        let response = self
            .client
            .post(&self.process_url)
            .header("Content-Type", "application/json")
            .header("X-API-Key", &self.api_key)
            .json(&ProcessTaskPayload { job_id })
            .send()
            .await
            .map_err(|e| JobError::QueueFailure(e.to_string()))?;

        if !response.status().is_success() {
            return Err(JobError::QueueFailure(format!(
                "enqueue job {} returned status {}",
                job_id,
                response.status()
            )));
        }

        Ok(())
    }
}

/// Captures enqueued job ids in order, for assertions in tests that don't
/// want to make network calls.
#[derive(Default)]
pub struct RecordingTaskQueue {
    enqueued: Mutex<Vec<String>>,
}

impl RecordingTaskQueue {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn enqueued(&self) -> Vec<String> {
        self.enqueued.lock().unwrap().clone()
    }
}

#[async_trait]
impl TaskQueue for RecordingTaskQueue {
    async fn enqueue(&self, job_id: &str) -> Result<()> {
        self.enqueued.lock().unwrap().push(job_id.to_string());
        Ok(())
    }
}
