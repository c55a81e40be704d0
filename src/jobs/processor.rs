//! The core synthesis pipeline and the job lifecycle state machine that
//! drives it: `pending` -> `processing` -> `{completed, failed}`.

use super::generator::TtsGenerator;
use super::notifier::Notifier;
use super::queue::TaskQueue;
use super::storage::AudioStorage;
use super::store::JobStore;
use super::{Job, JobStatus};
use crate::audio::{segmenter, timepoints, wav, Timepoint};
use crate::config::constants::{DEFAULT_STYLE, DEFAULT_VOICE_ID, MAX_CHUNK_BYTES};
use crate::error::{JobError, Result};
use crate::voices::{self, VoiceOption};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::sync::Arc;
use uuid::Uuid;

/// Every external collaborator the job pipeline needs, grouped the way the
/// HTTP handlers reach them.
pub struct JobDeps {
    pub store: Arc<dyn JobStore>,
    pub queue: Arc<dyn TaskQueue>,
    pub generator: Arc<dyn TtsGenerator>,
    pub storage: Arc<dyn AudioStorage>,
    pub notifier: Arc<dyn Notifier>,
    pub http_client: reqwest::Client,
}

#[derive(Debug, Deserialize)]
pub struct CreateJobRequest {
    #[serde(default)]
    pub text: String,
    #[serde(rename = "voiceId", default)]
    pub voice_id: String,
    #[serde(default)]
    pub language: String,
    #[serde(default)]
    pub style: String,
    #[serde(rename = "fileId", default)]
    pub file_id: String,
    #[serde(rename = "deviceToken", default)]
    pub device_token: String,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct CreateJobResponse {
    #[serde(rename = "jobId")]
    pub job_id: String,
}

#[derive(Debug, Deserialize)]
pub struct ProcessTaskRequest {
    #[serde(rename = "jobId", default)]
    pub job_id: String,
}

/// The result of synthesizing and stitching every chunk of a job's text.
pub struct ProcessResult {
    pub audio_url: String,
    pub timepoints: Vec<Timepoint>,
}

/// Validate and persist a new job, then best-effort enqueue it for
/// processing. Enqueue failures are logged, not surfaced: the job is
/// already durable and can be retried via the existing delivery path.
pub async fn create_job(deps: &JobDeps, req: CreateJobRequest) -> Result<Job> {
    if req.text.trim().is_empty() {
        return Err(JobError::InvalidRequest("text is required".into()));
    }

    let voice_id = if req.voice_id.is_empty() {
        DEFAULT_VOICE_ID.to_string()
    } else {
        req.voice_id
    };

    let language = if req.language.is_empty() {
        voices::get_by_id(&voice_id)
            .map(|v| v.language.to_string())
            .unwrap_or_default()
    } else {
        req.language
    };

    let style = if req.style.is_empty() {
        DEFAULT_STYLE.to_string()
    } else {
        req.style
    };

    let job = Job::new(req.text, None, voice_id, language, style, req.file_id, req.device_token);

    deps.store
        .create(job.clone())
        .await
        .map_err(|e| JobError::StoreFailure(e.to_string()))?;

    if let Err(e) = deps.queue.enqueue(&job.id).await {
        tracing::warn!("create_job: enqueue {} failed: {}", job.id, e);
    }

    tracing::info!(
        "create_job: created jobId={} text_len={} voiceId={}",
        job.id,
        job.text.len(),
        job.voice_id
    );

    Ok(job)
}

/// Fetch the current state of a job.
pub async fn get_job(deps: &JobDeps, job_id: &str) -> Result<Job> {
    deps.store.get(job_id).await
}

/// Resolve the text to synthesize: the job's inline `text`, or the body
/// fetched from `text_url` when set.
async fn resolve_text(job: &Job, client: &reqwest::Client) -> Result<String> {
    match &job.text_url {
        Some(url) => {
            let response = client
                .get(url)
                .send()
                .await
                .map_err(|e| JobError::UpstreamTtsFailure(format!("fetch text_url: {}", e)))?;
            response
                .text()
                .await
                .map_err(|e| JobError::UpstreamTtsFailure(format!("read text_url body: {}", e)))
        }
        None => Ok(job.text.clone()),
    }
}

/// Segment the job's text, synthesize each chunk in order, stitch the
/// resulting WAV audio, re-base every chunk's timepoints into the full
/// job's coordinate space, and publish the combined audio.
///
/// Chunks are synthesized strictly in order (not concurrently): each
/// chunk's timepoints are shifted by the cumulative duration of every
/// chunk synthesized before it, so the order is load-bearing.
pub async fn process_job(job: &Job, voice: &VoiceOption, deps: &JobDeps) -> Result<ProcessResult> {
    let text = resolve_text(job, &deps.http_client).await?;
    let chunks = segmenter::split(&text, MAX_CHUNK_BYTES);

    if let Some(streaming) = deps.storage.as_streaming() {
        let filename = format!("audio/jobs/{}_{}.wav", job.voice_id, Uuid::new_v4());
        let mut sink = streaming.begin_upload(&filename).await?;

        let mut all_timepoints = Vec::new();
        let mut cumulative_time = 0.0;
        let mut header_written = false;

        for chunk in &chunks {
            let generated = deps.generator.generate(&chunk.text, voice, &job.language).await;
            let (audio_data, tps) = match generated {
                Ok(pair) => pair,
                Err(e) => {
                    sink.abort().await?;
                    return Err(e);
                }
            };

            let adjusted = timepoints::adjust(&tps, chunk.char_offset, cumulative_time);
            all_timepoints.extend(adjusted);
            cumulative_time += wav::duration(&audio_data);

            if !header_written && audio_data.len() >= 44 {
                if let Err(e) = sink.write_header(&audio_data[..44]).await {
                    sink.abort().await?;
                    return Err(e);
                }
                header_written = true;
            }
            if audio_data.len() > 44 {
                if let Err(e) = sink.write_pcm(&audio_data[44..]).await {
                    sink.abort().await?;
                    return Err(e);
                }
            }
        }

        let audio_url = sink.finish().await?;
        return Ok(ProcessResult {
            audio_url,
            timepoints: all_timepoints,
        });
    }

    let mut wav_files = Vec::new();
    let mut all_timepoints = Vec::new();
    let mut cumulative_time = 0.0;

    for chunk in &chunks {
        let (audio_data, tps) = deps
            .generator
            .generate(&chunk.text, voice, &job.language)
            .await?;

        let adjusted = timepoints::adjust(&tps, chunk.char_offset, cumulative_time);
        all_timepoints.extend(adjusted);
        cumulative_time += wav::duration(&audio_data);
        wav_files.push(audio_data);
    }

    let combined = wav::concatenate(&wav_files)?;
    let filename = format!("audio/jobs/{}_{}.wav", job.voice_id, Uuid::new_v4());
    let audio_url = deps.storage.upload(combined, &filename).await?;

    Ok(ProcessResult {
        audio_url,
        timepoints: all_timepoints,
    })
}

async fn fail_job(deps: &JobDeps, job: &Job, error_msg: String) {
    if let Err(e) = deps.store.set_failed(&job.id, error_msg.clone()).await {
        tracing::warn!("fail_job: set_failed {} failed: {}", job.id, e);
    }
    notify_failed(deps, job, &error_msg).await;
}

async fn notify_completed(deps: &JobDeps, job: &Job, result: &ProcessResult) {
    if job.device_token.is_empty() {
        return;
    }
    let mut data = HashMap::new();
    data.insert("jobId".to_string(), job.id.clone());
    data.insert("audioUrl".to_string(), result.audio_url.clone());
    data.insert("fileId".to_string(), job.file_id.clone());
    data.insert("status".to_string(), "completed".to_string());

    if let Err(e) = deps
        .notifier
        .send(
            &job.device_token,
            "音声生成完了",
            "テキストの読み上げ音声が生成されました",
            data,
        )
        .await
    {
        tracing::warn!("notify_completed: {} failed: {}", job.id, e);
    }
}

async fn notify_failed(deps: &JobDeps, job: &Job, error_msg: &str) {
    if job.device_token.is_empty() {
        return;
    }
    let mut data = HashMap::new();
    data.insert("jobId".to_string(), job.id.clone());
    data.insert("fileId".to_string(), job.file_id.clone());
    data.insert("status".to_string(), "failed".to_string());
    data.insert("error".to_string(), error_msg.to_string());

    if let Err(e) = deps
        .notifier
        .send(&job.device_token, "音声生成失敗", "音声の生成に失敗しました", data)
        .await
    {
        tracing::warn!("notify_failed: {} failed: {}", job.id, e);
    }
}

/// Drive a single delivery of `POST /jobs/process`. Always succeeds from
/// the caller's point of view (it only returns `Err` for a malformed
/// request, which the HTTP layer maps to 400); every failure encountered
/// while synthesizing is recorded on the job and acknowledged with 200 so a
/// task-queue redelivery mechanism does not retry an error that will never
/// resolve.
///
/// A job id the store doesn't recognize is swallowed rather than treated
/// as an error, since at-least-once delivery means the same id can arrive
/// more than once after the job has already been cleaned up.
///
/// Re-running this on an already-completed job re-synthesizes and
/// overwrites the audio URL with a fresh upload rather than short-circuiting:
/// redelivery is expected to be idempotent in effect, not a no-op.
pub async fn handle_process_delivery(deps: &JobDeps, job_id: &str) -> Result<()> {
    if job_id.is_empty() {
        return Err(JobError::InvalidRequest("jobId required".into()));
    }

    let job = match deps.store.get(job_id).await {
        Ok(job) => job,
        Err(_) => {
            tracing::info!("handle_process_delivery: job {} not found, skipping", job_id);
            return Ok(());
        }
    };

    if let Err(e) = deps.store.set_processing(&job.id).await {
        tracing::warn!("handle_process_delivery: set_processing {} failed: {}", job.id, e);
    }

    let voice = match voices::get_by_id(&job.voice_id) {
        Some(voice) => voice,
        None => {
            let msg = format!("unknown voiceId: {}", job.voice_id);
            tracing::warn!("handle_process_delivery: {}", msg);
            fail_job(deps, &job, msg).await;
            return Ok(());
        }
    };

    match process_job(&job, voice, deps).await {
        Ok(result) => {
            if let Err(e) = deps
                .store
                .set_completed(&job.id, result.audio_url.clone(), result.timepoints.clone())
                .await
            {
                tracing::warn!("handle_process_delivery: set_completed {} failed: {}", job.id, e);
            }
            notify_completed(deps, &job, &result).await;
            tracing::info!(
                "handle_process_delivery: completed jobId={} audioUrl={}",
                job.id,
                result.audio_url
            );
        }
        Err(e) => {
            tracing::warn!("handle_process_delivery: process {} failed: {}", job.id, e);
            fail_job(deps, &job, e.to_string()).await;
        }
    }

    Ok(())
}
