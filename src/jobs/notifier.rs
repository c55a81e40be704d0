use crate::error::{JobError, Result};
use async_trait::async_trait;
use serde::Serialize;
use std::collections::HashMap;
use std::sync::Mutex;

/// Sends a push notification to a device. Failures are logged and
/// swallowed by callers, never allowed to fail the job they're reporting
/// on.
#[async_trait]
pub trait Notifier: Send + Sync {
    async fn send(
        &self,
        device_token: &str,
        title: &str,
        body: &str,
        data: HashMap<String, String>,
    ) -> Result<()>;
}

#[derive(Serialize)]
struct ApnsAps<'a> {
    sound: &'a str,
}

#[derive(Serialize)]
struct ApnsPayload<'a> {
    aps: ApnsAps<'a>,
}

#[derive(Serialize)]
struct Notification<'a> {
    title: &'a str,
    body: &'a str,
}

#[derive(Serialize)]
struct PushMessage<'a> {
    token: &'a str,
    notification: Notification<'a>,
    data: HashMap<String, String>,
    apns: ApnsPayload<'a>,
}

/// Posts a push payload to a configurable gateway endpoint over HTTP, in
/// place of a vendor push-messaging SDK. No push-notification crate appears
/// in the reference dependency graphs, so a plain HTTP POST carrying the
/// same fields a managed gateway would forward is the grounded substitute.
pub struct HttpNotifier {
    client: reqwest::Client,
    endpoint: String,
}

impl HttpNotifier {
    pub fn new(client: reqwest::Client, endpoint: String) -> Self {
        Self { client, endpoint }
    }
}

#[async_trait]
impl Notifier for HttpNotifier {
    async fn send(
        &self,
        device_token: &str,
        title: &str,
        body: &str,
        data: HashMap<String, String>,
    ) -> Result<()> {
        let message = PushMessage {
            token: device_token,
            notification: Notification { title, body },
            data,
            apns: ApnsPayload {
                aps: ApnsAps { sound: "default" },
            },
        };

        let response = self
            .client
            .post(&self.endpoint)
            .json(&message)
            .send()
            .await
            .map_err(|e| JobError::NotifierFailure(e.to_string()))?;

        if !response.status().is_success() {
            return Err(JobError::NotifierFailure(format!(
                "push to {} returned status {}",
                device_token,
                response.status()
            )));
        }

        Ok(())
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct RecordedNotification {
    pub device_token: String,
    pub title: String,
    pub body: String,
    pub data: HashMap<String, String>,
}

/// Captures sent notifications for assertions in tests without making
/// network calls.
#[derive(Default)]
pub struct RecordingNotifier {
    sent: Mutex<Vec<RecordedNotification>>,
}

impl RecordingNotifier {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn sent(&self) -> Vec<RecordedNotification> {
        self.sent.lock().unwrap().clone()
    }
}

#[async_trait]
impl Notifier for RecordingNotifier {
    async fn send(
        &self,
        device_token: &str,
        title: &str,
        body: &str,
        data: HashMap<String, String>,
    ) -> Result<()> {
        self.sent.lock().unwrap().push(RecordedNotification {
            device_token: device_token.to_string(),
            title: title.to_string(),
            body: body.to_string(),
            data,
        });
        Ok(())
    }
}
