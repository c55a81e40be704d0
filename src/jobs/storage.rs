use crate::error::{JobError, Result};
use async_trait::async_trait;
use std::path::PathBuf;
use std::sync::Arc;
use tokio::fs;
use tokio::io::AsyncWriteExt;

/// Stores a finished WAV file under a public URL.
///
/// `as_streaming` is a capability probe: storage backends that can accept a
/// header then a sequence of PCM chunks (without buffering the whole file
/// in memory first) return `Some`, and the processor prefers that path when
/// available. Backends without a streaming-friendly write API return
/// `None` and the processor falls back to buffering the concatenated WAV
/// and calling [`AudioStorage::upload`].
#[async_trait]
pub trait AudioStorage: Send + Sync {
    async fn upload(&self, data: Vec<u8>, filename: &str) -> Result<String>;

    fn as_streaming(&self) -> Option<&dyn StreamingAudioStorage> {
        None
    }
}

/// A write handle accepting exactly one 44-byte WAV header followed by any
/// number of PCM chunks, finishing to a public URL.
#[async_trait]
pub trait StreamingSink: Send {
    async fn write_header(&mut self, header: &[u8]) -> Result<()>;
    async fn write_pcm(&mut self, data: &[u8]) -> Result<()>;
    async fn finish(self: Box<Self>) -> Result<String>;

    /// Discard whatever has been written so far. Called when synthesis
    /// fails mid-chunk so no partial temp objects are left behind.
    async fn abort(self: Box<Self>) -> Result<()>;
}

/// Backends that support [`StreamingSink`]-style uploads.
#[async_trait]
pub trait StreamingAudioStorage: Send + Sync {
    async fn begin_upload(&self, filename: &str) -> Result<Box<dyn StreamingSink>>;
}

/// Stores audio under a local directory served by `tower_http::services::ServeDir`.
/// "Publicly readable" is modeled as "reachable under the served directory
/// root" rather than a per-object ACL, since there's no cloud object-store
/// crate anywhere in the reference dependency graphs to ground one.
pub struct FileSystemAudioStorage {
    root: PathBuf,
    public_base_url: String,
}

impl FileSystemAudioStorage {
    pub fn new(root: PathBuf, public_base_url: String) -> Self {
        Self { root, public_base_url }
    }

    fn public_url(&self, filename: &str) -> String {
        format!("{}/{}", self.public_base_url.trim_end_matches('/'), filename)
    }

    async fn ensure_parent_dir(&self, path: &PathBuf) -> Result<()> {
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).await?;
        }
        Ok(())
    }
}

#[async_trait]
impl AudioStorage for FileSystemAudioStorage {
    async fn upload(&self, data: Vec<u8>, filename: &str) -> Result<String> {
        let path = self.root.join(filename);
        self.ensure_parent_dir(&path).await?;
        fs::write(&path, &data).await?;
        Ok(self.public_url(filename))
    }

    fn as_streaming(&self) -> Option<&dyn StreamingAudioStorage> {
        Some(self)
    }
}

#[async_trait]
impl StreamingAudioStorage for FileSystemAudioStorage {
    async fn begin_upload(&self, filename: &str) -> Result<Box<dyn StreamingSink>> {
        let final_path = self.root.join(filename);
        self.ensure_parent_dir(&final_path).await?;

        let header_path = append_extension(&final_path, "hdr.tmp");
        let pcm_path = append_extension(&final_path, "pcm.tmp");

        Ok(Box::new(FileSystemStreamingSink {
            header_path,
            pcm_file: fs::File::create(&pcm_path).await?,
            pcm_path,
            final_path,
            public_url: self.public_url(filename),
        }))
    }
}

fn append_extension(path: &std::path::Path, suffix: &str) -> PathBuf {
    let mut name = path.as_os_str().to_os_string();
    name.push(".");
    name.push(suffix);
    PathBuf::from(name)
}

struct FileSystemStreamingSink {
    header_path: PathBuf,
    pcm_file: fs::File,
    pcm_path: PathBuf,
    final_path: PathBuf,
    public_url: String,
}

#[async_trait]
impl StreamingSink for FileSystemStreamingSink {
    async fn write_header(&mut self, header: &[u8]) -> Result<()> {
        fs::write(&self.header_path, header).await?;
        Ok(())
    }

    async fn write_pcm(&mut self, data: &[u8]) -> Result<()> {
        self.pcm_file.write_all(data).await?;
        Ok(())
    }

    async fn finish(mut self: Box<Self>) -> Result<String> {
        self.pcm_file.flush().await?;

        let header = fs::read(&self.header_path).await?;
        let pcm = fs::read(&self.pcm_path).await?;

        let mut composed = Vec::with_capacity(header.len() + pcm.len());
        composed.extend_from_slice(&header);
        composed.extend_from_slice(&pcm);

        fs::write(&self.final_path, &composed).await?;
        let _ = fs::remove_file(&self.header_path).await;
        let _ = fs::remove_file(&self.pcm_path).await;

        Ok(self.public_url)
    }

    async fn abort(self: Box<Self>) -> Result<()> {
        let _ = fs::remove_file(&self.header_path).await;
        let _ = fs::remove_file(&self.pcm_path).await;
        Ok(())
    }
}

/// A capability-probing test double that records what was uploaded without
/// touching the filesystem.
#[derive(Default)]
pub struct InMemoryAudioStorage {
    pub base_url: String,
    uploads: std::sync::Mutex<Vec<(String, Vec<u8>)>>,
}

impl InMemoryAudioStorage {
    pub fn new(base_url: impl Into<String>) -> Self {
        Self {
            base_url: base_url.into(),
            uploads: Default::default(),
        }
    }

    pub fn uploads(&self) -> Vec<(String, Vec<u8>)> {
        self.uploads.lock().unwrap().clone()
    }
}

#[async_trait]
impl AudioStorage for InMemoryAudioStorage {
    async fn upload(&self, data: Vec<u8>, filename: &str) -> Result<String> {
        self.uploads.lock().unwrap().push((filename.to_string(), data));
        Ok(format!("{}/{}", self.base_url.trim_end_matches('/'), filename))
    }
}

/// Helper so trait objects can be shared across the processor and the
/// router state without re-deriving `Arc<dyn AudioStorage>` call sites.
pub type SharedAudioStorage = Arc<dyn AudioStorage>;
