use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use bytes::Bytes;
use reqwest::header::{HeaderMap, HeaderValue, ACCEPT, USER_AGENT};
use reqwest::{Client, StatusCode};
use url::Url;

use super::{decode_frame_bytes, Frame, FrameDiskCache};
use crate::config::{AppConfig, SourceKind};
use crate::sequence::SequenceDescriptor;
use crate::{Error, Result};

const MAX_RETRIES: u32 = 3;
const INITIAL_RETRY_DELAY_MS: u64 = 250;
const MAX_FRAME_BYTES: usize = 16 * 1024 * 1024;
const IMAGES_PREFIX: &str = "images/";

/// Where frame bytes come from
#[async_trait]
pub trait FrameSource: Send + Sync {
    /// Fetch and decode one frame
    async fn fetch(&self, sequence: &SequenceDescriptor, index: u32) -> Result<Frame>;

    /// Make a frame cheap to fetch later. Defaults to a full fetch.
    async fn warm(&self, sequence: &SequenceDescriptor, index: u32) -> Result<()> {
        self.fetch(sequence, index).await.map(|_| ())
    }

    /// Human-readable location of a frame, for logs and reports
    fn locate(&self, sequence: &SequenceDescriptor, index: u32) -> String;
}

/// Reads frames from `<root>/sequence/<name>/`
#[derive(Debug, Clone)]
pub struct FsFrameSource {
    root: PathBuf,
}

impl FsFrameSource {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    pub fn frame_path(&self, sequence: &SequenceDescriptor, index: u32) -> PathBuf {
        self.root
            .join(sequence.layout().relative_path(sequence.name(), index))
    }
}

#[async_trait]
impl FrameSource for FsFrameSource {
    async fn fetch(&self, sequence: &SequenceDescriptor, index: u32) -> Result<Frame> {
        let path = self.frame_path(sequence, index);
        let bytes = tokio::fs::read(&path).await?;
        decode_off_thread(bytes).await
    }

    fn locate(&self, sequence: &SequenceDescriptor, index: u32) -> String {
        self.frame_path(sequence, index).display().to_string()
    }
}

/// Fetches frames from `<base_url>/images/sequence/<name>/`, optionally through a disk cache
pub struct HttpFrameSource {
    client: Client,
    base_url: Url,
    cache: Option<FrameDiskCache>,
}

impl HttpFrameSource {
    pub fn new(base_url: &str, timeout_secs: u64, cache: Option<FrameDiskCache>) -> Result<Self> {
        let mut base_url = Url::parse(base_url)?;
        if !base_url.path().ends_with('/') {
            let path = format!("{}/", base_url.path());
            base_url.set_path(&path);
        }

        let client = Client::builder()
            .timeout(Duration::from_secs(timeout_secs))
            .gzip(true)
            .brotli(true)
            .build()?;

        Ok(Self {
            client,
            base_url,
            cache,
        })
    }

    pub fn frame_url(&self, sequence: &SequenceDescriptor, index: u32) -> Result<Url> {
        let path = format!(
            "{}{}",
            IMAGES_PREFIX,
            sequence.layout().url_path(sequence.name(), index)
        );
        Ok(self.base_url.join(&path)?)
    }

    fn build_headers() -> HeaderMap {
        let mut headers = HeaderMap::new();
        headers.insert(
            ACCEPT,
            HeaderValue::from_static("image/webp,image/png,image/jpeg,image/*;q=0.8"),
        );
        headers.insert(
            USER_AGENT,
            HeaderValue::from_static(concat!("scrollreel/", env!("CARGO_PKG_VERSION"))),
        );
        headers
    }

    /// Fetch with retry and exponential backoff on 429/503 and transport errors
    async fn fetch_with_retry(&self, url: &Url) -> Result<Bytes> {
        let mut last_error = None;
        let mut delay_ms = INITIAL_RETRY_DELAY_MS;

        for attempt in 0..MAX_RETRIES {
            match self
                .client
                .get(url.clone())
                .headers(Self::build_headers())
                .send()
                .await
            {
                Ok(response) => {
                    let status = response.status();
                    if status == StatusCode::TOO_MANY_REQUESTS
                        || status == StatusCode::SERVICE_UNAVAILABLE
                    {
                        tracing::debug!(
                            url = %url,
                            status = %status,
                            attempt = attempt + 1,
                            delay_ms,
                            "Frame server busy, retrying"
                        );
                        last_error = Some(Error::Other(format!("HTTP {} for {}", status, url)));
                    } else if !status.is_success() {
                        return Err(Error::Other(format!("HTTP {} for {}", status, url)));
                    } else {
                        match response.bytes().await {
                            Ok(bytes) if bytes.len() > MAX_FRAME_BYTES => {
                                return Err(Error::Other(format!(
                                    "Frame too large ({}B > {}B): {}",
                                    bytes.len(),
                                    MAX_FRAME_BYTES,
                                    url
                                )));
                            }
                            Ok(bytes) => return Ok(bytes),
                            Err(e) => last_error = Some(Error::Http(e)),
                        }
                    }
                }
                Err(e) => {
                    tracing::debug!(url = %url, attempt = attempt + 1, error = %e, "Frame request failed");
                    last_error = Some(Error::Http(e));
                }
            }

            if attempt < MAX_RETRIES - 1 {
                tokio::time::sleep(Duration::from_millis(delay_ms)).await;
                delay_ms *= 2;
            }
        }

        Err(last_error.unwrap_or_else(|| {
            Error::Other(format!("Failed to fetch {} after {} retries", url, MAX_RETRIES))
        }))
    }

    async fn bytes_for(&self, url: &Url) -> Result<Vec<u8>> {
        if let Some(cache) = &self.cache {
            if let Some(bytes) = cache.load(url.as_str()).await {
                return Ok(bytes);
            }
        }

        let bytes = self.fetch_with_retry(url).await?;

        if let Some(cache) = &self.cache {
            if let Err(e) = cache.save(url.as_str(), &bytes).await {
                tracing::debug!(url = %url, error = %e, "Failed to write frame cache");
            }
        }

        Ok(bytes.to_vec())
    }
}

#[async_trait]
impl FrameSource for HttpFrameSource {
    async fn fetch(&self, sequence: &SequenceDescriptor, index: u32) -> Result<Frame> {
        let url = self.frame_url(sequence, index)?;
        let bytes = self.bytes_for(&url).await?;
        decode_off_thread(bytes).await
    }

    /// Populate the disk cache without decoding
    async fn warm(&self, sequence: &SequenceDescriptor, index: u32) -> Result<()> {
        let url = self.frame_url(sequence, index)?;
        match &self.cache {
            Some(cache) if cache.is_cached(url.as_str()) => Ok(()),
            Some(_) => self.bytes_for(&url).await.map(|_| ()),
            None => self.fetch(sequence, index).await.map(|_| ()),
        }
    }

    fn locate(&self, sequence: &SequenceDescriptor, index: u32) -> String {
        self.frame_url(sequence, index)
            .map(|u| u.to_string())
            .unwrap_or_else(|e| format!("<invalid url: {}>", e))
    }
}

async fn decode_off_thread(bytes: Vec<u8>) -> Result<Frame> {
    tokio::task::spawn_blocking(move || decode_frame_bytes(&bytes))
        .await
        .map_err(|e| Error::Other(format!("Decode task failed: {}", e)))?
}

/// Build the frame source selected by the loader configuration
pub fn source_from_config(config: &AppConfig) -> Result<Arc<dyn FrameSource>> {
    match config.loader.source {
        SourceKind::Filesystem => Ok(Arc::new(FsFrameSource::new(config.assets_dir()))),
        SourceKind::Http => {
            let base_url = config
                .loader
                .base_url
                .as_deref()
                .ok_or_else(|| Error::Config("loader.base_url is required for the http source".to_string()))?;
            let cache = if config.loader.disk_cache {
                match FrameDiskCache::new(&config.frame_cache_dir()) {
                    Ok(cache) => Some(cache),
                    Err(e) => {
                        tracing::warn!(error = %e, "Frame disk cache unavailable");
                        None
                    }
                }
            } else {
                None
            };
            tracing::info!(base_url, cached = cache.is_some(), "Using HTTP frame source");
            Ok(Arc::new(HttpFrameSource::new(
                base_url,
                config.loader.request_timeout_secs,
                cache,
            )?))
        }
    }
}
