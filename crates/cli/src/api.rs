//! Backend client for media lookup and download

use anyhow::{bail, Context, Result};
use pindrop_core::MediaKind;
use serde::{Deserialize, Serialize};
use std::fs::File;
use std::io::{Read, Write};
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicBool, Ordering};
use std::time::Duration;

const ANALYZE_PATH: &str = "/api/analyze";
const DOWNLOAD_PATH: &str = "/api/download";

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MediaInfo {
    #[serde(default)]
    pub id: Option<String>,
    #[serde(rename = "type")]
    pub media_type: String,
    pub url: String,
    #[serde(default)]
    pub title: Option<String>,
    #[serde(default)]
    pub thumbnail: Option<String>,
    #[serde(default)]
    pub width: Option<u32>,
    #[serde(default)]
    pub height: Option<u32>,
}

impl MediaInfo {
    pub fn kind(&self) -> MediaKind {
        MediaKind::from_media_type(&self.media_type)
    }
}

#[derive(Serialize)]
struct AnalyzeRequest<'a> {
    url: &'a str,
}

#[derive(Deserialize)]
struct AnalyzeResponse {
    media: MediaInfo,
}

#[derive(Deserialize)]
struct ErrorBody {
    detail: Option<String>,
}

#[derive(Debug, thiserror::Error)]
pub enum AnalyzeError {
    #[error("{0}")]
    InvalidUrl(String),
    #[error("Network error: {0}")]
    Network(String),
    #[error("{0}")]
    Backend(String),
}

/// Checks the URL locally before any request is made. Returns it trimmed.
pub fn validate_pin_url(url: &str) -> Result<&str, AnalyzeError> {
    let trimmed = url.trim();
    if trimmed.is_empty() {
        return Err(AnalyzeError::InvalidUrl(
            "Please paste a Pinterest URL".to_string(),
        ));
    }
    if !trimmed.contains("pinterest") && !trimmed.contains("pin.it") {
        return Err(AnalyzeError::InvalidUrl(
            "Please enter a valid Pinterest or pin.it URL".to_string(),
        ));
    }
    Ok(trimmed)
}

/// `pindrop_<id>.<ext>`, falling back to a millisecond timestamp.
pub fn file_name_for(media: &MediaInfo, kind: MediaKind) -> String {
    let id: String = media
        .id
        .as_deref()
        .unwrap_or_default()
        .chars()
        .filter(|c| c.is_ascii_alphanumeric() || *c == '-' || *c == '_')
        .collect();
    let id = if id.is_empty() {
        std::time::SystemTime::now()
            .duration_since(std::time::UNIX_EPOCH)
            .map(|d| d.as_millis().to_string())
            .unwrap_or_else(|_| "media".to_string())
    } else {
        id
    };
    format!("pindrop_{}.{}", id, kind.extension())
}

pub struct ApiClient {
    base_url: String,
    client: reqwest::blocking::Client,
}

impl ApiClient {
    pub fn new(base_url: &str, timeout: Duration) -> Result<Self, AnalyzeError> {
        let client = reqwest::blocking::Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| AnalyzeError::Network(e.to_string()))?;
        Ok(Self {
            base_url: base_url.trim_end_matches('/').to_string(),
            client,
        })
    }

    pub fn analyze(&self, url: &str) -> Result<MediaInfo, AnalyzeError> {
        let url = validate_pin_url(url)?;

        let resp = self
            .client
            .post(format!("{}{}", self.base_url, ANALYZE_PATH))
            .json(&AnalyzeRequest { url })
            .send()
            .map_err(|e| AnalyzeError::Network(e.to_string()))?;

        let status = resp.status();
        let text = resp
            .text()
            .map_err(|e| AnalyzeError::Network(e.to_string()))?;

        if !status.is_success() {
            let detail = serde_json::from_str::<ErrorBody>(&text)
                .ok()
                .and_then(|b| b.detail)
                .unwrap_or_else(|| format!("Request failed ({})", status.as_u16()));
            return Err(AnalyzeError::Backend(detail));
        }

        let data: AnalyzeResponse = serde_json::from_str(&text).map_err(|_| {
            AnalyzeError::Backend("Server returned an invalid response".to_string())
        })?;
        Ok(data.media)
    }

    /// Streams the media through the backend proxy into `dir`. Clearing
    /// `running` stops the transfer at the next chunk.
    pub fn download(
        &self,
        media: &MediaInfo,
        kind: MediaKind,
        dir: &Path,
        running: &AtomicBool,
    ) -> Result<PathBuf> {
        let title = media.title.as_deref().unwrap_or("pinterest_media");
        let mut resp = self
            .client
            .get(format!("{}{}", self.base_url, DOWNLOAD_PATH))
            .query(&[
                ("url", media.url.as_str()),
                ("filename", title),
                ("type", kind.as_str()),
            ])
            .timeout(Duration::from_secs(300))
            .send()
            .context("download request failed")?;

        if !resp.status().is_success() {
            bail!("download failed: HTTP {}", resp.status());
        }

        std::fs::create_dir_all(dir)
            .with_context(|| format!("create output dir {}", dir.display()))?;
        let path = dir.join(file_name_for(media, kind));
        save_stream(&mut resp, &path, running)?;
        Ok(path)
    }
}

const CHUNK_SIZE: usize = 64 * 1024;

/// Copies `src` into a new file at `path`. On any failure, interruption
/// included, the partial file is removed.
pub fn save_stream(src: &mut impl Read, path: &Path, running: &AtomicBool) -> Result<u64> {
    let mut file = File::create(path).with_context(|| format!("create {}", path.display()))?;
    match copy_chunks(src, &mut file, running) {
        Ok(written) => Ok(written),
        Err(e) => {
            drop(file);
            if let Err(rm) = std::fs::remove_file(path) {
                tracing::warn!(error = %rm, path = %path.display(), "could not remove partial download");
            }
            Err(e.context(format!("write {}", path.display())))
        }
    }
}

fn copy_chunks(src: &mut impl Read, dst: &mut impl Write, running: &AtomicBool) -> Result<u64> {
    let mut buf = vec![0u8; CHUNK_SIZE];
    let mut written = 0u64;
    loop {
        if !running.load(Ordering::SeqCst) {
            bail!("download interrupted");
        }
        let n = match src.read(&mut buf) {
            Ok(0) => break,
            Ok(n) => n,
            Err(e) if e.kind() == std::io::ErrorKind::Interrupted => continue,
            Err(e) => return Err(e.into()),
        };
        dst.write_all(&buf[..n])?;
        written += n as u64;
    }
    dst.flush()?;
    Ok(written)
}
