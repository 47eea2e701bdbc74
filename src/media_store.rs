//! # Media Store Module
//!
//! Blob store for uploaded photos and videos. Files are written into a single
//! directory as `<unix_timestamp>_<kind>.<extension>`.

use anyhow::{Context, Result};
use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use tokio::io::AsyncWriteExt;
use tracing::{debug, info};

use crate::dialogue::MediaKind;

const PHOTO_EXTENSIONS: &[&str] = &["jpg", "jpeg", "png"];
const VIDEO_EXTENSIONS: &[&str] = &["mp4"];
const MAX_NAME_ATTEMPTS: usize = 1000;

/// How a stored file is sent back to the administrator
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MediaClass {
    Photo,
    Video,
    Document,
}

/// Classify a stored file by its extension (case-insensitive)
pub fn classify(path: &Path) -> MediaClass {
    let extension = path
        .extension()
        .and_then(|e| e.to_str())
        .map(str::to_lowercase)
        .unwrap_or_default();

    if PHOTO_EXTENSIONS.contains(&extension.as_str()) {
        MediaClass::Photo
    } else if VIDEO_EXTENSIONS.contains(&extension.as_str()) {
        MediaClass::Video
    } else {
        MediaClass::Document
    }
}

/// Extension of a transport-side file path, or the kind's default
pub fn extension_from_remote_path(remote_path: &str, kind: MediaKind) -> String {
    remote_path
        .rsplit_once('.')
        .map(|(_, ext)| ext)
        .filter(|ext| !ext.is_empty() && ext.chars().all(|c| c.is_ascii_alphanumeric()))
        .map(str::to_string)
        .unwrap_or_else(|| kind.default_extension().to_string())
}

/// File name for a capture; `attempt > 0` disambiguates same-second uploads
pub fn media_file_name(timestamp: i64, kind: MediaKind, extension: &str, attempt: usize) -> String {
    if attempt == 0 {
        format!("{timestamp}_{}.{extension}", kind.as_str())
    } else {
        format!("{timestamp}_{}_{attempt}.{extension}", kind.as_str())
    }
}

/// A file found in the media directory
#[derive(Debug, Clone, PartialEq)]
pub struct StoredMedia {
    pub file_name: String,
    pub path: PathBuf,
    pub class: MediaClass,
}

/// Directory-backed media blob store
#[derive(Debug, Clone)]
pub struct MediaStore {
    dir: PathBuf,
}

impl MediaStore {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    pub async fn ensure_dir(&self) -> Result<()> {
        tokio::fs::create_dir_all(&self.dir)
            .await
            .with_context(|| format!("Failed to create media directory {}", self.dir.display()))
    }

    /// Save a capture stamped with the current time
    pub async fn save(&self, kind: MediaKind, extension: &str, bytes: &[u8]) -> Result<PathBuf> {
        self.save_at(chrono::Utc::now().timestamp(), kind, extension, bytes)
            .await
    }

    /// Save a capture under an explicit timestamp, never overwriting an existing file
    pub async fn save_at(
        &self,
        timestamp: i64,
        kind: MediaKind,
        extension: &str,
        bytes: &[u8],
    ) -> Result<PathBuf> {
        self.ensure_dir().await?;

        for attempt in 0..MAX_NAME_ATTEMPTS {
            let destination = self.dir.join(media_file_name(timestamp, kind, extension, attempt));
            let mut file = match tokio::fs::OpenOptions::new()
                .write(true)
                .create_new(true)
                .open(&destination)
                .await
            {
                Ok(file) => file,
                Err(e) if e.kind() == ErrorKind::AlreadyExists => continue,
                Err(e) => {
                    return Err(e).with_context(|| {
                        format!("Failed to create media file {}", destination.display())
                    })
                }
            };

            file.write_all(bytes)
                .await
                .with_context(|| format!("Failed to write media file {}", destination.display()))?;
            file.flush().await?;

            info!(path = %destination.display(), size = bytes.len(), "Media file saved");
            return Ok(destination);
        }

        anyhow::bail!(
            "No free file name for {timestamp}_{} in {}",
            kind.as_str(),
            self.dir.display()
        )
    }

    /// All regular files in the store, sorted by name; a missing directory is empty
    pub async fn list(&self) -> Result<Vec<StoredMedia>> {
        let mut entries = match tokio::fs::read_dir(&self.dir).await {
            Ok(entries) => entries,
            Err(e) if e.kind() == ErrorKind::NotFound => {
                debug!(dir = %self.dir.display(), "Media directory does not exist yet");
                return Ok(Vec::new());
            }
            Err(e) => {
                return Err(e).with_context(|| {
                    format!("Failed to read media directory {}", self.dir.display())
                })
            }
        };

        let mut files = Vec::new();
        while let Some(entry) = entries.next_entry().await? {
            if !entry.file_type().await?.is_file() {
                continue;
            }
            let path = entry.path();
            files.push(StoredMedia {
                file_name: entry.file_name().to_string_lossy().to_string(),
                class: classify(&path),
                path,
            });
        }
        files.sort_by(|a, b| a.file_name.cmp(&b.file_name));

        Ok(files)
    }
}
