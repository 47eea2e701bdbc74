//! # Answer Log Module
//!
//! Append-only text log of survey activity. Each line is prefixed with a local
//! timestamp and records either a saved media file or a completed survey.

use anyhow::{Context, Result};
use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use tokio::io::AsyncWriteExt;
use tokio::sync::Mutex;
use tracing::debug;

use crate::dialogue::Answer;

const TIMESTAMP_FORMAT: &str = "%Y-%m-%d %H:%M:%S,%3f";

/// Format the completed-survey notice
pub fn survey_entry(user_id: u64, category: &str, answers: &[Answer]) -> String {
    let mapping: serde_json::Map<String, serde_json::Value> = answers
        .iter()
        .map(|a| (a.question.clone(), serde_json::Value::String(a.value.to_string())))
        .collect();
    format!(
        "User ID: {user_id}, Category: {category}, Answers: {}",
        serde_json::Value::Object(mapping)
    )
}

/// Format the media-save notice
pub fn media_entry(user_id: u64, path: &Path) -> String {
    format!("User ID: {user_id}, Media saved: {}", path.display())
}

/// Append-only log sink shared by all users
#[derive(Debug)]
pub struct AnswerLog {
    path: PathBuf,
    write_lock: Mutex<()>,
}

impl AnswerLog {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            write_lock: Mutex::new(()),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Append one timestamp-prefixed line
    pub async fn append(&self, message: &str) -> Result<()> {
        let line = format!(
            "{} - {}\n",
            chrono::Local::now().format(TIMESTAMP_FORMAT),
            message.replace('\n', " ")
        );

        let _guard = self.write_lock.lock().await;
        let mut file = tokio::fs::OpenOptions::new()
            .create(true)
            .append(true)
            .open(&self.path)
            .await
            .with_context(|| format!("Failed to open answer log {}", self.path.display()))?;
        file.write_all(line.as_bytes())
            .await
            .with_context(|| format!("Failed to append to answer log {}", self.path.display()))?;
        file.flush().await?;

        debug!(path = %self.path.display(), "Answer log entry appended");
        Ok(())
    }

    pub async fn record_media(&self, user_id: u64, path: &Path) -> Result<()> {
        self.append(&media_entry(user_id, path)).await
    }

    pub async fn record_survey(&self, user_id: u64, category: &str, answers: &[Answer]) -> Result<()> {
        self.append(&survey_entry(user_id, category, answers)).await
    }

    /// True when the log file is missing or has no content yet
    pub async fn is_empty(&self) -> Result<bool> {
        match tokio::fs::metadata(&self.path).await {
            Ok(meta) => Ok(meta.len() == 0),
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(true),
            Err(e) => Err(e)
                .with_context(|| format!("Failed to inspect answer log {}", self.path.display())),
        }
    }
}
