//! Messaging transport abstraction.
//!
//! The survey flow only talks to the outside world through [`Transport`].
//! [`TelegramTransport`] is the production implementation on top of teloxide.

use anyhow::{Context, Result};
use async_trait::async_trait;
use std::path::Path;
use teloxide::prelude::*;
use teloxide::types::{FileId, InputFile};
use tracing::debug;

use crate::bot::ui_builder::create_category_keyboard;

/// A file downloaded from the transport
#[derive(Debug, Clone, PartialEq)]
pub struct RemoteFile {
    /// Path of the file on the transport side, used for its extension
    pub path: String,
    pub bytes: Vec<u8>,
}

/// Outbound sends and inbound file fetches
#[async_trait]
pub trait Transport: Send + Sync {
    /// Send a text; `keyboard` lists category names to show as reply buttons
    async fn send_text(&self, chat_id: ChatId, text: &str, keyboard: Option<&[String]>) -> Result<()>;

    async fn send_photo(&self, chat_id: ChatId, file: &Path, caption: &str) -> Result<()>;

    async fn send_video(&self, chat_id: ChatId, file: &Path, caption: &str) -> Result<()>;

    async fn send_document(&self, chat_id: ChatId, file: &Path, caption: &str) -> Result<()>;

    /// Download an uploaded file by its transport id
    async fn fetch_file(&self, file_id: &FileId) -> Result<RemoteFile>;
}

/// Telegram Bot API transport
#[derive(Clone)]
pub struct TelegramTransport {
    bot: Bot,
    client: reqwest::Client,
}

impl TelegramTransport {
    pub fn new(bot: Bot) -> Self {
        Self {
            bot,
            client: reqwest::Client::new(),
        }
    }
}

#[async_trait]
impl Transport for TelegramTransport {
    async fn send_text(&self, chat_id: ChatId, text: &str, keyboard: Option<&[String]>) -> Result<()> {
        let request = self.bot.send_message(chat_id, text);
        match keyboard {
            Some(names) => request.reply_markup(create_category_keyboard(names)).await?,
            None => request.await?,
        };
        Ok(())
    }

    async fn send_photo(&self, chat_id: ChatId, file: &Path, caption: &str) -> Result<()> {
        self.bot
            .send_photo(chat_id, InputFile::file(file.to_path_buf()))
            .caption(caption)
            .await?;
        Ok(())
    }

    async fn send_video(&self, chat_id: ChatId, file: &Path, caption: &str) -> Result<()> {
        self.bot
            .send_video(chat_id, InputFile::file(file.to_path_buf()))
            .caption(caption)
            .await?;
        Ok(())
    }

    async fn send_document(&self, chat_id: ChatId, file: &Path, caption: &str) -> Result<()> {
        self.bot
            .send_document(chat_id, InputFile::file(file.to_path_buf()))
            .caption(caption)
            .await?;
        Ok(())
    }

    async fn fetch_file(&self, file_id: &FileId) -> Result<RemoteFile> {
        let file = self
            .bot
            .get_file(file_id.clone())
            .await
            .context("Failed to resolve file on Telegram")?;
        let url = format!(
            "https://api.telegram.org/file/bot{}/{}",
            self.bot.token(),
            file.path
        );

        let response = self
            .client
            .get(&url)
            .send()
            .await
            .context("Failed to download file from Telegram")?;
        if !response.status().is_success() {
            anyhow::bail!(
                "Failed to download file from Telegram: HTTP {}",
                response.status()
            );
        }
        let bytes = response.bytes().await?;

        debug!(remote_path = %file.path, size = bytes.len(), "File downloaded");
        Ok(RemoteFile {
            path: file.path,
            bytes: bytes.to_vec(),
        })
    }
}
