//! Admin Handler module for the out-of-flow administrator commands

use anyhow::Result;
use teloxide::types::{ChatId, UserId};
use tracing::{info, warn};

use crate::media_store::MediaClass;
use crate::survey_errors::SurveyError;

use super::dialogue_manager::{log_failure, SurveyFlow};

impl SurveyFlow {
    pub fn is_admin(&self, user_id: UserId) -> bool {
        user_id == self.admin_id
    }

    /// Deny non-administrators with an explicit message
    async fn authorize(&self, sender: UserId, chat_id: ChatId) -> Result<bool> {
        if self.is_admin(sender) {
            return Ok(true);
        }
        log_failure(
            sender,
            &SurveyError::UnauthorizedAdminAccess(sender.0),
            "Admin command refused",
        );
        self.send(chat_id, &self.l10n.t("not-authorized")).await?;
        Ok(false)
    }

    /// Send every stored media file back, one message per file.
    ///
    /// A file that fails to send is reported on its own and the rest of the
    /// batch still goes out.
    pub async fn list_media(&self, sender: UserId, chat_id: ChatId) -> Result<()> {
        if !self.authorize(sender, chat_id).await? {
            return Ok(());
        }

        let files = match self.media.list().await {
            Ok(files) => files,
            Err(e) => {
                warn!(user_id = sender.0, error = %e, "Failed to list stored media");
                let reason = e.to_string();
                let notice = self
                    .l10n
                    .t_args("media-list-failed", &[("error", reason.as_str())]);
                return self.send(chat_id, &notice).await;
            }
        };
        if files.is_empty() {
            return self.send(chat_id, &self.l10n.t("no-media")).await;
        }

        info!(user_id = sender.0, files = files.len(), "Sending stored media to admin");
        self.send(chat_id, &self.l10n.t("media-list-title")).await?;

        let mut failures = 0usize;
        for file in &files {
            let caption = self
                .l10n
                .t_args("media-file-caption", &[("name", file.file_name.as_str())]);
            let sent = match file.class {
                MediaClass::Photo => self.transport.send_photo(chat_id, &file.path, &caption).await,
                MediaClass::Video => self.transport.send_video(chat_id, &file.path, &caption).await,
                MediaClass::Document => {
                    self.transport
                        .send_document(chat_id, &file.path, &caption)
                        .await
                }
            };

            if let Err(e) = sent {
                failures += 1;
                let failure = SurveyError::PerFileSendFailure {
                    file_name: file.file_name.clone(),
                    reason: format!("{e:#}"),
                };
                log_failure(sender, &failure, "Media file not delivered");

                let reason = e.to_string();
                let notice = self.l10n.t_args(
                    "media-send-failed",
                    &[("name", file.file_name.as_str()), ("error", reason.as_str())],
                );
                if let Err(e) = self.send(chat_id, &notice).await {
                    warn!(user_id = sender.0, error = %e, "Failed to report undelivered media file");
                }
            }
        }

        info!(
            user_id = sender.0,
            sent = files.len() - failures,
            failed = failures,
            "Media listing finished"
        );
        Ok(())
    }

    /// Send the answer log as a document
    pub async fn fetch_logs(&self, sender: UserId, chat_id: ChatId) -> Result<()> {
        if !self.authorize(sender, chat_id).await? {
            return Ok(());
        }

        if self.answer_log.is_empty().await? {
            return self.send(chat_id, &self.l10n.t("logs-empty")).await;
        }

        let caption = self.l10n.t("logs-caption");
        if let Err(e) = self
            .transport
            .send_document(chat_id, self.answer_log.path(), &caption)
            .await
        {
            warn!(user_id = sender.0, error = %e, "Failed to send answer log");
            let reason = e.to_string();
            let notice = self
                .l10n
                .t_args("logs-send-failed", &[("error", reason.as_str())]);
            return self.send(chat_id, &notice).await;
        }

        info!(user_id = sender.0, "Answer log sent to admin");
        Ok(())
    }
}
