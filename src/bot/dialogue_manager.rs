//! Dialogue Manager module: the survey flow controller.
//!
//! Every inbound event is mapped through [`transition`] to an [`Action`] and
//! executed here. State lives in the per-user [`SurveyDialogue`], replies go
//! to the chat the message came from; everything else the controller touches
//! is injected at construction.

use anyhow::Result;
use sqlx::sqlite::SqlitePool;
use std::path::PathBuf;
use std::sync::Arc;
use teloxide::types::{ChatId, UserId};
use tracing::{debug, error, info, warn};

use crate::answer_log::AnswerLog;
use crate::db::save_survey;
use crate::dialogue::{
    transition, Action, AnswerValue, InboundEvent, MediaRef, SurveyDialogue, SurveyProgress,
    SurveyState,
};
use crate::localization::LocalizationManager;
use crate::media_store::{extension_from_remote_path, MediaStore};
use crate::survey::{Category, QuestionKind, SurveyCatalog};
use crate::survey_errors::SurveyError;
use crate::transport::Transport;

use super::ui_builder::{format_question_prompt, format_report};

/// Survey flow controller shared by all users
pub struct SurveyFlow {
    pub(crate) catalog: Arc<SurveyCatalog>,
    pub(crate) transport: Arc<dyn Transport>,
    pub(crate) media: MediaStore,
    pub(crate) answer_log: Arc<AnswerLog>,
    pub(crate) l10n: Arc<LocalizationManager>,
    pub(crate) admin_id: UserId,
    responses: Option<SqlitePool>,
}

impl SurveyFlow {
    pub fn new(
        catalog: SurveyCatalog,
        transport: Arc<dyn Transport>,
        media: MediaStore,
        answer_log: AnswerLog,
        l10n: LocalizationManager,
        admin_id: UserId,
    ) -> Self {
        Self {
            catalog: Arc::new(catalog),
            transport,
            media,
            answer_log: Arc::new(answer_log),
            l10n: Arc::new(l10n),
            admin_id,
            responses: None,
        }
    }

    /// Also write completed surveys to the responses table
    pub fn with_response_store(mut self, pool: SqlitePool) -> Self {
        self.responses = Some(pool);
        self
    }

    /// Entry point for one inbound event of one user
    pub async fn handle_event(
        &self,
        dialogue: &SurveyDialogue,
        sender: UserId,
        chat_id: ChatId,
        event: InboundEvent,
    ) -> Result<()> {
        let state = dialogue.get().await?.unwrap_or_default();
        let action = transition(state, event);
        debug!(user_id = sender.0, action = ?action, "Dispatching survey action");

        match action {
            Action::StartSession => self.start_session(dialogue, chat_id).await,
            Action::ListMedia => self.list_media(sender, chat_id).await,
            Action::FetchLogs => self.fetch_logs(sender, chat_id).await,
            Action::PromptStart => self.send(chat_id, &self.l10n.t("start-hint")).await,
            Action::SelectCategory(text) => self.select_category(dialogue, sender, chat_id, &text).await,
            Action::RepromptCategory => {
                self.send(chat_id, &self.l10n.t("choose-from-list")).await
            }
            Action::SubmitText(progress, text) => {
                self.submit_text_answer(dialogue, sender, chat_id, progress, text).await
            }
            Action::RepromptText(_) => {
                self.send(chat_id, &self.l10n.t("text-expected")).await
            }
            Action::SubmitMedia(progress, media) => {
                self.submit_media_answer(dialogue, sender, chat_id, progress, media).await
            }
            Action::RepromptMedia(progress) => {
                debug!(
                    user_id = sender.0,
                    index = progress.index,
                    error = %SurveyError::WrongMediaType,
                    "Media answer expected"
                );
                self.send(chat_id, &self.l10n.t("media-expected")).await
            }
        }
    }

    /// Reset to category selection and show the category keyboard
    pub async fn start_session(&self, dialogue: &SurveyDialogue, chat_id: ChatId) -> Result<()> {
        dialogue.update(SurveyState::SelectingCategory).await?;
        self.send_with_categories(chat_id, &self.l10n.t("welcome"))
            .await
    }

    pub async fn select_category(
        &self,
        dialogue: &SurveyDialogue,
        sender: UserId,
        chat_id: ChatId,
        text: &str,
    ) -> Result<()> {
        let category = match self.catalog.get(text) {
            Some(category) => category,
            None => {
                debug!(
                    user_id = sender.0,
                    error = %SurveyError::InvalidCategorySelection(text.to_string()),
                    "Unknown category"
                );
                return self
                    .send(chat_id, &self.l10n.t("choose-from-list"))
                    .await;
            }
        };

        if let Err(e) = category.ensure_surveyable() {
            log_failure(sender, &e, "Survey aborted");
            dialogue.update(SurveyState::SelectingCategory).await?;
            self.send(chat_id, &self.l10n.t("category-empty"))
                .await?;
            return self
                .send_with_categories(chat_id, &self.l10n.t("choose-from-list"))
                .await;
        }

        info!(user_id = sender.0, category = %category.name, "Survey started");
        self.advance_question(dialogue, sender, chat_id, SurveyProgress::new(category.name.clone()))
            .await
    }

    /// Ask the question at `progress.index`, or produce the report past the end
    pub async fn advance_question(
        &self,
        dialogue: &SurveyDialogue,
        sender: UserId,
        chat_id: ChatId,
        progress: SurveyProgress,
    ) -> Result<()> {
        let Some(category) = self.category_of(&progress) else {
            warn!(user_id = sender.0, category = %progress.category, "Category vanished mid-survey");
            return self.start_session(dialogue, chat_id).await;
        };

        let (question, kind) = match (
            category.question(progress.index),
            category.question_kind(progress.index),
        ) {
            (Some(question), Some(kind)) => (question.to_string(), kind),
            _ => return self.generate_report(dialogue, sender, chat_id, progress).await,
        };

        let prompt = format_question_prompt(&self.l10n, progress.index, &question, kind);
        let next_state = match kind {
            QuestionKind::Text => SurveyState::AnsweringText(progress),
            QuestionKind::Media => SurveyState::AnsweringMedia(progress),
        };
        dialogue.update(next_state).await?;

        self.send(chat_id, &prompt).await
    }

    pub async fn submit_text_answer(
        &self,
        dialogue: &SurveyDialogue,
        sender: UserId,
        chat_id: ChatId,
        mut progress: SurveyProgress,
        text: String,
    ) -> Result<()> {
        let Some(category) = self.category_of(&progress) else {
            return self.start_session(dialogue, chat_id).await;
        };

        if let Err(e) = progress.record(category, AnswerValue::Text(text)) {
            warn!(user_id = sender.0, error = %e, "Text answer rejected");
            return self.start_session(dialogue, chat_id).await;
        }

        self.advance_question(dialogue, sender, chat_id, progress).await
    }

    /// Store the uploaded file, record its path and move on.
    ///
    /// A failed download leaves the state untouched: the user has to send the
    /// file again and the failure is returned to the dispatcher.
    pub async fn submit_media_answer(
        &self,
        dialogue: &SurveyDialogue,
        sender: UserId,
        chat_id: ChatId,
        mut progress: SurveyProgress,
        media: MediaRef,
    ) -> Result<()> {
        let Some(category) = self.category_of(&progress) else {
            return self.start_session(dialogue, chat_id).await;
        };

        let stored_path = match self.store_media(&media).await {
            Ok(path) => path,
            Err(e) => {
                let failure = SurveyError::MediaDownloadFailure(format!("{e:#}"));
                log_failure(sender, &failure, "Failed to save media answer");
                self.send(chat_id, &self.l10n.t("media-save-failed"))
                    .await?;
                return Err(failure.into());
            }
        };

        if let Err(e) = self.answer_log.record_media(sender.0, &stored_path).await {
            error!(user_id = sender.0, error = %e, "Failed to log saved media");
        }

        let value = AnswerValue::Media {
            kind: media.kind,
            path: stored_path,
        };
        if let Err(e) = progress.record(category, value) {
            warn!(user_id = sender.0, error = %e, "Media answer rejected");
            return self.start_session(dialogue, chat_id).await;
        }

        self.advance_question(dialogue, sender, chat_id, progress).await
    }

    /// Send the report, log it and return the user to category selection
    pub async fn generate_report(
        &self,
        dialogue: &SurveyDialogue,
        sender: UserId,
        chat_id: ChatId,
        progress: SurveyProgress,
    ) -> Result<()> {
        let report = format_report(&self.l10n, &progress.category, &progress.answers);
        let report_sent = self.send(chat_id, &report).await;

        if let Err(e) = self
            .answer_log
            .record_survey(sender.0, &progress.category, &progress.answers)
            .await
        {
            error!(user_id = sender.0, error = %e, "Failed to log completed survey");
        }

        if let Some(pool) = &self.responses {
            if let Err(e) = save_survey(pool, sender.0, &progress.category, &progress.answers).await {
                error!(user_id = sender.0, error = %e, "Failed to persist survey responses");
            }
        }

        dialogue.update(SurveyState::SelectingCategory).await?;
        info!(
            user_id = sender.0,
            category = %progress.category,
            answers = progress.answers.len(),
            "Survey completed"
        );

        report_sent?;
        self.send_with_categories(chat_id, &self.l10n.t("survey-finished"))
            .await
    }

    async fn store_media(&self, media: &MediaRef) -> Result<PathBuf> {
        let remote = self.transport.fetch_file(&media.file_id).await?;
        let extension = extension_from_remote_path(&remote.path, media.kind);
        self.media.save(media.kind, &extension, &remote.bytes).await
    }

    fn category_of(&self, progress: &SurveyProgress) -> Option<&Category> {
        self.catalog.get(&progress.category)
    }

    pub(crate) async fn send(&self, chat_id: ChatId, text: &str) -> Result<()> {
        self.transport.send_text(chat_id, text, None).await
    }

    pub(crate) async fn send_with_categories(&self, chat_id: ChatId, text: &str) -> Result<()> {
        let names = self.catalog.names();
        self.transport.send_text(chat_id, text, Some(&names)).await
    }
}

/// Log a per-interaction failure; only unrecoverable ones are errors
pub(crate) fn log_failure(sender: UserId, failure: &SurveyError, message: &str) {
    if failure.is_recoverable() {
        warn!(user_id = sender.0, error = %failure, "{message}");
    } else {
        error!(user_id = sender.0, error = %failure, "{message}");
    }
}
