//! Survey dialogue module: per-user conversation state and the transition table.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::PathBuf;
use std::sync::Arc;
use teloxide::dispatching::dialogue::{Dialogue, InMemStorage};
use teloxide::types::{ChatId, FileId, UserId};

use crate::survey::Category;
use crate::survey_errors::SurveyError;

/// Kind of media a user uploaded
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum MediaKind {
    Photo,
    Video,
}

impl MediaKind {
    /// Name used inside stored file names
    pub fn as_str(&self) -> &'static str {
        match self {
            MediaKind::Photo => "photo",
            MediaKind::Video => "video",
        }
    }

    /// Extension used when the remote file path carries none
    pub fn default_extension(&self) -> &'static str {
        match self {
            MediaKind::Photo => "jpg",
            MediaKind::Video => "mp4",
        }
    }
}

/// Reference to an uploaded file that still lives on the transport side
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct MediaRef {
    pub kind: MediaKind,
    pub file_id: FileId,
}

/// A recorded answer value
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub enum AnswerValue {
    Text(String),
    Media { kind: MediaKind, path: PathBuf },
}

impl fmt::Display for AnswerValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AnswerValue::Text(text) => write!(f, "{text}"),
            AnswerValue::Media { path, .. } => write!(f, "Media: {}", path.display()),
        }
    }
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Answer {
    pub question: String,
    pub value: AnswerValue,
}

/// Progress through one survey pass
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct SurveyProgress {
    pub category: String,
    pub index: usize,
    /// Answers in the order their questions were first asked
    pub answers: Vec<Answer>,
}

impl SurveyProgress {
    pub fn new(category: impl Into<String>) -> Self {
        Self {
            category: category.into(),
            index: 0,
            answers: Vec::new(),
        }
    }

    /// Record the answer to the current question of `category` and move on.
    ///
    /// A repeated question text keeps its first position and takes the new
    /// value, so the report lists every question once.
    pub fn record(&mut self, category: &Category, value: AnswerValue) -> Result<(), SurveyError> {
        if category.name != self.category {
            return Err(SurveyError::InvalidCategorySelection(category.name.clone()));
        }
        let question = category.question(self.index).ok_or_else(|| {
            SurveyError::EmptyCategory {
                category: self.category.clone(),
                question_count: category.len(),
            }
        })?;

        match self.answers.iter_mut().find(|a| a.question == question) {
            Some(existing) => existing.value = value,
            None => self.answers.push(Answer {
                question: question.to_string(),
                value,
            }),
        }
        self.index += 1;
        Ok(())
    }
}

/// Represents the conversation state of one user
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub enum SurveyState {
    /// No `/start` received yet
    #[default]
    Idle,
    SelectingCategory,
    AnsweringText(SurveyProgress),
    AnsweringMedia(SurveyProgress),
}

impl SurveyState {
    pub fn progress(&self) -> Option<&SurveyProgress> {
        match self {
            SurveyState::AnsweringText(p) | SurveyState::AnsweringMedia(p) => Some(p),
            SurveyState::Idle | SurveyState::SelectingCategory => None,
        }
    }
}

/// Type alias for the survey dialogue
pub type SurveyDialogue = Dialogue<SurveyState, InMemStorage<SurveyState>>;

/// Storage key of a user's dialogue: the sender's id, never the chat's
pub fn dialogue_key(user_id: UserId) -> ChatId {
    ChatId(user_id.0 as i64)
}

/// Dialogue of one user, independent of the chat the message came from
pub fn user_dialogue(storage: Arc<InMemStorage<SurveyState>>, user_id: UserId) -> SurveyDialogue {
    SurveyDialogue::new(storage, dialogue_key(user_id))
}

/// Inbound transport event, already stripped of Telegram specifics
#[derive(Clone, Debug, PartialEq)]
pub enum InboundEvent {
    Start,
    GetMedia,
    GetLogs,
    Text(String),
    Media(MediaRef),
    /// Stickers, documents and anything else that is neither text nor media
    Unsupported,
}

impl InboundEvent {
    /// Classify a text message, recognising `/cmd`, `/cmd@bot` and `/cmd payload`
    pub fn from_text(text: &str) -> Self {
        let command = text
            .split_whitespace()
            .next()
            .filter(|token| token.starts_with('/'))
            .map(|token| token.split('@').next().unwrap_or(token));

        match command {
            Some("/start") => InboundEvent::Start,
            Some("/get_media") => InboundEvent::GetMedia,
            Some("/get_logs") => InboundEvent::GetLogs,
            _ => InboundEvent::Text(text.to_string()),
        }
    }
}

/// What the flow controller has to do for a (state, event) pair
#[derive(Clone, Debug, PartialEq)]
pub enum Action {
    StartSession,
    ListMedia,
    FetchLogs,
    PromptStart,
    SelectCategory(String),
    RepromptCategory,
    SubmitText(SurveyProgress, String),
    RepromptText(SurveyProgress),
    SubmitMedia(SurveyProgress, MediaRef),
    RepromptMedia(SurveyProgress),
}

/// The transition table. Commands win in every state.
pub fn transition(state: SurveyState, event: InboundEvent) -> Action {
    match (state, event) {
        (_, InboundEvent::Start) => Action::StartSession,
        (_, InboundEvent::GetMedia) => Action::ListMedia,
        (_, InboundEvent::GetLogs) => Action::FetchLogs,

        (SurveyState::Idle, _) => Action::PromptStart,

        (SurveyState::SelectingCategory, InboundEvent::Text(text)) => Action::SelectCategory(text),
        (SurveyState::SelectingCategory, _) => Action::RepromptCategory,

        (SurveyState::AnsweringText(p), InboundEvent::Text(text)) => Action::SubmitText(p, text),
        (SurveyState::AnsweringText(p), _) => Action::RepromptText(p),

        (SurveyState::AnsweringMedia(p), InboundEvent::Media(media)) => Action::SubmitMedia(p, media),
        (SurveyState::AnsweringMedia(p), _) => Action::RepromptMedia(p),
    }
}
