//! # Survey Error Types Module
//!
//! This module defines the error kinds raised while driving a user through a
//! survey and while serving administrator commands. Every kind is scoped to a
//! single user interaction; none of them stops the bot.

/// Custom error types for survey operations
#[derive(Debug, Clone, PartialEq)]
pub enum SurveyError {
    /// The user picked something that is not a configured category
    InvalidCategorySelection(String),
    /// The selected category has fewer questions than a survey needs
    EmptyCategory { category: String, question_count: usize },
    /// Text (or an unsupported message) arrived where a photo or video was expected
    WrongMediaType,
    /// Downloading or storing an uploaded media file failed
    MediaDownloadFailure(String),
    /// A non-administrator invoked a privileged command
    UnauthorizedAdminAccess(u64),
    /// One file of the bulk media listing could not be sent
    PerFileSendFailure { file_name: String, reason: String },
}

impl SurveyError {
    /// Whether the user can simply retry after being re-prompted
    pub fn is_recoverable(&self) -> bool {
        !matches!(self, SurveyError::MediaDownloadFailure(_))
    }
}

impl std::fmt::Display for SurveyError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            SurveyError::InvalidCategorySelection(text) => {
                write!(f, "Invalid category selection: {text}")
            }
            SurveyError::EmptyCategory {
                category,
                question_count,
            } => write!(
                f,
                "Category '{category}' has {question_count} question(s), at least 2 are required"
            ),
            SurveyError::WrongMediaType => write!(f, "Expected a photo or video"),
            SurveyError::MediaDownloadFailure(msg) => write!(f, "Media download failed: {msg}"),
            SurveyError::UnauthorizedAdminAccess(user_id) => {
                write!(f, "User {user_id} is not authorized for admin commands")
            }
            SurveyError::PerFileSendFailure { file_name, reason } => {
                write!(f, "Failed to send {file_name}: {reason}")
            }
        }
    }
}

impl std::error::Error for SurveyError {}
