//! # Survey Catalog Model
//!
//! This module defines the static survey configuration: the set of categories
//! a user can pick from and the ordered questions asked for each of them.
//!
//! ## Core Concepts
//!
//! - **Category**: a named topic bundling an ordered list of questions
//! - **Question kind**: the last [`MEDIA_QUESTION_COUNT`] questions of every
//!   category are answered with a photo or video, all others with text
//!
//! ## Usage
//!
//! ```rust
//! use survey_bot::survey::{QuestionKind, SurveyCatalog};
//!
//! let catalog = SurveyCatalog::from_json_str(
//!     r#"{"categories": [{"name": "Feedback",
//!         "questions": ["Name?", "City?", "Upload photo", "Upload video"]}]}"#,
//! ).unwrap();
//!
//! let feedback = catalog.get("Feedback").unwrap();
//! assert_eq!(feedback.question_kind(1), Some(QuestionKind::Text));
//! assert_eq!(feedback.question_kind(2), Some(QuestionKind::Media));
//! assert_eq!(feedback.question_kind(4), None);
//! ```

use anyhow::{bail, Context, Result};
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::path::Path;
use tracing::{info, warn};

use crate::survey_errors::SurveyError;

/// Number of trailing questions in every category that expect media
pub const MEDIA_QUESTION_COUNT: usize = 2;

/// How a question has to be answered
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum QuestionKind {
    /// Plain text message
    Text,
    /// Photo or video upload
    Media,
}

/// A named topic with its ordered questions
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Category {
    pub name: String,
    pub questions: Vec<String>,
}

impl Category {
    pub fn new(name: impl Into<String>, questions: Vec<String>) -> Self {
        Self {
            name: name.into(),
            questions,
        }
    }

    pub(crate) fn len(&self) -> usize {
        self.questions.len()
    }

    /// The question asked at `index`, if the survey has not run past the end
    pub fn question(&self, index: usize) -> Option<&str> {
        self.questions.get(index).map(String::as_str)
    }

    /// Kind of the question at `index`; `None` once every question was asked
    pub fn question_kind(&self, index: usize) -> Option<QuestionKind> {
        if index >= self.questions.len() {
            return None;
        }
        if index + MEDIA_QUESTION_COUNT >= self.questions.len() {
            Some(QuestionKind::Media)
        } else {
            Some(QuestionKind::Text)
        }
    }

    /// Reject categories too short to hold the trailing media questions
    pub fn ensure_surveyable(&self) -> Result<(), SurveyError> {
        if self.questions.len() < MEDIA_QUESTION_COUNT {
            return Err(SurveyError::EmptyCategory {
                category: self.name.clone(),
                question_count: self.questions.len(),
            });
        }
        Ok(())
    }
}

/// Immutable category → questions mapping loaded at startup
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SurveyCatalog {
    categories: Vec<Category>,
}

impl SurveyCatalog {
    /// Build a catalog, rejecting blank and duplicate category names
    pub fn new(categories: Vec<Category>) -> Result<Self> {
        let mut seen = HashSet::new();
        for category in &categories {
            if category.name.trim().is_empty() {
                bail!("Category names must not be blank");
            }
            if !seen.insert(category.name.as_str()) {
                bail!("Duplicate category name: {}", category.name);
            }
            if category.questions.len() < MEDIA_QUESTION_COUNT {
                warn!(
                    category = %category.name,
                    question_count = category.questions.len(),
                    "Category has too few questions and will be rejected when selected"
                );
            }
        }
        Ok(Self { categories })
    }

    pub fn from_json_str(json: &str) -> Result<Self> {
        let raw: SurveyCatalog =
            serde_json::from_str(json).context("Failed to parse survey configuration")?;
        Self::new(raw.categories)
    }

    pub fn from_file(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read survey configuration {}", path.display()))?;
        let catalog = Self::from_json_str(&content)?;
        info!(
            path = %path.display(),
            categories = catalog.categories.len(),
            "Survey configuration loaded"
        );
        Ok(catalog)
    }

    /// Exact, case-sensitive lookup by category name
    pub fn get(&self, name: &str) -> Option<&Category> {
        self.categories.iter().find(|c| c.name == name)
    }

    /// Category names in configuration order
    pub fn names(&self) -> Vec<String> {
        self.categories.iter().map(|c| c.name.clone()).collect()
    }
}
