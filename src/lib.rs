//! # Survey Telegram Bot
//!
//! A Telegram bot that walks users through category-specific questionnaires,
//! collects text and media answers, and reports the result. An administrator
//! can download every uploaded file and the answer log.

pub mod answer_log;
pub mod bot;
pub mod config;
pub mod db;
pub mod dialogue;
pub mod localization;
pub mod media_store;
pub mod survey;
pub mod survey_errors;
pub mod transport;
