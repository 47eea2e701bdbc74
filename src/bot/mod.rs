//! Bot module for handling Telegram interactions
//!
//! This module is split into several submodules:
//! - `message_handler`: Turns incoming messages into survey events
//! - `dialogue_manager`: The survey flow controller and its state transitions
//! - `admin_handler`: Administrator-only media and log retrieval
//! - `ui_builder`: Creates keyboards and formats messages

pub mod admin_handler;
pub mod dialogue_manager;
pub mod message_handler;
pub mod ui_builder;

// Re-export main handler functions for use in main.rs
pub use dialogue_manager::SurveyFlow;
pub use message_handler::message_handler;

// Re-export utility functions that might be used elsewhere
pub use ui_builder::{create_category_keyboard, format_question_prompt, format_report};
