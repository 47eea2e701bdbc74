//! Message Handler module for processing incoming Telegram messages

use anyhow::Result;
use std::sync::Arc;
use teloxide::prelude::*;
use tracing::debug;

use crate::dialogue::{InboundEvent, MediaKind, MediaRef, SurveyDialogue};

use super::dialogue_manager::SurveyFlow;

/// Strip a Telegram message down to the event the survey flow understands
pub fn inbound_event(msg: &Message) -> InboundEvent {
    if let Some(text) = msg.text() {
        return InboundEvent::from_text(text);
    }

    // The last photo size is the largest one
    if let Some(largest_photo) = msg.photo().and_then(|photos| photos.last()) {
        return InboundEvent::Media(MediaRef {
            kind: MediaKind::Photo,
            file_id: largest_photo.file.id.clone(),
        });
    }

    if let Some(video) = msg.video() {
        return InboundEvent::Media(MediaRef {
            kind: MediaKind::Video,
            file_id: video.file.id.clone(),
        });
    }

    InboundEvent::Unsupported
}

pub async fn message_handler(
    msg: Message,
    dialogue: SurveyDialogue,
    flow: Arc<SurveyFlow>,
) -> Result<()> {
    let Some(sender) = msg.from.as_ref().map(|user| user.id) else {
        debug!(chat_id = %msg.chat.id, "Ignoring message without a sender");
        return Ok(());
    };

    let event = inbound_event(&msg);
    debug!(user_id = sender.0, chat_id = %msg.chat.id, event = ?event, "Received message");

    flow.handle_event(&dialogue, sender, msg.chat.id, event).await
}
