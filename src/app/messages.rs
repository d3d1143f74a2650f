//! AppMessage enum and its application to the app state.

use tracing::{debug, warn};

use crate::sse::CouncilEvent;
use crate::transcript::{ConversationDetail, ConversationMeta, StreamEffect, Transcript};

use super::App;

/// Messages received from async operations (streaming, REST calls).
#[derive(Debug)]
pub enum AppMessage {
    /// One decoded frame from the live stream
    StreamEvent {
        conversation_id: String,
        event: CouncilEvent,
    },
    /// Transport failure during streaming; terminal for this turn
    StreamFailed {
        conversation_id: String,
        error: String,
    },
    /// The stream closed (with or without a prior `complete` frame)
    StreamClosed { conversation_id: String },
    /// Sidebar list fetched
    ConversationsLoaded(Vec<ConversationMeta>),
    /// Full transcript fetched for display
    ConversationLoaded(ConversationDetail),
    /// A new conversation was created and becomes active
    ConversationCreated(ConversationDetail),
    /// Any non-stream API call failed
    ApiFailed(String),
}

impl App {
    /// Apply one message. Runs on the main loop between renders, so each
    /// application is atomic from the renderer's point of view.
    pub fn handle_message(&mut self, message: AppMessage) {
        match message {
            AppMessage::StreamEvent {
                conversation_id,
                event,
            } => self.handle_stream_event(conversation_id, event),
            AppMessage::StreamFailed {
                conversation_id,
                error,
            } => {
                // The turn is frozen in its last state; partial results stay
                // visible. No rollback.
                if self.active_id.as_deref() == Some(conversation_id.as_str()) {
                    self.busy = false;
                    self.status = Some(format!("stream failed: {}", error));
                    self.mark_dirty();
                }
            }
            AppMessage::StreamClosed { conversation_id } => {
                if self.active_id.as_deref() == Some(conversation_id.as_str()) && self.busy {
                    // Transport ended without a terminal frame
                    self.busy = false;
                    self.mark_dirty();
                }
            }
            AppMessage::ConversationsLoaded(conversations) => {
                self.conversations = conversations;
                if self.selected >= self.conversations.len() {
                    self.selected = self.conversations.len().saturating_sub(1);
                }
                self.mark_dirty();
            }
            AppMessage::ConversationLoaded(detail) => {
                self.active_id = Some(detail.id);
                self.transcript = Transcript::new(detail.messages);
                self.scroll = 0;
                self.status = None;
                self.mark_dirty();
            }
            AppMessage::ConversationCreated(detail) => {
                self.active_id = Some(detail.id);
                self.transcript = Transcript::default();
                self.scroll = 0;
                self.status = None;
                self.refresh_conversations();
                self.mark_dirty();
            }
            AppMessage::ApiFailed(error) => {
                self.status = Some(error);
                self.mark_dirty();
            }
        }
    }

    fn handle_stream_event(&mut self, conversation_id: String, event: CouncilEvent) {
        if self.active_id.as_deref() != Some(conversation_id.as_str()) {
            // The user navigated away; frames for the old turn are dropped.
            debug!(kind = event.kind(), "frame for inactive conversation");
            return;
        }
        let Some(turn) = self.transcript.open_turn() else {
            warn!(kind = event.kind(), "frame with no open turn");
            return;
        };

        match turn.apply(event) {
            StreamEffect::None => {}
            StreamEffect::TitleUpdated(_) => {
                // Derived metadata (title, counts) is stale; re-fetch it
                self.refresh_conversations();
            }
            StreamEffect::Completed => {
                self.busy = false;
                self.refresh_conversations();
            }
            StreamEffect::Failed(message) => {
                self.busy = false;
                self.status = Some(message);
            }
        }
        self.mark_dirty();
    }
}
