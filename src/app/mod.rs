//! Application state and logic for the TUI.
//!
//! The [`App`] owns the conversation list, the active transcript, and the
//! input line. All mutation happens on the main event loop: background tasks
//! (HTTP calls, the SSE stream) send [`AppMessage`]s over an unbounded
//! channel and the loop applies them one at a time, so the renderer never
//! observes a half-applied event.

mod messages;
mod stream;

pub use messages::AppMessage;

use std::sync::Arc;

use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};
use tokio::sync::mpsc;
use tracing::warn;

use crate::api::CouncilClient;
use crate::transcript::{ConversationMeta, Transcript};

pub struct App {
    pub client: Arc<CouncilClient>,
    /// Sidebar entries, newest first
    pub conversations: Vec<ConversationMeta>,
    /// Sidebar cursor
    pub selected: usize,
    /// Conversation whose transcript is displayed
    pub active_id: Option<String>,
    pub transcript: Transcript,
    /// Input line under composition
    pub input: String,
    /// True from submit until `complete`/`error`/stream close; the send
    /// affordance is disabled while set
    pub busy: bool,
    /// One-line status/error display
    pub status: Option<String>,
    /// Transcript scroll offset in lines
    pub scroll: u16,
    /// Animation counter for spinners
    pub tick: usize,
    pub should_quit: bool,
    /// Set whenever state changed and a redraw is needed
    pub dirty: bool,
    message_tx: mpsc::UnboundedSender<AppMessage>,
}

impl App {
    pub fn new(client: Arc<CouncilClient>, message_tx: mpsc::UnboundedSender<AppMessage>) -> Self {
        Self {
            client,
            conversations: Vec::new(),
            selected: 0,
            active_id: None,
            transcript: Transcript::default(),
            input: String::new(),
            busy: false,
            status: None,
            scroll: 0,
            tick: 0,
            should_quit: false,
            dirty: true,
            message_tx,
        }
    }

    pub fn mark_dirty(&mut self) {
        self.dirty = true;
    }

    /// Advance spinner animation; only dirties the UI while streaming.
    pub fn on_tick(&mut self) {
        self.tick = self.tick.wrapping_add(1);
        if self.busy {
            self.mark_dirty();
        }
    }

    /// Re-fetch the conversation list in the background.
    pub fn refresh_conversations(&self) {
        let client = Arc::clone(&self.client);
        let tx = self.message_tx.clone();
        tokio::spawn(async move {
            match client.list_conversations().await {
                Ok(conversations) => {
                    let _ = tx.send(AppMessage::ConversationsLoaded(conversations));
                }
                Err(e) => {
                    warn!(err = %e, "failed to load conversations");
                    let _ = tx.send(AppMessage::ApiFailed(e.to_string()));
                }
            }
        });
    }

    /// Open the conversation under the sidebar cursor.
    pub fn open_selected(&mut self) {
        let Some(meta) = self.conversations.get(self.selected) else {
            return;
        };
        if self.busy {
            self.status = Some("a response is still streaming".to_string());
            self.mark_dirty();
            return;
        }
        let id = meta.id.clone();
        let client = Arc::clone(&self.client);
        let tx = self.message_tx.clone();
        tokio::spawn(async move {
            match client.get_conversation(&id).await {
                Ok(detail) => {
                    let _ = tx.send(AppMessage::ConversationLoaded(detail));
                }
                Err(e) => {
                    let _ = tx.send(AppMessage::ApiFailed(e.to_string()));
                }
            }
        });
    }

    /// Create a fresh conversation and make it active.
    pub fn new_conversation(&mut self) {
        if self.busy {
            self.status = Some("a response is still streaming".to_string());
            self.mark_dirty();
            return;
        }
        let client = Arc::clone(&self.client);
        let tx = self.message_tx.clone();
        tokio::spawn(async move {
            match client.create_conversation().await {
                Ok(detail) => {
                    let _ = tx.send(AppMessage::ConversationCreated(detail));
                }
                Err(e) => {
                    let _ = tx.send(AppMessage::ApiFailed(e.to_string()));
                }
            }
        });
    }

    pub fn handle_key(&mut self, key: KeyEvent) {
        match key.code {
            KeyCode::Char('c') | KeyCode::Char('q')
                if key.modifiers.contains(KeyModifiers::CONTROL) =>
            {
                self.should_quit = true;
            }
            KeyCode::Char('n') if key.modifiers.contains(KeyModifiers::CONTROL) => {
                self.new_conversation();
            }
            KeyCode::Char('r') if key.modifiers.contains(KeyModifiers::CONTROL) => {
                self.refresh_conversations();
            }
            KeyCode::Up => {
                self.selected = self.selected.saturating_sub(1);
                self.mark_dirty();
            }
            KeyCode::Down => {
                if self.selected + 1 < self.conversations.len() {
                    self.selected += 1;
                }
                self.mark_dirty();
            }
            KeyCode::PageUp => {
                self.scroll = self.scroll.saturating_sub(5);
                self.mark_dirty();
            }
            KeyCode::PageDown => {
                self.scroll = self.scroll.saturating_add(5);
                self.mark_dirty();
            }
            KeyCode::Enter => {
                if self.input.trim().is_empty() {
                    self.open_selected();
                } else {
                    self.submit_input();
                }
            }
            KeyCode::Backspace => {
                self.input.pop();
                self.mark_dirty();
            }
            KeyCode::Esc => {
                self.input.clear();
                self.status = None;
                self.mark_dirty();
            }
            KeyCode::Char(c)
                if !key
                    .modifiers
                    .intersects(KeyModifiers::CONTROL | KeyModifiers::ALT | KeyModifiers::SUPER) =>
            {
                self.input.push(c);
                self.mark_dirty();
            }
            _ => {}
        }
    }
}
