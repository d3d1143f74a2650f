//! Input submission and SSE stream pumping.

use std::sync::Arc;

use futures_util::StreamExt;
use tokio::sync::mpsc;
use tracing::debug;

use crate::api::EventStream;

use super::{App, AppMessage};

impl App {
    /// Submit the composed input to the active conversation.
    ///
    /// The user turn and an assistant placeholder are appended before the
    /// request is even sent, so the transcript renders immediately. While a
    /// stream is in flight further submissions are refused rather than
    /// interleaved.
    pub fn submit_input(&mut self) {
        let content = self.input.trim().to_string();
        if content.is_empty() {
            return;
        }
        if self.busy {
            self.status = Some("wait for the current response to complete".to_string());
            self.mark_dirty();
            return;
        }
        let Some(conversation_id) = self.active_id.clone() else {
            self.status = Some("no conversation open (Ctrl+N to create one)".to_string());
            self.mark_dirty();
            return;
        };

        self.transcript.begin_exchange(content.clone());
        self.input.clear();
        self.busy = true;
        self.status = None;
        self.mark_dirty();

        let client = Arc::clone(&self.client);
        let tx = self.message_tx.clone();
        tokio::spawn(async move {
            match client.stream_message(&conversation_id, &content).await {
                Ok(mut stream) => {
                    Self::pump_stream(&mut stream, &tx, &conversation_id).await;
                    let _ = tx.send(AppMessage::StreamClosed { conversation_id });
                }
                Err(e) => {
                    let _ = tx.send(AppMessage::StreamFailed {
                        conversation_id,
                        error: e.to_string(),
                    });
                }
            }
        });
    }

    /// Forward decoded frames to the main loop until the stream ends.
    ///
    /// A transport error ends the pump; a backend `error` frame does not -
    /// it is an ordinary frame for the reducer, and the stream is allowed
    /// to close on its own.
    pub(super) async fn pump_stream(
        stream: &mut EventStream,
        tx: &mpsc::UnboundedSender<AppMessage>,
        conversation_id: &str,
    ) {
        while let Some(result) = stream.next().await {
            match result {
                Ok(event) => {
                    debug!(kind = event.kind(), "frame");
                    let _ = tx.send(AppMessage::StreamEvent {
                        conversation_id: conversation_id.to_string(),
                        event,
                    });
                }
                Err(e) => {
                    let _ = tx.send(AppMessage::StreamFailed {
                        conversation_id: conversation_id.to_string(),
                        error: e.to_string(),
                    });
                    break;
                }
            }
        }
    }
}
