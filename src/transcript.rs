//! Conversation transcript and the streaming state machine.
//!
//! A transcript is an append-only sequence of turns. Sending a message
//! appends a user turn plus an assistant placeholder before any network data
//! returns; the placeholder is then mutated in place by every decoded event
//! until the stream ends, at which point it is frozen as-is.
//!
//! The merge rule is optimistic-then-authoritative: provisional events
//! (`phase1_update`, `phase3_token`) exist only to render early progress,
//! and each phase's `_complete` payload overwrites them wholesale. The
//! reducer never reconciles partial against final data.

use serde::{Deserialize, Serialize};

use crate::sse::{CouncilEvent, FailureRecord, FinalSynthesis, ModelAnswer, PeerRanking};

/// Per-phase activity flags.
///
/// A flag is true strictly between the phase's start event and its
/// completion, skip, or terminal-error event.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PhaseProgress {
    pub answers: bool,
    pub rankings: bool,
    pub synthesis: bool,
}

impl PhaseProgress {
    pub fn any(&self) -> bool {
        self.answers || self.rankings || self.synthesis
    }

    fn clear(&mut self) {
        *self = Self::default();
    }
}

/// Side effect an applied event asks of the surrounding application.
///
/// The reducer itself only mutates the turn; collaborator signals (refresh
/// the conversation list, clear the busy indicator) are returned to the
/// caller instead of performed here.
#[derive(Debug, Clone, PartialEq)]
pub enum StreamEffect {
    /// No collaborator action required
    None,
    /// A conversation title was generated; list metadata is stale
    TitleUpdated(String),
    /// Stream finished successfully
    Completed,
    /// Stream failed; the turn keeps whatever it accumulated
    Failed(String),
}

/// The assistant's in-flight (or persisted) three-phase result.
///
/// Wire field names match the backend's persisted messages; `stage*` aliases
/// cover transcripts written by older backends.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct AssistantTurn {
    /// Phase 1: individual model answers. `None` until the phase starts.
    #[serde(rename = "phase1", alias = "stage1", default)]
    pub answers: Option<Vec<ModelAnswer>>,
    /// Phase 2: peer rankings. `Some(vec![])` means explicitly skipped.
    #[serde(rename = "phase2", alias = "stage2", default)]
    pub rankings: Option<Vec<PeerRanking>>,
    /// Phase 3: the chairman's synthesis.
    #[serde(rename = "phase3", alias = "stage3", default)]
    pub synthesis: Option<FinalSynthesis>,
    /// Phase-specific side info (label→model mapping, aggregate rankings)
    #[serde(default)]
    pub metadata: Option<serde_json::Value>,
    /// Failed units of work; append-only for the lifetime of the turn
    #[serde(default)]
    pub failures: Vec<FailureRecord>,
    /// Live-stream flags; never persisted
    #[serde(skip)]
    pub progress: PhaseProgress,
}

impl AssistantTurn {
    /// Apply one decoded event, returning the collaborator signal.
    ///
    /// Out-of-order events are tolerated: a provisional event for a phase
    /// that never announced itself synthesizes the minimal valid state
    /// instead of erroring, since rejecting it would corrupt the visible
    /// transcript over a cosmetic ordering glitch.
    pub fn apply(&mut self, event: CouncilEvent) -> StreamEffect {
        match event {
            CouncilEvent::Phase1Start => {
                self.progress.answers = true;
                if self.answers.is_none() {
                    self.answers = Some(Vec::new());
                }
            }
            CouncilEvent::Phase1Update { data } => match self.answers.as_mut() {
                Some(answers) => answers.push(data),
                // Update without a start: begin the list with it
                None => self.answers = Some(vec![data]),
            },
            CouncilEvent::Phase1Error { model, error } => {
                let source = if model.is_empty() {
                    "phase1".to_string()
                } else {
                    model
                };
                self.failures.push(FailureRecord {
                    source,
                    detail: error,
                });
            }
            CouncilEvent::Phase1Complete { data } => {
                // Authoritative: replaces provisional accumulation wholesale
                self.answers = Some(data);
                self.progress.answers = false;
            }
            CouncilEvent::Phase2Start => {
                self.progress.rankings = true;
            }
            CouncilEvent::Phase2Complete { data, metadata } => {
                self.rankings = Some(data);
                self.metadata = metadata;
                self.progress.rankings = false;
            }
            CouncilEvent::Phase2Skipped { metadata } => {
                self.rankings = Some(Vec::new());
                self.metadata = metadata;
                self.progress.rankings = false;
            }
            CouncilEvent::Phase3Start => {
                self.progress.synthesis = true;
                self.synthesis = Some(FinalSynthesis::pending());
            }
            CouncilEvent::Phase3Token { data } => match self.synthesis.as_mut() {
                Some(synthesis) => synthesis.content.push_str(&data),
                // Token without a start: the token becomes the first content
                None => {
                    let mut synthesis = FinalSynthesis::pending();
                    synthesis.content = data;
                    self.synthesis = Some(synthesis);
                }
            },
            CouncilEvent::Phase3Complete { data } => {
                // Authoritative: may differ from the accumulated tokens
                self.synthesis = Some(data);
                self.progress.synthesis = false;
            }
            CouncilEvent::TitleComplete { data } => {
                return StreamEffect::TitleUpdated(data.title);
            }
            CouncilEvent::Complete => {
                return StreamEffect::Completed;
            }
            CouncilEvent::Error { message } => {
                self.failures.push(FailureRecord {
                    source: "system".to_string(),
                    detail: message.clone(),
                });
                self.progress.clear();
                return StreamEffect::Failed(message);
            }
            CouncilEvent::Unknown => {}
        }
        StreamEffect::None
    }
}

/// One entry in a conversation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "role", rename_all = "lowercase")]
pub enum Turn {
    /// Immutable once appended
    User { content: String },
    /// Mutable target of streaming updates
    Assistant(AssistantTurn),
}

/// Ordered, append-only sequence of turns. Index is display order.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Transcript {
    pub turns: Vec<Turn>,
}

impl Transcript {
    pub fn new(turns: Vec<Turn>) -> Self {
        Self { turns }
    }

    pub fn clear(&mut self) {
        self.turns.clear();
    }

    /// Optimistically append the user turn and an empty assistant
    /// placeholder; the placeholder becomes the open turn.
    pub fn begin_exchange(&mut self, content: String) {
        self.turns.push(Turn::User { content });
        self.turns.push(Turn::Assistant(AssistantTurn::default()));
    }

    /// The open turn: the most recently appended turn, when it is an
    /// assistant turn. At most one turn receives events at a time.
    pub fn open_turn(&mut self) -> Option<&mut AssistantTurn> {
        match self.turns.last_mut() {
            Some(Turn::Assistant(turn)) => Some(turn),
            _ => None,
        }
    }
}

/// Conversation metadata for the sidebar list.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ConversationMeta {
    pub id: String,
    /// ISO timestamp as the backend stores it
    #[serde(default)]
    pub created_at: String,
    #[serde(default)]
    pub title: String,
    #[serde(default)]
    pub message_count: usize,
}

/// A full conversation as returned by the backend.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ConversationDetail {
    pub id: String,
    #[serde(default)]
    pub created_at: String,
    #[serde(default)]
    pub title: String,
    #[serde(default)]
    pub messages: Vec<Turn>,
}
