//! Typed events from the council streaming API.
//!
//! The backend runs three phases per user message: individual answers from
//! every council model, anonymized peer rankings of those answers, and a
//! final synthesis written by the chairman model. Each phase streams a
//! `_start` event, zero or more provisional updates, and an authoritative
//! `_complete` event whose payload supersedes anything accumulated before it.

use serde::{Deserialize, Serialize};

/// One council model's answer from phase 1.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ModelAnswer {
    /// Model identifier (e.g. `openai/gpt-5.1`)
    #[serde(default)]
    pub model: String,
    /// The answer text
    #[serde(default, alias = "response")]
    pub content: String,
}

/// One model's ranking of the anonymized phase-1 answers.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PeerRanking {
    /// Model that produced the ranking
    #[serde(default)]
    pub model: String,
    /// Full evaluation text, including the FINAL RANKING section
    #[serde(default, alias = "response")]
    pub ranking: String,
    /// Labels in ranked order, as parsed by the backend
    #[serde(default)]
    pub parsed_ranking: Vec<String>,
}

/// The chairman's final synthesis from phase 3.
///
/// While tokens are streaming the source is the placeholder `"final"`; the
/// authoritative `phase3_complete` payload carries the real source id and the
/// full text, which replaces whatever was accumulated.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FinalSynthesis {
    #[serde(
        rename = "sourceId",
        alias = "model",
        default = "FinalSynthesis::default_source"
    )]
    pub source_id: String,
    #[serde(default, alias = "response")]
    pub content: String,
}

impl FinalSynthesis {
    fn default_source() -> String {
        "final".to_string()
    }

    /// Empty synthesis under the placeholder source, used at phase start.
    pub fn pending() -> Self {
        Self {
            source_id: Self::default_source(),
            content: String::new(),
        }
    }
}

/// Record of one failed unit of work. Failures never abort sibling work;
/// they accumulate on the turn and are shown alongside whatever succeeded.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FailureRecord {
    /// What failed (a model id, or `"system"` for stream-level errors)
    pub source: String,
    /// Backend-provided description
    pub detail: String,
}

/// Payload of `title_complete`.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct TitlePayload {
    #[serde(default)]
    pub title: String,
}

/// Typed events from the council streaming API.
///
/// `type` is the wire tag. Unrecognized tags deserialize to [`Unknown`]
/// instead of failing, so new backend event kinds are forward-compatible
/// no-ops.
///
/// [`Unknown`]: CouncilEvent::Unknown
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum CouncilEvent {
    /// Phase 1 started; answers begin as an empty list
    Phase1Start,
    /// One model's answer arrived (provisional)
    Phase1Update { data: ModelAnswer },
    /// One model failed; the rest of the phase continues
    Phase1Error {
        #[serde(default, alias = "source")]
        model: String,
        #[serde(default, alias = "detail", alias = "message")]
        error: String,
    },
    /// Authoritative full answer list; replaces any provisional accumulation
    Phase1Complete {
        #[serde(default)]
        data: Vec<ModelAnswer>,
    },
    /// Phase 2 started
    Phase2Start,
    /// Authoritative rankings plus side metadata (label→model mapping,
    /// aggregate rankings)
    Phase2Complete {
        #[serde(default)]
        data: Vec<PeerRanking>,
        #[serde(default)]
        metadata: Option<serde_json::Value>,
    },
    /// Backend skipped the ranking phase; rankings are explicitly empty
    Phase2Skipped {
        #[serde(default)]
        metadata: Option<serde_json::Value>,
    },
    /// Phase 3 started; synthesis resets to an empty placeholder
    Phase3Start,
    /// Incremental synthesis text (provisional)
    Phase3Token {
        #[serde(alias = "token", alias = "text")]
        data: String,
    },
    /// Authoritative final synthesis; replaces accumulated tokens
    Phase3Complete { data: FinalSynthesis },
    /// Conversation title was generated; list metadata should refresh
    TitleComplete {
        #[serde(default)]
        data: TitlePayload,
    },
    /// Stream finished successfully
    Complete,
    /// Stream-level failure; terminal for this turn
    Error {
        #[serde(default, alias = "error")]
        message: String,
    },
    /// Any event kind this client does not recognize
    #[serde(other)]
    Unknown,
}

impl CouncilEvent {
    /// Wire tag of the event, for logging.
    pub fn kind(&self) -> &'static str {
        match self {
            CouncilEvent::Phase1Start => "phase1_start",
            CouncilEvent::Phase1Update { .. } => "phase1_update",
            CouncilEvent::Phase1Error { .. } => "phase1_error",
            CouncilEvent::Phase1Complete { .. } => "phase1_complete",
            CouncilEvent::Phase2Start => "phase2_start",
            CouncilEvent::Phase2Complete { .. } => "phase2_complete",
            CouncilEvent::Phase2Skipped { .. } => "phase2_skipped",
            CouncilEvent::Phase3Start => "phase3_start",
            CouncilEvent::Phase3Token { .. } => "phase3_token",
            CouncilEvent::Phase3Complete { .. } => "phase3_complete",
            CouncilEvent::TitleComplete { .. } => "title_complete",
            CouncilEvent::Complete => "complete",
            CouncilEvent::Error { .. } => "error",
            CouncilEvent::Unknown => "unknown",
        }
    }
}
