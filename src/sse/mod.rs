//! SSE (Server-Sent Events) stream decoding
//!
//! Decodes the streaming response of the council backend. The backend frames
//! every event as a single line:
//!
//! ```text
//! data: {"type": "<kind>", "data": ..., "metadata": ..., "error": ...}
//! ```
//!
//! Lines that do not carry the `data: ` prefix (blank keep-alives, comments)
//! are ignored. The `type` field selects the event kind; kinds this client
//! does not know about decode to [`CouncilEvent::Unknown`] and are dropped
//! downstream, so a newer backend never breaks an older client.
//!
//! # Module structure
//! - `events` - Typed event definitions (CouncilEvent and its payloads)
//! - `decoder` - Chunk reassembly and line decoding (FrameDecoder)

mod decoder;
mod events;

pub use decoder::FrameDecoder;
pub use events::{
    CouncilEvent, FailureRecord, FinalSynthesis, ModelAnswer, PeerRanking, TitlePayload,
};
