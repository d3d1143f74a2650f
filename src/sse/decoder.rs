//! Chunk reassembly and frame decoding.
//!
//! Network chunks arrive at arbitrary byte offsets, including in the middle
//! of a multi-byte UTF-8 character. The decoder therefore buffers raw bytes
//! and only splits on `\n`: a newline byte never occurs inside a UTF-8
//! sequence, so every complete line is also a complete UTF-8 unit regardless
//! of where the chunks were cut.

use tracing::warn;

use super::events::CouncilEvent;

/// Stateful frame decoder over a chunked byte stream.
///
/// Feed each chunk as it arrives; complete frames come back in delivery
/// order, exactly once. The trailing partial line is carried over to the
/// next chunk, and [`finish`](FrameDecoder::finish) drains it when the
/// transport signals end-of-stream.
#[derive(Debug, Default)]
pub struct FrameDecoder {
    /// Bytes after the last newline seen so far
    residual: Vec<u8>,
}

impl FrameDecoder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Feed one chunk, returning every frame it completed.
    pub fn feed(&mut self, chunk: &[u8]) -> Vec<CouncilEvent> {
        self.residual.extend_from_slice(chunk);

        let mut events = Vec::new();
        while let Some(pos) = self.residual.iter().position(|&b| b == b'\n') {
            let line: Vec<u8> = self.residual.drain(..=pos).collect();
            if let Some(event) = decode_line(&line[..pos]) {
                events.push(event);
            }
        }
        events
    }

    /// Signal end-of-stream.
    ///
    /// The residual buffer, if any, is decoded as one final candidate line.
    /// The buffer is consumed either way, so a frame already emitted by
    /// [`feed`](FrameDecoder::feed) (stream ending exactly on a newline) is
    /// never applied twice.
    pub fn finish(&mut self) -> Option<CouncilEvent> {
        if self.residual.is_empty() {
            return None;
        }
        let line = std::mem::take(&mut self.residual);
        decode_line(&line)
    }

    /// Drop any buffered partial line, e.g. when the caller aborts the
    /// request mid-stream.
    pub fn reset(&mut self) {
        self.residual.clear();
    }
}

/// Decode one complete line into an event.
///
/// Only lines that start with `data: ` after trimming carry a frame; blank
/// keep-alives and comment lines return `None`. A line with malformed JSON
/// also returns `None` after logging - one bad frame must not abort the
/// stream.
fn decode_line(raw: &[u8]) -> Option<CouncilEvent> {
    let line = String::from_utf8_lossy(raw);
    let payload = line.trim().strip_prefix("data: ")?;

    match serde_json::from_str::<CouncilEvent>(payload) {
        Ok(event) => Some(event),
        Err(err) => {
            warn!(%err, "dropping malformed frame");
            None
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sse::events::ModelAnswer;

    fn decode_whole(input: &str) -> Vec<CouncilEvent> {
        let mut decoder = FrameDecoder::new();
        let mut events = decoder.feed(input.as_bytes());
        events.extend(decoder.finish());
        events
    }

    #[test]
    fn test_single_frame() {
        let events = decode_whole("data: {\"type\":\"phase1_start\"}\n");
        assert_eq!(events, vec![CouncilEvent::Phase1Start]);
    }

    #[test]
    fn test_frame_split_across_chunks() {
        let mut decoder = FrameDecoder::new();
        assert!(decoder.feed(b"data: {\"type\":\"pha").is_empty());
        let events = decoder.feed(b"se2_start\"}\ndata: ");
        assert_eq!(events, vec![CouncilEvent::Phase2Start]);
        let events = decoder.feed(b"{\"type\":\"complete\"}\n");
        assert_eq!(events, vec![CouncilEvent::Complete]);
        assert!(decoder.finish().is_none());
    }

    #[test]
    fn test_split_mid_multibyte_character() {
        let line = "data: {\"type\":\"phase3_token\",\"data\":\"héllo 🌍\"}\n";
        let bytes = line.as_bytes();
        // Cut inside the 4-byte emoji
        let cut = line.find('🌍').unwrap() + 2;

        let mut decoder = FrameDecoder::new();
        assert!(decoder.feed(&bytes[..cut]).is_empty());
        let events = decoder.feed(&bytes[cut..]);
        assert_eq!(
            events,
            vec![CouncilEvent::Phase3Token {
                data: "héllo 🌍".to_string()
            }]
        );
    }

    #[test]
    fn test_chunking_is_offset_independent() {
        let input = "data: {\"type\":\"phase1_start\"}\n\
                     \n\
                     : keep-alive\n\
                     data: {\"type\":\"phase1_update\",\"data\":{\"model\":\"m\",\"content\":\"héllo\"}}\n\
                     data: {\"type\":\"complete\"}\n";
        let expected = decode_whole(input);
        assert_eq!(expected.len(), 3);

        let bytes = input.as_bytes();
        for chunk_size in 1..=bytes.len() {
            let mut decoder = FrameDecoder::new();
            let mut events = Vec::new();
            for chunk in bytes.chunks(chunk_size) {
                events.extend(decoder.feed(chunk));
            }
            events.extend(decoder.finish());
            assert_eq!(events, expected, "chunk size {}", chunk_size);
        }
    }

    #[test]
    fn test_non_data_lines_ignored() {
        let events = decode_whole(
            "\n: comment\nevent: noise\nretry: 5000\ndata: {\"type\":\"complete\"}\n",
        );
        assert_eq!(events, vec![CouncilEvent::Complete]);
    }

    #[test]
    fn test_malformed_frame_dropped_stream_continues() {
        let events = decode_whole(
            "data: {not json\ndata: {\"type\":\"phase1_update\",\"data\":{\"model\":\"m\",\"content\":\"a\"}}\n",
        );
        assert_eq!(
            events,
            vec![CouncilEvent::Phase1Update {
                data: ModelAnswer {
                    model: "m".to_string(),
                    content: "a".to_string(),
                }
            }]
        );
    }

    #[test]
    fn test_finish_drains_unterminated_line() {
        let mut decoder = FrameDecoder::new();
        assert!(decoder.feed(b"data: {\"type\":\"complete\"}").is_empty());
        assert_eq!(decoder.finish(), Some(CouncilEvent::Complete));
        // Residual was consumed
        assert!(decoder.finish().is_none());
    }

    #[test]
    fn test_no_duplicate_when_stream_ends_on_newline() {
        let mut decoder = FrameDecoder::new();
        let events = decoder.feed(b"data: {\"type\":\"complete\"}\n");
        assert_eq!(events, vec![CouncilEvent::Complete]);
        assert_eq!(decoder.finish(), None);
    }

    #[test]
    fn test_crlf_lines() {
        let events = decode_whole("data: {\"type\":\"phase2_skipped\"}\r\n");
        assert_eq!(
            events,
            vec![CouncilEvent::Phase2Skipped { metadata: None }]
        );
    }

    #[test]
    fn test_leading_whitespace_tolerated() {
        let events = decode_whole("  data: {\"type\":\"complete\"}  \n");
        assert_eq!(events, vec![CouncilEvent::Complete]);
    }

    #[test]
    fn test_unknown_kind_decodes_to_unknown() {
        let events = decode_whole("data: {\"type\":\"telemetry\",\"n\":1}\n");
        assert_eq!(events, vec![CouncilEvent::Unknown]);
    }

    #[test]
    fn test_reset_discards_partial_line() {
        let mut decoder = FrameDecoder::new();
        decoder.feed(b"data: {\"type\":\"comp");
        decoder.reset();
        assert!(decoder.finish().is_none());
    }
}
