//! Chat event stream decoding: `data: <json>` frames into [`Chunk`]s.

use serde::Deserialize;
use tracing::{debug, trace, warn};

use super::StreamDecoder;
use super::frame::FrameSplitter;
use super::utf8::Utf8Decoder;
use crate::telemetry;
use crate::types::Chunk;

/// Prefix of frames carrying a chunk payload.
pub const DATA_PREFIX: &str = "data: ";

/// Decodes the `/chat` event stream into [`Chunk`]s.
#[derive(Debug, Default)]
pub struct EventStreamDecoder {
    utf8: Utf8Decoder,
    frames: FrameSplitter,
}

impl EventStreamDecoder {
    pub fn new() -> Self {
        Self::default()
    }
}

impl StreamDecoder for EventStreamDecoder {
    type Item = Chunk;

    fn decode(&mut self, bytes: &[u8]) -> Vec<Chunk> {
        let text = self.utf8.decode(bytes);
        self.frames
            .push(&text)
            .iter()
            .filter_map(|frame| parse_frame(frame))
            .collect()
    }

    fn finish(&mut self) -> Vec<Chunk> {
        let dropped = self.utf8.flush();
        let remainder = self.frames.take_remainder();
        if dropped > 0 || !remainder.is_empty() {
            debug!(
                truncated_bytes = dropped,
                partial_frame_len = remainder.len(),
                "event stream ended with an unterminated frame"
            );
        }
        Vec::new()
    }
}

/// Interpret one complete frame.
///
/// Returns `None` for empty frames, non-data frames (comments, keepalives),
/// malformed JSON, payloads without a recognized `type`, and known types
/// whose fields have the wrong shape.
pub fn parse_frame(frame: &str) -> Option<Chunk> {
    if frame.is_empty() {
        return None;
    }
    let Some(payload) = frame.strip_prefix(DATA_PREFIX) else {
        trace!(frame, "ignoring non-data frame");
        return None;
    };

    let value: serde_json::Value = match serde_json::from_str(payload) {
        Ok(value) => value,
        Err(e) => {
            warn!(error = %e, payload, "dropping malformed event frame");
            metrics::counter!(telemetry::FRAMES_DROPPED_TOTAL, "reason" => "malformed")
                .increment(1);
            return None;
        }
    };

    match Chunk::deserialize(&value) {
        Ok(chunk) => {
            metrics::counter!(telemetry::CHUNKS_TOTAL, "kind" => chunk.kind()).increment(1);
            Some(chunk)
        }
        Err(e) => {
            let known_type = value
                .get("type")
                .and_then(serde_json::Value::as_str)
                .is_some_and(|kind| Chunk::KINDS.contains(&kind));
            if known_type {
                warn!(error = %e, payload, "dropping event frame with malformed fields");
                metrics::counter!(telemetry::FRAMES_DROPPED_TOTAL, "reason" => "malformed")
                    .increment(1);
            } else {
                warn!(error = %e, payload, "dropping event frame with unrecognized type");
                metrics::counter!(telemetry::FRAMES_DROPPED_TOTAL, "reason" => "unrecognized")
                    .increment(1);
            }
            None
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_each_chunk_kind() {
        assert_eq!(
            parse_frame(r#"data: {"type":"thought","content":"hmm"}"#),
            Some(Chunk::thought("hmm"))
        );
        assert_eq!(
            parse_frame(r#"data: {"type":"text","content":"hi"}"#),
            Some(Chunk::text("hi"))
        );
        assert_eq!(
            parse_frame(r#"data: {"type":"phase_complete"}"#),
            Some(Chunk::PhaseComplete)
        );
    }

    #[test]
    fn missing_content_is_none() {
        assert_eq!(
            parse_frame(r#"data: {"type":"text"}"#),
            Some(Chunk::Text { content: None })
        );
    }

    #[test]
    fn non_data_and_broken_frames_are_dropped() {
        assert_eq!(parse_frame(""), None);
        assert_eq!(parse_frame(": keepalive"), None);
        assert_eq!(parse_frame("event: ping"), None);
        assert_eq!(parse_frame("data: {not json"), None);
        assert_eq!(parse_frame(r#"data: {"type":"usage","content":"x"}"#), None);
        assert_eq!(parse_frame(r#"data: {"content":"x"}"#), None);
    }

    #[test]
    fn known_type_with_wrong_content_is_dropped() {
        assert_eq!(parse_frame(r#"data: {"type":"text","content":3}"#), None);
        assert_eq!(parse_frame(r#"data: {"type":"thought","content":["a"]}"#), None);
    }

    #[test]
    fn decoder_emits_chunks_across_reads() {
        let mut decoder = EventStreamDecoder::new();
        let first = decoder.decode(b"data: {\"type\":\"text\",\"content\":\"a\"}\n\ndata: {\"ty");
        assert_eq!(first, vec![Chunk::text("a")]);
        let second = decoder.decode(b"pe\":\"text\",\"content\":\"b\"}\n\n");
        assert_eq!(second, vec![Chunk::text("b")]);
        assert!(decoder.finish().is_empty());
    }

    #[test]
    fn unterminated_frame_is_not_parsed_at_end() {
        let mut decoder = EventStreamDecoder::new();
        assert!(
            decoder
                .decode(b"data: {\"type\":\"text\",\"content\":\"late\"}")
                .is_empty()
        );
        assert!(decoder.finish().is_empty());
    }
}
