//! Unframed document text decoding.

use tracing::debug;

use super::StreamDecoder;
use super::utf8::Utf8Decoder;

/// Decodes raw document streams (`/generate-prd`, `/review`,
/// `/edit-requirements`). Every decoded piece is document text.
#[derive(Debug, Default)]
pub struct RawTextDecoder {
    utf8: Utf8Decoder,
}

impl RawTextDecoder {
    pub fn new() -> Self {
        Self::default()
    }
}

impl StreamDecoder for RawTextDecoder {
    type Item = String;

    fn decode(&mut self, bytes: &[u8]) -> Vec<String> {
        let text = self.utf8.decode(bytes);
        if text.is_empty() {
            Vec::new()
        } else {
            vec![text]
        }
    }

    fn finish(&mut self) -> Vec<String> {
        let dropped = self.utf8.flush();
        if dropped > 0 {
            debug!(truncated_bytes = dropped, "document stream ended mid-character");
        }
        Vec::new()
    }
}
