//! Blank-line frame reassembly.

/// Separator between event frames.
pub const FRAME_SEPARATOR: &str = "\n\n";

/// Accumulates decoded text and splits it into complete frames.
///
/// After every [`push`](Self::push) the buffer holds no complete frame;
/// a trailing partial frame waits for the next read.
#[derive(Debug, Default)]
pub struct FrameSplitter {
    buffer: String,
}

impl FrameSplitter {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append text and return the frames it completed, in order.
    pub fn push(&mut self, text: &str) -> Vec<String> {
        self.buffer.push_str(text);

        let mut frames = Vec::new();
        while let Some(pos) = self.buffer.find(FRAME_SEPARATOR) {
            frames.push(self.buffer[..pos].to_string());
            self.buffer.drain(..pos + FRAME_SEPARATOR.len());
        }
        frames
    }

    /// Text of the incomplete trailing frame.
    pub fn remainder(&self) -> &str {
        &self.buffer
    }

    /// Discard the incomplete trailing frame, returning it.
    pub fn take_remainder(&mut self) -> String {
        std::mem::take(&mut self.buffer)
    }
}
