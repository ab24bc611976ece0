use std::collections::VecDeque;

/// Reassembles complete lines from arbitrarily chunked transport bytes.
///
/// Bytes are buffered until a `\n` arrives, so a line split across chunks
/// (even inside a multi-byte character or the `data: ` prefix) comes out whole.
/// Each line is decoded lossily, with the newline and an optional trailing `\r` stripped.
pub struct LineFramer {
    buffer: VecDeque<u8>,
}

impl LineFramer {
    /// Create a new framer with specified capacity
    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            buffer: VecDeque::with_capacity(capacity),
        }
    }

    /// Add a transport chunk to the buffer
    pub fn extend(&mut self, bytes: &[u8]) {
        self.buffer.extend(bytes);
    }

    /// Extract the next complete line, or None if the buffer holds only a partial one
    pub fn next_line(&mut self) -> Option<String> {
        let newline_pos = self.buffer.iter().position(|&b| b == b'\n')?;

        let line_bytes: Vec<u8> = self.buffer.drain(..=newline_pos).collect();

        Some(decode_line(&line_bytes[..newline_pos]))
    }

    /// Iterate over every complete line currently buffered
    pub fn lines(&mut self) -> impl Iterator<Item = String> + '_ {
        std::iter::from_fn(move || self.next_line())
    }

    /// Flush the unterminated tail at end of stream
    pub fn finish(&mut self) -> Option<String> {
        if self.buffer.is_empty() {
            return None;
        }

        let rest: Vec<u8> = self.buffer.drain(..).collect();
        Some(decode_line(&rest))
    }

    /// Number of buffered bytes not yet emitted as a line
    pub fn len(&self) -> usize {
        self.buffer.len()
    }

    pub fn is_empty(&self) -> bool {
        self.buffer.is_empty()
    }
}

impl Default for LineFramer {
    fn default() -> Self {
        Self::with_capacity(4096)
    }
}

fn decode_line(bytes: &[u8]) -> String {
    let bytes = bytes.strip_suffix(b"\r").unwrap_or(bytes);
    String::from_utf8_lossy(bytes).into_owned()
}
