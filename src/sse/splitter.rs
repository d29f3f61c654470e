//! Frame splitting
//!
//! Buffers raw transport chunks and yields complete frames delimited by a
//! blank line (`\n\n`). Chunks may split anywhere, including inside a
//! multi-byte UTF-8 sequence; the trailing partial frame stays buffered.

use crate::error::StreamError;

const FRAME_DELIMITER: &str = "\n\n";

/// Default cap on buffered, undelimited text (1 MiB).
pub const DEFAULT_MAX_FRAME_BYTES: usize = 1024 * 1024;

/// Incremental frame splitter.
///
/// ```ignore
/// let mut splitter = FrameSplitter::new();
/// splitter.push(b"event: token\ndata: {\"content\":\"Hi\"}\n\nevent: do");
/// assert!(splitter.next_frame()?.is_some());
/// assert!(splitter.next_frame()?.is_none());
/// assert_eq!(splitter.remainder(), "event: do");
/// ```
#[derive(Debug, Clone)]
pub struct FrameSplitter {
    /// Decoded text not yet terminated by a delimiter
    remainder: String,
    /// Bytes of an incomplete UTF-8 sequence carried to the next chunk
    pending_bytes: Vec<u8>,
    max_frame_bytes: Option<usize>,
}

impl FrameSplitter {
    /// Splitter with the default frame cap.
    pub fn new() -> Self {
        Self::with_max_frame_bytes(Some(DEFAULT_MAX_FRAME_BYTES))
    }

    /// Splitter with an explicit cap; `None` buffers without bound.
    pub fn with_max_frame_bytes(max_frame_bytes: Option<usize>) -> Self {
        Self {
            remainder: String::new(),
            pending_bytes: Vec::new(),
            max_frame_bytes,
        }
    }

    /// Append a transport chunk to the buffer.
    pub fn push(&mut self, chunk: &[u8]) {
        self.pending_bytes.extend_from_slice(chunk);
        let bytes = std::mem::take(&mut self.pending_bytes);

        let mut offset = 0;
        while offset < bytes.len() {
            match std::str::from_utf8(&bytes[offset..]) {
                Ok(text) => {
                    self.remainder.push_str(text);
                    return;
                }
                Err(err) => {
                    let valid_end = offset + err.valid_up_to();
                    self.remainder
                        .push_str(&String::from_utf8_lossy(&bytes[offset..valid_end]));
                    match err.error_len() {
                        Some(len) => {
                            self.remainder.push(char::REPLACEMENT_CHARACTER);
                            offset = valid_end + len;
                        }
                        None => {
                            // incomplete sequence at the end of the chunk
                            self.pending_bytes = bytes[valid_end..].to_vec();
                            return;
                        }
                    }
                }
            }
        }
    }

    /// Pop the next complete frame, trimmed. Empty frames are skipped.
    ///
    /// A frame longer than the cap fails with `FrameTooLarge`, the same as
    /// when `check_limit` catches it before its delimiter arrives.
    pub fn next_frame(&mut self) -> Result<Option<String>, StreamError> {
        while let Some(idx) = self.remainder.find(FRAME_DELIMITER) {
            self.ensure_within_limit(idx)?;
            let frame = self.remainder[..idx].trim().to_string();
            self.remainder.drain(..idx + FRAME_DELIMITER.len());
            if !frame.is_empty() {
                return Ok(Some(frame));
            }
        }
        Ok(None)
    }

    /// Fail if the undelimited remainder has grown past the cap.
    ///
    /// Call after draining complete frames. A trailing `\n` may be the
    /// first half of a delimiter and is not counted.
    pub fn check_limit(&self) -> Result<(), StreamError> {
        let pending = self
            .remainder
            .strip_suffix('\n')
            .unwrap_or(&self.remainder);
        self.ensure_within_limit(pending.len())
    }

    fn ensure_within_limit(&self, frame_len: usize) -> Result<(), StreamError> {
        match self.max_frame_bytes {
            Some(limit) if frame_len > limit => Err(StreamError::FrameTooLarge {
                limit,
                buffered: frame_len,
            }),
            _ => Ok(()),
        }
    }

    /// The buffered partial frame.
    pub fn remainder(&self) -> &str {
        &self.remainder
    }
}

impl Default for FrameSplitter {
    fn default() -> Self {
        Self::new()
    }
}
