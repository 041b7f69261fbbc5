//! Line accumulator for the inbound command stream.
//!
//! Bytes arrive one at a time from a non-blocking reader.  The buffer
//! collects them until `\n` and then hands back the complete line,
//! clearing itself whatever happens to the line afterwards.
//!
//! ```text
//!   byte ──▶ ┌──────────────┐  '\n'  ┌──────────┐
//!            │  Collecting  │ ─────▶ │ Line out │
//!            └──────────────┘        └──────────┘
//!              │ invalid byte → clear, ParseError::InvalidByte
//!              │ capacity hit → clear, ParseError::LineTooLong,
//!              ▼                skip until next '\n'
//!            ┌──────────────┐
//!            │  Discarding  │
//!            └──────────────┘
//! ```

use heapless::String;

use crate::error::ParseError;

/// Hard upper bound on one command line, terminator excluded.
pub const MAX_LINE_LEN: usize = 128;

/// One complete command line.
pub type Line = String<MAX_LINE_LEN>;

/// Streaming line accumulator.
#[derive(Debug, Clone)]
pub struct CommandBuffer {
    buf: Line,
    limit: usize,
    /// Set after an over-long line until its terminator shows up.
    discarding: bool,
}

impl CommandBuffer {
    /// `limit` is clamped to [`MAX_LINE_LEN`].
    pub fn new(limit: usize) -> Self {
        Self {
            buf: String::new(),
            limit: limit.clamp(1, MAX_LINE_LEN),
            discarding: false,
        }
    }

    /// Feed one byte.
    ///
    /// * `Ok(Some(line))`: a terminator completed a line (trailing `\r`
    ///   removed).  The buffer is empty afterwards.
    /// * `Ok(None)`: byte absorbed, no line yet.
    /// * `Err(_)`: the byte was rejected and the buffer is empty.
    pub fn feed(&mut self, byte: u8) -> Result<Option<Line>, ParseError> {
        if byte == b'\n' {
            let mut line = core::mem::take(&mut self.buf);
            if core::mem::take(&mut self.discarding) {
                return Ok(None);
            }
            if line.ends_with('\r') {
                line.pop();
            }
            return Ok(Some(line));
        }

        if byte == 0 || !byte.is_ascii() {
            self.reset();
            return Err(ParseError::InvalidByte(byte));
        }

        if self.discarding {
            return Ok(None);
        }

        if self.buf.len() >= self.limit || self.buf.push(char::from(byte)).is_err() {
            self.buf.clear();
            self.discarding = true;
            return Err(ParseError::LineTooLong);
        }
        Ok(None)
    }

    /// Bytes accumulated towards the current line.
    pub fn len(&self) -> usize {
        self.buf.len()
    }

    pub fn is_empty(&self) -> bool {
        self.buf.is_empty()
    }

    /// Drop any partial line.
    pub fn reset(&mut self) {
        self.buf.clear();
        self.discarding = false;
    }
}

impl Default for CommandBuffer {
    fn default() -> Self {
        Self::new(MAX_LINE_LEN)
    }
}
