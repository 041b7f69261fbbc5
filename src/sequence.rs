//! Recorded motion sequences.
//!
//! A [`Sequence`] is loaded once at startup from `sequence.csv` (one frame
//! per line, one comma-separated position per axis) and is read-only for
//! the rest of the run.  Rows that do not describe a full frame are skipped
//! with a warning rather than failing the whole file.

use std::io::Read;
use std::path::Path;

use log::{info, warn};

use crate::error::{RangeError, Result};

/// One recorded position per axis.
pub type Frame = Vec<f32>;

/// Ordered, immutable list of equal-width frames.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Sequence {
    frames: Vec<Frame>,
    width: usize,
}

impl Sequence {
    /// Build a sequence, checking every frame carries `width` positions.
    pub fn new(width: usize, frames: Vec<Frame>) -> Result<Self> {
        if let Some(bad) = frames.iter().find(|f| f.len() != width) {
            return Err(RangeError::FrameWidth {
                expected: width,
                found: bad.len(),
            }
            .into());
        }
        Ok(Self { frames, width })
    }

    /// A sequence with no frames.
    pub fn empty(width: usize) -> Self {
        Self {
            frames: Vec::new(),
            width,
        }
    }

    pub fn len(&self) -> usize {
        self.frames.len()
    }

    pub fn is_empty(&self) -> bool {
        self.frames.is_empty()
    }

    /// Positions per frame (== axis count).
    pub fn width(&self) -> usize {
        self.width
    }

    pub fn frame(&self, index: usize) -> Option<&[f32]> {
        self.frames.get(index).map(Vec::as_slice)
    }

    /// Parse CSV text.  Rows with the wrong number of values or a value that
    /// is not a number are dropped.
    pub fn from_reader(width: usize, reader: impl Read) -> Self {
        let mut rdr = csv::ReaderBuilder::new()
            .has_headers(false)
            .flexible(true)
            .trim(csv::Trim::All)
            .from_reader(reader);

        let mut frames = Vec::new();
        for (line, record) in rdr.records().enumerate() {
            let record = match record {
                Ok(r) => r,
                Err(e) => {
                    warn!("Unreadable frame on line {line}: {e}");
                    continue;
                }
            };
            let parsed: Option<Frame> = record
                .iter()
                .map(|v| v.parse::<f32>().ok().filter(|x| x.is_finite()))
                .collect();
            match parsed {
                Some(frame) if frame.len() == width => frames.push(frame),
                Some(frame) => warn!(
                    "Invalid frame on line {line}: expected {width} values, got {}",
                    frame.len()
                ),
                None => warn!("Invalid number in frame on line {line}"),
            }
        }

        info!("Loaded sequence: {} frames", frames.len());
        Self { frames, width }
    }

    /// Load from a file.  A missing file yields an empty sequence.
    pub fn load(path: &Path, width: usize) -> Self {
        match std::fs::File::open(path) {
            Ok(file) => Self::from_reader(width, std::io::BufReader::new(file)),
            Err(e) => {
                warn!("Sequence file {} not available: {e}", path.display());
                Self::empty(width)
            }
        }
    }
}
