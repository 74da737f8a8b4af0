//! Computing byte offsets of each line in a blob, and clamping a requested line window to it.

use crate::{Error, Options};

/// Byte offsets of the start of each line in a blob, plus a sentinel equal to the blob's length.
#[derive(Debug, Clone, Default)]
pub struct LineIndex {
    offsets: Vec<u32>,
    num_lines: u32,
}

impl LineIndex {
    /// Build the index for `buf`. Adapted from the classic line-counting idiom: a line is
    /// "complete" when terminated by `\n`; a non-empty buffer not ending in `\n` has one
    /// additional, incomplete trailing line.
    pub fn build(buf: &[u8]) -> Self {
        let mut offsets = Vec::new();
        let mut bol = true;
        for (i, &b) in buf.iter().enumerate() {
            if bol {
                offsets.push(i as u32);
                bol = false;
            }
            if b == b'\n' {
                bol = true;
            }
        }
        offsets.push(buf.len() as u32);

        let newline_count = buf.iter().filter(|&&b| b == b'\n').count() as u32;
        let incomplete_trailing_line = u32::from(!buf.is_empty() && *buf.last().unwrap() != b'\n');
        let num_lines = newline_count + incomplete_trailing_line;

        LineIndex { offsets, num_lines }
    }

    /// The number of lines in the blob.
    pub fn num_lines(&self) -> u32 {
        self.num_lines
    }

    /// The byte offset at which 0-based line `line` begins.
    pub fn byte_offset(&self, line: u32) -> u32 {
        self.offsets[line as usize]
    }

    /// Clamp `options.ranges` against this index's line count, resolving "unset" window bounds.
    ///
    /// Returns 0-based, end-exclusive ranges. Fails with [`Error::InvalidLineRange`] if the
    /// window's lower bound exceeds both the file length and its own upper bound.
    pub fn resolve_window(&self, options: &Options) -> Result<Vec<std::ops::Range<u32>>, Error> {
        let ranges = options.ranges.to_ranges(self.num_lines);
        for range in &ranges {
            if range.start > self.num_lines || range.start > range.end {
                return Err(Error::InvalidLineRange {
                    min_line: range.start + 1,
                    max_line: range.end,
                    num_lines: self.num_lines,
                });
            }
        }
        Ok(ranges
            .into_iter()
            .map(|r| r.start..r.end.max(r.start).min(self.num_lines))
            .collect())
    }
}
