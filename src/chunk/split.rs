//! Line-aligned splitting with exact source offsets
//!
//! Splits text into bounded chunks without ever breaking a line:
//! - Each chunk covers a run of whole lines
//! - Each chunk records the byte span it occupies in the original text

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Errors from the chunk splitter
#[derive(Debug, Error, PartialEq, Eq)]
pub enum ChunkError {
    #[error("max chunk size must be greater than zero")]
    InvalidChunkSize,
}

/// Byte span of one line in the original text, separator excluded
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct LinePosition {
    /// Offset of the line's first byte
    pub start: usize,
    /// Offset one past the line's last byte
    pub end: usize,
}

/// A run of whole lines together with its byte span in the source text
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Chunk {
    /// Byte offset where the chunk starts in the original text
    pub start_position: usize,
    /// Byte offset one past the chunk's last byte
    pub end_position: usize,
    /// The chunk text, identical to the source slice at the offsets
    pub content: String,
}

/// Compute the byte span of each line within the text the lines came from.
///
/// Spans never include the separator: consecutive spans are separated by
/// exactly `separator.len()` bytes. An empty separator makes them contiguous.
pub fn line_positions(lines: &[&str], separator: &str) -> Vec<LinePosition> {
    let mut positions = Vec::with_capacity(lines.len());
    let mut cursor = 0;

    for line in lines {
        positions.push(LinePosition {
            start: cursor,
            end: cursor + line.len(),
        });
        cursor += line.len() + separator.len();
    }

    positions
}

/// Split `content` into line-aligned chunks of roughly `max_chunk_size` bytes.
///
/// The size check runs after a line is appended, so a chunk may exceed the
/// budget by up to one line plus one separator. Existing index consumers
/// depend on that soft ceiling. A single line larger than the budget becomes
/// a chunk of its own, and lines are never broken in the middle.
///
/// Guarantees for every returned chunk:
/// - `chunk.content == content[chunk.start_position..chunk.end_position]`
/// - chunks appear in source order and never overlap
/// - the gap between consecutive chunks is exactly one separator
/// - joining all chunk contents with the separator reproduces `content`
///
/// Empty content yields a single empty chunk spanning `[0, 0)`. A zero
/// budget is rejected rather than looping forever.
pub fn split_linear_lines(
    content: &str,
    max_chunk_size: usize,
    separator: &str,
) -> Result<Vec<Chunk>, ChunkError> {
    if max_chunk_size == 0 {
        return Err(ChunkError::InvalidChunkSize);
    }

    let lines = split_lines(content, separator);
    let positions = line_positions(&lines, separator);

    let mut chunks = Vec::new();
    let mut segment: Option<Segment> = None;

    for (i, &line) in lines.iter().enumerate() {
        let open = match segment.take() {
            None => Segment::open(line, i),
            Some(mut open) => {
                open.append(line, separator.len());
                open
            }
        };

        // Checked after the append: this is where the one-line overshoot
        // comes from.
        if open.size > max_chunk_size {
            chunks.push(open.close(&positions, i, separator));
        } else {
            segment = Some(open);
        }
    }

    // Whatever is still open becomes the final chunk.
    if let Some(rest) = segment {
        chunks.push(rest.close(&positions, lines.len() - 1, separator));
    }

    Ok(chunks)
}

/// Split content into lines on the separator.
///
/// Consecutive separators produce empty lines and a trailing separator
/// produces a trailing empty line. An empty separator means one line per
/// character.
fn split_lines<'a>(content: &'a str, separator: &str) -> Vec<&'a str> {
    if separator.is_empty() {
        return content
            .char_indices()
            .map(|(start, c)| &content[start..start + c.len_utf8()])
            .collect();
    }

    content.split(separator).collect()
}

/// The open run of lines accumulating toward one chunk
struct Segment<'a> {
    lines: Vec<&'a str>,
    start_line: usize,
    size: usize,
}

impl<'a> Segment<'a> {
    /// Open a segment on its first line
    fn open(line: &'a str, index: usize) -> Self {
        Self {
            lines: vec![line],
            start_line: index,
            size: line.len(),
        }
    }

    /// Append a line; the separator in front of it counts toward the size
    fn append(&mut self, line: &'a str, separator_len: usize) {
        self.lines.push(line);
        self.size += line.len() + separator_len;
    }

    /// Close the segment into a chunk ending at `end_line`
    fn close(self, positions: &[LinePosition], end_line: usize, separator: &str) -> Chunk {
        Chunk {
            start_position: positions[self.start_line].start,
            end_position: positions[end_line].end,
            content: self.lines.join(separator),
        }
    }
}
