//! Content chunking module
//!
//! This module handles turning file content into indexable units:
//! - Line-aligned splitting with a soft size ceiling
//! - Exact byte offsets back into the source text

pub mod split;

pub use split::{line_positions, split_linear_lines, Chunk, ChunkError, LinePosition};

use sha2::{Digest, Sha256};

/// Compute a stable hash for content
pub fn content_hash(content: &str) -> String {
    let mut hasher = Sha256::new();
    hasher.update(content.as_bytes());
    hex::encode(hasher.finalize())
}
