//! repoindex - Repository embedding index library
//!
//! This library chunks the files of a source repository into line-aligned
//! pieces with exact byte offsets, embeds them, and persists everything to
//! a single JSON index that can be searched by semantic similarity.

pub mod auth;
pub mod chunk;
pub mod cli;
pub mod embedding;
pub mod index;
pub mod repo;

/// Re-export commonly used types
pub use chunk::{split_linear_lines, Chunk, ChunkError, LinePosition};
pub use embedding::EmbeddingProvider;
pub use index::IndexDocument;
pub use repo::Repository;

/// Application-wide error type
pub use anyhow::Result;

/// Version information
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
pub const APP_NAME: &str = "repoindex";
