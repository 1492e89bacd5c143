//! Index document storage
//!
//! The index is a single JSON document: metadata about the run plus one
//! record per chunk carrying offsets, a content hash, and the embedding.

pub mod search;

pub use search::{cosine_similarity, rank, SearchHit};

use crate::chunk::Chunk;
use anyhow::{bail, Context, Result};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::path::Path;

/// Current index document version
pub const INDEX_VERSION: u32 = 1;

/// Default index file name
pub const DEFAULT_INDEX_FILE: &str = "repository-index.json";

/// Embedding provider metadata recorded with the index
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProviderInfo {
    /// Provider name
    pub name: String,
    /// Model used to embed the chunks
    pub model: String,
    /// Vector dimension
    pub dimension: usize,
}

/// One indexed chunk of one file
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ChunkRecord {
    /// Path of the source file, relative to the indexed root
    pub file: String,
    /// Byte offset where the chunk starts in the file
    pub start_position: usize,
    /// Byte offset one past the chunk's last byte
    pub end_position: usize,
    /// Chunk text
    pub content: String,
    /// Content hash for change detection
    pub hash: String,
    /// Embedding vector, absent when embedding was skipped or failed
    #[serde(skip_serializing_if = "Option::is_none")]
    pub embedding: Option<Vec<f32>>,
}

impl ChunkRecord {
    /// Build a record from a splitter chunk
    pub fn from_chunk(file: &str, chunk: Chunk) -> Self {
        let hash = crate::chunk::content_hash(&chunk.content);
        Self {
            file: file.to_string(),
            start_position: chunk.start_position,
            end_position: chunk.end_position,
            content: chunk.content,
            hash,
            embedding: None,
        }
    }
}

/// The index document written to disk
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct IndexDocument {
    /// Document format version
    pub version: u32,
    /// Unique id for this index run
    pub id: String,
    /// When the index was created
    pub created_at: DateTime<Utc>,
    /// Embedding provider metadata, absent when embeddings were skipped
    #[serde(skip_serializing_if = "Option::is_none")]
    pub provider: Option<ProviderInfo>,
    /// All indexed chunks
    pub chunks: Vec<ChunkRecord>,
}

impl IndexDocument {
    /// Create an empty document for a new run
    pub fn new(provider: Option<ProviderInfo>) -> Self {
        Self {
            version: INDEX_VERSION,
            id: uuid::Uuid::new_v4().to_string(),
            created_at: Utc::now(),
            provider,
            chunks: Vec::new(),
        }
    }

    /// Load an index document from disk, rejecting unknown versions
    pub fn load(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read index file: {:?}", path))?;
        let document: IndexDocument = serde_json::from_str(&content)
            .with_context(|| format!("Failed to parse index file: {:?}", path))?;

        if document.version != INDEX_VERSION {
            bail!(
                "Unsupported index version {} (expected {}); re-run indexing",
                document.version,
                INDEX_VERSION
            );
        }

        Ok(document)
    }

    /// Write the index document to disk
    pub fn save(&self, path: &Path) -> Result<()> {
        let content = serde_json::to_string_pretty(self).context("Failed to serialize index")?;
        std::fs::write(path, content)
            .with_context(|| format!("Failed to write index file: {:?}", path))?;
        Ok(())
    }

    /// Number of chunks carrying an embedding
    pub fn embedded_count(&self) -> usize {
        self.chunks.iter().filter(|c| c.embedding.is_some()).count()
    }

    /// Number of distinct files in the index
    pub fn file_count(&self) -> usize {
        let files: HashSet<&str> = self.chunks.iter().map(|c| c.file.as_str()).collect();
        files.len()
    }

    /// Total bytes of chunk content held by the index
    pub fn content_bytes(&self) -> usize {
        self.chunks.iter().map(|c| c.content.len()).sum()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_document() -> IndexDocument {
        let mut document = IndexDocument::new(Some(ProviderInfo {
            name: "openai".to_string(),
            model: "text-embedding-ada-002".to_string(),
            dimension: 3,
        }));

        let chunk = Chunk {
            start_position: 0,
            end_position: 5,
            content: "hello".to_string(),
        };
        let mut first = ChunkRecord::from_chunk("src/a.ts", chunk);
        first.embedding = Some(vec![1.0, 0.0, 0.0]);
        document.chunks.push(first);

        let chunk = Chunk {
            start_position: 6,
            end_position: 11,
            content: "world".to_string(),
        };
        document.chunks.push(ChunkRecord::from_chunk("src/b.ts", chunk));

        document
    }

    #[test]
    fn test_record_from_chunk_carries_offsets_and_hash() {
        let chunk = Chunk {
            start_position: 3,
            end_position: 8,
            content: "hello".to_string(),
        };

        let record = ChunkRecord::from_chunk("src/app.ts", chunk);
        assert_eq!(record.file, "src/app.ts");
        assert_eq!(record.start_position, 3);
        assert_eq!(record.end_position, 8);
        assert_eq!(record.hash, crate::chunk::content_hash("hello"));
        assert!(record.embedding.is_none());
    }

    #[test]
    fn test_round_trip_through_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("index.json");

        let document = sample_document();
        document.save(&path).unwrap();

        let loaded = IndexDocument::load(&path).unwrap();
        assert_eq!(loaded.version, INDEX_VERSION);
        assert_eq!(loaded.id, document.id);
        assert_eq!(loaded.chunks, document.chunks);
        assert_eq!(loaded.provider.unwrap().dimension, 3);
    }

    #[test]
    fn test_unknown_version_is_rejected() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("index.json");

        let mut document = sample_document();
        document.version = 99;
        let content = serde_json::to_string(&document).unwrap();
        std::fs::write(&path, content).unwrap();

        let err = IndexDocument::load(&path).unwrap_err();
        assert!(err.to_string().contains("version"));
    }

    #[test]
    fn test_counts() {
        let document = sample_document();
        assert_eq!(document.chunks.len(), 2);
        assert_eq!(document.embedded_count(), 1);
        assert_eq!(document.file_count(), 2);
        assert_eq!(document.content_bytes(), 10);
    }

    #[test]
    fn test_json_field_names_are_camel_case() {
        let json = serde_json::to_value(sample_document()).unwrap();

        assert!(json["createdAt"].is_string());
        assert_eq!(json["chunks"][0]["startPosition"], 0);
        assert_eq!(json["chunks"][0]["endPosition"], 5);
        assert_eq!(json["provider"]["model"], "text-embedding-ada-002");
        // Chunks without an embedding leave the field out entirely.
        assert!(json["chunks"][1].get("embedding").is_none());
    }
}
