//! Similarity search over an index document

use super::{ChunkRecord, IndexDocument};
use serde::Serialize;

/// One ranked search result
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SearchHit {
    /// Similarity score in [-1, 1]
    pub score: f64,
    /// The matching chunk
    #[serde(flatten)]
    pub chunk: ChunkRecord,
}

/// Rank a document's chunks against a query vector.
///
/// Chunks without an embedding are left out of the ranking rather than
/// scoring as zero.
pub fn rank(document: &IndexDocument, query: &[f32], top_k: usize) -> Vec<SearchHit> {
    let mut hits: Vec<SearchHit> = document
        .chunks
        .iter()
        .filter_map(|record| {
            record.embedding.as_ref().map(|embedding| SearchHit {
                score: cosine_similarity(query, embedding),
                chunk: record.clone(),
            })
        })
        .collect();

    // Sort by score descending
    hits.sort_by(|a, b| b.score.partial_cmp(&a.score).unwrap_or(std::cmp::Ordering::Equal));
    hits.truncate(top_k);

    hits
}

/// Cosine similarity between two vectors.
///
/// Mismatched lengths and zero vectors score 0.0 instead of poisoning the
/// ranking with NaN.
pub fn cosine_similarity(a: &[f32], b: &[f32]) -> f64 {
    if a.len() != b.len() || a.is_empty() {
        return 0.0;
    }

    let dot_product: f64 = a.iter().zip(b.iter()).map(|(x, y)| (*x as f64) * (*y as f64)).sum();
    let norm_a: f64 = a.iter().map(|x| (*x as f64).powi(2)).sum::<f64>().sqrt();
    let norm_b: f64 = b.iter().map(|x| (*x as f64).powi(2)).sum::<f64>().sqrt();

    if norm_a == 0.0 || norm_b == 0.0 {
        return 0.0;
    }

    dot_product / (norm_a * norm_b)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn record(file: &str, embedding: Option<Vec<f32>>) -> ChunkRecord {
        ChunkRecord {
            file: file.to_string(),
            start_position: 0,
            end_position: 1,
            content: "x".to_string(),
            hash: String::new(),
            embedding,
        }
    }

    fn document_with(records: Vec<ChunkRecord>) -> IndexDocument {
        let mut document = IndexDocument::new(None);
        document.chunks = records;
        document
    }

    #[test]
    fn test_cosine_similarity() {
        let a = vec![1.0, 0.0, 0.0];
        let b = vec![1.0, 0.0, 0.0];
        assert!((cosine_similarity(&a, &b) - 1.0).abs() < 0.001);

        let c = vec![0.0, 1.0, 0.0];
        assert!((cosine_similarity(&a, &c) - 0.0).abs() < 0.001);

        let d = vec![-1.0, 0.0, 0.0];
        assert!((cosine_similarity(&a, &d) - (-1.0)).abs() < 0.001);
    }

    #[test]
    fn test_cosine_similarity_guards() {
        assert_eq!(cosine_similarity(&[1.0, 0.0], &[1.0]), 0.0);
        assert_eq!(cosine_similarity(&[], &[]), 0.0);
        assert_eq!(cosine_similarity(&[0.0, 0.0], &[1.0, 0.0]), 0.0);
    }

    #[test]
    fn test_rank_orders_by_similarity() {
        let document = document_with(vec![
            record("far.ts", Some(vec![0.0, 1.0])),
            record("close.ts", Some(vec![0.9, 0.1])),
            record("exact.ts", Some(vec![1.0, 0.0])),
        ]);

        let hits = rank(&document, &[1.0, 0.0], 2);
        assert_eq!(hits.len(), 2);
        assert_eq!(hits[0].chunk.file, "exact.ts");
        assert_eq!(hits[1].chunk.file, "close.ts");
        assert!(hits[0].score > hits[1].score);
    }

    #[test]
    fn test_rank_skips_chunks_without_embeddings() {
        let document = document_with(vec![
            record("plain.ts", None),
            record("embedded.ts", Some(vec![1.0, 0.0])),
        ]);

        let hits = rank(&document, &[1.0, 0.0], 10);
        assert_eq!(hits.len(), 1);
        assert_eq!(hits[0].chunk.file, "embedded.ts");
    }

    #[test]
    fn test_hit_serializes_flat() {
        let hit = SearchHit {
            score: 0.5,
            chunk: record("a.ts", None),
        };

        let json = serde_json::to_value(&hit).unwrap();
        assert_eq!(json["score"], 0.5);
        assert_eq!(json["file"], "a.ts");
        assert_eq!(json["startPosition"], 0);
    }
}
