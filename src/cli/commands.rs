//! Command implementations

use super::{AuthArgs, IndexArgs, SearchArgs, StatsArgs};
use crate::auth::{self, Credentials};
use crate::chunk::split_linear_lines;
use crate::embedding::{estimate_cost, EmbeddingProvider, OpenAIEmbedding};
use crate::index::{rank, ChunkRecord, IndexDocument, ProviderInfo, SearchHit};
use crate::repo::Repository;
use anyhow::{Context, Result};
use serde::Serialize;
use std::path::Path;

/// Line separator used when chunking file content
const LINE_SEPARATOR: &str = "\n";

/// Summary of an indexing run
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct IndexSummary {
    /// Files that contributed chunks
    pub files: usize,
    /// Files skipped as binary or unreadable
    pub skipped_files: usize,
    /// Total chunks written
    pub chunks: usize,
    /// Chunks carrying an embedding
    pub embedded: usize,
    /// Tokens billed by the embedding service
    pub total_tokens: usize,
    /// Estimated cost in dollars, when the model price is known
    pub cost: Option<f64>,
    /// Where the index was written
    pub output: String,
}

/// Build the chunk index for a repository
pub async fn index(path: &Path, args: &IndexArgs) -> Result<IndexSummary> {
    let repo = Repository::open(path)?;
    let config = repo.config().clone();

    let max_chunk_size = args.max_chunk_size.unwrap_or(config.max_chunk_size);
    let model = args.model.clone().unwrap_or_else(|| config.model.clone());
    let batch_size = args.batch_size.unwrap_or(config.batch_size).max(1);

    let output = Path::new(&args.output);
    if output.exists() && !args.force {
        anyhow::bail!(
            "Index file {:?} already exists. Use --force to overwrite.",
            output
        );
    }

    let provider: Option<Box<dyn EmbeddingProvider>> = if args.no_embeddings {
        None
    } else {
        let api_key = auth::resolve_api_key(args.api_key.as_deref())?.context(
            "No API key found. Pass --api-key, set OPEN_AI_API_KEY, \
             or run 'repoindex auth --set <key>'.",
        )?;
        Some(Box::new(OpenAIEmbedding::new(&model, &api_key)))
    };

    let provider_info = provider.as_ref().map(|p| ProviderInfo {
        name: "openai".to_string(),
        model: p.model().to_string(),
        dimension: p.dimension(),
    });

    println!("Indexing {:?}...", repo.root());

    // Chunk every eligible file
    let mut document = IndexDocument::new(provider_info);
    let mut skipped_files = 0;

    for file in repo.list_files()? {
        let file_name = file.to_string_lossy().to_string();
        if !config.is_eligible(&file_name) {
            continue;
        }

        let content = match repo.read_file(&file)? {
            Some(content) => content,
            None => {
                skipped_files += 1;
                continue;
            }
        };

        let chunks = split_linear_lines(&content, max_chunk_size, LINE_SEPARATOR)
            .with_context(|| format!("Failed to chunk {:?}", file))?;

        tracing::debug!("Chunked {} into {} chunks", file_name, chunks.len());
        for chunk in chunks {
            document.chunks.push(ChunkRecord::from_chunk(&file_name, chunk));
        }
    }

    println!("  Files: {}", document.file_count());
    println!("  Chunks: {}", document.chunks.len());

    // Embed the chunks in batches
    let mut total_tokens = 0;
    if let Some(provider) = &provider {
        let batch_count = document.chunks.len().div_ceil(batch_size);

        for (batch_index, records) in document.chunks.chunks_mut(batch_size).enumerate() {
            let texts: Vec<String> = records.iter().map(|r| r.content.clone()).collect();

            match provider.embed_batch(&texts).await {
                Ok(batch) if batch.embeddings.len() == records.len() => {
                    total_tokens += batch.total_tokens;
                    for (record, embedding) in records.iter_mut().zip(batch.embeddings) {
                        record.embedding = Some(embedding);
                    }
                    tracing::debug!("Embedded batch {}/{}", batch_index + 1, batch_count);
                }
                Ok(batch) => {
                    // Vector count does not match the inputs; treat the
                    // whole batch as failed.
                    eprintln!(
                        "Warning: Failed to embed batch {}/{}: got {} embeddings for {} inputs",
                        batch_index + 1,
                        batch_count,
                        batch.embeddings.len(),
                        records.len()
                    );
                }
                Err(e) => {
                    // A failed batch leaves its chunks without embeddings;
                    // the rest of the run continues.
                    eprintln!(
                        "Warning: Failed to embed batch {}/{}: {}",
                        batch_index + 1,
                        batch_count,
                        e
                    );
                }
            }
        }
    }

    document.save(output)?;

    let cost = provider.as_ref().and_then(|p| estimate_cost(p.model(), total_tokens));

    Ok(IndexSummary {
        files: document.file_count(),
        skipped_files,
        chunks: document.chunks.len(),
        embedded: document.embedded_count(),
        total_tokens,
        cost,
        output: args.output.clone(),
    })
}

/// Search an index by semantic similarity
pub async fn search(args: &SearchArgs) -> Result<Vec<SearchHit>> {
    let document = IndexDocument::load(Path::new(&args.index))?;

    let provider_info = document.provider.clone().ok_or_else(|| {
        anyhow::anyhow!(
            "Index has no embeddings; re-run 'repoindex index' without --no-embeddings"
        )
    })?;

    let api_key = auth::resolve_api_key(args.api_key.as_deref())?.context(
        "No API key found. Pass --api-key, set OPEN_AI_API_KEY, \
         or run 'repoindex auth --set <key>'.",
    )?;

    // Query with the model the index was built with, so the vectors line up.
    let provider =
        OpenAIEmbedding::new(&provider_info.model, &api_key).with_dimension(provider_info.dimension);
    let query = provider.embed(&args.query).await?;

    Ok(rank(&document, &query, args.top_k))
}

/// Statistics reported for an index file
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct IndexStats {
    /// The index file inspected
    pub index_file: String,
    /// Index run id
    pub id: String,
    /// When the index was created
    pub created_at: chrono::DateTime<chrono::Utc>,
    /// Embedding provider recorded in the index, when present
    #[serde(skip_serializing_if = "Option::is_none")]
    pub provider: Option<ProviderInfo>,
    /// Distinct files in the index
    pub files: usize,
    /// Total chunks
    pub chunks: usize,
    /// Chunks carrying an embedding
    pub embedded_chunks: usize,
    /// Total bytes of chunk content
    pub content_bytes: usize,
}

/// Collect statistics for an index file
pub fn stats(args: &StatsArgs) -> Result<IndexStats> {
    let document = IndexDocument::load(Path::new(&args.index))?;

    Ok(IndexStats {
        index_file: args.index.clone(),
        id: document.id.clone(),
        created_at: document.created_at,
        provider: document.provider.clone(),
        files: document.file_count(),
        chunks: document.chunks.len(),
        embedded_chunks: document.embedded_count(),
        content_bytes: document.content_bytes(),
    })
}

/// Manage the stored API key
pub fn auth(args: &AuthArgs) -> Result<()> {
    if let Some(ref key) = args.set {
        let mut credentials = Credentials::load()?;
        credentials.api_key = Some(key.clone());
        credentials.save()?;
        println!("✓ API key saved to {:?}", auth::credentials_path()?);
        return Ok(());
    }

    if args.clear {
        if Credentials::clear()? {
            println!("✓ Stored credentials removed");
        } else {
            println!("No stored credentials to remove.");
        }
        return Ok(());
    }

    // Default action is showing the masked state
    let credentials = Credentials::load()?;
    match credentials.api_key {
        Some(ref key) => println!("API key: {}", auth::mask_key(key)),
        None => println!("No API key stored. Run 'repoindex auth --set <key>'."),
    }

    Ok(())
}

/// Print an index summary in JSON format
pub fn print_summary_json(summary: &IndexSummary) -> Result<()> {
    let json = serde_json::to_string_pretty(summary)?;
    println!("{}", json);
    Ok(())
}

/// Print an index summary in text format
pub fn print_summary_text(summary: &IndexSummary) {
    println!("\n✓ Indexing complete");
    println!("  Output: {}", summary.output);
    println!("  Files indexed: {}", summary.files);
    if summary.skipped_files > 0 {
        println!("  Files skipped: {}", summary.skipped_files);
    }
    println!("  Chunks: {}", summary.chunks);
    println!("  Embedded chunks: {}/{}", summary.embedded, summary.chunks);
    println!("  Tokens used: {}", summary.total_tokens);
    if let Some(cost) = summary.cost {
        println!("  Estimated cost: ${:.6}", cost);
    }
}

/// Print index statistics in JSON format
pub fn print_stats_json(stats: &IndexStats) -> Result<()> {
    let json = serde_json::to_string_pretty(stats)?;
    println!("{}", json);
    Ok(())
}

/// Print index statistics in text format
pub fn print_stats_text(stats: &IndexStats) {
    println!("Repository Index");
    println!("================\n");

    println!("Index file: {}", stats.index_file);
    println!("Id: {}", stats.id);
    println!("Created: {}", stats.created_at);
    match stats.provider {
        Some(ref provider) => println!(
            "Provider: {} ({}, {} dimensions)",
            provider.name, provider.model, provider.dimension
        ),
        None => println!("Provider: none (indexed without embeddings)"),
    }
    println!("Files: {}", stats.files);
    println!("Chunks: {}", stats.chunks);
    println!("Embedded chunks: {}", stats.embedded_chunks);
    println!("Content bytes: {}", stats.content_bytes);
}

/// Print search hits in JSON format
pub fn print_hits_json(hits: &[SearchHit]) -> Result<()> {
    let json = serde_json::to_string_pretty(hits)?;
    println!("{}", json);
    Ok(())
}

/// Print search hits in text format
pub fn print_hits_text(hits: &[SearchHit]) {
    if hits.is_empty() {
        println!("No matches found.");
        return;
    }

    for (i, hit) in hits.iter().enumerate() {
        println!(
            "{}. {} [{}..{}] (score {:.3})",
            i + 1,
            hit.chunk.file,
            hit.chunk.start_position,
            hit.chunk.end_position,
            hit.score
        );
        for line in hit.chunk.content.lines().take(3) {
            println!("   | {}", line);
        }
        println!();
    }
}
