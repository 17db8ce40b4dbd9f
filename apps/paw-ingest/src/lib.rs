//! Offline ingestion: reads plain-text documents, chunks them with overlap,
//! and rebuilds the vector collection from scratch.

use std::{
	fs,
	path::{Path, PathBuf},
	sync::Arc,
};

use clap::Parser;
use color_eyre::eyre;
use serde_json::{Map, json};
use tracing_subscriber::EnvFilter;

use paw_agent::Document;
use paw_providers::HttpProviders;
use paw_retrieval::QdrantIndex;

const UPSERT_BATCH_SIZE: usize = 64;

#[derive(Debug, Parser)]
#[command(
	version = paw_cli::VERSION,
	rename_all = "kebab",
	styles = paw_cli::styles(),
)]
pub struct Args {
	#[arg(long, short = 'c', value_name = "FILE")]
	pub config: PathBuf,
	/// Directory scanned recursively for .txt and .md files.
	#[arg(long, short = 'd', value_name = "DIR")]
	pub docs_dir: PathBuf,
}

pub async fn run(args: Args) -> color_eyre::Result<()> {
	let config = paw_config::load(&args.config)?;
	init_tracing(&config);

	let Some(qdrant) = config.storage.qdrant.as_ref() else {
		return Err(eyre::eyre!("Ingestion requires a [storage.qdrant] section."));
	};
	let index = QdrantIndex::new(
		qdrant,
		Arc::new(HttpProviders),
		config.providers.embedding.clone(),
		config.retrieval.top_k,
	)?;
	let files = collect_files(&args.docs_dir)?;

	if files.is_empty() {
		return Err(eyre::eyre!("No .txt or .md files found under {}.", args.docs_dir.display()));
	}

	let mut documents = Vec::new();

	for path in &files {
		let text = fs::read_to_string(path)?;
		let source = path.display().to_string();
		let chunks =
			chunk_text(&text, config.ingest.chunk_chars as usize, config.ingest.overlap_chars as usize);

		tracing::info!(source = %source, chunks = chunks.len(), "File chunked.");

		for (chunk_index, chunk) in chunks.into_iter().enumerate() {
			let mut metadata = Map::new();

			metadata.insert("source".to_string(), json!(source));
			metadata.insert("chunk_index".to_string(), json!(chunk_index));

			documents.push(Document::with_metadata(chunk, metadata));
		}
	}

	index.reset_collection().await?;

	for batch in documents.chunks(UPSERT_BATCH_SIZE) {
		index.upsert_documents(batch).await?;
	}

	tracing::info!(
		files = files.len(),
		chunks = documents.len(),
		collection = %qdrant.collection,
		"Ingestion complete."
	);

	Ok(())
}

fn collect_files(dir: &Path) -> color_eyre::Result<Vec<PathBuf>> {
	let mut files = Vec::new();
	let mut pending = vec![dir.to_path_buf()];

	while let Some(dir) = pending.pop() {
		for entry in fs::read_dir(&dir)? {
			let path = entry?.path();

			if path.is_dir() {
				pending.push(path);
			} else if matches!(
				path.extension().and_then(|ext| ext.to_str()),
				Some("txt") | Some("md")
			) {
				files.push(path);
			}
		}
	}

	// Deterministic chunk ids across runs.
	files.sort();

	Ok(files)
}

/// Character-based sliding window. Consecutive chunks share `overlap_chars`
/// characters; whitespace-only chunks are dropped.
pub fn chunk_text(text: &str, chunk_chars: usize, overlap_chars: usize) -> Vec<String> {
	let chars = text.chars().collect::<Vec<_>>();
	let step = chunk_chars.saturating_sub(overlap_chars).max(1);
	let mut chunks = Vec::new();
	let mut start = 0;

	while start < chars.len() {
		let end = (start + chunk_chars).min(chars.len());
		let chunk = chars[start..end].iter().collect::<String>();

		if !chunk.trim().is_empty() {
			chunks.push(chunk);
		}
		if end == chars.len() {
			break;
		}

		start += step;
	}

	chunks
}

fn init_tracing(config: &paw_config::Config) {
	let filter =
		EnvFilter::try_new(&config.service.log_level).unwrap_or_else(|_| EnvFilter::new("info"));
	tracing_subscriber::fmt().with_env_filter(filter).init();
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn short_text_is_a_single_chunk() {
		let chunks = chunk_text("Cats need taurine.", 1_000, 150);

		assert_eq!(chunks, ["Cats need taurine."]);
	}

	#[test]
	fn consecutive_chunks_overlap() {
		let text = "abcdefghij";
		let chunks = chunk_text(text, 4, 2);

		assert_eq!(chunks, ["abcd", "cdef", "efgh", "ghij"]);
	}

	#[test]
	fn window_is_character_based_not_byte_based() {
		let text = "äöüß".repeat(3);
		let chunks = chunk_text(&text, 4, 0);

		assert_eq!(chunks.len(), 3);
		assert!(chunks.iter().all(|chunk| chunk.chars().count() == 4));
	}

	#[test]
	fn whitespace_only_chunks_are_dropped() {
		let chunks = chunk_text("     ", 3, 1);

		assert!(chunks.is_empty());
	}
}
