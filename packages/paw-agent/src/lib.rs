//! The question-answering pipeline: a small conditional state machine that
//! classifies topic relevance, retrieves and grades supporting passages, falls
//! back to live web search when the local index has nothing useful, and
//! produces a grounded answer.
//!
//! This crate holds the domain only: the state record, the transition table,
//! the node implementations, and the capability port traits. It performs no
//! I/O of its own; concrete providers live in `paw-providers` and
//! `paw-retrieval` and are injected at the composition root.

pub mod check_topic;
pub mod generate;
pub mod grade_documents;
pub mod graph;
pub mod retrieve;
pub mod state;
pub mod transform_query;
pub mod web_search;

mod error;

pub use check_topic::REFUSAL_MESSAGE;
pub use error::{Error, Result};
pub use grade_documents::SequentialGrader;
pub use graph::{Node, NodeVisit, Outcome, PipelineRun, RunOptions, Transition, next_node};
pub use state::{Document, PipelineState, StateUpdate};

use std::{future::Future, pin::Pin, sync::Arc};

use serde_json::{Value, json};

use paw_config::{ChatProviderConfig, Config, EmbeddingProviderConfig, WebSearchProviderConfig};

pub type BoxFuture<'a, T> = Pin<Box<dyn Future<Output = T> + Send + 'a>>;

/// Chat completion port. The structured variant must fail loudly when the
/// model output cannot be parsed against the schema; it never coerces.
pub trait ChatProvider
where
	Self: Send + Sync,
{
	fn complete<'a>(
		&'a self,
		cfg: &'a ChatProviderConfig,
		messages: &'a [Value],
	) -> BoxFuture<'a, Result<String>>;

	fn complete_structured<'a>(
		&'a self,
		cfg: &'a ChatProviderConfig,
		messages: &'a [Value],
		schema: &'a Value,
	) -> BoxFuture<'a, Result<Value>>;
}

/// Text embedding port. The pipeline never calls this directly; the vector
/// retriever embeds queries through it.
pub trait EmbeddingProvider
where
	Self: Send + Sync,
{
	fn embed<'a>(
		&'a self,
		cfg: &'a EmbeddingProviderConfig,
		texts: &'a [String],
	) -> BoxFuture<'a, Result<Vec<Vec<f32>>>>;
}

/// Nearest-neighbour document retrieval port. May return an empty sequence;
/// index availability is decided at startup, not per call.
pub trait DocumentRetriever
where
	Self: Send + Sync,
{
	fn search<'a>(&'a self, query: &'a str) -> BoxFuture<'a, Result<Vec<Document>>>;
}

#[derive(Debug, Clone, PartialEq)]
pub struct SearchHit {
	pub content: String,
	pub url: String,
}

/// Live web search port, used only on the fallback branch.
pub trait WebSearchProvider
where
	Self: Send + Sync,
{
	fn search<'a>(
		&'a self,
		cfg: &'a WebSearchProviderConfig,
		query: &'a str,
		limit: u32,
	) -> BoxFuture<'a, Result<Vec<SearchHit>>>;
}

/// Relevance grading over a document batch. Implementations must return one
/// verdict per input document, in input order, so the filtered set stays
/// deterministic regardless of how the calls are scheduled.
pub trait DocumentGrader
where
	Self: Send + Sync,
{
	fn grade<'a>(
		&'a self,
		chat: &'a dyn ChatProvider,
		cfg: &'a ChatProviderConfig,
		question: &'a str,
		documents: &'a [Document],
	) -> BoxFuture<'a, Result<Vec<bool>>>;
}

#[derive(Clone)]
pub struct Providers {
	pub chat: Arc<dyn ChatProvider>,
	pub web_search: Arc<dyn WebSearchProvider>,
	pub grader: Arc<dyn DocumentGrader>,
}
impl Providers {
	pub fn new(chat: Arc<dyn ChatProvider>, web_search: Arc<dyn WebSearchProvider>) -> Self {
		Self { chat, web_search, grader: Arc::new(SequentialGrader) }
	}

	pub fn with_grader(mut self, grader: Arc<dyn DocumentGrader>) -> Self {
		self.grader = grader;
		self
	}
}

/// The pipeline controller. Capability clients are shared by reference across
/// concurrent runs; each run owns its own [`PipelineState`].
pub struct PawAgent {
	pub cfg: Config,
	pub providers: Providers,
	pub retriever: Option<Arc<dyn DocumentRetriever>>,
}
impl PawAgent {
	pub fn new(
		cfg: Config,
		providers: Providers,
		retriever: Option<Arc<dyn DocumentRetriever>>,
	) -> Self {
		Self { cfg, providers, retriever }
	}
}

pub(crate) fn score_schema(name: &str, description: &str) -> Value {
	json!({
		"name": name,
		"description": description,
		"parameters": {
			"type": "object",
			"properties": {
				"score": {
					"type": "string",
					"enum": ["yes", "no"],
					"description": "Binary verdict."
				}
			},
			"required": ["score"]
		}
	})
}

pub(crate) fn parse_score(response: &Value) -> Result<bool> {
	let score = response.get("score").and_then(Value::as_str).ok_or_else(|| {
		Error::InvalidResponse { message: "Response is missing the score field.".to_string() }
	})?;

	match score.to_ascii_lowercase().as_str() {
		"yes" => Ok(true),
		"no" => Ok(false),
		other => Err(Error::InvalidResponse {
			message: format!("Score must be yes or no, got {other:?}."),
		}),
	}
}

/// Truncated question text for log lines.
pub(crate) fn preview(text: &str) -> String {
	const MAX_CHARS: usize = 50;

	if text.chars().count() <= MAX_CHARS {
		text.to_string()
	} else {
		text.chars().take(MAX_CHARS).collect()
	}
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn parse_score_accepts_yes_and_no_case_insensitively() {
		assert!(parse_score(&json!({ "score": "Yes" })).expect("parse failed"));
		assert!(!parse_score(&json!({ "score": "no" })).expect("parse failed"));
	}

	#[test]
	fn parse_score_rejects_missing_or_unknown_values() {
		assert!(parse_score(&json!({})).is_err());
		assert!(parse_score(&json!({ "score": "maybe" })).is_err());
		assert!(parse_score(&json!({ "score": 1 })).is_err());
	}

	#[test]
	fn preview_truncates_on_character_boundaries() {
		let short = "short question";
		let long = "x".repeat(80);

		assert_eq!(preview(short), short);
		assert_eq!(preview(&long).chars().count(), 50);
	}
}
