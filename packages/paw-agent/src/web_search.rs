//! Live web search fallback. All hits are merged into one synthetic document
//! so the generation prompt sees a single context block, with the source URLs
//! kept in metadata.

use serde_json::{Map, json};

use crate::{Document, PawAgent, PipelineState, Result, SearchHit, StateUpdate};

pub(crate) fn merge_hits(hits: &[SearchHit]) -> Document {
	let content = hits.iter().map(|hit| hit.content.as_str()).collect::<Vec<_>>().join("\n");
	let urls = hits.iter().map(|hit| hit.url.as_str()).collect::<Vec<_>>();
	let mut metadata = Map::new();

	metadata.insert("source".to_string(), json!("web_search"));
	metadata.insert("urls".to_string(), json!(urls));

	Document::with_metadata(content, metadata)
}

pub(crate) async fn run(agent: &PawAgent, state: &PipelineState) -> Result<StateUpdate> {
	let cfg = &agent.cfg.providers.web_search;
	let hits = agent.providers.web_search.search(cfg, &state.question, cfg.max_results).await?;

	if hits.is_empty() {
		tracing::warn!("Web search returned no results; the synthetic document is empty.");
	}

	tracing::debug!(hits = hits.len(), "Web search complete.");

	// Generation always sees exactly one web document, even when it is empty.
	Ok(StateUpdate { documents: Some(vec![merge_hits(&hits)]), ..Default::default() })
}
