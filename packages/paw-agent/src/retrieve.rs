//! Nearest-neighbour retrieval from the local document index. Without an
//! index the node degrades to an empty document set and lets grading route
//! the run to web search.

use crate::{PawAgent, PipelineState, Result, StateUpdate};

pub(crate) async fn run(agent: &PawAgent, state: &PipelineState) -> Result<StateUpdate> {
	let Some(retriever) = agent.retriever.as_deref() else {
		tracing::warn!("No document index is configured; retrieval returns nothing.");

		return Ok(StateUpdate { documents: Some(Vec::new()), ..Default::default() });
	};
	let documents = retriever.search(&state.question).await?;

	tracing::debug!(count = documents.len(), "Retrieved documents.");

	Ok(StateUpdate { documents: Some(documents), ..Default::default() })
}
