//! Query rewriting for the web-search branch. The model answers with the
//! finished search query text, and the rewritten form overwrites the question
//! in place, so both the search call and the final generation prompt see it.

use serde_json::json;

use crate::{PawAgent, PipelineState, Result, StateUpdate, preview};

const SYSTEM_PROMPT: &str = "You are rewriting a user question into a web search query. \
	Produce one to three short, keyword-focused queries joined by \" OR \". \
	Return only the query text. Do not answer the question.";

pub(crate) async fn run(agent: &PawAgent, state: &PipelineState) -> Result<StateUpdate> {
	let cfg = &agent.cfg.providers.chat;
	let messages = [
		json!({ "role": "system", "content": SYSTEM_PROMPT }),
		json!({ "role": "user", "content": state.question }),
	];
	let question = agent.providers.chat.complete(cfg, &messages).await?.trim().to_string();

	tracing::debug!(question = %preview(&question), "Query rewritten.");

	Ok(StateUpdate { question: Some(question), ..Default::default() })
}
