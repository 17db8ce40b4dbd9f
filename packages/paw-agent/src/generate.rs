//! Final answer generation, grounded in whatever documents survived the run.

use serde_json::json;

use crate::{PawAgent, PipelineState, Result, StateUpdate};

const SYSTEM_PROMPT: &str = "You are an assistant for pet care question-answering tasks. \
	Use the retrieved context to answer the question. \
	If the context does not contain the answer, say that you do not know. \
	Keep the answer concise.";

pub(crate) async fn run(agent: &PawAgent, state: &PipelineState) -> Result<StateUpdate> {
	let cfg = &agent.cfg.providers.chat;
	let context =
		state.documents.iter().map(|document| document.content.as_str()).collect::<Vec<_>>().join("\n\n");
	let messages = [
		json!({ "role": "system", "content": SYSTEM_PROMPT }),
		json!({
			"role": "user",
			"content": format!("Context:\n{context}\n\nQuestion: {}", state.question)
		}),
	];
	let generation = agent.providers.chat.complete(cfg, &messages).await?;

	tracing::debug!(chars = generation.len(), "Answer generated.");

	Ok(StateUpdate { generation: Some(generation), ..Default::default() })
}
