//! Entry node: binary topic gate. Off-topic questions short-circuit the whole
//! pipeline with a fixed refusal.

use serde_json::json;

use crate::{PawAgent, PipelineState, Result, StateUpdate, parse_score, preview, score_schema};

pub const REFUSAL_MESSAGE: &str =
	"I specialize only in pet care and animal-related questions. I cannot assist with other topics.";

const SYSTEM_PROMPT: &str = "You are a strict topic classifier for a pet care assistant. \
	Decide whether the user question is about pet care, animal health, animal behavior, \
	animal nutrition, or any other animal-related subject. \
	Answer yes if it is, no otherwise.";

pub(crate) async fn run(agent: &PawAgent, state: &PipelineState) -> Result<StateUpdate> {
	let cfg = &agent.cfg.providers.chat;
	let schema = score_schema(
		"grade_topic",
		"Report whether the question is about pet care or animals.",
	);
	let messages = [
		json!({ "role": "system", "content": SYSTEM_PROMPT }),
		json!({ "role": "user", "content": state.question }),
	];
	let response = agent.providers.chat.complete_structured(cfg, &messages, &schema).await?;
	let is_relevant = parse_score(&response)?;

	tracing::debug!(is_relevant, question = %preview(&state.question), "Topic check complete.");

	if is_relevant {
		Ok(StateUpdate { is_relevant: Some(true), ..Default::default() })
	} else {
		Ok(StateUpdate {
			is_relevant: Some(false),
			generation: Some(REFUSAL_MESSAGE.to_string()),
			..Default::default()
		})
	}
}
