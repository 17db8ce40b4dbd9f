//! Relevance grading: every retrieved document is judged against the
//! question, irrelevant ones are dropped, and an empty survivor set flips the
//! pipeline onto the web-search branch.

use serde_json::json;

use crate::{
	BoxFuture, ChatProvider, Document, DocumentGrader, Error, PawAgent, PipelineState, Result,
	StateUpdate, parse_score, score_schema,
};
use paw_config::ChatProviderConfig;

const SYSTEM_PROMPT: &str = "You are a grader assessing the relevance of a retrieved document \
	to a user question. If the document contains keywords or meaning related to the question, \
	grade it as relevant. The goal is to filter out clearly erroneous retrievals, \
	so the test does not need to be stringent. Answer yes or no.";

/// Default grader: one structured call per document, strictly in input order.
pub struct SequentialGrader;
impl DocumentGrader for SequentialGrader {
	fn grade<'a>(
		&'a self,
		chat: &'a dyn ChatProvider,
		cfg: &'a ChatProviderConfig,
		question: &'a str,
		documents: &'a [Document],
	) -> BoxFuture<'a, Result<Vec<bool>>> {
		Box::pin(async move {
			let schema = score_schema(
				"grade_document",
				"Report whether the document is relevant to the question.",
			);
			let mut verdicts = Vec::with_capacity(documents.len());

			for document in documents {
				let messages = [
					json!({ "role": "system", "content": SYSTEM_PROMPT }),
					json!({
						"role": "user",
						"content": format!(
							"Retrieved document:\n{}\n\nUser question: {question}",
							document.content
						)
					}),
				];
				let response = chat.complete_structured(cfg, &messages, &schema).await?;

				verdicts.push(parse_score(&response)?);
			}

			Ok(verdicts)
		})
	}
}

pub(crate) async fn run(agent: &PawAgent, state: &PipelineState) -> Result<StateUpdate> {
	let verdicts = agent
		.providers
		.grader
		.grade(
			agent.providers.chat.as_ref(),
			&agent.cfg.providers.chat,
			&state.question,
			&state.documents,
		)
		.await?;

	if verdicts.len() != state.documents.len() {
		return Err(Error::InvalidResponse {
			message: format!(
				"Grader returned {} verdicts for {} documents.",
				verdicts.len(),
				state.documents.len()
			),
		});
	}

	let documents = state
		.documents
		.iter()
		.zip(&verdicts)
		.filter(|(_, keep)| **keep)
		.map(|(document, _)| document.clone())
		.collect::<Vec<_>>();
	let web_search_needed = documents.is_empty();

	tracing::debug!(
		kept = documents.len(),
		graded = verdicts.len(),
		web_search_needed,
		"Document grading complete."
	);

	Ok(StateUpdate {
		documents: Some(documents),
		web_search_needed: Some(web_search_needed),
		..Default::default()
	})
}
