use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// A retrieved or synthesized passage. Metadata is an opaque pass-through for
/// the pipeline; only ingestion and retrieval assign meaning to its keys.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Document {
	pub content: String,
	#[serde(default)]
	pub metadata: Map<String, Value>,
}
impl Document {
	pub fn new(content: impl Into<String>) -> Self {
		Self { content: content.into(), metadata: Map::new() }
	}

	pub fn with_metadata(content: impl Into<String>, metadata: Map<String, Value>) -> Self {
		Self { content: content.into(), metadata }
	}
}

/// The single record threaded through every pipeline node. One instance per
/// run; nodes never see each other directly, only this state.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PipelineState {
	/// The question being answered. Overwritten by the query-rewrite node, so
	/// later nodes see the rewritten text.
	pub question: String,
	/// Working document set: replaced by retrieval, filtered by grading,
	/// replaced again by web search.
	pub documents: Vec<Document>,
	/// The final answer. `None` until the generate node (or the early-exit
	/// topic rejection) sets it.
	pub generation: Option<String>,
	/// Set by grading, consumed by the branch predicate after grading.
	pub web_search_needed: bool,
	/// Set by topic classification, consumed by the branch predicate after it.
	pub is_relevant: bool,
}
impl PipelineState {
	pub fn new(question: impl Into<String>) -> Self {
		Self {
			question: question.into(),
			documents: Vec::new(),
			generation: None,
			web_search_needed: false,
			is_relevant: false,
		}
	}

	/// Merges a partial node output into the state. Explicit per-field
	/// assignment, last writer wins, untouched fields are never clobbered.
	pub fn apply(&mut self, update: StateUpdate) {
		if let Some(question) = update.question {
			self.question = question;
		}
		if let Some(documents) = update.documents {
			self.documents = documents;
		}
		if let Some(generation) = update.generation {
			self.generation = Some(generation);
		}
		if let Some(web_search_needed) = update.web_search_needed {
			self.web_search_needed = web_search_needed;
		}
		if let Some(is_relevant) = update.is_relevant {
			self.is_relevant = is_relevant;
		}
	}
}

/// A partial state written by one node: `Some` only for the fields the node
/// actually changed.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct StateUpdate {
	pub question: Option<String>,
	pub documents: Option<Vec<Document>>,
	pub generation: Option<String>,
	pub web_search_needed: Option<bool>,
	pub is_relevant: Option<bool>,
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn partial_update_keeps_untouched_fields() {
		let mut state = PipelineState::new("How often should I feed a kitten?");

		state.apply(StateUpdate {
			documents: Some(vec![Document::new("Kittens eat small meals.")]),
			..Default::default()
		});
		state.apply(StateUpdate { web_search_needed: Some(false), ..Default::default() });

		assert_eq!(state.question, "How often should I feed a kitten?");
		assert_eq!(state.documents.len(), 1);
		assert_eq!(state.generation, None);
		assert!(!state.web_search_needed);
	}

	#[test]
	fn later_writer_wins_per_field() {
		let mut state = PipelineState::new("original");

		state.apply(StateUpdate { question: Some("rewritten".to_string()), ..Default::default() });
		state.apply(StateUpdate {
			documents: Some(vec![Document::new("web result")]),
			..Default::default()
		});

		assert_eq!(state.question, "rewritten");
		assert_eq!(state.documents[0].content, "web result");
	}

	#[test]
	fn empty_update_is_a_no_op() {
		let mut state = PipelineState::new("q");

		state.apply(StateUpdate {
			generation: Some("an answer".to_string()),
			..Default::default()
		});
		state.apply(StateUpdate::default());

		assert_eq!(state.generation.as_deref(), Some("an answer"));
	}
}
