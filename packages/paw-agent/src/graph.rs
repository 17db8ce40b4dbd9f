//! The transition table and the run loop. Routing is a pure function of the
//! current node and the state, so every path through the pipeline can be
//! checked without any provider in the loop.

use std::time::{Duration, Instant};

use serde::Serialize;
use uuid::Uuid;

use crate::{
	Error, PawAgent, PipelineState, Result, StateUpdate, check_topic, generate, grade_documents,
	preview, retrieve, transform_query, web_search,
};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Node {
	CheckTopic,
	Retrieve,
	GradeDocuments,
	TransformQuery,
	WebSearch,
	Generate,
}
impl Node {
	pub const fn as_str(self) -> &'static str {
		match self {
			Self::CheckTopic => "check_topic",
			Self::Retrieve => "retrieve",
			Self::GradeDocuments => "grade_documents",
			Self::TransformQuery => "transform_query",
			Self::WebSearch => "web_search",
			Self::Generate => "generate",
		}
	}
}
impl std::fmt::Display for Node {
	fn fmt(&self, f: &mut std::fmt::Formatter) -> std::fmt::Result {
		f.write_str(self.as_str())
	}
}

/// How a run ended. Off-topic runs carry the refusal text in
/// `state.generation`, so callers can treat both outcomes uniformly.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Outcome {
	Answered,
	OffTopic,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Transition {
	To(Node),
	End(Outcome),
}

/// The whole control-flow graph in one match. Only two edges are
/// conditional; everything else is a straight line.
pub fn next_node(node: Node, state: &PipelineState) -> Transition {
	match node {
		Node::CheckTopic =>
			if state.is_relevant {
				Transition::To(Node::Retrieve)
			} else {
				Transition::End(Outcome::OffTopic)
			},
		Node::Retrieve => Transition::To(Node::GradeDocuments),
		Node::GradeDocuments =>
			if state.web_search_needed {
				Transition::To(Node::TransformQuery)
			} else {
				Transition::To(Node::Generate)
			},
		Node::TransformQuery => Transition::To(Node::WebSearch),
		Node::WebSearch => Transition::To(Node::Generate),
		Node::Generate => Transition::End(Outcome::Answered),
	}
}

#[derive(Debug, Clone, Copy)]
pub struct NodeVisit {
	pub node: Node,
	pub elapsed: Duration,
}

/// A completed run: the final state plus the path the run took.
#[derive(Debug)]
pub struct PipelineRun {
	pub run_id: Uuid,
	pub outcome: Outcome,
	pub nodes_visited: Vec<NodeVisit>,
	pub state: PipelineState,
}
impl PipelineRun {
	pub fn answer(&self) -> Option<&str> {
		self.state.generation.as_deref()
	}
}

#[derive(Debug, Clone, Copy, Default)]
pub struct RunOptions {
	/// Checked before each node starts. A node already in flight is never
	/// interrupted; cancellation mid-node is dropping the run future.
	pub deadline: Option<Instant>,
}

impl PawAgent {
	pub async fn run(&self, question: &str) -> Result<PipelineRun> {
		self.run_with(question, RunOptions::default(), |_, _| {}).await
	}

	pub async fn run_with(
		&self,
		question: &str,
		options: RunOptions,
		mut on_visit: impl FnMut(Node, &PipelineState),
	) -> Result<PipelineRun> {
		let run_id = Uuid::new_v4();
		let mut state = PipelineState::new(question);
		let mut nodes_visited = Vec::new();
		let mut node = Node::CheckTopic;

		tracing::info!(%run_id, question = %preview(question), "Pipeline run started.");

		let outcome = loop {
			if options.deadline.is_some_and(|deadline| Instant::now() >= deadline) {
				return Err(Error::DeadlineExceeded { node: node.as_str() });
			}

			let started = Instant::now();
			let update = self.step(node, &state).await?;

			state.apply(update);
			on_visit(node, &state);
			nodes_visited.push(NodeVisit { node, elapsed: started.elapsed() });

			match next_node(node, &state) {
				Transition::To(next) => node = next,
				Transition::End(outcome) => break outcome,
			}
		};

		tracing::info!(%run_id, ?outcome, nodes = nodes_visited.len(), "Pipeline run finished.");

		Ok(PipelineRun { run_id, outcome, nodes_visited, state })
	}

	async fn step(&self, node: Node, state: &PipelineState) -> Result<StateUpdate> {
		match node {
			Node::CheckTopic => check_topic::run(self, state).await,
			Node::Retrieve => retrieve::run(self, state).await,
			Node::GradeDocuments => grade_documents::run(self, state).await,
			Node::TransformQuery => transform_query::run(self, state).await,
			Node::WebSearch => web_search::run(self, state).await,
			Node::Generate => generate::run(self, state).await,
		}
	}
}

#[cfg(test)]
mod tests {
	use super::*;

	fn state_with(is_relevant: bool, web_search_needed: bool) -> PipelineState {
		let mut state = PipelineState::new("q");

		state.is_relevant = is_relevant;
		state.web_search_needed = web_search_needed;

		state
	}

	#[test]
	fn off_topic_questions_end_immediately() {
		assert_eq!(
			next_node(Node::CheckTopic, &state_with(false, false)),
			Transition::End(Outcome::OffTopic)
		);
	}

	#[test]
	fn relevant_questions_proceed_to_retrieval() {
		assert_eq!(
			next_node(Node::CheckTopic, &state_with(true, false)),
			Transition::To(Node::Retrieve)
		);
	}

	#[test]
	fn grading_branches_on_web_search_needed() {
		assert_eq!(
			next_node(Node::GradeDocuments, &state_with(true, true)),
			Transition::To(Node::TransformQuery)
		);
		assert_eq!(
			next_node(Node::GradeDocuments, &state_with(true, false)),
			Transition::To(Node::Generate)
		);
	}

	#[test]
	fn generate_is_always_terminal() {
		assert_eq!(
			next_node(Node::Generate, &state_with(true, true)),
			Transition::End(Outcome::Answered)
		);
	}
}
