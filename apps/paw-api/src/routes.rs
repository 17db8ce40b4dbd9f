use axum::extract::State;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::routing::{get, post};
use axum::{Json, Router};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::state::AppState;

pub fn router(state: AppState) -> Router {
	Router::new()
		.route("/health", get(health))
		.route("/v1/chat", post(chat))
		.with_state(state)
}

async fn health() -> StatusCode {
	StatusCode::OK
}

#[derive(Debug, Deserialize)]
pub struct ChatRequest {
	pub question: String,
}

#[derive(Debug, Serialize)]
pub struct ChatResponse {
	pub run_id: Uuid,
	pub answer: String,
	pub nodes_visited: Vec<String>,
}

async fn chat(
	State(state): State<AppState>,
	Json(payload): Json<ChatRequest>,
) -> Result<Json<ChatResponse>, ApiError> {
	if payload.question.trim().is_empty() {
		return Err(json_error(
			StatusCode::UNPROCESSABLE_ENTITY,
			"empty_question",
			"question must be non-empty.",
		));
	}

	let run = state.agent.run(&payload.question).await?;
	let answer = run
		.answer()
		.map(str::trim)
		.filter(|answer| !answer.is_empty())
		.ok_or_else(|| {
			json_error(
				StatusCode::INTERNAL_SERVER_ERROR,
				"no_answer",
				"The run finished without producing an answer.",
			)
		})?
		.to_string();
	let nodes_visited =
		run.nodes_visited.iter().map(|visit| visit.node.as_str().to_string()).collect();

	Ok(Json(ChatResponse { run_id: run.run_id, answer, nodes_visited }))
}

#[derive(Debug, Serialize)]
struct ErrorBody {
	error_code: String,
	message: String,
}

#[derive(Debug)]
pub struct ApiError {
	status: StatusCode,
	error_code: String,
	message: String,
}

pub fn json_error(status: StatusCode, code: &str, message: impl Into<String>) -> ApiError {
	ApiError { status, error_code: code.to_string(), message: message.into() }
}

impl From<paw_agent::Error> for ApiError {
	fn from(err: paw_agent::Error) -> Self {
		json_error(StatusCode::BAD_GATEWAY, "upstream_failure", err.to_string())
	}
}

impl IntoResponse for ApiError {
	fn into_response(self) -> Response {
		let body = ErrorBody { error_code: self.error_code, message: self.message };

		(self.status, Json(body)).into_response()
	}
}
