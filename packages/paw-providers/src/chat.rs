//! OpenAI-compatible chat completions. Structured output rides on tool
//! calling: the schema goes out as the only tool, and the arguments of the
//! first tool call come back as the structured value.

use std::time::Duration;

use reqwest::Client;
use serde_json::Value;

use crate::{Error, Result};
use paw_config::ChatProviderConfig;

pub async fn complete(cfg: &ChatProviderConfig, messages: &[Value]) -> Result<String> {
	let body = serde_json::json!({
		"model": cfg.model,
		"temperature": cfg.temperature,
		"messages": messages,
	});
	let json = request(cfg, &body).await?;

	parse_completion_response(&json)
}

pub async fn complete_structured(
	cfg: &ChatProviderConfig,
	messages: &[Value],
	schema: &Value,
) -> Result<Value> {
	let body = serde_json::json!({
		"model": cfg.model,
		"temperature": cfg.temperature,
		"messages": messages,
		"tools": [{ "type": "function", "function": schema }],
		"tool_choice": "any",
	});
	let json = request(cfg, &body).await?;

	parse_structured_response(&json)
}

async fn request(cfg: &ChatProviderConfig, body: &Value) -> Result<Value> {
	let client = Client::builder().timeout(Duration::from_millis(cfg.timeout_ms)).build()?;
	let url = format!("{}{}", cfg.api_base, cfg.path);
	let res = client
		.post(url)
		.headers(crate::auth_headers(&cfg.api_key, &cfg.default_headers)?)
		.json(body)
		.send()
		.await?;

	Ok(res.error_for_status()?.json().await?)
}

fn parse_completion_response(json: &Value) -> Result<String> {
	json.pointer("/choices/0/message/content")
		.and_then(Value::as_str)
		.map(ToString::to_string)
		.ok_or_else(|| Error::InvalidResponse {
			message: "Chat response is missing message content.".to_string(),
		})
}

fn parse_structured_response(json: &Value) -> Result<Value> {
	if let Some(arguments) = json.pointer("/choices/0/message/tool_calls/0/function/arguments") {
		return match arguments {
			Value::String(raw) => serde_json::from_str(raw).map_err(|err| {
				Error::InvalidResponse {
					message: format!("Tool call arguments are not valid JSON: {err}."),
				}
			}),
			Value::Object(_) => Ok(arguments.clone()),
			_ => Err(Error::InvalidResponse {
				message: "Tool call arguments must be a JSON object or string.".to_string(),
			}),
		};
	}

	// Some providers answer with plain JSON content instead of a tool call.
	if let Some(content) = json.pointer("/choices/0/message/content").and_then(Value::as_str) {
		return serde_json::from_str(content).map_err(|err| Error::InvalidResponse {
			message: format!("Chat content is not valid JSON: {err}."),
		});
	}

	Err(Error::InvalidResponse {
		message: "Chat response has neither a tool call nor JSON content.".to_string(),
	})
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn parses_plain_completion_content() {
		let json = serde_json::json!({
			"choices": [{ "message": { "content": "Feed twice daily." } }]
		});

		assert_eq!(parse_completion_response(&json).expect("parse failed"), "Feed twice daily.");
	}

	#[test]
	fn parses_tool_call_arguments_from_string() {
		let json = serde_json::json!({
			"choices": [{
				"message": {
					"tool_calls": [{
						"function": { "name": "grade_topic", "arguments": "{\"score\":\"yes\"}" }
					}]
				}
			}]
		});
		let parsed = parse_structured_response(&json).expect("parse failed");

		assert_eq!(parsed, serde_json::json!({ "score": "yes" }));
	}

	#[test]
	fn falls_back_to_json_content_without_tool_calls() {
		let json = serde_json::json!({
			"choices": [{ "message": { "content": "{\"score\":\"no\"}" } }]
		});
		let parsed = parse_structured_response(&json).expect("parse failed");

		assert_eq!(parsed, serde_json::json!({ "score": "no" }));
	}

	#[test]
	fn rejects_non_json_content() {
		let json = serde_json::json!({
			"choices": [{ "message": { "content": "yes" } }]
		});

		assert!(matches!(
			parse_structured_response(&json),
			Err(Error::InvalidResponse { .. })
		));
	}
}
