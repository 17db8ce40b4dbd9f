//! Tavily-style web search. Hits missing content are skipped rather than
//! failing the whole search.

use std::time::Duration;

use reqwest::Client;
use serde_json::Value;

use crate::{Error, Result};
use paw_agent::SearchHit;
use paw_config::WebSearchProviderConfig;

pub async fn search(
	cfg: &WebSearchProviderConfig,
	query: &str,
	limit: u32,
) -> Result<Vec<SearchHit>> {
	let client = Client::builder().timeout(Duration::from_millis(cfg.timeout_ms)).build()?;
	let url = format!("{}{}", cfg.api_base, cfg.path);
	let body = serde_json::json!({
		"query": query,
		"max_results": limit,
	});
	let res = client
		.post(url)
		.headers(crate::auth_headers(&cfg.api_key, &cfg.default_headers)?)
		.json(&body)
		.send()
		.await?;
	let json: Value = res.error_for_status()?.json().await?;

	parse_search_response(json, limit as usize)
}

fn parse_search_response(json: Value, limit: usize) -> Result<Vec<SearchHit>> {
	let results = json.get("results").and_then(|v| v.as_array()).ok_or_else(|| {
		Error::InvalidResponse { message: "Search response is missing results array.".to_string() }
	})?;
	let hits = results
		.iter()
		.filter_map(|item| {
			let content = item.get("content").and_then(Value::as_str)?;
			let url = item.get("url").and_then(Value::as_str).unwrap_or_default();

			Some(SearchHit { content: content.to_string(), url: url.to_string() })
		})
		.take(limit)
		.collect();

	Ok(hits)
}
