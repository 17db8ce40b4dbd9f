//! HTTP-backed implementations of the agent's capability ports: chat
//! completions, text embeddings, and web search, all against bearer-token
//! JSON APIs.

pub mod chat;
pub mod embedding;
pub mod websearch;

mod error;

pub use error::{Error, Result};

use reqwest::header::{AUTHORIZATION, HeaderMap, HeaderName};
use serde_json::{Map, Value};

use paw_agent::{BoxFuture, ChatProvider, EmbeddingProvider, SearchHit, WebSearchProvider};
use paw_config::{ChatProviderConfig, EmbeddingProviderConfig, WebSearchProviderConfig};

pub fn auth_headers(api_key: &str, default_headers: &Map<String, Value>) -> Result<HeaderMap> {
	let mut headers = HeaderMap::new();

	headers.insert(AUTHORIZATION, format!("Bearer {api_key}").parse()?);

	for (key, value) in default_headers {
		let Some(raw) = value.as_str() else {
			return Err(Error::InvalidConfig {
				message: "Default header values must be strings.".to_string(),
			});
		};

		headers.insert(HeaderName::from_bytes(key.as_bytes())?, raw.parse()?);
	}

	Ok(headers)
}

/// The production provider bundle. Stateless; per-request clients carry the
/// configured timeouts.
pub struct HttpProviders;
impl ChatProvider for HttpProviders {
	fn complete<'a>(
		&'a self,
		cfg: &'a ChatProviderConfig,
		messages: &'a [Value],
	) -> BoxFuture<'a, paw_agent::Result<String>> {
		Box::pin(async move { chat::complete(cfg, messages).await.map_err(Into::into) })
	}

	fn complete_structured<'a>(
		&'a self,
		cfg: &'a ChatProviderConfig,
		messages: &'a [Value],
		schema: &'a Value,
	) -> BoxFuture<'a, paw_agent::Result<Value>> {
		Box::pin(async move {
			chat::complete_structured(cfg, messages, schema).await.map_err(Into::into)
		})
	}
}
impl EmbeddingProvider for HttpProviders {
	fn embed<'a>(
		&'a self,
		cfg: &'a EmbeddingProviderConfig,
		texts: &'a [String],
	) -> BoxFuture<'a, paw_agent::Result<Vec<Vec<f32>>>> {
		Box::pin(async move { embedding::embed(cfg, texts).await.map_err(Into::into) })
	}
}
impl WebSearchProvider for HttpProviders {
	fn search<'a>(
		&'a self,
		cfg: &'a WebSearchProviderConfig,
		query: &'a str,
		limit: u32,
	) -> BoxFuture<'a, paw_agent::Result<Vec<SearchHit>>> {
		Box::pin(async move { websearch::search(cfg, query, limit).await.map_err(Into::into) })
	}
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn auth_headers_carry_the_bearer_token_and_defaults() {
		let mut defaults = Map::new();

		defaults.insert("x-title".to_string(), Value::String("paw".to_string()));

		let headers = auth_headers("secret", &defaults).expect("header build failed");

		assert_eq!(headers[AUTHORIZATION.as_str()], "Bearer secret");
		assert_eq!(headers["x-title"], "paw");
	}

	#[test]
	fn non_string_default_headers_are_rejected() {
		let mut defaults = Map::new();

		defaults.insert("x-count".to_string(), Value::from(3));

		assert!(matches!(
			auth_headers("secret", &defaults),
			Err(Error::InvalidConfig { .. })
		));
	}
}
