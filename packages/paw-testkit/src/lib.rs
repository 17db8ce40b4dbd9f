//! Provider doubles and a canned configuration for pipeline tests. Everything
//! here is deterministic and offline; no test using this crate touches the
//! network.

use std::{
	collections::VecDeque,
	sync::{
		Mutex,
		atomic::{AtomicUsize, Ordering},
	},
};

use serde_json::Value;

use paw_agent::{
	BoxFuture, ChatProvider, Document, DocumentRetriever, EmbeddingProvider, Error, Result,
	SearchHit, WebSearchProvider,
};
use paw_config::{
	ChatProviderConfig, Config, EmbeddingProviderConfig, Ingest, Providers, Qdrant, Retrieval,
	Service, Storage, WebSearchProviderConfig,
};

/// A chat double that replays scripted responses in order. Structured and
/// plain completions draw from separate queues; running a queue dry is a
/// provider error, which keeps over-consuming tests loud.
pub struct ScriptedChat {
	structured: Mutex<VecDeque<Value>>,
	completions: Mutex<VecDeque<String>>,
	pub structured_calls: AtomicUsize,
	pub completion_calls: AtomicUsize,
}
impl ScriptedChat {
	pub fn new(
		structured: impl IntoIterator<Item = Value>,
		completions: impl IntoIterator<Item = &'static str>,
	) -> Self {
		Self {
			structured: Mutex::new(structured.into_iter().collect()),
			completions: Mutex::new(
				completions.into_iter().map(ToString::to_string).collect(),
			),
			structured_calls: AtomicUsize::new(0),
			completion_calls: AtomicUsize::new(0),
		}
	}
}
impl ChatProvider for ScriptedChat {
	fn complete<'a>(
		&'a self,
		_: &'a ChatProviderConfig,
		_: &'a [Value],
	) -> BoxFuture<'a, Result<String>> {
		self.completion_calls.fetch_add(1, Ordering::SeqCst);

		let next = self
			.completions
			.lock()
			.unwrap_or_else(|err| err.into_inner())
			.pop_front();

		Box::pin(async move {
			next.ok_or_else(|| Error::Provider {
				message: "Scripted chat ran out of completions.".to_string(),
			})
		})
	}

	fn complete_structured<'a>(
		&'a self,
		_: &'a ChatProviderConfig,
		_: &'a [Value],
		_: &'a Value,
	) -> BoxFuture<'a, Result<Value>> {
		self.structured_calls.fetch_add(1, Ordering::SeqCst);

		let next = self
			.structured
			.lock()
			.unwrap_or_else(|err| err.into_inner())
			.pop_front();

		Box::pin(async move {
			next.ok_or_else(|| Error::Provider {
				message: "Scripted chat ran out of structured responses.".to_string(),
			})
		})
	}
}

/// A chat double whose every call fails, for propagation tests.
pub struct FailingChat;
impl ChatProvider for FailingChat {
	fn complete<'a>(
		&'a self,
		_: &'a ChatProviderConfig,
		_: &'a [Value],
	) -> BoxFuture<'a, Result<String>> {
		Box::pin(async {
			Err(Error::Provider { message: "Chat provider is down.".to_string() })
		})
	}

	fn complete_structured<'a>(
		&'a self,
		_: &'a ChatProviderConfig,
		_: &'a [Value],
		_: &'a Value,
	) -> BoxFuture<'a, Result<Value>> {
		Box::pin(async {
			Err(Error::Provider { message: "Chat provider is down.".to_string() })
		})
	}
}

/// Returns a constant unit-ish vector per input text.
pub struct StubEmbedding {
	pub vector_dim: usize,
}
impl EmbeddingProvider for StubEmbedding {
	fn embed<'a>(
		&'a self,
		_: &'a EmbeddingProviderConfig,
		texts: &'a [String],
	) -> BoxFuture<'a, Result<Vec<Vec<f32>>>> {
		let vectors = vec![vec![0.1; self.vector_dim]; texts.len()];

		Box::pin(async move { Ok(vectors) })
	}
}

/// Serves a fixed document set and counts how often it was asked.
pub struct SpyRetriever {
	pub documents: Vec<Document>,
	pub calls: AtomicUsize,
}
impl SpyRetriever {
	pub fn new(documents: Vec<Document>) -> Self {
		Self { documents, calls: AtomicUsize::new(0) }
	}
}
impl DocumentRetriever for SpyRetriever {
	fn search<'a>(&'a self, _: &'a str) -> BoxFuture<'a, Result<Vec<Document>>> {
		self.calls.fetch_add(1, Ordering::SeqCst);

		let documents = self.documents.clone();

		Box::pin(async move { Ok(documents) })
	}
}

/// Serves fixed web hits, counting calls and remembering the last query.
pub struct StubWebSearch {
	pub hits: Vec<SearchHit>,
	pub calls: AtomicUsize,
	pub last_query: Mutex<Option<String>>,
}
impl StubWebSearch {
	pub fn new(hits: Vec<SearchHit>) -> Self {
		Self { hits, calls: AtomicUsize::new(0), last_query: Mutex::new(None) }
	}
}
impl WebSearchProvider for StubWebSearch {
	fn search<'a>(
		&'a self,
		_: &'a WebSearchProviderConfig,
		query: &'a str,
		_: u32,
	) -> BoxFuture<'a, Result<Vec<SearchHit>>> {
		self.calls.fetch_add(1, Ordering::SeqCst);
		*self.last_query.lock().unwrap_or_else(|err| err.into_inner()) =
			Some(query.to_string());

		let hits = self.hits.clone();

		Box::pin(async move { Ok(hits) })
	}
}

/// A fully valid configuration pointing at unroutable endpoints. Tests that
/// accidentally reach a real provider fail fast on connection.
pub fn config() -> Config {
	Config {
		service: Service {
			http_bind: "127.0.0.1:0".to_string(),
			log_level: "debug".to_string(),
			bind_localhost_only: true,
		},
		storage: Storage {
			qdrant: Some(Qdrant {
				url: "http://127.0.0.1:1".to_string(),
				collection: "pet_care_test".to_string(),
				vector_dim: 4,
			}),
		},
		providers: Providers {
			embedding: EmbeddingProviderConfig {
				provider_id: "test".to_string(),
				api_base: "http://127.0.0.1:1".to_string(),
				api_key: "test-key".to_string(),
				path: "/v1/embeddings".to_string(),
				model: "test-embed".to_string(),
				dimensions: 4,
				timeout_ms: 1_000,
				default_headers: serde_json::Map::new(),
			},
			chat: ChatProviderConfig {
				provider_id: "test".to_string(),
				api_base: "http://127.0.0.1:1".to_string(),
				api_key: "test-key".to_string(),
				path: "/v1/chat/completions".to_string(),
				model: "test-chat".to_string(),
				temperature: 0.0,
				timeout_ms: 1_000,
				default_headers: serde_json::Map::new(),
			},
			web_search: WebSearchProviderConfig {
				provider_id: "test".to_string(),
				api_base: "http://127.0.0.1:1".to_string(),
				api_key: "test-key".to_string(),
				path: "/search".to_string(),
				max_results: 3,
				timeout_ms: 1_000,
				default_headers: serde_json::Map::new(),
			},
		},
		retrieval: Retrieval { top_k: 4 },
		ingest: Ingest { chunk_chars: 1_000, overlap_chars: 150 },
	}
}
