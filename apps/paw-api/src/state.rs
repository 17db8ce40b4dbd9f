use std::sync::Arc;

use paw_agent::{DocumentRetriever, PawAgent, Providers};
use paw_providers::HttpProviders;
use paw_retrieval::QdrantIndex;

#[derive(Clone)]
pub struct AppState {
	pub agent: Arc<PawAgent>,
}
impl AppState {
	pub fn new(config: paw_config::Config) -> color_eyre::Result<Self> {
		let http = Arc::new(HttpProviders);
		let providers = Providers::new(http.clone(), http.clone());
		let retriever = match config.storage.qdrant.as_ref() {
			Some(qdrant) => {
				let index = QdrantIndex::new(
					qdrant,
					http,
					config.providers.embedding.clone(),
					config.retrieval.top_k,
				)?;

				Some(Arc::new(index) as Arc<dyn DocumentRetriever>)
			},
			None => {
				tracing::warn!("No vector index configured; running without local retrieval.");

				None
			},
		};

		Ok(Self { agent: Arc::new(PawAgent::new(config, providers, retriever)) })
	}

	pub fn with_agent(agent: PawAgent) -> Self {
		Self { agent: Arc::new(agent) }
	}
}
