pub const DOCUMENT_VECTOR_NAME: &str = "dense";
pub const CONTENT_PAYLOAD_KEY: &str = "content";
pub const METADATA_PAYLOAD_KEY: &str = "metadata";

use std::{collections::HashMap, sync::Arc};

use qdrant_client::{
	Qdrant,
	client::Payload,
	qdrant::{
		CreateCollectionBuilder, Distance, PointStruct, Query, QueryPointsBuilder, ScoredPoint,
		UpsertPointsBuilder, Value as QdrantValue, Vector, VectorParamsBuilder,
		VectorsConfigBuilder, value::Kind,
	},
};
use serde_json::{Map, Value as JsonValue};
use uuid::Uuid;

use crate::{Error, Result};
use paw_agent::{BoxFuture, Document, DocumentRetriever, EmbeddingProvider};
use paw_config::EmbeddingProviderConfig;

/// A named-vector Qdrant collection holding document chunks. Queries are
/// embedded through the injected provider, so the index and the ingest path
/// share one embedding space.
pub struct QdrantIndex {
	pub client: Qdrant,
	pub collection: String,
	pub vector_dim: u32,
	embedding: Arc<dyn EmbeddingProvider>,
	embedding_cfg: EmbeddingProviderConfig,
	top_k: u32,
}
impl QdrantIndex {
	pub fn new(
		cfg: &paw_config::Qdrant,
		embedding: Arc<dyn EmbeddingProvider>,
		embedding_cfg: EmbeddingProviderConfig,
		top_k: u32,
	) -> Result<Self> {
		let client = Qdrant::from_url(&cfg.url).build()?;

		Ok(Self {
			client,
			collection: cfg.collection.clone(),
			vector_dim: cfg.vector_dim,
			embedding,
			embedding_cfg,
			top_k,
		})
	}

	/// Drops and recreates the collection. Ingestion rebuilds from scratch;
	/// there is no incremental re-index.
	pub async fn reset_collection(&self) -> Result<()> {
		if self.client.collection_exists(&self.collection).await? {
			self.client.delete_collection(&self.collection).await?;
		}

		let mut vectors_config = VectorsConfigBuilder::default();

		vectors_config.add_named_vector_params(
			DOCUMENT_VECTOR_NAME,
			VectorParamsBuilder::new(self.vector_dim.into(), Distance::Cosine),
		);

		self.client
			.create_collection(
				CreateCollectionBuilder::new(self.collection.clone())
					.vectors_config(vectors_config),
			)
			.await?;

		tracing::info!(collection = %self.collection, vector_dim = self.vector_dim, "Collection reset.");

		Ok(())
	}

	pub async fn upsert_documents(&self, documents: &[Document]) -> Result<()> {
		if documents.is_empty() {
			return Ok(());
		}

		let texts = documents.iter().map(|document| document.content.clone()).collect::<Vec<_>>();
		let vectors = self.embedding.embed(&self.embedding_cfg, &texts).await?;
		let mut points = Vec::with_capacity(documents.len());

		for (document, vector) in documents.iter().zip(vectors) {
			let mut payload_map = HashMap::new();

			payload_map.insert(
				CONTENT_PAYLOAD_KEY.to_string(),
				QdrantValue::from(JsonValue::String(document.content.clone())),
			);
			payload_map.insert(
				METADATA_PAYLOAD_KEY.to_string(),
				QdrantValue::from(JsonValue::Object(document.metadata.clone())),
			);

			let payload = Payload::from(payload_map);
			let mut vector_map = HashMap::new();

			vector_map.insert(DOCUMENT_VECTOR_NAME.to_string(), Vector::from(vector));

			points.push(PointStruct::new(Uuid::new_v4().to_string(), vector_map, payload));
		}

		let upsert = UpsertPointsBuilder::new(self.collection.clone(), points).wait(true);

		self.client.upsert_points(upsert).await?;

		Ok(())
	}

	pub async fn nearest(&self, query: &str) -> Result<Vec<Document>> {
		let vectors = self.embedding.embed(&self.embedding_cfg, &[query.to_string()]).await?;
		let vector = vectors.into_iter().next().ok_or_else(|| Error::InvalidPayload {
			message: "Embedding provider returned no vector for the query.".to_string(),
		})?;
		let search = QueryPointsBuilder::new(self.collection.clone())
			.query(Query::new_nearest(vector))
			.using(DOCUMENT_VECTOR_NAME)
			.limit(self.top_k as u64)
			.with_payload(true);
		let response = self.client.query(search).await?;

		response.result.iter().map(point_to_document).collect()
	}
}
impl DocumentRetriever for QdrantIndex {
	fn search<'a>(&'a self, query: &'a str) -> BoxFuture<'a, paw_agent::Result<Vec<Document>>> {
		Box::pin(async move { self.nearest(query).await.map_err(Into::into) })
	}
}

fn point_to_document(point: &ScoredPoint) -> Result<Document> {
	let content = match point.payload.get(CONTENT_PAYLOAD_KEY).and_then(|value| value.kind.as_ref())
	{
		Some(Kind::StringValue(text)) => text.clone(),
		_ =>
			return Err(Error::InvalidPayload {
				message: "Point payload is missing content text.".to_string(),
			}),
	};
	let metadata = match point.payload.get(METADATA_PAYLOAD_KEY).map(qdrant_to_json) {
		Some(JsonValue::Object(map)) => map,
		_ => Map::new(),
	};

	Ok(Document::with_metadata(content, metadata))
}

fn qdrant_to_json(value: &QdrantValue) -> JsonValue {
	match &value.kind {
		Some(Kind::BoolValue(value)) => JsonValue::Bool(*value),
		Some(Kind::IntegerValue(value)) => JsonValue::from(*value),
		Some(Kind::DoubleValue(value)) =>
			serde_json::Number::from_f64(*value).map(JsonValue::Number).unwrap_or(JsonValue::Null),
		Some(Kind::StringValue(value)) => JsonValue::String(value.clone()),
		Some(Kind::ListValue(list)) => JsonValue::Array(list.values.iter().map(qdrant_to_json).collect()),
		Some(Kind::StructValue(fields)) => JsonValue::Object(
			fields.fields.iter().map(|(key, value)| (key.clone(), qdrant_to_json(value))).collect(),
		),
		_ => JsonValue::Null,
	}
}
