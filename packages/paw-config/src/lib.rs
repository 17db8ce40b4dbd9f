mod error;
mod types;

pub use error::{Error, Result};
pub use types::{
	ChatProviderConfig, Config, EmbeddingProviderConfig, Ingest, Providers, Qdrant, Retrieval,
	Service, Storage, WebSearchProviderConfig,
};

use std::{fs, path::Path};

pub fn load(path: &Path) -> Result<Config> {
	let raw = fs::read_to_string(path)
		.map_err(|err| Error::ReadConfig { path: path.to_path_buf(), source: err })?;

	let mut cfg: Config = toml::from_str(&raw)
		.map_err(|err| Error::ParseConfig { path: path.to_path_buf(), source: err })?;

	normalize(&mut cfg);

	validate(&cfg)?;

	Ok(cfg)
}

pub fn validate(cfg: &Config) -> Result<()> {
	if cfg.service.http_bind.trim().is_empty() {
		return Err(Error::Validation {
			message: "service.http_bind must be non-empty.".to_string(),
		});
	}
	if cfg.providers.embedding.dimensions == 0 {
		return Err(Error::Validation {
			message: "providers.embedding.dimensions must be greater than zero.".to_string(),
		});
	}

	if let Some(qdrant) = cfg.storage.qdrant.as_ref() {
		if qdrant.collection.trim().is_empty() {
			return Err(Error::Validation {
				message: "storage.qdrant.collection must be non-empty.".to_string(),
			});
		}
		if qdrant.vector_dim != cfg.providers.embedding.dimensions {
			return Err(Error::Validation {
				message: "storage.qdrant.vector_dim must match providers.embedding.dimensions."
					.to_string(),
			});
		}
	}

	if !cfg.providers.chat.temperature.is_finite() {
		return Err(Error::Validation {
			message: "providers.chat.temperature must be a finite number.".to_string(),
		});
	}
	if cfg.providers.chat.temperature < 0.0 {
		return Err(Error::Validation {
			message: "providers.chat.temperature must be zero or greater.".to_string(),
		});
	}
	if cfg.providers.web_search.max_results == 0 {
		return Err(Error::Validation {
			message: "providers.web_search.max_results must be greater than zero.".to_string(),
		});
	}
	if cfg.retrieval.top_k == 0 {
		return Err(Error::Validation {
			message: "retrieval.top_k must be greater than zero.".to_string(),
		});
	}
	if cfg.ingest.chunk_chars == 0 {
		return Err(Error::Validation {
			message: "ingest.chunk_chars must be greater than zero.".to_string(),
		});
	}
	if cfg.ingest.overlap_chars >= cfg.ingest.chunk_chars {
		return Err(Error::Validation {
			message: "ingest.overlap_chars must be less than ingest.chunk_chars.".to_string(),
		});
	}

	for (label, key) in [
		("embedding", &cfg.providers.embedding.api_key),
		("chat", &cfg.providers.chat.api_key),
		("web_search", &cfg.providers.web_search.api_key),
	] {
		if key.trim().is_empty() {
			return Err(Error::Validation {
				message: format!("Provider {label} api_key must be non-empty."),
			});
		}
	}

	for (label, timeout) in [
		("embedding", cfg.providers.embedding.timeout_ms),
		("chat", cfg.providers.chat.timeout_ms),
		("web_search", cfg.providers.web_search.timeout_ms),
	] {
		if timeout == 0 {
			return Err(Error::Validation {
				message: format!("Provider {label} timeout_ms must be greater than zero."),
			});
		}
	}

	Ok(())
}

fn normalize(cfg: &mut Config) {
	// A blank qdrant URL means "no index"; treat it the same as an absent section.
	if cfg
		.storage
		.qdrant
		.as_ref()
		.map(|qdrant| qdrant.url.trim().is_empty())
		.unwrap_or(false)
	{
		cfg.storage.qdrant = None;
	}
}
