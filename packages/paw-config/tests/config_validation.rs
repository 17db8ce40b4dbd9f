use std::{
	env, fs,
	path::PathBuf,
	sync::atomic::{AtomicU64, Ordering},
	time::{SystemTime, UNIX_EPOCH},
};

use toml::Value;

use paw_config::Config;

const SAMPLE_CONFIG_TOML: &str = r#"
[service]
http_bind = "127.0.0.1:8080"
log_level = "info"

[storage.qdrant]
url = "http://127.0.0.1:6334"
collection = "pet_care"
vector_dim = 1024

[providers.embedding]
provider_id = "test"
api_base = "http://127.0.0.1:1"
api_key = "test-key"
path = "/v1/embeddings"
model = "test-embed"
dimensions = 1024
timeout_ms = 10000

[providers.chat]
provider_id = "test"
api_base = "http://127.0.0.1:1"
api_key = "test-key"
path = "/v1/chat/completions"
model = "test-chat"
temperature = 0.0
timeout_ms = 30000

[providers.web_search]
provider_id = "test"
api_base = "http://127.0.0.1:1"
api_key = "test-key"
path = "/search"
max_results = 3
timeout_ms = 15000

[retrieval]
top_k = 4

[ingest]
chunk_chars = 1000
overlap_chars = 150
"#;

fn sample_toml_with(section: &str, key: &str, value: Value) -> String {
	let mut root: Value = toml::from_str(SAMPLE_CONFIG_TOML).expect("Failed to parse sample config.");
	let mut table = root.as_table_mut().expect("Sample config must be a table.");

	for part in section.split('.') {
		table = table
			.get_mut(part)
			.and_then(Value::as_table_mut)
			.unwrap_or_else(|| panic!("Sample config must include [{section}]."));
	}

	table.insert(key.to_string(), value);

	toml::to_string(&root).expect("Failed to render sample config.")
}

fn write_temp_config(payload: &str) -> PathBuf {
	static COUNTER: AtomicU64 = AtomicU64::new(0);

	let nanos = SystemTime::now()
		.duration_since(UNIX_EPOCH)
		.expect("System time must be valid.")
		.as_nanos();
	let ordinal = COUNTER.fetch_add(1, Ordering::SeqCst);
	let pid = std::process::id();
	let mut path = env::temp_dir();

	path.push(format!("paw_config_test_{nanos}_{pid}_{ordinal}.toml"));

	fs::write(&path, payload).expect("Failed to write test config.");

	path
}

fn load(payload: &str) -> paw_config::Result<Config> {
	let path = write_temp_config(payload);
	let result = paw_config::load(&path);

	fs::remove_file(&path).expect("Failed to remove test config.");

	result
}

#[test]
fn sample_config_is_valid() {
	let cfg = load(SAMPLE_CONFIG_TOML).expect("Expected sample config to load.");

	assert!(cfg.storage.qdrant.is_some());
	assert_eq!(cfg.retrieval.top_k, 4);
}

#[test]
fn vector_dim_must_match_embedding_dimensions() {
	let payload = sample_toml_with("storage.qdrant", "vector_dim", Value::Integer(512));
	let err = load(&payload).expect_err("Expected vector_dim validation error.");

	assert!(
		err.to_string()
			.contains("storage.qdrant.vector_dim must match providers.embedding.dimensions."),
		"Unexpected error: {err}"
	);
}

#[test]
fn api_keys_must_be_non_empty() {
	let payload = sample_toml_with("providers.chat", "api_key", Value::String("  ".to_string()));
	let err = load(&payload).expect_err("Expected api_key validation error.");

	assert!(
		err.to_string().contains("Provider chat api_key must be non-empty."),
		"Unexpected error: {err}"
	);
}

#[test]
fn web_search_max_results_must_be_positive() {
	let payload = sample_toml_with("providers.web_search", "max_results", Value::Integer(0));
	let err = load(&payload).expect_err("Expected max_results validation error.");

	assert!(
		err.to_string().contains("providers.web_search.max_results must be greater than zero."),
		"Unexpected error: {err}"
	);
}

#[test]
fn ingest_overlap_must_be_less_than_chunk() {
	let payload = sample_toml_with("ingest", "overlap_chars", Value::Integer(1_000));
	let err = load(&payload).expect_err("Expected ingest overlap validation error.");

	assert!(
		err.to_string().contains("ingest.overlap_chars must be less than ingest.chunk_chars."),
		"Unexpected error: {err}"
	);
}

#[test]
fn blank_qdrant_url_normalizes_to_no_index() {
	let payload = sample_toml_with("storage.qdrant", "url", Value::String("  ".to_string()));
	let cfg = load(&payload).expect("Expected config with blank qdrant URL to load.");

	assert!(cfg.storage.qdrant.is_none());
}

#[test]
fn missing_storage_section_means_degraded_mode() {
	let mut root: Value =
		toml::from_str(SAMPLE_CONFIG_TOML).expect("Failed to parse sample config.");

	root.as_table_mut().expect("Sample config must be a table.").remove("storage");

	let payload = toml::to_string(&root).expect("Failed to render sample config.");
	let cfg = load(&payload).expect("Expected config without storage to load.");

	assert!(cfg.storage.qdrant.is_none());
}

#[test]
fn retrieval_and_ingest_sections_have_defaults() {
	let mut root: Value =
		toml::from_str(SAMPLE_CONFIG_TOML).expect("Failed to parse sample config.");
	let table = root.as_table_mut().expect("Sample config must be a table.");

	table.remove("retrieval");
	table.remove("ingest");

	let payload = toml::to_string(&root).expect("Failed to render sample config.");
	let cfg = load(&payload).expect("Expected config with defaults to load.");

	assert_eq!(cfg.retrieval.top_k, 4);
	assert_eq!(cfg.ingest.chunk_chars, 1_000);
	assert_eq!(cfg.ingest.overlap_chars, 150);
}
