pub type Result<T, E = Error> = std::result::Result<T, E>;

#[derive(Debug, thiserror::Error)]
pub enum Error {
	#[error("Provider error: {message}")]
	Provider { message: String },
	#[error("Invalid structured response: {message}")]
	InvalidResponse { message: String },
	#[error("Retrieval error: {message}")]
	Retrieval { message: String },
	#[error("Run deadline exceeded before node {node}.")]
	DeadlineExceeded { node: &'static str },
}
