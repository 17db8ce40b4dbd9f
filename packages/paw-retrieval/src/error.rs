pub type Result<T, E = Error> = std::result::Result<T, E>;

#[derive(Debug, thiserror::Error)]
pub enum Error {
	#[error(transparent)]
	Qdrant(#[from] Box<qdrant_client::QdrantError>),
	#[error("{message}")]
	InvalidPayload { message: String },
	#[error(transparent)]
	Agent(#[from] paw_agent::Error),
}

impl From<qdrant_client::QdrantError> for Error {
	fn from(err: qdrant_client::QdrantError) -> Self {
		Self::Qdrant(Box::new(err))
	}
}
impl From<Error> for paw_agent::Error {
	fn from(err: Error) -> Self {
		match err {
			Error::Agent(inner) => inner,
			other => Self::Retrieval { message: other.to_string() },
		}
	}
}
