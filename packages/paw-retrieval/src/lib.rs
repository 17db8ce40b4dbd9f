//! Vector-index retrieval over Qdrant.

pub mod qdrant;

mod error;

pub use error::{Error, Result};
pub use qdrant::QdrantIndex;
