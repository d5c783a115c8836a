//! docrag-index
//!
//! LanceDB-backed vector index for document chunks: insert, cosine-distance
//! search, count and clear over a persisted on-disk collection.

pub mod index;
pub mod schema;
pub mod table;

pub use index::VectorIndex;
