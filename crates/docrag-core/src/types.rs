//! Domain types shared by the chunking, indexing and answering layers.

use serde::{Deserialize, Serialize};

pub type SourceId = String;

/// A page of text produced by the extraction capability.
///
/// `page` is zero-based within the source document.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct PageText {
    pub page: usize,
    pub text: String,
}

/// A bounded span of document text, the unit of indexing.
///
/// - `source_id`: stable identity of the originating document
/// - `page`: zero-based page the chunk's fresh content starts on
/// - `sequence`: zero-based position within the full split of the document
/// - `text`: the chunk payload, never empty, at most the configured chunk
///   size in characters; may start with the overlap window copied from the
///   end of the previous chunk of the same document
///
/// Chunks are created by the splitter during ingestion and are immutable
/// afterwards; they leave the index only through a full clear.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Chunk {
    pub source_id: SourceId,
    pub page: usize,
    pub sequence: usize,
    pub text: String,
}

/// A chunk returned by a similarity search.
///
/// `distance` is the cosine distance between the query vector and the
/// stored vector: lower means more similar. Search output only, never
/// persisted.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ScoredChunk {
    pub chunk: Chunk,
    pub distance: f32,
}

/// A citation entry of a [`QueryResult`].
///
/// `text` is a display preview: the first 200 characters of the chunk with
/// a literal `"..."` always appended, regardless of the original length.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SourceRef {
    pub text: String,
    pub source_id: SourceId,
    pub page: usize,
    pub distance: f32,
}

/// The outcome of answering one question: the generated answer, the cited
/// sources in retrieval rank order, and the question as it was asked.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct QueryResult {
    pub answer: String,
    pub sources: Vec<SourceRef>,
    pub question: String,
}

/// Collection statistics exposed at the caller boundary.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct Stats {
    pub document_chunk_count: usize,
}
