//! Prompt assembly for the answering step.

use docrag_core::types::ScoredChunk;

/// Instruction holding the model to the supplied context. The refusal
/// sentence is a fixed contract; callers match on it verbatim.
const INSTRUCTION: &str = "Using the following documents, answer the user's question succinctly and accurately.\nIf the answer cannot be found in the documents, say \"I cannot find this information in the provided documents.\"";

/// Assemble the full prompt: the instruction, the retrieved chunk texts in
/// rank order as context, then the verbatim question. The prompt is bounded
/// by construction: at most top-k chunks of at most the configured chunk
/// size each.
pub fn build_prompt(question: &str, retrieved: &[ScoredChunk]) -> String {
    let context = retrieved
        .iter()
        .map(|r| r.chunk.text.as_str())
        .collect::<Vec<_>>()
        .join("\n\n");
    format!("{INSTRUCTION}\n\nDocuments:\n{context}\n\nQuestion: {question}\n\nAnswer:")
}
