use arrow_schema::{DataType, Field, Schema};
use std::sync::Arc;

/// Arrow schema of the chunk collection. The vector width follows the
/// embedding capability's dimensionality, fixed at collection creation.
pub fn build_chunk_schema(dim: i32) -> Arc<Schema> {
    Arc::new(Schema::new(vec![
        Field::new("source_id", DataType::Utf8, false),
        Field::new("page", DataType::Int32, false),
        Field::new("sequence", DataType::Int32, false),
        Field::new("text", DataType::Utf8, false),
        Field::new(
            "vector",
            DataType::FixedSizeList(Arc::new(Field::new("item", DataType::Float32, true)), dim),
            true,
        ),
    ]))
}
