//! Input-validation and display helpers used at the caller boundary.

use std::path::Path;

/// Case-insensitive check that a filename carries a `.pdf` extension.
pub fn is_pdf_filename(name: &str) -> bool {
    Path::new(name)
        .extension()
        .map_or(false, |ext| ext.eq_ignore_ascii_case("pdf"))
}

/// Strip path components and any character outside alphanumerics,
/// whitespace, dots, dashes and underscores. Defends against path
/// traversal in caller-supplied filenames.
pub fn sanitize_filename(name: &str) -> String {
    let base = Path::new(name)
        .file_name()
        .and_then(|n| n.to_str())
        .unwrap_or_default();
    base.chars()
        .filter(|c| c.is_alphanumeric() || c.is_whitespace() || matches!(c, '.' | '-' | '_'))
        .collect()
}

/// Human-readable file size with two decimals (B, KB, MB, GB, TB).
pub fn format_file_size(bytes: u64) -> String {
    let mut size = bytes as f64;
    for unit in ["B", "KB", "MB", "GB"] {
        if size < 1024.0 {
            return format!("{size:.2} {unit}");
        }
        size /= 1024.0;
    }
    format!("{size:.2} TB")
}

/// Truncate to `max_chars`, appending an ellipsis only when something was
/// actually cut off. Display sugar for logs and listings; source citations
/// use their own fixed truncation contract instead.
pub fn truncate_text(text: &str, max_chars: usize) -> String {
    if text.chars().count() <= max_chars {
        return text.to_string();
    }
    let mut out: String = text.chars().take(max_chars).collect();
    out.push_str("...");
    out
}
