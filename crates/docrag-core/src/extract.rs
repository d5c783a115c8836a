//! Page extraction via the external `pdftotext` binary (poppler).
//!
//! The extraction model itself is an external capability; this module only
//! adapts its output (pages separated by form feeds) to [`PageText`].

use std::path::Path;
use std::process::Command;

use anyhow::{anyhow, Context};

use crate::traits::PageExtractor;
use crate::types::PageText;

#[derive(Debug, Default)]
pub struct PdftotextExtractor;

impl PageExtractor for PdftotextExtractor {
    fn extract_pages(&self, path: &Path) -> anyhow::Result<Vec<PageText>> {
        let output = Command::new("pdftotext")
            .arg("-enc")
            .arg("UTF-8")
            .arg(path)
            .arg("-")
            .output()
            .context("failed to run pdftotext (is poppler installed?)")?;
        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr);
            return Err(anyhow!("pdftotext failed: {}", stderr.trim()));
        }
        let text = String::from_utf8_lossy(&output.stdout).to_string();
        if text.trim().is_empty() {
            return Err(anyhow!(
                "no text could be extracted from {}",
                path.display()
            ));
        }
        let pages = pages_from_form_feeds(&text);
        tracing::debug!(
            path = %path.display(),
            pages = pages.len(),
            "extracted page texts"
        );
        Ok(pages)
    }
}

/// Split `pdftotext` output into zero-based pages on form feed characters.
/// A trailing form feed produces a trailing empty page, which downstream
/// chunking ignores.
pub fn pages_from_form_feeds(text: &str) -> Vec<PageText> {
    text.split('\u{c}')
        .enumerate()
        .map(|(page, t)| PageText {
            page,
            text: t.to_string(),
        })
        .collect()
}
