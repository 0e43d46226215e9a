//! PDF loading.
//!
//! Walks an ingestion directory and turns every PDF into a [`Document`] whose
//! source label is the file's path relative to that directory.

use crate::types::{Document, Page};
use std::path::Path;
use vrag_core::{AppError, AppResult};
use walkdir::WalkDir;

/// Load every PDF below `dir`, in file-name order.
///
/// Files that cannot be parsed are skipped with a warning; a missing
/// directory is an error.
pub fn load_directory(dir: &Path) -> AppResult<Vec<Document>> {
    if !dir.is_dir() {
        return Err(AppError::Document(format!(
            "PDF directory not found: {:?}",
            dir
        )));
    }

    let mut documents = Vec::new();

    for entry in WalkDir::new(dir)
        .follow_links(false)
        .sort_by_file_name()
        .into_iter()
        .filter_map(|e| e.ok())
    {
        let path = entry.path();
        if !entry.file_type().is_file() || !is_pdf(path) {
            continue;
        }

        let source = source_label(dir, path);
        match load_pdf(path, &source) {
            Ok(document) => documents.push(document),
            Err(e) => tracing::warn!("Skipping {:?}: {}", path, e),
        }
    }

    tracing::info!("Loaded {} PDF documents from {:?}", documents.len(), dir);

    Ok(documents)
}

/// Load a single PDF, one [`Page`] per PDF page, numbered from 0.
pub fn load_pdf(path: &Path, source: &str) -> AppResult<Document> {
    let pdf = lopdf::Document::load(path)
        .map_err(|e| AppError::Document(format!("Failed to read PDF {:?}: {}", path, e)))?;

    let mut pages = Vec::new();
    for page_number in pdf.get_pages().keys() {
        let text = match pdf.extract_text(&[*page_number]) {
            Ok(text) => text,
            Err(e) => {
                tracing::warn!(
                    "No text extracted from page {} of {:?}: {}",
                    page_number,
                    path,
                    e
                );
                String::new()
            }
        };

        pages.push(Page::new(page_number.saturating_sub(1), text));
    }

    tracing::debug!("Loaded {:?} as '{}' ({} pages)", path, source, pages.len());

    Ok(Document::new(source, pages))
}

fn is_pdf(path: &Path) -> bool {
    path.extension()
        .and_then(|e| e.to_str())
        .map(|e| e.eq_ignore_ascii_case("pdf"))
        .unwrap_or(false)
}

/// Relative path from `root` using forward slashes, independent of platform.
fn source_label(root: &Path, path: &Path) -> String {
    let relative = path.strip_prefix(root).unwrap_or(path);
    relative
        .components()
        .map(|c| c.as_os_str().to_string_lossy())
        .collect::<Vec<_>>()
        .join("/")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::tests::support::write_pdf;
    use std::fs;
    use tempfile::TempDir;

    #[test]
    fn test_load_pdf_pages_are_zero_based() {
        let temp = TempDir::new().unwrap();
        let path = temp.path().join("manual.pdf");
        write_pdf(&path, &["First page", "Second page"]);

        let document = load_pdf(&path, "manual.pdf").unwrap();
        assert_eq!(document.source, "manual.pdf");
        let numbers: Vec<u32> = document.pages.iter().map(|p| p.number).collect();
        assert_eq!(numbers, vec![0, 1]);
    }

    #[test]
    fn test_load_directory_relative_sources() {
        let temp = TempDir::new().unwrap();
        fs::create_dir_all(temp.path().join("nested")).unwrap();
        write_pdf(&temp.path().join("b.pdf"), &["B"]);
        write_pdf(&temp.path().join("nested").join("a.PDF"), &["A"]);
        fs::write(temp.path().join("notes.txt"), "not a pdf").unwrap();

        let documents = load_directory(temp.path()).unwrap();
        let sources: Vec<&str> = documents.iter().map(|d| d.source.as_str()).collect();
        assert_eq!(sources, vec!["b.pdf", "nested/a.PDF"]);
    }

    #[test]
    fn test_load_directory_skips_corrupt_pdf() {
        let temp = TempDir::new().unwrap();
        fs::write(temp.path().join("broken.pdf"), b"not really a pdf").unwrap();
        write_pdf(&temp.path().join("ok.pdf"), &["fine"]);

        let documents = load_directory(temp.path()).unwrap();
        assert_eq!(documents.len(), 1);
        assert_eq!(documents[0].source, "ok.pdf");
    }

    #[test]
    fn test_load_directory_missing() {
        let temp = TempDir::new().unwrap();
        let result = load_directory(&temp.path().join("absent"));
        assert!(matches!(result, Err(AppError::Document(_))));
    }

    #[test]
    fn test_source_label_uses_forward_slashes() {
        let root = Path::new("/data/pdfs");
        let path = root.join("guides").join("se.pdf");
        assert_eq!(source_label(root, &path), "guides/se.pdf");
    }
}
