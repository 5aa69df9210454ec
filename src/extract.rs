use std::fs;
use std::panic;
use std::path::{Path, PathBuf};
use walkdir::WalkDir;

use crate::scoring::Candidate;

pub const RESUME_EXTENSIONS: &[&str] = &["pdf", "txt", "md"];

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DocumentKind {
    Pdf,
    PlainText,
}

impl DocumentKind {
    pub fn from_path(path: &Path) -> Self {
        match extension(path).as_deref() {
            Some("pdf") => DocumentKind::Pdf,
            _ => DocumentKind::PlainText,
        }
    }
}

fn extension(path: &Path) -> Option<String> {
    path.extension()
        .and_then(|ext| ext.to_str())
        .map(|ext| ext.to_ascii_lowercase())
}

/// Text of an in-memory document, or an empty string if it cannot be read.
pub fn extract_text_from_bytes(bytes: &[u8], kind: DocumentKind) -> String {
    match kind {
        // pdf-extract panics on some malformed files instead of erroring.
        DocumentKind::Pdf => match panic::catch_unwind(|| pdf_extract::extract_text_from_mem(bytes)) {
            Ok(Ok(text)) => text,
            Ok(Err(e)) => {
                tracing::warn!(error = %e, "failed to extract text from PDF");
                String::new()
            }
            Err(_) => {
                tracing::warn!("PDF extraction panicked");
                String::new()
            }
        },
        DocumentKind::PlainText => String::from_utf8_lossy(bytes).into_owned(),
    }
}

/// Text of the document at `path`, or an empty string if it cannot be read.
pub fn extract_text(path: &Path) -> String {
    match fs::read(path) {
        Ok(bytes) => extract_text_from_bytes(&bytes, DocumentKind::from_path(path)),
        Err(e) => {
            tracing::warn!(path = %path.display(), error = %e, "failed to read document");
            String::new()
        }
    }
}

/// Expands files and directories into resume paths. Directories are walked
/// for supported extensions in path order; explicit files are kept as given.
pub fn collect_resume_paths(inputs: &[PathBuf]) -> Vec<PathBuf> {
    let mut paths = Vec::new();

    for input in inputs {
        if input.is_dir() {
            let mut found: Vec<PathBuf> = WalkDir::new(input)
                .into_iter()
                .filter_map(Result::ok)
                .filter(|e| e.file_type().is_file())
                .map(|e| e.into_path())
                .filter(|p| {
                    extension(p).is_some_and(|ext| RESUME_EXTENSIONS.contains(&ext.as_str()))
                })
                .collect();
            found.sort();
            paths.extend(found);
        } else {
            paths.push(input.clone());
        }
    }

    paths
}

pub fn display_name(path: &Path) -> String {
    path.file_name()
        .map(|name| name.to_string_lossy().into_owned())
        .unwrap_or_else(|| path.display().to_string())
}

/// Reads every resume into a candidate. Unreadable files become candidates
/// with empty text so the run can report them.
pub fn load_candidates(paths: &[PathBuf]) -> Vec<Candidate> {
    paths
        .iter()
        .map(|path| Candidate::new(display_name(path), extract_text(path)))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_kind_from_extension() {
        assert_eq!(DocumentKind::from_path(Path::new("cv.PDF")), DocumentKind::Pdf);
        assert_eq!(DocumentKind::from_path(Path::new("cv.txt")), DocumentKind::PlainText);
        assert_eq!(DocumentKind::from_path(Path::new("cv")), DocumentKind::PlainText);
    }

    #[test]
    fn test_invalid_pdf_yields_empty_text() {
        assert_eq!(extract_text_from_bytes(b"not a pdf", DocumentKind::Pdf), "");
    }

    #[test]
    fn test_missing_file_yields_empty_text() {
        assert_eq!(extract_text(Path::new("/definitely/not/here.pdf")), "");
    }

    #[test]
    fn test_collect_walks_directories() {
        let dir = tempfile::tempdir().unwrap();
        fs::write(dir.path().join("b.txt"), "Python").unwrap();
        fs::write(dir.path().join("a.pdf"), "garbage").unwrap();
        fs::write(dir.path().join("notes.docx"), "ignored").unwrap();
        fs::create_dir(dir.path().join("nested")).unwrap();
        fs::write(dir.path().join("nested").join("c.md"), "SQL").unwrap();

        let paths = collect_resume_paths(&[dir.path().to_path_buf()]);
        let names: Vec<String> = paths.iter().map(|p| display_name(p)).collect();
        assert_eq!(names, vec!["a.pdf", "b.txt", "c.md"]);
    }

    #[test]
    fn test_load_candidates_keeps_unreadable() {
        let dir = tempfile::tempdir().unwrap();
        let good = dir.path().join("good.txt");
        let bad = dir.path().join("bad.pdf");
        fs::write(&good, "Python developer").unwrap();
        fs::write(&bad, "not really a pdf").unwrap();

        let candidates = load_candidates(&[good, bad]);
        assert_eq!(candidates.len(), 2);
        assert!(candidates[0].is_readable());
        assert_eq!(candidates[1].filename, "bad.pdf");
        assert!(!candidates[1].is_readable());
    }
}
