//! Directory conversion
//!
//! Converts every `.html` page directly inside a source directory and
//! writes `<stem>.md` next to each other in an output directory. Pages are
//! converted in parallel; a page that fails is reported and skipped, it
//! never aborts the rest of the batch and never leaves a partial file.

use std::fs;
use std::path::{Path, PathBuf};
use std::time::{Duration, Instant};

use rayon::prelude::*;

use crate::converter::ConversionOptions;
use crate::error::BatchError;
use crate::pipeline::convert_bytes;

/// The generated search page carries no reference content
const SKIPPED_FILES: &[&str] = &["30_search.html"];

/// A page that could not be converted or written
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FileFailure {
    pub path: PathBuf,
    pub reason: String,
}

/// Outcome of a directory conversion
#[derive(Debug, Clone, Default)]
pub struct BatchReport {
    /// Pages picked up for conversion
    pub total: usize,
    pub succeeded: usize,
    pub failed: Vec<FileFailure>,
    pub elapsed: Duration,
}

/// Pages in `source` that take part in a batch, in name order
///
/// Only regular files with an `.html` extension (any case) directly inside
/// `source` are listed; subdirectories are not searched.
pub fn collect_pages(source: &Path) -> Result<Vec<PathBuf>, BatchError> {
    if !source.is_dir() {
        return Err(BatchError::SourceMissing(source.to_path_buf()));
    }

    let entries = fs::read_dir(source).map_err(|source_err| BatchError::Io {
        path: source.to_path_buf(),
        source: source_err,
    })?;

    let mut pages: Vec<PathBuf> = entries
        .filter_map(|entry| entry.ok().map(|e| e.path()))
        .filter(|path| path.is_file())
        .filter(|path| {
            path.extension()
                .and_then(|ext| ext.to_str())
                .is_some_and(|ext| ext.eq_ignore_ascii_case("html"))
        })
        .filter(|path| {
            path.file_name()
                .and_then(|name| name.to_str())
                .is_none_or(|name| {
                    !SKIPPED_FILES
                        .iter()
                        .any(|skipped| skipped.eq_ignore_ascii_case(name))
                })
        })
        .collect();
    pages.sort();
    Ok(pages)
}

/// Output path for one page: same stem, `.md` extension, inside `out_dir`
pub fn output_path(page: &Path, out_dir: &Path) -> PathBuf {
    let mut name = page.file_stem().unwrap_or(page.as_os_str()).to_os_string();
    name.push(".md");
    out_dir.join(name)
}

/// Convert every page in `source` into `out_dir`
///
/// `out_dir` is created when missing.
///
/// # Errors
///
/// `BatchError::SourceMissing` when `source` is not a directory,
/// `BatchError::Io` when it cannot be listed or `out_dir` cannot be
/// created. Per-page problems end up in [`BatchReport::failed`].
pub fn convert_directory(
    source: &Path,
    out_dir: &Path,
    options: &ConversionOptions,
) -> Result<BatchReport, BatchError> {
    let _span = tracing::info_span!(
        "convert_directory",
        source = %source.display(),
        out_dir = %out_dir.display()
    )
    .entered();
    let started = Instant::now();

    let pages = collect_pages(source)?;
    fs::create_dir_all(out_dir).map_err(|e| BatchError::Io {
        path: out_dir.to_path_buf(),
        source: e,
    })?;
    tracing::info!(pages = pages.len(), "converting pages");

    let failed: Vec<FileFailure> = pages
        .par_iter()
        .filter_map(|page| convert_page(page, out_dir, options).err())
        .collect();

    let report = BatchReport {
        total: pages.len(),
        succeeded: pages.len() - failed.len(),
        failed,
        elapsed: started.elapsed(),
    };
    tracing::info!(
        total = report.total,
        succeeded = report.succeeded,
        failed = report.failed.len(),
        "batch finished"
    );
    Ok(report)
}

fn convert_page(page: &Path, out_dir: &Path, options: &ConversionOptions) -> Result<(), FileFailure> {
    let _span = tracing::debug_span!("convert_page", path = %page.display()).entered();

    let fail = |reason: String| {
        tracing::warn!(path = %page.display(), error = %reason, "Failed to convert page");
        FileFailure {
            path: page.to_path_buf(),
            reason,
        }
    };

    let bytes = fs::read(page).map_err(|e| fail(format!("read failed: {}", e)))?;
    let markdown = convert_bytes(&bytes, None, options).map_err(|e| fail(e.to_string()))?;

    let target = output_path(page, out_dir);
    fs::write(&target, markdown)
        .map_err(|e| fail(format!("write to {} failed: {}", target.display(), e)))?;
    tracing::debug!(target = %target.display(), "page written");
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_output_path_replaces_extension() {
        assert_eq!(
            output_path(Path::new("/docs/Rigidbody.AddForce.html"), Path::new("/out")),
            PathBuf::from("/out/Rigidbody.AddForce.md")
        );
    }

    #[test]
    fn test_collect_pages_filters_and_sorts() {
        let dir = tempfile::tempdir().expect("tempdir");
        for name in [
            "b.html",
            "a.html",
            "C.HTML",
            "30_search.html",
            "30_Search.HTML",
            "notes.txt",
            "page.htm",
        ] {
            fs::write(dir.path().join(name), "<p>x</p>").expect("write");
        }
        fs::create_dir(dir.path().join("nested.html")).expect("mkdir");

        let pages = collect_pages(dir.path()).expect("collect");
        let names: Vec<_> = pages
            .iter()
            .filter_map(|p| p.file_name().and_then(|n| n.to_str()))
            .collect();
        assert_eq!(names, vec!["C.HTML", "a.html", "b.html"]);
    }

    #[test]
    fn test_missing_source_is_reported() {
        let dir = tempfile::tempdir().expect("tempdir");
        let missing = dir.path().join("nope");
        let err = convert_directory(&missing, dir.path(), &ConversionOptions::default())
            .expect_err("missing source");
        assert!(matches!(err, BatchError::SourceMissing(_)));
        assert_eq!(err.exit_code(), 2);
    }
}
