//! Error types for conversion operations

use std::fmt;
use std::io;
use std::path::PathBuf;

/// Errors that can occur while converting a single document
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ConversionError {
    /// An element without a tag name reached the converter (parser defect)
    StructuralViolation(String),
    /// A tag-family converter was handed a node of another family
    TagMismatch {
        expected: &'static str,
        found: String,
    },
    /// Input did not parse into an HTML tree (empty, binary or undecodable)
    MalformedFragment(String),
}

impl ConversionError {
    /// Get numeric error code, used as a stable identifier in reports
    pub fn code(&self) -> u32 {
        match self {
            ConversionError::StructuralViolation(_) => 1,
            ConversionError::TagMismatch { .. } => 2,
            ConversionError::MalformedFragment(_) => 3,
        }
    }
}

impl fmt::Display for ConversionError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ConversionError::StructuralViolation(msg) => {
                write!(f, "Structural violation: {}", msg)
            }
            ConversionError::TagMismatch { expected, found } => {
                write!(f, "Tag mismatch: expected <{}>, found <{}>", expected, found)
            }
            ConversionError::MalformedFragment(msg) => write!(f, "Malformed fragment: {}", msg),
        }
    }
}

impl std::error::Error for ConversionError {}

/// Errors that abort a whole directory conversion
///
/// Per-file problems never surface here; they are collected in
/// [`crate::batch::BatchReport`] instead.
#[derive(Debug)]
pub enum BatchError {
    /// The source directory does not exist or is not a directory
    SourceMissing(PathBuf),
    /// Enumerating the source or creating the output directory failed
    Io { path: PathBuf, source: io::Error },
}

impl BatchError {
    /// Process exit code for the CLI
    pub fn exit_code(&self) -> i32 {
        match self {
            BatchError::SourceMissing(_) => 2,
            BatchError::Io { .. } => 1,
        }
    }
}

impl fmt::Display for BatchError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            BatchError::SourceMissing(path) => {
                write!(f, "Path \"{}\" does not exist.", path.display())
            }
            BatchError::Io { path, source } => write!(f, "I/O error at {}: {}", path.display(), source),
        }
    }
}

impl std::error::Error for BatchError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            BatchError::SourceMissing(_) => None,
            BatchError::Io { source, .. } => Some(source),
        }
    }
}
