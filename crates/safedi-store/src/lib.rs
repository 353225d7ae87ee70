//! Module summary persistence.
//!
//! Summaries are versioned JSON documents, one per module. This crate only
//! moves data between disk and the typed model; semantic validation happens
//! in `safedi-graph`.

use safedi_common::ModuleSummary;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use thiserror::Error;
use tracing::debug;

/// The summary format version this build reads and writes.
pub const SUMMARY_FORMAT_VERSION: u32 = 1;

/// A failure to move a summary between disk and the typed model. Every
/// variant names the offending path.
#[derive(Debug, Error)]
pub enum StoreError {
    #[error("failed to read module summary at {path}: {source}")]
    ReadIo {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("failed to write module summary at {path}: {source}")]
    WriteIo {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("malformed module summary at {path}: {source}")]
    Malformed {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },
    #[error(
        "module summary at {path} has unsupported version {found} (this build supports version \
         {supported})"
    )]
    UnsupportedVersion {
        path: PathBuf,
        found: u32,
        supported: u32,
    },
}

impl StoreError {
    /// The path of the summary file the failure concerns.
    pub fn path(&self) -> &Path {
        match self {
            StoreError::ReadIo { path, .. }
            | StoreError::WriteIo { path, .. }
            | StoreError::Malformed { path, .. }
            | StoreError::UnsupportedVersion { path, .. } => path,
        }
    }
}

#[derive(Serialize, Deserialize)]
struct VersionedSummary {
    version: u32,
    #[serde(flatten)]
    summary: ModuleSummary,
}

/// Reads a module summary from `path`.
pub fn read(path: &Path) -> Result<ModuleSummary, StoreError> {
    let text = std::fs::read_to_string(path).map_err(|source| StoreError::ReadIo {
        path: path.to_path_buf(),
        source,
    })?;
    let document: serde_json::Value =
        serde_json::from_str(&text).map_err(|source| StoreError::Malformed {
            path: path.to_path_buf(),
            source,
        })?;
    let version = document
        .get("version")
        .and_then(serde_json::Value::as_u64)
        .unwrap_or(0) as u32;
    if version != SUMMARY_FORMAT_VERSION {
        return Err(StoreError::UnsupportedVersion {
            path: path.to_path_buf(),
            found: version,
            supported: SUMMARY_FORMAT_VERSION,
        });
    }
    let versioned: VersionedSummary =
        serde_json::from_value(document).map_err(|source| StoreError::Malformed {
            path: path.to_path_buf(),
            source,
        })?;
    debug!(
        path = %path.display(),
        instantiables = versioned.summary.instantiables.len(),
        "read module summary"
    );
    Ok(versioned.summary)
}

/// Writes a module summary to `path`, pretty-printed with a trailing newline.
pub fn write(summary: &ModuleSummary, path: &Path) -> Result<(), StoreError> {
    let versioned = VersionedSummary {
        version: SUMMARY_FORMAT_VERSION,
        summary: summary.clone(),
    };
    // Serialization of the typed model cannot fail; treat a failure as a
    // malformed-document error anyway rather than panicking.
    let mut text =
        serde_json::to_string_pretty(&versioned).map_err(|source| StoreError::Malformed {
            path: path.to_path_buf(),
            source,
        })?;
    text.push('\n');
    std::fs::write(path, text).map_err(|source| StoreError::WriteIo {
        path: path.to_path_buf(),
        source,
    })?;
    debug!(path = %path.display(), "wrote module summary");
    Ok(())
}

#[cfg(test)]
#[path = "tests/store_tests.rs"]
mod store_tests;
