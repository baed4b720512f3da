//! Candidate discovery inside one vault folder.
//!
//! Only `*.md` files directly inside the folder are considered. Candidates are
//! ordered most-recently-modified first, ties broken by file name.

use std::path::{Path, PathBuf};

use chrono::{DateTime, Utc};

use crate::error::{io_err, ScanError};
use crate::types::FileRecord;

/// A Markdown file selected for synchronization, not yet read.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Candidate {
    pub path: PathBuf,
    pub modified: DateTime<Utc>,
}

/// List `*.md` files in `dir` modified at or after `since`.
pub fn list_candidates(
    dir: &Path,
    since: Option<DateTime<Utc>>,
) -> Result<Vec<Candidate>, ScanError> {
    let entries = std::fs::read_dir(dir).map_err(|e| io_err(dir, e))?;
    let mut out = Vec::new();
    for entry in entries {
        let entry = entry.map_err(|e| io_err(dir, e))?;
        let path = entry.path();
        if path.extension().and_then(|e| e.to_str()) != Some("md") {
            continue;
        }
        let meta = entry.metadata().map_err(|e| io_err(&path, e))?;
        if !meta.is_file() {
            continue;
        }
        let modified: DateTime<Utc> = meta.modified().map_err(|e| io_err(&path, e))?.into();
        if since.is_some_and(|cutoff| modified < cutoff) {
            continue;
        }
        out.push(Candidate { path, modified });
    }
    out.sort_by(|a, b| {
        b.modified
            .cmp(&a.modified)
            .then_with(|| a.path.file_name().cmp(&b.path.file_name()))
    });
    Ok(out)
}

/// Read and split one candidate.
pub fn read_record(candidate: &Candidate) -> Result<FileRecord, ScanError> {
    let raw = std::fs::read_to_string(&candidate.path).map_err(|e| io_err(&candidate.path, e))?;
    FileRecord::parse(candidate.path.clone(), raw, Some(candidate.modified))
}

/// List and read every candidate in `dir`.
///
/// A listing failure is returned as the outer error; a file that cannot be
/// read or parsed is reported in place without stopping the scan.
pub fn scan(
    dir: &Path,
    since: Option<DateTime<Utc>>,
) -> Result<Vec<Result<FileRecord, ScanError>>, ScanError> {
    let candidates = list_candidates(dir, since)?;
    tracing::debug!("{} candidate(s) in {}", candidates.len(), dir.display());
    Ok(candidates.iter().map(read_record).collect())
}
