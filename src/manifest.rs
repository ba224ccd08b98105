use std::collections::BTreeMap;
use std::fs;

use camino::{Utf8Path, Utf8PathBuf};
use regex::Regex;

use crate::error::MaraError;

/// One line of the user-supplied file list, classified with fixed precedence:
/// accession syntax first, then URL scheme, then an existing local path.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ManifestEntry {
    LocalFile { path: Utf8PathBuf, size: u64 },
    RemoteUrl(String),
    Accession(String),
}

impl ManifestEntry {
    pub fn is_local(&self) -> bool {
        matches!(self, ManifestEntry::LocalFile { .. })
    }
}

/// Classifies a single manifest line. Accessions and URLs are passed through
/// verbatim with no existence check; anything else must name an existing
/// local file or the whole run is aborted before any network call.
pub fn classify(line: &str) -> Result<ManifestEntry, MaraError> {
    let accession = Regex::new(r"^SRR\d+(\s+\S+.*)?$").unwrap();
    if accession.is_match(line) {
        return Ok(ManifestEntry::Accession(line.to_string()));
    }
    if line.starts_with("http://") || line.starts_with("https://") || line.starts_with("ftp://") {
        return Ok(ManifestEntry::RemoteUrl(line.to_string()));
    }
    let path = Utf8PathBuf::from(line);
    let metadata = fs::metadata(path.as_std_path())
        .map_err(|_| MaraError::MissingInput(path.clone()))?;
    Ok(ManifestEntry::LocalFile {
        path,
        size: metadata.len(),
    })
}

/// Reads a file list (one reference per line) and classifies every line up
/// front, so the size report is accurate before committing to a session.
/// Blank lines are skipped.
pub fn load_manifest(path: &Utf8Path) -> Result<Vec<ManifestEntry>, MaraError> {
    let content = fs::read_to_string(path.as_std_path())
        .map_err(|err| MaraError::ManifestRead(path.to_path_buf(), err.to_string()))?;
    content
        .lines()
        .map(str::trim)
        .filter(|line| !line.is_empty())
        .map(classify)
        .collect()
}

/// Size map registered alongside the job parameters, keyed by the path as
/// written in the manifest.
pub fn size_report(entries: &[ManifestEntry]) -> BTreeMap<String, String> {
    entries
        .iter()
        .filter_map(|entry| match entry {
            ManifestEntry::LocalFile { path, size } => {
                Some((path.to_string(), human_size(*size)))
            }
            _ => None,
        })
        .collect()
}

pub fn human_size(bytes: u64) -> String {
    format!("{:.4} GB", bytes as f64 / 1024.0 / 1024.0 / 1024.0)
}
