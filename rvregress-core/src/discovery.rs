//! Candidate test discovery.
//!
//! Recursively walks the tests directory and collects the ELF test binaries
//! relevant to the selected families. Directory entries are visited in
//! sorted order so repeated runs over an unchanged tree produce an identical
//! candidate list.

use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use regex::Regex;
use thiserror::Error;
use tracing::warn;

/// Error produced when the tests directory cannot be walked.
#[derive(Debug, Error)]
pub enum DiscoveryError {
    /// A directory in the tree could not be listed.
    #[error("failed to read tests directory {path}: {source}")]
    ReadDir {
        /// Directory whose listing failed.
        path: PathBuf,
        /// Underlying I/O error.
        #[source]
        source: io::Error,
    },
}

/// Selection criteria applied to each regular file's basename.
#[derive(Debug, Default)]
pub struct Selection<'a> {
    /// Family prefixes; a basename must contain at least one as a substring.
    pub families: &'a [String],
    /// Optional additional regex the basename must match.
    pub filter: Option<&'a Regex>,
    /// Basenames to skip outright (debugging aid for tests known to hang).
    pub exclude: &'a [String],
}

/// Walk `root` and collect the paths of all candidate test binaries.
///
/// A regular file is selected iff its basename carries no extension (the
/// heuristic that it is an ELF binary: no `.` anywhere in the name) and
/// contains one of the family prefixes as a substring. The substring match is
/// deliberately unanchored, mirroring the test-suite naming convention
/// (`rv64ui-p-add` contains `rv64ui-p`); it can in principle over-match, a
/// known approximation.
pub fn discover_tests(root: &Path, selection: &Selection<'_>) -> Result<Vec<PathBuf>, DiscoveryError> {
    let mut candidates = Vec::new();
    walk(root, selection, &mut candidates)?;
    Ok(candidates)
}

fn walk(
    dir: &Path,
    selection: &Selection<'_>,
    candidates: &mut Vec<PathBuf>,
) -> Result<(), DiscoveryError> {
    let entries = fs::read_dir(dir).map_err(|source| DiscoveryError::ReadDir {
        path: dir.to_path_buf(),
        source,
    })?;

    let mut paths: Vec<PathBuf> = entries
        .filter_map(|entry| entry.ok().map(|e| e.path()))
        .collect();
    paths.sort();

    for path in paths {
        if path.is_dir() {
            walk(&path, selection, candidates)?;
        } else if path.is_file() && selects(&path, selection) {
            candidates.push(path);
        }
    }

    Ok(())
}

fn selects(path: &Path, selection: &Selection<'_>) -> bool {
    let Some(basename) = path.file_name().and_then(|n| n.to_str()) else {
        return false;
    };

    // Any extension means it is not one of the pre-built ELF images.
    if basename.contains('.') {
        return false;
    }

    if selection.exclude.iter().any(|e| e == basename) {
        warn!(test = basename, "skipping excluded test");
        return false;
    }

    if let Some(re) = selection.filter {
        if !re.is_match(basename) {
            return false;
        }
    }

    selection
        .families
        .iter()
        .any(|family| basename.contains(family.as_str()))
}
