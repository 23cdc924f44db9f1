//! Artifact persistence: stage every output file, then commit them together.
//!
//! Artifacts are rendered in memory by the caller. [`commit`] writes each one
//! to a temporary file beside its destination and only starts renaming once
//! every file has been staged, so a failure while staging leaves the previous
//! index untouched. A failure during the rename phase can leave earlier
//! renames applied; the error names the artifact that failed.

use std::collections::BTreeSet;
use std::io::Write as _;
use std::path::{Path, PathBuf};

use tempfile::NamedTempFile;
use walkdir::WalkDir;

use crate::error::Error;

/// Sub-directories that hold one file per spec or per shard. Files in them
/// that a run did not produce are stale and get pruned.
const PARTITIONED_DIRS: &[(&str, &str, &str)] = &[("anchors", "anchors-", ".data"), ("headings", "headings-", ".json")];

/// One rendered output file.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Artifact {
    /// File contents, UTF-8.
    pub contents: String,
    /// Path relative to the output directory.
    pub path: PathBuf,
}

impl Artifact {
    /// Create an artifact at `path` (relative to the output directory).
    pub fn new(path: impl Into<PathBuf>, contents: String) -> Self {
        return Self {
            contents,
            path: path.into(),
        };
    }
}

/// Stage and commit every artifact under `root`, then prune stale
/// partitioned files.
///
/// # Errors
///
/// Returns `Error::Write` naming the first artifact (or directory) that could
/// not be created, staged, or renamed into place.
pub fn commit(root: &Path, artifacts: &[Artifact]) -> Result<(), Error> {
    let staged = stage_all(root, artifacts)?;

    for (tmp, destination) in staged {
        tmp.persist(&destination).map_err(|e| {
            return Error::Write {
                artifact: destination.clone(),
                source: e.error,
            };
        })?;
    }
    tracing::info!(count = artifacts.len(), root = %root.display(), "committed artifacts");

    let produced: BTreeSet<PathBuf> = artifacts.iter().map(|a| return root.join(&a.path)).collect();
    prune_stale(root, &produced)?;
    return Ok(());
}

/// Remove partitioned files left over from earlier runs.
///
/// # Errors
///
/// Returns `Error::Write` if a stale file exists but cannot be removed.
fn prune_stale(root: &Path, produced: &BTreeSet<PathBuf>) -> Result<(), Error> {
    for &(dir, prefix, suffix) in PARTITIONED_DIRS {
        let dir = root.join(dir);
        if !dir.is_dir() {
            continue;
        }
        let stale = WalkDir::new(&dir)
            .min_depth(1)
            .max_depth(1)
            .into_iter()
            .filter_map(Result::ok)
            .filter(|e| return e.file_type().is_file())
            .map(walkdir::DirEntry::into_path)
            .filter(|p| return is_partition_file(p, prefix, suffix) && !produced.contains(p));

        for path in stale {
            tracing::debug!(path = %path.display(), "pruning stale artifact");
            std::fs::remove_file(&path).map_err(|source| {
                return Error::Write {
                    artifact: path.clone(),
                    source,
                };
            })?;
        }
    }
    return Ok(());
}

/// Whether a file name has the shape `<prefix>...<suffix>`.
fn is_partition_file(path: &Path, prefix: &str, suffix: &str) -> bool {
    return path
        .file_name()
        .and_then(|n| return n.to_str())
        .is_some_and(|name| return name.starts_with(prefix) && name.ends_with(suffix));
}

/// Write every artifact to a temporary file in its destination directory.
///
/// # Errors
///
/// Returns `Error::Write` for the first artifact that cannot be staged.
/// Already-staged temporaries are deleted when dropped.
fn stage_all(root: &Path, artifacts: &[Artifact]) -> Result<Vec<(NamedTempFile, PathBuf)>, Error> {
    let mut staged = Vec::with_capacity(artifacts.len());
    for artifact in artifacts {
        let destination = root.join(&artifact.path);
        let parent = destination.parent().unwrap_or(root).to_path_buf();
        let write_error = |source: std::io::Error| {
            return Error::Write {
                artifact: destination.clone(),
                source,
            };
        };

        std::fs::create_dir_all(&parent).map_err(write_error)?;
        let mut tmp = NamedTempFile::new_in(&parent).map_err(write_error)?;
        tmp.write_all(artifact.contents.as_bytes()).map_err(write_error)?;
        tmp.flush().map_err(write_error)?;
        staged.push((tmp, destination));
    }
    return Ok(staged);
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn commits_nested_artifacts() {
        let dir = tempfile::tempdir().unwrap();
        let artifacts = vec![
            Artifact::new("specs.json", "{}\n".to_string()),
            Artifact::new("anchors/anchors-fo.data", "foo\n-\n".to_string()),
        ];
        commit(dir.path(), &artifacts).unwrap();

        assert_eq!(std::fs::read_to_string(dir.path().join("specs.json")).unwrap(), "{}\n");
        assert_eq!(std::fs::read_to_string(dir.path().join("anchors/anchors-fo.data")).unwrap(), "foo\n-\n");
    }

    #[test]
    fn replaces_previous_contents_and_leaves_no_temporaries() {
        let dir = tempfile::tempdir().unwrap();
        commit(dir.path(), &[Artifact::new("fors.json", "old".to_string())]).unwrap();
        commit(dir.path(), &[Artifact::new("fors.json", "new".to_string())]).unwrap();

        assert_eq!(std::fs::read_to_string(dir.path().join("fors.json")).unwrap(), "new");
        let names: Vec<_> = std::fs::read_dir(dir.path()).unwrap().map(|e| e.unwrap().file_name()).collect();
        assert_eq!(names.len(), 1, "unexpected files: {names:?}");
    }

    #[test]
    fn prunes_stale_partitions_only() {
        let dir = tempfile::tempdir().unwrap();
        let anchors = dir.path().join("anchors");
        std::fs::create_dir_all(&anchors).unwrap();
        std::fs::write(anchors.join("anchors-zz.data"), "stale").unwrap();
        std::fs::write(anchors.join("README"), "keep").unwrap();

        commit(dir.path(), &[Artifact::new("anchors/anchors-fo.data", String::new())]).unwrap();

        assert!(!anchors.join("anchors-zz.data").exists());
        assert!(anchors.join("README").exists());
        assert!(anchors.join("anchors-fo.data").exists());
    }

    #[test]
    fn staging_failure_leaves_existing_files_untouched() {
        let dir = tempfile::tempdir().unwrap();
        commit(dir.path(), &[Artifact::new("specs.json", "before".to_string())]).unwrap();

        // A regular file where a directory is needed makes staging fail.
        std::fs::write(dir.path().join("headings"), "not a directory").unwrap();
        let err = commit(dir.path(), &[
            Artifact::new("specs.json", "after".to_string()),
            Artifact::new("headings/headings-x.json", "{}".to_string()),
        ])
        .unwrap_err();

        assert!(matches!(err, Error::Write { .. }), "got {err}");
        assert_eq!(std::fs::read_to_string(dir.path().join("specs.json")).unwrap(), "before");
    }
}
