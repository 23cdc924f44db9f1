//! Read side of the anchor shards: find every anchor a linking text can mean.

use std::path::{Path, PathBuf};

use crate::anchors::AnchorRecord;
use crate::error::Error;
use crate::normalize::fold_whitespace;
use crate::shard::{self, ShardEntry};
use crate::types::LOWERCASE_TYPES;

/// Path of the shard that holds `key`.
pub fn shard_path(output_dir: &Path, key: &str, shard_key_length: usize) -> PathBuf {
    let group = shard::group_from_key(key, shard_key_length);
    return output_dir.join("anchors").join(shard::file_name(&group));
}

/// Scan the one shard that can contain `text` and return every anchor stored
/// under it. Case-insensitive types also match the lower-cased text.
/// A missing shard means no anchors.
///
/// # Errors
///
/// Returns `Error::Io` if the shard exists but cannot be read, or
/// `Error::MalformedShard` if it cannot be parsed.
pub fn lookup(output_dir: &Path, text: &str, shard_key_length: usize) -> Result<Vec<AnchorRecord>, Error> {
    let exact = fold_whitespace(text);
    let lowered = exact.to_lowercase();
    let path = shard_path(output_dir, &exact, shard_key_length);

    let content = match std::fs::read_to_string(&path) {
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(Vec::new()),
        Err(e) => return Err(Error::Io(e)),
        Ok(c) => c,
    };

    let matches = shard::decode(&path, &content)?
        .into_iter()
        .filter(|ShardEntry { key, record }| {
            let case_insensitive = LOWERCASE_TYPES.contains(&record.kind.as_str());
            return *key == exact || (case_insensitive && *key == lowered);
        })
        .map(|entry| return entry.record)
        .collect();
    return Ok(matches);
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::anchors::AnchorIndex;
    use crate::types::Status;

    fn record(kind: &str, spec: &str) -> AnchorRecord {
        return AnchorRecord {
            export: true,
            for_contexts: Vec::new(),
            kind: kind.to_string(),
            level: 1,
            normative: true,
            shortname: spec.to_string(),
            spec: spec.to_string(),
            status: Status::Current,
            url: format!("https://{spec}.example/#x"),
        };
    }

    fn write_index(dir: &Path, index: &AnchorIndex) {
        for (group, entries) in shard::partition(index, 2) {
            let path = dir.join("anchors").join(shard::file_name(&group));
            std::fs::create_dir_all(path.parent().unwrap()).unwrap();
            std::fs::write(path, shard::encode(entries)).unwrap();
        }
    }

    #[test]
    fn finds_case_insensitive_anchors_by_any_casing() {
        let dir = tempfile::tempdir().unwrap();
        let mut index = AnchorIndex::new();
        index.insert("foo thing".to_string(), vec![record("dfn", "css-example-1")]);
        index.insert("Node".to_string(), vec![record("interface", "dom")]);
        write_index(dir.path(), &index);

        assert_eq!(lookup(dir.path(), "Foo   Thing", 2).unwrap().len(), 1);
        assert_eq!(lookup(dir.path(), "Node", 2).unwrap().len(), 1);
        assert!(lookup(dir.path(), "node", 2).unwrap().is_empty());
    }

    #[test]
    fn missing_shard_means_no_matches() {
        let dir = tempfile::tempdir().unwrap();
        assert!(lookup(dir.path(), "zzz", 2).unwrap().is_empty());
    }

    #[test]
    fn shard_path_uses_the_group_of_the_key() {
        let path = shard_path(Path::new("out"), "Width", 2);
        assert_eq!(path, Path::new("out").join("anchors").join("anchors-wi.data"));
    }
}
