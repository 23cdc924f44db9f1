//! Sharded line-record format for the anchor-by-text index.
//!
//! Each shard holds the keys whose [`group_from_key`] matches its name, sorted
//! by key. Every anchor under a key is written as:
//!
//! ```text
//! key
//! type
//! spec
//! shortname
//! level
//! status
//! url
//! export      ("1" or empty)
//! normative   ("1" or empty)
//! for*        (zero or more context lines, never empty or `-`)
//! -
//! ```
//!
//! Keys may repeat, once per anchor. A reader needs no lookahead beyond the
//! terminator line.

use std::collections::BTreeMap;
use std::fmt::Write as _;
use std::path::Path;

use crate::anchors::{AnchorIndex, AnchorRecord};
use crate::error::Error;
use crate::types::Status;

/// Characters that count toward a shard group name.
const GROUP_CHARS: &str = "abcdefghijklmnopqrstuvwxyz0123456789";

/// Padding for keys with fewer significant characters than the group length.
const GROUP_PAD: char = '_';

/// Terminates one record.
const TERMINATOR: &str = "-";

/// One record read back from a shard file.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ShardEntry {
    /// The text key the record was stored under.
    pub key: String,
    /// The anchor payload.
    pub record: AnchorRecord,
}

/// Render one shard: the given keys sorted, each anchor as a line record.
pub fn encode<'a, I>(entries: I) -> String
where
    I: IntoIterator<Item = (&'a String, &'a Vec<AnchorRecord>)>,
{
    let mut sorted: Vec<(&String, &Vec<AnchorRecord>)> = entries.into_iter().collect();
    sorted.sort_by(|a, b| return a.0.cmp(b.0));

    let mut out = String::new();
    for (key, records) in sorted {
        for record in records {
            write_record(&mut out, key, record);
        }
    }
    return out;
}

/// Parse a whole shard back into records, in file order.
///
/// # Errors
///
/// Returns `Error::MalformedShard` if a record is truncated or a level or
/// status line cannot be parsed.
pub fn decode(path: &Path, content: &str) -> Result<Vec<ShardEntry>, Error> {
    let mut entries = Vec::new();
    let mut lines = content.lines();

    while let Some(key) = lines.next() {
        let malformed = |reason: String| {
            return Error::MalformedShard {
                path: path.to_path_buf(),
                reason,
            };
        };
        let mut field = |name: &str| {
            return lines
                .next()
                .ok_or_else(|| return malformed(format!("record for `{key}` ends before its {name} line")));
        };

        let kind = field("type")?.to_string();
        let spec = field("spec")?.to_string();
        let shortname = field("shortname")?.to_string();
        let level_line = field("level")?;
        let status_line = field("status")?;
        let url = field("url")?.to_string();
        let export = field("export")? == "1";
        let normative = field("normative")? == "1";

        let mut for_contexts = Vec::new();
        loop {
            let line = field("terminator")?;
            if line == TERMINATOR {
                break;
            }
            for_contexts.push(line.to_string());
        }

        let level = level_line
            .parse::<u32>()
            .map_err(|_err| return malformed(format!("record for `{key}` has level `{level_line}`")))?;
        let status = Status::parse(status_line)
            .ok_or_else(|| return malformed(format!("record for `{key}` has status `{status_line}`")))?;

        entries.push(ShardEntry {
            key: key.to_string(),
            record: AnchorRecord {
                export,
                for_contexts,
                kind,
                level,
                normative,
                shortname,
                spec,
                status,
                url,
            },
        });
    }

    return Ok(entries);
}

/// File name of the shard holding a group.
pub fn file_name(group: &str) -> String {
    return format!("anchors-{group}.data");
}

/// Filename-safe shard group for a key: the first `length` lower-cased
/// ASCII alphanumerics, right-padded with `_`. A pure function of the key.
pub fn group_from_key(key: &str, length: usize) -> String {
    let mut group: String = key
        .to_lowercase()
        .chars()
        .filter(|c| return GROUP_CHARS.contains(*c))
        .take(length)
        .collect();
    while group.len() < length {
        group.push(GROUP_PAD);
    }
    return group;
}

/// Split the text index into shards keyed by group name.
pub fn partition(index: &AnchorIndex, length: usize) -> BTreeMap<String, Vec<(&String, &Vec<AnchorRecord>)>> {
    let mut shards: BTreeMap<String, Vec<(&String, &Vec<AnchorRecord>)>> = BTreeMap::new();
    for (key, records) in index {
        shards.entry(group_from_key(key, length)).or_default().push((key, records));
    }
    return shards;
}

/// Append one record in line form.
fn write_record(out: &mut String, key: &str, record: &AnchorRecord) {
    let flag = |set: bool| return if set { "1" } else { "" };
    // Writing to a String cannot fail.
    let _ = writeln!(out, "{key}");
    let _ = writeln!(out, "{}", record.kind);
    let _ = writeln!(out, "{}", record.spec);
    let _ = writeln!(out, "{}", record.shortname);
    let _ = writeln!(out, "{}", record.level);
    let _ = writeln!(out, "{}", record.status);
    let _ = writeln!(out, "{}", record.url);
    let _ = writeln!(out, "{}", flag(record.export));
    let _ = writeln!(out, "{}", flag(record.normative));
    for context in record.for_contexts.iter().filter(|c| return !c.is_empty() && c.as_str() != TERMINATOR) {
        let _ = writeln!(out, "{context}");
    }
    let _ = writeln!(out, "{TERMINATOR}");
}
