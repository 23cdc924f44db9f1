//! Anchor-by-text index: every linking text maps to all anchors it can mean.

use std::collections::BTreeMap;

use crate::types::{Anchor, Status};

/// Text key to every anchor reachable by that text, in input order.
/// Ambiguity is expected and preserved.
pub type AnchorIndex = BTreeMap<String, Vec<AnchorRecord>>;

/// The per-anchor payload stored in the text index and in shard files.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AnchorRecord {
    /// Exported for cross-spec linking.
    pub export: bool,
    /// Context values scoping the text.
    pub for_contexts: Vec<String>,
    /// Anchor type.
    pub kind: String,
    /// Spec level.
    pub level: u32,
    /// Whether the definition is normative.
    pub normative: bool,
    /// Unversioned spec shortname.
    pub shortname: String,
    /// Versioned spec shortname.
    pub spec: String,
    /// Snapshot or current.
    pub status: Status,
    /// Absolute URL.
    pub url: String,
}

impl From<&Anchor> for AnchorRecord {
    fn from(anchor: &Anchor) -> Self {
        return Self {
            export: anchor.export,
            for_contexts: anchor.for_contexts.clone(),
            kind: anchor.kind.clone(),
            level: anchor.level,
            normative: anchor.normative,
            shortname: anchor.shortname.clone(),
            spec: anchor.spec.clone(),
            status: anchor.status,
            url: anchor.url.clone(),
        };
    }
}

/// Index every non-heading anchor under each of its text keys.
pub fn build(anchors: &[Anchor]) -> AnchorIndex {
    let mut index = AnchorIndex::new();
    for anchor in anchors.iter().filter(|a| return !a.is_heading()) {
        let record = AnchorRecord::from(anchor);
        for key in anchor.text_keys() {
            index.entry(key).or_default().push(record.clone());
        }
    }
    return index;
}
