/// Core domain types: the raw anchor tree, spec descriptors, and normalized anchors.
use std::collections::BTreeMap;
use std::fmt;

use serde::{Deserialize, Deserializer, Serialize};

/// Definition types recognized in anchor data, besides `dfn` and `heading`.
pub const DFN_TYPES: &[&str] = &[
    "abstract-op",
    "argument",
    "at-rule",
    "attr-value",
    "attribute",
    "callback",
    "const",
    "constructor",
    "context",
    "descriptor",
    "dict-member",
    "dictionary",
    "element",
    "element-attr",
    "element-state",
    "enum",
    "enum-value",
    "event",
    "exception",
    "extended-attribute",
    "facet",
    "function",
    "grammar",
    "http-header",
    "interface",
    "iterator",
    "maplike",
    "method",
    "mode",
    "namespace",
    "permission",
    "property",
    "scheme",
    "selector",
    "serializer",
    "setlike",
    "state",
    "stringifier",
    "type",
    "typedef",
    "value",
];

/// IDL types whose linking text is a `name(args)` signature.
pub const IDL_METHOD_TYPES: &[&str] = &["constructor", "method", "stringifier"];

/// Types whose linking texts are matched case-insensitively.
pub const LOWERCASE_TYPES: &[&str] = &[
    "at-rule",
    "attr-value",
    "descriptor",
    "dfn",
    "element",
    "element-attr",
    "element-state",
    "element-sub",
    "function",
    "grammar",
    "http-header",
    "maybe",
    "propdesc",
    "property",
    "selector",
    "type",
    "value",
];

/// Whether anchors of this type survive linearization.
pub fn is_recognized_type(kind: &str) -> bool {
    return kind == "dfn" || kind == "heading" || DFN_TYPES.contains(&kind);
}

/// Flattened, normalized anchor tagged with its owning spec's identity.
/// Texts are never empty: anchors without usable linking text are dropped
/// before this type is constructed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Anchor {
    /// Exported for cross-spec linking.
    pub export: bool,
    /// Context values scoping the linking texts (e.g. an interface name).
    pub for_contexts: Vec<String>,
    /// The anchor's type (`dfn`, `heading`, IDL member kinds, ...).
    pub kind: String,
    /// Spec level, always at least 1.
    pub level: u32,
    /// Human-authored strings this anchor can be referenced by.
    pub linking_texts: Vec<String>,
    /// The anchor's declared name; headings use it as their section number.
    pub name: String,
    /// Whether the definition is normative.
    pub normative: bool,
    /// Marked as a section heading by the data source.
    pub section: bool,
    /// Unversioned spec shortname.
    pub shortname: String,
    /// Versioned spec shortname.
    pub spec: String,
    /// Which sub-tree this anchor came from.
    pub status: Status,
    /// The anchor's title, used as heading text.
    pub title: String,
    /// Spec-relative URI, already cleaned.
    pub uri: String,
    /// Absolute URL: the spec's URL for `status` followed by `uri`.
    pub url: String,
}

impl Anchor {
    /// Whether this anchor belongs in the heading index rather than the text index.
    pub fn is_heading(&self) -> bool {
        return self.section || self.kind == "heading";
    }

    /// Whether this anchor's type is an IDL operation.
    pub fn is_method(&self) -> bool {
        return IDL_METHOD_TYPES.contains(&self.kind.as_str());
    }

    /// Lookup keys for this anchor: one per linking text, lower-cased for
    /// case-insensitive types.
    pub fn text_keys(&self) -> impl Iterator<Item = String> + '_ {
        let lowercase = LOWERCASE_TYPES.contains(&self.kind.as_str());
        return self.linking_texts.iter().map(move |text| {
            let folded = crate::normalize::fold_whitespace(text);
            if lowercase {
                return folded.to_lowercase();
            }
            return folded;
        });
    }
}

/// One node of the raw anchor tree as delivered by the anchor-data API.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub struct RawAnchorNode {
    /// Nested anchors; each child is owned by exactly one parent.
    #[serde(default, deserialize_with = "null_as_default")]
    pub children: Vec<RawAnchorNode>,
    /// Exported flag; the source sends booleans, numbers, or strings.
    #[serde(default, deserialize_with = "boolish")]
    pub export: bool,
    /// Context values scoping the linking texts.
    #[serde(default, rename = "for", deserialize_with = "null_as_default")]
    pub for_contexts: Vec<String>,
    /// Declared node type.
    #[serde(rename = "type")]
    pub kind: String,
    /// Linking texts; absent means "use the title", a `null` entry means none.
    #[serde(default)]
    pub linking_text: Option<Vec<Option<String>>>,
    /// Declared name (section number for headings).
    #[serde(default)]
    pub name: Option<String>,
    /// Normative flag; same encoding as `export`.
    #[serde(default, deserialize_with = "boolish")]
    pub normative: bool,
    /// Marked as a section heading.
    #[serde(default, deserialize_with = "boolish")]
    pub section: bool,
    /// Title text.
    #[serde(default)]
    pub title: Option<String>,
    /// Spec-relative URI.
    #[serde(default, deserialize_with = "null_as_default")]
    pub uri: String,
}

/// The whole fetched snapshot, keyed by spec name.
pub type RawSnapshot = BTreeMap<String, RawSpec>;

/// One spec record as delivered by the anchor-data API.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct RawSpec {
    /// Abstract text.
    #[serde(default, rename = "abstract")]
    pub abstract_text: Option<String>,
    /// Anchors of the published snapshot.
    #[serde(default, deserialize_with = "null_as_default")]
    pub anchors: Vec<RawAnchorNode>,
    /// Base URL of the published snapshot.
    #[serde(default)]
    pub base_uri: Option<String>,
    /// Description text.
    #[serde(default)]
    pub description: Option<String>,
    /// Domain the spec belongs to.
    #[serde(default)]
    pub domain: Option<String>,
    /// Anchors of the current editor's draft.
    #[serde(default, deserialize_with = "null_as_default")]
    pub draft_anchors: Vec<RawAnchorNode>,
    /// Base URL of the current editor's draft.
    #[serde(default)]
    pub draft_uri: Option<String>,
    /// Versioned shortname, e.g. `css-flexbox-1`.
    pub name: String,
    /// Unversioned shortname, when the source knows it.
    #[serde(default)]
    pub short_name: Option<String>,
    /// Publication status.
    #[serde(default)]
    pub status: Option<String>,
    /// Spec title.
    #[serde(default)]
    pub title: Option<String>,
    /// Work status.
    #[serde(default)]
    pub work_status: Option<String>,
    /// Owning working group.
    #[serde(default)]
    pub working_group: Option<String>,
}

/// Canonical spec identity plus descriptive metadata.
/// Field order is alphabetical so JSON output has sorted keys.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SpecDescriptor {
    /// Abstract text.
    #[serde(rename = "abstract")]
    pub abstract_text: Option<String>,
    /// Base URL of the current editor's draft.
    pub current_url: Option<String>,
    /// Description text.
    pub description: Option<String>,
    /// Domain the spec belongs to.
    pub domain: Option<String>,
    /// Spec level, always at least 1.
    pub level: u32,
    /// Unversioned shortname, e.g. `css-flexbox`.
    pub shortname: String,
    /// Base URL of the published snapshot.
    pub snapshot_url: Option<String>,
    /// Publication status.
    pub status: Option<String>,
    /// Spec title.
    pub title: Option<String>,
    /// Versioned shortname, e.g. `css-flexbox-1`.
    pub vshortname: String,
    /// Work status.
    pub work_status: Option<String>,
    /// Owning working group.
    pub working_group: Option<String>,
}

impl SpecDescriptor {
    /// Base URL for anchors of the given status; missing URLs are empty.
    pub fn url_for(&self, status: Status) -> &str {
        let url = match status {
            Status::Current => self.current_url.as_deref(),
            Status::Snapshot => self.snapshot_url.as_deref(),
        };
        return url.unwrap_or("");
    }
}

/// Which sub-tree an anchor came from. Ordering is alphabetical by name.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Status {
    /// The live editor's draft (`draft_anchors`).
    Current,
    /// The published snapshot (`anchors`).
    Snapshot,
}

impl Status {
    /// The lowercase name used in every output format.
    pub const fn as_str(self) -> &'static str {
        return match self {
            Status::Current => "current",
            Status::Snapshot => "snapshot",
        };
    }

    /// Parse the lowercase name back.
    pub fn parse(value: &str) -> Option<Self> {
        return match value {
            "current" => Some(Status::Current),
            "snapshot" => Some(Status::Snapshot),
            _ => None,
        };
    }
}

impl fmt::Display for Status {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        return f.write_str(self.as_str());
    }
}

/// Accept `true`/`false`, numbers, strings, or `null` for a flag.
fn boolish<'de, D>(deserializer: D) -> Result<bool, D::Error>
where
    D: Deserializer<'de>,
{
    let value = serde_json::Value::deserialize(deserializer)?;
    return Ok(match value {
        serde_json::Value::Array(items) => !items.is_empty(),
        serde_json::Value::Bool(b) => b,
        serde_json::Value::Null => false,
        serde_json::Value::Number(n) => n.as_f64().is_some_and(|f| return f != 0.0),
        serde_json::Value::Object(map) => !map.is_empty(),
        serde_json::Value::String(s) => !s.is_empty(),
    });
}

/// Treat an explicit `null` like a missing field.
fn null_as_default<'de, D, T>(deserializer: D) -> Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: Default + Deserialize<'de>,
{
    return Ok(Option::<T>::deserialize(deserializer)?.unwrap_or_default());
}
