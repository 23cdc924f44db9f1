//! Per-anchor textual fixups applied before any indexing.
//!
//! Every field of a raw anchor has a declared [`FieldKind`]; the normalizer
//! walks [`SCHEMA`] and applies the fixups for each kind. All fixups are
//! idempotent, so normalizing twice is the same as normalizing once.

use std::sync::LazyLock;

use regex::Regex;

use crate::linearize::FlatNode;
use crate::types::{Anchor, RawAnchorNode, SpecDescriptor};

/// One or more whitespace characters.
#[allow(clippy::expect_used, reason = "pattern is a compile-time constant")]
static WHITESPACE_RUN: LazyLock<Regex> =
    LazyLock::new(|| return Regex::new(r"\s+").expect("valid regex"));

/// A title the data source is known to mangle, and its correction.
const MANGLED_IMPORT_TITLE: (&str, &str) = ("'@import'", "@import");

/// Field-by-field normalization schema for raw anchors.
/// Title comes first: an absent linking-text list defaults to it.
const SCHEMA: &[(Field, FieldKind)] = &[
    (Field::Title, FieldKind::Prose),
    (Field::Children, FieldKind::Nested),
    (Field::Export, FieldKind::Flag),
    (Field::For, FieldKind::ContextList),
    (Field::Kind, FieldKind::Text),
    (Field::LinkingText, FieldKind::ProseList),
    (Field::Name, FieldKind::Text),
    (Field::Normative, FieldKind::Flag),
    (Field::Section, FieldKind::Flag),
    (Field::Uri, FieldKind::Uri),
];

/// Fields of a raw anchor node.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Field {
    /// `children`.
    Children,
    /// `export`.
    Export,
    /// `for`.
    For,
    /// `type`.
    Kind,
    /// `linking_text`.
    LinkingText,
    /// `name`.
    Name,
    /// `normative`.
    Normative,
    /// `section`.
    Section,
    /// `title`.
    Title,
    /// `uri`.
    Uri,
}

/// How a field is normalized.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum FieldKind {
    /// List of context strings: whitespace folded.
    ContextList,
    /// Boolean flag: left alone.
    Flag,
    /// Sub-tree: flattened away by the linearizer, never normalized here.
    Nested,
    /// Human text: smart quotes replaced, whitespace folded.
    Prose,
    /// List of human texts; an absent list defaults to the title.
    ProseList,
    /// Identifier-ish text: whitespace folded.
    Text,
    /// Spec-relative URI: whitespace folded, spurious `??` prefix stripped.
    Uri,
}

/// Collapse runs of whitespace to one space and trim both ends.
pub fn fold_whitespace(text: &str) -> String {
    return WHITESPACE_RUN.replace_all(text.trim(), " ").into_owned();
}

/// Normalize one raw anchor in place.
pub fn normalize_node(node: &mut RawAnchorNode) {
    for &(field, kind) in SCHEMA {
        apply(node, field, kind);
    }
}

/// Normalize a flattened node and attach its spec identity.
///
/// Returns `None` when the anchor has no non-empty linking text; such
/// anchors cannot be looked up and are dropped.
pub fn to_anchor(flat: FlatNode, spec: &SpecDescriptor) -> Option<Anchor> {
    let FlatNode { mut node, status } = flat;
    normalize_node(&mut node);

    let linking_texts: Vec<String> = node
        .linking_text
        .unwrap_or_default()
        .into_iter()
        .flatten()
        .filter(|text| return !text.is_empty())
        .collect();
    if linking_texts.is_empty() {
        return None;
    }

    return Some(Anchor {
        export: node.export,
        for_contexts: node.for_contexts,
        kind: node.kind,
        level: spec.level,
        linking_texts,
        name: node.name.unwrap_or_default(),
        normative: node.normative,
        section: node.section,
        shortname: spec.shortname.clone(),
        spec: spec.vshortname.clone(),
        status,
        title: node.title.unwrap_or_default(),
        url: format!("{}{}", spec.url_for(status), node.uri),
        uri: node.uri,
    });
}

/// Apply the fixups for one schema entry.
fn apply(node: &mut RawAnchorNode, field: Field, kind: FieldKind) {
    match (field, kind) {
        (Field::For, FieldKind::ContextList) => {
            fold_each(&mut node.for_contexts);
        },
        (Field::Kind, FieldKind::Text) => node.kind = fold_whitespace(&node.kind),
        (Field::LinkingText, FieldKind::ProseList) => {
            let fallback = node.title.clone();
            let texts = node.linking_text.get_or_insert_with(|| return vec![fallback]);
            for text in texts.iter_mut().flatten() {
                *text = prose(text);
            }
        },
        (Field::Name, FieldKind::Text) => {
            if let Some(name) = node.name.as_mut() {
                *name = fold_whitespace(name);
            }
        },
        (Field::Title, FieldKind::Prose) => {
            if let Some(title) = node.title.as_mut() {
                *title = prose(title);
                if title.as_str() == MANGLED_IMPORT_TITLE.0 {
                    *title = MANGLED_IMPORT_TITLE.1.to_string();
                }
            }
        },
        (Field::Uri, FieldKind::Uri) => node.uri = clean_uri(&node.uri),
        _ => {},
    }
}

/// Fold whitespace, then strip leading `??` runs along with any whitespace
/// each one exposes.
fn clean_uri(uri: &str) -> String {
    let folded = fold_whitespace(uri);
    let mut rest = folded.as_str();
    while let Some(stripped) = rest.strip_prefix("??") {
        rest = stripped.trim_start();
    }
    return rest.to_string();
}

/// Fold whitespace in every element of a list.
fn fold_each(values: &mut [String]) {
    for value in values {
        *value = fold_whitespace(value);
    }
}

/// Smart quotes to ASCII, then whitespace folding.
fn prose(text: &str) -> String {
    let ascii: String = text
        .chars()
        .map(|c| {
            return match c {
                '\u{2018}' | '\u{2019}' => '\'',
                '\u{201C}' | '\u{201D}' => '"',
                other => other,
            };
        })
        .collect();
    return fold_whitespace(&ascii);
}
