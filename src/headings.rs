//! Heading index: per-spec headings keyed by shorthand path, with collision
//! tracking for multi-page specs.
//!
//! Every heading is first stored verbosely: its record under the shorthand
//! (`/page#frag`, or `/#frag` for same-page links) and the shorthand listed
//! under the bare fragment. [`collapse`] then removes the indirection wherever
//! no multi-page collision is possible.

use std::collections::BTreeMap;
use std::sync::LazyLock;

use regex::Regex;
use serde::{Deserialize, Serialize};

use crate::error::Error;
use crate::types::{Anchor, SpecDescriptor, Status};

/// `page<anything>#fragment` for headings on a non-front page.
#[allow(clippy::expect_used, reason = "pattern is a compile-time constant")]
static PAGE_AND_FRAGMENT: LazyLock<Regex> =
    LazyLock::new(|| return Regex::new(r"^([\w-]+).*?(#.*)$").expect("valid regex"));

/// A section number like `2`, `2.1`, or `A.3.`.
#[allow(clippy::expect_used, reason = "pattern is a compile-time constant")]
static SECTION_NUMBER: LazyLock<Regex> =
    LazyLock::new(|| return Regex::new(r"^[\d.]+$").expect("valid regex"));

/// Headings of every spec, keyed by versioned shortname.
pub type HeadingIndex = BTreeMap<String, SpecHeadings>;

/// One spec's headings file: shorthand and fragment keys mixed in one map.
pub type SpecHeadings = BTreeMap<String, HeadingEntry>;

/// A value in a spec's headings map.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum HeadingEntry {
    /// Under a fragment key: every shorthand that ends in this fragment.
    Fragment(Vec<String>),
    /// Under a shorthand (or collapsed fragment) key: the heading per status.
    Heading(BTreeMap<Status, HeadingRecord>),
}

/// One heading as stored in the headings file.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct HeadingRecord {
    /// Section number, empty unless the anchor's name is purely numeric/dotted.
    pub number: String,
    /// Title of the spec the heading belongs to.
    pub spec: Option<String>,
    /// Heading text.
    pub text: String,
    /// Absolute URL of the heading.
    pub url: String,
}

/// Build the heading index from every heading-type anchor, then collapse it.
/// Each spec in `specs` gets an entry, even if it has no headings.
///
/// # Errors
///
/// Returns `Error::UnexpectedHeadingUri` if a multi-page heading URI does not
/// have a `page...#fragment` shape.
pub fn build(anchors: &[Anchor], specs: &BTreeMap<String, SpecDescriptor>) -> Result<HeadingIndex, Error> {
    let mut index: HeadingIndex = specs.keys().map(|name| return (name.clone(), SpecHeadings::new())).collect();

    for anchor in anchors.iter().filter(|a| return a.is_heading()) {
        let spec_title = specs.get(&anchor.spec).and_then(|s| return s.title.clone());
        let spec_headings = index.entry(anchor.spec.clone()).or_default();
        add_heading(anchor, spec_title, spec_headings)?;
    }

    collapse(&mut index);
    return Ok(index);
}

/// Collapse fragment indirections that cannot collide.
///
/// A fragment key whose only shorthand is `/` + the fragment itself (a
/// single-page spec, or a front-page link of a multi-page spec) takes over
/// that shorthand's heading, and the shorthand key is removed. Must run
/// after every heading has been added.
pub fn collapse(index: &mut HeadingIndex) {
    for spec_headings in index.values_mut() {
        let collapsible: Vec<(String, String)> = spec_headings
            .iter()
            .filter_map(|(key, entry)| {
                let HeadingEntry::Fragment(shorthands) = entry else {
                    return None;
                };
                if !key.starts_with('#') {
                    return None;
                }
                let [only] = shorthands.as_slice() else {
                    return None;
                };
                if *only != format!("/{key}") {
                    return None;
                }
                return Some((key.clone(), only.clone()));
            })
            .collect();

        for (fragment, shorthand) in collapsible {
            if let Some(heading) = spec_headings.remove(&shorthand) {
                spec_headings.insert(fragment, heading);
            }
        }
    }
}

/// Record one heading under its shorthand and register the shorthand under
/// its fragment.
///
/// # Errors
///
/// Returns `Error::UnexpectedHeadingUri` for an unparseable multi-page URI.
fn add_heading(anchor: &Anchor, spec_title: Option<String>, spec_headings: &mut SpecHeadings) -> Result<(), Error> {
    let (shorthand, fragment) = split_heading_uri(&anchor.uri).ok_or_else(|| {
        return Error::UnexpectedHeadingUri {
            spec: anchor.spec.clone(),
            uri: anchor.uri.clone(),
        };
    })?;

    let number = if SECTION_NUMBER.is_match(&anchor.name) {
        anchor.name.clone()
    } else {
        String::new()
    };
    let record = HeadingRecord {
        number,
        spec: spec_title,
        text: anchor.title.clone(),
        url: anchor.url.clone(),
    };

    let entry = spec_headings
        .entry(shorthand.clone())
        .or_insert_with(|| return HeadingEntry::Heading(BTreeMap::new()));
    if let HeadingEntry::Heading(by_status) = entry {
        by_status.insert(anchor.status, record);
    }

    let entry = spec_headings
        .entry(fragment)
        .or_insert_with(|| return HeadingEntry::Fragment(Vec::new()));
    if let HeadingEntry::Fragment(shorthands) = entry
        && !shorthands.contains(&shorthand)
    {
        shorthands.push(shorthand);
    }

    return Ok(());
}

/// Derive `(shorthand, fragment)` from a heading URI.
///
/// - `#frag` (same page): `("/#frag", "#frag")`
/// - `page.html#frag`: `("/page#frag", "#frag")`
/// - `page.html` (bare page link): `("/page#", "#")`
///
/// Returns `None` when a URI containing `#` does not start with a page name.
pub fn split_heading_uri(uri: &str) -> Option<(String, String)> {
    if uri.starts_with('#') {
        return Some((format!("/{uri}"), uri.to_string()));
    }

    if uri.contains('#') {
        let caps = PAGE_AND_FRAGMENT.captures(uri)?;
        let page = caps.get(1)?.as_str();
        let fragment = caps.get(2)?.as_str();
        return Some((format!("/{page}{fragment}"), fragment.to_string()));
    }

    let page = uri.split_once('.').map_or(uri, |(page, _)| return page);
    return Some((format!("/{page}#"), "#".to_string()));
}

#[cfg(test)]
mod tests {
    use super::*;

    fn spec(name: &str) -> SpecDescriptor {
        let mut spec = crate::identity::derive_spec(&crate::types::RawSpec {
            draft_uri: Some(format!("https://drafts.example/{name}/")),
            name: name.to_string(),
            ..crate::types::RawSpec::default()
        });
        spec.title = Some(format!("Title of {name}"));
        return spec;
    }

    fn heading(spec: &str, uri: &str, name: &str, title: &str) -> Anchor {
        return Anchor {
            export: false,
            for_contexts: Vec::new(),
            kind: "heading".to_string(),
            level: 1,
            linking_texts: vec![title.to_string()],
            name: name.to_string(),
            normative: true,
            section: true,
            shortname: spec.to_string(),
            spec: spec.to_string(),
            status: Status::Current,
            title: title.to_string(),
            uri: uri.to_string(),
            url: format!("https://drafts.example/{spec}/{uri}"),
        };
    }

    fn specs(names: &[&str]) -> BTreeMap<String, SpecDescriptor> {
        return names.iter().map(|n| return (n.to_string(), spec(n))).collect();
    }

    #[test]
    fn splits_every_uri_shape() {
        assert_eq!(split_heading_uri("#intro"), Some(("/#intro".to_string(), "#intro".to_string())));
        assert_eq!(
            split_heading_uri("box.html#display"),
            Some(("/box#display".to_string(), "#display".to_string()))
        );
        assert_eq!(split_heading_uri("box.html"), Some(("/box#".to_string(), "#".to_string())));
        assert_eq!(split_heading_uri("??/weird#frag"), None);
    }

    #[test]
    fn single_page_heading_collapses_to_fragment_key() {
        let anchors = vec![heading("css-example-1", "#intro", "1", "Introduction")];
        let index = build(&anchors, &specs(&["css-example-1"])).unwrap();
        let headings = &index["css-example-1"];

        assert!(!headings.contains_key("/#intro"));
        let HeadingEntry::Heading(by_status) = &headings["#intro"] else {
            panic!("expected heading under #intro, got {:?}", headings["#intro"]);
        };
        let record = &by_status[&Status::Current];
        assert_eq!(record.number, "1");
        assert_eq!(record.text, "Introduction");
        assert_eq!(record.spec.as_deref(), Some("Title of css-example-1"));
        assert_eq!(record.url, "https://drafts.example/css-example-1/#intro");
    }

    #[test]
    fn multi_page_collisions_keep_indirection() {
        let anchors = vec![
            heading("html", "dom.html#intro", "3.1", "Intro to DOM"),
            heading("html", "forms.html#intro", "4.10.1", "Intro to forms"),
            heading("html", "index.html", "", "HTML"),
        ];
        let index = build(&anchors, &specs(&["html"])).unwrap();
        let headings = &index["html"];

        assert_eq!(
            headings["#intro"],
            HeadingEntry::Fragment(vec!["/dom#intro".to_string(), "/forms#intro".to_string()])
        );
        assert!(matches!(headings["/dom#intro"], HeadingEntry::Heading(_)));
        assert!(matches!(headings["/forms#intro"], HeadingEntry::Heading(_)));
        assert_eq!(headings["#"], HeadingEntry::Fragment(vec!["/index#".to_string()]));
    }

    #[test]
    fn lone_multi_page_shorthand_is_not_collapsed() {
        let anchors = vec![heading("html", "dom.html#trees", "", "Trees")];
        let index = build(&anchors, &specs(&["html"])).unwrap();
        let headings = &index["html"];
        assert_eq!(headings["#trees"], HeadingEntry::Fragment(vec!["/dom#trees".to_string()]));
        assert!(headings.contains_key("/dom#trees"));
    }

    #[test]
    fn non_numeric_names_have_empty_number() {
        let anchors = vec![heading("css-example-1", "#appendix", "A", "Appendix")];
        let index = build(&anchors, &specs(&["css-example-1"])).unwrap();
        let HeadingEntry::Heading(by_status) = &index["css-example-1"]["#appendix"] else {
            panic!("expected collapsed heading");
        };
        assert_eq!(by_status[&Status::Current].number, "");
    }

    #[test]
    fn statuses_share_one_entry() {
        let mut snapshot = heading("css-example-1", "#intro", "1", "Introduction");
        snapshot.status = Status::Snapshot;
        let anchors = vec![heading("css-example-1", "#intro", "1", "Introduction"), snapshot];
        let index = build(&anchors, &specs(&["css-example-1"])).unwrap();
        let HeadingEntry::Heading(by_status) = &index["css-example-1"]["#intro"] else {
            panic!("expected collapsed heading");
        };
        assert_eq!(by_status.len(), 2);
    }

    #[test]
    fn specs_without_headings_still_get_an_entry() {
        let index = build(&[], &specs(&["empty-1"])).unwrap();
        assert!(index["empty-1"].is_empty());
    }

    #[test]
    fn unparseable_multi_page_uri_is_fatal() {
        let anchors = vec![heading("html", "/abs#x", "", "Broken")];
        let err = build(&anchors, &specs(&["html"])).unwrap_err();
        assert!(matches!(err, Error::UnexpectedHeadingUri { .. }), "got {err}");
    }

    #[test]
    fn serializes_untagged_with_sorted_status_keys() {
        let mut snapshot = heading("css-example-1", "#intro", "1", "Introduction");
        snapshot.status = Status::Snapshot;
        let anchors = vec![snapshot, heading("css-example-1", "#intro", "1", "Introduction")];
        let index = build(&anchors, &specs(&["css-example-1"])).unwrap();
        let json = serde_json::to_string(&index["css-example-1"]).unwrap();
        assert!(json.starts_with(r##"{"#intro":{"current":{"number":"1","##), "{json}");
        assert!(json.contains(r#""snapshot":{"#));
    }
}
