//! For-context index: each context value to the text keys scoped by it.

use std::collections::{BTreeMap, BTreeSet};

use crate::types::Anchor;

/// Context under which anchors with no `for` values are registered.
pub const ROOT_CONTEXT: &str = "/";

/// Context value to the set of text keys that reference it.
pub type ForIndex = BTreeMap<String, BTreeSet<String>>;

/// Register every text key of every non-heading anchor under each of its
/// non-empty contexts, or under [`ROOT_CONTEXT`] when it has none.
pub fn build(anchors: &[Anchor]) -> ForIndex {
    let mut index = ForIndex::new();

    for anchor in anchors.iter().filter(|a| return !a.is_heading()) {
        for key in anchor.text_keys() {
            for context in anchor.for_contexts.iter().filter(|c| return !c.is_empty()) {
                index.entry(context.clone()).or_default().insert(key.clone());
            }
            if anchor.for_contexts.is_empty() {
                index.entry(ROOT_CONTEXT.to_string()).or_default().insert(key);
            }
        }
    }

    return index;
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::Status;

    fn anchor(text: &str, for_contexts: &[&str]) -> Anchor {
        return Anchor {
            export: true,
            for_contexts: for_contexts.iter().map(|f| return f.to_string()).collect(),
            kind: "attribute".to_string(),
            level: 1,
            linking_texts: vec![text.to_string()],
            name: String::new(),
            normative: true,
            section: false,
            shortname: "dom".to_string(),
            spec: "dom".to_string(),
            status: Status::Current,
            title: String::new(),
            uri: "#a".to_string(),
            url: "https://dom.example/#a".to_string(),
        };
    }

    #[test]
    fn contextless_anchors_register_under_root() {
        let index = build(&[anchor("Node", &[])]);
        assert_eq!(index[ROOT_CONTEXT].iter().collect::<Vec<_>>(), vec!["Node"]);
    }

    #[test]
    fn each_context_collects_its_keys_once() {
        let index = build(&[
            anchor("length", &["NodeList", "HTMLCollection"]),
            anchor("length", &["NodeList"]),
            anchor("item", &["NodeList"]),
        ]);
        assert_eq!(index["NodeList"].iter().collect::<Vec<_>>(), vec!["item", "length"]);
        assert_eq!(index["HTMLCollection"].len(), 1);
        assert!(!index.contains_key(ROOT_CONTEXT));
    }

    #[test]
    fn empty_context_values_are_skipped_without_falling_back_to_root() {
        let index = build(&[anchor("odd", &[""])]);
        assert!(index.is_empty());
    }
}
