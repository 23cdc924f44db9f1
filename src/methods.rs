//! Method index: argument-less method name to every overloaded signature.

use std::collections::{BTreeMap, BTreeSet};
use std::sync::LazyLock;

use regex::Regex;
use serde::{Deserialize, Serialize};

use crate::types::Anchor;

/// `name(args)`, anchored at the start; everything up to the last `)` is args.
#[allow(clippy::expect_used, reason = "pattern is a compile-time constant")]
static SIGNATURE: LazyLock<Regex> =
    LazyLock::new(|| return Regex::new(r"^([^(]+)\((.*)\)").expect("valid regex"));

/// `name()` to full signature to its details.
pub type MethodIndex = BTreeMap<String, BTreeMap<String, MethodSignature>>;

/// One overload of a method.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MethodSignature {
    /// Argument names, trimmed, in declaration order.
    pub args: Vec<String>,
    /// Union of the `for` contexts of every anchor with this exact signature.
    #[serde(rename = "for")]
    pub for_contexts: BTreeSet<String>,
    /// Shortname of the first spec seen defining this signature.
    pub shortname: String,
}

/// Group every IDL-operation anchor's signature under its argument-less name.
pub fn build(anchors: &[Anchor]) -> MethodIndex {
    let mut index = MethodIndex::new();

    for anchor in anchors.iter().filter(|a| return !a.is_heading() && a.is_method()) {
        for key in anchor.text_keys() {
            let Some((name, args)) = parse_signature(&key) else {
                continue;
            };
            let signature = index
                .entry(format!("{name}()"))
                .or_default()
                .entry(key)
                .or_insert_with(|| {
                    return MethodSignature {
                        args,
                        for_contexts: BTreeSet::new(),
                        shortname: anchor.shortname.clone(),
                    };
                });
            signature.for_contexts.extend(anchor.for_contexts.iter().cloned());
        }
    }

    return index;
}

/// Split `name(a, b)` into `("name", ["a", "b"])`. An empty argument string
/// yields no arguments. Returns `None` for keys that are not call-shaped.
pub fn parse_signature(key: &str) -> Option<(String, Vec<String>)> {
    let caps = SIGNATURE.captures(key)?;
    let name = caps.get(1)?.as_str();
    let argstring = caps.get(2)?.as_str();
    let args = if argstring.is_empty() {
        Vec::new()
    } else {
        argstring.split(',').map(|arg| return arg.trim().to_string()).collect()
    };
    return Some((name.to_string(), args));
}
