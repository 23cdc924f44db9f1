//! Spec identity: derive `(vshortname, shortname, level)` from a raw spec record.

use std::sync::LazyLock;

use regex::Regex;

use crate::types::{RawSpec, SpecDescriptor};

/// `<name>-<digits>`, greedy on the name so the last dash-number wins.
#[allow(clippy::expect_used, reason = "pattern is a compile-time constant")]
static LEVEL_SUFFIX: LazyLock<Regex> =
    LazyLock::new(|| return Regex::new(r"^(.*)-(\d+)$").expect("valid regex"));

/// Build the descriptor for one raw spec. Never fails: anything ambiguous
/// falls back to `level = 1`.
pub fn derive_spec(raw: &RawSpec) -> SpecDescriptor {
    let (shortname, level) = derive_identity(raw.short_name.as_deref(), &raw.name);
    return SpecDescriptor {
        abstract_text: raw.abstract_text.clone(),
        current_url: raw.draft_uri.clone(),
        description: raw.description.clone(),
        domain: raw.domain.clone(),
        level,
        shortname,
        snapshot_url: raw.base_uri.clone(),
        status: raw.status.clone(),
        title: raw.title.clone(),
        vshortname: raw.name.clone(),
        work_status: raw.work_status.clone(),
        working_group: raw.working_group.clone(),
    };
}

/// Split a versioned shortname into `(shortname, level)`.
///
/// A known `shortname` that prefixes `vshortname` is stripped along with one
/// following `-`; an all-digit remainder is the level. Without a shortname, a
/// trailing `-<digits>` is split off. Everything else is level 1.
pub fn derive_identity(shortname: Option<&str>, vshortname: &str) -> (String, u32) {
    if let Some(short) = shortname
        && let Some(rest) = vshortname.strip_prefix(short)
    {
        let rest = rest.strip_prefix('-').unwrap_or(rest);
        return (short.to_string(), parse_level(rest).unwrap_or(1));
    }

    if shortname.is_none()
        && let Some(caps) = LEVEL_SUFFIX.captures(vshortname)
        && let (Some(name), Some(digits)) = (caps.get(1), caps.get(2))
        && let Some(level) = parse_level(digits.as_str())
    {
        return (name.as_str().to_string(), level);
    }

    return (vshortname.to_string(), 1);
}

/// An all-ASCII-digit, non-empty string that fits a level.
fn parse_level(digits: &str) -> Option<u32> {
    if digits.is_empty() || !digits.bytes().all(|b| return b.is_ascii_digit()) {
        return None;
    }
    return digits.parse().ok();
}
