//! One full rebuild: raw snapshot in, every index file out.

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use serde::Serialize;

use crate::anchors::{self, AnchorIndex};
use crate::config::DEFAULT_SHARD_KEY_LENGTH;
use crate::error::Error;
use crate::fors::{self, ForIndex};
use crate::headings::{self, HeadingIndex};
use crate::identity::derive_spec;
use crate::linearize::linearize;
use crate::methods::{self, MethodIndex};
use crate::normalize::to_anchor;
use crate::output::{self, Artifact};
use crate::shard;
use crate::types::{Anchor, RawSnapshot, SpecDescriptor, Status};

/// Every index built from one snapshot, before serialization.
#[derive(Debug, Clone, Default)]
pub struct Compiled {
    /// Text key to anchors.
    pub anchors: AnchorIndex,
    /// Context to text keys.
    pub fors: ForIndex,
    /// Spec to its collapsed headings.
    pub headings: HeadingIndex,
    /// Argument-less method name to signatures.
    pub methods: MethodIndex,
    /// Versioned shortname to descriptor.
    pub specs: BTreeMap<String, SpecDescriptor>,
}

/// What a run produced.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Summary {
    /// Anchors indexed by text (headings excluded), counted once each.
    pub anchors: usize,
    /// Output files, relative to the output directory, in write order.
    pub artifacts: Vec<PathBuf>,
    /// Whether writes were skipped.
    pub dry_run: bool,
    /// Specs compiled.
    pub specs: usize,
}

/// Compile a snapshot into `output_dir` with the default shard key length.
///
/// # Errors
///
/// See [`compile_with`].
pub fn compile(raw: RawSnapshot, output_dir: &Path, dry_run: bool) -> Result<Summary, Error> {
    return compile_with(raw, output_dir, dry_run, DEFAULT_SHARD_KEY_LENGTH);
}

/// Compile a snapshot into `output_dir`. With `dry_run`, everything is
/// computed and rendered but nothing is written.
///
/// # Errors
///
/// Returns `Error::UnexpectedHeadingUri` for a malformed multi-page heading,
/// `Error::Json` if rendering fails, or `Error::Write` if an artifact cannot
/// be committed.
pub fn compile_with(raw: RawSnapshot, output_dir: &Path, dry_run: bool, shard_key_length: usize) -> Result<Summary, Error> {
    let (specs, anchors) = flatten_snapshot(raw);
    tracing::info!(specs = specs.len(), anchors = anchors.len(), "flattened anchor data");

    let compiled = build_indices(specs, &anchors)?;
    let artifacts = render(&compiled, shard_key_length)?;

    if dry_run {
        tracing::info!(artifacts = artifacts.len(), "dry run, skipping writes");
    } else {
        output::commit(output_dir, &artifacts)?;
    }

    return Ok(Summary {
        anchors: anchors.iter().filter(|a| return !a.is_heading()).count(),
        artifacts: artifacts.into_iter().map(|a| return a.path).collect(),
        dry_run,
        specs: compiled.specs.len(),
    });
}

/// Run the four index builders over the normalized anchors. They share the
/// input read-only and run in parallel; heading collapse happens inside the
/// heading builder once every spec has contributed.
///
/// # Errors
///
/// Returns `Error::UnexpectedHeadingUri` from the heading builder.
pub fn build_indices(specs: BTreeMap<String, SpecDescriptor>, anchors: &[Anchor]) -> Result<Compiled, Error> {
    let ((text_index, method_index), (for_index, heading_index)) = rayon::join(
        || return rayon::join(|| return anchors::build(anchors), || return methods::build(anchors)),
        || return rayon::join(|| return fors::build(anchors), || return headings::build(anchors, &specs)),
    );

    return Ok(Compiled {
        anchors: text_index,
        fors: for_index,
        headings: heading_index?,
        methods: method_index,
        specs,
    });
}

/// Derive every spec's identity and flatten its snapshot and draft trees
/// into normalized anchors. Snapshot anchors precede current ones.
pub fn flatten_snapshot(raw: RawSnapshot) -> (BTreeMap<String, SpecDescriptor>, Vec<Anchor>) {
    let mut specs = BTreeMap::new();
    let mut anchors = Vec::new();

    for raw_spec in raw.into_values() {
        let spec = derive_spec(&raw_spec);
        let flat = linearize(raw_spec.anchors, Status::Snapshot)
            .into_iter()
            .chain(linearize(raw_spec.draft_anchors, Status::Current));

        let before = anchors.len();
        let mut dropped = 0_usize;
        for node in flat {
            match to_anchor(node, &spec) {
                None => dropped = dropped.saturating_add(1),
                Some(anchor) => anchors.push(anchor),
            }
        }
        tracing::debug!(
            spec = %spec.vshortname,
            kept = anchors.len().saturating_sub(before),
            dropped,
            "normalized anchors"
        );

        specs.insert(spec.vshortname.clone(), spec);
    }

    return (specs, anchors);
}

/// Serialize every index into its output files.
///
/// # Errors
///
/// Returns `Error::Json` if a JSON document cannot be rendered.
pub fn render(compiled: &Compiled, shard_key_length: usize) -> Result<Vec<Artifact>, Error> {
    let mut artifacts = vec![Artifact::new("specs.json", to_json(&compiled.specs)?)];

    for (spec, spec_headings) in &compiled.headings {
        artifacts.push(Artifact::new(
            Path::new("headings").join(format!("headings-{spec}.json")),
            to_json(spec_headings)?,
        ));
    }

    for (group, entries) in shard::partition(&compiled.anchors, shard_key_length) {
        artifacts.push(Artifact::new(
            Path::new("anchors").join(shard::file_name(&group)),
            shard::encode(entries),
        ));
    }

    artifacts.push(Artifact::new("methods.json", to_json(&compiled.methods)?));
    artifacts.push(Artifact::new("fors.json", to_json(&compiled.fors)?));
    return Ok(artifacts);
}

/// Pretty-printed JSON with a trailing newline. Map keys come out sorted
/// because every map is a `BTreeMap` and every struct declares its fields
/// alphabetically.
///
/// # Errors
///
/// Returns `Error::Json` if serialization fails.
fn to_json<T: Serialize + ?Sized>(value: &T) -> Result<String, Error> {
    let mut json = serde_json::to_string_pretty(value)?;
    json.push('\n');
    return Ok(json);
}
