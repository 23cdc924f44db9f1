//! Flatten nested anchor trees into an ordered list of recognized anchors.

use crate::types::{RawAnchorNode, Status, is_recognized_type};

/// A raw anchor lifted out of its tree, tagged with the sub-tree it came from.
/// Its `children` are always empty; they were emitted separately.
#[derive(Debug, Clone)]
pub struct FlatNode {
    /// The node itself, detached from its children.
    pub node: RawAnchorNode,
    /// `Snapshot` for `anchors`, `Current` for `draft_anchors`.
    pub status: Status,
}

/// Flatten `roots` in pre-order (parent before children, siblings in order),
/// keeping only nodes of a recognized type. Children of an unrecognized node
/// are still visited.
///
/// Uses an explicit stack so pathological nesting cannot overflow the call stack.
pub fn linearize(roots: Vec<RawAnchorNode>, status: Status) -> Vec<FlatNode> {
    let mut flat = Vec::new();
    let mut stack: Vec<RawAnchorNode> = roots.into_iter().rev().collect();

    while let Some(mut node) = stack.pop() {
        let children = std::mem::take(&mut node.children);
        stack.extend(children.into_iter().rev());
        if is_recognized_type(&node.kind) {
            flat.push(FlatNode { node, status });
        }
    }

    return flat;
}

#[cfg(test)]
mod tests {
    use super::*;

    fn node(kind: &str, uri: &str, children: Vec<RawAnchorNode>) -> RawAnchorNode {
        return RawAnchorNode {
            children,
            kind: kind.to_string(),
            uri: uri.to_string(),
            ..RawAnchorNode::default()
        };
    }

    /// Naive recursive count, used as the oracle.
    fn count_recognized(nodes: &[RawAnchorNode]) -> usize {
        return nodes
            .iter()
            .map(|n| {
                let own = usize::from(is_recognized_type(&n.kind));
                return own + count_recognized(&n.children);
            })
            .sum();
    }

    #[test]
    fn emits_parents_before_children_in_order() {
        let tree = vec![
            node("heading", "#a", vec![
                node("dfn", "#a1", vec![node("dfn", "#a1x", Vec::new())]),
                node("dfn", "#a2", Vec::new()),
            ]),
            node("heading", "#b", Vec::new()),
        ];
        let flat = linearize(tree, Status::Current);
        let uris: Vec<&str> = flat.iter().map(|f| f.node.uri.as_str()).collect();
        assert_eq!(uris, vec!["#a", "#a1", "#a1x", "#a2", "#b"]);
        assert!(flat.iter().all(|f| f.status == Status::Current && f.node.children.is_empty()));
    }

    #[test]
    fn skips_unrecognized_nodes_but_keeps_their_children() {
        let tree = vec![node("section-wrapper", "#x", vec![node("property", "#p", Vec::new())])];
        let flat = linearize(tree, Status::Snapshot);
        assert_eq!(flat.len(), 1);
        assert_eq!(flat[0].node.uri, "#p");
        assert_eq!(flat[0].status, Status::Snapshot);
    }

    #[test]
    fn count_matches_exhaustive_traversal_at_depth() {
        let mut deep = node("dfn", "#leaf", Vec::new());
        for depth in 0..2000 {
            let kind = if depth % 3 == 0 { "junk" } else { "dfn" };
            deep = node(kind, "#n", vec![deep, node("method", "#m", Vec::new())]);
        }
        let tree = vec![deep];
        let expected = count_recognized_iterative(&tree);
        assert_eq!(linearize(tree, Status::Current).len(), expected);
    }

    #[test]
    fn count_matches_recursive_oracle_on_wide_tree() {
        let tree: Vec<RawAnchorNode> = (0..20)
            .map(|i| {
                let kind = if i % 2 == 0 { "interface" } else { "other" };
                return node(kind, "#i", (0..i).map(|_| node("attribute", "#c", Vec::new())).collect());
            })
            .collect();
        let expected = count_recognized(&tree);
        assert_eq!(linearize(tree, Status::Current).len(), expected);
    }

    /// Stack-safe oracle for the deep tree.
    fn count_recognized_iterative(nodes: &[RawAnchorNode]) -> usize {
        let mut count = 0;
        let mut pending: Vec<&RawAnchorNode> = nodes.iter().collect();
        while let Some(n) = pending.pop() {
            count += usize::from(is_recognized_type(&n.kind));
            pending.extend(n.children.iter());
        }
        return count;
    }
}
