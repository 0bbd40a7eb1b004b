//! The tree of sample points.
//!
//! The root stands for the empty point. A node at depth `d` extends the
//! point of its parent by one coordinate; with variables `x_0 .. x_{n-1}`,
//! depth `d` assigns `x_{n-d}`. Nodes live in an arena and are only ever
//! added, so node ids stay valid until [`SampleTree::clear`].
//!
//! Each node remembers which polynomials of the level below it have been
//! used to construct its children, so that lifting can resume where it
//! stopped when new polynomials arrive.

use crate::elimination_set::PolyId;
use cadkit_math::RealAlgebraicNumber;
use rustc_hash::FxHashSet;
use std::cmp::Ordering;
use std::fmt;

/// Index of a node in a [`SampleTree`].
pub type NodeId = usize;

/// A node of the sample tree.
#[derive(Debug, Clone)]
pub struct SampleNode {
    value: Option<RealAlgebraicNumber>,
    parent: Option<NodeId>,
    children: Vec<NodeId>,
    depth: usize,
    lifted: FxHashSet<PolyId>,
}

impl SampleNode {
    /// The coordinate this node adds; `None` for the root.
    pub fn value(&self) -> Option<&RealAlgebraicNumber> {
        self.value.as_ref()
    }

    /// The parent node; `None` for the root.
    pub fn parent(&self) -> Option<NodeId> {
        self.parent
    }

    /// Children ordered by their values.
    pub fn children(&self) -> &[NodeId] {
        &self.children
    }

    /// Number of assigned coordinates.
    pub fn depth(&self) -> usize {
        self.depth
    }

    /// Check whether `poly` has contributed roots to the children.
    pub fn is_lifted(&self, poly: PolyId) -> bool {
        self.lifted.contains(&poly)
    }
}

/// Arena of sample nodes.
#[derive(Debug, Clone)]
pub struct SampleTree {
    nodes: Vec<SampleNode>,
}

impl Default for SampleTree {
    fn default() -> Self {
        Self::new()
    }
}

impl SampleTree {
    /// A tree holding only the root.
    pub fn new() -> Self {
        Self {
            nodes: vec![SampleNode {
                value: None,
                parent: None,
                children: Vec::new(),
                depth: 0,
                lifted: FxHashSet::default(),
            }],
        }
    }

    /// The root node.
    pub fn root(&self) -> NodeId {
        0
    }

    /// Number of nodes, root included.
    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    /// Check whether the tree holds only the root.
    pub fn is_empty(&self) -> bool {
        self.nodes.len() == 1
    }

    /// Get a node.
    pub fn node(&self, id: NodeId) -> &SampleNode {
        &self.nodes[id]
    }

    /// The value of a non-root node.
    pub fn value(&self, id: NodeId) -> Option<&RealAlgebraicNumber> {
        self.nodes[id].value.as_ref()
    }

    /// Children of `id` ordered by value.
    pub fn children(&self, id: NodeId) -> &[NodeId] {
        &self.nodes[id].children
    }

    /// Depth of `id`.
    pub fn depth(&self, id: NodeId) -> usize {
        self.nodes[id].depth
    }

    /// Record that `poly` was used to lift `id`.
    pub fn mark_lifted(&mut self, id: NodeId, poly: PolyId) {
        self.nodes[id].lifted.insert(poly);
    }

    /// Forget lifting records of `id`, so every polynomial is lifted again.
    pub fn reset_lifted(&mut self, id: NodeId) {
        self.nodes[id].lifted.clear();
    }

    /// Insert a child of `parent` with `value`.
    ///
    /// If an equal child exists, its id is returned with `false`; a root
    /// value then turns the existing child into a root.
    pub fn insert_child(&mut self, parent: NodeId, value: RealAlgebraicNumber) -> (NodeId, bool) {
        let children = &self.nodes[parent].children;
        let pos = children.binary_search_by(|&c| {
            self.nodes[c]
                .value
                .as_ref()
                .map_or(Ordering::Less, |v| v.cmp(&value))
        });
        match pos {
            Ok(i) => {
                let existing = children[i];
                if value.is_root() {
                    if let Some(v) = self.nodes[existing].value.as_mut() {
                        v.set_is_root(true);
                    }
                }
                (existing, false)
            }
            Err(i) => {
                let id = self.nodes.len();
                let depth = self.nodes[parent].depth + 1;
                self.nodes.push(SampleNode {
                    value: Some(value),
                    parent: Some(parent),
                    children: Vec::new(),
                    depth,
                    lifted: FxHashSet::default(),
                });
                self.nodes[parent].children.insert(i, id);
                (id, true)
            }
        }
    }

    /// Values from depth 1 down to `id`.
    pub fn path(&self, id: NodeId) -> Vec<&RealAlgebraicNumber> {
        let mut out = Vec::with_capacity(self.nodes[id].depth);
        let mut cur = Some(id);
        while let Some(n) = cur {
            if let Some(v) = self.nodes[n].value.as_ref() {
                out.push(v);
            }
            cur = self.nodes[n].parent;
        }
        out.reverse();
        out
    }

    /// Nodes at `depth` in creation order.
    pub fn nodes_at(&self, depth: usize) -> impl Iterator<Item = NodeId> + '_ {
        self.nodes
            .iter()
            .enumerate()
            .filter(move |(_, n)| n.depth == depth)
            .map(|(i, _)| i)
    }

    /// Drop every node but the root.
    pub fn clear(&mut self) {
        *self = Self::new();
    }

    fn fmt_node(&self, f: &mut fmt::Formatter<'_>, id: NodeId) -> fmt::Result {
        let node = &self.nodes[id];
        match &node.value {
            Some(v) => {
                let indent = "  ".repeat(node.depth - 1);
                writeln!(f, "{}{}", indent, v)?;
            }
            None => writeln!(f, "[root]")?,
        }
        for &c in &node.children {
            self.fmt_node(f, c)?;
        }
        Ok(())
    }
}

impl fmt::Display for SampleTree {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.fmt_node(f, self.root())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use num_bigint::BigInt;
    use num_rational::BigRational;

    fn rat(n: i64) -> BigRational {
        BigRational::from_integer(BigInt::from(n))
    }

    fn ran(n: i64, is_root: bool) -> RealAlgebraicNumber {
        RealAlgebraicNumber::from_rational(rat(n), is_root)
    }

    #[test]
    fn test_children_sorted() {
        let mut tree = SampleTree::new();
        let root = tree.root();
        let (a, new_a) = tree.insert_child(root, ran(3, false));
        let (b, _) = tree.insert_child(root, ran(-1, false));
        let (c, _) = tree.insert_child(root, ran(1, false));
        assert!(new_a);
        assert_eq!(tree.children(root), &[b, c, a]);
        assert_eq!(tree.depth(a), 1);
        assert_eq!(tree.len(), 4);
    }

    #[test]
    fn test_duplicate_child_becomes_root() {
        let mut tree = SampleTree::new();
        let (a, _) = tree.insert_child(0, ran(2, false));
        let (again, new) = tree.insert_child(0, ran(2, true));
        assert_eq!(a, again);
        assert!(!new);
        assert!(tree.value(a).is_some_and(|v| v.is_root()));
    }

    #[test]
    fn test_path_and_depth() {
        let mut tree = SampleTree::new();
        let (a, _) = tree.insert_child(0, ran(1, false));
        let (b, _) = tree.insert_child(a, ran(5, true));
        let path: Vec<BigRational> = tree.path(b).iter().filter_map(|v| v.value()).collect();
        assert_eq!(path, vec![rat(1), rat(5)]);
        assert_eq!(tree.nodes_at(2).collect::<Vec<_>>(), vec![b]);
        assert_eq!(tree.node(b).parent(), Some(a));
    }

    #[test]
    fn test_lifted_records() {
        let mut tree = SampleTree::new();
        let id = PolyId::new(0, 3);
        assert!(!tree.node(0).is_lifted(id));
        tree.mark_lifted(0, id);
        assert!(tree.node(0).is_lifted(id));
        tree.reset_lifted(0);
        assert!(!tree.node(0).is_lifted(id));
        tree.clear();
        assert!(tree.is_empty());
    }
}
