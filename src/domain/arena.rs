use generational_arena::{Arena, Index};
use tracing::{debug, instrument, trace, warn};

use crate::domain::error::{DomainError, DomainResult};

/// Payload carried by every node.
pub type NodeValue = i32;

/// Handle to a node stored in a [`Tree`].
///
/// Handles are generational: once a node is released every handle to it
/// goes stale and lookups return `None`.
pub type NodeId = Index;

/// Value written into a node when it is released.
pub const POISON: NodeValue = 0xDEAD;

/// Binary tree node. Children are exclusively owned handles into the same arena.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Node {
    value: NodeValue,
    left: Option<NodeId>,
    right: Option<NodeId>,
    parent: Option<NodeId>,
    released: bool,
}

impl Node {
    pub fn value(&self) -> NodeValue {
        self.value
    }

    pub fn left(&self) -> Option<NodeId> {
        self.left
    }

    pub fn right(&self) -> Option<NodeId> {
        self.right
    }

    /// Owning node, `None` for the root and for detached nodes.
    pub fn parent(&self) -> Option<NodeId> {
        self.parent
    }

    pub fn is_leaf(&self) -> bool {
        self.left.is_none() && self.right.is_none()
    }

    /// True only for a node handed back by [`Tree::destroy_node`]. A live
    /// node whose value happens to equal [`POISON`] is not poisoned.
    pub fn is_poisoned(&self) -> bool {
        self.released
    }
}

/// Arena-backed binary tree.
///
/// The tree owns every node it allocates. `size` is caller-asserted metadata
/// and is never derived from the shape; use [`Tree::node_count`] for the truth.
#[derive(Debug, Default)]
pub struct Tree {
    arena: Arena<Node>,
    root: Option<NodeId>,
    size: usize,
    node_limit: Option<usize>,
}

impl Tree {
    /// Empty tree: no root, size zero, unbounded node store.
    pub fn new() -> Self {
        Self::default()
    }

    /// Empty tree whose store refuses to hold more than `limit` live nodes.
    pub fn with_node_limit(limit: Option<usize>) -> Self {
        Self {
            node_limit: limit,
            ..Self::default()
        }
    }

    pub fn node_limit(&self) -> Option<usize> {
        self.node_limit
    }

    /// Allocates a detached node owning `left` and `right`.
    ///
    /// Children must be live, detached, and distinct. They are moved into the
    /// new node and cannot be attached anywhere else afterwards.
    #[instrument(level = "trace", skip(self))]
    pub fn create_node(
        &mut self,
        value: NodeValue,
        left: Option<NodeId>,
        right: Option<NodeId>,
    ) -> DomainResult<NodeId> {
        if let Some(limit) = self.node_limit {
            if self.arena.len() >= limit {
                return Err(DomainError::Allocation { limit });
            }
        }
        for child in left.into_iter().chain(right) {
            self.ensure_detached(child)?;
        }
        if let (Some(l), Some(r)) = (left, right) {
            if l == r {
                return Err(DomainError::NodeAlreadyOwned(r));
            }
        }

        let id = self.arena.insert(Node {
            value,
            left,
            right,
            parent: None,
            released: false,
        });
        for child in left.into_iter().chain(right) {
            if let Some(node) = self.arena.get_mut(child) {
                node.parent = Some(id);
            }
        }
        trace!(?id, value, "node created");
        Ok(id)
    }

    /// Shorthand for a node without children.
    pub fn leaf(&mut self, value: NodeValue) -> DomainResult<NodeId> {
        self.create_node(value, None, None)
    }

    fn ensure_detached(&self, id: NodeId) -> DomainResult<()> {
        let node = self.arena.get(id).ok_or(DomainError::UnknownNode(id))?;
        if node.parent.is_some() || self.root == Some(id) {
            return Err(DomainError::NodeAlreadyOwned(id));
        }
        Ok(())
    }

    /// Hands `root` to the tree and records the caller-asserted `size`.
    ///
    /// Without a root the tree becomes empty with size zero, whatever `size`
    /// says. A previous root that is being replaced is released.
    #[instrument(level = "debug", skip(self))]
    pub fn set_root(&mut self, root: Option<NodeId>, size: usize) -> DomainResult<()> {
        if let Some(id) = root {
            if self.root != Some(id) {
                self.ensure_detached(id)?;
            }
        }
        if let Some(old) = self.root.filter(|old| Some(*old) != root) {
            let released = self.release_subtree(old);
            debug!(released, "previous root released");
        }

        match root {
            Some(id) => {
                self.root = Some(id);
                self.size = size;
                let actual = self.node_count();
                if actual != size {
                    warn!(asserted = size, actual, "tree size does not match node count");
                }
            }
            None => {
                self.root = None;
                self.size = 0;
            }
        }
        Ok(())
    }

    pub fn root(&self) -> Option<NodeId> {
        self.root
    }

    /// Caller-asserted size recorded by [`Tree::set_root`].
    pub fn size(&self) -> usize {
        self.size
    }

    pub fn is_empty(&self) -> bool {
        self.root.is_none()
    }

    pub fn node(&self, id: NodeId) -> Option<&Node> {
        self.arena.get(id)
    }

    /// Live nodes in the store, attached or not.
    pub fn live_nodes(&self) -> usize {
        self.arena.len()
    }

    /// Nodes reachable from the root.
    #[instrument(level = "trace", skip(self))]
    pub fn node_count(&self) -> usize {
        self.iter().count()
    }

    /// Height of the tree; zero when empty.
    #[instrument(level = "debug", skip(self))]
    pub fn depth(&self) -> usize {
        match self.root {
            Some(root) => self.calculate_depth(root),
            None => 0,
        }
    }

    fn calculate_depth(&self, node_idx: NodeId) -> usize {
        let mut deepest = 0;
        let mut stack = vec![(node_idx, 1)];
        while let Some((idx, level)) = stack.pop() {
            if let Some(node) = self.get_node(idx) {
                deepest = deepest.max(level);
                for child in node.left.into_iter().chain(node.right) {
                    stack.push((child, level + 1));
                }
            }
        }
        deepest
    }

    fn get_node(&self, idx: NodeId) -> Option<&Node> {
        self.arena.get(idx)
    }

    /// Releases one node: poisons the value, clears both children, frees the slot.
    ///
    /// The node's children must already be released. The poisoned node is
    /// returned so callers can account for the release.
    #[instrument(level = "trace", skip(self))]
    pub fn destroy_node(&mut self, id: NodeId) -> DomainResult<Node> {
        let node = self.arena.get(id).ok_or(DomainError::UnknownNode(id))?;
        if node
            .left
            .into_iter()
            .chain(node.right)
            .any(|child| self.arena.contains(child))
        {
            return Err(DomainError::NodeStillOwnsChildren(id));
        }

        let parent_idx = node.parent;
        if let Some(parent) = parent_idx.and_then(|p| self.arena.get_mut(p)) {
            if parent.left == Some(id) {
                parent.left = None;
            }
            if parent.right == Some(id) {
                parent.right = None;
            }
        }
        if self.root == Some(id) {
            self.root = None;
        }

        let node = self
            .arena
            .get_mut(id)
            .ok_or(DomainError::UnknownNode(id))?;
        node.value = POISON;
        node.left = None;
        node.right = None;
        node.parent = None;
        node.released = true;
        let released = self.arena.remove(id).ok_or(DomainError::UnknownNode(id))?;
        trace!(?id, "node released");
        Ok(released)
    }

    fn release_subtree(&mut self, top: NodeId) -> usize {
        let order: Vec<NodeId> = PostOrderIterator::from_node(self, Some(top))
            .map(|(idx, _)| idx)
            .collect();
        let mut released = 0;
        for idx in order {
            match self.destroy_node(idx) {
                Ok(_) => released += 1,
                Err(e) => warn!(?idx, error = %e, "skipping node during teardown"),
            }
        }
        released
    }

    /// Releases every node reachable from the root in post-order, then any
    /// detached leftovers, and resets the tree to empty.
    ///
    /// Returns the number of reachable nodes released. Destroying an already
    /// destroyed tree releases nothing.
    #[instrument(level = "debug", skip(self))]
    pub fn destroy(&mut self) -> usize {
        let released = match self.root {
            Some(root) => self.release_subtree(root),
            None => 0,
        };

        let strays: Vec<NodeId> = self.arena.iter().map(|(idx, _)| idx).collect();
        if !strays.is_empty() {
            debug!(strays = strays.len(), "sweeping detached nodes");
            for idx in strays {
                self.arena.remove(idx);
            }
        }

        self.root = None;
        self.size = 0;
        debug!(released, "tree destroyed");
        released
    }

    /// Pre-order walk: node, left subtree, right subtree.
    pub fn iter(&self) -> TreeIterator<'_> {
        TreeIterator::new(self)
    }

    /// Post-order walk: left subtree, right subtree, node.
    pub fn iter_postorder(&self) -> PostOrderIterator<'_> {
        PostOrderIterator::from_node(self, self.root)
    }

    /// Same shape and same values at corresponding positions.
    pub fn is_isomorphic(&self, other: &Tree) -> bool {
        let mut stack = vec![(self.root, other.root)];
        while let Some(pair) = stack.pop() {
            match pair {
                (None, None) => {}
                (Some(a), Some(b)) => match (self.node(a), other.node(b)) {
                    (Some(x), Some(y)) if x.value == y.value => {
                        stack.push((x.left, y.left));
                        stack.push((x.right, y.right));
                    }
                    _ => return false,
                },
                _ => return false,
            }
        }
        true
    }
}

pub struct TreeIterator<'a> {
    tree: &'a Tree,
    stack: Vec<NodeId>,
}

impl<'a> TreeIterator<'a> {
    fn new(tree: &'a Tree) -> Self {
        Self {
            tree,
            stack: tree.root.into_iter().collect(),
        }
    }
}

impl<'a> Iterator for TreeIterator<'a> {
    type Item = (NodeId, &'a Node);

    fn next(&mut self) -> Option<Self::Item> {
        while let Some(current_idx) = self.stack.pop() {
            if let Some(node) = self.tree.get_node(current_idx) {
                // right first so the left subtree is visited first
                self.stack.extend(node.right);
                self.stack.extend(node.left);
                return Some((current_idx, node));
            }
        }
        None
    }
}

pub struct PostOrderIterator<'a> {
    tree: &'a Tree,
    stack: Vec<(NodeId, bool)>,
}

impl<'a> PostOrderIterator<'a> {
    fn from_node(tree: &'a Tree, top: Option<NodeId>) -> Self {
        Self {
            tree,
            stack: top.map(|idx| (idx, false)).into_iter().collect(),
        }
    }
}

impl<'a> Iterator for PostOrderIterator<'a> {
    type Item = (NodeId, &'a Node);

    fn next(&mut self) -> Option<Self::Item> {
        while let Some((current_idx, visited)) = self.stack.pop() {
            if let Some(node) = self.tree.get_node(current_idx) {
                if visited {
                    return Some((current_idx, node));
                }
                self.stack.push((current_idx, true));
                if let Some(right) = node.right {
                    self.stack.push((right, false));
                }
                if let Some(left) = node.left {
                    self.stack.push((left, false));
                }
            }
        }
        None
    }
}
