//! Arena storage for forest nodes.
//!
//! Nodes refer to each other by index, which keeps the cyclic
//! parent/sibling/child links cheap to rewrite during deletions and
//! concentrates lifetime control in the arena's free list.
use serde::{Deserialize, Serialize};

use merkle::Hash;

/// Index of a `Node` within a forest's heap storage.
pub(crate) type NodeIndex = usize;

/// Node represents a leaf or an intermediate node in one of the trees.
/// Leaves have `children = None`. Roots have `parent = None` and
/// `sibling = None`; every other node carries both links.
#[derive(Copy, Clone, PartialEq, Debug, Serialize, Deserialize)]
pub(crate) struct Node {
    pub(crate) hash: Hash,
    pub(crate) index: NodeIndex,
    pub(crate) parent: Option<NodeIndex>,
    /// Sibling index, with `true` when the sibling is the left child.
    pub(crate) sibling: Option<(NodeIndex, bool)>,
    pub(crate) children: Option<(NodeIndex, NodeIndex)>,
}

/// Storage of all the nodes with methods to access them.
/// Freed slots are recycled through a free list.
#[derive(Clone, Serialize, Deserialize)]
pub(crate) struct Heap {
    storage: Vec<Option<Node>>,
    free: Vec<NodeIndex>,
}

impl Heap {
    pub(crate) fn with_capacity(cap: usize) -> Self {
        Heap {
            storage: Vec::with_capacity(cap),
            free: Vec::new(),
        }
    }

    /// Number of live nodes.
    pub(crate) fn len(&self) -> usize {
        self.storage.len() - self.free.len()
    }

    pub(crate) fn node_at(&self, i: NodeIndex) -> Node {
        match self.storage[i] {
            Some(node) => node,
            None => panic!("forest corrupted: node {} was freed", i),
        }
    }

    /// Allocates an unlinked node, reusing a freed slot when available.
    pub(crate) fn allocate(&mut self, hash: Hash) -> Node {
        let index = match self.free.pop() {
            Some(index) => index,
            None => {
                self.storage.push(None);
                self.storage.len() - 1
            }
        };
        let node = Node {
            hash,
            index,
            parent: None,
            sibling: None,
            children: None,
        };
        self.storage[index] = Some(node);
        node
    }

    /// Allocates a parent over `left` and `right` and wires both links on
    /// both children: parent back-links and mutual sibling entries.
    pub(crate) fn allocate_parent(
        &mut self,
        hash: Hash,
        left: NodeIndex,
        right: NodeIndex,
    ) -> Node {
        let parent = {
            let mut node = self.allocate(hash);
            node.children = Some((left, right));
            self.storage[node.index] = Some(node);
            node
        };
        self.update(left, |n| {
            n.parent = Some(parent.index);
            n.sibling = Some((right, false));
        });
        self.update(right, |n| {
            n.parent = Some(parent.index);
            n.sibling = Some((left, true));
        });
        parent
    }

    pub(crate) fn update(&mut self, i: NodeIndex, closure: impl FnOnce(&mut Node)) -> Node {
        let mut node = self.node_at(i);
        closure(&mut node);
        self.storage[i] = Some(node);
        node
    }

    /// Releases a node's slot for reuse. Links into the node become
    /// dangling; callers must have rewired or discarded them already.
    pub(crate) fn free(&mut self, i: NodeIndex) {
        if self.storage[i].take().is_some() {
            self.free.push(i);
        }
    }
}
