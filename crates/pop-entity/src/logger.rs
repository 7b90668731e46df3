//! `LoggerNode` — binary-tree lineage logging for `LoggedAgent`s.
//!
//! Every tracked lineage shares one arena-backed tree (`LoggerTree`); each
//! agent descended from the tracked root holds only the index of its
//! current node. On clone, the current node branches into two children —
//! the parent keeps the left child, the new agent gets the right. Storing
//! the tree as an arena of indices rather than `Rc<RefCell<Node>>` per node
//! avoids a parent/child ownership cycle, using the same "arena + index"
//! idiom as the channel dependency graphs.

use std::cell::RefCell;
use std::rc::Rc;

struct NodeData<AS> {
    parent: Option<usize>,
    lchild: Option<usize>,
    rchild: Option<usize>,
    tstamp: Vec<f64>,
    estamp: Vec<&'static str>,
    log: Vec<AS>,
}

/// Arena holding one lineage's full tree of log nodes.
pub struct LoggerTree<AS> {
    nodes: Vec<NodeData<AS>>,
}

impl<AS> LoggerTree<AS> {
    fn new() -> Self {
        Self { nodes: Vec::new() }
    }

    fn push(&mut self, parent: Option<usize>) -> usize {
        let id = self.nodes.len();
        self.nodes.push(NodeData {
            parent,
            lchild: None,
            rchild: None,
            tstamp: Vec::new(),
            estamp: Vec::new(),
            log: Vec::new(),
        });
        id
    }

    pub fn record(&mut self, node: usize, time: f64, channel_id: &'static str, snapshot: AS) {
        let n = &mut self.nodes[node];
        n.tstamp.push(time);
        n.estamp.push(channel_id);
        n.log.push(snapshot);
    }

    /// Split `node` into two fresh children, returning `(left, right)`.
    pub fn branch(&mut self, node: usize) -> (usize, usize) {
        let left = self.push(Some(node));
        let right = self.push(Some(node));
        self.nodes[node].lchild = Some(left);
        self.nodes[node].rchild = Some(right);
        (left, right)
    }

    /// Breadth-first node ids starting from `root`.
    pub fn traverse_bfs(&self, root: usize) -> Vec<usize> {
        let mut order = Vec::new();
        let mut queue = std::collections::VecDeque::new();
        queue.push_back(root);
        while let Some(id) = queue.pop_front() {
            order.push(id);
            let n = &self.nodes[id];
            if let Some(l) = n.lchild {
                queue.push_back(l);
            }
            if let Some(r) = n.rchild {
                queue.push_back(r);
            }
        }
        order
    }

    /// Preorder adjacency list `(parent, child)` for `root` and every
    /// descendant, suitable for lineage export.
    pub fn adjacency_list(&self, root: usize) -> Vec<(Option<usize>, usize)> {
        let mut out = Vec::new();
        self.preorder(root, &mut out);
        out
    }

    fn preorder(&self, node: usize, out: &mut Vec<(Option<usize>, usize)>) {
        let n = &self.nodes[node];
        out.push((n.parent, node));
        if let Some(l) = n.lchild {
            self.preorder(l, out);
        }
        if let Some(r) = n.rchild {
            self.preorder(r, out);
        }
    }

    pub fn event_count(&self, node: usize) -> usize {
        self.nodes[node].log.len()
    }

    pub fn events(&self, node: usize) -> impl Iterator<Item = (f64, &'static str, &AS)> {
        let n = &self.nodes[node];
        n.tstamp
            .iter()
            .copied()
            .zip(n.estamp.iter().copied())
            .zip(n.log.iter())
            .map(|((t, e), s)| (t, e, s))
    }
}

/// A lineage-tracked agent's handle into its shared `LoggerTree`.
pub struct LoggerHandle<AS> {
    tree: Rc<RefCell<LoggerTree<AS>>>,
    node: usize,
}

impl<AS> Clone for LoggerHandle<AS> {
    fn clone(&self) -> Self {
        Self {
            tree: Rc::clone(&self.tree),
            node: self.node,
        }
    }
}

impl<AS> LoggerHandle<AS> {
    /// Start tracking a new lineage rooted at the current agent.
    pub fn new_root() -> Self {
        let mut tree = LoggerTree::new();
        let root = tree.push(None);
        Self {
            tree: Rc::new(RefCell::new(tree)),
            node: root,
        }
    }

    pub fn record(&self, time: f64, channel_id: &'static str, snapshot: AS) {
        self.tree.borrow_mut().record(self.node, time, channel_id, snapshot);
    }

    /// Branch on clone: the caller keeps this handle pointed at the left
    /// child; the returned handle (for the new agent) points at the right.
    pub fn branch(&mut self) -> Self {
        let (l, r) = self.tree.borrow_mut().branch(self.node);
        self.node = l;
        Self {
            tree: Rc::clone(&self.tree),
            node: r,
        }
    }

    pub fn tree(&self) -> std::cell::Ref<'_, LoggerTree<AS>> {
        self.tree.borrow()
    }

    pub fn node_id(&self) -> usize {
        self.node
    }
}
