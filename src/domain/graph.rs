//! Whole-repository view of the branch hierarchy
//!
//! Built from every stored `parent` entry at once. Edges point from a
//! parent to its children. Uses petgraph for graph operations.

use petgraph::algo::is_cyclic_directed;
use petgraph::graph::{DiGraph, NodeIndex};
use petgraph::Direction;
use serde::Serialize;
use std::collections::{HashMap, HashSet};

use super::branch::BranchName;

/// One row of a rendered hierarchy
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TreeLine {
    pub depth: usize,
    pub branch: BranchName,
}

/// The parent/child graph of all branches that have a recorded parent
#[derive(Debug, Default)]
pub struct BranchTree {
    graph: DiGraph<BranchName, ()>,
    node_map: HashMap<BranchName, NodeIndex>,
}

impl BranchTree {
    pub fn new() -> Self {
        Self::default()
    }

    /// Builds the tree from `(child, parent)` pairs
    pub fn from_parents(entries: impl IntoIterator<Item = (BranchName, BranchName)>) -> Self {
        let mut tree = Self::new();
        for (child, parent) in entries {
            let child_idx = tree.add_branch(child);
            let parent_idx = tree.add_branch(parent);
            tree.graph.update_edge(parent_idx, child_idx, ());
        }
        tree
    }

    /// Adds a branch with no edges, returning its node
    pub fn add_branch(&mut self, branch: BranchName) -> NodeIndex {
        if let Some(idx) = self.node_map.get(&branch) {
            return *idx;
        }
        let idx = self.graph.add_node(branch.clone());
        self.node_map.insert(branch, idx);
        idx
    }

    /// Direct children, sorted by name
    pub fn children(&self, branch: &BranchName) -> Vec<BranchName> {
        let Some(idx) = self.node_map.get(branch) else {
            return vec![];
        };
        let mut children: Vec<_> = self
            .graph
            .neighbors_directed(*idx, Direction::Outgoing)
            .filter_map(|child| self.graph.node_weight(child).cloned())
            .collect();
        children.sort();
        children
    }

    /// Branches nothing points to, sorted by name
    pub fn roots(&self) -> Vec<BranchName> {
        let mut roots: Vec<_> = self
            .graph
            .node_indices()
            .filter(|idx| {
                self.graph
                    .neighbors_directed(*idx, Direction::Incoming)
                    .next()
                    .is_none()
            })
            .filter_map(|idx| self.graph.node_weight(idx).cloned())
            .collect();
        roots.sort();
        roots
    }

    /// Returns true if following parents can loop forever
    pub fn has_cycle(&self) -> bool {
        is_cyclic_directed(&self.graph)
    }

    /// Depth-first listing from every root, children in name order.
    ///
    /// Branches caught in a cycle are not reachable from a root and are
    /// left out.
    pub fn walk(&self) -> Vec<TreeLine> {
        let mut lines = Vec::new();
        let mut visited = HashSet::new();
        for root in self.roots() {
            self.walk_from(&root, 0, &mut visited, &mut lines);
        }
        lines
    }

    fn walk_from(
        &self,
        branch: &BranchName,
        depth: usize,
        visited: &mut HashSet<BranchName>,
        lines: &mut Vec<TreeLine>,
    ) {
        if !visited.insert(branch.clone()) {
            return;
        }
        lines.push(TreeLine {
            depth,
            branch: branch.clone(),
        });
        for child in self.children(branch) {
            self.walk_from(&child, depth + 1, visited, lines);
        }
    }
}
