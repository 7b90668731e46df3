//! Flattening a lineage-tracked agent's [`LoggerTree`] into export rows.
//!
//! `pop-output` never reaches into a model's agent state type, so this is a
//! free function rather than an `OutputWriter` method: callers walk the
//! population's live `LoggerHandle`s themselves after a run and pass the
//! flattened rows to whichever backend they chose.

use pop_entity::LoggerTree;

use crate::row::LineageRow;

/// Preorder adjacency rows for the lineage tree rooted at `root`.
pub fn lineage_rows<AS>(tree: &LoggerTree<AS>, root: usize) -> Vec<LineageRow> {
    tree.adjacency_list(root)
        .into_iter()
        .map(|(parent, node)| LineageRow {
            node: node as u32,
            parent_node: parent.map(|p| p as u32),
        })
        .collect()
}
