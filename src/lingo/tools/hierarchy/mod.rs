//! Reconstruction of a nested tree from a flat, level-annotated row list.
//!
//! Levels are only compared between neighbours: a row nests under the
//! closest preceding row whose level is strictly smaller. The tree is built
//! with an explicit stack of open ancestors so that the input depth never
//! translates into call-stack depth.

use std::fmt::{self, Write as _};

use crate::lingo::tools::error::{Result, ToolError};
use crate::lingo::tools::model::Row;

/// Identifier of the synthetic root that every tree hangs from.
pub const ROOT_ID: &str = "0";
/// Display name of the synthetic root.
pub const ROOT_NAME: &str = "Root";

/// A row together with its ordered children.
///
/// `Clone`, `PartialEq` and `Debug` walk the subtree with an explicit stack,
/// like `Drop`, so they are safe on arbitrarily deep trees.
pub struct Node {
    pub row: Row,
    pub children: Vec<Node>,
}

impl Node {
    pub fn new(row: Row) -> Self {
        Self {
            row,
            children: Vec::new(),
        }
    }

    /// Creates the synthetic root (id `"0"`, level 0).
    pub fn root() -> Self {
        Self::new(Row::new(ROOT_ID, ROOT_NAME, 0))
    }

    pub fn add_child(&mut self, child: Node) {
        self.children.push(child);
    }

    /// Pre-order walk over all descendants, yielding each node with its tree
    /// depth (direct children of `self` have depth 1).
    pub fn descendants(&self) -> Descendants<'_> {
        Descendants {
            stack: vec![(1, self.children.iter())],
        }
    }

    /// Number of nodes below `self`.
    pub fn descendant_count(&self) -> usize {
        self.descendants().count()
    }

    /// Renders the tree as an indented outline, one node per line.
    pub fn outline(&self) -> String {
        let mut out = format!("{} - {}\n", self.row.id, self.row.name);
        for (depth, node) in self.descendants() {
            let indent = " ".repeat(depth * 4);
            let _ = writeln!(out, "{indent}└── {} - {}", node.row.level, node.row.name);
        }
        out
    }
}

impl Clone for Node {
    fn clone(&self) -> Self {
        // open[d] is the copy of the most recent node at depth d.
        let mut open = vec![Node::new(self.row.clone())];
        for (depth, node) in self.descendants() {
            while open.len() > depth {
                close_top(&mut open);
            }
            open.push(Node::new(node.row.clone()));
        }
        while open.len() > 1 {
            close_top(&mut open);
        }
        open.pop().unwrap_or_else(|| Node::new(self.row.clone()))
    }
}

impl PartialEq for Node {
    // A pre-order walk with depths determines the shape of the tree.
    fn eq(&self, other: &Self) -> bool {
        self.row == other.row
            && self
                .descendants()
                .map(|(depth, node)| (depth, &node.row))
                .eq(other.descendants().map(|(depth, node)| (depth, &node.row)))
    }
}

impl fmt::Debug for Node {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let descendants: Vec<(usize, &Row)> = self
            .descendants()
            .map(|(depth, node)| (depth, &node.row))
            .collect();
        f.debug_struct("Node")
            .field("row", &self.row)
            .field("descendants", &descendants)
            .finish()
    }
}

impl Drop for Node {
    // Flattens the subtree first so that dropping a deep tree stays iterative.
    fn drop(&mut self) {
        let mut pending = std::mem::take(&mut self.children);
        while let Some(mut node) = pending.pop() {
            pending.append(&mut node.children);
        }
    }
}

/// Iterator returned by [`Node::descendants`].
pub struct Descendants<'a> {
    stack: Vec<(usize, std::slice::Iter<'a, Node>)>,
}

impl<'a> Iterator for Descendants<'a> {
    type Item = (usize, &'a Node);

    fn next(&mut self) -> Option<Self::Item> {
        loop {
            let (depth, iter) = self.stack.last_mut()?;
            let depth = *depth;
            match iter.next() {
                Some(node) => {
                    if !node.children.is_empty() {
                        self.stack.push((depth + 1, node.children.iter()));
                    }
                    return Some((depth, node));
                }
                None => {
                    self.stack.pop();
                }
            }
        }
    }
}

/// Builds the tree for `rows` beneath a fresh synthetic root.
///
/// Each row becomes a child of the nearest open ancestor whose level is
/// strictly smaller than its own. The root itself is never closed, so rows
/// at level 0 attach directly to it.
pub fn build_tree(rows: &[Row]) -> Result<Node> {
    let (first, rest) = rows.split_first().ok_or_else(|| {
        ToolError::InvalidInput("cannot build a tree from an empty row list".into())
    })?;

    let mut stack: Vec<Node> = vec![Node::root(), Node::new(first.clone())];
    let mut previous_level = first.level;

    for row in rest {
        if previous_level >= row.level {
            while stack.len() > 1 && top_level(&stack) >= row.level {
                close_top(&mut stack);
            }
        }
        stack.push(Node::new(row.clone()));
        previous_level = row.level;
    }

    while stack.len() > 1 {
        close_top(&mut stack);
    }
    stack
        .pop()
        .ok_or_else(|| ToolError::InvalidInput("tree stack unexpectedly empty".into()))
}

fn top_level(stack: &[Node]) -> u32 {
    stack.last().map(|node| node.row.level).unwrap_or(0)
}

/// Pops the innermost open node and attaches it to its parent. Siblings are
/// closed in input order, so children keep the source row order.
fn close_top(stack: &mut Vec<Node>) {
    if let Some(node) = stack.pop() {
        if let Some(parent) = stack.last_mut() {
            parent.add_child(node);
        }
    }
}
