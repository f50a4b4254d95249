//! Canonical-path index over a forest.
//!
//! Keys are slash-separated node names from a forest root (`Mesh`,
//! `Kernels/New_Kernel/<type>`). Values are positional [`Address`]es, so the
//! index never borrows the forest and stays valid until the forest's shape
//! changes.

use std::collections::BTreeMap;

use crate::node::{node_at, Address, Node};

#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct PathIndex {
    paths: BTreeMap<String, Address>,
}

impl PathIndex {
    /// Pre-order, depth-first walk using an explicit stack.
    ///
    /// Each stack entry carries the path of its parent, so the path of a
    /// popped node is always its logical ancestor chain regardless of how
    /// deep the previous branch went. When two nodes share a path the one
    /// visited later wins.
    pub fn build(forest: &[Node]) -> Self {
        let mut paths = BTreeMap::new();
        let mut stack: Vec<(Address, String)> = (0..forest.len())
            .rev()
            .map(|i| (vec![i], String::new()))
            .collect();

        while let Some((address, parent)) = stack.pop() {
            let Some(node) = node_at(forest, &address) else {
                continue;
            };
            let path = if parent.is_empty() {
                node.name.clone()
            } else {
                format!("{}/{}", parent, node.name)
            };

            for i in (0..node.branches().len()).rev() {
                let mut child = address.clone();
                child.push(i);
                stack.push((child, path.clone()));
            }

            paths.insert(path, address);
        }

        Self { paths }
    }

    pub fn get(&self, path: &str) -> Option<&Address> {
        self.paths.get(path)
    }

    pub fn contains(&self, path: &str) -> bool {
        self.paths.contains_key(path)
    }

    /// All indexed paths in lexical order.
    pub fn paths(&self) -> impl Iterator<Item = &str> {
        self.paths.keys().map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.paths.len()
    }

    pub fn is_empty(&self) -> bool {
        self.paths.is_empty()
    }
}

/// The path of the parent position, or `None` for a forest root.
pub fn parent_path(path: &str) -> Option<&str> {
    path.rsplit_once('/').map(|(parent, _)| parent)
}
