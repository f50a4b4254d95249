//! Hard-path resolution: promote `<type>` exemplar groups into
//! type-selectable nodes.
//!
//! The action-syntax file lists every canonical path an application knows.
//! Paths ending in `*` are wildcard positions and are ignored; the remaining
//! "hard" paths name concrete positions. When the schema node at such a path
//! has an exemplar literally named `<type>`, that exemplar's own exemplars
//! are the types a user may choose from there.

use serde::Serialize;
use tracing::{debug, info};

use crate::node::{node_at_mut, Node};
use crate::path_index::PathIndex;

/// Exemplar name marking a group of selectable types.
pub const TYPE_PLACEHOLDER: &str = "<type>";

/// Filter action-syntax text down to unique hard paths, in file order.
///
/// Trailing `\r` is stripped, lines ending in `*` and empty lines are
/// dropped, and a line equal to the previously kept line is dropped.
pub fn parse_hard_paths(text: &str) -> Vec<String> {
    let mut paths: Vec<String> = Vec::new();
    for line in text.lines() {
        let line = line.strip_suffix('\r').unwrap_or(line);
        if line.is_empty() || line.ends_with('*') {
            continue;
        }
        if paths.last().map(String::as_str) == Some(line) {
            continue;
        }
        paths.push(line.to_string());
    }
    paths
}

/// What a resolution pass did.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize)]
pub struct ResolutionReport {
    /// Paths whose nodes were promoted, in processing order.
    pub promoted: Vec<String>,
    /// Paths that were absent or had nothing to promote.
    pub skipped: usize,
}

pub struct HardPathResolver;

impl HardPathResolver {
    /// Promote every listed path that has a `<type>` exemplar.
    ///
    /// The node is rewritten in place through its owning parent, so the
    /// parent's exemplar list holds the promoted node without re-linking.
    /// The index is rebuilt after each promotion because removing the
    /// `<type>` exemplar shifts sibling addresses.
    pub fn resolve(
        forest: &mut [Node],
        index: &mut PathIndex,
        paths: &[String],
    ) -> ResolutionReport {
        let mut report = ResolutionReport::default();

        for path in paths {
            let promoted = match index.get(path).cloned() {
                Some(address) => node_at_mut(forest, &address).is_some_and(promote),
                None => false,
            };

            if promoted {
                debug!("Promoted {} to a type-selectable node", path);
                *index = PathIndex::build(forest);
                report.promoted.push(path.clone());
            } else {
                debug!("Hard path {} has nothing to resolve", path);
                report.skipped += 1;
            }
        }

        info!(
            "Resolved {} hard paths ({} skipped)",
            report.promoted.len(),
            report.skipped
        );
        report
    }
}

/// Turn a node with a `<type>` exemplar into an adaptive node.
///
/// The node's own entries are merged into every candidate type unless the
/// candidate already has an entry of that name.
fn promote(node: &mut Node) -> bool {
    let Some(position) = node
        .exemplars()
        .iter()
        .position(|e| e.name == TYPE_PLACEHOLDER)
    else {
        return false;
    };

    let mut candidates = node.remove_exemplar(position).exemplars().to_vec();
    for candidate in &mut candidates {
        for entry in node.parameters().entries() {
            if !candidate.parameters().contains(&entry.name) {
                candidate.parameters_mut().push(entry.clone());
            }
        }
    }

    node.promote(candidates);
    true
}
