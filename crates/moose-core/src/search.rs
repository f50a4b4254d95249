//! Regex search over the live entries of an instance forest.

use regex::Regex;

use crate::entry::Entry;
use crate::node::{breadth_first, node_at, Node};

/// Entry names too generic to identify a match on their own.
const GENERIC_FILE_NAMES: [&str; 2] = ["file", "data_file"];

/// A whole-line pattern matched against `"name = value"`.
#[derive(Clone, Debug)]
pub struct EntrySearch {
    pattern: Regex,
}

impl EntrySearch {
    /// Compile `pattern`. It must match the entire `"name = value"` text,
    /// not just part of it.
    pub fn new(pattern: &str) -> Result<Self, regex::Error> {
        let pattern = Regex::new(&format!("^(?:{})$", pattern))?;
        Ok(Self { pattern })
    }

    pub fn is_match(&self, entry: &Entry) -> bool {
        entry.is_enabled()
            && !entry.value().is_empty()
            && self
                .pattern
                .is_match(&format!("{} = {}", entry.name, entry.value()))
    }

    /// Copies of the matching entries of active nodes, breadth first.
    ///
    /// Matches named `file` or `data_file` are renamed after their node.
    pub fn find(&self, forest: &[Node]) -> Vec<Entry> {
        let mut found = Vec::new();
        for visit in breadth_first(forest) {
            let Some(node) = node_at(forest, &visit.address) else {
                continue;
            };
            if !node.active {
                continue;
            }
            for entry in node.active_parameters().entries() {
                if !self.is_match(entry) {
                    continue;
                }
                let mut hit = entry.clone();
                let lowered = hit.name.to_lowercase();
                if GENERIC_FILE_NAMES.contains(&lowered.as_str()) {
                    hit.name = node.name.clone();
                }
                found.push(hit);
            }
        }
        found
    }
}

/// Compile `pattern` and search `forest` in one step.
pub fn find_entries(forest: &[Node], pattern: &str) -> Result<Vec<Entry>, regex::Error> {
    Ok(EntrySearch::new(pattern)?.find(forest))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::instance::InstanceLoader;
    use pretty_assertions::assert_eq;

    const INPUT: &str = "\
[Mesh]
  file = reactor.e
  # backup = old.e
[]
[UserObjects]
  [./reader]
    Data_File = power.csv
    empty =
  [../]
[]
#[Outputs]
#  file = hidden.e
#[]
";

    #[test]
    fn test_finds_file_entries_and_renames_generic_names() {
        let forest = InstanceLoader::load(INPUT).unwrap();
        let hits = find_entries(&forest, r".* = .*\.(e|csv)").unwrap();
        let found: Vec<_> = hits
            .iter()
            .map(|e| (e.name.as_str(), e.value()))
            .collect();
        assert_eq!(found, vec![("Mesh", "reactor.e"), ("reader", "power.csv")]);
    }

    #[test]
    fn test_pattern_must_match_whole_line() {
        let forest = InstanceLoader::load(INPUT).unwrap();
        assert!(find_entries(&forest, "reactor").unwrap().is_empty());
        assert_eq!(find_entries(&forest, "file = reactor.e").unwrap().len(), 1);
    }

    #[test]
    fn test_skips_disabled_and_empty_entries() {
        let forest = InstanceLoader::load(INPUT).unwrap();
        assert!(find_entries(&forest, "backup = .*").unwrap().is_empty());
        assert!(find_entries(&forest, "empty = .*").unwrap().is_empty());
    }

    #[test]
    fn test_invalid_pattern_is_an_error() {
        assert!(EntrySearch::new("(unclosed").is_err());
    }
}
