//! YAML schema loading
//!
//! A schema document is a YAML list of block maps, as dumped by a MOOSE
//! application's `--yaml` option. Loading produces a forest of schema nodes
//! (sub-blocks become exemplars) indexed by canonical path, ready for
//! hard-path resolution.

use std::path::{Path, PathBuf};

use serde_yaml::Value;
use tracing::{debug, info};

use crate::block::Block;
use crate::error::{MooseError, Result};
use crate::hard_path::{parse_hard_paths, HardPathResolver, ResolutionReport};
use crate::node::{node_at, Node};
use crate::path_index::PathIndex;

/// Type tags containing this marker get their options from a directory
/// listing.
const FILE_NAME_MARKER: &str = "FileName";

/// Directory-listing collaborator used to offer file names as options.
pub trait FileLister {
    /// Names of the regular, non-hidden files directly inside `dir`.
    fn list_files(&self, dir: &Path) -> std::io::Result<Vec<String>>;
}

/// [`FileLister`] backed by the local file system. Names are sorted.
#[derive(Clone, Copy, Debug, Default)]
pub struct FsFileLister;

impl FileLister for FsFileLister {
    fn list_files(&self, dir: &Path) -> std::io::Result<Vec<String>> {
        let mut names = Vec::new();
        for entry in std::fs::read_dir(dir)? {
            let entry = entry?;
            if entry.file_type()?.is_dir() {
                continue;
            }
            let name = entry.file_name().to_string_lossy().into_owned();
            if !name.starts_with('.') {
                names.push(name);
            }
        }
        names.sort();
        Ok(names)
    }
}

/// A loaded schema forest and its path index.
#[derive(Clone, Debug)]
pub struct Schema {
    roots: Vec<Node>,
    index: PathIndex,
}

impl Schema {
    pub fn new(roots: Vec<Node>) -> Self {
        let index = PathIndex::build(&roots);
        Self { roots, index }
    }

    pub fn roots(&self) -> &[Node] {
        &self.roots
    }

    pub fn into_roots(self) -> Vec<Node> {
        self.roots
    }

    pub fn index(&self) -> &PathIndex {
        &self.index
    }

    /// Look up a node by canonical path.
    pub fn get(&self, path: &str) -> Option<&Node> {
        self.index
            .get(path)
            .and_then(|address| node_at(&self.roots, address))
    }

    /// Promote the `<type>` groups named by an action-syntax document.
    pub fn resolve_hard_paths(&mut self, action_syntax: &str) -> ResolutionReport {
        let paths = parse_hard_paths(action_syntax);
        HardPathResolver::resolve(&mut self.roots, &mut self.index, &paths)
    }
}

/// Parses schema documents into [`Schema`] forests.
pub struct SchemaLoader {
    file_options: Option<(PathBuf, Box<dyn FileLister>)>,
}

impl Default for SchemaLoader {
    fn default() -> Self {
        Self::new()
    }
}

impl SchemaLoader {
    /// A loader that leaves file-name parameters without options.
    pub fn new() -> Self {
        Self { file_options: None }
    }

    /// Offer the files of `dir` as options on every file-name parameter.
    pub fn with_file_options(
        mut self,
        dir: impl Into<PathBuf>,
        lister: impl FileLister + 'static,
    ) -> Self {
        self.file_options = Some((dir.into(), Box::new(lister)));
        self
    }

    /// Parse the YAML document into top-level blocks.
    ///
    /// An empty document yields no blocks; anything other than a list of
    /// block maps is rejected as a whole.
    pub fn parse_blocks(&self, text: &str) -> Result<Vec<Block>> {
        if text.trim().is_empty() {
            return Ok(Vec::new());
        }
        let document: Value = serde_yaml::from_str(text)
            .map_err(|e| MooseError::schema(format!("invalid YAML: {}", e)))?;

        let items = match document {
            Value::Null => return Ok(Vec::new()),
            Value::Sequence(items) => items,
            _ => return Err(MooseError::schema("document is not a list of blocks")),
        };

        let mut blocks = Vec::with_capacity(items.len());
        for item in &items {
            let block = Block::from_schema_value(item)?;
            debug!("Parsed schema block {}", block.name);
            blocks.push(block);
        }
        Ok(blocks)
    }

    /// Parse, attach file options, convert to nodes and index.
    pub fn load(&self, text: &str) -> Result<Schema> {
        let mut blocks = self.parse_blocks(text)?;
        self.apply_file_options(&mut blocks)?;

        let roots: Vec<Node> = blocks.into_iter().map(Block::into_schema_node).collect();
        let schema = Schema::new(roots);

        info!(
            "Loaded {} schema blocks with {} indexed paths",
            schema.roots.len(),
            schema.index.len()
        );
        Ok(schema)
    }

    /// Load and immediately resolve hard paths.
    pub fn load_with_syntax(&self, text: &str, action_syntax: &str) -> Result<Schema> {
        let mut schema = self.load(text)?;
        schema.resolve_hard_paths(action_syntax);
        Ok(schema)
    }

    fn apply_file_options(&self, blocks: &mut [Block]) -> Result<()> {
        let Some((dir, lister)) = &self.file_options else {
            return Ok(());
        };

        let mut needs_listing = false;
        for block in blocks.iter_mut() {
            block.for_each_parameter_mut(&mut |p| {
                needs_listing |= p.type_tag.contains(FILE_NAME_MARKER);
            });
        }
        if !needs_listing {
            return Ok(());
        }

        let files = lister.list_files(dir)?;
        debug!("Offering {} files from {}", files.len(), dir.display());
        for block in blocks.iter_mut() {
            block.for_each_parameter_mut(&mut |p| {
                if p.type_tag.contains(FILE_NAME_MARKER) {
                    p.set_options(files.clone());
                }
            });
        }
        Ok(())
    }
}
