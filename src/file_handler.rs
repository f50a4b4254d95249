//! Reading and writing MOOSE input files
//!
//! Each entry point performs one whole-file read or write and hands the text
//! to the `moose-core` engine:
//! - `.yaml` schemas are loaded with file-name options and hard-path
//!   resolution from the sibling action-syntax file
//! - `.i` instances are parsed and their `variable` entries constrained

use std::ffi::OsStr;
use std::io;
use std::path::{Path, PathBuf};

use moose_core::{
    Entry, EntrySearch, FsFileLister, InstanceLoader, InstanceSerializer, MooseError, Node,
    Schema, SchemaLoader, VariableConstrainer,
};
use serde::Serialize;
use thiserror::Error;
use tracing::{debug, info, warn};

use crate::config::LoaderConfig;

/// Name of the synthetic node holding a document's top-level blocks.
pub const ROOT_NAME: &str = "Input Data";
/// Description of the synthetic root node.
pub const ROOT_DESCRIPTION: &str = "The tree of input data for this problem.";

#[derive(Debug, Error)]
pub enum HandlerError {
    #[error(transparent)]
    Moose(#[from] MooseError),

    #[error("Failed to {action} {}: {source}", .path.display())]
    Io {
        action: &'static str,
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("Unsupported input file {}: expected a .yaml schema or a .i instance", .0.display())]
    UnsupportedFile(PathBuf),

    #[error("Invalid search pattern: {0}")]
    Pattern(#[from] regex::Error),
}

impl HandlerError {
    pub fn code(&self) -> &'static str {
        match self {
            Self::Moose(e) => e.code(),
            Self::Io { .. } => "IO_FAILURE",
            Self::UnsupportedFile(_) => "UNSUPPORTED_FILE",
            Self::Pattern(_) => "INVALID_PATTERN",
        }
    }

    fn io(action: &'static str, path: &Path, source: io::Error) -> Self {
        Self::Io {
            action,
            path: path.to_path_buf(),
            source,
        }
    }
}

pub type Result<T> = std::result::Result<T, HandlerError>;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
pub enum DocumentKind {
    Schema,
    Instance,
}

impl DocumentKind {
    /// Classify a path by its (case-insensitive) extension.
    pub fn from_path(path: &Path) -> Option<Self> {
        let ext = path.extension().and_then(OsStr::to_str)?.to_ascii_lowercase();
        match ext.as_str() {
            "yaml" => Some(Self::Schema),
            "i" => Some(Self::Instance),
            _ => None,
        }
    }
}

/// A file's top-level blocks gathered under one root node.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct InputDocument {
    pub kind: DocumentKind,
    pub root: Node,
}

impl InputDocument {
    fn new(kind: DocumentKind, blocks: Vec<Node>) -> Result<Self> {
        let mut root = match kind {
            DocumentKind::Schema => Node::schema(ROOT_NAME),
            DocumentKind::Instance => Node::instance(ROOT_NAME),
        };
        root.description = ROOT_DESCRIPTION.to_string();
        for block in blocks {
            match kind {
                DocumentKind::Schema => root.push_exemplar(block)?,
                DocumentKind::Instance => root.push_child(block)?,
            }
        }
        Ok(Self { kind, root })
    }

    /// The top-level blocks.
    pub fn blocks(&self) -> &[Node] {
        self.root.branches()
    }
}

pub struct FileHandler {
    config: LoaderConfig,
}

impl Default for FileHandler {
    fn default() -> Self {
        Self::new(LoaderConfig::default())
    }
}

impl FileHandler {
    pub fn new(config: LoaderConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &LoaderConfig {
        &self.config
    }

    /// Load a YAML schema, offering project files as file-name options and
    /// promoting the hard paths of the sibling action-syntax file.
    ///
    /// A missing action-syntax file only skips resolution.
    pub fn load_schema(&self, path: &Path) -> Result<Schema> {
        let text = read_file(path)?;

        let mut loader = SchemaLoader::new();
        if let Some(dir) = self.config.project_dir_for(path) {
            debug!("Listing file options from {}", dir.display());
            loader = loader.with_file_options(dir, FsFileLister);
        }
        let mut schema = loader.load(&text)?;

        if self.config.resolve_hard_paths {
            let syntax_path = self.config.syntax_path(path);
            match std::fs::read_to_string(&syntax_path) {
                Ok(syntax) => {
                    let report = schema.resolve_hard_paths(&syntax);
                    info!(
                        "Promoted {} type groups from {}",
                        report.promoted.len(),
                        syntax_path.display()
                    );
                }
                Err(e) if e.kind() == io::ErrorKind::NotFound => {
                    warn!(
                        "No action syntax file at {}; type groups left unresolved",
                        syntax_path.display()
                    );
                }
                Err(e) => return Err(HandlerError::io("read", &syntax_path, e)),
            }
        }

        Ok(schema)
    }

    /// Load a GetPot instance and constrain its `variable` entries.
    pub fn load_instance(&self, path: &Path) -> Result<Vec<Node>> {
        let text = read_file(path)?;
        let mut forest = InstanceLoader::load(&text)?;
        if self.config.constrain_variables {
            VariableConstrainer::constrain(&mut forest);
        }
        Ok(forest)
    }

    /// Load a schema or an instance depending on the file extension.
    pub fn read(&self, path: &Path) -> Result<InputDocument> {
        let kind = DocumentKind::from_path(path)
            .ok_or_else(|| HandlerError::UnsupportedFile(path.to_path_buf()))?;
        let blocks = match kind {
            DocumentKind::Schema => self.load_schema(path)?.into_roots(),
            DocumentKind::Instance => self.load_instance(path)?,
        };
        info!("Read {} blocks from {}", blocks.len(), path.display());
        InputDocument::new(kind, blocks)
    }

    /// Serialize an instance forest to `path`, replacing its contents.
    pub fn write(&self, path: &Path, forest: &[Node]) -> Result<()> {
        let text = InstanceSerializer::serialize(forest);
        std::fs::write(path, text).map_err(|e| HandlerError::io("write", path, e))?;
        info!("Wrote {} blocks to {}", forest.len(), path.display());
        Ok(())
    }

    /// Entries of `path` whose `"name = value"` text fully matches `pattern`.
    pub fn find_all(&self, path: &Path, pattern: &str) -> Result<Vec<Entry>> {
        let search = EntrySearch::new(pattern)?;
        let document = self.read(path)?;
        Ok(search.find(document.blocks()))
    }
}

fn read_file(path: &Path) -> Result<String> {
    std::fs::read_to_string(path).map_err(|e| HandlerError::io("read", path, e))
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_document_kind_from_extension() {
        assert_eq!(
            DocumentKind::from_path(Path::new("a/app.yaml")),
            Some(DocumentKind::Schema)
        );
        assert_eq!(
            DocumentKind::from_path(Path::new("input.I")),
            Some(DocumentKind::Instance)
        );
        assert_eq!(DocumentKind::from_path(Path::new("notes.txt")), None);
        assert_eq!(DocumentKind::from_path(Path::new("Makefile")), None);
    }

    #[test]
    fn test_unsupported_file_is_rejected_before_reading() {
        let err = FileHandler::default()
            .read(Path::new("/nonexistent/run.txt"))
            .unwrap_err();
        assert_eq!(err.code(), "UNSUPPORTED_FILE");
    }

    #[test]
    fn test_missing_file_reports_path() {
        let err = FileHandler::default()
            .load_instance(Path::new("/nonexistent/run.i"))
            .unwrap_err();
        assert_eq!(err.code(), "IO_FAILURE");
        assert!(err.to_string().contains("/nonexistent/run.i"));
    }

    #[test]
    fn test_invalid_pattern_is_rejected() {
        let err = FileHandler::default()
            .find_all(Path::new("/nonexistent/run.i"), "(")
            .unwrap_err();
        assert_eq!(err.code(), "INVALID_PATTERN");
    }

    #[test]
    fn test_root_node_wraps_blocks() {
        let doc = InputDocument::new(
            DocumentKind::Instance,
            vec![Node::instance("Mesh"), Node::instance("Kernels")],
        )
        .unwrap();
        assert_eq!(doc.root.name, ROOT_NAME);
        assert_eq!(doc.root.description, ROOT_DESCRIPTION);
        assert_eq!(doc.blocks().len(), 2);
        assert_eq!(doc.blocks()[1].id, 3);
    }

    #[test]
    fn test_schema_root_holds_blocks_as_exemplars() {
        let doc = InputDocument::new(DocumentKind::Schema, vec![Node::schema("Mesh")]).unwrap();
        assert_eq!(doc.root.exemplars().len(), 1);
        assert!(doc.root.children().is_empty());
        assert_eq!(doc.blocks()[0].name, "Mesh");
    }
}
