//! moose-input: MOOSE input files on disk
//!
//! Thin file-handling layer over `moose-core`:
//! - `FileHandler` reads `.yaml` schemas and `.i` instances, writes
//!   instances and searches them
//! - `LoaderConfig` controls project-directory discovery, hard-path
//!   resolution and variable constraining
//!
//! The `moose-input` binary (feature `cli`) exposes the same operations on
//! the command line.

pub mod config;
pub mod file_handler;

pub use config::{LoaderConfig, PROJECT_DIR_ENV};
pub use file_handler::{
    DocumentKind, FileHandler, HandlerError, InputDocument, ROOT_DESCRIPTION, ROOT_NAME,
};

// Re-export the engine so callers need a single dependency
pub use moose_core;
