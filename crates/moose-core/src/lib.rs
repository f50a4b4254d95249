//! moose-core: configuration trees for MOOSE input files
//!
//! This crate holds the pure engine with NO file-system policy:
//! - Parameter, Entry and ParameterSet data model
//! - Schema/instance Node trees built from parsed Blocks
//! - YAML schema loader with pluggable directory listing
//! - Canonical-path index and `<type>` hard-path resolution
//! - Nom-based GetPot instance parser and serializer
//! - Variable constraining and regex entry search
//!
//! Reading and writing files, configuration and the CLI live in the
//! `moose-input` crate.

pub mod block;
pub mod constrain;
pub mod entry;
pub mod error;
pub mod hard_path;
pub mod instance;
pub mod node;
pub mod parameter;
pub mod path_index;
pub mod schema;
pub mod search;
pub mod serializer;

// Re-export commonly used types
pub use block::Block;
pub use constrain::{ConstraintReport, VariableConstrainer};
pub use entry::{AllowedValues, Entry, ParameterSet};
pub use error::{MooseError, Result};
pub use hard_path::{parse_hard_paths, HardPathResolver, ResolutionReport, TYPE_PLACEHOLDER};
pub use instance::InstanceLoader;
pub use node::{breadth_first, node_at, node_at_mut, Address, AdaptiveTypes, Flavor, Node, Visit};
pub use parameter::Parameter;
pub use path_index::PathIndex;
pub use schema::{FileLister, FsFileLister, Schema, SchemaLoader};
pub use search::{find_entries, EntrySearch};
pub use serializer::InstanceSerializer;
