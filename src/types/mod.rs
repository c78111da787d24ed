//! Core types for the tag graph kernel.

pub mod node;
pub mod edge;
pub mod pack;

pub use node::{NodeId, NodeKind, Node, Attribution, ReplacedBy};
pub use edge::{Edge, EdgeKey};
pub use pack::{PackId, TagValue, TagDefinition, DataPack};
