//! Domain layer: the binary tree and its text and graph representations
//!
//! This layer is independent of external concerns (no I/O, no CLI, no config loading).

pub mod arena;
pub mod error;
pub mod graph;
pub mod notation;
pub mod outline;
pub mod parser;

pub use arena::{Node, NodeId, NodeValue, Tree, POISON};
pub use error::{DomainError, DomainResult, ParseError};
pub use graph::{Anchor, GraphDescription, GraphStyle, RankDir};
pub use notation::{print_tree, render, Notation};
pub use outline::TreeOutline;
pub use parser::{parse_prefix, read_prefix, ParseMode, ParseOptions};
