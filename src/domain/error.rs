//! Domain-level errors (no I/O concerns)

use generational_arena::Index;
use thiserror::Error;

/// Errors raised while reading prefix notation.
///
/// Offsets are byte positions into the parsed text.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ParseError {
    #[error("expected integer literal at offset {offset}")]
    InvalidInteger { offset: usize },

    #[error("unexpected {found:?} at offset {offset}, expected '(' or 'nil'")]
    UnexpectedToken { offset: usize, found: String },

    #[error("node opened at offset {opened_at} is never closed")]
    UnterminatedNode { opened_at: usize },

    #[error("trailing input after tree at offset {offset}")]
    TrailingInput { offset: usize },

    #[error("nesting deeper than {max_depth} at offset {offset}")]
    NestingTooDeep { offset: usize, max_depth: usize },
}

/// Domain errors represent violations of tree ownership and allocation rules.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum DomainError {
    #[error("node store exhausted: limit of {limit} live nodes reached")]
    Allocation { limit: usize },

    #[error("unknown or released node: {0:?}")]
    UnknownNode(Index),

    #[error("node {0:?} is already owned")]
    NodeAlreadyOwned(Index),

    #[error("node {0:?} still owns live children")]
    NodeStillOwnsChildren(Index),

    #[error("parse error: {0}")]
    Parse(#[from] ParseError),
}

/// Result type for tree operations.
pub type DomainResult<T> = Result<T, DomainError>;
