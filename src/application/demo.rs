//! Fixed demonstration tree used by `bintree demo`.

use tracing::instrument;

use crate::domain::{DomainResult, Tree};

/// Prefix rendering of [`demo_tree`], without the trailing newline.
pub const DEMO_PREFIX: &str =
    "(10 (5 nil nil )(17 (15 (12 (1337 (123 (228 nil nil )(78 nil nil ))nil )nil )nil )(20 nil nil )))";

/// Size recorded for the demonstration tree. It is caller-asserted metadata,
/// not the node count (which is 10).
pub const DEMO_ASSERTED_SIZE: usize = 5;

/// Builds the demonstration tree bottom-up:
///
/// ```text
///        10
///       /  \
///      5    17
///          /  \
///        15    20
///        /
///      12
///      /
///    1337
///    /
///  123
///  /  \
/// 228  78
/// ```
#[instrument(level = "debug")]
pub fn demo_tree(node_limit: Option<usize>) -> DomainResult<Tree> {
    let mut tree = Tree::with_node_limit(node_limit);

    let n20 = tree.leaf(20)?;
    let n228 = tree.leaf(228)?;
    let n78 = tree.leaf(78)?;
    let n123 = tree.create_node(123, Some(n228), Some(n78))?;
    let n1337 = tree.create_node(1337, Some(n123), None)?;
    let n12 = tree.create_node(12, Some(n1337), None)?;
    let n15 = tree.create_node(15, Some(n12), None)?;
    let n17 = tree.create_node(17, Some(n15), Some(n20))?;
    let n5 = tree.leaf(5)?;
    let n10 = tree.create_node(10, Some(n5), Some(n17))?;

    tree.set_root(Some(n10), DEMO_ASSERTED_SIZE)?;
    Ok(tree)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::{render, DomainError, Notation};

    #[test]
    fn test_demo_tree_prefix() {
        let tree = demo_tree(None).unwrap();
        assert_eq!(render(&tree, Notation::Prefix), format!("{DEMO_PREFIX}\n"));
        assert_eq!(tree.size(), DEMO_ASSERTED_SIZE);
        assert_eq!(tree.node_count(), 10);
        assert_eq!(tree.depth(), 7);
    }

    #[test]
    fn test_demo_tree_respects_node_limit() {
        assert_eq!(
            demo_tree(Some(4)).unwrap_err(),
            DomainError::Allocation { limit: 4 }
        );
    }
}
