//! Parenthesized text renderings of a tree.
//!
//! Every present node is wrapped in `(` `)`, every absent subtree renders as
//! `nil `, and values are followed by a single space. The formats only differ
//! in where the value sits relative to the two subtrees.

use std::fmt;
use std::io;

use crate::domain::arena::{NodeId, Tree};

/// Position of a node's value relative to its subtrees.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Notation {
    /// `( value left right )`
    Prefix,
    /// `( left value right )`
    Infix,
    /// `( left right value )`
    Postfix,
}

impl Notation {
    /// The order the demonstration driver prints in.
    pub const ALL: [Notation; 3] = [Notation::Prefix, Notation::Postfix, Notation::Infix];

    pub fn name(self) -> &'static str {
        match self {
            Notation::Prefix => "prefix",
            Notation::Infix => "infix",
            Notation::Postfix => "postfix",
        }
    }
}

impl fmt::Display for Notation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Borrowing [`fmt::Display`] adapter returned by [`Tree::display`].
pub struct NotationDisplay<'a> {
    tree: &'a Tree,
    notation: Notation,
}

impl NotationDisplay<'_> {
    fn write_subtree(&self, f: &mut fmt::Formatter<'_>, idx: Option<NodeId>) -> fmt::Result {
        let Some(node) = idx.and_then(|i| self.tree.node(i)) else {
            return f.write_str("nil ");
        };

        f.write_str("(")?;
        match self.notation {
            Notation::Prefix => {
                write!(f, "{} ", node.value())?;
                self.write_subtree(f, node.left())?;
                self.write_subtree(f, node.right())?;
            }
            Notation::Infix => {
                self.write_subtree(f, node.left())?;
                write!(f, "{} ", node.value())?;
                self.write_subtree(f, node.right())?;
            }
            Notation::Postfix => {
                self.write_subtree(f, node.left())?;
                self.write_subtree(f, node.right())?;
                write!(f, "{} ", node.value())?;
            }
        }
        f.write_str(")")
    }
}

impl fmt::Display for NotationDisplay<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.write_subtree(f, self.tree.root())
    }
}

impl Tree {
    /// Renders the tree in `notation` without the terminal newline.
    pub fn display(&self, notation: Notation) -> NotationDisplay<'_> {
        NotationDisplay {
            tree: self,
            notation,
        }
    }
}

/// Writes the tree to `out` in `notation`, followed by a newline.
pub fn print_tree<W: io::Write + ?Sized>(
    tree: &Tree,
    notation: Notation,
    out: &mut W,
) -> io::Result<()> {
    writeln!(out, "{}", tree.display(notation))
}

/// Same as [`print_tree`] into a fresh string.
pub fn render(tree: &Tree, notation: Notation) -> String {
    format!("{}\n", tree.display(notation))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn small_tree() -> Tree {
        let mut tree = Tree::new();
        let n4 = tree.leaf(4).unwrap();
        let n2 = tree.create_node(2, Some(n4), None).unwrap();
        let n3 = tree.leaf(3).unwrap();
        let n1 = tree.create_node(1, Some(n2), Some(n3)).unwrap();
        tree.set_root(Some(n1), 4).unwrap();
        tree
    }

    #[test]
    fn test_prefix() {
        assert_eq!(
            render(&small_tree(), Notation::Prefix),
            "(1 (2 (4 nil nil )nil )(3 nil nil ))\n"
        );
    }

    #[test]
    fn test_infix() {
        assert_eq!(
            render(&small_tree(), Notation::Infix),
            "(((nil 4 nil )2 nil )1 (nil 3 nil ))\n"
        );
    }

    #[test]
    fn test_postfix() {
        assert_eq!(
            render(&small_tree(), Notation::Postfix),
            "(((nil nil 4 )nil 2 )(nil nil 3 )1 )\n"
        );
    }

    #[test]
    fn test_negative_values() {
        let mut tree = Tree::new();
        let root = tree.leaf(-12).unwrap();
        tree.set_root(Some(root), 1).unwrap();
        assert_eq!(render(&tree, Notation::Prefix), "(-12 nil nil )\n");
    }

    #[test]
    fn test_print_tree_writes_to_sink() {
        let mut out = Vec::new();
        print_tree(&Tree::new(), Notation::Infix, &mut out).unwrap();
        assert_eq!(String::from_utf8(out).unwrap(), "nil \n");
    }
}
