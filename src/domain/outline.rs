use termtree::Tree as Outline;
use tracing::instrument;

use crate::domain::arena::{NodeId, Tree};

/// Conversion to an indented box-drawing outline for terminal display.
pub trait TreeOutline {
    fn to_outline(&self) -> Outline<String>;
}

impl TreeOutline for Tree {
    #[instrument(level = "debug", skip(self))]
    fn to_outline(&self) -> Outline<String> {
        if self.root().is_none() {
            return Outline::new("Empty tree".to_string());
        }

        // (node, side label, children already queued)
        let mut work: Vec<(Option<NodeId>, &str, bool)> = vec![(self.root(), "", false)];
        let mut built: Vec<Outline<String>> = Vec::new();

        while let Some((idx, side, expanded)) = work.pop() {
            let Some(node) = idx.and_then(|i| self.node(i)) else {
                built.push(Outline::new(format!("{side}nil")));
                continue;
            };
            let label = format!("{side}{}", node.value());
            if node.is_leaf() {
                built.push(Outline::new(label));
            } else if !expanded {
                work.push((idx, side, true));
                work.push((node.right(), "R: ", false));
                work.push((node.left(), "L: ", false));
            } else {
                let right = built.pop().unwrap_or_else(|| Outline::new("R: nil".into()));
                let left = built.pop().unwrap_or_else(|| Outline::new("L: nil".into()));
                built.push(Outline::new(label).with_leaves([left, right]));
            }
        }

        built
            .pop()
            .unwrap_or_else(|| Outline::new("Empty tree".to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_outline_lists_both_sides() {
        let mut tree = Tree::new();
        let left = tree.leaf(5).unwrap();
        let root = tree.create_node(10, Some(left), None).unwrap();
        tree.set_root(Some(root), 2).unwrap();

        let text = tree.to_outline().to_string();
        assert!(text.starts_with("10\n"));
        assert!(text.contains("L: 5"));
        assert!(text.contains("R: nil"));
    }

    #[test]
    fn test_outline_keeps_left_before_right() {
        let mut tree = Tree::new();
        let a = tree.leaf(1).unwrap();
        let b = tree.leaf(2).unwrap();
        let inner = tree.create_node(3, Some(a), None).unwrap();
        let root = tree.create_node(4, Some(inner), Some(b)).unwrap();
        tree.set_root(Some(root), 4).unwrap();

        let text = tree.to_outline().to_string();
        let pos = |label: &str| text.find(label).unwrap();
        assert!(pos("L: 3") < pos("L: 1"));
        assert!(pos("L: 1") < pos("R: nil"));
        assert!(pos("R: nil") < pos("R: 2"));
    }

    #[test]
    fn test_outline_of_deep_chain() {
        let mut tree = Tree::new();
        let mut top = tree.leaf(0).unwrap();
        for value in 1..4096 {
            top = tree.create_node(value, Some(top), None).unwrap();
        }
        tree.set_root(Some(top), 4096).unwrap();

        let outline = tree.to_outline();
        assert_eq!(outline.root, "4095");
        assert_eq!(outline.leaves.len(), 2);
        assert_eq!(outline.leaves[0].root, "L: 4094");
        assert_eq!(outline.leaves[1].root, "R: nil");
    }

    #[test]
    fn test_outline_of_empty_tree() {
        assert_eq!(Tree::new().to_outline().to_string().trim_end(), "Empty tree");
    }
}
