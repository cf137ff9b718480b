//! Graphviz description of a tree.
//!
//! Every node becomes an `Mrecord` carrying its value and two ports, `left`
//! and `right`; every present child becomes an edge leaving the matching port.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::domain::arena::{NodeId, NodeValue, Tree};

/// Graphviz `rankdir`.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum RankDir {
    #[default]
    TB,
    LR,
    BT,
    RL,
}

impl fmt::Display for RankDir {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            RankDir::TB => "TB",
            RankDir::LR => "LR",
            RankDir::BT => "BT",
            RankDir::RL => "RL",
        };
        f.write_str(s)
    }
}

/// Colors and layout of the emitted graph.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GraphStyle {
    pub rankdir: RankDir,
    pub bgcolor: String,
    pub fillcolor: String,
    /// Node border color.
    pub color: String,
}

impl Default for GraphStyle {
    fn default() -> Self {
        Self {
            rankdir: RankDir::TB,
            bgcolor: "#31353b".into(),
            fillcolor: "#7293ba".into(),
            color: "#008080".into(),
        }
    }
}

/// Port an edge leaves from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Anchor {
    Left,
    Right,
}

impl Anchor {
    pub fn port(self) -> &'static str {
        match self {
            Anchor::Left => "left",
            Anchor::Right => "right",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GraphNode {
    pub id: String,
    pub value: NodeValue,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GraphEdge {
    pub from: String,
    pub anchor: Anchor,
    pub to: String,
}

/// Node and edge sets extracted from a tree, ready to be written as DOT.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct GraphDescription {
    pub nodes: Vec<GraphNode>,
    pub edges: Vec<GraphEdge>,
}

/// Record name derived from the node's arena slot; unique among live nodes.
fn record_id(idx: NodeId) -> String {
    let (slot, _generation) = idx.into_raw_parts();
    format!("node{slot}")
}

impl GraphDescription {
    /// Walks the tree twice in pre-order: once for records, once for edges.
    pub fn from_tree(tree: &Tree) -> Self {
        let nodes = tree
            .iter()
            .map(|(idx, node)| GraphNode {
                id: record_id(idx),
                value: node.value(),
            })
            .collect();

        let edges = tree
            .iter()
            .flat_map(|(idx, node)| {
                [(Anchor::Left, node.left()), (Anchor::Right, node.right())]
                    .into_iter()
                    .filter_map(move |(anchor, child)| {
                        child.map(|child| GraphEdge {
                            from: record_id(idx),
                            anchor,
                            to: record_id(child),
                        })
                    })
            })
            .collect();

        Self { nodes, edges }
    }

    pub fn edges_from(&self, anchor: Anchor) -> usize {
        self.edges.iter().filter(|e| e.anchor == anchor).count()
    }

    /// DOT text framed by the fixed header and footer.
    pub fn to_dot(&self, style: &GraphStyle) -> String {
        let mut out = String::new();
        out.push_str("digraph G{\n");
        out.push_str(&format!("rankdir={};\n", style.rankdir));
        out.push_str(&format!("graph [bgcolor=\"{}\"];\n", style.bgcolor));

        for node in &self.nodes {
            out.push_str(&format!(
                "{}[shape=Mrecord, style=filled, fillcolor=\"{}\", \
                 label = \"{{ value: {} | {{ <left> left | <right> right }} }}\", \
                 color = \"{}\"];\n",
                node.id, style.fillcolor, node.value, style.color
            ));
        }
        for edge in &self.edges {
            out.push_str(&format!(
                "{}:{} -> {};\n",
                edge.from,
                edge.anchor.port(),
                edge.to
            ));
        }

        out.push_str("}\n");
        out
    }
}
