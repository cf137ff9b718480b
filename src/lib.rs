//! Binary tree toolkit: arena-backed trees, prefix/infix/postfix printers,
//! a prefix-notation reader and a Graphviz exporter.

pub mod application;
pub mod cli;
pub mod config;
pub mod domain;
pub mod exitcode;
pub mod infrastructure;
pub mod util;
