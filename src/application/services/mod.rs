//! Application services

pub mod graph_dump;
pub mod tree_io;

pub use graph_dump::GraphDumper;
pub use tree_io::TreeService;
