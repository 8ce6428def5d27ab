//! Static analysis of bytecode objects
//!
//! This module holds the pure logic behind `prog`, `map`, `report` and
//! `graph`, separated from argument parsing in `main`.

pub mod graph;
pub mod indexer;
pub mod report;

pub use graph::{render_graph, write_graph};
pub use indexer::{Counts, Indexes};
pub use report::{ProgramQuery, Reporter};
