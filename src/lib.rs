pub use logicrs;

pub mod config;
pub mod cover;
pub mod flow;

pub use config::{CoverConfig, FlowConfig};
pub use cover::{Cnf, CoverEngine, SolverIf};
pub use flow::{DynamicGraph, DynamicMaxFlow, EdmondsKarp, GraphIf, Weight};
