mod cmd;
mod collect;
mod graph;
mod parse;

pub use collect::{
    AnalysisProgress, AnalyzerError, collect_project_graph, fetch_project_graph, set_file_hidden,
};
pub use graph::{Edge, EdgeKind, Node, NodeKind, ProjectGraph, SymbolKind};
