use std::collections::{HashMap, HashSet};

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum NodeKind {
    File,
    Symbol,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum SymbolKind {
    Function,
    Method,
    Class,
    Struct,
    Enum,
    Interface,
    Trait,
    TypeAlias,
    Variable,
    Constant,
    Module,
}

impl SymbolKind {
    pub const ALL: [SymbolKind; 11] = [
        Self::Function,
        Self::Method,
        Self::Class,
        Self::Struct,
        Self::Enum,
        Self::Interface,
        Self::Trait,
        Self::TypeAlias,
        Self::Variable,
        Self::Constant,
        Self::Module,
    ];

    pub fn label(self) -> &'static str {
        match self {
            Self::Function => "function",
            Self::Method => "method",
            Self::Class => "class",
            Self::Struct => "struct",
            Self::Enum => "enum",
            Self::Interface => "interface",
            Self::Trait => "trait",
            Self::TypeAlias => "type alias",
            Self::Variable => "variable",
            Self::Constant => "constant",
            Self::Module => "module",
        }
    }

    pub fn parse(value: &str) -> Option<Self> {
        match value {
            "function" => Some(Self::Function),
            "method" => Some(Self::Method),
            "class" => Some(Self::Class),
            "struct" => Some(Self::Struct),
            "enum" => Some(Self::Enum),
            "interface" => Some(Self::Interface),
            "trait" => Some(Self::Trait),
            "type_alias" | "typeAlias" => Some(Self::TypeAlias),
            "variable" => Some(Self::Variable),
            "constant" => Some(Self::Constant),
            "module" => Some(Self::Module),
            _ => None,
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum EdgeKind {
    Imports,
    Exports,
    Calls,
    Extends,
    Implements,
    References,
    Contains,
}

impl EdgeKind {
    pub const ALL: [EdgeKind; 7] = [
        Self::Imports,
        Self::Exports,
        Self::Calls,
        Self::Extends,
        Self::Implements,
        Self::References,
        Self::Contains,
    ];

    pub fn label(self) -> &'static str {
        match self {
            Self::Imports => "imports",
            Self::Exports => "exports",
            Self::Calls => "calls",
            Self::Extends => "extends",
            Self::Implements => "implements",
            Self::References => "references",
            Self::Contains => "contains",
        }
    }

    pub fn parse(value: &str) -> Option<Self> {
        match value {
            "imports" => Some(Self::Imports),
            "exports" => Some(Self::Exports),
            "calls" => Some(Self::Calls),
            "extends" => Some(Self::Extends),
            "implements" => Some(Self::Implements),
            "references" => Some(Self::References),
            "contains" => Some(Self::Contains),
            _ => None,
        }
    }
}

#[derive(Clone, Debug)]
pub struct Node {
    pub id: String,
    pub kind: NodeKind,
    pub label: String,
    pub language: Option<String>,
    pub symbol_kind: Option<SymbolKind>,
    pub path: Option<String>,
    pub line: Option<u32>,
    pub line_count: Option<u32>,
}

#[derive(Clone, Debug)]
pub struct Edge {
    pub id: String,
    pub source_id: String,
    pub target_id: String,
    pub kind: EdgeKind,
}

#[derive(Clone, Copy, Debug, Default)]
pub struct GraphStats {
    pub file_count: usize,
    pub symbol_count: usize,
    pub dropped_edges: usize,
}

/// Immutable-per-update snapshot of one analysis result, plus derived
/// lookup indices. Edges whose endpoints are missing from the node set are
/// dropped here, once, so no downstream consumer can hit a dangling lookup.
#[derive(Clone, Debug)]
pub struct ProjectGraph {
    pub project_path: String,
    pub nodes: Vec<Node>,
    pub edges: Vec<Edge>,
    pub index_by_id: HashMap<String, usize>,
    pub outgoing: Vec<Vec<usize>>,
    pub incoming: Vec<Vec<usize>>,
    pub languages: Vec<String>,
    pub stats: GraphStats,
}

impl ProjectGraph {
    pub fn new(project_path: String, nodes: Vec<Node>, edges: Vec<Edge>) -> Self {
        let mut index_by_id = HashMap::with_capacity(nodes.len());
        for (index, node) in nodes.iter().enumerate() {
            index_by_id.insert(node.id.clone(), index);
        }

        let total_edges = edges.len();
        let mut seen = HashSet::with_capacity(total_edges);
        let edges = edges
            .into_iter()
            .filter(|edge| {
                index_by_id.contains_key(&edge.source_id)
                    && index_by_id.contains_key(&edge.target_id)
                    && edge.source_id != edge.target_id
                    && seen.insert((edge.source_id.clone(), edge.target_id.clone(), edge.kind))
            })
            .collect::<Vec<_>>();

        let mut outgoing = vec![Vec::new(); nodes.len()];
        let mut incoming = vec![Vec::new(); nodes.len()];
        for (edge_index, edge) in edges.iter().enumerate() {
            let source = index_by_id[&edge.source_id];
            let target = index_by_id[&edge.target_id];
            outgoing[source].push(edge_index);
            incoming[target].push(edge_index);
        }

        let mut languages = nodes
            .iter()
            .filter_map(|node| node.language.clone())
            .collect::<Vec<_>>();
        languages.sort();
        languages.dedup();

        let stats = GraphStats {
            file_count: nodes
                .iter()
                .filter(|node| node.kind == NodeKind::File)
                .count(),
            symbol_count: nodes
                .iter()
                .filter(|node| node.kind == NodeKind::Symbol)
                .count(),
            dropped_edges: total_edges - edges.len(),
        };

        Self {
            project_path,
            nodes,
            edges,
            index_by_id,
            outgoing,
            incoming,
            languages,
            stats,
        }
    }

    pub fn node_count(&self) -> usize {
        self.nodes.len()
    }

    pub fn edge_count(&self) -> usize {
        self.edges.len()
    }

    pub fn node(&self, id: &str) -> Option<&Node> {
        self.index_by_id.get(id).map(|&index| &self.nodes[index])
    }

    pub fn degree(&self, index: usize) -> usize {
        self.outgoing.get(index).map_or(0, Vec::len) + self.incoming.get(index).map_or(0, Vec::len)
    }

    /// File node containing the given symbol, found via an incoming
    /// `contains` edge.
    pub fn containing_file(&self, index: usize) -> Option<usize> {
        self.incoming.get(index)?.iter().find_map(|&edge_index| {
            let edge = &self.edges[edge_index];
            if edge.kind != EdgeKind::Contains {
                return None;
            }
            let source = *self.index_by_id.get(&edge.source_id)?;
            (self.nodes[source].kind == NodeKind::File).then_some(source)
        })
    }

    pub fn symbols_in_file(&self, file_index: usize) -> Vec<usize> {
        let Some(outgoing) = self.outgoing.get(file_index) else {
            return Vec::new();
        };

        let mut symbols = outgoing
            .iter()
            .filter_map(|&edge_index| {
                let edge = &self.edges[edge_index];
                if edge.kind != EdgeKind::Contains {
                    return None;
                }
                let target = *self.index_by_id.get(&edge.target_id)?;
                (self.nodes[target].kind == NodeKind::Symbol).then_some(target)
            })
            .collect::<Vec<_>>();
        symbols.sort_unstable();
        symbols
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn file(id: &str) -> Node {
        Node {
            id: id.to_owned(),
            kind: NodeKind::File,
            label: id.to_owned(),
            language: Some("typescript".to_owned()),
            symbol_kind: None,
            path: Some(format!("src/{id}")),
            line: None,
            line_count: Some(10),
        }
    }

    fn edge(id: &str, source: &str, target: &str, kind: EdgeKind) -> Edge {
        Edge {
            id: id.to_owned(),
            source_id: source.to_owned(),
            target_id: target.to_owned(),
            kind,
        }
    }

    #[test]
    fn dangling_edges_are_dropped_at_construction() {
        let graph = ProjectGraph::new(
            "proj".to_owned(),
            vec![file("a.ts"), file("b.ts")],
            vec![
                edge("e1", "a.ts", "b.ts", EdgeKind::Imports),
                edge("e2", "a.ts", "missing.ts", EdgeKind::Imports),
                edge("e3", "a.ts", "a.ts", EdgeKind::References),
            ],
        );

        assert_eq!(graph.edge_count(), 1);
        assert_eq!(graph.stats.dropped_edges, 2);
        assert_eq!(graph.outgoing[0], vec![0]);
        assert_eq!(graph.incoming[1], vec![0]);
    }

    #[test]
    fn duplicate_edges_collapse_to_one() {
        let graph = ProjectGraph::new(
            "proj".to_owned(),
            vec![file("a.ts"), file("b.ts")],
            vec![
                edge("e1", "a.ts", "b.ts", EdgeKind::Imports),
                edge("e2", "a.ts", "b.ts", EdgeKind::Imports),
                edge("e3", "a.ts", "b.ts", EdgeKind::Calls),
            ],
        );

        assert_eq!(graph.edge_count(), 2);
    }

    #[test]
    fn containment_lookups_use_contains_edges_only() {
        let mut symbol = file("sym");
        symbol.kind = NodeKind::Symbol;
        symbol.symbol_kind = Some(SymbolKind::Function);

        let graph = ProjectGraph::new(
            "proj".to_owned(),
            vec![file("a.ts"), symbol],
            vec![
                edge("e1", "a.ts", "sym", EdgeKind::Contains),
                edge("e2", "a.ts", "sym", EdgeKind::References),
            ],
        );

        let symbol_index = graph.index_by_id["sym"];
        let file_index = graph.index_by_id["a.ts"];
        assert_eq!(graph.containing_file(symbol_index), Some(file_index));
        assert_eq!(graph.symbols_in_file(file_index), vec![symbol_index]);
    }
}
