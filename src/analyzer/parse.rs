use serde::Deserialize;

use super::graph::{Edge, EdgeKind, Node, NodeKind, SymbolKind};

/// One NDJSON line on the analyzer's stdout during `analyze`.
#[derive(Clone, Debug, Deserialize)]
#[serde(tag = "status")]
pub enum AnalysisEvent {
    #[serde(rename = "in_progress", rename_all = "camelCase")]
    InProgress {
        #[serde(default)]
        files_processed: usize,
        #[serde(default)]
        total_files: usize,
        #[serde(default)]
        current_file: Option<String>,
    },
    #[serde(rename = "complete", rename_all = "camelCase")]
    Complete {
        graph: RawGraph,
        #[serde(default)]
        statistics: Option<AnalysisStatistics>,
    },
    #[serde(rename = "error")]
    Error {
        #[serde(default)]
        message: String,
    },
    #[serde(rename = "cancelled")]
    Cancelled,
}

#[derive(Clone, Copy, Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AnalysisStatistics {
    #[serde(default)]
    pub files: usize,
    #[serde(default)]
    pub symbols: usize,
    #[serde(default)]
    pub relationships: usize,
}

#[derive(Clone, Debug, Default, Deserialize)]
pub struct RawGraph {
    #[serde(default)]
    pub nodes: Vec<RawNode>,
    #[serde(default)]
    pub edges: Vec<RawEdge>,
}

#[derive(Clone, Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RawNode {
    pub id: String,
    pub name: String,
    #[serde(rename = "type")]
    pub node_type: String,
    #[serde(default)]
    pub language: Option<String>,
    #[serde(default)]
    pub symbol_kind: Option<String>,
    #[serde(default)]
    pub path: Option<String>,
    #[serde(default)]
    pub line: Option<u32>,
    #[serde(default)]
    pub line_count: Option<u32>,
}

#[derive(Clone, Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RawEdge {
    pub id: String,
    pub source: String,
    pub target: String,
    #[serde(rename = "type")]
    pub edge_type: String,
}

/// Validate raw wire nodes/edges into the closed model enums. This is the
/// only place unknown kind strings are handled: a node with an unknown type
/// is dropped, a symbol with an unknown symbol kind keeps `None`, and an
/// edge with an unknown relationship kind is dropped.
pub fn validate_graph(raw: RawGraph) -> (Vec<Node>, Vec<Edge>) {
    let nodes = raw
        .nodes
        .into_iter()
        .filter_map(|raw_node| {
            let kind = match raw_node.node_type.as_str() {
                "file" => NodeKind::File,
                "symbol" => NodeKind::Symbol,
                _ => return None,
            };

            if raw_node.id.is_empty() {
                return None;
            }

            Some(Node {
                id: raw_node.id,
                kind,
                label: raw_node.name,
                language: raw_node.language.filter(|language| !language.is_empty()),
                symbol_kind: raw_node
                    .symbol_kind
                    .as_deref()
                    .and_then(SymbolKind::parse),
                path: raw_node.path.filter(|path| !path.is_empty()),
                line: raw_node.line,
                line_count: raw_node.line_count,
            })
        })
        .collect::<Vec<_>>();

    let edges = raw
        .edges
        .into_iter()
        .filter_map(|raw_edge| {
            let kind = EdgeKind::parse(&raw_edge.edge_type)?;
            Some(Edge {
                id: raw_edge.id,
                source_id: raw_edge.source,
                target_id: raw_edge.target,
                kind,
            })
        })
        .collect::<Vec<_>>();

    (nodes, edges)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn progress_event_parses_camel_case_fields() {
        let line = r#"{"status":"in_progress","filesProcessed":3,"totalFiles":12,"currentFile":"src/app.ts"}"#;
        let event: AnalysisEvent = serde_json::from_str(line).expect("valid event");
        match event {
            AnalysisEvent::InProgress {
                files_processed,
                total_files,
                current_file,
            } => {
                assert_eq!(files_processed, 3);
                assert_eq!(total_files, 12);
                assert_eq!(current_file.as_deref(), Some("src/app.ts"));
            }
            other => panic!("expected in_progress, got {other:?}"),
        }
    }

    #[test]
    fn complete_event_carries_the_graph_payload() {
        let line = r#"{"status":"complete","graph":{"nodes":[{"id":"f1","name":"app.ts","type":"file","language":"typescript"}],"edges":[]},"statistics":{"files":1,"symbols":0,"relationships":0}}"#;
        let event: AnalysisEvent = serde_json::from_str(line).expect("valid event");
        match event {
            AnalysisEvent::Complete { graph, statistics } => {
                assert_eq!(graph.nodes.len(), 1);
                assert_eq!(statistics.map(|stats| stats.files), Some(1));
            }
            other => panic!("expected complete, got {other:?}"),
        }
    }

    #[test]
    fn unknown_kinds_are_rejected_once_at_the_boundary() {
        let raw = RawGraph {
            nodes: vec![
                RawNode {
                    id: "f1".to_owned(),
                    name: "app.ts".to_owned(),
                    node_type: "file".to_owned(),
                    language: Some("typescript".to_owned()),
                    symbol_kind: None,
                    path: Some("src/app.ts".to_owned()),
                    line: None,
                    line_count: Some(40),
                },
                RawNode {
                    id: "s1".to_owned(),
                    name: "render".to_owned(),
                    node_type: "symbol".to_owned(),
                    language: None,
                    symbol_kind: Some("hologram".to_owned()),
                    path: None,
                    line: Some(7),
                    line_count: None,
                },
                RawNode {
                    id: "x1".to_owned(),
                    name: "mystery".to_owned(),
                    node_type: "cluster".to_owned(),
                    language: None,
                    symbol_kind: None,
                    path: None,
                    line: None,
                    line_count: None,
                },
            ],
            edges: vec![
                RawEdge {
                    id: "e1".to_owned(),
                    source: "f1".to_owned(),
                    target: "s1".to_owned(),
                    edge_type: "contains".to_owned(),
                },
                RawEdge {
                    id: "e2".to_owned(),
                    source: "f1".to_owned(),
                    target: "s1".to_owned(),
                    edge_type: "teleports".to_owned(),
                },
            ],
        };

        let (nodes, edges) = validate_graph(raw);
        assert_eq!(nodes.len(), 2);
        assert_eq!(nodes[1].symbol_kind, None);
        assert_eq!(edges.len(), 1);
        assert_eq!(edges[0].kind, EdgeKind::Contains);
    }
}
