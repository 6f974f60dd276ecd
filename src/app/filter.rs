use std::collections::HashSet;

use crate::analyzer::{EdgeKind, NodeKind, ProjectGraph, SymbolKind};

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub enum ViewMode {
    #[default]
    File,
    Symbol,
}

impl ViewMode {
    pub fn label(self) -> &'static str {
        match self {
            Self::File => "Files",
            Self::Symbol => "Symbols",
        }
    }
}

/// Empty `languages`/`symbol_kinds` sets mean "no restriction", while
/// `relationship_kinds` starts as the full enumerated set and removing a
/// kind shrinks visibility. The asymmetry is intentional.
#[derive(Clone, Debug, PartialEq)]
pub struct FilterCriteria {
    pub view_mode: ViewMode,
    pub languages: HashSet<String>,
    pub symbol_kinds: HashSet<SymbolKind>,
    pub relationship_kinds: HashSet<EdgeKind>,
    pub search_query: String,
}

impl Default for FilterCriteria {
    fn default() -> Self {
        Self {
            view_mode: ViewMode::File,
            languages: HashSet::new(),
            symbol_kinds: HashSet::new(),
            relationship_kinds: EdgeKind::ALL.into_iter().collect(),
            search_query: String::new(),
        }
    }
}

#[derive(Clone, Debug, Default)]
pub struct VisibleGraph {
    pub node_indices: Vec<usize>,
    pub edge_indices: Vec<usize>,
    pub search_matches: HashSet<usize>,
    pub has_search_query: bool,
}

/// Pure projection of the model through the filter criteria. No side
/// effects; calling it again on its own output selects the same set.
pub fn filter_graph(graph: &ProjectGraph, criteria: &FilterCriteria) -> VisibleGraph {
    let query = criteria.search_query.trim().to_lowercase();
    let has_search_query = !query.is_empty();

    let mut visible = vec![false; graph.nodes.len()];
    let mut node_indices = Vec::new();
    let mut search_matches = HashSet::new();

    for (index, node) in graph.nodes.iter().enumerate() {
        if !node_passes(node.kind, node.language.as_deref(), node.symbol_kind, criteria) {
            continue;
        }

        visible[index] = true;
        node_indices.push(index);

        if has_search_query && node_matches_query(&node.label, node.path.as_deref(), &query) {
            search_matches.insert(index);
        }
    }

    let edge_indices = graph
        .edges
        .iter()
        .enumerate()
        .filter_map(|(edge_index, edge)| {
            if !criteria.relationship_kinds.contains(&edge.kind) {
                return None;
            }
            let source = *graph.index_by_id.get(&edge.source_id)?;
            let target = *graph.index_by_id.get(&edge.target_id)?;
            (visible[source] && visible[target]).then_some(edge_index)
        })
        .collect();

    VisibleGraph {
        node_indices,
        edge_indices,
        search_matches,
        has_search_query,
    }
}

fn node_passes(
    kind: NodeKind,
    language: Option<&str>,
    symbol_kind: Option<SymbolKind>,
    criteria: &FilterCriteria,
) -> bool {
    if criteria.view_mode == ViewMode::File && kind != NodeKind::File {
        return false;
    }

    if !criteria.languages.is_empty() {
        match language {
            Some(language) if criteria.languages.contains(language) => {}
            // Symbols carry no language of their own; the language filter
            // binds to file nodes.
            None if kind == NodeKind::Symbol => {}
            _ => return false,
        }
    }

    if kind == NodeKind::Symbol && !criteria.symbol_kinds.is_empty() {
        let Some(symbol_kind) = symbol_kind else {
            return false;
        };
        if !criteria.symbol_kinds.contains(&symbol_kind) {
            return false;
        }
    }

    true
}

fn node_matches_query(label: &str, path: Option<&str>, lowered_query: &str) -> bool {
    label.to_lowercase().contains(lowered_query)
        || path.is_some_and(|path| path.to_lowercase().contains(lowered_query))
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum VisualState {
    Default,
    Faded,
    SearchMatch,
    Hovered,
    Selected,
}

/// Highest-priority state wins: selected > hovered > search match > faded >
/// default. A node fades when a search is active and it does not match, or
/// when a selection exists and the node is not connected to it.
pub fn derive_visual_state(
    is_selected: bool,
    is_hovered: bool,
    is_search_match: bool,
    has_search_query: bool,
    selection_active: bool,
    connected_to_selection: bool,
) -> VisualState {
    if is_selected {
        VisualState::Selected
    } else if is_hovered {
        VisualState::Hovered
    } else if has_search_query && is_search_match {
        VisualState::SearchMatch
    } else if (has_search_query && !is_search_match)
        || (selection_active && !connected_to_selection)
    {
        VisualState::Faded
    } else {
        VisualState::Default
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::analyzer::{Edge, Node};

    fn file_node(id: &str, language: &str) -> Node {
        Node {
            id: id.to_owned(),
            kind: NodeKind::File,
            label: id.to_owned(),
            language: Some(language.to_owned()),
            symbol_kind: None,
            path: Some(format!("src/{id}")),
            line: None,
            line_count: Some(1),
        }
    }

    fn symbol_node(id: &str, kind: SymbolKind) -> Node {
        Node {
            id: id.to_owned(),
            kind: NodeKind::Symbol,
            label: id.to_owned(),
            language: None,
            symbol_kind: Some(kind),
            path: None,
            line: Some(1),
            line_count: None,
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

    fn sample_graph() -> ProjectGraph {
        ProjectGraph::new(
            "proj".to_owned(),
            vec![
                file_node("App.tsx", "typescript"),
                file_node("utils.ts", "typescript"),
                file_node("main.rs", "rust"),
                symbol_node("render", SymbolKind::Function),
            ],
            vec![
                edge("e1", "App.tsx", "utils.ts", EdgeKind::Imports),
                edge("e2", "App.tsx", "render", EdgeKind::Contains),
                edge("e3", "main.rs", "utils.ts", EdgeKind::References),
            ],
        )
    }

    fn visible_ids(graph: &ProjectGraph, visible: &VisibleGraph) -> Vec<String> {
        visible
            .node_indices
            .iter()
            .map(|&index| graph.nodes[index].id.clone())
            .collect()
    }

    #[test]
    fn file_mode_hides_symbols() {
        let graph = sample_graph();
        let visible = filter_graph(&graph, &FilterCriteria::default());
        assert_eq!(visible_ids(&graph, &visible), ["App.tsx", "utils.ts", "main.rs"]);
    }

    #[test]
    fn language_filter_restricts_files() {
        let graph = sample_graph();
        let criteria = FilterCriteria {
            languages: ["rust".to_owned()].into_iter().collect(),
            ..FilterCriteria::default()
        };
        let visible = filter_graph(&graph, &criteria);
        assert_eq!(visible_ids(&graph, &visible), ["main.rs"]);
        assert!(visible.edge_indices.is_empty());
    }

    #[test]
    fn symbol_kind_filter_applies_in_symbol_mode() {
        let graph = sample_graph();
        let criteria = FilterCriteria {
            view_mode: ViewMode::Symbol,
            symbol_kinds: [SymbolKind::Class].into_iter().collect(),
            ..FilterCriteria::default()
        };
        let visible = filter_graph(&graph, &criteria);
        // Files pass the symbol-kind filter untouched; the function symbol
        // is rejected.
        assert_eq!(visible_ids(&graph, &visible), ["App.tsx", "utils.ts", "main.rs"]);
    }

    #[test]
    fn edge_disappears_when_one_endpoint_is_filtered_out() {
        let graph = sample_graph();
        let criteria = FilterCriteria {
            languages: ["typescript".to_owned()].into_iter().collect(),
            ..FilterCriteria::default()
        };
        let visible = filter_graph(&graph, &criteria);
        let edge_ids = visible
            .edge_indices
            .iter()
            .map(|&index| graph.edges[index].id.as_str())
            .collect::<Vec<_>>();
        // e3's source main.rs is filtered out, so the edge goes with it.
        assert_eq!(edge_ids, ["e1"]);
    }

    #[test]
    fn removing_a_relationship_kind_shrinks_visibility() {
        let graph = sample_graph();
        let mut criteria = FilterCriteria::default();
        criteria.relationship_kinds.remove(&EdgeKind::Imports);
        let visible = filter_graph(&graph, &criteria);
        assert!(
            visible
                .edge_indices
                .iter()
                .all(|&index| graph.edges[index].kind != EdgeKind::Imports)
        );
    }

    #[test]
    fn filtering_is_idempotent() {
        let graph = sample_graph();
        let criteria = FilterCriteria {
            languages: ["typescript".to_owned()].into_iter().collect(),
            search_query: "app".to_owned(),
            ..FilterCriteria::default()
        };

        let first = filter_graph(&graph, &criteria);
        let refiltered = ProjectGraph::new(
            graph.project_path.clone(),
            first
                .node_indices
                .iter()
                .map(|&index| graph.nodes[index].clone())
                .collect(),
            first
                .edge_indices
                .iter()
                .map(|&index| graph.edges[index].clone())
                .collect(),
        );
        let second = filter_graph(&refiltered, &criteria);

        assert_eq!(
            visible_ids(&graph, &first),
            visible_ids(&refiltered, &second)
        );
        assert_eq!(first.edge_indices.len(), second.edge_indices.len());
    }

    #[test]
    fn search_scenario_matches_app_and_fades_utils() {
        let graph = sample_graph();
        let criteria = FilterCriteria {
            search_query: "App".to_owned(),
            ..FilterCriteria::default()
        };
        let visible = filter_graph(&graph, &criteria);

        assert!(visible.has_search_query);
        let app = graph.index_by_id["App.tsx"];
        let utils = graph.index_by_id["utils.ts"];
        assert!(visible.search_matches.contains(&app));
        assert!(!visible.search_matches.contains(&utils));

        let utils_state = derive_visual_state(false, false, false, true, false, false);
        assert_eq!(utils_state, VisualState::Faded);
        let app_state = derive_visual_state(false, false, true, true, false, false);
        assert_eq!(app_state, VisualState::SearchMatch);
    }

    #[test]
    fn blank_query_yields_no_active_search() {
        let graph = sample_graph();
        let criteria = FilterCriteria {
            search_query: "   ".to_owned(),
            ..FilterCriteria::default()
        };
        let visible = filter_graph(&graph, &criteria);
        assert!(!visible.has_search_query);
        assert!(visible.search_matches.is_empty());
    }

    #[test]
    fn visual_state_priority_order() {
        assert_eq!(
            derive_visual_state(true, true, true, true, true, false),
            VisualState::Selected
        );
        assert_eq!(
            derive_visual_state(false, true, true, true, true, false),
            VisualState::Hovered
        );
        assert_eq!(
            derive_visual_state(false, false, true, true, true, false),
            VisualState::SearchMatch
        );
        assert_eq!(
            derive_visual_state(false, false, false, false, true, false),
            VisualState::Faded
        );
        assert_eq!(
            derive_visual_state(false, false, false, false, true, true),
            VisualState::Default
        );
    }
}
