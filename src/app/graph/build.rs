use std::collections::HashMap;

use crate::analyzer::ProjectGraph;
use crate::util::id_hash;

use super::super::filter::{VisibleGraph, filter_graph};
use super::super::render_utils::node_radius;
use super::super::{SceneEdge, SceneGraph, SceneNode, ViewModel, ViewScratch};

/// Project the filtered model into the indexed scene the renderer and
/// layout engine work on. Positions survive the rebuild by node id, so a
/// filter change never throws away a finished layout.
pub(in crate::app) fn build_scene(
    graph: &ProjectGraph,
    visible: &VisibleGraph,
    prior: Option<SceneGraph>,
) -> SceneGraph {
    let prior_positions = prior
        .map(|scene| {
            scene
                .nodes
                .into_iter()
                .filter_map(|node| Some((node.id, node.position?)))
                .collect::<HashMap<_, _>>()
        })
        .unwrap_or_default();

    let degrees = visible
        .node_indices
        .iter()
        .map(|&model_index| graph.degree(model_index))
        .collect::<Vec<_>>();
    let min_degree = degrees.iter().copied().min().unwrap_or(0);
    let max_degree = degrees.iter().copied().max().unwrap_or(0);

    let mut scene_index_of_model = HashMap::with_capacity(visible.node_indices.len());
    let mut index_by_id = HashMap::with_capacity(visible.node_indices.len());
    let mut node_identity = 0u64;

    let nodes = visible
        .node_indices
        .iter()
        .zip(&degrees)
        .enumerate()
        .map(|(scene_index, (&model_index, &degree))| {
            let node = &graph.nodes[model_index];
            scene_index_of_model.insert(model_index, scene_index);
            index_by_id.insert(node.id.clone(), scene_index);
            node_identity = node_identity.wrapping_add(id_hash(&node.id));

            SceneNode {
                id: node.id.clone(),
                label: node.label.clone(),
                kind: node.kind,
                symbol_kind: node.symbol_kind,
                language: node.language.clone(),
                model_index,
                base_radius: node_radius(degree, min_degree, max_degree),
                position: prior_positions.get(&node.id).copied(),
            }
        })
        .collect::<Vec<_>>();

    let mut edges = Vec::with_capacity(visible.edge_indices.len());
    let mut outgoing = vec![Vec::new(); nodes.len()];
    let mut incoming = vec![Vec::new(); nodes.len()];
    for &edge_index in &visible.edge_indices {
        let edge = &graph.edges[edge_index];
        let (Some(&source), Some(&target)) = (
            graph
                .index_by_id
                .get(&edge.source_id)
                .and_then(|model_index| scene_index_of_model.get(model_index)),
            graph
                .index_by_id
                .get(&edge.target_id)
                .and_then(|model_index| scene_index_of_model.get(model_index)),
        ) else {
            continue;
        };

        outgoing[source].push(target);
        incoming[target].push(source);
        edges.push(SceneEdge {
            source,
            target,
            kind: edge.kind,
        });
    }

    let search_matches = visible
        .search_matches
        .iter()
        .filter_map(|model_index| scene_index_of_model.get(model_index).copied())
        .collect();

    SceneGraph {
        nodes,
        edges,
        index_by_id,
        outgoing,
        incoming,
        search_matches,
        has_search_query: visible.has_search_query,
        node_identity,
        view_scratch: ViewScratch {
            screen_positions: Vec::new(),
            screen_radii: Vec::new(),
            visible_indices: Vec::new(),
            visible_mask: Vec::new(),
        },
    }
}

impl ViewModel {
    pub(in crate::app) fn rebuild_scene(&mut self) {
        self.scene_revision = self.scene_revision.wrapping_add(1);
        self.search_results_cache = None;
        self.hovered = None;

        let visible = filter_graph(&self.graph, &self.criteria);
        if visible.node_indices.is_empty() {
            self.scene = None;
            self.visible_node_count = 0;
            self.visible_edge_count = 0;
            self.scene_dirty = false;
            return;
        }

        let prior = self.scene.take();
        let scene = build_scene(&self.graph, &visible, prior);
        self.visible_node_count = scene.nodes.len();
        self.visible_edge_count = scene.edges.len();
        self.scene = Some(scene);
        self.scene_dirty = false;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::analyzer::{Edge, EdgeKind, Node, NodeKind};
    use crate::app::filter::FilterCriteria;
    use eframe::egui::vec2;

    fn graph() -> ProjectGraph {
        let nodes = ["a", "b", "c"]
            .into_iter()
            .map(|id| Node {
                id: id.to_owned(),
                kind: NodeKind::File,
                label: id.to_owned(),
                language: Some("rust".to_owned()),
                symbol_kind: None,
                path: Some(format!("src/{id}")),
                line: None,
                line_count: None,
            })
            .collect();
        let edges = vec![Edge {
            id: "e0".to_owned(),
            source_id: "a".to_owned(),
            target_id: "b".to_owned(),
            kind: EdgeKind::Imports,
        }];
        ProjectGraph::new("proj".to_owned(), nodes, edges)
    }

    #[test]
    fn positions_survive_a_rebuild_by_id() {
        let graph = graph();
        let visible = filter_graph(&graph, &FilterCriteria::default());

        let mut first = build_scene(&graph, &visible, None);
        assert!(!first.all_positioned());
        let positions = vec![vec2(1.0, 2.0), vec2(3.0, 4.0), vec2(5.0, 6.0)];
        first.set_positions(&positions);

        let second = build_scene(&graph, &visible, Some(first));
        assert!(second.all_positioned());
        let a = second.index_by_id["a"];
        assert_eq!(second.nodes[a].position, Some(vec2(1.0, 2.0)));
    }

    #[test]
    fn node_identity_is_order_independent() {
        let graph = graph();
        let visible = filter_graph(&graph, &FilterCriteria::default());
        let scene = build_scene(&graph, &visible, None);

        let mut reversed = visible.clone();
        reversed.node_indices.reverse();
        let scene_reversed = build_scene(&graph, &reversed, None);
        assert_eq!(scene.node_identity, scene_reversed.node_identity);
    }

    #[test]
    fn scene_adjacency_follows_visible_edges() {
        let graph = graph();
        let visible = filter_graph(&graph, &FilterCriteria::default());
        let scene = build_scene(&graph, &visible, None);

        let a = scene.index_by_id["a"];
        let b = scene.index_by_id["b"];
        assert!(scene.connected(a, b));
        assert!(scene.connected(b, a));
        let c = scene.index_by_id["c"];
        assert!(!scene.connected(a, c));
    }
}
