mod force;
mod hierarchical;
mod quadtree;
mod radial;

use eframe::egui::{Vec2, vec2};

pub use force::ForceSimulation;
pub use hierarchical::layered_positions;
pub use radial::{radial_positions, ring_assignments};

use crate::util::stable_pair;

use super::SceneGraph;

/// Node count above which force layout switches from live ticking to the
/// seeded-placement-plus-batched-refinement mode.
pub const BATCH_THRESHOLD_NODES: usize = 300;

/// Simulation ticks granted per frame; one batch is the most the UI
/// thread ever blocks on layout work.
pub const TICKS_PER_BATCH: usize = 16;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum LayoutAlgorithm {
    ForceDirected,
    Hierarchical,
    Radial,
}

impl LayoutAlgorithm {
    pub const ALL: [LayoutAlgorithm; 3] = [Self::ForceDirected, Self::Hierarchical, Self::Radial];

    pub fn label(self) -> &'static str {
        match self {
            Self::ForceDirected => "Force-directed",
            Self::Hierarchical => "Hierarchical",
            Self::Radial => "Radial",
        }
    }

    pub fn from_flag(value: &str) -> Option<Self> {
        match value {
            "force" => Some(Self::ForceDirected),
            "hierarchical" => Some(Self::Hierarchical),
            "radial" => Some(Self::Radial),
            _ => None,
        }
    }
}

/// Identity of one layout request; equal fingerprints with pre-existing
/// positions mean the pass can be skipped entirely.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct LayoutFingerprint {
    pub algorithm: LayoutAlgorithm,
    pub node_identity: u64,
    pub node_count: usize,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum LayoutPass {
    /// Fingerprint matched and every node already has a position.
    Skipped,
    /// Positions were assigned synchronously.
    Placed,
    /// Initial positions committed; a batched simulation keeps refining.
    Refining,
}

pub struct LayoutEngine {
    last_completed: Option<LayoutFingerprint>,
    simulation: Option<ForceSimulation>,
    passes_computed: u64,
}

impl LayoutEngine {
    pub fn new() -> Self {
        Self {
            last_completed: None,
            simulation: None,
            passes_computed: 0,
        }
    }

    pub fn passes_computed(&self) -> u64 {
        self.passes_computed
    }

    pub fn simulating(&self) -> bool {
        self.simulation.is_some()
    }

    /// Drop any in-flight simulation without committing further positions.
    pub fn cancel(&mut self) {
        self.simulation = None;
    }

    /// Forget the last fingerprint so the next request recomputes even on
    /// an identical node set (explicit re-layout action).
    pub fn invalidate(&mut self) {
        self.cancel();
        self.last_completed = None;
    }

    /// Decide skip-or-recompute for the current scene and, when computing,
    /// assign positions (synchronously for hierarchical/radial; seeded
    /// start plus a running simulation for force).
    pub fn request(
        &mut self,
        algorithm: LayoutAlgorithm,
        scene: &mut SceneGraph,
        canvas_size: Vec2,
    ) -> LayoutPass {
        let fingerprint = LayoutFingerprint {
            algorithm,
            node_identity: scene.node_identity,
            node_count: scene.nodes.len(),
        };

        if self.last_completed == Some(fingerprint) && scene.all_positioned() {
            return LayoutPass::Skipped;
        }

        // A new pass always supersedes whatever was still refining.
        self.simulation = None;
        self.passes_computed += 1;
        self.last_completed = Some(fingerprint);

        if scene.nodes.is_empty() {
            return LayoutPass::Placed;
        }

        let edges = scene.edge_pairs();
        match algorithm {
            LayoutAlgorithm::Hierarchical => {
                let positions = layered_positions(scene.nodes.len(), &edges);
                scene.set_positions(&positions);
                tracing::debug!(nodes = scene.nodes.len(), "hierarchical layout placed");
                LayoutPass::Placed
            }
            LayoutAlgorithm::Radial => {
                let positions = radial_positions(scene.nodes.len(), &edges);
                scene.set_positions(&positions);
                tracing::debug!(nodes = scene.nodes.len(), "radial layout placed");
                LayoutPass::Placed
            }
            LayoutAlgorithm::ForceDirected => {
                let batched = scene.nodes.len() > BATCH_THRESHOLD_NODES;
                let simulation =
                    ForceSimulation::new(initial_positions(scene, canvas_size), edges, batched);
                // Seeded coordinates become visible immediately; refinement
                // follows across frames.
                scene.set_positions(simulation.positions());
                self.simulation = Some(simulation);
                tracing::debug!(
                    nodes = scene.nodes.len(),
                    batched,
                    "force layout started"
                );
                LayoutPass::Refining
            }
        }
    }

    /// Run one batch of the in-flight simulation. Batched runs commit to
    /// the scene only on completion; live runs commit at the capped rate.
    /// Returns true while more batches remain.
    pub fn advance(&mut self, scene: &mut SceneGraph) -> bool {
        let Some(simulation) = self.simulation.as_mut() else {
            return false;
        };

        if simulation.step(TICKS_PER_BATCH) {
            scene.set_positions(simulation.positions());
            self.simulation = None;
            tracing::debug!("force layout settled");
            return false;
        }

        if simulation.live_commit_due() {
            scene.set_positions(simulation.positions());
        }
        true
    }
}

fn initial_positions(scene: &SceneGraph, canvas_size: Vec2) -> Vec<Vec2> {
    let spread = ((scene.nodes.len() as f32).sqrt() * 46.0)
        .min(canvas_size.min_elem().max(200.0) * 1.5);

    scene
        .nodes
        .iter()
        .map(|node| match node.position {
            Some(position) if position.x.is_finite() && position.y.is_finite() => position,
            _ => {
                let (x, y) = stable_pair(&node.id);
                vec2(x, y) * spread
            }
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::analyzer::{Edge, EdgeKind, Node, NodeKind, ProjectGraph};
    use crate::app::filter::{FilterCriteria, filter_graph};
    use crate::app::graph::build_scene;

    fn canvas() -> Vec2 {
        vec2(800.0, 600.0)
    }

    fn graph(ids: &[&str], edges: &[(&str, &str)]) -> ProjectGraph {
        let nodes = ids
            .iter()
            .map(|id| Node {
                id: (*id).to_owned(),
                kind: NodeKind::File,
                label: (*id).to_owned(),
                language: Some("rust".to_owned()),
                symbol_kind: None,
                path: Some(format!("src/{id}")),
                line: None,
                line_count: None,
            })
            .collect();
        let edges = edges
            .iter()
            .enumerate()
            .map(|(index, (source, target))| Edge {
                id: format!("e{index}"),
                source_id: (*source).to_owned(),
                target_id: (*target).to_owned(),
                kind: EdgeKind::Imports,
            })
            .collect();
        ProjectGraph::new("proj".to_owned(), nodes, edges)
    }

    fn scene_for(graph: &ProjectGraph) -> SceneGraph {
        let visible = filter_graph(graph, &FilterCriteria::default());
        build_scene(graph, &visible, None)
    }

    #[test]
    fn matching_fingerprint_with_positions_skips_recompute() {
        let graph = graph(&["a", "b", "c"], &[("a", "b"), ("b", "c")]);
        let mut scene = scene_for(&graph);
        let mut engine = LayoutEngine::new();

        let first = engine.request(LayoutAlgorithm::Hierarchical, &mut scene, canvas());
        assert_eq!(first, LayoutPass::Placed);
        assert_eq!(engine.passes_computed(), 1);
        let snapshot = scene
            .nodes
            .iter()
            .map(|node| node.position)
            .collect::<Vec<_>>();

        let second = engine.request(LayoutAlgorithm::Hierarchical, &mut scene, canvas());
        assert_eq!(second, LayoutPass::Skipped);
        assert_eq!(engine.passes_computed(), 1);
        let unchanged = scene
            .nodes
            .iter()
            .map(|node| node.position)
            .collect::<Vec<_>>();
        assert_eq!(snapshot, unchanged);
    }

    #[test]
    fn switching_algorithms_forces_a_new_pass() {
        let graph = graph(&["a", "b"], &[("a", "b")]);
        let mut scene = scene_for(&graph);
        let mut engine = LayoutEngine::new();

        engine.request(LayoutAlgorithm::Hierarchical, &mut scene, canvas());
        engine.request(LayoutAlgorithm::Radial, &mut scene, canvas());
        assert_eq!(engine.passes_computed(), 2);
    }

    #[test]
    fn fresh_scene_without_positions_always_computes() {
        let graph = graph(&["a", "b"], &[("a", "b")]);
        let mut scene = scene_for(&graph);
        let mut engine = LayoutEngine::new();

        engine.request(LayoutAlgorithm::Hierarchical, &mut scene, canvas());

        // Same node set, same algorithm, but a rebuilt scene that lost its
        // positions must get a fresh pass despite the fingerprint match.
        let visible = filter_graph(&graph, &FilterCriteria::default());
        let mut fresh = build_scene(&graph, &visible, None);
        assert!(!fresh.all_positioned());
        let pass = engine.request(LayoutAlgorithm::Hierarchical, &mut fresh, canvas());
        assert_eq!(pass, LayoutPass::Placed);
        assert_eq!(engine.passes_computed(), 2);
    }

    #[test]
    fn force_layout_commits_seeds_then_refines_in_batches() {
        let graph = graph(&["a", "b", "c", "d"], &[("a", "b"), ("a", "c"), ("c", "d")]);
        let mut scene = scene_for(&graph);
        let mut engine = LayoutEngine::new();

        let pass = engine.request(LayoutAlgorithm::ForceDirected, &mut scene, canvas());
        assert_eq!(pass, LayoutPass::Refining);
        assert!(scene.all_positioned());
        assert!(engine.simulating());

        let mut batches = 0;
        while engine.advance(&mut scene) {
            batches += 1;
            assert!(batches < 1_000, "simulation must settle");
        }
        assert!(!engine.simulating());
        assert!(scene.all_positioned());
    }

    #[test]
    fn new_request_cancels_the_running_simulation() {
        let graph = graph(&["a", "b", "c"], &[("a", "b")]);
        let mut scene = scene_for(&graph);
        let mut engine = LayoutEngine::new();

        engine.request(LayoutAlgorithm::ForceDirected, &mut scene, canvas());
        assert!(engine.simulating());
        engine.request(LayoutAlgorithm::Radial, &mut scene, canvas());
        assert!(!engine.simulating());
    }
}
