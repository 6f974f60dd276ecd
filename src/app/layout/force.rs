use eframe::egui::{Vec2, vec2};

use super::quadtree::Cell;

const BARNES_HUT_THETA: f32 = 0.75;
const ALPHA_START: f32 = 1.0;
const ALPHA_MIN: f32 = 0.02;
const TICK_SECONDS: f32 = 1.0 / 60.0;
const LIVE_COMMIT_INTERVAL_SECONDS: f32 = 0.05;
const VELOCITY_DAMPING: f32 = 0.86;
const MAX_SPEED: f32 = 24.0;
const CENTER_PULL: f32 = 0.012;

/// Total refinement ticks granted to a large graph after its seeded
/// placement; sliced into per-frame batches by the engine.
pub(super) const REFINE_TICK_BUDGET: usize = 192;

/// Resumable force-directed simulation. The owner drives it with
/// `step(budget)` once per frame; it never runs to convergence in one
/// call, so input handling and rendering stay responsive regardless of
/// graph size.
pub struct ForceSimulation {
    positions: Vec<Vec2>,
    velocities: Vec<Vec2>,
    edges: Vec<(usize, usize)>,
    forces: Vec<Vec2>,
    alpha: f32,
    alpha_decay: f32,
    repulsion: f32,
    spring_length: f32,
    min_separation: f32,
    batched: bool,
    ticks_remaining: usize,
    seconds_since_commit: f32,
}

impl ForceSimulation {
    pub fn new(initial_positions: Vec<Vec2>, edges: Vec<(usize, usize)>, batched: bool) -> Self {
        let node_count = initial_positions.len();
        let count = node_count as f32;

        // Larger graphs get weaker charge, tighter packing, and faster
        // annealing: they settle sooner at visibly lower precision.
        let repulsion = 26_000.0 / (1.0 + count / 150.0);
        let min_separation = (26.0 / (1.0 + count / 500.0)).max(8.0);
        let alpha_decay = if batched { 0.95 } else { 0.985 };

        Self {
            velocities: vec![Vec2::ZERO; node_count],
            forces: vec![Vec2::ZERO; node_count],
            positions: initial_positions,
            edges,
            alpha: ALPHA_START,
            alpha_decay,
            repulsion,
            spring_length: 100.0,
            min_separation,
            batched,
            ticks_remaining: REFINE_TICK_BUDGET,
            seconds_since_commit: 0.0,
        }
    }

    pub fn positions(&self) -> &[Vec2] {
        &self.positions
    }

    pub fn done(&self) -> bool {
        self.positions.len() < 2
            || self.alpha < ALPHA_MIN
            || (self.batched && self.ticks_remaining == 0)
    }

    /// Run at most `budget` ticks; returns true once the simulation has
    /// settled (alpha floor, or the batched refinement budget is spent).
    pub fn step(&mut self, budget: usize) -> bool {
        for _ in 0..budget {
            if self.done() {
                break;
            }
            self.tick();
        }
        self.done()
    }

    /// Live (small-graph) commit pacing: at most one model write per
    /// ~50ms of simulated time.
    pub fn live_commit_due(&mut self) -> bool {
        if self.batched || self.seconds_since_commit < LIVE_COMMIT_INTERVAL_SECONDS {
            return false;
        }
        self.seconds_since_commit = 0.0;
        true
    }

    fn tick(&mut self) {
        let node_count = self.positions.len();
        self.forces.fill(Vec2::ZERO);

        if let Some(tree) = Cell::build(&self.positions) {
            for index in 0..node_count {
                let mut force = Vec2::ZERO;
                self.accumulate_repulsion(&tree, index, &mut force);
                self.forces[index] += force;
            }
        }

        for &(source, target) in &self.edges {
            let delta = self.positions[source] - self.positions[target];
            let distance = delta.length();
            let direction = if distance > 1e-4 {
                delta / distance
            } else {
                fallback_direction(source, target)
            };

            let stretch = (distance - self.spring_length) * 0.018;
            let correction = direction * stretch;
            self.forces[source] -= correction;
            self.forces[target] += correction;
        }

        for (index, force) in self.forces.iter_mut().enumerate() {
            *force -= self.positions[index] * CENTER_PULL;
        }

        let anneal = self.alpha;
        for index in 0..node_count {
            let mut velocity =
                (self.velocities[index] + self.forces[index] * anneal) * VELOCITY_DAMPING;
            let speed = velocity.length();
            if speed > MAX_SPEED {
                velocity *= MAX_SPEED / speed;
            }
            self.velocities[index] = velocity;
            self.positions[index] += velocity;
        }

        self.alpha *= self.alpha_decay;
        self.ticks_remaining = self.ticks_remaining.saturating_sub(1);
        self.seconds_since_commit += TICK_SECONDS;
    }

    fn accumulate_repulsion(&self, cell: &Cell, index: usize, force: &mut Vec2) {
        if cell.mass <= 0.0 {
            return;
        }

        if let Some(children) = &cell.children {
            let point = self.positions[index];
            let delta = point - cell.center_of_mass;
            let distance_sq = delta.length_sq().max(1e-4);
            let distance = distance_sq.sqrt();
            let far_enough =
                !cell.contains(point) && (cell.side() / distance) < BARNES_HUT_THETA;

            if far_enough {
                let scaled = (self.repulsion * cell.mass) / (distance_sq + 600.0);
                *force += (delta / distance) * scaled;
                return;
            }

            for child in children.iter() {
                self.accumulate_repulsion(child, index, force);
            }
            return;
        }

        let point = self.positions[index];
        for &other in &cell.bodies {
            if other == index {
                continue;
            }

            let delta = point - self.positions[other];
            let distance_sq = delta.length_sq();
            let direction = if distance_sq > 1e-8 {
                delta / distance_sq.sqrt()
            } else {
                fallback_direction(index, other)
            };
            *force += direction * (self.repulsion / (distance_sq + 600.0));

            // Close-range overlap push; only exact leaf pairs ever get
            // near enough for it to matter.
            let distance = distance_sq.sqrt();
            if distance < self.min_separation {
                *force += direction * (self.min_separation - distance) * 1.6;
            }
        }
    }
}

/// Deterministic direction for coincident points, keyed by the index pair
/// so repeated runs split them the same way.
fn fallback_direction(a: usize, b: usize) -> Vec2 {
    let angle = ((a as f32) * 0.618_034 + (b as f32) * 0.414_214) * std::f32::consts::TAU;
    vec2(angle.cos(), angle.sin())
}
