use eframe::egui::{Vec2, vec2};

const LEAF_CAPACITY: usize = 8;
const MAX_DEPTH: usize = 12;

/// Square region of graph space with aggregate mass, used for Barnes-Hut
/// approximation of pairwise repulsion.
pub(super) struct Cell {
    pub(super) center: Vec2,
    pub(super) half: f32,
    pub(super) mass: f32,
    pub(super) center_of_mass: Vec2,
    pub(super) bodies: Vec<usize>,
    pub(super) children: Option<Box<[Cell; 4]>>,
}

impl Cell {
    pub(super) fn build(positions: &[Vec2]) -> Option<Self> {
        let mut min = vec2(f32::INFINITY, f32::INFINITY);
        let mut max = vec2(f32::NEG_INFINITY, f32::NEG_INFINITY);
        for position in positions {
            min.x = min.x.min(position.x);
            min.y = min.y.min(position.y);
            max.x = max.x.max(position.x);
            max.y = max.y.max(position.y);
        }
        if !min.x.is_finite() || !min.y.is_finite() || !max.x.is_finite() || !max.y.is_finite() {
            return None;
        }

        let center = (min + max) * 0.5;
        let half = ((max.x - min.x).max(max.y - min.y) * 0.5).max(1.0) + 1.0;
        let bodies = (0..positions.len()).collect();
        Some(Self::partition(center, half, bodies, positions, 0))
    }

    fn partition(center: Vec2, half: f32, bodies: Vec<usize>, positions: &[Vec2], depth: usize) -> Self {
        let mass = bodies.len() as f32;
        let mut center_of_mass = Vec2::ZERO;
        for &body in &bodies {
            center_of_mass += positions[body];
        }
        if mass > 0.0 {
            center_of_mass /= mass;
        }

        let mut cell = Self {
            center,
            half,
            mass,
            center_of_mass,
            bodies,
            children: None,
        };

        if cell.bodies.len() <= LEAF_CAPACITY || depth >= MAX_DEPTH {
            return cell;
        }

        let mut buckets: [Vec<usize>; 4] = std::array::from_fn(|_| Vec::new());
        for &body in &cell.bodies {
            buckets[quadrant_of(center, positions[body])].push(body);
        }
        // All bodies piled into one quadrant (coincident points): splitting
        // further cannot separate them, so stay a leaf.
        if buckets.iter().filter(|bucket| !bucket.is_empty()).count() <= 1 {
            return cell;
        }

        let quarter = half * 0.5;
        let mut buckets = buckets.into_iter();
        let children = std::array::from_fn(|quadrant| {
            let bucket = buckets.next().unwrap_or_default();
            Self::partition(
                center + quadrant_offset(quadrant, quarter),
                quarter,
                bucket,
                positions,
                depth + 1,
            )
        });
        cell.bodies.clear();
        cell.children = Some(Box::new(children));
        cell
    }

    pub(super) fn is_leaf(&self) -> bool {
        self.children.is_none()
    }

    pub(super) fn side(&self) -> f32 {
        self.half * 2.0
    }

    pub(super) fn contains(&self, point: Vec2) -> bool {
        (point.x - self.center.x).abs() <= self.half
            && (point.y - self.center.y).abs() <= self.half
    }
}

fn quadrant_of(center: Vec2, point: Vec2) -> usize {
    ((point.x >= center.x) as usize) | (((point.y >= center.y) as usize) << 1)
}

fn quadrant_offset(quadrant: usize, quarter: f32) -> Vec2 {
    let x = if quadrant & 1 == 0 { -quarter } else { quarter };
    let y = if quadrant & 2 == 0 { -quarter } else { quarter };
    vec2(x, y)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn tree_aggregates_all_mass() {
        let positions = (0..40)
            .map(|index| vec2((index % 8) as f32 * 10.0, (index / 8) as f32 * 10.0))
            .collect::<Vec<_>>();
        let root = Cell::build(&positions).expect("bounded points build a tree");
        assert_eq!(root.mass as usize, positions.len());
        assert!(!root.is_leaf());
    }

    #[test]
    fn coincident_points_stay_in_one_leaf() {
        let positions = vec![vec2(5.0, 5.0); 30];
        let root = Cell::build(&positions).expect("tree");
        assert!(root.is_leaf());
        assert_eq!(root.bodies.len(), 30);
    }

    #[test]
    fn non_finite_points_refuse_to_build() {
        let positions = vec![vec2(f32::NAN, 0.0)];
        assert!(Cell::build(&positions).is_none());
    }
}
