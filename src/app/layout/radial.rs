use std::collections::VecDeque;

use eframe::egui::{Vec2, vec2};

/// Concentric placement around the graph's roots. Ring = shortest hop
/// distance from any root over the visible directed edges.
pub fn radial_positions(node_count: usize, edges: &[(usize, usize)]) -> Vec<Vec2> {
    if node_count == 0 {
        return Vec::new();
    }

    let rings = ring_assignments(node_count, edges);
    let max_ring = rings.iter().copied().max().unwrap_or(0);

    let count = node_count as f32;
    let base_radius = (160.0 / (1.0 + count / 250.0).sqrt()).max(44.0);

    let mut ring_members = vec![Vec::new(); max_ring + 1];
    for index in 0..node_count {
        ring_members[rings[index]].push(index);
    }

    let mut positions = vec![Vec2::ZERO; node_count];
    for (ring, members) in ring_members.iter().enumerate() {
        if members.is_empty() {
            continue;
        }

        // A lone node on the innermost ring sits at dead center; several
        // ring-0 nodes spread on a half-radius circle so they never stack.
        let radius = if ring == 0 {
            if members.len() == 1 {
                positions[members[0]] = Vec2::ZERO;
                continue;
            }
            base_radius * 0.5
        } else {
            base_radius * ring as f32
        };

        let angle_step = std::f32::consts::TAU / members.len() as f32;
        let ring_offset = ring as f32 * 0.5;
        for (slot, &index) in members.iter().enumerate() {
            let angle = slot as f32 * angle_step + ring_offset;
            positions[index] = vec2(angle.cos(), angle.sin()) * radius;
        }
    }

    positions
}

/// Roots are nodes with zero incoming visible edges; a graph where every
/// node has an incoming edge falls back to treating each node as its own
/// root, so the traversal is never empty. Unreached nodes default to
/// ring 0.
pub fn ring_assignments(node_count: usize, edges: &[(usize, usize)]) -> Vec<usize> {
    let mut outgoing = vec![Vec::new(); node_count];
    let mut in_degree = vec![0usize; node_count];
    for &(source, target) in edges {
        if source >= node_count || target >= node_count || source == target {
            continue;
        }
        outgoing[source].push(target);
        in_degree[target] += 1;
    }

    let roots = (0..node_count)
        .filter(|&index| in_degree[index] == 0)
        .collect::<Vec<_>>();
    let roots = if roots.is_empty() {
        (0..node_count).collect()
    } else {
        roots
    };

    let mut rings = vec![0usize; node_count];
    let mut visited = vec![false; node_count];
    let mut queue = VecDeque::new();
    for root in roots {
        visited[root] = true;
        queue.push_back(root);
    }

    while let Some(index) = queue.pop_front() {
        for &next in &outgoing[index] {
            if visited[next] {
                continue;
            }
            visited[next] = true;
            rings[next] = rings[index] + 1;
            queue.push_back(next);
        }
    }

    rings
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn star_rings_grow_from_the_root() {
        let rings = ring_assignments(4, &[(0, 1), (0, 2), (0, 3)]);
        assert_eq!(rings, vec![0, 1, 1, 1]);

        let positions = radial_positions(4, &[(0, 1), (0, 2), (0, 3)]);
        assert_eq!(positions[0], Vec2::ZERO);
        for position in &positions[1..] {
            assert!(position.length() > 1.0);
        }
    }

    #[test]
    fn fully_cyclic_graph_assigns_every_node_a_ring() {
        let edges = [(0, 1), (1, 2), (2, 0)];
        let rings = ring_assignments(3, &edges);
        assert_eq!(rings.len(), 3);
        // No roots exist, so every node becomes its own root at ring 0.
        assert!(rings.iter().all(|&ring| ring == 0));

        let positions = radial_positions(3, &edges);
        for a in 0..3 {
            for b in (a + 1)..3 {
                assert!((positions[a] - positions[b]).length() > 1.0);
            }
        }
    }

    #[test]
    fn unreached_nodes_default_to_ring_zero() {
        // 0 -> 1 plus an isolated cycle 2 <-> 3 that no root reaches.
        let rings = ring_assignments(4, &[(0, 1), (2, 3), (3, 2)]);
        assert_eq!(rings[0], 0);
        assert_eq!(rings[1], 1);
        assert_eq!(rings[2], 0);
        assert_eq!(rings[3], 0);
    }

    #[test]
    fn ring_distance_is_shortest_hops() {
        // Two routes to node 3: 0->1->3 and 0->3.
        let rings = ring_assignments(4, &[(0, 1), (1, 3), (0, 3), (0, 2)]);
        assert_eq!(rings[3], 1);
    }

    #[test]
    fn single_node_sits_at_dead_center() {
        let positions = radial_positions(1, &[]);
        assert_eq!(positions, vec![Vec2::ZERO]);
    }
}
