use std::collections::VecDeque;

use eframe::egui::{Vec2, vec2};

/// Layered top-to-bottom placement. Ranks come from zero in-degree
/// peeling; when a cycle blocks the peel, the blocked node with the fewest
/// unresolved predecessors is forced through and its remaining incoming
/// edges stop counting toward rank. Disconnected components are laid out
/// independently and placed side by side.
pub fn layered_positions(node_count: usize, edges: &[(usize, usize)]) -> Vec<Vec2> {
    if node_count == 0 {
        return Vec::new();
    }

    let ranks = assign_ranks(node_count, edges);
    let components = component_labels(node_count, edges);
    let component_count = components.iter().copied().max().unwrap_or(0) + 1;

    let count = node_count as f32;
    let column_spacing = (150.0 / (1.0 + count / 300.0)).max(26.0);
    let row_spacing = (130.0 / (1.0 + count / 400.0)).max(34.0);
    let component_gap = column_spacing * 2.0;

    // rows[component][rank] = nodes in placement order.
    let max_rank = ranks.iter().copied().max().unwrap_or(0);
    let mut rows = vec![vec![Vec::new(); max_rank + 1]; component_count];
    for index in 0..node_count {
        rows[components[index]][ranks[index]].push(index);
    }

    let mut positions = vec![Vec2::ZERO; node_count];
    let mut offset_x = 0.0f32;
    for component_rows in &rows {
        let widest = component_rows
            .iter()
            .map(|row| row.len().saturating_sub(1) as f32 * column_spacing)
            .fold(0.0f32, f32::max);

        for (rank, row) in component_rows.iter().enumerate() {
            let row_width = row.len().saturating_sub(1) as f32 * column_spacing;
            for (slot, &index) in row.iter().enumerate() {
                positions[index] = vec2(
                    offset_x + (widest - row_width) * 0.5 + slot as f32 * column_spacing,
                    rank as f32 * row_spacing,
                );
            }
        }

        if component_rows.iter().any(|row| !row.is_empty()) {
            offset_x += widest + component_gap;
        }
    }

    center_at_origin(&mut positions);
    positions
}

pub fn assign_ranks(node_count: usize, edges: &[(usize, usize)]) -> Vec<usize> {
    let mut outgoing = vec![Vec::new(); node_count];
    let mut in_degree = vec![0usize; node_count];
    for &(source, target) in edges {
        if source >= node_count || target >= node_count || source == target {
            continue;
        }
        outgoing[source].push(target);
        in_degree[target] += 1;
    }

    let mut ranks = vec![0usize; node_count];
    let mut done = vec![false; node_count];
    let mut done_count = 0;
    let mut queue = (0..node_count)
        .filter(|&index| in_degree[index] == 0)
        .collect::<VecDeque<_>>();

    while done_count < node_count {
        while let Some(index) = queue.pop_front() {
            if done[index] {
                continue;
            }
            done[index] = true;
            done_count += 1;

            for &next in &outgoing[index] {
                if done[next] {
                    continue;
                }
                ranks[next] = ranks[next].max(ranks[index] + 1);
                in_degree[next] = in_degree[next].saturating_sub(1);
                if in_degree[next] == 0 {
                    queue.push_back(next);
                }
            }
        }

        if done_count == node_count {
            break;
        }

        // Cycle: force the least-blocked pending node through; its
        // remaining incoming edges become non-ranking.
        if let Some(forced) = (0..node_count)
            .filter(|&index| !done[index])
            .min_by_key(|&index| (in_degree[index], index))
        {
            in_degree[forced] = 0;
            queue.push_back(forced);
        } else {
            break;
        }
    }

    ranks
}

fn component_labels(node_count: usize, edges: &[(usize, usize)]) -> Vec<usize> {
    let mut neighbors = vec![Vec::new(); node_count];
    for &(source, target) in edges {
        if source >= node_count || target >= node_count || source == target {
            continue;
        }
        neighbors[source].push(target);
        neighbors[target].push(source);
    }

    let mut labels = vec![usize::MAX; node_count];
    let mut next_label = 0;
    let mut queue = VecDeque::new();
    for start in 0..node_count {
        if labels[start] != usize::MAX {
            continue;
        }
        labels[start] = next_label;
        queue.push_back(start);
        while let Some(index) = queue.pop_front() {
            for &neighbor in &neighbors[index] {
                if labels[neighbor] == usize::MAX {
                    labels[neighbor] = next_label;
                    queue.push_back(neighbor);
                }
            }
        }
        next_label += 1;
    }
    labels
}

fn center_at_origin(positions: &mut [Vec2]) {
    if positions.is_empty() {
        return;
    }
    let mut min = vec2(f32::INFINITY, f32::INFINITY);
    let mut max = vec2(f32::NEG_INFINITY, f32::NEG_INFINITY);
    for position in positions.iter() {
        min.x = min.x.min(position.x);
        min.y = min.y.min(position.y);
        max.x = max.x.max(position.x);
        max.y = max.y.max(position.y);
    }
    let center = (min + max) * 0.5;
    for position in positions.iter_mut() {
        *position -= center;
    }
}
