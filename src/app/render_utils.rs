use eframe::egui::{Color32, Painter, Pos2, Rect, Stroke, Vec2, pos2, vec2};

use crate::analyzer::SymbolKind;

use super::viewport::ViewportState;

pub(super) fn blend_color(base: Color32, overlay: Color32, amount: f32) -> Color32 {
    let amount = amount.clamp(0.0, 1.0);
    let inverse = 1.0 - amount;

    Color32::from_rgba_unmultiplied(
        ((base.r() as f32 * inverse) + (overlay.r() as f32 * amount)) as u8,
        ((base.g() as f32 * inverse) + (overlay.g() as f32 * amount)) as u8,
        ((base.b() as f32 * inverse) + (overlay.b() as f32 * amount)) as u8,
        ((base.a() as f32 * inverse) + (overlay.a() as f32 * amount)) as u8,
    )
}

pub(super) fn dim_color(color: Color32, factor: f32) -> Color32 {
    let factor = factor.clamp(0.0, 1.0);
    Color32::from_rgba_unmultiplied(
        (color.r() as f32 * factor) as u8,
        (color.g() as f32 * factor) as u8,
        (color.b() as f32 * factor) as u8,
        (color.a() as f32 * (0.45 + (factor * 0.55))) as u8,
    )
}

pub(super) fn draw_background(painter: &Painter, rect: Rect, viewport: ViewportState) {
    painter.rect_filled(rect, 0.0, Color32::from_rgb(19, 23, 29));

    let step = (56.0 * viewport.scale().clamp(0.6, 1.8)).max(20.0);
    let origin = viewport.world_to_screen(rect, Vec2::ZERO);

    let mut x = (origin.x - rect.left()).rem_euclid(step) + rect.left();
    while x < rect.right() {
        painter.line_segment(
            [pos2(x, rect.top()), pos2(x, rect.bottom())],
            Stroke::new(1.0, Color32::from_rgba_unmultiplied(60, 70, 80, 70)),
        );
        x += step;
    }

    let mut y = (origin.y - rect.top()).rem_euclid(step) + rect.top();
    while y < rect.bottom() {
        painter.line_segment(
            [pos2(rect.left(), y), pos2(rect.right(), y)],
            Stroke::new(1.0, Color32::from_rgba_unmultiplied(60, 70, 80, 70)),
        );
        y += step;
    }
}

pub(super) fn circle_visible(rect: Rect, position: Pos2, radius: f32) -> bool {
    !(position.x + radius < rect.left()
        || position.x - radius > rect.right()
        || position.y + radius < rect.top()
        || position.y - radius > rect.bottom())
}

pub(super) fn edge_visible(rect: Rect, start: Pos2, end: Pos2, padding: f32) -> bool {
    let min_x = start.x.min(end.x) - padding;
    let max_x = start.x.max(end.x) + padding;
    let min_y = start.y.min(end.y) - padding;
    let max_y = start.y.max(end.y) + padding;

    !(max_x < rect.left() || min_x > rect.right() || max_y < rect.top() || min_y > rect.bottom())
}

fn normalize_log(value: u64, min: u64, max: u64) -> f32 {
    let min = min.max(1) as f64;
    let max = (max as f64).max(min);
    let value = (value.max(1) as f64).clamp(min, max);

    let denominator = max.ln() - min.ln();
    if denominator.abs() < f64::EPSILON {
        return 0.5;
    }

    ((value.ln() - min.ln()) / denominator).clamp(0.0, 1.0) as f32
}

/// Marker radius grows with relationship degree on a log scale, so hub
/// nodes stand out without dwarfing everything else.
pub(super) fn node_radius(degree: usize, min_degree: usize, max_degree: usize) -> f32 {
    6.0 + (normalize_log(degree as u64, min_degree as u64, max_degree as u64) * 18.0)
}

const LANGUAGE_PALETTE: [Color32; 8] = [
    Color32::from_rgb(86, 156, 214),
    Color32::from_rgb(78, 201, 176),
    Color32::from_rgb(220, 163, 86),
    Color32::from_rgb(197, 134, 192),
    Color32::from_rgb(156, 204, 101),
    Color32::from_rgb(229, 115, 115),
    Color32::from_rgb(121, 134, 203),
    Color32::from_rgb(77, 182, 172),
];

pub(super) fn language_color(language: Option<&str>) -> Color32 {
    let Some(language) = language else {
        return Color32::from_rgb(140, 150, 160);
    };
    let index = crate::util::id_hash(language) as usize % LANGUAGE_PALETTE.len();
    LANGUAGE_PALETTE[index]
}

pub(super) fn symbol_color(kind: Option<SymbolKind>) -> Color32 {
    match kind {
        Some(SymbolKind::Function | SymbolKind::Method) => Color32::from_rgb(220, 208, 143),
        Some(SymbolKind::Class | SymbolKind::Struct | SymbolKind::Enum) => {
            Color32::from_rgb(78, 201, 176)
        }
        Some(SymbolKind::Interface | SymbolKind::Trait | SymbolKind::TypeAlias) => {
            Color32::from_rgb(184, 134, 214)
        }
        Some(SymbolKind::Variable | SymbolKind::Constant) => Color32::from_rgb(156, 220, 254),
        Some(SymbolKind::Module) => Color32::from_rgb(220, 163, 86),
        None => Color32::from_rgb(140, 150, 160),
    }
}

/// Arrowhead triangle for a directed edge, pulled back so it rests on the
/// target node's rim instead of underneath it. Returns `None` for edges
/// too short to have a direction (coincident endpoints included).
pub(super) fn arrowhead(start: Pos2, end: Pos2, target_radius: f32) -> Option<[Pos2; 3]> {
    let delta = end - start;
    let length = delta.length();
    if length < 1e-3 || length <= target_radius + 4.0 {
        return None;
    }

    let direction = delta / length;
    let tip = end - direction * (target_radius + 2.0);
    let size = 6.0;
    let normal = vec2(-direction.y, direction.x);
    let base = tip - direction * size;
    Some([
        tip,
        base + normal * (size * 0.5),
        base - normal * (size * 0.5),
    ])
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn arrowhead_skips_degenerate_edges() {
        let point = pos2(10.0, 10.0);
        assert!(arrowhead(point, point, 5.0).is_none());
        assert!(arrowhead(pos2(0.0, 0.0), pos2(4.0, 0.0), 5.0).is_none());
    }

    #[test]
    fn arrowhead_tip_rests_on_the_node_rim() {
        let tip = arrowhead(pos2(0.0, 0.0), pos2(100.0, 0.0), 10.0).expect("long edge")[0];
        assert!((tip.x - 88.0).abs() < 1e-3);
        assert_eq!(tip.y, 0.0);
    }

    #[test]
    fn node_radius_is_monotonic_in_degree() {
        let small = node_radius(1, 1, 64);
        let large = node_radius(64, 1, 64);
        assert!(small < large);
        assert_eq!(node_radius(3, 3, 3), 6.0 + 0.5 * 18.0);
    }
}
