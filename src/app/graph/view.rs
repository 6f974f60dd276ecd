use eframe::egui::{self, Align2, Color32, FontId, Rect, Sense, Stroke, Ui, Vec2, vec2};

use crate::analyzer::NodeKind;
use crate::util::short_label;

use super::super::filter::{VisualState, derive_visual_state};
use super::super::render_utils::{
    arrowhead, blend_color, circle_visible, dim_color, draw_background, edge_visible,
    language_color, symbol_color,
};
use super::super::viewport::{FitKey, ViewportState, position_checksum};
use super::super::{SceneGraph, ViewModel};

const SELECTED_COLOR: Color32 = Color32::from_rgb(245, 206, 93);
const HOVERED_COLOR: Color32 = Color32::from_rgb(255, 164, 101);
const MATCH_COLOR: Color32 = Color32::from_rgb(103, 196, 255);

impl ViewModel {
    pub(in crate::app) fn draw_graph(&mut self, ui: &mut Ui) {
        if self.scene_dirty {
            self.rebuild_scene();
        }

        let (rect, response) = ui.allocate_exact_size(ui.available_size(), Sense::click_and_drag());
        let painter = ui.painter_at(rect);
        let now = ui.input(|input| input.time);
        self.last_canvas_size = rect.size();

        draw_background(&painter, rect, self.viewport.effective());

        // Direct-path gesture handling happens before anything reads the
        // transform, so this frame already renders the live value.
        self.handle_zoom(ui, rect, &response, now);
        self.handle_pan(&response);
        let pointer_down = ui.input(|input| input.pointer.any_down());
        self.viewport.settle(pointer_down, now);
        if self.viewport.gesture_active() {
            ui.ctx().request_repaint();
        }

        let algorithm = self.algorithm;
        let view_mode = self.criteria.view_mode;

        let Some(scene) = self.scene.as_mut() else {
            self.visible_node_count = 0;
            self.visible_edge_count = 0;
            self.hovered = None;
            painter.text(
                rect.center(),
                Align2::CENTER_CENTER,
                "No nodes match the current filters.",
                FontId::proportional(14.0),
                Color32::from_gray(160),
            );
            return;
        };

        self.layout.request(algorithm, scene, rect.size());
        if self.layout.advance(scene) {
            ui.ctx().request_repaint();
        }

        if scene.all_positioned() {
            let key = FitKey {
                view_mode,
                node_count: scene.nodes.len(),
                algorithm,
                position_checksum: position_checksum(scene.positions()),
            };
            self.auto_fit.observe(key, now);
            if self.auto_fit.due(now).is_some() {
                let fitted = ViewportState::fit_to_bounds(scene.positions(), rect.size());
                self.viewport.reconcile(fitted);
            } else if self.auto_fit.pending() {
                ui.ctx()
                    .request_repaint_after(std::time::Duration::from_millis(40));
            }
        }

        let viewport = self.viewport.effective();
        update_screen_space(rect, viewport, scene);
        self.visible_node_count = scene.view_scratch.visible_indices.len();

        let hovered = Self::hovered_index(
            ui,
            &scene.view_scratch.visible_indices,
            &scene.view_scratch.screen_positions,
            &scene.view_scratch.screen_radii,
        );
        self.hovered = hovered.map(|(index, _)| index);
        if hovered.is_some() {
            ui.output_mut(|output| {
                output.cursor_icon = egui::CursorIcon::PointingHand;
            });
        }

        let pending_selection = if response.clicked_by(egui::PointerButton::Primary) {
            Some(
                hovered.and_then(|(index, _)| scene.nodes.get(index).map(|node| node.id.clone())),
            )
        } else {
            None
        };

        let selected_index = self
            .selected
            .as_ref()
            .and_then(|id| scene.index_by_id.get(id).copied());
        let selection_active = selected_index.is_some();
        let searching = scene.has_search_query;
        let zoom_sqrt = viewport.scale().sqrt();

        // Edges first, nodes above them.
        let mut drawn_edges = 0usize;
        for edge in &scene.edges {
            let start = scene.view_scratch.screen_positions[edge.source];
            let end = scene.view_scratch.screen_positions[edge.target];
            let either_on_screen = scene.view_scratch.visible_mask[edge.source]
                || scene.view_scratch.visible_mask[edge.target];
            if !either_on_screen && !edge_visible(rect, start, end, 2.5) {
                continue;
            }

            let touches_selection = selected_index
                .is_some_and(|selected| edge.source == selected || edge.target == selected);
            let (width, color) = if touches_selection {
                (
                    (2.4 * zoom_sqrt).clamp(1.2, 4.2),
                    Color32::from_rgb(241, 146, 94),
                )
            } else if selection_active || searching {
                (
                    (0.9 * zoom_sqrt).clamp(0.5, 2.0),
                    Color32::from_rgba_unmultiplied(80, 90, 104, 110),
                )
            } else {
                (
                    (1.2 * zoom_sqrt).clamp(0.6, 3.0),
                    Color32::from_rgba_unmultiplied(104, 110, 120, 170),
                )
            };

            painter.line_segment([start, end], Stroke::new(width, color));
            if let Some(points) =
                arrowhead(start, end, scene.view_scratch.screen_radii[edge.target])
            {
                painter.add(egui::Shape::convex_polygon(
                    points.to_vec(),
                    color,
                    Stroke::NONE,
                ));
            }
            drawn_edges += 1;
        }
        self.visible_edge_count = drawn_edges;

        let hovered_index = hovered.map(|(index, _)| index);
        let mut deferred = Vec::new();
        for &index in &scene.view_scratch.visible_indices {
            let is_selected = selected_index == Some(index);
            let is_hovered = hovered_index == Some(index);
            if is_selected || is_hovered {
                deferred.push(index);
                continue;
            }
            draw_node(
                &painter,
                scene,
                index,
                node_state(scene, index, selected_index, hovered_index),
                viewport,
            );
        }
        for index in deferred {
            draw_node(
                &painter,
                scene,
                index,
                node_state(scene, index, selected_index, hovered_index),
                viewport,
            );
        }

        draw_minimap(&painter, rect, scene, viewport);

        if let Some((index, _)) = hovered {
            let node = &scene.nodes[index];
            let incoming = self.graph.incoming[node.model_index].len();
            let outgoing = self.graph.outgoing[node.model_index].len();
            draw_hover_popover(&painter, rect, scene, index, incoming, outgoing);
        }

        if let Some(selection) = pending_selection {
            self.set_selected(selection);
        }
    }
}

fn node_state(
    scene: &SceneGraph,
    index: usize,
    selected_index: Option<usize>,
    hovered_index: Option<usize>,
) -> VisualState {
    derive_visual_state(
        selected_index == Some(index),
        hovered_index == Some(index),
        scene.search_matches.contains(&index),
        scene.has_search_query,
        selected_index.is_some(),
        selected_index.is_some_and(|selected| scene.connected(index, selected)),
    )
}

fn update_screen_space(rect: Rect, viewport: ViewportState, scene: &mut SceneGraph) {
    let nodes = &scene.nodes;
    let scratch = &mut scene.view_scratch;
    scratch.screen_positions.clear();
    scratch.screen_radii.clear();
    scratch.visible_indices.clear();
    scratch.visible_mask.clear();
    scratch.visible_mask.resize(nodes.len(), false);

    let zoom_exponent = viewport.scale().powf(0.40);
    for (index, node) in nodes.iter().enumerate() {
        let world = node.position.unwrap_or(Vec2::ZERO);
        let screen = viewport.world_to_screen(rect, world);
        let radius = (node.base_radius * zoom_exponent).clamp(2.5, 42.0);
        scratch.screen_positions.push(screen);
        scratch.screen_radii.push(radius);
        if circle_visible(rect, screen, radius) {
            scratch.visible_indices.push(index);
            scratch.visible_mask[index] = true;
        }
    }
}

fn draw_node(
    painter: &egui::Painter,
    scene: &SceneGraph,
    index: usize,
    state: VisualState,
    viewport: ViewportState,
) {
    let node = &scene.nodes[index];
    let position = scene.view_scratch.screen_positions[index];
    let radius = scene.view_scratch.screen_radii[index];

    let base = match node.kind {
        NodeKind::File => language_color(node.language.as_deref()),
        NodeKind::Symbol => symbol_color(node.symbol_kind),
    };

    let (fill, stroke_width) = match state {
        VisualState::Selected => (blend_color(base, SELECTED_COLOR, 0.78), 2.2),
        VisualState::Hovered => (blend_color(base, HOVERED_COLOR, 0.55), 1.6),
        VisualState::SearchMatch => (blend_color(base, MATCH_COLOR, 0.65), 1.55),
        VisualState::Faded => (dim_color(base, 0.38), 1.0),
        VisualState::Default => (base, 1.0),
    };

    painter.circle_filled(position, radius, fill);
    painter.circle_stroke(
        position,
        radius,
        Stroke::new(
            stroke_width,
            Color32::from_rgba_unmultiplied(15, 15, 15, 190),
        ),
    );
    if state == VisualState::Selected {
        painter.circle_stroke(
            position,
            radius + 4.0,
            Stroke::new(1.4, Color32::from_rgba_unmultiplied(245, 206, 93, 150)),
        );
    }

    let labelled = matches!(
        state,
        VisualState::Selected | VisualState::Hovered | VisualState::SearchMatch
    );
    if labelled || radius > 15.0 || viewport.scale() > 1.35 {
        let label_color = if state == VisualState::Faded {
            Color32::from_gray(120)
        } else {
            Color32::from_gray(238)
        };
        painter.text(
            position + vec2(radius + 5.0, 0.0),
            Align2::LEFT_CENTER,
            short_label(&node.label),
            FontId::proportional(12.0),
            label_color,
        );
    }
}

/// Scaled-down overview in the corner; reuses the fit-to-bounds transform
/// so map and main view always agree on the world box.
fn draw_minimap(painter: &egui::Painter, canvas: Rect, scene: &SceneGraph, viewport: ViewportState) {
    if scene.nodes.len() < 2 {
        return;
    }

    let size = vec2(180.0, 132.0);
    let rect = Rect::from_min_size(canvas.right_bottom() - size - vec2(12.0, 12.0), size);
    painter.rect_filled(rect, 4.0, Color32::from_rgba_unmultiplied(12, 14, 18, 216));
    stroke_rect(
        painter,
        rect,
        Stroke::new(1.0, Color32::from_rgba_unmultiplied(90, 100, 112, 160)),
    );

    let map = ViewportState::fit_to_bounds(scene.positions(), rect.size() - vec2(16.0, 16.0));
    for node in &scene.nodes {
        let Some(world) = node.position else {
            continue;
        };
        painter.circle_filled(
            map.world_to_screen(rect, world),
            1.6,
            Color32::from_rgba_unmultiplied(170, 180, 190, 190),
        );
    }

    // Current viewport footprint in minimap space.
    let world_min = viewport.screen_to_world(canvas, canvas.left_top());
    let world_max = viewport.screen_to_world(canvas, canvas.right_bottom());
    let view_min = map.world_to_screen(rect, world_min);
    let view_max = map.world_to_screen(rect, world_max);
    let view_rect = Rect::from_two_pos(view_min, view_max).intersect(rect.shrink(1.0));
    if view_rect.is_positive() {
        stroke_rect(
            painter,
            view_rect,
            Stroke::new(1.0, Color32::from_rgba_unmultiplied(245, 206, 93, 200)),
        );
    }
}

fn stroke_rect(painter: &egui::Painter, rect: Rect, stroke: Stroke) {
    painter.line_segment([rect.left_top(), rect.right_top()], stroke);
    painter.line_segment([rect.right_top(), rect.right_bottom()], stroke);
    painter.line_segment([rect.right_bottom(), rect.left_bottom()], stroke);
    painter.line_segment([rect.left_bottom(), rect.left_top()], stroke);
}

fn draw_hover_popover(
    painter: &egui::Painter,
    canvas: Rect,
    scene: &SceneGraph,
    index: usize,
    incoming: usize,
    outgoing: usize,
) {
    let node = &scene.nodes[index];
    let kind_label = match node.kind {
        NodeKind::File => node.language.as_deref().unwrap_or("file"),
        NodeKind::Symbol => node
            .symbol_kind
            .map(|kind| kind.label())
            .unwrap_or("symbol"),
    };
    let text = format!(
        "{}  ·  {}  ·  in {}  out {}",
        short_label(&node.label),
        kind_label,
        incoming,
        outgoing
    );

    let galley = painter.layout_no_wrap(text, FontId::proportional(12.5), Color32::from_gray(240));
    let anchor = scene.view_scratch.screen_positions[index];
    let radius = scene.view_scratch.screen_radii[index];
    let mut origin = anchor + vec2(radius + 10.0, -radius - galley.size().y - 10.0);
    origin.x = origin
        .x
        .min(canvas.right() - galley.size().x - 16.0)
        .max(canvas.left() + 4.0);
    origin.y = origin
        .y
        .min(canvas.bottom() - galley.size().y - 12.0)
        .max(canvas.top() + 4.0);

    let background = Rect::from_min_size(origin, galley.size() + vec2(12.0, 8.0));
    painter.rect_filled(background, 4.0, Color32::from_rgba_unmultiplied(12, 14, 18, 232));
    painter.galley(origin + vec2(6.0, 4.0), galley, Color32::from_gray(240));
}
