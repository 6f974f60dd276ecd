use eframe::egui::{self, Pos2, Rect, Ui};

use super::super::ViewModel;
use super::super::viewport::ViewportState;

impl ViewModel {
    /// Wheel zoom goes through the viewport's direct path: the live
    /// transform changes on every event and is committed once after the
    /// wheel goes idle.
    pub(in crate::app) fn handle_zoom(
        &mut self,
        ui: &Ui,
        rect: Rect,
        response: &egui::Response,
        now: f64,
    ) {
        if !response.hovered() {
            return;
        }

        let scroll = ui.input(|input| input.raw_scroll_delta.y);
        if scroll.abs() <= f32::EPSILON {
            return;
        }

        let pointer = ui
            .input(|input| input.pointer.hover_pos())
            .unwrap_or_else(|| rect.center());
        let factor = (1.0 + (scroll * 0.0018)).clamp(0.85, 1.15);
        self.viewport.wheel_zoom(rect, pointer, factor, now);
    }

    pub(in crate::app) fn handle_pan(&mut self, response: &egui::Response) {
        if response.dragged_by(egui::PointerButton::Secondary)
            || response.dragged_by(egui::PointerButton::Middle)
        {
            let delta = response.drag_delta();
            if delta != egui::Vec2::ZERO {
                self.viewport.drag_by(delta);
            }
        }
    }

    pub(in crate::app) fn hovered_index(
        ui: &Ui,
        visible_indices: &[usize],
        screen_positions: &[Pos2],
        screen_radii: &[f32],
    ) -> Option<(usize, f32)> {
        let pointer = ui.input(|input| input.pointer.hover_pos())?;
        visible_indices
            .iter()
            .filter_map(|&index| {
                let distance = screen_positions[index].distance(pointer);
                (distance <= screen_radii[index]).then_some((index, distance))
            })
            .min_by(|a, b| a.1.total_cmp(&b.1))
    }

    pub(in crate::app) fn set_selected(&mut self, selected: Option<String>) {
        if self.selected != selected {
            self.selected = selected;
        }
    }

    /// Keep the current zoom, recenter on one node (search-result jump).
    pub(in crate::app) fn center_on(&mut self, id: &str) {
        let Some(position) = self
            .scene
            .as_ref()
            .and_then(|scene| scene.index_by_id.get(id).copied())
            .and_then(|index| self.scene.as_ref()?.nodes[index].position)
        else {
            return;
        };

        let state = ViewportState {
            pan: position,
            zoom_percent: self.viewport.effective().zoom_percent,
        };
        self.viewport.apply(state);
    }

    pub(in crate::app) fn fit_to_view(&mut self) {
        let fitted = match self.scene.as_ref() {
            Some(scene) => ViewportState::fit_to_bounds(scene.positions(), self.last_canvas_size),
            None => ViewportState::default(),
        };
        self.viewport.apply(fitted);
    }

    pub(in crate::app) fn reset_view(&mut self) {
        self.viewport.apply(ViewportState::default());
    }
}
