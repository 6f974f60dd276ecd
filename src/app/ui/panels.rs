use eframe::egui::{self, Align, Context, Layout, vec2};

use crate::analyzer::ProjectGraph;

use super::super::filter::FilterCriteria;
use super::super::layout::{LayoutAlgorithm, LayoutEngine};
use super::super::viewport::{AutoFitTracker, ViewportController};
use super::super::ViewModel;

impl ViewModel {
    pub(in crate::app) fn new(graph: ProjectGraph, algorithm: LayoutAlgorithm) -> Self {
        Self {
            graph,
            criteria: FilterCriteria::default(),
            algorithm,
            selected: None,
            hovered: None,
            scene: None,
            scene_dirty: true,
            scene_revision: 0,
            layout: LayoutEngine::new(),
            viewport: ViewportController::default(),
            auto_fit: AutoFitTracker::default(),
            search_results_cache: None,
            hide_request: None,
            visible_node_count: 0,
            visible_edge_count: 0,
            last_canvas_size: vec2(1280.0, 720.0),
        }
    }

    pub(in crate::app) fn show(
        &mut self,
        ctx: &Context,
        project_path: &str,
        reload_requested: &mut bool,
        is_loading: bool,
    ) {
        if self.scene_dirty {
            self.rebuild_scene();
        }

        egui::TopBottomPanel::top("top_bar")
            .resizable(false)
            .show(ctx, |ui| {
                ui.horizontal(|ui| {
                    ui.heading("codegraph");
                    ui.separator();
                    ui.label(project_path);
                    ui.label(format!(
                        "files: {}  symbols: {}",
                        self.graph.stats.file_count, self.graph.stats.symbol_count
                    ));
                    ui.label(format!(
                        "nodes: {}  edges: {}",
                        self.graph.node_count(),
                        self.graph.edge_count()
                    ));
                    let reload_button =
                        ui.add_enabled(!is_loading, egui::Button::new("Re-analyze"));
                    if reload_button.clicked() {
                        *reload_requested = true;
                    }

                    ui.with_layout(Layout::right_to_left(Align::Center), |ui| {
                        if self.layout.simulating() {
                            ui.spinner();
                            ui.label("layout settling");
                        }
                        ui.label(format!(
                            "visible: {} nodes, {} edges",
                            self.visible_node_count, self.visible_edge_count
                        ));
                        ui.label(format!(
                            "zoom: {:.0}%",
                            self.viewport.effective().zoom_percent
                        ));
                        ui.label(format!("layout passes: {}", self.layout.passes_computed()));
                    });
                });
            });

        egui::SidePanel::left("controls")
            .resizable(true)
            .default_width(300.0)
            .show(ctx, |ui| self.draw_controls(ui));

        egui::SidePanel::right("details")
            .resizable(true)
            .default_width(330.0)
            .show(ctx, |ui| self.draw_details(ui));

        egui::CentralPanel::default().show(ctx, |ui| {
            if is_loading {
                ui.vertical_centered(|ui| {
                    ui.add_space(120.0);
                    ui.heading("Refreshing analysis...");
                    ui.add_space(8.0);
                    ui.spinner();
                });
            } else {
                self.draw_graph(ui);
            }
        });
    }
}
