use std::collections::{HashMap, HashSet};
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::mpsc::{self, Receiver, TryRecvError};
use std::thread;
use std::time::Duration;

use eframe::egui::{self, Context, Pos2, Vec2};

use crate::analyzer::{
    AnalysisProgress, AnalyzerError, EdgeKind, NodeKind, ProjectGraph, SymbolKind,
    collect_project_graph, fetch_project_graph, set_file_hidden,
};

mod filter;
mod graph;
mod layout;
mod render_utils;
mod ui;
mod viewport;

use filter::FilterCriteria;
use layout::LayoutEngine;
use viewport::{AutoFitTracker, ViewportController};

pub use layout::LayoutAlgorithm;

pub struct CodeGraphApp {
    project_path: String,
    analyzer: String,
    initial_algorithm: LayoutAlgorithm,
    state: AppState,
    reload_rx: Option<Receiver<LoadEvent>>,
}

enum AppState {
    Loading {
        rx: Receiver<LoadEvent>,
        progress: AnalysisProgress,
        cancel: Arc<AtomicBool>,
    },
    Ready(Box<ViewModel>),
    Error(String),
}

enum LoadEvent {
    Progress(AnalysisProgress),
    Finished(Result<ProjectGraph, AnalyzerError>),
}

/// Single-owner state container for everything the visualization touches:
/// the model snapshot, filter criteria, selection/hover, layout engine and
/// viewport. All mutation goes through its methods on the UI thread.
struct ViewModel {
    graph: ProjectGraph,
    criteria: FilterCriteria,
    algorithm: LayoutAlgorithm,
    selected: Option<String>,
    hovered: Option<usize>,
    scene: Option<SceneGraph>,
    scene_dirty: bool,
    scene_revision: u64,
    layout: LayoutEngine,
    viewport: ViewportController,
    auto_fit: AutoFitTracker,
    search_results_cache: Option<SearchResultsCache>,
    hide_request: Option<String>,
    visible_node_count: usize,
    visible_edge_count: usize,
    last_canvas_size: Vec2,
}

/// Indexed render structure derived from the model through the filter.
/// Rebuilt wholesale on every criteria/model change; node positions are
/// carried over by id so filtering never discards a finished layout.
struct SceneGraph {
    nodes: Vec<SceneNode>,
    edges: Vec<SceneEdge>,
    index_by_id: HashMap<String, usize>,
    outgoing: Vec<Vec<usize>>,
    incoming: Vec<Vec<usize>>,
    search_matches: HashSet<usize>,
    has_search_query: bool,
    node_identity: u64,
    view_scratch: ViewScratch,
}

struct SceneNode {
    id: String,
    label: String,
    kind: NodeKind,
    symbol_kind: Option<SymbolKind>,
    language: Option<String>,
    model_index: usize,
    base_radius: f32,
    position: Option<Vec2>,
}

struct SceneEdge {
    source: usize,
    target: usize,
    kind: EdgeKind,
}

struct ViewScratch {
    screen_positions: Vec<Pos2>,
    screen_radii: Vec<f32>,
    visible_indices: Vec<usize>,
    visible_mask: Vec<bool>,
}

struct SearchResultsCache {
    query: String,
    scene_revision: u64,
    ranked: Vec<usize>,
}

impl SceneGraph {
    fn all_positioned(&self) -> bool {
        self.nodes.iter().all(|node| node.position.is_some())
    }

    fn set_positions(&mut self, positions: &[Vec2]) {
        for (node, position) in self.nodes.iter_mut().zip(positions) {
            node.position = Some(*position);
        }
    }

    fn edge_pairs(&self) -> Vec<(usize, usize)> {
        self.edges
            .iter()
            .filter(|edge| edge.source != edge.target)
            .map(|edge| (edge.source, edge.target))
            .collect()
    }

    fn positions(&self) -> impl Iterator<Item = Vec2> + '_ {
        self.nodes.iter().filter_map(|node| node.position)
    }

    fn connected(&self, a: usize, b: usize) -> bool {
        a == b
            || self.outgoing.get(a).is_some_and(|next| next.contains(&b))
            || self.incoming.get(a).is_some_and(|prev| prev.contains(&b))
    }
}

impl CodeGraphApp {
    pub fn new(
        _cc: &eframe::CreationContext<'_>,
        project_path: String,
        analyzer: String,
        initial_algorithm: LayoutAlgorithm,
    ) -> Self {
        let state = Self::start_load(&analyzer, &project_path);
        Self {
            project_path,
            analyzer,
            initial_algorithm,
            state,
            reload_rx: None,
        }
    }

    fn start_load(analyzer: &str, project_path: &str) -> AppState {
        let cancel = Arc::new(AtomicBool::new(false));
        AppState::Loading {
            rx: spawn_analysis(analyzer, project_path, Arc::clone(&cancel)),
            progress: AnalysisProgress::default(),
            cancel,
        }
    }
}

fn spawn_analysis(
    analyzer: &str,
    project_path: &str,
    cancel: Arc<AtomicBool>,
) -> Receiver<LoadEvent> {
    let (tx, rx) = mpsc::channel();
    let analyzer = analyzer.to_owned();
    let project_path = project_path.to_owned();

    thread::spawn(move || {
        let progress_tx = tx.clone();
        let result = collect_project_graph(&analyzer, &project_path, &cancel, |progress| {
            let _ = progress_tx.send(LoadEvent::Progress(progress));
        });
        let _ = tx.send(LoadEvent::Finished(result));
    });

    rx
}

fn spawn_hide_and_refresh(
    analyzer: &str,
    project_path: &str,
    file_id: String,
) -> Receiver<LoadEvent> {
    let (tx, rx) = mpsc::channel();
    let analyzer = analyzer.to_owned();
    let project_path = project_path.to_owned();

    thread::spawn(move || {
        let result = set_file_hidden(&analyzer, &project_path, &file_id, true)
            .and_then(|()| fetch_project_graph(&analyzer, &project_path))
            .map_err(|error| AnalyzerError::Failed(error.to_string()));
        let _ = tx.send(LoadEvent::Finished(result));
    });

    rx
}

impl eframe::App for CodeGraphApp {
    fn update(&mut self, ctx: &Context, _frame: &mut eframe::Frame) {
        let mut transition = None;

        match &mut self.state {
            AppState::Loading {
                rx,
                progress,
                cancel,
            } => {
                loop {
                    match rx.try_recv() {
                        Ok(LoadEvent::Progress(update)) => *progress = update,
                        Ok(LoadEvent::Finished(result)) => {
                            transition = Some(match result {
                                Ok(graph) => AppState::Ready(Box::new(ViewModel::new(
                                    graph,
                                    self.initial_algorithm,
                                ))),
                                Err(error) => AppState::Error(error.to_string()),
                            });
                            break;
                        }
                        Err(TryRecvError::Empty) => break,
                        Err(TryRecvError::Disconnected) => {
                            transition = Some(AppState::Error(
                                "Analysis worker disconnected".to_owned(),
                            ));
                            break;
                        }
                    }
                }

                let cancel_requested = draw_loading_panel(ctx, &self.project_path, progress);
                if cancel_requested {
                    cancel.store(true, Ordering::Relaxed);
                }
                ctx.request_repaint_after(Duration::from_millis(100));
            }
            AppState::Error(error) => {
                let error = error.clone();
                egui::CentralPanel::default().show(ctx, |ui| {
                    ui.heading("Analysis failed");
                    ui.add_space(6.0);
                    ui.label(error);
                    ui.add_space(10.0);
                    if ui.button("Analyze again").clicked() {
                        transition = Some(Self::start_load(&self.analyzer, &self.project_path));
                    }
                });
            }
            AppState::Ready(model) => {
                let mut reload_requested = false;
                let is_reloading = self.reload_rx.is_some();
                model.show(ctx, &self.project_path, &mut reload_requested, is_reloading);

                if self.reload_rx.is_none()
                    && let Some(file_id) = model.hide_request.take()
                {
                    self.reload_rx = Some(spawn_hide_and_refresh(
                        &self.analyzer,
                        &self.project_path,
                        file_id,
                    ));
                }

                if reload_requested && self.reload_rx.is_none() {
                    self.reload_rx = Some(spawn_analysis(
                        &self.analyzer,
                        &self.project_path,
                        Arc::new(AtomicBool::new(false)),
                    ));
                }

                if let Some(rx) = self.reload_rx.take() {
                    match rx.try_recv() {
                        Ok(LoadEvent::Progress(_)) => self.reload_rx = Some(rx),
                        Ok(LoadEvent::Finished(result)) => {
                            transition = Some(match result {
                                Ok(graph) => AppState::Ready(Box::new(ViewModel::new(
                                    graph,
                                    model.algorithm,
                                ))),
                                Err(error) => AppState::Error(error.to_string()),
                            });
                        }
                        Err(TryRecvError::Empty) => self.reload_rx = Some(rx),
                        Err(TryRecvError::Disconnected) => {
                            transition = Some(AppState::Error(
                                "Refresh worker disconnected".to_owned(),
                            ));
                        }
                    }
                }
            }
        }

        if let Some(next_state) = transition {
            self.reload_rx = None;
            self.state = next_state;
        }
    }
}

fn draw_loading_panel(ctx: &Context, project_path: &str, progress: &AnalysisProgress) -> bool {
    let mut cancel_requested = false;
    egui::CentralPanel::default().show(ctx, |ui| {
        ui.vertical_centered(|ui| {
            ui.add_space(120.0);
            ui.heading(format!("Analyzing {project_path}"));
            ui.add_space(10.0);

            if progress.total_files > 0 {
                let fraction = progress.files_processed as f32 / progress.total_files as f32;
                ui.add(
                    egui::ProgressBar::new(fraction.clamp(0.0, 1.0))
                        .desired_width(420.0)
                        .show_percentage(),
                );
                ui.add_space(4.0);
                ui.label(format!(
                    "{} / {} files",
                    progress.files_processed, progress.total_files
                ));
            } else {
                ui.spinner();
            }

            if let Some(current_file) = &progress.current_file {
                ui.add_space(2.0);
                ui.label(current_file);
            }

            ui.add_space(12.0);
            if ui.button("Cancel analysis").clicked() {
                cancel_requested = true;
            }
        });
    });
    cancel_requested
}
