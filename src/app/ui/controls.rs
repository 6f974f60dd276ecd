use eframe::egui::{self, ScrollArea, Ui};
use fuzzy_matcher::FuzzyMatcher;
use fuzzy_matcher::skim::SkimMatcherV2;

use crate::analyzer::{EdgeKind, SymbolKind};
use crate::util::short_label;

use super::super::filter::ViewMode;
use super::super::layout::LayoutAlgorithm;
use super::super::{SearchResultsCache, ViewModel};

const SEARCH_RESULT_ROWS: usize = 12;

impl ViewModel {
    pub(in crate::app) fn draw_controls(&mut self, ui: &mut Ui) {
        ScrollArea::vertical().show(ui, |ui| {
            ui.add_space(4.0);
            ui.heading("Search");
            let search_response = ui.add(
                egui::TextEdit::singleline(&mut self.criteria.search_query)
                    .hint_text("node name or path"),
            );
            if search_response.changed() {
                self.scene_dirty = true;
            }
            self.draw_search_results(ui);

            ui.separator();
            ui.heading("Layout");
            let mut algorithm = self.algorithm;
            for candidate in LayoutAlgorithm::ALL {
                ui.radio_value(&mut algorithm, candidate, candidate.label());
            }
            self.algorithm = algorithm;
            ui.horizontal(|ui| {
                if ui.button("Fit to view").clicked() {
                    self.fit_to_view();
                }
                if ui.button("Reset view").clicked() {
                    self.reset_view();
                }
                if ui.button("Re-run layout").clicked() {
                    self.layout.invalidate();
                }
            });

            ui.separator();
            ui.heading("View");
            let mut view_mode = self.criteria.view_mode;
            ui.horizontal(|ui| {
                ui.radio_value(&mut view_mode, ViewMode::File, ViewMode::File.label());
                ui.radio_value(&mut view_mode, ViewMode::Symbol, ViewMode::Symbol.label());
            });
            if view_mode != self.criteria.view_mode {
                self.criteria.view_mode = view_mode;
                self.scene_dirty = true;
            }

            ui.separator();
            ui.heading("Languages");
            self.draw_language_filter(ui);

            if self.criteria.view_mode == ViewMode::Symbol {
                ui.separator();
                ui.heading("Symbol kinds");
                self.draw_symbol_kind_filter(ui);
            }

            ui.separator();
            ui.heading("Relationships");
            self.draw_relationship_filter(ui);
        });
    }

    fn draw_search_results(&mut self, ui: &mut Ui) {
        let results = self.ranked_search_results();
        if results.is_empty() {
            return;
        }

        let mut jump_to = None;
        for (id, label) in &results {
            if ui
                .selectable_label(self.selected.as_deref() == Some(id.as_str()), short_label(label))
                .clicked()
            {
                jump_to = Some(id.clone());
            }
        }
        if let Some(id) = jump_to {
            self.set_selected(Some(id.clone()));
            self.center_on(&id);
        }
    }

    /// Fuzzy-ranked jump list for the current query. Presentation only:
    /// the canonical match set stays substring-based in the filter engine.
    fn ranked_search_results(&mut self) -> Vec<(String, String)> {
        let query = self.criteria.search_query.trim().to_owned();
        if query.is_empty() {
            self.search_results_cache = None;
            return Vec::new();
        }
        let Some(scene) = self.scene.as_ref() else {
            return Vec::new();
        };

        let cached = self.search_results_cache.as_ref().is_some_and(|cache| {
            cache.query == query && cache.scene_revision == self.scene_revision
        });
        if !cached {
            let matcher = SkimMatcherV2::default();
            let mut scored = scene
                .nodes
                .iter()
                .enumerate()
                .filter_map(|(index, node)| {
                    matcher
                        .fuzzy_match(&node.label, &query)
                        .or_else(|| {
                            node.id
                                .contains(&query)
                                .then_some(0)
                        })
                        .map(|score| (score, index))
                })
                .collect::<Vec<_>>();
            scored.sort_by(|a, b| b.0.cmp(&a.0).then(a.1.cmp(&b.1)));

            self.search_results_cache = Some(SearchResultsCache {
                query,
                scene_revision: self.scene_revision,
                ranked: scored
                    .into_iter()
                    .take(SEARCH_RESULT_ROWS)
                    .map(|(_, index)| index)
                    .collect(),
            });
        }

        let Some(cache) = self.search_results_cache.as_ref() else {
            return Vec::new();
        };
        cache
            .ranked
            .iter()
            .filter_map(|&index| scene.nodes.get(index))
            .map(|node| (node.id.clone(), node.label.clone()))
            .collect()
    }

    fn draw_language_filter(&mut self, ui: &mut Ui) {
        let languages = self.graph.languages.clone();
        if languages.is_empty() {
            ui.label("No language metadata.");
            return;
        }

        if !self.criteria.languages.is_empty() && ui.button("Show all").clicked() {
            self.criteria.languages.clear();
            self.scene_dirty = true;
        }

        for language in languages {
            let all = self.criteria.languages.is_empty();
            let mut on = all || self.criteria.languages.contains(&language);
            if ui.checkbox(&mut on, &language).changed() {
                if all {
                    // Leaving "show all": keep every language except the one
                    // just unchecked.
                    self.criteria.languages =
                        self.graph.languages.iter().cloned().collect();
                }
                if on {
                    self.criteria.languages.insert(language);
                } else {
                    self.criteria.languages.remove(&language);
                }
                if self.criteria.languages.len() == self.graph.languages.len() {
                    self.criteria.languages.clear();
                }
                self.scene_dirty = true;
            }
        }
    }

    fn draw_symbol_kind_filter(&mut self, ui: &mut Ui) {
        if !self.criteria.symbol_kinds.is_empty() && ui.button("Show all").clicked() {
            self.criteria.symbol_kinds.clear();
            self.scene_dirty = true;
        }

        for kind in SymbolKind::ALL {
            let all = self.criteria.symbol_kinds.is_empty();
            let mut on = all || self.criteria.symbol_kinds.contains(&kind);
            if ui.checkbox(&mut on, kind.label()).changed() {
                if all {
                    self.criteria.symbol_kinds = SymbolKind::ALL.into_iter().collect();
                }
                if on {
                    self.criteria.symbol_kinds.insert(kind);
                } else {
                    self.criteria.symbol_kinds.remove(&kind);
                }
                if self.criteria.symbol_kinds.len() == SymbolKind::ALL.len() {
                    self.criteria.symbol_kinds.clear();
                }
                self.scene_dirty = true;
            }
        }
    }

    fn draw_relationship_filter(&mut self, ui: &mut Ui) {
        ui.horizontal(|ui| {
            if ui.button("All").clicked() {
                self.criteria.relationship_kinds = EdgeKind::ALL.into_iter().collect();
                self.scene_dirty = true;
            }
            if ui.button("None").clicked() {
                self.criteria.relationship_kinds.clear();
                self.scene_dirty = true;
            }
        });

        for kind in EdgeKind::ALL {
            let mut on = self.criteria.relationship_kinds.contains(&kind);
            if ui.checkbox(&mut on, kind.label()).changed() {
                if on {
                    self.criteria.relationship_kinds.insert(kind);
                } else {
                    self.criteria.relationship_kinds.remove(&kind);
                }
                self.scene_dirty = true;
            }
        }
    }
}
