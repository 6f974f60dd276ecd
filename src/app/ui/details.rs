use eframe::egui::{self, RichText, ScrollArea, Ui};

use crate::analyzer::NodeKind;
use crate::util::short_label;

use super::super::ViewModel;

const RELATION_ROWS: usize = 24;

impl ViewModel {
    pub(in crate::app) fn draw_details(&mut self, ui: &mut Ui) {
        ui.add_space(4.0);
        ui.heading("Details");

        let Some(selected_id) = self.selected.clone() else {
            ui.label("Click a node to inspect it.");
            if let Some(hovered) = self
                .hovered
                .and_then(|index| self.scene.as_ref()?.nodes.get(index))
            {
                ui.add_space(6.0);
                ui.label(format!("Hovering: {}", short_label(&hovered.label)));
            }
            return;
        };

        let Some(&model_index) = self.graph.index_by_id.get(&selected_id) else {
            ui.label("The selected node is not in the current analysis.");
            if ui.button("Clear selection").clicked() {
                self.set_selected(None);
            }
            return;
        };

        let node = self.graph.nodes[model_index].clone();
        let mut jump_to = None;

        ScrollArea::vertical().show(ui, |ui| {
            ui.label(RichText::new(&node.label).strong());
            match node.kind {
                NodeKind::File => {
                    if let Some(language) = &node.language {
                        ui.label(format!("language: {language}"));
                    }
                    if let Some(line_count) = node.line_count {
                        ui.label(format!("{line_count} lines"));
                    }
                }
                NodeKind::Symbol => {
                    if let Some(kind) = node.symbol_kind {
                        ui.label(format!("kind: {}", kind.label()));
                    }
                    if let Some(line) = node.line {
                        ui.label(format!("line {line}"));
                    }
                }
            }
            if let Some(path) = &node.path {
                ui.label(RichText::new(path).weak());
            }

            ui.separator();
            let incoming = &self.graph.incoming[model_index];
            let outgoing = &self.graph.outgoing[model_index];
            ui.label(format!(
                "{} incoming, {} outgoing relationships",
                incoming.len(),
                outgoing.len()
            ));

            egui::CollapsingHeader::new(format!("Incoming ({})", incoming.len()))
                .default_open(incoming.len() <= RELATION_ROWS)
                .show(ui, |ui| {
                    for &edge_index in incoming.iter().take(RELATION_ROWS) {
                        let edge = &self.graph.edges[edge_index];
                        if let Some(source) = self.graph.node(&edge.source_id)
                            && ui
                                .selectable_label(
                                    false,
                                    format!(
                                        "{} {}",
                                        short_label(&source.label),
                                        edge.kind.label()
                                    ),
                                )
                                .clicked()
                        {
                            jump_to = Some(source.id.clone());
                        }
                    }
                    if incoming.len() > RELATION_ROWS {
                        ui.label(format!("… and {} more", incoming.len() - RELATION_ROWS));
                    }
                });

            egui::CollapsingHeader::new(format!("Outgoing ({})", outgoing.len()))
                .default_open(outgoing.len() <= RELATION_ROWS)
                .show(ui, |ui| {
                    for &edge_index in outgoing.iter().take(RELATION_ROWS) {
                        let edge = &self.graph.edges[edge_index];
                        if let Some(target) = self.graph.node(&edge.target_id)
                            && ui
                                .selectable_label(
                                    false,
                                    format!(
                                        "{} {}",
                                        edge.kind.label(),
                                        short_label(&target.label)
                                    ),
                                )
                                .clicked()
                        {
                            jump_to = Some(target.id.clone());
                        }
                    }
                    if outgoing.len() > RELATION_ROWS {
                        ui.label(format!("… and {} more", outgoing.len() - RELATION_ROWS));
                    }
                });

            match node.kind {
                NodeKind::File => {
                    let symbols = self.graph.symbols_in_file(model_index);
                    if !symbols.is_empty() {
                        egui::CollapsingHeader::new(format!("Symbols ({})", symbols.len()))
                            .default_open(false)
                            .show(ui, |ui| {
                                for symbol_index in symbols.into_iter().take(RELATION_ROWS) {
                                    let symbol = &self.graph.nodes[symbol_index];
                                    if ui.selectable_label(false, &symbol.label).clicked() {
                                        jump_to = Some(symbol.id.clone());
                                    }
                                }
                            });
                    }
                }
                NodeKind::Symbol => {
                    if let Some(file_index) = self.graph.containing_file(model_index) {
                        let file = self.graph.nodes[file_index].clone();
                        ui.separator();
                        if ui
                            .selectable_label(false, format!("in {}", short_label(&file.label)))
                            .clicked()
                        {
                            jump_to = Some(file.id.clone());
                        }

                        let siblings = self.graph.symbols_in_file(file_index);
                        let others = siblings
                            .into_iter()
                            .filter(|&index| index != model_index)
                            .collect::<Vec<_>>();
                        if !others.is_empty() {
                            egui::CollapsingHeader::new(format!("Siblings ({})", others.len()))
                                .default_open(false)
                                .show(ui, |ui| {
                                    for sibling_index in others.into_iter().take(RELATION_ROWS) {
                                        let sibling = &self.graph.nodes[sibling_index];
                                        if ui.selectable_label(false, &sibling.label).clicked() {
                                            jump_to = Some(sibling.id.clone());
                                        }
                                    }
                                });
                        }
                    }
                }
            }

            ui.separator();
            ui.horizontal(|ui| {
                if node.kind == NodeKind::File && ui.button("Hide file").clicked() {
                    self.hide_request = Some(node.id.clone());
                    self.set_selected(None);
                }
                if ui.button("Clear selection").clicked() {
                    self.set_selected(None);
                }
            });
        });

        if let Some(id) = jump_to {
            self.set_selected(Some(id.clone()));
            self.center_on(&id);
        }
    }
}
