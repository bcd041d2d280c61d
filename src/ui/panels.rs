use std::sync::Arc;

use eframe::egui::{self, Color32, RichText, ScrollArea, Ui};
use egui_extras::DatePickerButton;

use crate::data::model::CategoryColumn;
use crate::state::AppState;

// ---------------------------------------------------------------------------
// Left side panel – filter widgets
// ---------------------------------------------------------------------------

/// Render the left filter panel.
pub fn side_panel(ui: &mut Ui, state: &mut AppState) {
    ui.heading("Filter Options");
    ui.separator();

    let dataset = match &state.dataset {
        Some(ds) => Arc::clone(ds),
        None => {
            ui.label("No dataset loaded.");
            return;
        }
    };
    if dataset.is_empty() {
        ui.label("The file contains no bookings.");
        return;
    }

    ScrollArea::vertical()
        .auto_shrink([false, false])
        .show(ui, |ui: &mut Ui| {
            // ---- Departure date range ----
            ui.strong("Departure Date Range");
            match state.date_inputs {
                Some(range) => {
                    let mut enabled = state.date_filter_enabled();
                    if ui.checkbox(&mut enabled, "Filter by date").changed() {
                        state.set_date_filter_enabled(enabled);
                    }

                    let mut start = range.start;
                    let mut end = range.end;
                    let mut changed = false;
                    ui.add_enabled_ui(enabled, |ui: &mut Ui| {
                        egui::Grid::new("date_range")
                            .num_columns(2)
                            .show(ui, |ui: &mut Ui| {
                                ui.label("From");
                                changed |= ui
                                    .add(DatePickerButton::new(&mut start).id_salt("date_from"))
                                    .changed();
                                ui.end_row();
                                ui.label("To");
                                changed |= ui
                                    .add(DatePickerButton::new(&mut end).id_salt("date_to"))
                                    .changed();
                                ui.end_row();
                            });
                    });
                    if changed {
                        state.set_date_range(start, end);
                    }

                    if let Some((lo, hi)) = dataset.date_bounds {
                        ui.small(format!("Data spans {lo} to {hi}"));
                    }
                }
                None => {
                    ui.label("No departure dates in this file.");
                }
            }
            if dataset.null_dates > 0 {
                ui.small(format!(
                    "{} bookings have no departure date",
                    dataset.null_dates
                ));
            }
            ui.separator();

            // ---- Per-column filter widgets (collapsible) ----
            for col in CategoryColumn::ALL {
                let Some(all_values) = dataset.unique_values.get(&col) else {
                    continue;
                };

                // Show count of selected / total in the header
                let n_total = all_values.len();
                let n_selected = state
                    .criteria
                    .categories
                    .get(&col)
                    .map_or(n_total, |selected| selected.len());
                let header_text = format!("{col}  ({n_selected}/{n_total})");

                egui::CollapsingHeader::new(RichText::new(header_text).strong())
                    .id_salt(col.header())
                    .default_open(true)
                    .show(ui, |ui: &mut Ui| {
                        // Select all / none buttons
                        ui.horizontal(|ui: &mut Ui| {
                            if ui.small_button("All").clicked() {
                                state.select_all(col);
                            }
                            if ui.small_button("None").clicked() {
                                state.select_none(col);
                            }
                        });

                        for val in all_values {
                            let label = if val.is_empty() { "<blank>" } else { val.as_str() };
                            let mut text = RichText::new(label);
                            if let Some(cm) = state.color_maps.get(&col) {
                                text = text.color(cm.color_for(val));
                            }

                            let mut checked = state.is_selected(col, val);
                            if ui.checkbox(&mut checked, text).changed() {
                                state.toggle_filter_value(col, val);
                            }
                        }
                    });
            }
        });
}

// ---------------------------------------------------------------------------
// Top bar
// ---------------------------------------------------------------------------

/// Render the top menu / toolbar.
pub fn top_bar(ui: &mut Ui, state: &mut AppState) {
    egui::menu::bar(ui, |ui: &mut Ui| {
        ui.menu_button("File", |ui: &mut Ui| {
            if ui.button("Open…").clicked() {
                open_file_dialog(state);
                ui.close_menu();
            }
        });

        ui.separator();

        if let Some(ds) = &state.dataset {
            ui.label(format!(
                "{} bookings loaded, {} match the filters",
                ds.len(),
                state.visible_indices.len()
            ));
        }

        if let Some(msg) = &state.status_message {
            ui.separator();
            ui.label(RichText::new(msg).color(Color32::RED));
        }
    });
}

// ---------------------------------------------------------------------------
// File dialog
// ---------------------------------------------------------------------------

pub fn open_file_dialog(state: &mut AppState) {
    let file = rfd::FileDialog::new()
        .set_title("Open booking data")
        .add_filter("Supported files", &["csv", "tsv", "txt", "json", "parquet", "pq"])
        .add_filter("CSV", &["csv", "tsv", "txt"])
        .add_filter("JSON", &["json"])
        .add_filter("Parquet", &["parquet", "pq"])
        .pick_file();

    if let Some(path) = file {
        state.open_path(&path);
    }
}
