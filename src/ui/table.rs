use eframe::egui::{Align, Layout, Ui};
use egui_extras::{Column, TableBuilder};

use crate::state::AppState;

const ROW_HEIGHT: f32 = 18.0;

/// Every visible booking, all columns, rows virtualised.
pub fn raw_table(ui: &mut Ui, state: &AppState) {
    let Some(ds) = &state.dataset else {
        return;
    };
    let columns = ds.column_names();
    let rows = state.visible_records();

    ui.label(format!("{} rows", rows.len()));

    TableBuilder::new(ui)
        .striped(true)
        .resizable(true)
        .cell_layout(Layout::left_to_right(Align::Center))
        .columns(Column::auto().at_least(60.0).clip(true), columns.len())
        .max_scroll_height(400.0)
        .header(20.0, |mut header| {
            for name in &columns {
                header.col(|ui: &mut Ui| {
                    ui.strong(name);
                });
            }
        })
        .body(|body| {
            body.rows(ROW_HEIGHT, rows.len(), |mut row| {
                let record = rows[row.index()];
                for idx in 0..columns.len() {
                    row.col(|ui: &mut Ui| {
                        ui.label(record.cell(idx));
                    });
                }
            });
        });
}
