use eframe::egui::{self, RichText, Ui};
use egui_extras::{Column, TableBuilder};
use sales_dashboard::data::export::record_cells;
use sales_dashboard::format::format_count;

use crate::state::AppState;
use crate::ui::panels;

// ---------------------------------------------------------------------------
// Raw data page
// ---------------------------------------------------------------------------

/// The filtered rows, virtualised, with the CSV download on top.
pub fn raw_table(ui: &mut Ui, state: &mut AppState) {
    let (Some(dataset), Some(view)) = (state.dataset.clone(), state.view.as_ref()) else {
        ui.label("No dataset loaded.");
        return;
    };
    let rows = view.rows.clone();

    ui.horizontal(|ui: &mut Ui| {
        ui.heading("Raw Data");
        ui.label(format!("{} rows", format_count(rows.len())));
        if ui.button("Download Filtered Data as CSV").clicked() {
            panels::export_dialog(state);
        }
    });
    ui.separator();

    if rows.is_empty() {
        ui.label(RichText::new("No rows match the current filters.").italics());
        return;
    }

    let records = dataset.records();
    let layout = dataset.layout();
    let headers = layout.export_headers();
    TableBuilder::new(ui)
        .striped(true)
        .resizable(true)
        .cell_layout(egui::Layout::left_to_right(egui::Align::Center))
        .columns(Column::auto().at_least(60.0).clip(true), headers.len())
        .header(20.0, |mut header| {
            for name in &headers {
                header.col(|ui: &mut Ui| {
                    ui.strong(name.as_str());
                });
            }
        })
        .body(|body| {
            body.rows(18.0, rows.len(), |mut row| {
                let rec = &records[rows[row.index()]];
                for text in record_cells(layout, rec) {
                    row.col(|ui: &mut Ui| {
                        ui.label(text);
                    });
                }
            });
        });
}
