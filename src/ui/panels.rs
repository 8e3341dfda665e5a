use std::collections::BTreeSet;
use std::fmt::Display;

use eframe::egui::{self, Color32, RichText, ScrollArea, Ui};
use sales_dashboard::format::format_count;

use crate::state::{AppState, Tab};

// ---------------------------------------------------------------------------
// Left side panel – filter widgets
// ---------------------------------------------------------------------------

/// Render the left filter panel.
pub fn side_panel(ui: &mut Ui, state: &mut AppState) {
    ui.heading("Filters");
    ui.separator();

    let Some(dataset) = state.dataset.clone() else {
        ui.label("No dataset loaded.");
        return;
    };
    let facets = dataset.facets();

    let mut changed = false;
    ScrollArea::vertical()
        .auto_shrink([false, false])
        .show(ui, |ui: &mut Ui| {
            changed |= facet_filter(ui, "Select Years", &facets.years, &mut state.selection.years);
            changed |= facet_filter(
                ui,
                "Select Order Status",
                &facets.statuses,
                &mut state.selection.statuses,
            );
            changed |= facet_filter(
                ui,
                "Select Product Lines",
                &facets.product_lines,
                &mut state.selection.product_lines,
            );
            changed |= facet_filter(
                ui,
                "Select Deal Sizes",
                &facets.deal_sizes,
                &mut state.selection.deal_sizes,
            );
        });

    // Re-run the pipeline only when a checkbox or button changed something.
    if changed {
        state.refresh();
    }
}

/// One collapsible multi-select. Returns whether the selection changed.
fn facet_filter<T>(ui: &mut Ui, title: &str, options: &BTreeSet<T>, selected: &mut BTreeSet<T>) -> bool
where
    T: Ord + Clone + Display,
{
    let mut changed = false;

    // Show count of selected / total in the header
    let n_selected = options.iter().filter(|v| selected.contains(v)).count();
    let header_text = format!("{title}  ({n_selected}/{})", options.len());

    egui::CollapsingHeader::new(RichText::new(header_text).strong())
        .id_salt(title)
        .default_open(true)
        .show(ui, |ui: &mut Ui| {
            ui.horizontal(|ui: &mut Ui| {
                if ui.small_button("All").clicked() {
                    *selected = options.clone();
                    changed = true;
                }
                if ui.small_button("None").clicked() {
                    selected.clear();
                    changed = true;
                }
            });

            for val in options {
                let mut checked = selected.contains(val);
                if ui.checkbox(&mut checked, val.to_string()).changed() {
                    if checked {
                        selected.insert(val.clone());
                    } else {
                        selected.remove(val);
                    }
                    changed = true;
                }
            }
        });

    changed
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
            if ui.button("Reload").clicked() {
                state.reload();
                ui.close_menu();
            }
            if ui
                .add_enabled(state.dataset.is_some(), egui::Button::new("Export filtered CSV…"))
                .clicked()
            {
                export_dialog(state);
                ui.close_menu();
            }
        });

        ui.separator();

        ui.selectable_value(&mut state.tab, Tab::Overview, "Overview");
        ui.selectable_value(&mut state.tab, Tab::RawData, "Raw Data");

        ui.separator();

        if let (Some(ds), Some(view)) = (&state.dataset, &state.view) {
            ui.label(format!(
                "{} rows loaded, {} visible",
                format_count(ds.len()),
                format_count(view.rows.len())
            ));
        }

        ui.separator();

        if let Some(msg) = &state.status_message {
            ui.label(RichText::new(msg).color(Color32::RED));
        } else if let Some(msg) = &state.notice {
            ui.label(RichText::new(msg).color(Color32::LIGHT_GREEN));
        }
    });
}

// ---------------------------------------------------------------------------
// File dialogs
// ---------------------------------------------------------------------------

pub fn open_file_dialog(state: &mut AppState) {
    let file = rfd::FileDialog::new()
        .set_title("Open sales data")
        .add_filter("Supported files", &["csv", "json", "parquet", "pq"])
        .add_filter("CSV", &["csv"])
        .add_filter("JSON", &["json"])
        .add_filter("Parquet", &["parquet", "pq"])
        .pick_file();

    if let Some(path) = file {
        state.open(&path);
    }
}

/// Ask where to save the filtered rows, then write them.
pub fn export_dialog(state: &mut AppState) {
    let file = rfd::FileDialog::new()
        .set_title("Download filtered data as CSV")
        .add_filter("CSV", &["csv"])
        .set_file_name(state.config.export_file_name.as_str())
        .save_file();

    if let Some(path) = file {
        if let Err(e) = state.export_to(&path) {
            log::error!("Export failed: {e:#}");
            state.status_message = Some(format!("Error: {e:#}"));
        }
    }
}
