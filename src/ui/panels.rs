use ctscan_dashboard::export;
use ctscan_dashboard::state::{AppState, FilterColumn};
use eframe::egui::{self, Color32, RichText, ScrollArea, Ui};

// ---------------------------------------------------------------------------
// Left side panel – search & filter widgets
// ---------------------------------------------------------------------------

/// Render the left filter panel.
pub fn side_panel(ui: &mut Ui, state: &mut AppState) {
    ui.heading("Search & Filter");
    ui.separator();

    if state.dataset.is_none() {
        ui.label("Please upload an Excel file to proceed.");
        return;
    }

    ui.strong("Search by Name");
    let mut search = state.filters.name_search.clone();
    if ui.text_edit_singleline(&mut search).changed() {
        state.set_name_search(search);
    }
    ui.separator();

    // Clone what we need so we can mutate state inside the loop.
    let options = state.options.clone();

    ScrollArea::vertical()
        .auto_shrink([false, false])
        .show(ui, |ui: &mut Ui| {
            for column in FilterColumn::ALL {
                let (n_selected, n_total) = state.selection_counts(column);
                let header_text = format!("{}  ({n_selected}/{n_total})", column.label());

                egui::CollapsingHeader::new(RichText::new(header_text).strong())
                    .id_salt(column.label())
                    .default_open(true)
                    .show(ui, |ui: &mut Ui| {
                        ui.horizontal(|ui: &mut Ui| {
                            if ui.small_button("All").clicked() {
                                state.select_all(column);
                            }
                            if ui.small_button("None").clicked() {
                                state.select_none(column);
                            }
                        });
                        if n_selected == 0 {
                            ui.weak("Nothing selected: showing all");
                        }

                        match column {
                            FilterColumn::Gender | FilterColumn::AgeGroup => {
                                let values = if column == FilterColumn::Gender {
                                    &options.gender
                                } else {
                                    &options.age_group
                                };
                                for val in values {
                                    let selected = if column == FilterColumn::Gender {
                                        &state.filters.gender
                                    } else {
                                        &state.filters.age_group
                                    };
                                    let mut checked = selected.contains(val);
                                    if ui.checkbox(&mut checked, val.to_string()).changed() {
                                        state.toggle_value(column, val);
                                    }
                                }
                            }
                            FilterColumn::Month => {
                                for &month in &options.month {
                                    let mut checked = state.filters.month.contains(&month);
                                    if ui.checkbox(&mut checked, month.to_string()).changed() {
                                        state.toggle_month(month);
                                    }
                                }
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
            ui.add_enabled_ui(state.filtered.is_some(), |ui: &mut Ui| {
                if ui.button("Export filtered records…").clicked() {
                    export_records_dialog(state);
                    ui.close_menu();
                }
                if ui.button("Export reports…").clicked() {
                    export_reports_dialog(state);
                    ui.close_menu();
                }
            });
        });

        ui.separator();

        if let Some(ds) = &state.dataset {
            ui.label(format!(
                "{} records loaded, {} visible",
                ds.len(),
                state.visible_count()
            ));
        }

        if let Some(msg) = &state.status_message {
            ui.separator();
            ui.label(RichText::new(msg).color(Color32::RED));
        }
    });
}

// ---------------------------------------------------------------------------
// File dialogs
// ---------------------------------------------------------------------------

pub fn open_file_dialog(state: &mut AppState) {
    let file = rfd::FileDialog::new()
        .set_title("Upload CT scan records")
        .add_filter("Supported files", &["xlsx", "xlsm", "xlsb", "xls", "ods", "csv"])
        .add_filter("Excel", &["xlsx", "xlsm", "xlsb", "xls"])
        .add_filter("CSV", &["csv"])
        .pick_file();

    if let Some(path) = file {
        state.load_path(&path);
    }
}

fn export_records_dialog(state: &mut AppState) {
    let Some(records) = &state.filtered else {
        return;
    };
    let Some(path) = rfd::FileDialog::new()
        .set_title("Export filtered records")
        .set_file_name("filtered_records.csv")
        .add_filter("CSV", &["csv"])
        .save_file()
    else {
        return;
    };

    match export::write_records_csv(&path, records) {
        Ok(()) => log::info!("Exported {} records to {}", records.len(), path.display()),
        Err(e) => {
            log::error!("Export failed: {e:#}");
            state.status_message = Some(format!("Error: {e:#}"));
        }
    }
}

fn export_reports_dialog(state: &mut AppState) {
    let Some(path) = rfd::FileDialog::new()
        .set_title("Export reports")
        .set_file_name("ct_scan_reports.json")
        .add_filter("JSON", &["json"])
        .save_file()
    else {
        return;
    };

    match export::write_summaries_json(&path, &state.outcomes) {
        Ok(()) => log::info!("Exported {} reports to {}", state.outcomes.len(), path.display()),
        Err(e) => {
            log::error!("Export failed: {e:#}");
            state.status_message = Some(format!("Error: {e:#}"));
        }
    }
}
