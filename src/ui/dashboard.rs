use ctscan_dashboard::data::model::RecordSet;
use ctscan_dashboard::report::{format_thousands, ReportOutcome, ReportOutput, SummaryTable};
use ctscan_dashboard::state::AppState;
use eframe::egui::{Align, Color32, Layout, RichText, ScrollArea, Ui};
use egui_extras::{Column, TableBuilder};

use super::plot;

const TITLE: &str = "PATIENT CT SCAN IN EMERGENCY DEPARTMENT 2022";

// ---------------------------------------------------------------------------
// Central panel
// ---------------------------------------------------------------------------

pub fn central_panel(ui: &mut Ui, state: &AppState) {
    ui.heading(RichText::new(TITLE).strong());
    ui.add_space(8.0);

    let (Some(_), Some(filtered)) = (&state.dataset, &state.filtered) else {
        ui.centered_and_justified(|ui: &mut Ui| {
            ui.label("Please upload an Excel file to proceed.  (File → Open…)");
        });
        return;
    };

    ScrollArea::vertical()
        .auto_shrink([false, false])
        .show(ui, |ui: &mut Ui| {
            ui.heading("Patient Data");
            record_grid(ui, filtered);
            ui.add_space(12.0);

            for outcome in &state.outcomes {
                report_section(ui, outcome);
                ui.add_space(12.0);
            }
        });
}

fn report_section(ui: &mut Ui, outcome: &ReportOutcome) {
    match &outcome.result {
        Ok(ReportOutput::Metric(value)) => {
            ui.heading(format!("{}: {}", outcome.title, format_thousands(*value)));
        }
        Ok(ReportOutput::Table(table)) => {
            ui.heading(outcome.title.as_str());
            if table.is_empty() {
                ui.label("No values to count.");
                return;
            }
            ui.horizontal_top(|ui: &mut Ui| {
                ui.push_id(outcome.id, |ui: &mut Ui| summary_grid(ui, table));
                ui.vertical(|ui: &mut Ui| plot::bar_chart(ui, outcome.id, table));
            });
        }
        Err(warning) => {
            ui.heading(outcome.title.as_str());
            ui.label(RichText::new(format!("⚠ {warning}")).color(Color32::YELLOW));
        }
    }
}

// ---------------------------------------------------------------------------
// Grids
// ---------------------------------------------------------------------------

/// Filtered records; rows are virtualised so large uploads stay responsive.
fn record_grid(ui: &mut Ui, records: &RecordSet) {
    let columns = records.columns();
    ui.push_id("record_grid", |ui: &mut Ui| {
        TableBuilder::new(ui)
            .striped(true)
            .resizable(true)
            .cell_layout(Layout::left_to_right(Align::Center))
            .columns(Column::auto().at_least(60.0).clip(true), columns.len())
            .min_scrolled_height(0.0)
            .max_scroll_height(320.0)
            .header(22.0, |mut header| {
                for name in columns {
                    header.col(|ui| {
                        ui.strong(name);
                    });
                }
            })
            .body(|body| {
                body.rows(18.0, records.len(), |mut row| {
                    let Some(record) = records.records().get(row.index()) else {
                        return;
                    };
                    for value in record {
                        row.col(|ui| {
                            if value.is_null() {
                                ui.weak("None");
                            } else {
                                ui.label(value.to_string());
                            }
                        });
                    }
                });
            });
    });
}

fn summary_grid(ui: &mut Ui, table: &SummaryTable) {
    TableBuilder::new(ui)
        .striped(true)
        .vscroll(false)
        .column(Column::auto().at_least(140.0))
        .column(Column::auto().at_least(60.0))
        .header(20.0, |mut header| {
            header.col(|ui| {
                ui.strong(table.category_label.as_str());
            });
            header.col(|ui| {
                ui.strong("Count");
            });
        })
        .body(|mut body| {
            for entry in &table.rows {
                body.row(18.0, |mut row| {
                    row.col(|ui| {
                        ui.label(entry.category.to_string());
                    });
                    row.col(|ui| {
                        ui.label(format_thousands(i64::try_from(entry.count).unwrap_or(i64::MAX)));
                    });
                });
            }
        });
}
