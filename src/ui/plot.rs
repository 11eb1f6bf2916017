use ctscan_dashboard::color::ColorMap;
use ctscan_dashboard::report::SummaryTable;
use eframe::egui::Ui;
use egui_plot::{Bar, BarChart, Legend, Plot};

// ---------------------------------------------------------------------------
// Category bar chart
// ---------------------------------------------------------------------------

/// One bar per category, coloured per category, in table order.
pub fn bar_chart(ui: &mut Ui, id: &str, table: &SummaryTable) {
    let colors = ColorMap::for_table(table);

    Plot::new(id)
        .legend(Legend::default())
        .height(260.0)
        .x_axis_label(table.category_label.as_str())
        .y_axis_label("Count")
        .show_x(false)
        .allow_drag(false)
        .allow_scroll(false)
        .allow_zoom(false)
        .allow_boxed_zoom(false)
        .show(ui, |plot_ui| {
            for (i, row) in table.rows.iter().enumerate() {
                let color = colors.color_for(&row.category);
                let label = row.category.to_string();
                let bar = Bar::new(i as f64, row.count as f64)
                    .width(0.7)
                    .fill(color)
                    .name(format!("{label}: {}", row.count));
                // A chart per category so each one gets its own legend entry.
                let chart = BarChart::new(vec![bar]).color(color).name(&label);
                plot_ui.bar_chart(chart);
            }
        });
}
