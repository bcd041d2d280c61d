use std::f64::consts::{FRAC_PI_2, TAU};

use eframe::egui::{self, Color32, ScrollArea, Stroke, Ui};
use egui_plot::{Bar, BarChart, Legend, Line, Plot, PlotPoints, Points, Polygon};

use crate::color::ColorMap;
use crate::data::aggregate::{CategoryCount, DashboardSummary};
use crate::data::model::CategoryColumn;
use crate::state::AppState;
use crate::ui::table;

const CHART_HEIGHT: f32 = 260.0;
const BAR_COLOR: Color32 = Color32::from_rgb(70, 130, 180);

// ---------------------------------------------------------------------------
// Dashboard (central panel)
// ---------------------------------------------------------------------------

/// Render the six charts and the raw table in the central panel.
pub fn dashboard(ui: &mut Ui, state: &AppState) {
    if state.dataset.is_none() {
        ui.centered_and_justified(|ui: &mut Ui| {
            ui.heading("Open a booking file to begin  (File → Open…)");
        });
        return;
    }

    let summary = &state.summary;
    let colors = |col: CategoryColumn| state.color_maps.get(&col);

    ScrollArea::vertical()
        .auto_shrink([false, false])
        .show(ui, |ui: &mut Ui| {
            ui.heading("Visual Insights");

            ui.columns(2, |cols: &mut [Ui]| {
                chart_card(&mut cols[0], "1. Flight Status Distribution", |ui| {
                    status_pie(ui, &summary.status_distribution, colors(CategoryColumn::FlightStatus));
                });
                chart_card(&mut cols[1], "2. Top Arrival Airports", |ui| {
                    count_bars(ui, "top_airports", &summary.top_airports, None);
                });
            });

            ui.columns(2, |cols: &mut [Ui]| {
                chart_card(&mut cols[0], "3. Monthly Flight Trends", |ui| {
                    monthly_line(ui, summary);
                });
                chart_card(&mut cols[1], "4. Passenger Age Distribution", |ui| {
                    let bins: Vec<(String, usize, Color32)> = summary
                        .age_histogram
                        .iter()
                        .map(|bin| (bin.label.clone(), bin.count, BAR_COLOR))
                        .collect();
                    labelled_bars(ui, "age_histogram", bins);
                });
            });

            ui.columns(2, |cols: &mut [Ui]| {
                chart_card(&mut cols[0], "5. Gender Ratio", |ui| {
                    count_bars(ui, "gender_counts", &summary.gender_counts, colors(CategoryColumn::Gender));
                });
                chart_card(&mut cols[1], "6. Flights by Continent", |ui| {
                    count_bars(
                        ui,
                        "continent_counts",
                        &summary.continent_counts,
                        colors(CategoryColumn::Continent),
                    );
                });
            });

            ui.add_space(8.0);
            ui.separator();
            egui::CollapsingHeader::new("Raw Filtered Data")
                .default_open(false)
                .show(ui, |ui: &mut Ui| {
                    table::raw_table(ui, state);
                });
        });
}

fn chart_card(ui: &mut Ui, title: &str, add_contents: impl FnOnce(&mut Ui)) {
    ui.group(|ui: &mut Ui| {
        ui.strong(title);
        add_contents(ui);
    });
}

fn empty_chart(ui: &mut Ui) {
    ui.allocate_ui(egui::vec2(ui.available_width(), CHART_HEIGHT), |ui: &mut Ui| {
        ui.centered_and_justified(|ui: &mut Ui| {
            ui.label("No bookings match the current filters.");
        });
    });
}

// ---------------------------------------------------------------------------
// Pie chart
// ---------------------------------------------------------------------------

fn status_pie(ui: &mut Ui, counts: &[CategoryCount], colors: Option<&ColorMap>) {
    let total: usize = counts.iter().map(|c| c.count).sum();
    if total == 0 {
        empty_chart(ui);
        return;
    }

    Plot::new("status_pie")
        .height(CHART_HEIGHT)
        .data_aspect(1.0)
        .show_axes(false)
        .show_grid(false)
        .allow_drag(false)
        .allow_zoom(false)
        .allow_scroll(false)
        .allow_boxed_zoom(false)
        .legend(Legend::default())
        .show(ui, |plot_ui| {
            let mut start = FRAC_PI_2;
            for c in counts {
                let share = c.count as f64 / total as f64;
                let sweep = TAU * share;
                let color = colors.map_or(BAR_COLOR, |cm| cm.color_for(&c.value));
                let name = format!("{} ({:.1}%)", c.value, share * 100.0);

                // egui fills convex shapes only, so draw each slice in quarter turns.
                for (from, span) in slice_segments(start, sweep) {
                    let polygon = Polygon::new(PlotPoints::new(sector_points(from, span)))
                        .fill_color(color)
                        .stroke(Stroke::new(1.0, Color32::WHITE))
                        .name(&name);
                    plot_ui.polygon(polygon);
                }
                start -= sweep;
            }
        });
}

/// Split a clockwise sweep into pieces of at most a quarter turn.
fn slice_segments(start: f64, sweep: f64) -> Vec<(f64, f64)> {
    let pieces = (sweep / FRAC_PI_2).ceil().max(1.0) as usize;
    let span = sweep / pieces as f64;
    (0..pieces).map(|k| (start - span * k as f64, span)).collect()
}

fn sector_points(start: f64, sweep: f64) -> Vec<[f64; 2]> {
    let steps = ((sweep / TAU) * 120.0).ceil().max(2.0) as usize;
    let mut points = vec![[0.0, 0.0]];
    points.extend((0..=steps).map(|k| {
        let angle = start - sweep * k as f64 / steps as f64;
        [angle.cos(), angle.sin()]
    }));
    points
}

// ---------------------------------------------------------------------------
// Bar charts
// ---------------------------------------------------------------------------

fn count_bars(ui: &mut Ui, id: &str, counts: &[CategoryCount], colors: Option<&ColorMap>) {
    let bars = counts
        .iter()
        .map(|c| {
            let color = colors.map_or(BAR_COLOR, |cm| cm.color_for(&c.value));
            (c.value.clone(), c.count, color)
        })
        .collect();
    labelled_bars(ui, id, bars);
}

/// Vertical bars at x = 0, 1, 2, … with the category names on the x axis.
fn labelled_bars(ui: &mut Ui, id: &str, bars: Vec<(String, usize, Color32)>) {
    if bars.is_empty() {
        empty_chart(ui);
        return;
    }

    let labels: Vec<String> = bars.iter().map(|(label, _, _)| label.clone()).collect();
    let chart_bars: Vec<Bar> = bars
        .into_iter()
        .enumerate()
        .map(|(i, (label, count, color))| {
            Bar::new(i as f64, count as f64)
                .name(label)
                .fill(color)
                .width(0.7)
        })
        .collect();

    Plot::new(id)
        .height(CHART_HEIGHT)
        .allow_drag(false)
        .allow_zoom(false)
        .allow_scroll(false)
        .allow_boxed_zoom(false)
        .include_y(0.0)
        .y_axis_label("Count")
        .x_axis_formatter(move |mark, _range| category_label(&labels, mark.value))
        .show(ui, |plot_ui| {
            plot_ui.bar_chart(BarChart::new(chart_bars));
        });
}

/// Axis text for integer positions; blank between categories.
fn category_label(labels: &[String], value: f64) -> String {
    let idx = value.round();
    if (value - idx).abs() > 1e-6 || idx < 0.0 {
        return String::new();
    }
    labels.get(idx as usize).cloned().unwrap_or_default()
}

// ---------------------------------------------------------------------------
// Line chart
// ---------------------------------------------------------------------------

fn monthly_line(ui: &mut Ui, summary: &DashboardSummary) {
    let trend = &summary.monthly_trend;
    if trend.is_empty() {
        empty_chart(ui);
        return;
    }

    let labels: Vec<String> = trend.iter().map(|m| m.month.to_string()).collect();
    let coords: Vec<[f64; 2]> = trend
        .iter()
        .enumerate()
        .map(|(i, m)| [i as f64, m.count as f64])
        .collect();

    Plot::new("monthly_trend")
        .height(CHART_HEIGHT)
        .allow_drag(false)
        .allow_zoom(false)
        .allow_scroll(false)
        .allow_boxed_zoom(false)
        .include_y(0.0)
        .y_axis_label("Flights")
        .x_axis_formatter(move |mark, _range| category_label(&labels, mark.value))
        .show(ui, |plot_ui| {
            let line: PlotPoints = coords.iter().copied().collect();
            plot_ui.line(Line::new(line).color(BAR_COLOR).width(2.0).name("Flights"));
            let markers: PlotPoints = coords.iter().copied().collect();
            plot_ui.points(Points::new(markers).color(BAR_COLOR).radius(3.0));
        });
}
