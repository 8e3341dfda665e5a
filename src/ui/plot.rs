use std::collections::BTreeMap;
use std::f64::consts::{FRAC_PI_2, TAU};
use std::ops::RangeInclusive;

use eframe::egui::{Color32, RichText, ScrollArea, Stroke, Ui};
use egui_plot::{Bar, BarChart, GridMark, Legend, Line, Plot, PlotPoint, PlotPoints, Points, Polygon};
use sales_dashboard::color::{CategoryColors, sequential_color};
use sales_dashboard::data::aggregate::{Kpis, ScatterPoint};
use sales_dashboard::data::view::DashboardView;
use sales_dashboard::format::{format_count, format_currency, format_percent};

use crate::state::AppState;

const CHART_HEIGHT: f32 = 280.0;
const SCATTER_SIZE_BUCKETS: f64 = 4.0;

// ---------------------------------------------------------------------------
// Overview page (central panel)
// ---------------------------------------------------------------------------

/// Render KPI cards and every chart of the current view.
pub fn overview(ui: &mut Ui, state: &AppState) {
    let Some(view) = &state.view else {
        ui.centered_and_justified(|ui: &mut Ui| {
            let text = match &state.status_message {
                Some(msg) => RichText::new(msg).color(Color32::RED),
                None => RichText::new("Open a sales file to begin  (File → Open…)"),
            };
            ui.heading(text);
        });
        return;
    };

    ScrollArea::vertical()
        .auto_shrink([false, false])
        .show(ui, |ui: &mut Ui| {
            ui.heading("Sales Data Business Intelligence Dashboard");
            ui.label("Analyzing sales performance across different dimensions");
            ui.add_space(8.0);

            kpi_cards(ui, &view.kpis);
            ui.add_space(8.0);

            chart_group(ui, "Sales Trends Over Time", |ui| monthly_trend(ui, view));

            ui.columns(2, |cols| {
                chart_group(&mut cols[0], "Sales by Product Line", |ui| {
                    product_line_bars(ui, view, state.product_line_colors.as_ref())
                });
                chart_group(&mut cols[1], "Sales by Country", |ui| country_bars(ui, view));
            });

            ui.columns(2, |cols| {
                chart_group(&mut cols[0], "Deal Size Distribution", |ui| {
                    deal_size_pie(ui, view, state.deal_size_colors.as_ref())
                });
                chart_group(&mut cols[1], "Top Customers by Sales", |ui| {
                    top_customer_bars(ui, view)
                });
            });

            chart_group(ui, "Profit vs. Quantity Ordered", |ui| {
                profit_scatter(ui, view, state.product_line_colors.as_ref())
            });
        });
}

fn chart_group(ui: &mut Ui, title: &str, add_contents: impl FnOnce(&mut Ui)) {
    ui.group(|ui: &mut Ui| {
        ui.strong(title);
        add_contents(ui);
    });
    ui.add_space(6.0);
}

// ---------------------------------------------------------------------------
// KPI cards
// ---------------------------------------------------------------------------

fn kpi_cards(ui: &mut Ui, kpis: &Kpis) {
    let cards = [
        ("Total Sales", format_currency(kpis.total_sales)),
        ("Average Order Value", format_currency(kpis.average_order_value)),
        ("Total Orders", format_count(kpis.distinct_orders)),
        ("Avg Profit Margin", format_percent(kpis.average_profit_margin)),
    ];
    ui.columns(cards.len(), |cols| {
        for (col, (label, value)) in cols.iter_mut().zip(cards) {
            col.group(|ui: &mut Ui| {
                ui.label(label);
                ui.label(RichText::new(value).size(24.0).strong());
            });
        }
    });
}

// ---------------------------------------------------------------------------
// Category axes
// ---------------------------------------------------------------------------

/// Label for a grid mark sitting on an integer category position.
fn category_label(labels: &[String], value: f64) -> String {
    let idx = value.round();
    if (value - idx).abs() > 1e-6 || idx < 0.0 {
        return String::new();
    }
    labels.get(idx as usize).cloned().unwrap_or_default()
}

fn category_formatter(labels: Vec<String>) -> impl Fn(GridMark, &RangeInclusive<f64>) -> String {
    move |mark: GridMark, _range: &RangeInclusive<f64>| category_label(&labels, mark.value)
}

fn empty_hint(ui: &mut Ui) {
    ui.label(RichText::new("No rows match the current filters.").italics());
}

// ---------------------------------------------------------------------------
// Charts
// ---------------------------------------------------------------------------

fn monthly_trend(ui: &mut Ui, view: &DashboardView) {
    if view.monthly_sales.is_empty() {
        return empty_hint(ui);
    }
    let labels: Vec<String> = view.monthly_sales.iter().map(|(m, _)| m.clone()).collect();
    let points: PlotPoints = view
        .monthly_sales
        .iter()
        .enumerate()
        .map(|(i, (_, sales))| [i as f64, *sales])
        .collect();

    Plot::new("monthly_trend")
        .height(CHART_HEIGHT)
        .x_axis_label("Month")
        .y_axis_label("Total Sales ($)")
        .x_axis_formatter(category_formatter(labels))
        .allow_scroll(false)
        .show(ui, |plot_ui| {
            plot_ui.line(Line::new(points).name("Sales").width(2.0));
        });
}

fn product_line_bars(ui: &mut Ui, view: &DashboardView, colors: Option<&CategoryColors>) {
    if view.sales_by_product_line.is_empty() {
        return empty_hint(ui);
    }
    let labels: Vec<String> = view
        .sales_by_product_line
        .iter()
        .map(|(l, _)| l.clone())
        .collect();
    let bars: Vec<Bar> = view
        .sales_by_product_line
        .iter()
        .enumerate()
        .map(|(i, (line, sales))| {
            let color = colors.map_or(Color32::LIGHT_BLUE, |c| c.color_for(line));
            Bar::new(i as f64, *sales).name(line).fill(color).width(0.7)
        })
        .collect();

    Plot::new("product_line_bars")
        .height(CHART_HEIGHT)
        .y_axis_label("Total Sales ($)")
        .x_axis_formatter(category_formatter(labels))
        .allow_scroll(false)
        .show(ui, |plot_ui| plot_ui.bar_chart(BarChart::new(bars)));
}

/// Countries as bars coloured on a sequential scale by their sales.
fn country_bars(ui: &mut Ui, view: &DashboardView) {
    if view.sales_by_country.is_empty() {
        return empty_hint(ui);
    }
    let (min, max) = view
        .sales_by_country
        .iter()
        .fold((f64::INFINITY, f64::NEG_INFINITY), |(lo, hi), (_, s)| {
            (lo.min(*s), hi.max(*s))
        });
    let labels: Vec<String> = view.sales_by_country.iter().map(|(c, _)| c.clone()).collect();
    let bars: Vec<Bar> = view
        .sales_by_country
        .iter()
        .enumerate()
        .map(|(i, (country, sales))| {
            Bar::new(i as f64, *sales)
                .name(country)
                .fill(sequential_color(*sales, min, max))
                .width(0.8)
        })
        .collect();

    Plot::new("country_bars")
        .height(CHART_HEIGHT)
        .y_axis_label("Total Sales ($)")
        .x_axis_formatter(category_formatter(labels))
        .allow_scroll(false)
        .show(ui, |plot_ui| plot_ui.bar_chart(BarChart::new(bars)));
}

fn deal_size_pie(ui: &mut Ui, view: &DashboardView, colors: Option<&CategoryColors>) {
    let total: usize = view.deal_sizes.iter().map(|(_, n)| n).sum();
    if total == 0 {
        return empty_hint(ui);
    }

    Plot::new("deal_size_pie")
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
            // Slices run clockwise from twelve o'clock.
            let mut start = FRAC_PI_2;
            for (deal_size, count) in &view.deal_sizes {
                let share = *count as f64 / total as f64;
                let end = start - share * TAU;
                let color = colors.map_or(Color32::LIGHT_BLUE, |c| c.color_for(deal_size));

                let steps = ((share * 120.0).ceil() as usize).max(2);
                let mut outline = vec![[0.0, 0.0]];
                outline.extend((0..=steps).map(|s| {
                    let a = start + (end - start) * s as f64 / steps as f64;
                    [a.cos(), a.sin()]
                }));
                plot_ui.polygon(
                    Polygon::new(PlotPoints::new(outline))
                        .name(deal_size)
                        .fill_color(color)
                        .stroke(Stroke::new(1.0, Color32::WHITE)),
                );

                let mid = (start + end) / 2.0;
                plot_ui.text(egui_plot::Text::new(
                    PlotPoint::new(0.65 * mid.cos(), 0.65 * mid.sin()),
                    RichText::new(format!("{:.1}%", share * 100.0)).color(Color32::BLACK),
                ));
                start = end;
            }
        });
}

/// Horizontal bars, the best customer on top.
fn top_customer_bars(ui: &mut Ui, view: &DashboardView) {
    if view.top_customers.is_empty() {
        return empty_hint(ui);
    }
    let n = view.top_customers.len();
    let mut labels = vec![String::new(); n];
    let bars: Vec<Bar> = view
        .top_customers
        .iter()
        .enumerate()
        .map(|(rank, (customer, sales))| {
            let pos = n - 1 - rank;
            labels[pos] = customer.clone();
            Bar::new(pos as f64, *sales).name(customer).width(0.7)
        })
        .collect();

    Plot::new("top_customers")
        .height(CHART_HEIGHT)
        .x_axis_label("Total Sales ($)")
        .y_axis_formatter(category_formatter(labels))
        .allow_scroll(false)
        .show(ui, |plot_ui| {
            plot_ui.bar_chart(BarChart::new(bars).horizontal().color(Color32::LIGHT_BLUE))
        });
}

/// Hover text for the scatter point closest to `value`.
fn scatter_hover(points: &[ScatterPoint], name: &str, value: &PlotPoint) -> String {
    let nearest = points
        .iter()
        .filter(|p| p.product_line == name)
        .min_by(|a, b| {
            let da = (a.quantity as f64 - value.x).powi(2) + (a.profit - value.y).powi(2);
            let db = (b.quantity as f64 - value.x).powi(2) + (b.profit - value.y).powi(2);
            da.total_cmp(&db)
        });
    match nearest {
        Some(p) => format!(
            "{}\n{}\nquantity {}  profit {}\nprice {}  msrp {}\nsales {}",
            p.product_line,
            p.product_code,
            p.quantity,
            format_currency(p.profit),
            format_currency(p.price_each),
            format_currency(p.msrp),
            format_currency(p.sales),
        ),
        None => format!("quantity {:.0}\nprofit {:.2}", value.x, value.y),
    }
}

/// One marker per row, coloured by product line and sized by sales.
fn profit_scatter(ui: &mut Ui, view: &DashboardView, colors: Option<&CategoryColors>) {
    if view.scatter.is_empty() {
        return empty_hint(ui);
    }
    let max_sales = view.scatter.iter().map(|p| p.sales).fold(0.0, f64::max);

    // Markers share one series per (product line, size bucket).
    let mut series: BTreeMap<(&str, u8), Vec<[f64; 2]>> = BTreeMap::new();
    for p in &view.scatter {
        let bucket = if max_sales > 0.0 {
            (p.sales / max_sales * SCATTER_SIZE_BUCKETS).ceil().clamp(1.0, SCATTER_SIZE_BUCKETS) as u8
        } else {
            1
        };
        series
            .entry((p.product_line.as_str(), bucket))
            .or_default()
            .push([p.quantity as f64, p.profit]);
    }

    let hover_points = view.scatter.clone();
    Plot::new("profit_scatter")
        .height(CHART_HEIGHT + 80.0)
        .x_axis_label("Quantity Ordered")
        .y_axis_label("Profit ($)")
        .legend(Legend::default())
        .label_formatter(move |name, value| scatter_hover(&hover_points, name, value))
        .allow_scroll(false)
        .show(ui, |plot_ui| {
            for ((line, bucket), coords) in series {
                let color = colors.map_or(Color32::LIGHT_BLUE, |c| c.color_for(line));
                plot_ui.points(
                    Points::new(PlotPoints::new(coords))
                        .name(line)
                        .color(color.gamma_multiply(0.8))
                        .radius(1.5 + 2.0 * f32::from(bucket))
                        .filled(true),
                );
            }
        });
}
