use crate::aggregate::{AggregationResult, Tally};
use crate::labels::{display_name_for, palette_color_for};
use crate::trend::TrendPoint;
use serde::Serialize;
use std::f64::consts::PI;
use std::fmt::Write as _;
use tracing::{debug, info};

const WIDTH: f64 = 600.0;
const HEIGHT: f64 = 300.0;
const PAD_X: f64 = 44.0;
const PAD_Y: f64 = 40.0;
const TOP: f64 = 36.0;

const NEW_COLOR: &str = "#2ecc71";
const RETURNING_COLOR: &str = "#3498db";
const TREND_STROKE: &str = "rgb(75, 192, 192)";
const TREND_FILL: &str = "rgba(75, 192, 192, 0.5)";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ChartKind {
    Bar,
    Pie,
    Doughnut,
    Line,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Chart {
    pub kind: ChartKind,
    pub title: String,
    pub labels: Vec<String>,
    pub values: Vec<u64>,
    pub svg: String,
}

/// Holds the chart currently on display for one canvas. Installing a new
/// chart disposes of the previous one first.
#[derive(Debug, Default)]
pub struct ChartSlot {
    current: Option<Chart>,
    generation: u64,
}

impl ChartSlot {
    pub fn replace(&mut self, chart: Chart) -> &Chart {
        if let Some(previous) = self.current.take() {
            debug!(title = %previous.title, generation = self.generation, "disposing chart");
        }
        self.generation += 1;
        self.current.insert(chart)
    }
}

/// One slot per admin dashboard chart.
#[derive(Debug, Default)]
pub struct ChartBoard {
    pub tables: ChartSlot,
    pub new_vs_returning: ChartSlot,
    pub languages: ChartSlot,
    pub trend: ChartSlot,
}

#[derive(Debug, Clone, Serialize)]
pub struct DashboardCharts {
    pub tables: Chart,
    pub new_vs_returning: Chart,
    pub languages: Chart,
}

impl ChartBoard {
    pub fn render_summary(&mut self, result: &AggregationResult) -> DashboardCharts {
        DashboardCharts {
            tables: self.tables.replace(table_chart(&result.by_table)).clone(),
            new_vs_returning: self
                .new_vs_returning
                .replace(new_vs_returning_chart(result.new_vs_returning.new, result.new_vs_returning.returning))
                .clone(),
            languages: self.languages.replace(language_chart(&result.by_language)).clone(),
        }
    }

    pub fn render_trend(&mut self, points: &[TrendPoint]) -> Chart {
        self.trend.replace(trend_chart(points)).clone()
    }
}

pub fn table_chart(by_table: &Tally) -> Chart {
    let labels: Vec<String> = by_table.labels().map(display_name_for).collect();
    let values: Vec<u64> = by_table.counts().collect();
    let svg = render_bar(&labels, &values);
    info!(
        groups = labels.len(),
        "bar chart rendered: {}",
        by_table.labels().collect::<Vec<_>>().join(", ")
    );
    Chart {
        kind: ChartKind::Bar,
        title: "# of Registrants".to_string(),
        labels,
        values,
        svg,
    }
}

pub fn new_vs_returning_chart(new: u64, returning: u64) -> Chart {
    let labels = vec!["New Members".to_string(), "Returning Members".to_string()];
    let values = vec![new, returning];
    let colors = vec![NEW_COLOR.to_string(), RETURNING_COLOR.to_string()];
    let svg = render_round(&labels, &values, &colors, 0.0);
    Chart {
        kind: ChartKind::Pie,
        title: "New vs Returning".to_string(),
        labels,
        values,
        svg,
    }
}

pub fn language_chart(by_language: &Tally) -> Chart {
    let labels: Vec<String> = by_language.labels().map(str::to_string).collect();
    let values: Vec<u64> = by_language.counts().collect();
    let colors: Vec<String> = (0..labels.len()).map(|i| palette_color_for(i, 0.7)).collect();
    let svg = render_round(&labels, &values, &colors, 0.5);
    Chart {
        kind: ChartKind::Doughnut,
        title: "Languages".to_string(),
        labels,
        values,
        svg,
    }
}

pub fn trend_chart(points: &[TrendPoint]) -> Chart {
    let labels: Vec<String> = points.iter().map(|point| point.date.to_string()).collect();
    let values: Vec<u64> = points.iter().map(|point| point.count).collect();
    let svg = render_line(&labels, &values);
    info!(points = points.len(), "trend chart rendered");
    Chart {
        kind: ChartKind::Line,
        title: "Registration Trend (Weekly)".to_string(),
        labels,
        values,
        svg,
    }
}

fn render_bar(labels: &[String], values: &[u64]) -> String {
    let mut svg = open_svg();
    let (max, step) = axis_scale(values);
    let plot_height = HEIGHT - TOP - PAD_Y;
    let y = |value: f64| HEIGHT - PAD_Y - value / max * plot_height;
    write_y_axis(&mut svg, max, step, &y);

    if !values.is_empty() {
        let slot = (WIDTH - PAD_X * 2.0) / values.len() as f64;
        let bar = slot * 0.7;
        for (i, (label, value)) in labels.iter().zip(values).enumerate() {
            let x = PAD_X + slot * i as f64 + (slot - bar) / 2.0;
            let top = y(*value as f64);
            let _ = write!(
                svg,
                r#"<rect x="{x:.1}" y="{top:.1}" width="{bar:.1}" height="{h:.1}" fill="{fill}" stroke="{stroke}" stroke-width="1"><title>{label}: {value}</title></rect>"#,
                h = HEIGHT - PAD_Y - top,
                fill = palette_color_for(i, 0.6),
                stroke = palette_color_for(i, 1.0),
                label = escape(label),
            );
            let _ = write!(
                svg,
                r#"<text class="chart-label" x="{cx:.1}" y="{ly:.1}" text-anchor="middle">{label}</text>"#,
                cx = x + bar / 2.0,
                ly = HEIGHT - PAD_Y + 18.0,
                label = escape(label),
            );
        }
    }
    svg.push_str("</svg>");
    svg
}

/// Pie when `hole` is zero, doughnut otherwise (`hole` is the inner radius
/// as a fraction of the outer one).
fn render_round(labels: &[String], values: &[u64], colors: &[String], hole: f64) -> String {
    let mut svg = open_svg();
    let total: u64 = values.iter().sum();
    let radius = (HEIGHT - TOP - PAD_Y) / 2.0 + 10.0;
    let (cx, cy) = (WIDTH / 2.0, TOP / 2.0 + radius);

    if total == 0 {
        let _ = write!(
            svg,
            r##"<circle cx="{cx:.1}" cy="{cy:.1}" r="{radius:.1}" fill="#e5e7eb" />"##
        );
    } else {
        let mut angle = -PI / 2.0;
        for (i, value) in values.iter().enumerate() {
            if *value == 0 {
                continue;
            }
            let color = &colors[i % colors.len().max(1)];
            let sweep = *value as f64 / total as f64 * 2.0 * PI;
            if *value == total {
                let _ = write!(
                    svg,
                    r#"<circle cx="{cx:.1}" cy="{cy:.1}" r="{radius:.1}" fill="{color}" stroke="white" stroke-width="1" />"#
                );
            } else {
                let (x0, y0) = (cx + radius * angle.cos(), cy + radius * angle.sin());
                let end = angle + sweep;
                let (x1, y1) = (cx + radius * end.cos(), cy + radius * end.sin());
                let large = if sweep > PI { 1 } else { 0 };
                let _ = write!(
                    svg,
                    r#"<path d="M {cx:.1} {cy:.1} L {x0:.2} {y0:.2} A {radius:.1} {radius:.1} 0 {large} 1 {x1:.2} {y1:.2} Z" fill="{color}" stroke="white" stroke-width="1"><title>{label}: {value}</title></path>"#,
                    label = escape(&labels[i]),
                );
            }
            angle += sweep;
        }
        if hole > 0.0 {
            let _ = write!(
                svg,
                r#"<circle cx="{cx:.1}" cy="{cy:.1}" r="{inner:.1}" fill="white" />"#,
                inner = radius * hole
            );
        }
    }

    let legend_y = HEIGHT - 8.0;
    let slot = WIDTH / labels.len().max(1) as f64;
    for (i, label) in labels.iter().enumerate() {
        let x = slot * i as f64 + slot / 2.0;
        let color = colors.get(i % colors.len().max(1)).map(String::as_str).unwrap_or("#999");
        let _ = write!(
            svg,
            r#"<rect x="{bx:.1}" y="{by:.1}" width="10" height="10" fill="{color}" /><text class="chart-label" x="{tx:.1}" y="{legend_y:.1}">{label} ({value})</text>"#,
            bx = x - 40.0,
            by = legend_y - 9.0,
            tx = x - 26.0,
            label = escape(label),
            value = values.get(i).copied().unwrap_or(0),
        );
    }
    svg.push_str("</svg>");
    svg
}

fn render_line(labels: &[String], values: &[u64]) -> String {
    let mut svg = open_svg();
    let (max, step) = axis_scale(values);
    let plot_height = HEIGHT - TOP - PAD_Y;
    let y = |value: f64| HEIGHT - PAD_Y - value / max * plot_height;
    write_y_axis(&mut svg, max, step, &y);

    let x_step = if values.len() > 1 {
        (WIDTH - PAD_X * 2.0) / (values.len() - 1) as f64
    } else {
        0.0
    };
    let x = |index: usize| PAD_X + index as f64 * x_step;

    let path = values
        .iter()
        .enumerate()
        .map(|(i, value)| {
            let command = if i == 0 { "M" } else { "L" };
            format!("{command} {:.1} {:.1}", x(i), y(*value as f64))
        })
        .collect::<Vec<_>>()
        .join(" ");
    if !path.is_empty() {
        let _ = write!(
            svg,
            r#"<path d="{path}" fill="none" stroke="{TREND_STROKE}" stroke-width="2" />"#
        );
    }

    let label_every = if labels.len() > 8 { 2 } else { 1 };
    for (i, (label, value)) in labels.iter().zip(values).enumerate() {
        let _ = write!(
            svg,
            r#"<circle cx="{cx:.1}" cy="{cy:.1}" r="6" fill="{TREND_FILL}" stroke="{TREND_STROKE}"><title>{label}: {value}</title></circle>"#,
            cx = x(i),
            cy = y(*value as f64),
            label = escape(label),
        );
        if i % label_every == 0 {
            let _ = write!(
                svg,
                r#"<text class="chart-label" x="{lx:.1}" y="{ly:.1}" text-anchor="middle">{label}</text>"#,
                lx = x(i),
                ly = HEIGHT - PAD_Y + 18.0,
                label = escape(label),
            );
        }
    }
    svg.push_str("</svg>");
    svg
}

fn open_svg() -> String {
    format!(
        r#"<svg xmlns="http://www.w3.org/2000/svg" viewBox="0 0 {WIDTH} {HEIGHT}" role="img" class="chart">"#
    )
}

/// Axis top and integer tick step; the axis always starts at zero.
fn axis_scale(values: &[u64]) -> (f64, u64) {
    let peak = values.iter().copied().max().unwrap_or(0).max(1);
    let step = peak.div_ceil(5).max(1);
    let top = peak.div_ceil(step) * step;
    (top as f64, step)
}

fn write_y_axis(svg: &mut String, max: f64, step: u64, y: impl Fn(f64) -> f64) {
    let mut tick = 0u64;
    while tick as f64 <= max {
        let ty = y(tick as f64);
        let _ = write!(
            svg,
            r##"<line x1="{PAD_X}" y1="{ty:.1}" x2="{x2}" y2="{ty:.1}" stroke="#e5e7eb" /><text class="chart-label" x="{tx}" y="{ly:.1}" text-anchor="end">{tick}</text>"##,
            x2 = WIDTH - PAD_X,
            tx = PAD_X - 8.0,
            ly = ty + 4.0,
        );
        tick += step;
    }
}

fn escape(text: &str) -> String {
    let mut escaped = String::with_capacity(text.len());
    for ch in text.chars() {
        match ch {
            '&' => escaped.push_str("&amp;"),
            '<' => escaped.push_str("&lt;"),
            '>' => escaped.push_str("&gt;"),
            '"' => escaped.push_str("&quot;"),
            '\'' => escaped.push_str("&#39;"),
            other => escaped.push(other),
        }
    }
    escaped
}
