//! Chart figures for the dashboard.
//!
//! Each figure is built as a `plotly` [`Plot`] and kept in its serialized
//! `{data, layout, config}` form; the browser hands `data` and `layout` to
//! Plotly.js untouched.

use plotly::common::Marker;
use plotly::layout::{Axis, BarMode};
use plotly::{Bar, Configuration, Layout, Pie, Plot};
use serde::Serialize;
use serde_json::Value;
use tracing::warn;

use crate::aggregate::{FieldMeans, OccupancyShare, ShiftShare, Summary};
use crate::models::Occupancy;

// ---

/// Lower bound of the value axis on the sensor means chart.
pub const MEANS_AXIS_FLOOR: f64 = -100.0;

/// The three dashboard figures.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Charts {
    pub occupancy: Value,
    pub shifts: Value,
    pub means: Value,
}

impl Charts {
    pub fn from_summary(summary: &Summary) -> Self {
        Charts {
            occupancy: figure(occupancy_chart(&summary.overall)),
            shifts: figure(shift_chart(&summary.by_shift)),
            means: figure(means_chart(&summary.means)),
        }
    }
}

fn new_plot() -> Plot {
    let mut plot = Plot::new();
    plot.set_configuration(Configuration::default().display_logo(false));
    plot
}

/// Serialized figure; a plot that fails to round-trip is published as null.
fn figure(plot: Plot) -> Value {
    // ---
    serde_json::from_str(&plot.to_json()).unwrap_or_else(|e| {
        warn!("Failed to serialize chart figure: {}", e);
        Value::Null
    })
}

fn occupancy_chart(shares: &[OccupancyShare]) -> Plot {
    // ---
    let mut plot = new_plot();
    if !shares.is_empty() {
        let values: Vec<f64> = shares.iter().map(|s| s.percentage).collect();
        let labels: Vec<&str> = shares.iter().map(|s| s.status.label()).collect();
        let trace = Pie::new(values).labels(labels);
        plot.add_trace(trace);
    }
    plot.set_layout(Layout::new().title("Porcentagem de ocupação e desocupação"));
    plot
}

/// One stacked trace per status, x = shift.
fn shift_chart(shares: &[ShiftShare]) -> Plot {
    // ---
    let mut plot = new_plot();
    for status in Occupancy::ALL {
        let points: Vec<&ShiftShare> = shares.iter().filter(|s| s.status == status).collect();
        if points.is_empty() {
            continue;
        }
        let x: Vec<&str> = points.iter().map(|s| s.shift.label()).collect();
        let y: Vec<f64> = points.iter().map(|s| s.percentage).collect();
        let trace = Bar::new(x, y)
            .name(status.label())
            .marker(Marker::new().color(status.color()));
        plot.add_trace(trace);
    }

    plot.set_layout(
        Layout::new()
            .title("Porcentagem de ocupação e desocupação por turno")
            .bar_mode(BarMode::Stack)
            .x_axis(Axis::new().title("Turno"))
            .y_axis(Axis::new().title("%")),
    );
    plot
}

/// Grouped bars of field means. Groups without data are left out of the
/// trace instead of being plotted as NaN.
fn means_chart(means: &[FieldMeans]) -> Plot {
    // ---
    let groups = [
        (Occupancy::Occupied, "Ocupados"),
        (Occupancy::Unoccupied, "Desocupados"),
    ];

    let mut plot = new_plot();
    let mut ceiling = 0.0_f64;
    for (status, name) in groups {
        let points: Vec<(&'static str, f64)> = means
            .iter()
            .filter_map(|m| {
                let value = match status {
                    Occupancy::Occupied => m.occupied,
                    Occupancy::Unoccupied => m.unoccupied,
                };
                value.map(|v| (m.field.label(), v))
            })
            .collect();
        if points.is_empty() {
            continue;
        }
        ceiling = points.iter().fold(ceiling, |acc, (_, v)| acc.max(*v));

        let (x, y): (Vec<&str>, Vec<f64>) = points.into_iter().unzip();
        let trace = Bar::new(x, y)
            .name(name)
            .marker(Marker::new().color(status.color()));
        plot.add_trace(trace);
    }

    // Plotly needs both ends of a fixed range; leave headroom above the
    // tallest bar.
    let top = if ceiling > 0.0 { ceiling * 1.1 } else { 1.0 };

    plot.set_layout(
        Layout::new()
            .title("Média das variáveis ambientais em locais ocupados e desocupados")
            .bar_mode(BarMode::Group)
            .x_axis(Axis::new().title("Variável"))
            .y_axis(Axis::new().title("Média").range(vec![MEANS_AXIS_FLOOR, top])),
    );
    plot
}
