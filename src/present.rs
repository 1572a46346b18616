//! Projections of aligned series for the presentation layer.
//!
//! The table renderer wants `(title, month, stat)` triples; the plotting
//! routine wants parallel month and stat vectors. Both are plain data and
//! serialize to JSON for whatever renders them.

use chrono::NaiveDate;
use serde::Serialize;

use crate::model::Record;

pub const X_AXIS_LABEL: &str = "Time";
pub const Y_AXIS_LABEL: &str = "Number of Players on Steam";

/// One row of the popularity table.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TableRow {
    pub title: String,
    /// `YYYY-MM`
    pub month: String,
    pub stat: f64,
}

/// A single line on a chart.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PlotSeries {
    pub title: String,
    pub months: Vec<NaiveDate>,
    pub stats: Vec<f64>,
}

/// Two series drawn on the same axes.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ComparisonChart {
    pub caption: String,
    pub x_label: String,
    pub y_label: String,
    pub first: PlotSeries,
    pub second: PlotSeries,
}

pub fn table_rows(records: &[Record]) -> Vec<TableRow> {
    records
        .iter()
        .map(|r| TableRow {
            title: r.title().to_string(),
            month: r.month().format("%Y-%m").to_string(),
            stat: r.stat(),
        })
        .collect()
}

/// Splits records into parallel month and stat vectors, keeping their order.
///
/// The series title is taken from the first record; an empty slice gives an
/// empty, untitled series.
pub fn plot_series(records: &[Record]) -> PlotSeries {
    let title = records.first().map(|r| r.title().to_string()).unwrap_or_default();
    let (months, stats) = records.iter().map(|r| (r.month(), r.stat())).unzip();
    PlotSeries { title, months, stats }
}

impl ComparisonChart {
    pub fn new(first: &[Record], second: &[Record]) -> Self {
        let first = plot_series(first);
        let second = plot_series(second);
        Self {
            caption: format!("Results Graph: {} and {}", first.title, second.title),
            x_label: X_AXIS_LABEL.to_string(),
            y_label: Y_AXIS_LABEL.to_string(),
            first,
            second,
        }
    }
}

pub fn to_json<T: Serialize>(value: &T) -> Result<String, serde_json::Error> {
    serde_json::to_string_pretty(value)
}
