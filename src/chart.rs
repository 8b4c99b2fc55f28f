use crate::report::SheetReport;
use serde::Serialize;
use serde_json::json;

pub const GREEN: &str = "#4CAF50";
pub const RED: &str = "#F44336";
pub const ORANGE: &str = "#FF9800";
pub const BLUE: &str = "#2196F3";

pub const STATUS_LABELS: [&str; 4] = [
    "Success",
    "Upload Errors",
    "Validation Errors",
    "Mapping Errors",
];
pub const SUCCESS_RATE_LABEL: &str = "Success Rate (%)";

/// Labels, values and colors line up index by index.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ChartSeries {
    pub label: String,
    pub labels: Vec<String>,
    pub data: Vec<f64>,
    pub colors: Vec<String>,
}

impl ChartSeries {
    pub fn len(&self) -> usize {
        self.labels.len()
    }

    pub fn is_empty(&self) -> bool {
        self.labels.is_empty()
    }
}

/// Counts become `f64` values, so anything above 2^53 loses precision the same
/// way it would once handed to Chart.js.
pub fn build_status_series(sheet: &SheetReport) -> ChartSeries {
    ChartSeries {
        label: "Row Status".into(),
        labels: STATUS_LABELS.iter().map(|s| s.to_string()).collect(),
        data: vec![
            sheet.success_count as f64,
            sheet.upload_errors as f64,
            sheet.validation_errors as f64,
            sheet.mapping_errors as f64,
        ],
        colors: vec![GREEN.into(), RED.into(), ORANGE.into(), BLUE.into()],
    }
}

/// The rate is passed through as-is: no clamping, no rounding.
pub fn build_success_rate_series(sheet: &SheetReport) -> ChartSeries {
    ChartSeries {
        label: "Success Rate".into(),
        labels: vec![SUCCESS_RATE_LABEL.into()],
        data: vec![sheet.success_rate],
        colors: vec![GREEN.into()],
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum ChartKind {
    Pie,
    Bar,
}

/// A configuration object in the shape Chart.js accepts for `new Chart(el, cfg)`.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ChartConfig {
    #[serde(rename = "type")]
    pub kind: ChartKind,
    pub data: ChartData,
    pub options: serde_json::Value,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ChartData {
    pub labels: Vec<String>,
    pub datasets: Vec<Dataset>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Dataset {
    pub label: String,
    pub data: Vec<f64>,
    pub background_color: Vec<String>,
}

impl ChartConfig {
    pub fn pie(series: &ChartSeries, title: &str) -> Self {
        Self {
            kind: ChartKind::Pie,
            data: ChartData::from(series),
            options: json!({
                "responsive": true,
                "plugins": { "title": { "display": true, "text": title } }
            }),
        }
    }

    /// Bar chart with the y axis pinned to 0..=100.
    pub fn bar_percentage(series: &ChartSeries, title: &str) -> Self {
        Self {
            kind: ChartKind::Bar,
            data: ChartData::from(series),
            options: json!({
                "responsive": true,
                "plugins": { "title": { "display": true, "text": title } },
                "scales": {
                    "y": {
                        "min": 0,
                        "max": 100,
                        "title": { "display": true, "text": "Percentage" }
                    }
                }
            }),
        }
    }
}

impl From<&ChartSeries> for ChartData {
    fn from(series: &ChartSeries) -> Self {
        ChartData {
            labels: series.labels.clone(),
            datasets: vec![Dataset {
                label: series.label.clone(),
                data: series.data.clone(),
                background_color: series.colors.clone(),
            }],
        }
    }
}
