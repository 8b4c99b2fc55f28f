//! Dashboard page rendering (HTML).

use crate::{
    chart::{ChartConfig, build_status_series, build_success_rate_series},
    config::Config,
    report::MigrationReport,
    util::{escape_html, escape_script_json},
};
use anyhow::Result;
use serde::Serialize;
use std::fmt::Write as _;
use tracing::{debug, warn};

const TEMPLATE: &str = include_str!("../templates/dashboard.html");

#[derive(Debug, Clone, Serialize)]
pub struct DashboardPage {
    #[serde(skip)]
    pub html: String,
    pub sheets: Vec<SheetOutcome>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SheetOutcome {
    pub name: String,
    pub rendered: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl DashboardPage {
    pub fn all_rendered(&self) -> bool {
        self.sheets.iter().all(|s| s.rendered)
    }
}

/// Render one section per configured sheet. A sheet that is missing or
/// malformed gets a visible placeholder; the page itself is always produced.
pub fn render_dashboard(report: &MigrationReport, cfg: &Config) -> Result<DashboardPage> {
    let dash = &cfg.dashboard;
    let mut sections = String::new();
    let mut charts = String::new();
    let mut outcomes = Vec::with_capacity(dash.sheets.len());

    for (i, name) in dash.sheets.iter().enumerate() {
        writeln!(sections, "  <section class=\"sheet\">")?;
        writeln!(sections, "    <h2>{}</h2>", escape_html(name))?;

        match report.select_sheet(name) {
            Ok(sheet) => {
                let pie = ChartConfig::pie(&build_status_series(sheet), &dash.status_chart_title);
                let bar = ChartConfig::bar_percentage(
                    &build_success_rate_series(sheet),
                    &dash.success_chart_title,
                );

                for (id, cfg_json) in [
                    (format!("status-{i}"), serde_json::to_string(&pie)?),
                    (format!("rate-{i}"), serde_json::to_string(&bar)?),
                ] {
                    writeln!(
                        sections,
                        "    <div style=\"width: {}px; margin-bottom: 40px\"><canvas id=\"{id}\"></canvas></div>",
                        dash.chart_width_px
                    )?;
                    writeln!(
                        charts,
                        "    new Chart(document.getElementById(\"{id}\"), {});",
                        escape_script_json(&cfg_json)
                    )?;
                }

                debug!("rendered sheet {name:?}");
                outcomes.push(SheetOutcome {
                    name: name.clone(),
                    rendered: true,
                    error: None,
                });
            }
            Err(err) => {
                warn!("sheet {name:?} not drawn: {err}");
                writeln!(
                    sections,
                    "    <div class=\"chart-error\" role=\"alert\">Charts unavailable: {}</div>",
                    escape_html(&err.to_string())
                )?;
                outcomes.push(SheetOutcome {
                    name: name.clone(),
                    rendered: false,
                    error: Some(err.to_string()),
                });
            }
        }

        writeln!(sections, "  </section>")?;
    }

    let title = escape_html(&dash.page_title);
    let chartjs_src = escape_html(&dash.chartjs_src);
    let heading = escape_html(&dash.heading);
    let html = fill_template(
        TEMPLATE,
        &[
            ("__TITLE__", title.as_str()),
            ("__CHARTJS_SRC__", chartjs_src.as_str()),
            ("__HEADING__", heading.as_str()),
            ("__SECTIONS__", sections.trim_end()),
            ("__CHARTS__", charts.trim_end()),
        ],
    );

    Ok(DashboardPage {
        html,
        sheets: outcomes,
    })
}

/// Substitute placeholders in one left-to-right pass; inserted values are
/// never scanned for further placeholders.
fn fill_template(template: &str, slots: &[(&str, &str)]) -> String {
    let mut out = String::with_capacity(template.len());
    let mut rest = template;

    loop {
        let next = slots
            .iter()
            .filter_map(|&(key, value)| rest.find(key).map(|at| (at, key, value)))
            .min_by_key(|&(at, _, _)| at);

        match next {
            Some((at, key, value)) => {
                out.push_str(&rest[..at]);
                out.push_str(value);
                rest = &rest[at + key.len()..];
            }
            None => {
                out.push_str(rest);
                return out;
            }
        }
    }
}
