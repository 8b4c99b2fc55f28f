use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::path::Path;

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub paths: Paths,
    #[serde(default)]
    pub dashboard: Dashboard,
    #[serde(default)]
    pub output: Output,
    #[serde(default)]
    pub logging: Logging,
    #[serde(default)]
    pub debug: Debug,
}

impl Config {
    pub fn load(path: &Path) -> Result<Self> {
        let raw = std::fs::read_to_string(path)
            .with_context(|| format!("reading config: {}", path.display()))?;
        let cfg: Config = toml::from_str(&raw).with_context(|| "parsing TOML")?;
        Ok(cfg)
    }

    /// Replace the report path and/or the sheet list from the command line.
    pub fn apply_overrides(&mut self, report: Option<&Path>, sheets: &[String]) {
        if let Some(p) = report {
            self.paths.report = p.display().to_string();
        }
        if !sheets.is_empty() {
            self.dashboard.sheets = sheets.to_vec();
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Paths {
    pub report: String,
    pub out_dir: String,
}
impl Default for Paths {
    fn default() -> Self {
        Self {
            report: "migration_report.json".into(),
            out_dir: "out".into(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Dashboard {
    pub sheets: Vec<String>,
    pub page_title: String,
    pub heading: String,
    pub status_chart_title: String,
    pub success_chart_title: String,
    pub chart_width_px: u32,
    pub chartjs_src: String,
}
impl Default for Dashboard {
    fn default() -> Self {
        Self {
            sheets: vec!["Location".into()],
            page_title: "Data Migration Dashboard".into(),
            heading: "Data Migration Dashboard".into(),
            status_chart_title: "Data Cleanliness Overview".into(),
            success_chart_title: "Migration Success Rate".into(),
            chart_width_px: 600,
            chartjs_src: "https://cdn.jsdelivr.net/npm/chart.js@4".into(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Output {
    pub html_filename: String,
    pub write_index_json: bool,
    pub index_filename: String,
    pub print_summary: bool,
}
impl Default for Output {
    fn default() -> Self {
        Self {
            html_filename: "dashboard.html".into(),
            write_index_json: true,
            index_filename: "index.json".into(),
            print_summary: true,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Logging {
    pub level: String,
    pub json: bool,
    pub write_to_file: bool,
    pub file_path: String,
}
impl Default for Logging {
    fn default() -> Self {
        Self {
            level: "info".into(),
            json: false,
            write_to_file: false,
            file_path: "".into(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Debug {
    pub dump_effective_config: bool,
}
impl Default for Debug {
    fn default() -> Self {
        Self {
            dump_effective_config: false,
        }
    }
}
