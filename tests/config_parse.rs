use migration_dashboard::config::Config;
use std::path::Path;

#[test]
fn parse_example_config() {
    let raw = include_str!("../migration-dashboard.example.toml");
    let cfg: Config = toml::from_str(raw).expect("parse TOML");
    assert_eq!(cfg.dashboard.sheets, vec!["Location"]);
    assert_eq!(cfg.dashboard.chart_width_px, 600);
    assert!(!cfg.paths.out_dir.is_empty());
}

#[test]
fn missing_sections_fall_back_to_defaults() {
    let cfg: Config = toml::from_str("[paths]\nreport = \"r.json\"\nout_dir = \"o\"\n").unwrap();
    assert_eq!(cfg.paths.report, "r.json");
    assert_eq!(cfg.dashboard.sheets, vec!["Location"]);
    assert_eq!(cfg.output.html_filename, "dashboard.html");
    assert_eq!(cfg.logging.level, "info");
}

#[test]
fn command_line_overrides_report_and_sheets() {
    let mut cfg = Config::default();
    cfg.apply_overrides(Some(Path::new("other.json")), &["Product".to_string()]);
    assert_eq!(cfg.paths.report, "other.json");
    assert_eq!(cfg.dashboard.sheets, vec!["Product"]);

    cfg.apply_overrides(None, &[]);
    assert_eq!(cfg.paths.report, "other.json");
    assert_eq!(cfg.dashboard.sheets, vec!["Product"]);
}
