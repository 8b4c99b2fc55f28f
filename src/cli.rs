use crate::{
    chart::{ChartConfig, build_status_series, build_success_rate_series},
    config::Config,
    dashboard::render_dashboard,
    report::{MigrationReport, select_sheet},
    util::{ensure_dir, hash_file, now_rfc3339},
};
use anyhow::{Context, Result, bail};
use clap::{Parser, Subcommand};
use std::path::{Path, PathBuf};
use tracing::{debug, info, warn};
use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::{EnvFilter, Layer, layer::SubscriberExt, util::SubscriberInitExt};

#[derive(Parser, Debug)]
#[command(name = "migration-dashboard")]
#[command(about = "Render row-status and success-rate charts from a data-migration report")]
pub struct Args {
    #[command(subcommand)]
    pub cmd: Command,

    /// Path to config TOML. If omitted, uses ./migration-dashboard.toml if present.
    #[arg(long)]
    pub config: Option<PathBuf>,

    /// Migration report JSON (overrides paths.report).
    #[arg(long, env = "MIGRATION_DASHBOARD_REPORT")]
    pub report: Option<PathBuf>,

    /// Sheet to chart; repeat for several (overrides dashboard.sheets).
    /// Names are taken whole, commas included.
    #[arg(long = "sheet", env = "MIGRATION_DASHBOARD_SHEET")]
    pub sheets: Vec<String>,

    /// Override log level (trace/debug/info/warn/error).
    #[arg(long)]
    pub log_level: Option<String>,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Write the dashboard HTML page.
    Render {
        #[arg(long)]
        out_dir: Option<PathBuf>,
    },
    /// Print chart series and Chart.js configs for each selected sheet.
    Series {},
    /// List every sheet in the report with its validation status.
    Sheets {},
    /// Validate the report and cross-check its counts.
    Check {},
}

pub fn dispatch(args: Args) -> Result<()> {
    let mut cfg = match resolve_config_path(args.config.as_deref()) {
        // Logging is not up yet, so a bad config is reported directly.
        Some(path) => Config::load(&path).inspect_err(|e| eprintln!("error: {e:#}"))?,
        None => Config::default(),
    };
    cfg.apply_overrides(args.report.as_deref(), &args.sheets);

    let log_path = resolve_log_path(&cfg);
    let _guard = init_logging(&args, &cfg, log_path.as_deref())?;

    match &args.cmd {
        Command::Render { out_dir } => render(&cfg, out_dir.as_deref()),
        Command::Series {} => series(&cfg),
        Command::Sheets {} => sheets(&cfg),
        Command::Check {} => check(&cfg),
    }
}

fn resolve_config_path(user: Option<&Path>) -> Option<PathBuf> {
    if let Some(p) = user {
        return Some(p.to_path_buf());
    }
    let default = PathBuf::from("migration-dashboard.toml");
    default.exists().then_some(default)
}

fn init_logging(args: &Args, cfg: &Config, file_path: Option<&Path>) -> Result<Option<WorkerGuard>> {
    let level = args
        .log_level
        .as_deref()
        .unwrap_or(cfg.logging.level.as_str());

    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level));

    // Logs go to stderr so command output on stdout stays machine-readable.
    let stderr_layer = if cfg.logging.json {
        tracing_subscriber::fmt::layer()
            .json()
            .with_writer(std::io::stderr)
            .with_target(true)
            .boxed()
    } else {
        tracing_subscriber::fmt::layer()
            .with_writer(std::io::stderr)
            .with_target(true)
            .boxed()
    };

    let (file_layer, guard) = if let Some(path) = file_path {
        let parent = path.parent().unwrap_or_else(|| Path::new("."));
        ensure_dir(parent)?;
        let file = std::fs::File::create(path)
            .with_context(|| format!("create log file: {}", path.display()))?;
        let (non_blocking, guard) = tracing_appender::non_blocking(file);
        let layer = tracing_subscriber::fmt::layer()
            .with_writer(non_blocking)
            .with_ansi(false)
            .with_target(true)
            .boxed();
        (Some(layer), Some(guard))
    } else {
        (None, None)
    };

    // A second dispatch in the same process keeps the subscriber already installed.
    if let Err(e) = tracing_subscriber::registry()
        .with(filter)
        .with(stderr_layer)
        .with(file_layer)
        .try_init()
    {
        debug!("logging already initialised: {e}");
    }

    Ok(guard)
}

fn resolve_log_path(cfg: &Config) -> Option<PathBuf> {
    if !cfg.logging.write_to_file {
        return None;
    }

    if !cfg.logging.file_path.is_empty() {
        return Some(PathBuf::from(&cfg.logging.file_path));
    }

    Some(PathBuf::from(&cfg.paths.out_dir).join("migration-dashboard.log"))
}

fn load_report(cfg: &Config) -> Result<MigrationReport> {
    let path = Path::new(&cfg.paths.report);
    let report = MigrationReport::load(path)?;
    info!(
        "report={} sheets={}",
        path.display(),
        report.sheet_names().len()
    );
    Ok(report)
}

fn render(cfg: &Config, out_override: Option<&Path>) -> Result<()> {
    let report = load_report(cfg)?;
    let page = render_dashboard(&report, cfg)?;

    let out_dir = out_override
        .map(PathBuf::from)
        .unwrap_or_else(|| PathBuf::from(&cfg.paths.out_dir));
    ensure_dir(&out_dir)?;

    let html_path = out_dir.join(&cfg.output.html_filename);
    std::fs::write(&html_path, &page.html)
        .with_context(|| format!("writing {}", html_path.display()))?;
    info!("wrote {}", html_path.display());

    if cfg.debug.dump_effective_config {
        let raw = toml::to_string(cfg).unwrap_or_default();
        std::fs::write(out_dir.join("effective-config.toml"), raw)?;
    }

    let report_path = Path::new(&cfg.paths.report);
    let index = serde_json::json!({
        "report": report_path,
        "report_sha256": hash_file(report_path)?,
        "generated": now_rfc3339(),
        "dashboard": cfg.output.html_filename,
        "sheets": page.sheets,
    });

    if cfg.output.write_index_json {
        std::fs::write(
            out_dir.join(&cfg.output.index_filename),
            serde_json::to_string_pretty(&index)?,
        )?;
    }

    if !page.all_rendered() {
        warn!("dashboard written with placeholders for some sheets");
    }

    if cfg.output.print_summary {
        let status = if page.all_rendered() { "ok" } else { "partial" };
        println!(
            "{}",
            serde_json::to_string_pretty(&serde_json::json!({
                "dashboard": html_path,
                "sheets": page.sheets,
                "status": status,
            }))?
        );
    }

    Ok(())
}

fn series(cfg: &Config) -> Result<()> {
    let report = load_report(cfg)?;
    let mut out = Vec::with_capacity(cfg.dashboard.sheets.len());

    for name in &cfg.dashboard.sheets {
        let sheet = select_sheet(&report, name)?;
        let status = build_status_series(sheet);
        let rate = build_success_rate_series(sheet);
        out.push(serde_json::json!({
            "sheet": name,
            "status": status,
            "success_rate": rate,
            "charts": {
                "status": ChartConfig::pie(&status, &cfg.dashboard.status_chart_title),
                "success_rate": ChartConfig::bar_percentage(&rate, &cfg.dashboard.success_chart_title),
            },
        }));
    }

    println!("{}", serde_json::to_string_pretty(&out)?);
    Ok(())
}

fn sheets(cfg: &Config) -> Result<()> {
    let report = load_report(cfg)?;
    let listing: Vec<_> = report
        .sheet_names()
        .into_iter()
        .map(|name| {
            serde_json::json!({
                "sheet": name,
                "status": report.status(name),
            })
        })
        .collect();
    println!("{}", serde_json::to_string_pretty(&listing)?);
    Ok(())
}

fn check(cfg: &Config) -> Result<()> {
    let report = load_report(cfg)?;

    let mut notes = Vec::new();
    for (name, sheet) in report.sheets() {
        for note in sheet.consistency() {
            warn!("sheet {name:?}: {note:?}");
            notes.push(serde_json::json!({ "sheet": name, "note": note }));
        }
    }

    let malformed: Vec<_> = report
        .malformed_sheets()
        .map(|(name, bad)| serde_json::json!({ "sheet": name, "field": bad.field, "reason": bad.reason }))
        .collect();

    println!(
        "{}",
        serde_json::to_string_pretty(&serde_json::json!({
            "report": cfg.paths.report,
            "valid_sheets": report.sheets().count(),
            "malformed": malformed,
            "consistency": notes,
        }))?
    );

    if !report.is_fully_valid() {
        bail!("{} malformed sheet(s) in {}", malformed.len(), cfg.paths.report);
    }
    Ok(())
}
