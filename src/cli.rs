use std::ffi::OsString;
use std::path::PathBuf;

use anyhow::{Context, Result};
use chrono::Utc;
use clap::Parser;
use comfy_table::modifiers::UTF8_ROUND_CORNERS;
use comfy_table::presets::UTF8_FULL_CONDENSED;
use comfy_table::{Attribute, Cell, CellAlignment, Color, ContentArrangement, Table};
use log::{info, warn};

use crate::collector::collect;
use crate::config::{load_config, resolve_config_path};
use crate::logging::configure_logging;
use crate::report::{build_report, CellStyle, ReportTable};
use crate::timeframe::ReportType;
use crate::xlsx::{default_report_path, write_report};

#[derive(Parser)]
#[command(name = "promreport", version)]
#[command(about = "Prometheus host usage reports (CPU, memory, network, disks) as spreadsheets")]
pub struct Cli {
    /// Report period; selects the query range and step
    #[arg(short = 't', long = "report-type", value_enum, default_value_t = ReportType::Daily)]
    pub report_type: ReportType,
    /// Path to the YAML config (or set PROMREPORT_CONFIG)
    #[arg(short, long = "config")]
    pub config: Option<PathBuf>,
    /// Directory for the generated workbook
    #[arg(long = "output-dir")]
    pub output_dir: Option<PathBuf>,
    /// Exact workbook path; overrides --output-dir naming
    #[arg(short, long = "output")]
    pub output: Option<PathBuf>,
    /// Also print the report table to stdout
    #[arg(long = "print")]
    pub print: bool,
    /// Enable debug logging
    #[arg(short, long)]
    pub verbose: bool,
}

pub fn run<I, T>(args: I) -> Result<()>
where
    I: IntoIterator<Item = T>,
    T: Into<OsString> + Clone,
{
    let cli = Cli::parse_from(args);

    let config_path = resolve_config_path(cli.config.as_deref());
    let config = load_config(&config_path)
        .with_context(|| format!("Error loading config {}", config_path.display()))?;
    configure_logging(&config.logging, cli.verbose)?;

    let window = cli.report_type.window(Utc::now())?;
    info!(
        "Generating {} report for {} .. {} (step {}s)",
        cli.report_type,
        window.start.format("%Y-%m-%d %H:%M:%S"),
        window.end.format("%Y-%m-%d %H:%M:%S"),
        window.step.as_secs()
    );

    let store = collect(&config, &window);
    if store.is_empty() {
        warn!("No query returned data; the report will contain headers only");
    }
    let table = build_report(&store);

    if cli.print {
        println!("{}", render_table(&table));
    }

    let output = cli.output.unwrap_or_else(|| {
        default_report_path(cli.report_type, cli.output_dir.as_deref(), None)
    });
    write_report(&table, &output)
}

fn themed_table() -> Table {
    let mut table = Table::new();
    table
        .load_preset(UTF8_FULL_CONDENSED)
        .apply_modifier(UTF8_ROUND_CORNERS)
        .set_content_arrangement(ContentArrangement::Dynamic);
    table
}

fn styled_cell(text: &str, style: CellStyle) -> Cell {
    let mut cell = Cell::new(text);
    if style.bold {
        cell = cell.add_attribute(Attribute::Bold).fg(Color::Cyan);
    }
    if style.centered {
        cell = cell.set_alignment(CellAlignment::Center);
    }
    cell
}

/// Terminal rendering of the same grid the workbook receives.
pub fn render_table(report: &ReportTable) -> Table {
    let mut table = themed_table();
    for (row_idx, row) in report.grid().into_iter().enumerate() {
        let style = ReportTable::style_for_row(row_idx);
        let cells: Vec<Cell> = row.into_iter().map(|text| styled_cell(text, style)).collect();
        if row_idx == 0 {
            table.set_header(cells);
        } else {
            table.add_row(cells);
        }
    }
    table
}
