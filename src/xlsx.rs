use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use chrono::{DateTime, Local};
use log::info;
use rust_xlsxwriter::{Format, FormatAlign, Workbook};

use crate::report::{CellStyle, ReportTable};
use crate::timeframe::ReportType;

pub const SHEET_NAME: &str = "Report";

pub fn default_report_path(
    report_type: ReportType,
    base_dir: Option<&Path>,
    now: Option<DateTime<Local>>,
) -> PathBuf {
    let current = now.unwrap_or_else(Local::now);
    let filename = format!(
        "report_{}_{}.xlsx",
        report_type,
        current.format("%Y%m%d_%H%M%S")
    );
    base_dir
        .map(PathBuf::from)
        .unwrap_or_else(|| PathBuf::from("."))
        .join(filename)
}

fn cell_format(style: CellStyle) -> Format {
    let mut format = Format::new();
    if style.bold {
        format = format.set_bold();
    }
    if style.centered {
        format = format.set_align(FormatAlign::Center);
    }
    format
}

/// Writes the table to a single `Report` worksheet at `path`.
pub fn write_report(table: &ReportTable, path: &Path) -> Result<()> {
    let mut workbook = Workbook::new();
    let header_fmt = cell_format(CellStyle::HEADER);
    let data_fmt = cell_format(CellStyle::DATA);

    let sheet = workbook.add_worksheet();
    sheet.set_name(SHEET_NAME)?;

    for (row_idx, row) in table.grid().iter().enumerate() {
        let fmt = if ReportTable::style_for_row(row_idx) == CellStyle::HEADER {
            &header_fmt
        } else {
            &data_fmt
        };
        for (col_idx, cell) in row.iter().enumerate() {
            sheet.write_string_with_format(row_idx as u32, col_idx as u16, *cell, fmt)?;
        }
    }

    for (col_idx, width) in table.column_widths.iter().enumerate() {
        sheet.set_column_width(col_idx as u16, *width as f64)?;
    }

    workbook
        .save(path)
        .with_context(|| format!("Failed to save report file: {}", path.display()))?;
    info!("Report generated: {}", path.display());
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    use crate::metrics::MetricKind;
    use crate::report::build_report;
    use crate::store::{Point, QueryResult, SampleStream, SeriesStore};

    #[test]
    fn default_path_has_type_and_timestamp() {
        let now = Local.with_ymd_and_hms(2026, 10, 19, 8, 5, 9).unwrap();
        let path = default_report_path(ReportType::Weekly, Some(Path::new("/tmp")), Some(now));
        assert_eq!(path, PathBuf::from("/tmp/report_weekly_20261019_080509.xlsx"));
    }

    #[test]
    fn writes_a_workbook() {
        let mut store = SeriesStore::new();
        store.insert(
            "prod",
            MetricKind::CpuUsage,
            QueryResult::Matrix(vec![SampleStream::new(
                [("instance", "a:9100"), ("name", "alpha")],
                vec![Point { ts: 0.0, value: 0.5 }],
            )]),
        );
        let table = build_report(&store);

        let tmp = tempfile::tempdir().unwrap();
        let path = default_report_path(ReportType::Daily, Some(tmp.path()), None);
        write_report(&table, &path).unwrap();

        let written = std::fs::metadata(&path).unwrap();
        assert!(written.len() > 0);
    }

    #[test]
    fn unwritable_destination_is_an_error() {
        let table = build_report(&SeriesStore::new());
        let tmp = tempfile::tempdir().unwrap();
        let path = tmp.path().join("missing-dir").join("report.xlsx");
        assert!(write_report(&table, &path).is_err());
    }
}
