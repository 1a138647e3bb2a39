use std::collections::btree_map::Entry;
use std::collections::BTreeMap;

use log::debug;

use crate::aggregate::{reduce, StreamFilter};
use crate::dimensions::discover_all;
use crate::metrics::MetricKind;
use crate::store::{QueryResult, SeriesStore, NAME_LABEL};
use crate::units::normalize;

pub const IDENTITY_HEADERS: [&str; 3] = ["Platform", "Host", "Name"];
pub const STAT_LABELS: [&str; 3] = ["Max", "Min", "Avg"];
const COLUMN_PADDING: usize = 2;

/// One max/min/avg column group.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ColumnSpec {
    pub metric: MetricKind,
    /// Value of the metric's dimension label, for dynamic groups.
    pub dimension: Option<String>,
}

impl ColumnSpec {
    pub fn fixed(metric: MetricKind) -> Self {
        ColumnSpec {
            metric,
            dimension: None,
        }
    }

    pub fn title(&self) -> String {
        match &self.dimension {
            Some(value) => format!("{} {}", self.metric.title(), value),
            None => self.metric.title().to_string(),
        }
    }

    pub fn headers(&self) -> [String; 3] {
        let unit = self.metric.unit();
        let title = self.title();
        STAT_LABELS.map(|stat| unit.header(&title, stat))
    }

    pub fn filter<'a>(&'a self, host: &'a str) -> StreamFilter<'a> {
        let filter = StreamFilter::host(host);
        match (self.metric.dimension_label(), self.dimension.as_deref()) {
            (Some(label), Some(value)) => filter.with_dimension(label, value),
            _ => filter,
        }
    }
}

/// Fixed groups followed by one group per discovered dimension value.
///
/// Built once per report; every row is projected against the same list.
pub fn column_specs(store: &SeriesStore) -> Vec<ColumnSpec> {
    let mut columns: Vec<ColumnSpec> = MetricKind::fixed().map(ColumnSpec::fixed).collect();
    for (metric, values) in discover_all(store) {
        columns.extend(values.into_iter().map(|value| ColumnSpec {
            metric,
            dimension: Some(value),
        }));
    }
    columns
}

/// Hosts seen in any metric of one source, mapped to their display name.
///
/// The first non-empty `name` label observed wins; metrics are visited in
/// kind order and streams in response order.
pub fn discover_hosts(results: &BTreeMap<MetricKind, QueryResult>) -> BTreeMap<String, String> {
    let mut hosts: BTreeMap<String, String> = BTreeMap::new();
    for stream in results.values().flat_map(QueryResult::streams) {
        let Some(host) = stream.instance() else {
            continue;
        };
        let name = stream.label(NAME_LABEL).unwrap_or_default();
        match hosts.entry(host.to_string()) {
            Entry::Vacant(slot) => {
                slot.insert(name.to_string());
            }
            Entry::Occupied(mut slot) => {
                if slot.get().is_empty() {
                    slot.insert(name.to_string());
                } else if !name.is_empty() && slot.get() != name {
                    debug!(
                        "Host {host} reports name {name:?}, keeping {:?}",
                        slot.get()
                    );
                }
            }
        }
    }
    hosts
}

/// Presentation intent handed to the output writers.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CellStyle {
    pub bold: bool,
    pub centered: bool,
}

impl CellStyle {
    pub const HEADER: CellStyle = CellStyle {
        bold: true,
        centered: true,
    };
    pub const DATA: CellStyle = CellStyle {
        bold: false,
        centered: true,
    };
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReportRow {
    pub source: String,
    pub host: String,
    pub name: String,
    /// Formatted statistics, three per column group.
    pub values: Vec<String>,
}

impl ReportRow {
    pub fn cells(&self) -> impl Iterator<Item = &str> {
        [self.source.as_str(), self.host.as_str(), self.name.as_str()]
            .into_iter()
            .chain(self.values.iter().map(String::as_str))
    }
}

/// Logical report grid: header, data rows, widths and style intent.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReportTable {
    pub columns: Vec<ColumnSpec>,
    pub header: Vec<String>,
    pub rows: Vec<ReportRow>,
    /// Display width per column, padding included.
    pub column_widths: Vec<usize>,
}

impl ReportTable {
    pub fn width(&self) -> usize {
        self.header.len()
    }

    /// Style for a grid row; row 0 is the header.
    pub fn style_for_row(row_index: usize) -> CellStyle {
        if row_index == 0 {
            CellStyle::HEADER
        } else {
            CellStyle::DATA
        }
    }

    /// Header followed by data rows, as plain cell text.
    pub fn grid(&self) -> Vec<Vec<&str>> {
        let mut grid = Vec::with_capacity(self.rows.len() + 1);
        grid.push(self.header.iter().map(String::as_str).collect::<Vec<_>>());
        grid.extend(self.rows.iter().map(|row| row.cells().collect::<Vec<_>>()));
        grid
    }
}

fn header_row(columns: &[ColumnSpec]) -> Vec<String> {
    IDENTITY_HEADERS
        .iter()
        .map(|h| h.to_string())
        .chain(columns.iter().flat_map(ColumnSpec::headers))
        .collect()
}

fn build_row(
    source: &str,
    host: &str,
    name: &str,
    results: &BTreeMap<MetricKind, QueryResult>,
    columns: &[ColumnSpec],
) -> ReportRow {
    let mut values = Vec::with_capacity(columns.len() * 3);
    for column in columns {
        let aggregate = reduce(results.get(&column.metric), &column.filter(host));
        values.extend(normalize(&column.metric.unit(), &aggregate).into_cells());
    }
    ReportRow {
        source: source.to_string(),
        host: host.to_string(),
        name: name.to_string(),
        values,
    }
}

fn column_widths(header: &[String], rows: &[ReportRow]) -> Vec<usize> {
    let mut widths: Vec<usize> = header.iter().map(|h| h.chars().count()).collect();
    for row in rows {
        for (width, cell) in widths.iter_mut().zip(row.cells()) {
            *width = (*width).max(cell.chars().count());
        }
    }
    widths.into_iter().map(|w| w + COLUMN_PADDING).collect()
}

pub fn build_report(store: &SeriesStore) -> ReportTable {
    let columns = column_specs(store);
    let header = header_row(&columns);

    let mut rows = Vec::new();
    for (source, results) in store.sources() {
        let hosts = discover_hosts(results);
        debug!("Source {source}: {} host(s)", hosts.len());
        for (host, name) in &hosts {
            rows.push(build_row(source, host, name, results, &columns));
        }
    }

    let column_widths = column_widths(&header, &rows);
    ReportTable {
        columns,
        header,
        rows,
        column_widths,
    }
}
