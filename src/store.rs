//! In-memory holder for range-query results, keyed by source and metric.

use std::collections::BTreeMap;

use crate::metrics::MetricKind;

/// Label carrying the scraped host address.
pub const INSTANCE_LABEL: &str = "instance";
/// Label carrying the human readable host name.
pub const NAME_LABEL: &str = "name";

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Point {
    pub ts: f64,
    pub value: f64,
}

/// One labeled time series from a range query.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct SampleStream {
    pub labels: BTreeMap<String, String>,
    pub points: Vec<Point>,
}

impl SampleStream {
    pub fn new<I, K, V>(labels: I, points: Vec<Point>) -> Self
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<String>,
        V: Into<String>,
    {
        SampleStream {
            labels: labels
                .into_iter()
                .map(|(k, v)| (k.into(), v.into()))
                .collect(),
            points,
        }
    }

    /// Returns the label value, treating an empty string as absent.
    pub fn label(&self, name: &str) -> Option<&str> {
        self.labels
            .get(name)
            .map(String::as_str)
            .filter(|value| !value.is_empty())
    }

    pub fn instance(&self) -> Option<&str> {
        self.label(INSTANCE_LABEL)
    }

    pub fn values(&self) -> impl Iterator<Item = f64> + '_ {
        self.points.iter().map(|p| p.value)
    }
}

/// The outcome of one metric query against one source.
#[derive(Debug, Clone, PartialEq)]
pub enum QueryResult {
    /// A range-vector response.
    Matrix(Vec<SampleStream>),
    /// Any other result type; carries the reported type name.
    Unsupported(String),
}

impl QueryResult {
    pub fn streams(&self) -> &[SampleStream] {
        match self {
            QueryResult::Matrix(streams) => streams,
            QueryResult::Unsupported(_) => &[],
        }
    }
}

/// Results for every source: `source -> metric -> result`.
///
/// Missing entries are legal; a failed query simply never gets inserted.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct SeriesStore {
    sources: BTreeMap<String, BTreeMap<MetricKind, QueryResult>>,
}

impl SeriesStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert<S: Into<String>>(&mut self, source: S, metric: MetricKind, result: QueryResult) {
        self.sources
            .entry(source.into())
            .or_default()
            .insert(metric, result);
    }

    pub fn get(&self, source: &str, metric: MetricKind) -> Option<&QueryResult> {
        self.sources.get(source)?.get(&metric)
    }

    pub fn sources(&self) -> impl Iterator<Item = (&str, &BTreeMap<MetricKind, QueryResult>)> {
        self.sources.iter().map(|(name, results)| (name.as_str(), results))
    }

    /// Every stream of every metric of every source.
    pub fn all_streams(&self) -> impl Iterator<Item = &SampleStream> {
        self.sources
            .values()
            .flat_map(|results| results.values())
            .flat_map(QueryResult::streams)
    }

    pub fn is_empty(&self) -> bool {
        self.sources.values().all(BTreeMap::is_empty)
    }
}
