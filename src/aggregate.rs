use crate::store::{QueryResult, SampleStream};

/// Max, min and mean over every sample of a host's matching streams.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Aggregate {
    pub max: f64,
    pub min: f64,
    pub avg: f64,
}

impl Aggregate {
    pub const ZERO: Aggregate = Aggregate {
        max: 0.0,
        min: 0.0,
        avg: 0.0,
    };
}

impl Default for Aggregate {
    fn default() -> Self {
        Aggregate::ZERO
    }
}

/// Selects the streams that contribute to one aggregate.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct StreamFilter<'a> {
    pub host: &'a str,
    /// `(label, value)` the stream must also carry.
    pub dimension: Option<(&'a str, &'a str)>,
}

impl<'a> StreamFilter<'a> {
    pub fn host(host: &'a str) -> Self {
        StreamFilter {
            host,
            dimension: None,
        }
    }

    pub fn with_dimension(mut self, label: &'a str, value: &'a str) -> Self {
        self.dimension = Some((label, value));
        self
    }

    pub fn matches(&self, stream: &SampleStream) -> bool {
        if stream.instance() != Some(self.host) {
            return false;
        }
        match self.dimension {
            Some((label, value)) => stream.label(label) == Some(value),
            None => true,
        }
    }
}

#[derive(Default)]
struct Accumulator {
    max: f64,
    min: f64,
    sum: f64,
    count: u64,
}

impl Accumulator {
    // First value seeds both extremes.
    fn record(&mut self, value: f64) {
        if self.count == 0 || value > self.max {
            self.max = value;
        }
        if self.count == 0 || value < self.min {
            self.min = value;
        }
        self.sum += value;
        self.count += 1;
    }

    fn finish(&self) -> Aggregate {
        if self.count == 0 {
            return Aggregate::ZERO;
        }
        Aggregate {
            max: self.max,
            min: self.min,
            avg: self.sum / self.count as f64,
        }
    }
}

/// Reduces all samples of the streams selected by `filter`.
///
/// Absent results, non-matrix results and filters matching nothing all
/// reduce to [`Aggregate::ZERO`].
pub fn reduce(result: Option<&QueryResult>, filter: &StreamFilter<'_>) -> Aggregate {
    let Some(QueryResult::Matrix(streams)) = result else {
        return Aggregate::ZERO;
    };

    let mut acc = Accumulator::default();
    for stream in streams.iter().filter(|s| filter.matches(s)) {
        for value in stream.values() {
            acc.record(value);
        }
    }
    acc.finish()
}
