//! Unit conversion and formatting for reduced metric values

use crate::aggregate::Aggregate;

const BYTES_PER_MEBIBYTE: f64 = 1024.0 * 1024.0;

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Scale {
    Identity,
    Multiply(f64),
    Divide(f64),
}

impl Scale {
    pub fn apply(&self, value: f64) -> f64 {
        match self {
            Scale::Identity => value,
            Scale::Multiply(factor) => value * factor,
            Scale::Divide(divisor) => value / divisor,
        }
    }
}

/// How a metric's reduced values are scaled and rendered.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct UnitSpec {
    pub scale: Scale,
    /// Appended to each formatted cell.
    pub suffix: &'static str,
    /// Shown in parentheses in column headers; empty for none.
    pub header_unit: &'static str,
}

impl UnitSpec {
    /// Ratio in `[0, 1]` shown as a percentage.
    pub const PERCENT: UnitSpec = UnitSpec {
        scale: Scale::Multiply(100.0),
        suffix: "%",
        header_unit: "%",
    };

    /// Bytes per second shown as MB/s without a cell suffix.
    pub const MEBIBYTES_PER_SEC: UnitSpec = UnitSpec {
        scale: Scale::Divide(BYTES_PER_MEBIBYTE),
        suffix: "",
        header_unit: "MB/s",
    };

    pub const RAW: UnitSpec = UnitSpec {
        scale: Scale::Identity,
        suffix: "",
        header_unit: "",
    };

    pub fn format(&self, value: f64) -> String {
        let scaled = self.scale.apply(value);
        if scaled.is_nan() {
            format!("NaN{}", self.suffix)
        } else if scaled.is_infinite() {
            let sign = if scaled > 0.0 { '+' } else { '-' };
            format!("{sign}Inf{}", self.suffix)
        } else {
            format!("{:.2}{}", scaled, self.suffix)
        }
    }

    /// Header text for one statistic, e.g. `CPU Max (%)`.
    pub fn header(&self, title: &str, stat: &str) -> String {
        if self.header_unit.is_empty() {
            format!("{title} {stat}")
        } else {
            format!("{title} {stat} ({})", self.header_unit)
        }
    }
}

/// Display strings for one reduced series.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NormalizedAggregate {
    pub max: String,
    pub min: String,
    pub avg: String,
}

impl NormalizedAggregate {
    pub fn into_cells(self) -> [String; 3] {
        [self.max, self.min, self.avg]
    }
}

pub fn normalize(unit: &UnitSpec, aggregate: &Aggregate) -> NormalizedAggregate {
    NormalizedAggregate {
        max: unit.format(aggregate.max),
        min: unit.format(aggregate.min),
        avg: unit.format(aggregate.avg),
    }
}
