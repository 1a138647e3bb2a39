use std::time::Duration;

use chrono::{DateTime, Datelike, TimeZone, Utc};

const SECONDS_PER_MINUTE: u64 = 60;
const SECONDS_PER_HOUR: u64 = 60 * SECONDS_PER_MINUTE;
const SECONDS_PER_DAY: u64 = 24 * SECONDS_PER_HOUR;

#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    clap::ValueEnum,
    strum::Display,
    strum::EnumString,
)]
#[strum(serialize_all = "lowercase")]
pub enum ReportType {
    Hourly,
    Daily,
    Weekly,
    Monthly,
    Quarterly,
}

/// Query range for one report run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReportWindow {
    pub start: DateTime<Utc>,
    pub end: DateTime<Utc>,
    pub step: Duration,
    /// PromQL range selector used inside `rate`/`irate`.
    pub window: &'static str,
}

#[derive(Debug, thiserror::Error)]
pub enum TimeframeError {
    #[error("cannot build start date {year}-{month:02}-01")]
    InvalidStart { year: i32, month: u32 },
}

fn first_of_month(year: i32, month: u32) -> Result<DateTime<Utc>, TimeframeError> {
    Utc.with_ymd_and_hms(year, month, 1, 0, 0, 0)
        .single()
        .ok_or(TimeframeError::InvalidStart { year, month })
}

fn previous_month(year: i32, month: u32) -> (i32, u32) {
    if month == 1 {
        (year - 1, 12)
    } else {
        (year, month - 1)
    }
}

fn previous_quarter(year: i32, month: u32) -> (i32, u32) {
    let quarter_start = ((month - 1) / 3) * 3 + 1;
    if quarter_start == 1 {
        (year - 1, 10)
    } else {
        (year, quarter_start - 3)
    }
}

impl ReportType {
    pub fn window(&self, end: DateTime<Utc>) -> Result<ReportWindow, TimeframeError> {
        let (start, step_secs, window) = match self {
            ReportType::Hourly => (end - chrono::Duration::hours(1), 30, "30s"),
            ReportType::Daily => (
                end - chrono::Duration::hours(24),
                5 * SECONDS_PER_MINUTE,
                "5m",
            ),
            ReportType::Weekly => (end - chrono::Duration::days(7), SECONDS_PER_HOUR, "1h"),
            ReportType::Monthly => {
                let (year, month) = previous_month(end.year(), end.month());
                (first_of_month(year, month)?, SECONDS_PER_DAY, "1d")
            }
            ReportType::Quarterly => {
                let (year, month) = previous_quarter(end.year(), end.month());
                (first_of_month(year, month)?, 7 * SECONDS_PER_DAY, "1w")
            }
        };
        Ok(ReportWindow {
            start,
            end,
            step: Duration::from_secs(step_secs),
            window,
        })
    }
}
