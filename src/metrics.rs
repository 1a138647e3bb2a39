use strum::{EnumIter, IntoEnumIterator};

use crate::units::UnitSpec;

/// Label whose distinct values split disk usage into one column group each.
pub const MOUNTPOINT_LABEL: &str = "mountpoint";

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, EnumIter)]
pub enum MetricKind {
    CpuUsage,
    MemoryUsage,
    NetworkUsage,
    DiskUsage,
}

impl MetricKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            MetricKind::CpuUsage => "CPUUsage",
            MetricKind::MemoryUsage => "MemoryUsage",
            MetricKind::NetworkUsage => "NetworkUsage",
            MetricKind::DiskUsage => "DiskUsage",
        }
    }

    /// Column title used in report headers.
    pub fn title(&self) -> &'static str {
        match self {
            MetricKind::CpuUsage => "CPU",
            MetricKind::MemoryUsage => "Memory",
            MetricKind::NetworkUsage => "Network",
            MetricKind::DiskUsage => "Disk",
        }
    }

    pub fn unit(&self) -> UnitSpec {
        match self {
            MetricKind::CpuUsage | MetricKind::MemoryUsage | MetricKind::DiskUsage => {
                UnitSpec::PERCENT
            }
            MetricKind::NetworkUsage => UnitSpec::MEBIBYTES_PER_SEC,
        }
    }

    /// Label that fans this metric out into one column group per value.
    pub fn dimension_label(&self) -> Option<&'static str> {
        match self {
            MetricKind::DiskUsage => Some(MOUNTPOINT_LABEL),
            _ => None,
        }
    }

    /// PromQL range expression; `window` is the rate range (e.g. `5m`).
    pub fn query(&self, window: &str) -> String {
        match self {
            MetricKind::CpuUsage => format!(
                "1 - avg by (instance,name) (irate(node_cpu_seconds_total{{mode='idle'}}[{window}]))"
            ),
            MetricKind::MemoryUsage => {
                "1 - (node_memory_MemAvailable_bytes / node_memory_MemTotal_bytes)".to_string()
            }
            MetricKind::DiskUsage => concat!(
                "1 - (node_filesystem_free_bytes{fstype=~\"ext[.]?|xfs\",mountpoint=~\"^/$|^/data$\", mountpoint!=\"\"}",
                " / node_filesystem_size_bytes{fstype=~\"ext[.]?|xfs\",mountpoint=~\"^/$|^/data$\", mountpoint!=\"\"})"
            )
            .to_string(),
            MetricKind::NetworkUsage => format!(
                "sum(rate(node_network_receive_bytes_total[{window}]) + rate(node_network_transmit_bytes_total[{window}])) by (instance,name)"
            ),
        }
    }

    pub fn all() -> impl Iterator<Item = MetricKind> {
        MetricKind::iter()
    }

    /// Kinds rendered as one fixed column group each, in header order.
    pub fn fixed() -> impl Iterator<Item = MetricKind> {
        MetricKind::iter().filter(|kind| kind.dimension_label().is_none())
    }

    /// Kinds whose column groups depend on discovered label values.
    pub fn dynamic() -> impl Iterator<Item = MetricKind> {
        MetricKind::iter().filter(|kind| kind.dimension_label().is_some())
    }
}
