use std::collections::BTreeSet;

use crate::metrics::MetricKind;
use crate::store::SeriesStore;

/// Distinct values of `label` across every stream of every source, sorted.
pub fn discover_dimensions(store: &SeriesStore, label: &str) -> Vec<String> {
    let values: BTreeSet<&str> = store
        .all_streams()
        .filter_map(|stream| stream.label(label))
        .collect();
    values.into_iter().map(str::to_string).collect()
}

/// Discovered values for each dynamic metric kind, in kind order.
pub fn discover_all(store: &SeriesStore) -> Vec<(MetricKind, Vec<String>)> {
    MetricKind::dynamic()
        .filter_map(|kind| {
            let label = kind.dimension_label()?;
            Some((kind, discover_dimensions(store, label)))
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::metrics::MOUNTPOINT_LABEL;
    use crate::store::{QueryResult, SampleStream, INSTANCE_LABEL};

    fn labeled(mount: Option<&str>) -> SampleStream {
        let mut labels = vec![(INSTANCE_LABEL, "a:9100")];
        if let Some(mount) = mount {
            labels.push((MOUNTPOINT_LABEL, mount));
        }
        SampleStream::new(labels, Vec::new())
    }

    #[test]
    fn collects_mountpoints_across_sources_and_metrics() {
        let mut store = SeriesStore::new();
        store.insert(
            "prod",
            MetricKind::DiskUsage,
            QueryResult::Matrix(vec![labeled(Some("/data")), labeled(Some("/"))]),
        );
        store.insert(
            "staging",
            MetricKind::DiskUsage,
            QueryResult::Matrix(vec![labeled(Some("/")), labeled(Some(""))]),
        );
        store.insert(
            "staging",
            MetricKind::CpuUsage,
            QueryResult::Matrix(vec![labeled(Some("/srv")), labeled(None)]),
        );

        assert_eq!(
            discover_dimensions(&store, MOUNTPOINT_LABEL),
            vec!["/", "/data", "/srv"]
        );
    }

    #[test]
    fn no_labels_means_no_dynamic_columns() {
        let mut store = SeriesStore::new();
        store.insert(
            "prod",
            MetricKind::CpuUsage,
            QueryResult::Matrix(vec![labeled(None)]),
        );
        assert!(discover_dimensions(&store, MOUNTPOINT_LABEL).is_empty());
        assert_eq!(discover_all(&store), vec![(MetricKind::DiskUsage, Vec::new())]);
    }
}
