use std::thread::{self, ScopedJoinHandle};

use log::{error, info, warn};

use crate::client::{ClientError, PrometheusClient};
use crate::config::Config;
use crate::metrics::MetricKind;
use crate::store::{QueryResult, SeriesStore};
use crate::timeframe::ReportWindow;

struct Fetched {
    source: String,
    metric: MetricKind,
    result: Result<QueryResult, ClientError>,
}

/// Joins a query thread; a panic is logged against `what` and yields `None`.
fn join_logged<T>(handle: ScopedJoinHandle<'_, T>, what: &str) -> Option<T> {
    match handle.join() {
        Ok(value) => Some(value),
        Err(_) => {
            error!("Query thread for {what} panicked");
            None
        }
    }
}

fn fetch_source(
    client: &PrometheusClient,
    source: &str,
    window: &ReportWindow,
) -> Vec<Fetched> {
    thread::scope(|scope| {
        let handles: Vec<_> = MetricKind::all()
            .map(|metric| {
                let query = metric.query(window.window);
                let handle = scope.spawn(move || client.query_range(&query, window));
                (metric, handle)
            })
            .collect();

        handles
            .into_iter()
            .filter_map(|(metric, handle)| {
                let result = join_logged(handle, &format!("{} at {source}", metric.as_str()))?;
                Some(Fetched {
                    source: source.to_string(),
                    metric,
                    result,
                })
            })
            .collect()
    })
}

/// Runs every metric query against every configured source in parallel.
///
/// Failed queries are logged and left out of the store.
pub fn collect(config: &Config, window: &ReportWindow) -> SeriesStore {
    let timeout = config.query_timeout();
    let fetched: Vec<Fetched> = thread::scope(|scope| {
        let handles: Vec<_> = config
            .prometheus
            .iter()
            .filter_map(|(source, instance)| {
                match PrometheusClient::new(&instance.url, timeout) {
                    Ok(client) => Some((
                        source,
                        scope.spawn(move || fetch_source(&client, source, window)),
                    )),
                    Err(err) => {
                        error!(
                            "Error creating Prometheus client for {source} ({}): {err}",
                            instance.url
                        );
                        None
                    }
                }
            })
            .collect();

        handles
            .into_iter()
            .filter_map(|(source, handle)| join_logged(handle, source))
            .flatten()
            .collect()
    });

    let mut store = SeriesStore::new();
    for Fetched {
        source,
        metric,
        result,
    } in fetched
    {
        let url = &config.prometheus[&source].url;
        match result {
            Ok(result) => {
                if let QueryResult::Unsupported(kind) = &result {
                    warn!(
                        "Query {} at {source} ({url}) returned {kind}, expected matrix",
                        metric.as_str()
                    );
                }
                store.insert(source, metric, result);
            }
            Err(err) => error!(
                "Error querying Prometheus for {} at {source} ({url}): {err}",
                metric.as_str()
            ),
        }
    }
    info!(
        "Collected {} series from {} source(s)",
        store.all_streams().count(),
        config.prometheus.len()
    );
    store
}
