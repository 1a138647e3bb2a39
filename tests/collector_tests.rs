mod common;

use chrono::{TimeZone, Utc};
use promreport::collector::collect;
use promreport::config::Config;
use promreport::{build_report, MetricKind, QueryResult, ReportType};

fn config_for(urls: &[(&str, &str)]) -> Config {
    let mut yaml = String::from("query_timeout_secs: 5\nprometheus:\n");
    for (name, url) in urls {
        yaml.push_str(&format!("  {name}:\n    url: {url}\n"));
    }
    Config::from_yaml(&yaml).unwrap()
}

#[test]
fn collects_every_metric_and_skips_failed_sources() {
    let url = common::serve(common::node_exporter_handler());
    let config = config_for(&[("prod", url.as_str()), ("broken", "http://127.0.0.1:1")]);
    let end = Utc.with_ymd_and_hms(2026, 10, 19, 12, 0, 0).unwrap();
    let window = ReportType::Daily.window(end).unwrap();

    let store = collect(&config, &window);

    assert!(matches!(
        store.get("prod", MetricKind::CpuUsage),
        Some(QueryResult::Matrix(streams)) if streams.len() == 1
    ));
    assert_eq!(
        store.get("prod", MetricKind::MemoryUsage),
        Some(&QueryResult::Unsupported("vector".to_string()))
    );
    for metric in MetricKind::all() {
        assert!(store.get("broken", metric).is_none());
    }
}

#[test]
fn partial_store_still_produces_a_full_report() {
    let url = common::serve(common::node_exporter_handler());
    let config = config_for(&[("prod", url.as_str()), ("broken", "http://127.0.0.1:1")]);
    let window = ReportType::Hourly.window(Utc::now()).unwrap();

    let table = build_report(&collect(&config, &window));

    assert_eq!(table.width(), 3 + 3 * 3 + 2 * 3);
    assert_eq!(table.rows.len(), 2);

    let alpha = &table.rows[0];
    assert_eq!((alpha.host.as_str(), alpha.name.as_str()), ("a:9100", "alpha"));
    assert_eq!(&alpha.values[0..3], ["50.00%", "10.00%", "30.00%"]);
    // memory came back as a vector and is zero-filled
    assert_eq!(&alpha.values[3..6], ["0.00%", "0.00%", "0.00%"]);
    assert_eq!(&alpha.values[6..9], ["1.00", "1.00", "1.00"]);
    assert_eq!(&alpha.values[9..12], ["25.00%", "25.00%", "25.00%"]);
    assert_eq!(&alpha.values[12..15], ["0.00%", "0.00%", "0.00%"]);

    let beta = &table.rows[1];
    assert_eq!(beta.name, "beta");
    assert_eq!(&beta.values[0..3], ["0.00%", "0.00%", "0.00%"]);
    assert_eq!(&beta.values[6..9], ["2.00", "1.00", "1.50"]);
    assert_eq!(&beta.values[12..15], ["70.00%", "50.00%", "60.00%"]);
}
