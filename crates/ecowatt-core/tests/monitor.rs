//! Data monitor against a live mock backend.

mod common;

use std::sync::atomic::Ordering;
use std::time::Duration;

use ecowatt_core::error::{ApiError, CoreError, PageError, ValidationError};
use ecowatt_core::panels::{DataMonitor, QueryMode};
use ecowatt_core::protocol::query::RangeQuery;
use ecowatt_core::types::RecordData;
use ecowatt_core::CloudClient;

use common::Backend;

async fn monitor(total: u64) -> (DataMonitor, std::sync::Arc<Backend>) {
    let backend = Backend::with_records(total);
    let url = common::spawn(backend.clone()).await;
    let monitor = DataMonitor::new(common::client(&url), 20).unwrap();
    (monitor, backend)
}

fn ids(monitor: &DataMonitor) -> Vec<u64> {
    monitor.records().iter().map(|r| r.id).collect()
}

#[tokio::test]
async fn test_latest_batches_walk_history() {
    let (mut monitor, backend) = monitor(45).await;

    let view = monitor.fetch_latest(1).await.unwrap();
    assert_eq!(view.total_count, 45);
    assert_eq!(view.total_pages, 3);
    assert_eq!(ids(&monitor), (26..=45).rev().collect::<Vec<_>>());
    assert_eq!(
        monitor.message().unwrap().text,
        "Showing records 26 to 45 of 45"
    );
    let query = backend.last_record_query();
    assert_eq!(query.get("start_id").map(String::as_str), Some("26"));
    assert_eq!(query.get("end_id").map(String::as_str), Some("45"));

    monitor.older().await.unwrap();
    assert_eq!(monitor.current_page(), 2);
    assert_eq!(ids(&monitor), (6..=25).rev().collect::<Vec<_>>());

    monitor.older().await.unwrap();
    assert_eq!(monitor.current_page(), 3);
    assert_eq!(ids(&monitor), vec![5, 4, 3, 2, 1]);

    let fetches = backend.record_fetches();
    let err = monitor.older().await.unwrap_err();
    assert!(matches!(
        err,
        CoreError::Page(PageError::BeyondHistory { batch: 4, total: 45 })
    ));
    assert_eq!(backend.record_fetches(), fetches);
    assert_eq!(monitor.current_page(), 3);
    assert_eq!(monitor.records().len(), 5);
    assert!(monitor.message().unwrap().is_error());

    monitor.newer().await.unwrap();
    monitor.newer().await.unwrap();
    assert_eq!(monitor.current_page(), 1);
    assert!(matches!(
        monitor.newer().await,
        Err(CoreError::Page(PageError::AlreadyNewest))
    ));
}

#[tokio::test]
async fn test_latest_loads_register_snapshot() {
    let (mut monitor, _backend) = monitor(3).await;
    monitor.fetch_latest(1).await.unwrap();

    let registers = monitor.registers();
    assert_eq!(registers.populated(), 2);
    assert_eq!(registers.get(0).unwrap().value, Some(230.5));
    assert_eq!(registers.get(4).unwrap().value, Some(12.0));
    assert!(!registers.get(9).unwrap().is_populated());

    let first = &monitor.records()[0];
    assert_eq!(first.id, 3);
    assert_eq!(first.data, RecordData::Samples(vec![3.0, -1.0]));
}

#[tokio::test]
async fn test_empty_history_skips_record_fetch() {
    let (mut monitor, backend) = monitor(0).await;

    let view = monitor.fetch_latest(1).await.unwrap();
    assert!(view.records.is_empty());
    assert!(view.window.is_none());
    assert_eq!(backend.record_fetches(), 0);
    assert_eq!(backend.count_fetches.load(Ordering::SeqCst), 1);
    assert_eq!(monitor.message().unwrap().text, "No records available");
}

#[tokio::test]
async fn test_batch_beyond_history_keeps_state() {
    let (mut monitor, backend) = monitor(45).await;
    monitor.fetch_latest(1).await.unwrap();
    let before = ids(&monitor);
    let fetches = backend.record_fetches();

    let err = monitor.fetch_latest(5).await.unwrap_err();
    assert!(matches!(
        err,
        CoreError::Page(PageError::BeyondHistory { batch: 5, total: 45 })
    ));
    assert_eq!(backend.record_fetches(), fetches);
    assert_eq!(ids(&monitor), before);
    assert_eq!(monitor.current_page(), 1);
}

#[tokio::test]
async fn test_zero_batch_is_rejected_before_any_request() {
    let (mut monitor, backend) = monitor(45).await;
    assert!(matches!(
        monitor.fetch_latest(0).await,
        Err(CoreError::Page(PageError::ZeroPage))
    ));
    assert_eq!(backend.count_fetches.load(Ordering::SeqCst), 0);
}

#[tokio::test]
async fn test_single_id_range() {
    let (mut monitor, _backend) = monitor(45).await;
    let view = monitor
        .fetch_range(RangeQuery::new().ids(Some(5), Some(5)), 1)
        .await
        .unwrap();
    assert_eq!(view.total_count, 1);
    assert_eq!(ids(&monitor), vec![5]);
    assert!(matches!(monitor.mode(), QueryMode::Range(_)));
    assert_eq!(monitor.message().unwrap().text, "Retrieved 1 of 1 records");
}

#[tokio::test]
async fn test_single_id_range_missing_record() {
    let (mut monitor, backend) = monitor(3).await;
    let view = monitor
        .fetch_range(RangeQuery::new().ids(Some(5), Some(5)), 1)
        .await
        .unwrap();
    assert_eq!(view.total_count, 0);
    assert!(view.records.is_empty());
    assert!(monitor.records().is_empty());
    assert_eq!(backend.record_fetches(), 1);
    assert_eq!(monitor.message().unwrap().text, "Retrieved 0 of 0 records");
}

#[tokio::test]
async fn test_open_loads_newest_batch() {
    let backend = Backend::with_records(45);
    let url = common::spawn(backend.clone()).await;
    let monitor = DataMonitor::open(common::client(&url), 20).await.unwrap();

    assert_eq!(monitor.current_page(), 1);
    let window = monitor.window().unwrap();
    assert_eq!((window.start_id, window.end_id), (26, 45));
    assert_eq!(monitor.records().len(), 20);
    assert_eq!(monitor.registers().populated(), 2);
    assert_eq!(
        monitor.message().unwrap().text,
        "Showing records 26 to 45 of 45"
    );
}

#[tokio::test]
async fn test_open_tolerates_unreachable_backend() {
    let client = CloudClient::new("http://127.0.0.1:9", Duration::from_millis(500)).unwrap();
    let monitor = DataMonitor::open(client, 20).await.unwrap();

    assert_eq!(monitor.current_page(), 0);
    assert!(monitor.records().is_empty());
    assert!(monitor.window().is_none());
    assert!(monitor.message().unwrap().is_error());
}

#[tokio::test]
async fn test_open_rejects_zero_page_size() {
    let client = CloudClient::new("http://127.0.0.1:9", Duration::from_millis(500)).unwrap();
    assert!(matches!(
        DataMonitor::open(client, 0).await,
        Err(PageError::ZeroPageSize)
    ));
}

#[tokio::test]
async fn test_goto_follows_active_mode() {
    let (mut monitor, backend) = monitor(45).await;

    monitor.goto(2).await.unwrap();
    assert_eq!(monitor.mode(), &QueryMode::Latest);
    assert_eq!(ids(&monitor), (6..=25).rev().collect::<Vec<_>>());

    monitor
        .fetch_range(RangeQuery::new().ids(Some(1), Some(45)), 1)
        .await
        .unwrap();
    monitor.goto(3).await.unwrap();
    assert!(matches!(monitor.mode(), QueryMode::Range(_)));
    assert_eq!(ids(&monitor), vec![41, 42, 43, 44, 45]);
    assert_eq!(
        backend.last_record_query().get("offset").map(String::as_str),
        Some("40")
    );
}

#[tokio::test]
async fn test_range_pages_use_limit_and_offset() {
    let (mut monitor, backend) = monitor(45).await;
    let query = RangeQuery::new().ids(Some(1), Some(45));

    monitor.fetch_range(query, 3).await.unwrap();
    assert_eq!(ids(&monitor), vec![41, 42, 43, 44, 45]);
    let params = backend.last_record_query();
    assert_eq!(params.get("limit").map(String::as_str), Some("20"));
    assert_eq!(params.get("offset").map(String::as_str), Some("40"));

    monitor.prev_page().await.unwrap();
    assert_eq!(monitor.current_page(), 2);
    assert_eq!(monitor.records().first().map(|r| r.id), Some(21));

    monitor.next_page().await.unwrap();
    let fetches = backend.record_fetches();
    assert!(matches!(
        monitor.next_page().await,
        Err(CoreError::Page(PageError::BeyondHistory { .. }))
    ));
    assert_eq!(backend.record_fetches(), fetches);
}

#[tokio::test]
async fn test_time_range_is_sent_normalised() {
    let (mut monitor, backend) = monitor(45).await;
    let query = RangeQuery::new()
        .times(Some("2025-10-18T10:00:10"), Some("2025-10-18 10:00"))
        .unwrap();
    // End bound without seconds means 10:00:00, before the start.
    assert!(matches!(
        monitor.fetch_range(query, 1).await,
        Err(CoreError::Validation(ValidationError::InvertedTimeRange { .. }))
    ));
    assert_eq!(backend.record_fetches(), 0);

    let query = RangeQuery::new()
        .times(Some("2025-10-18T10:00:10"), Some("2025-10-18T10:00:20"))
        .unwrap();
    let view = monitor.fetch_range(query, 1).await.unwrap();
    assert_eq!(view.total_count, 11);
    assert_eq!(
        backend.last_record_query().get("end_time").map(String::as_str),
        Some("2025-10-18T10:00:20")
    );
}

#[tokio::test]
async fn test_range_results_replace_latest_list() {
    let (mut monitor, _backend) = monitor(45).await;
    monitor.fetch_latest(1).await.unwrap();
    assert_eq!(monitor.records().len(), 20);

    monitor
        .fetch_range(RangeQuery::new().ids(Some(1), Some(3)), 1)
        .await
        .unwrap();
    assert_eq!(ids(&monitor), vec![1, 2, 3]);
    assert!(monitor.window().is_none());

    assert!(matches!(
        monitor.older().await,
        Err(CoreError::Page(PageError::NoActiveQuery))
    ));
}

#[tokio::test]
async fn test_unreachable_backend() {
    let client = CloudClient::new("http://127.0.0.1:9", Duration::from_millis(500)).unwrap();
    let mut monitor = DataMonitor::new(client, 20).unwrap();
    let err = monitor.fetch_latest(1).await.unwrap_err();
    assert!(matches!(err, CoreError::Api(ApiError::NotReachable { .. })));
    assert!(monitor.records().is_empty());
    assert!(monitor.message().unwrap().is_error());
}
