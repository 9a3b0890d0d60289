use ratesync::{
    CurrentView, Locator, ResumeWindow, Row, SqlValue, SyncConfig, SyncError, SyncOutcome,
    TimeSeriesBatch,
};
use ratesync_mock::MockStore;

use crate::helpers::{date, fx, synchronizer, treasury, treasury_store, treasury_with_view};

/// Fetcher serving the treasury fixture clipped to the requested window.
fn windowed(calls: &mut Vec<ResumeWindow>) -> impl FnMut(&ResumeWindow) -> Result<TimeSeriesBatch, SyncError> + '_ {
    move |window: &ResumeWindow| {
        calls.push(*window);
        Ok(treasury::batch().filter(|d, _| window.contains(d)))
    }
}

#[test]
fn wide_table_without_view_is_bulk_inserted() {
    let mut calls = Vec::new();
    let mut sync = synchronizer(MockStore::new(), treasury::config());
    let report = sync.sync(&mut windowed(&mut calls)).unwrap();

    assert_eq!(calls.len(), 1);
    assert_eq!(report.window.resolved_start, date(2020, 6, 1));
    assert_eq!(report.fetched_rows, 7);
    assert!(matches!(report.outcome, SyncOutcome::Wide(_)));
    assert_eq!(report.rows_written(), 5);
    assert_eq!(report.rows_excluded(), 2);
    assert_eq!(report.failures(), 0);
    assert!(report.warnings.is_empty());
}

#[test]
fn wide_table_with_view_is_reconciled() {
    let mut calls = Vec::new();
    let mut sync = synchronizer(treasury_store(), treasury_with_view());
    let report = sync.sync(&mut windowed(&mut calls)).unwrap();

    assert_eq!(calls.len(), 1);
    assert!(matches!(report.outcome, SyncOutcome::Reconciled(_)));
    assert_eq!(report.rows_written(), 2);
    assert_eq!(report.cells_updated(), 4);
    assert_eq!(report.rows_excluded(), 1);
}

#[test]
fn append_refetches_from_the_resume_point() {
    let cfg = SyncConfig {
        append: true,
        ..treasury_with_view()
    };
    let mut calls = Vec::new();
    let mut sync = synchronizer(treasury_store(), cfg);
    let report = sync.sync(&mut windowed(&mut calls)).unwrap();

    assert_eq!(calls.len(), 2);
    assert_eq!(calls[0].resolved_start, date(2020, 6, 1));
    assert_eq!(calls[1].resolved_start, date(2020, 6, 16));
    assert!(report.window.is_resumed());
    assert_eq!(report.fetched_rows, 3);

    let SyncOutcome::Reconciled(outcome) = &report.outcome else {
        panic!("expected a reconcile, got {:?}", report.outcome);
    };
    assert_eq!(outcome.old_rows, 0);
    assert_eq!(outcome.updates.aggregate(), -1);
    assert_eq!(report.rows_written(), 2);
    assert!(sync.store().updates().is_empty());
}

/// Treasury config whose current view is an extent procedure, not a snapshot.
fn extent_procedure(append: bool) -> (MockStore, SyncConfig) {
    let store = MockStore::new().with_procedure(
        "sp_treasury_extent",
        vec![Row::named([
            ("max_date", SqlValue::Date(date(2020, 6, 15))),
            ("frequency", SqlValue::Text("daily".into())),
        ])],
    );
    let cfg = SyncConfig {
        append,
        current_view: Some(CurrentView::Procedure {
            name: "sp_treasury_extent".to_string(),
            args: Vec::new(),
            location: Some(Locator::Column("max_date".to_string())),
        }),
        ..treasury::config()
    };
    (store, cfg)
}

#[test]
fn extent_procedure_view_resumes_and_inserts_new_rows() {
    let (store, cfg) = extent_procedure(true);
    let mut calls = Vec::new();
    let mut sync = synchronizer(store, cfg);
    let report = sync.sync(&mut windowed(&mut calls)).unwrap();

    assert_eq!(calls.len(), 2);
    assert_eq!(calls[1].resolved_start, date(2020, 6, 16));
    let SyncOutcome::Reconciled(outcome) = &report.outcome else {
        panic!("expected a reconcile, got {:?}", report.outcome);
    };
    assert_eq!(outcome.max_date, date(2020, 6, 15));
    assert_eq!(outcome.old_rows, 0);
    assert_eq!(report.rows_written(), 2);
    assert_eq!(report.rows_excluded(), 1);
    assert!(report.warnings.is_empty());

    let executed = sync.store().executed();
    assert_eq!(executed.len(), 1);
    assert!(executed[0].contains("'2020-06-19'"));
    assert!(sync.store().updates().is_empty());
}

#[test]
fn extent_procedure_view_leaves_old_rows_untouched() {
    let (store, cfg) = extent_procedure(false);
    let mut calls = Vec::new();
    let mut sync = synchronizer(store, cfg);
    let report = sync.sync(&mut windowed(&mut calls)).unwrap();

    let SyncOutcome::Reconciled(outcome) = &report.outcome else {
        panic!("expected a reconcile, got {:?}", report.outcome);
    };
    assert_eq!(outcome.old_rows, 4);
    assert_eq!(outcome.updates.rows_considered, 4);
    assert_eq!(outcome.updates.attempted, 0);
    assert_eq!(outcome.updates.skipped, 3);
    assert_eq!(report.rows_written(), 2);
    assert_eq!(report.cells_updated(), 0);
    assert_eq!(
        report.warnings,
        vec![
            "current view 'sp_treasury_extent' carries no 'DATE' column; gap-fill skipped for 4 rows"
                .to_string()
        ]
    );
    assert!(sync.store().updates().is_empty());
    assert_eq!(sync.store().executed().len(), 1);
}

#[test]
fn placeholder_start_fetches_after_persisted_max() {
    let store = MockStore::new().with_query(
        "SELECT MAX(DATE)",
        treasury::max_date(date(2020, 6, 15)),
    );
    let cfg = SyncConfig {
        start_date: Some("2099-01-01".to_string()),
        ..treasury::config()
    };
    let mut calls = Vec::new();
    let mut sync = synchronizer(store, cfg);
    let report = sync.sync(&mut windowed(&mut calls)).unwrap();

    assert_eq!(calls.len(), 1);
    assert_eq!(calls[0].resolved_start, date(2020, 6, 16));
    assert_eq!(report.fetched_rows, 3);
    assert_eq!(report.rows_written(), 2);
}

#[test]
fn vertical_table_is_written_in_batches() {
    let mut sync = synchronizer(MockStore::new(), fx::config());
    let mut fetcher = |_: &ResumeWindow| Ok::<_, SyncError>(fx::batch());
    let report = sync.sync(&mut fetcher).unwrap();

    assert!(matches!(report.outcome, SyncOutcome::Vertical(_)));
    assert_eq!(report.rows_written(), 8);
    assert_eq!(report.rows_excluded(), 1);
    assert_eq!(sync.store().batches().len(), 1);
}

#[test]
fn empty_fetch_warns_and_writes_nothing() {
    let mut sync = synchronizer(MockStore::new(), treasury::config());
    let mut fetcher =
        |_: &ResumeWindow| TimeSeriesBatch::new(treasury::SERIES);
    let report = sync.sync(&mut fetcher).unwrap();

    assert!(matches!(report.outcome, SyncOutcome::Empty));
    assert_eq!(report.rows_written(), 0);
    assert_eq!(report.warnings, vec!["zero rows written: fetch returned no data".to_string()]);
    assert!(sync.store().log().is_empty());
}

#[test]
fn fully_excluded_batch_warns() {
    let mut sync = synchronizer(MockStore::new(), treasury::config());
    let mut fetcher = |_: &ResumeWindow| {
        TimeSeriesBatch::with_rows(
            treasury::SERIES,
            [(date(2020, 6, 12), vec![None, None, None])],
        )
    };
    let report = sync.sync(&mut fetcher).unwrap();

    assert_eq!(report.rows_written(), 0);
    assert!(report.warnings.iter().any(|w| w.starts_with("zero rows written")));
}

#[test]
fn missing_start_date_is_configuration_error() {
    let cfg = SyncConfig {
        start_date: None,
        ..treasury::config()
    };
    let mut sync = synchronizer(MockStore::new(), cfg);
    let mut fetcher = |_: &ResumeWindow| Ok::<_, SyncError>(treasury::batch());
    let err = sync.sync(&mut fetcher).unwrap_err();
    assert!(err.is_structural());
}

#[test]
fn fetch_error_aborts_the_run() {
    let mut sync = synchronizer(MockStore::new(), treasury::config());
    let mut fetcher =
        |_: &ResumeWindow| Err::<TimeSeriesBatch, _>(SyncError::data("source unavailable"));
    let err = sync.sync(&mut fetcher).unwrap_err();
    assert_eq!(err, SyncError::data("source unavailable"));
    assert!(sync.store().log().is_empty());
}
