//! End-to-end search flows through `Session` against a mock provider.

mod support;

use std::{sync::Arc, time::Duration};

use cityweather_core::{
    Action, Aggregator, AirQuality, FetchError, RecentCityStore, Session, UnitSystem,
};
use support::{current_body, forecast_body, mount_success, provider};
use tempfile::TempDir;
use wiremock::{
    Mock, MockServer, ResponseTemplate,
    matchers::{method, path, query_param},
};

fn session(server: &MockServer, dir: &TempDir, units: UnitSystem) -> Session {
    let aggregator = Aggregator::with_default_timeout(Arc::new(provider(server)));
    let recent = RecentCityStore::open(dir.path().join("recent.json"));
    Session::new(aggregator, recent, units)
}

#[tokio::test]
async fn paris_metric_search_builds_snapshot_and_history() {
    let server = MockServer::start().await;
    let dir = TempDir::new().unwrap();
    mount_success(&server, "metric", 18.3, 2).await;

    let mut session = session(&server, &dir, UnitSystem::Metric);
    let state = session.dispatch(Action::Submit("  Paris ".into())).await;

    assert_eq!(state.error, None);
    assert!(!state.loading);
    let report = state.report.as_ref().expect("search should succeed");
    assert_eq!(report.snapshot.units, UnitSystem::Metric);
    assert_eq!(report.snapshot.rounded_temperature(), 18);
    assert_eq!(report.snapshot.humidity_pct, 60);
    assert_eq!(report.snapshot.air_quality, Some(AirQuality::Fair));
    assert_eq!(report.forecast.len(), 40);
    assert_eq!(state.history, vec!["Paris".to_string()]);

    // persisted for the next run
    let reopened = RecentCityStore::open(dir.path().join("recent.json"));
    assert_eq!(reopened.all(), ["Paris"]);
}

#[tokio::test]
async fn not_found_leaves_no_snapshot_and_no_history() {
    let server = MockServer::start().await;
    let dir = TempDir::new().unwrap();

    Mock::given(method("GET"))
        .and(path("/weather"))
        .respond_with(ResponseTemplate::new(404).set_body_json(serde_json::json!({
            "cod": "404",
            "message": "city not found"
        })))
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/forecast"))
        .respond_with(ResponseTemplate::new(404))
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/air_pollution"))
        .respond_with(ResponseTemplate::new(200))
        .expect(0)
        .mount(&server)
        .await;

    let mut session = session(&server, &dir, UnitSystem::Metric);
    let state = session.dispatch(Action::Submit("Atlantis".into())).await;

    assert_eq!(state.error, Some(FetchError::NotFound));
    assert!(state.report.is_none());
    assert!(state.history.is_empty());
    assert!(!dir.path().join("recent.json").exists());
}

#[tokio::test]
async fn failure_after_success_clears_previous_report() {
    let server = MockServer::start().await;
    let dir = TempDir::new().unwrap();
    mount_success(&server, "metric", 18.3, 2).await;

    let mut session = session(&server, &dir, UnitSystem::Metric);
    session.dispatch(Action::Submit("Paris".into())).await;
    assert!(session.state().report.is_some());

    server.reset().await;
    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(500))
        .mount(&server)
        .await;

    let state = session.dispatch(Action::Submit("Paris".into())).await;
    assert!(matches!(state.error, Some(FetchError::ServerError { status: 500, .. })));
    assert!(state.report.is_none());
}

#[tokio::test]
async fn air_quality_failure_is_not_reported() {
    let server = MockServer::start().await;
    let dir = TempDir::new().unwrap();

    Mock::given(method("GET"))
        .and(path("/weather"))
        .respond_with(ResponseTemplate::new(200).set_body_json(current_body(18.3)))
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/forecast"))
        .respond_with(ResponseTemplate::new(200).set_body_json(forecast_body(18.3)))
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/air_pollution"))
        .respond_with(ResponseTemplate::new(500).set_body_string("boom"))
        .expect(1)
        .mount(&server)
        .await;

    let mut session = session(&server, &dir, UnitSystem::Metric);
    let state = session.dispatch(Action::Submit("Paris".into())).await;

    assert_eq!(state.error, None);
    let report = state.report.as_ref().unwrap();
    assert_eq!(report.snapshot.air_quality, None);
    assert_eq!(state.history, vec!["Paris".to_string()]);
}

#[tokio::test]
async fn switching_units_refetches_exactly_once_with_new_units() {
    let server = MockServer::start().await;
    let dir = TempDir::new().unwrap();

    for (units, temp) in [("metric", 18.3), ("imperial", 64.9)] {
        Mock::given(method("GET"))
            .and(path("/weather"))
            .and(query_param("units", units))
            .respond_with(ResponseTemplate::new(200).set_body_json(current_body(temp)))
            .expect(1)
            .mount(&server)
            .await;
        Mock::given(method("GET"))
            .and(path("/forecast"))
            .and(query_param("units", units))
            .respond_with(ResponseTemplate::new(200).set_body_json(forecast_body(temp)))
            .expect(1)
            .mount(&server)
            .await;
    }
    Mock::given(method("GET"))
        .and(path("/air_pollution"))
        .respond_with(ResponseTemplate::new(200).set_body_json(support::air_body(1)))
        .mount(&server)
        .await;

    let mut session = session(&server, &dir, UnitSystem::Metric);
    let before = session
        .dispatch(Action::Submit("Paris".into()))
        .await
        .report
        .clone()
        .unwrap();

    let state = session.dispatch(Action::SetUnits(UnitSystem::Imperial)).await;
    let after = state.report.as_ref().unwrap();

    assert_eq!(before.snapshot.units, UnitSystem::Metric);
    assert_eq!(after.snapshot.units, UnitSystem::Imperial);
    assert_ne!(before.snapshot.units, after.snapshot.units);
    assert_eq!(after.snapshot.rounded_temperature(), 65);
    assert_eq!(after.query.city(), "Paris");

    server.verify().await;
}

#[tokio::test]
async fn empty_query_makes_no_network_call() {
    let server = MockServer::start().await;
    let dir = TempDir::new().unwrap();

    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(200))
        .expect(0)
        .mount(&server)
        .await;

    let mut session = session(&server, &dir, UnitSystem::Imperial);
    let state = session.dispatch(Action::Submit("   ".into())).await;

    assert_eq!(state.error, Some(FetchError::InvalidInput));
    assert!(state.report.is_none());
    assert_eq!(server.received_requests().await.unwrap_or_default().len(), 0);
}

#[tokio::test]
async fn recent_list_supports_reselect_and_delete() {
    let server = MockServer::start().await;
    let dir = TempDir::new().unwrap();
    mount_success(&server, "metric", 18.3, 3).await;

    let mut session = session(&server, &dir, UnitSystem::Metric);
    for city in ["Paris", "Lyon", "Nice"] {
        session.dispatch(Action::Submit(city.into())).await;
    }
    assert_eq!(session.state().history, ["Nice", "Lyon", "Paris"]);

    let state = session.dispatch(Action::SelectRecent(2)).await;
    assert_eq!(state.history, ["Paris", "Nice", "Lyon"]);

    let state = session.dispatch(Action::RemoveRecent(1)).await;
    assert_eq!(state.history, ["Paris", "Lyon"]);

    let state = session.dispatch(Action::RemoveRecent(9)).await;
    assert_eq!(state.history, ["Paris", "Lyon"]);
}

#[tokio::test]
async fn compare_failure_uses_its_own_slot() {
    let server = MockServer::start().await;
    let dir = TempDir::new().unwrap();
    mount_success(&server, "metric", 18.3, 2).await;

    let mut session = session(&server, &dir, UnitSystem::Metric);
    session.dispatch(Action::Submit("Paris".into())).await;

    Mock::given(method("GET"))
        .and(path("/weather"))
        .and(query_param("q", "Nowhere"))
        .respond_with(ResponseTemplate::new(404))
        .with_priority(1)
        .mount(&server)
        .await;

    session.dispatch(Action::OpenCompare).await;
    let state = session.dispatch(Action::SubmitCompare("Nowhere".into())).await;

    assert_eq!(state.compare.error, Some(FetchError::NotFound));
    assert!(state.compare.snapshot.is_none());
    assert_eq!(state.error, None);
    assert!(state.report.is_some());
    assert_eq!(state.history, ["Paris"]);
}

#[tokio::test]
async fn compare_success_does_not_touch_history() {
    let server = MockServer::start().await;
    let dir = TempDir::new().unwrap();
    mount_success(&server, "metric", 18.3, 2).await;

    let mut session = session(&server, &dir, UnitSystem::Metric);
    let state = session.dispatch(Action::SubmitCompare("Paris".into())).await;

    let cmp = state.compare.snapshot.as_ref().unwrap();
    assert_eq!(cmp.location_name, "Paris");
    assert_eq!(cmp.rounded_temperature(), 18);
    assert!(state.history.is_empty());
    assert!(state.report.is_none());
}

#[tokio::test]
async fn error_body_with_http_200_is_server_error() {
    let server = MockServer::start().await;
    let dir = TempDir::new().unwrap();

    Mock::given(method("GET"))
        .and(path("/weather"))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
            "cod": "500",
            "message": "internal error"
        })))
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/forecast"))
        .respond_with(ResponseTemplate::new(200).set_body_json(forecast_body(18.3)))
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/air_pollution"))
        .respond_with(ResponseTemplate::new(200))
        .expect(0)
        .mount(&server)
        .await;

    let mut session = session(&server, &dir, UnitSystem::Metric);
    let state = session.dispatch(Action::Submit("Paris".into())).await;

    assert_eq!(
        state.error,
        Some(FetchError::ServerError {
            status: 500,
            message: "internal error".into()
        })
    );
    assert!(state.report.is_none());
    assert!(state.history.is_empty());
}

#[tokio::test]
async fn slow_air_quality_does_not_fail_search() {
    let server = MockServer::start().await;
    let dir = TempDir::new().unwrap();

    Mock::given(method("GET"))
        .and(path("/weather"))
        .respond_with(ResponseTemplate::new(200).set_body_json(current_body(18.3)))
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/forecast"))
        .respond_with(ResponseTemplate::new(200).set_body_json(forecast_body(18.3)))
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/air_pollution"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_json(support::air_body(2))
                .set_delay(Duration::from_secs(3)),
        )
        .expect(1)
        .mount(&server)
        .await;

    let aggregator = Aggregator::new(Arc::new(provider(&server)), Duration::from_millis(500));
    let recent = RecentCityStore::open(dir.path().join("recent.json"));
    let mut session = Session::new(aggregator, recent, UnitSystem::Metric);
    let state = session.dispatch(Action::Submit("Paris".into())).await;

    assert_eq!(state.error, None);
    let report = state.report.as_ref().expect("search should succeed");
    assert_eq!(report.snapshot.air_quality, None);
    assert_eq!(report.forecast.len(), 40);
    assert_eq!(state.history, ["Paris"]);
}

#[tokio::test]
async fn subscribers_see_settled_state() {
    let server = MockServer::start().await;
    let dir = TempDir::new().unwrap();
    mount_success(&server, "metric", 18.3, 5).await;

    let mut session = session(&server, &dir, UnitSystem::Metric);
    let mut rx = session.subscribe();

    session.dispatch(Action::Submit("Paris".into())).await;

    assert!(rx.has_changed().unwrap());
    let seen = rx.borrow_and_update().clone();
    assert_eq!(
        seen.report.unwrap().snapshot.air_quality,
        Some(AirQuality::VeryPoor)
    );
    assert_eq!(seen.history, ["Paris"]);
}
