//! Directory client against a local mock directory
//!
//! Every failure mode must resolve to "active"; only an explicit inactive
//! first match may return false.

use std::collections::HashMap;
use std::sync::{Arc, Mutex};
use std::time::Duration;

use axum::extract::{Query, State};
use axum::http::{HeaderMap, StatusCode};
use axum::routing::get;
use axum::Router;
use chrono::{TimeZone, Utc};
use tokio::net::TcpListener;

use account_lifecycle::verifier::client::sign;
use account_lifecycle::{
    Account, AccountStore, DeletionReason, DirectoryClient, DirectoryConfig, DirectoryVerdict,
    FixedClock, IdentityVerifier, LifecycleReconciler, MemoryAccountStore, ReconcileOutcome,
};

const PHONE: &str = "13800000000";

async fn spawn_directory(router: Router) -> String {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        axum::serve(listener, router).await.unwrap();
    });
    format!("http://{}/scim/Users", addr)
}

async fn directory_returning(status: StatusCode, body: &'static str) -> String {
    let router = Router::new().route("/scim/Users", get(move || async move { (status, body) }));
    spawn_directory(router).await
}

fn client(api_url: String) -> DirectoryClient {
    DirectoryClient::new(DirectoryConfig::new("app-7", "secret-7", api_url)).unwrap()
}

const INACTIVE: &str = r#"{"totalResults": 1, "Resources": [
    {"realName": "Li Si", "userName": "lisi", "active": false}
]}"#;

const ACTIVE: &str = r#"{"totalResults": 1, "Resources": [
    {"realName": "Li Si", "userName": "lisi", "active": true}
]}"#;

#[tokio::test]
async fn test_inactive_match_returns_false() {
    let directory = client(directory_returning(StatusCode::OK, INACTIVE).await);
    assert_eq!(directory.check(PHONE).await, DirectoryVerdict::Inactive);
    assert!(!directory.verify(PHONE).await);
}

#[tokio::test]
async fn test_active_match_returns_true() {
    let directory = client(directory_returning(StatusCode::OK, ACTIVE).await);
    assert_eq!(directory.check(PHONE).await, DirectoryVerdict::Active);
    assert!(directory.verify(PHONE).await);
}

#[tokio::test]
async fn test_first_match_decides() {
    let body = r#"{"totalResults": 2, "Resources": [
        {"realName": "A", "userName": "a", "active": true},
        {"realName": "B", "userName": "b", "active": false}
    ]}"#;
    let directory = client(directory_returning(StatusCode::OK, body).await);
    assert!(directory.verify(PHONE).await);
}

#[tokio::test]
async fn test_zero_matches_fail_open() {
    let body = r#"{"totalResults": 0, "Resources": []}"#;
    let directory = client(directory_returning(StatusCode::OK, body).await);
    assert_eq!(directory.check(PHONE).await, DirectoryVerdict::NoMatch);
    assert!(directory.verify(PHONE).await);
}

#[tokio::test]
async fn test_matches_without_resources_fail_open() {
    let body = r#"{"totalResults": 3, "Resources": []}"#;
    let directory = client(directory_returning(StatusCode::OK, body).await);
    assert_eq!(directory.check(PHONE).await, DirectoryVerdict::Unverifiable);
    assert!(directory.verify(PHONE).await);
}

#[tokio::test]
async fn test_non_200_fails_open() {
    // Even an "inactive" body must be ignored when the status is wrong.
    let directory = client(directory_returning(StatusCode::INTERNAL_SERVER_ERROR, INACTIVE).await);
    assert_eq!(directory.check(PHONE).await, DirectoryVerdict::Unverifiable);
    assert!(directory.verify(PHONE).await);

    let directory = client(directory_returning(StatusCode::CREATED, INACTIVE).await);
    assert!(directory.verify(PHONE).await);
}

#[tokio::test]
async fn test_empty_body_fails_open() {
    let directory = client(directory_returning(StatusCode::OK, "").await);
    assert!(matches!(
        directory.lookup(PHONE).await,
        Err(account_lifecycle::VerifyError::EmptyBody)
    ));
    assert!(directory.verify(PHONE).await);
}

#[tokio::test]
async fn test_malformed_body_fails_open() {
    let directory = client(directory_returning(StatusCode::OK, "<html>oops</html>").await);
    assert!(matches!(
        directory.lookup(PHONE).await,
        Err(account_lifecycle::VerifyError::Malformed(_))
    ));
    assert!(directory.verify(PHONE).await);

    let directory = client(directory_returning(StatusCode::OK, r#"{"Resources": []}"#).await);
    assert!(directory.verify(PHONE).await);
}

#[tokio::test]
async fn test_timeout_fails_open() {
    let router = Router::new().route(
        "/scim/Users",
        get(|| async {
            tokio::time::sleep(Duration::from_secs(3)).await;
            (StatusCode::OK, INACTIVE)
        }),
    );
    let url = spawn_directory(router).await;
    let directory = DirectoryClient::new(
        DirectoryConfig::new("app-7", "secret-7", url).with_timeout(Duration::from_millis(200)),
    )
    .unwrap();

    assert_eq!(directory.check(PHONE).await, DirectoryVerdict::Unverifiable);
    assert!(directory.verify(PHONE).await);
}

#[tokio::test]
async fn test_unreachable_directory_fails_open() {
    let listener = std::net::TcpListener::bind("127.0.0.1:0").unwrap();
    let addr = listener.local_addr().unwrap();
    drop(listener);

    let directory = client(format!("http://{}/scim/Users", addr));
    assert!(directory.verify(PHONE).await);
}

#[derive(Clone, Default)]
struct Captured {
    requests: Arc<Mutex<Vec<(HashMap<String, String>, HeaderMap)>>>,
}

async fn capture(
    State(captured): State<Captured>,
    Query(query): Query<HashMap<String, String>>,
    headers: HeaderMap,
) -> (StatusCode, &'static str) {
    captured.requests.lock().unwrap().push((query, headers));
    (StatusCode::OK, ACTIVE)
}

#[tokio::test]
async fn test_request_is_signed_and_filtered() {
    let captured = Captured::default();
    let router = Router::new()
        .route("/scim/Users", get(capture))
        .with_state(captured.clone());
    let directory = client(spawn_directory(router).await);

    let before = Utc::now().timestamp();
    assert!(directory.verify(PHONE).await);
    let after = Utc::now().timestamp();

    let requests = captured.requests.lock().unwrap();
    assert_eq!(requests.len(), 1);
    let (query, headers) = &requests[0];

    assert_eq!(query["filter"], format!("phoneNumbers eq \"{}\"", PHONE));
    assert_eq!(headers["x-app-id"], "app-7");
    assert_eq!(headers["content-type"], "application/json");

    let timestamp: i64 = headers["x-timestamp"].to_str().unwrap().parse().unwrap();
    assert!((before..=after).contains(&timestamp));
    assert_eq!(
        headers["x-app-token"].to_str().unwrap(),
        sign("app-7", "secret-7", timestamp)
    );
}

#[tokio::test]
async fn test_reconciler_deletes_on_directory_inactive() {
    let now = Utc.with_ymd_and_hms(2024, 9, 15, 10, 0, 0).unwrap();
    let clock = Arc::new(FixedClock::new(now));
    // Created yesterday: neither inactivity policy would touch it.
    let store = Arc::new(MemoryAccountStore::from_accounts(
        vec![Account::new("lisi", now - chrono::Duration::days(1)).with_correlation_key(PHONE)],
        clock.clone(),
    ));
    let directory = client(directory_returning(StatusCode::OK, INACTIVE).await);
    let reconciler = LifecycleReconciler::new(store.clone(), Arc::new(directory)).with_clock(clock);

    let outcome = reconciler.reconcile("lisi").await.unwrap();
    assert_eq!(
        outcome,
        ReconcileOutcome::Deleted {
            reason: DeletionReason::DirectoryInactive
        }
    );
    assert!(store.get("lisi").await.unwrap_err().is_not_found());
}
