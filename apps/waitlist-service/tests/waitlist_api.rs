//! Waitlist API Integration Tests
//!
//! Drives the full Axum router: joins, listings, stats, admin access and
//! profile-backed enrollment.

#![allow(clippy::unwrap_used, clippy::expect_used)]

use std::collections::HashMap;
use std::sync::Arc;

use async_trait::async_trait;
use axum::Router;
use axum::body::Body;
use axum::http::{Request, StatusCode, header};
use parking_lot::Mutex;
use serde_json::{Value, json};
use tower::ServiceExt;

use waitlist_service::{
    AdminGate, AdminSecret, AppState, IdentityId, JoinService, LookupError, NeynarClient,
    NeynarSettings, Profile, ProfileLookupPort, RetrySettings, WaitlistRegistry, create_router,
};

const ADMIN_SECRET: &str = "let-me-in";

// =============================================================================
// Test Fixtures
// =============================================================================

/// In-memory profile directory that counts lookups.
#[derive(Default)]
struct StubProfiles {
    profiles: HashMap<IdentityId, Profile>,
    calls: Mutex<Vec<IdentityId>>,
    fail_with: Option<LookupError>,
}

impl StubProfiles {
    fn with(fids: &[IdentityId]) -> Self {
        let profiles = fids
            .iter()
            .map(|&fid| {
                (
                    fid,
                    Profile {
                        fid,
                        username: format!("user{fid}"),
                        display_name: format!("User {fid}"),
                        pfp_url: format!("https://img.example/{fid}.png"),
                    },
                )
            })
            .collect();
        Self {
            profiles,
            ..Self::default()
        }
    }

    fn failing(error: LookupError) -> Self {
        Self {
            fail_with: Some(error),
            ..Self::default()
        }
    }

    fn call_count(&self) -> usize {
        self.calls.lock().len()
    }
}

#[async_trait]
impl ProfileLookupPort for StubProfiles {
    async fn lookup(&self, fid: IdentityId) -> Result<Profile, LookupError> {
        self.calls.lock().push(fid);
        if let Some(error) = &self.fail_with {
            return Err(error.clone());
        }
        self.profiles
            .get(&fid)
            .cloned()
            .ok_or(LookupError::NotFound { fid })
    }
}

struct TestApp {
    router: Router,
    registry: Arc<WaitlistRegistry>,
}

fn build_app(profiles: Arc<dyn ProfileLookupPort>, admin_secret: Option<&str>) -> TestApp {
    let registry = Arc::new(WaitlistRegistry::new());
    let join = JoinService::new(Arc::clone(&registry), profiles);
    let secret = admin_secret.map(|s| AdminSecret::new(s.to_string()));
    let state = AppState::new(
        join,
        AdminGate::new(secret.as_ref()),
        5,
        "test-0.0.1".to_string(),
    );

    TestApp {
        router: create_router(state),
        registry,
    }
}

fn default_app() -> TestApp {
    build_app(Arc::new(StubProfiles::default()), Some(ADMIN_SECRET))
}

async fn send(router: &Router, request: Request<Body>) -> (StatusCode, Value) {
    let response = router
        .clone()
        .oneshot(request)
        .await
        .expect("request should succeed");
    let status = response.status();
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .expect("should read body");
    let body = if bytes.is_empty() {
        Value::Null
    } else {
        serde_json::from_slice(&bytes).unwrap_or_else(|_| {
            Value::String(String::from_utf8_lossy(&bytes).into_owned())
        })
    };
    (status, body)
}

fn post_json(uri: &str, body: &Value) -> Request<Body> {
    Request::builder()
        .method("POST")
        .uri(uri)
        .header(header::CONTENT_TYPE, "application/json")
        .body(Body::from(body.to_string()))
        .expect("should build request")
}

fn get(uri: &str) -> Request<Body> {
    Request::builder()
        .uri(uri)
        .body(Body::empty())
        .expect("should build request")
}

fn join_body(fid: IdentityId) -> Value {
    json!({
        "fid": fid,
        "username": format!("user{fid}"),
        "displayName": format!("User {fid}"),
        "pfpUrl": format!("https://img.example/{fid}.png"),
    })
}

async fn join(router: &Router, fid: IdentityId) -> (StatusCode, Value) {
    send(router, post_json("/api/waitlist/join", &join_body(fid))).await
}

fn fids(entries: &Value) -> Vec<u64> {
    entries
        .as_array()
        .expect("entries should be an array")
        .iter()
        .map(|e| e["fid"].as_u64().expect("fid should be a number"))
        .collect()
}

// =============================================================================
// Join
// =============================================================================

#[tokio::test]
async fn join_admits_new_identity() {
    let app = default_app();

    let (status, body) = join(&app.router, 1).await;

    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(body["success"], json!(true));
    assert_eq!(body["entry"]["fid"], json!(1));
    assert_eq!(body["entry"]["username"], json!("user1"));
    assert_eq!(body["entry"]["displayName"], json!("User 1"));
    assert_eq!(body["entry"]["pfpUrl"], json!("https://img.example/1.png"));
    assert!(body["entry"]["timestamp"].is_string());
    assert_eq!(app.registry.count(), 1);
}

#[tokio::test]
async fn join_without_avatar_stores_empty_url() {
    let app = default_app();

    let (status, body) = send(
        &app.router,
        post_json(
            "/api/waitlist/join",
            &json!({"fid": 9, "username": "nine", "displayName": "Nine"}),
        ),
    )
    .await;

    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(body["entry"]["pfpUrl"], json!(""));
}

#[tokio::test]
async fn duplicate_join_is_rejected() {
    let app = default_app();
    join(&app.router, 1).await;

    let (status, body) = join(&app.router, 1).await;

    assert_eq!(status, StatusCode::CONFLICT);
    assert_eq!(body, json!({"error": "Already registered"}));
    assert_eq!(app.registry.count(), 1);
}

#[tokio::test]
async fn join_with_missing_fields_is_rejected() {
    let app = default_app();

    for body in [
        json!({"username": "alice", "displayName": "Alice"}),
        json!({"fid": 1, "displayName": "Alice"}),
        json!({"fid": 1, "username": "alice"}),
        json!({"fid": 1, "username": "   ", "displayName": "Alice"}),
        json!({"fid": 0, "username": "alice", "displayName": "Alice"}),
    ] {
        let (status, error) = send(&app.router, post_json("/api/waitlist/join", &body)).await;
        assert_eq!(status, StatusCode::BAD_REQUEST, "body: {body}");
        assert_eq!(error, json!({"error": "Missing required fields"}));
    }

    assert_eq!(app.registry.count(), 0);
}

#[tokio::test]
async fn join_with_malformed_body_is_rejected() {
    let app = default_app();
    let request = Request::builder()
        .method("POST")
        .uri("/api/waitlist/join")
        .header(header::CONTENT_TYPE, "application/json")
        .body(Body::from("{not json"))
        .unwrap();

    let (status, body) = send(&app.router, request).await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body, json!({"error": "Invalid request body"}));
    assert_eq!(app.registry.count(), 0);
}

#[tokio::test]
async fn concurrent_joins_for_same_identity_admit_once() {
    let app = default_app();

    let handles: Vec<_> = (0..16)
        .map(|_| {
            let router = app.router.clone();
            tokio::spawn(async move { join(&router, 42).await.0 })
        })
        .collect();

    let mut created = 0;
    let mut conflicts = 0;
    for handle in handles {
        match handle.await.unwrap() {
            StatusCode::CREATED => created += 1,
            StatusCode::CONFLICT => conflicts += 1,
            other => panic!("unexpected status {other}"),
        }
    }

    assert_eq!(created, 1);
    assert_eq!(conflicts, 15);
    assert_eq!(app.registry.count(), 1);
}

// =============================================================================
// Listing and Stats
// =============================================================================

#[tokio::test]
async fn list_all_is_newest_first() {
    let app = default_app();
    for fid in [1, 2, 3] {
        join(&app.router, fid).await;
    }

    let (status, body) = send(&app.router, get("/api/waitlist/all")).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(fids(&body), vec![3, 2, 1]);
}

#[tokio::test]
async fn list_all_on_empty_registry() {
    let app = default_app();

    let (status, body) = send(&app.router, get("/api/waitlist/all")).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, json!([]));
}

#[tokio::test]
async fn stats_report_total_and_five_newest() {
    let app = default_app();
    for fid in 1..=7 {
        join(&app.router, fid).await;
    }

    let (status, body) = send(&app.router, get("/api/waitlist/stats")).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["totalUsers"], json!(7));
    assert_eq!(fids(&body["recentUsers"]), vec![7, 6, 5, 4, 3]);
}

#[tokio::test]
async fn rejected_join_does_not_change_stats() {
    let app = default_app();
    join(&app.router, 1).await;
    join(&app.router, 1).await;

    let (_, body) = send(&app.router, get("/api/waitlist/stats")).await;

    assert_eq!(body["totalUsers"], json!(1));
    assert_eq!(fids(&body["recentUsers"]), vec![1]);
}

// =============================================================================
// Admin
// =============================================================================

fn admin_request(token: Option<&str>) -> Request<Body> {
    let mut builder = Request::builder().uri("/api/admin/waitlist");
    if let Some(token) = token {
        builder = builder.header(header::AUTHORIZATION, format!("Bearer {token}"));
    }
    builder.body(Body::empty()).unwrap()
}

#[tokio::test]
async fn admin_listing_requires_secret() {
    let app = default_app();
    join(&app.router, 1).await;

    let (status, body) = send(&app.router, admin_request(None)).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert_eq!(body, json!({"error": "Unauthorized"}));

    let (status, _) = send(&app.router, admin_request(Some("wrong"))).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn admin_listing_with_secret() {
    let app = default_app();
    for fid in [10, 20] {
        join(&app.router, fid).await;
    }

    let (status, body) = send(&app.router, admin_request(Some(ADMIN_SECRET))).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["totalUsers"], json!(2));
    assert_eq!(fids(&body["entries"]), vec![20, 10]);
}

#[tokio::test]
async fn admin_listing_disabled_without_configured_secret() {
    let app = build_app(Arc::new(StubProfiles::default()), None);

    let (status, body) = send(&app.router, admin_request(Some(ADMIN_SECRET))).await;

    assert_eq!(status, StatusCode::SERVICE_UNAVAILABLE);
    assert_eq!(body, json!({"error": "Admin access is not configured"}));
}

// =============================================================================
// Profile Lookup and Enrollment
// =============================================================================

#[tokio::test]
async fn lookup_user_requires_fid() {
    let app = default_app();

    for body in [json!({}), json!({"fid": 0})] {
        let (status, error) = send(&app.router, post_json("/api/neynar/user", &body)).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(error, json!({"error": "FID is required"}));
    }
}

#[tokio::test]
async fn lookup_user_returns_profile() {
    let app = build_app(Arc::new(StubProfiles::with(&[3])), Some(ADMIN_SECRET));

    let (status, body) = send(&app.router, post_json("/api/neynar/user", &json!({"fid": 3}))).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["username"], json!("user3"));
    assert_eq!(body["displayName"], json!("User 3"));
    assert_eq!(app.registry.count(), 0);
}

#[tokio::test]
async fn lookup_user_unknown_fid_is_not_found() {
    let app = default_app();

    let (status, body) =
        send(&app.router, post_json("/api/neynar/user", &json!({"fid": 404}))).await;

    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body, json!({"error": "User not found"}));
}

#[tokio::test]
async fn enroll_resolves_profile_then_admits() {
    let profiles = Arc::new(StubProfiles::with(&[5]));
    let app = build_app(Arc::clone(&profiles) as Arc<dyn ProfileLookupPort>, Some(ADMIN_SECRET));

    let (status, body) =
        send(&app.router, post_json("/api/waitlist/enroll", &json!({"fid": 5}))).await;

    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(body["entry"]["username"], json!("user5"));
    assert!(app.registry.is_registered(5));
    assert_eq!(profiles.call_count(), 1);
}

#[tokio::test]
async fn enroll_registered_identity_skips_lookup() {
    let profiles = Arc::new(StubProfiles::with(&[5]));
    let app = build_app(Arc::clone(&profiles) as Arc<dyn ProfileLookupPort>, Some(ADMIN_SECRET));
    join(&app.router, 5).await;

    let (status, _) = send(&app.router, post_json("/api/waitlist/enroll", &json!({"fid": 5}))).await;

    assert_eq!(status, StatusCode::CONFLICT);
    assert_eq!(profiles.call_count(), 0);
}

#[tokio::test]
async fn enroll_lookup_failure_leaves_registry_untouched() {
    let profiles = Arc::new(StubProfiles::failing(LookupError::Transport(
        "connection refused".to_string(),
    )));
    let app = build_app(profiles, Some(ADMIN_SECRET));

    let (status, body) =
        send(&app.router, post_json("/api/waitlist/enroll", &json!({"fid": 5}))).await;

    assert_eq!(status, StatusCode::BAD_GATEWAY);
    assert_eq!(body, json!({"error": "Failed to fetch user data"}));
    assert_eq!(app.registry.count(), 0);
}

#[tokio::test]
async fn enroll_through_neynar_client() {
    use wiremock::matchers::{header as header_eq, method, path, query_param};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/v2/farcaster/user/bulk"))
        .and(query_param("fids", "77"))
        .and(header_eq("api_key", "test-key"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "users": [{
                "fid": 77,
                "username": "seventy",
                "display_name": "Seventy Seven",
                "pfp_url": "https://img.example/77.png"
            }]
        })))
        .expect(1)
        .mount(&server)
        .await;

    let settings = NeynarSettings::new("test-key".to_string())
        .with_base_url(server.uri())
        .with_retry(RetrySettings {
            max_attempts: 1,
            ..RetrySettings::default()
        });
    let client = NeynarClient::new(&settings).expect("client should build");
    let app = build_app(Arc::new(client), Some(ADMIN_SECRET));

    let (status, body) =
        send(&app.router, post_json("/api/waitlist/enroll", &json!({"fid": 77}))).await;

    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(body["entry"]["username"], json!("seventy"));
    assert_eq!(body["entry"]["displayName"], json!("Seventy Seven"));

    let (_, stats) = send(&app.router, get("/api/waitlist/stats")).await;
    assert_eq!(stats["totalUsers"], json!(1));
}

// =============================================================================
// Health
// =============================================================================

#[tokio::test]
async fn health_reports_signup_count() {
    let app = default_app();
    join(&app.router, 1).await;

    let (status, body) = send(&app.router, get("/health")).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["version"], json!("test-0.0.1"));
    assert_eq!(body["waitlist"]["total_signups"], json!(1));
    assert_eq!(body["waitlist"]["admin_enabled"], json!(true));
}

#[tokio::test]
async fn liveness_and_readiness() {
    let app = default_app();

    let (status, _) = send(&app.router, get("/healthz")).await;
    assert_eq!(status, StatusCode::OK);

    let (status, body) = send(&app.router, get("/readyz")).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, json!("READY"));
}
