//! Gateway HTTP surface proxying a scripted upstream producer.

use std::net::TcpListener;

use actix_web::{App, HttpResponse, HttpServer, get, web};
use chrono::NaiveDate;
use notify_config::shared::HttpClientConfig;
use notify_core::types::{ErrorResponse, NotificationRecord};
use notify_gateway::client::NotificationStreamClient;
use notify_gateway::startup::run;
use serde::Deserialize;

const ERROR_USER: i64 = 500;

fn record(id: i64, hours_ago: i64) -> NotificationRecord {
    NotificationRecord {
        id,
        user_id: 42,
        kind: "USER".to_owned(),
        title: format!("[USER] User Notification {id}"),
        message: format!("User message {id}"),
        source: "USER".to_owned(),
        read: false,
        created_at: NaiveDate::from_ymd_opt(2026, 3, 1)
            .unwrap()
            .and_hms_opt(12, 0, 0)
            .unwrap()
            - chrono::Duration::hours(hours_ago),
        read_at: None,
    }
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct MockQuery {
    user_id: i64,
}

#[get("/api/notifications/stream")]
async fn mock_stream(query: web::Query<MockQuery>) -> HttpResponse {
    if query.user_id == ERROR_USER {
        return HttpResponse::InternalServerError().body("boom");
    }

    let mut body = String::new();
    for (id, hours_ago) in [(1, 0), (2, 1)] {
        body.push_str(&serde_json::to_string(&record(id, hours_ago)).unwrap());
        body.push('\n');
    }

    HttpResponse::Ok()
        .content_type("application/x-ndjson")
        .body(body)
}

struct TestApp {
    address: String,
    client: reqwest::Client,
}

impl TestApp {
    async fn get(&self, path_and_query: &str) -> reqwest::Response {
        self.client
            .get(format!("{}{path_and_query}", self.address))
            .send()
            .await
            .expect("failed to execute request")
    }
}

fn spawn_upstream() -> String {
    let listener = TcpListener::bind("127.0.0.1:0").expect("failed to bind random port");
    let port = listener.local_addr().unwrap().port();

    let server = HttpServer::new(|| App::new().service(mock_stream))
        .listen(listener)
        .expect("failed to listen")
        .run();
    tokio::spawn(server);

    format!("http://127.0.0.1:{port}")
}

fn spawn_gateway(upstream_base_url: String) -> TestApp {
    let listener = TcpListener::bind("127.0.0.1:0").expect("failed to bind random port");
    let port = listener.local_addr().unwrap().port();

    let client = NotificationStreamClient::new(upstream_base_url, HttpClientConfig::default())
        .expect("failed to build client");
    let server = run(listener, client).expect("failed to start test server");
    tokio::spawn(server);

    TestApp {
        address: format!("http://127.0.0.1:{port}"),
        client: reqwest::Client::new(),
    }
}

#[tokio::test]
async fn proxies_the_upstream_stream_as_ndjson() {
    let app = spawn_gateway(spawn_upstream());

    let response = app.get("/api/client/notifications?userId=42&limit=5").await;
    assert_eq!(response.status(), 200);
    assert!(
        response
            .headers()
            .get("content-type")
            .and_then(|v| v.to_str().ok())
            .is_some_and(|v| v.starts_with("application/x-ndjson"))
    );

    let body = response.text().await.expect("failed to read body");
    let records: Vec<NotificationRecord> = body
        .lines()
        .filter(|line| !line.is_empty())
        .map(|line| serde_json::from_str(line).expect("line should decode as a record"))
        .collect();

    assert_eq!(records.len(), 2);
    assert_eq!(records[0].id, 1);
    assert_eq!(records[1].id, 2);
}

#[tokio::test]
async fn rejects_invalid_user_id_without_calling_upstream() {
    // No upstream is spawned: validation must fail before any network work.
    let app = spawn_gateway("http://127.0.0.1:9".to_owned());

    let response = app.get("/api/client/notifications?userId=-1").await;
    assert_eq!(response.status(), 400);

    let body: ErrorResponse = response.json().await.expect("error body should decode");
    assert_eq!(body.status, 400);
    assert_eq!(body.error, "Validation Error");
    assert_eq!(body.message, "userId must be positive");
    assert_eq!(body.path, "/api/client/notifications");
}

#[tokio::test]
async fn maps_upstream_failures_to_bad_gateway() {
    let app = spawn_gateway(spawn_upstream());

    let response = app.get("/api/client/notifications?userId=500").await;
    assert_eq!(response.status(), 502);

    let body: ErrorResponse = response.json().await.expect("error body should decode");
    assert_eq!(body.error, "Upstream Error");
    assert!(body.message.contains("boom"));
    assert_eq!(body.path, "/api/client/notifications");
}

#[tokio::test]
async fn health_check_works() {
    let app = spawn_gateway("http://127.0.0.1:9".to_owned());

    let response = app.get("/api/client/health").await;

    assert_eq!(response.status(), 200);
    let body = response.text().await.expect("failed to read body");
    assert_eq!(body, "notification gateway is healthy");
}
