use axum::{
    body::Body,
    extract::State,
    http::{header, StatusCode},
    response::IntoResponse,
    routing::{delete, get, post},
    Router,
};
use metrics_exporter_prometheus::PrometheusHandle;

use crate::service::DomainService;
use crate::{domains, telemetry};

#[derive(Clone)]
pub struct AppState {
    metrics: PrometheusHandle,
    domains: DomainService,
}

impl AppState {
    pub fn new(metrics: PrometheusHandle, domains: DomainService) -> Self {
        Self { metrics, domains }
    }

    pub fn metrics(&self) -> &PrometheusHandle {
        &self.metrics
    }

    pub fn domains(&self) -> &DomainService {
        &self.domains
    }
}

pub fn app_router(state: AppState) -> Router {
    Router::new()
        .route("/healthz", get(healthz))
        .route("/metrics", get(metrics))
        .route("/api/domains", get(domains::list).post(domains::create))
        .route("/api/domains/stats", get(domains::stats))
        .route("/api/domains/:id", delete(domains::delete))
        .route("/api/domains/:id/ssl", post(domains::install_ssl))
        .with_state(state)
}

async fn healthz() -> StatusCode {
    StatusCode::OK
}

async fn metrics(State(state): State<AppState>) -> impl IntoResponse {
    let body = telemetry::render_metrics(state.metrics());
    (
        StatusCode::OK,
        [(header::CONTENT_TYPE, "text/plain; version=0.0.4")],
        Body::from(body),
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::{Method, Request};
    use http_body_util::BodyExt;
    use serde_json::{json, Value};
    use std::sync::Arc;
    use tower::ServiceExt;

    use ssl_dashboard_storage::{DomainRepository, InMemoryDomainRepository};
    use ssl_dashboard_util::StatusMode;

    use crate::service::tests::{service_with, FailingRepository};

    fn setup_state_with(repository: Arc<dyn DomainRepository>) -> AppState {
        let metrics = telemetry::init_metrics().expect("metrics init");
        AppState::new(metrics, service_with(repository, StatusMode::Snapshot))
    }

    fn setup_state() -> AppState {
        setup_state_with(Arc::new(InMemoryDomainRepository::seeded()))
    }

    async fn send(
        app: Router,
        method: Method,
        uri: &str,
        body: Option<Value>,
    ) -> (StatusCode, Value) {
        let mut builder = Request::builder().method(method).uri(uri);
        let body = match body {
            Some(value) => {
                builder = builder.header(header::CONTENT_TYPE, "application/json");
                Body::from(value.to_string())
            }
            None => Body::empty(),
        };

        let response = app
            .oneshot(builder.body(body).unwrap())
            .await
            .expect("handler should respond");
        let status = response.status();
        let collected = response
            .into_body()
            .collect()
            .await
            .expect("body should read");
        let bytes = collected.to_bytes();
        let value = if bytes.is_empty() {
            Value::Null
        } else {
            serde_json::from_slice(&bytes).expect("json body")
        };
        (status, value)
    }

    #[tokio::test]
    async fn healthz_returns_ok() {
        let (status, _) = send(app_router(setup_state()), Method::GET, "/healthz", None).await;
        assert_eq!(status, StatusCode::OK);
    }

    #[tokio::test]
    async fn metrics_exports_build_info() {
        let app = app_router(setup_state());
        let response = app
            .oneshot(
                Request::builder()
                    .uri("/metrics")
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .expect("handler should respond");

        assert_eq!(response.status(), StatusCode::OK);
        let collected = response
            .into_body()
            .collect()
            .await
            .expect("body should read");
        let body = String::from_utf8(collected.to_bytes().to_vec()).expect("utf-8");
        assert!(body.contains("app_build_info"));
        assert!(body.contains("app_uptime_seconds"));
    }

    #[tokio::test]
    async fn lists_seeded_domains_sorted_by_name() {
        let (status, body) =
            send(app_router(setup_state()), Method::GET, "/api/domains", None).await;
        assert_eq!(status, StatusCode::OK);

        let names: Vec<&str> = body
            .as_array()
            .expect("array")
            .iter()
            .map(|record| record["name"].as_str().expect("name"))
            .collect();
        assert_eq!(
            names,
            [
                "blog.example.com",
                "example.com",
                "old.example.com",
                "shop.example.com"
            ]
        );
        assert_eq!(body[0]["sslStatus"], json!("expiring_soon"));
        assert_eq!(body[0]["sslExpiryDate"], json!("2024-07-05"));
        assert!(body[3]["sslExpiryDate"].is_null());
    }

    #[tokio::test]
    async fn stats_counts_statuses() {
        let (status, body) =
            send(app_router(setup_state()), Method::GET, "/api/domains/stats", None).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(
            body,
            json!({"totalDomains": 4, "activeSsl": 1, "expiringSoon": 1, "expired": 1})
        );
    }

    #[tokio::test]
    async fn create_returns_created_record() {
        let state = setup_state();
        let (status, body) = send(
            app_router(state.clone()),
            Method::POST,
            "/api/domains",
            Some(json!({"name": "x.com", "installSsl": true})),
        )
        .await;

        assert_eq!(status, StatusCode::CREATED);
        assert_eq!(body["id"], json!(5));
        assert_eq!(body["name"], json!("x.com"));
        assert_eq!(body["sslStatus"], json!("valid"));
        assert_eq!(body["sslExpiryDate"], json!("2024-09-28"));
        assert_eq!(body["createdAt"], json!("2024-06-30T00:00:00Z"));
        assert!(body.get("installSsl").is_none());

        let (_, stats) =
            send(app_router(state), Method::GET, "/api/domains/stats", None).await;
        assert_eq!(stats["totalDomains"], json!(5));
        assert_eq!(stats["activeSsl"], json!(2));
    }

    #[tokio::test]
    async fn create_rejects_invalid_name() {
        let (status, body) = send(
            app_router(setup_state()),
            Method::POST,
            "/api/domains",
            Some(json!({"name": "-bad.com"})),
        )
        .await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["type"], json!("validation_failed"));
        assert_eq!(body["message"], json!("Invalid domain format"));
    }

    #[tokio::test]
    async fn create_rejects_missing_name() {
        let (status, body) = send(
            app_router(setup_state()),
            Method::POST,
            "/api/domains",
            Some(json!({"installSsl": false})),
        )
        .await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["message"], json!("Domain name is required"));
    }

    #[tokio::test]
    async fn create_rejects_duplicate_name() {
        let (status, body) = send(
            app_router(setup_state()),
            Method::POST,
            "/api/domains",
            Some(json!({"name": "example.com"})),
        )
        .await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["type"], json!("domain_exists"));
        assert_eq!(body["message"], json!("Domain example.com already exists"));
    }

    #[tokio::test]
    async fn create_rejects_malformed_json() {
        let app = app_router(setup_state());
        let response = app
            .oneshot(
                Request::builder()
                    .method(Method::POST)
                    .uri("/api/domains")
                    .header(header::CONTENT_TYPE, "application/json")
                    .body(Body::from("{not json"))
                    .unwrap(),
            )
            .await
            .expect("handler should respond");
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        assert_eq!(
            response.headers().get(header::CONTENT_TYPE).unwrap(),
            "application/problem+json"
        );
    }

    #[tokio::test]
    async fn install_ssl_updates_record() {
        let (status, body) = send(
            app_router(setup_state()),
            Method::POST,
            "/api/domains/4/ssl",
            None,
        )
        .await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["name"], json!("shop.example.com"));
        assert_eq!(body["sslStatus"], json!("valid"));
        assert_eq!(body["sslExpiryDate"], json!("2024-09-28"));
    }

    #[tokio::test]
    async fn install_ssl_unknown_id_is_not_found() {
        for uri in [
            "/api/domains/99/ssl",
            "/api/domains/abc/ssl",
            "/api/domains/+4/ssl",
            "/api/domains/04/ssl",
        ] {
            let (status, body) = send(app_router(setup_state()), Method::POST, uri, None).await;
            assert_eq!(status, StatusCode::NOT_FOUND, "{uri}");
            assert_eq!(body["message"], json!("Domain not found"));
        }
    }

    #[tokio::test]
    async fn delete_removes_domain() {
        let state = setup_state();
        let (status, body) = send(
            app_router(state.clone()),
            Method::DELETE,
            "/api/domains/3",
            None,
        )
        .await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(
            body,
            json!({"message": "Domain old.example.com deleted successfully"})
        );

        let (status, _) = send(
            app_router(state),
            Method::DELETE,
            "/api/domains/3",
            None,
        )
        .await;
        assert_eq!(status, StatusCode::NOT_FOUND);
    }

    #[tokio::test]
    async fn delete_requires_canonical_id() {
        let state = setup_state();
        for uri in ["/api/domains/+3", "/api/domains/03", "/api/domains/3.0"] {
            let (status, body) =
                send(app_router(state.clone()), Method::DELETE, uri, None).await;
            assert_eq!(status, StatusCode::NOT_FOUND, "{uri}");
            assert_eq!(body["type"], json!("domain_not_found"));
        }

        let (_, stats) =
            send(app_router(state), Method::GET, "/api/domains/stats", None).await;
        assert_eq!(stats["totalDomains"], json!(4));
    }

    #[tokio::test]
    async fn internal_failures_hide_details() {
        let app = app_router(setup_state_with(Arc::new(FailingRepository)));
        let (status, body) = send(app, Method::GET, "/api/domains", None).await;
        assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(body["type"], json!("internal_error"));
        assert_eq!(body["message"], json!("Failed to fetch domains"));
        assert!(!body.to_string().contains("connection refused"));
    }
}
