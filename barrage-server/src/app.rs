//! Router assembly

use axum::{
    routing::{get, post},
    Router,
};
use tower_http::trace::TraceLayer;

use crate::{context::AppContext, handlers};

/// Build the complete router.
///
/// `metrics_path` is where the scrape endpoint is mounted.
pub fn create_app(context: AppContext, metrics_path: &str) -> Router {
    Router::new()
        .route("/health", get(handlers::health_check))
        .route(metrics_path, get(handlers::scrape_metrics))
        .nest("/api/v1", create_api_router())
        .layer(TraceLayer::new_for_http())
        .with_state(context)
}

fn create_api_router() -> Router<AppContext> {
    Router::new()
        .route(
            "/attack",
            get(handlers::list_attacks).post(handlers::create_attack),
        )
        .route(
            "/attack/{id}",
            get(handlers::get_attack).delete(handlers::purge_attack),
        )
        .route("/attack/{id}/cancel", post(handlers::cancel_attack))
        .route("/report", get(handlers::list_reports))
        .route("/report/{id}", get(handlers::get_report))
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::{
        body::{to_bytes, Body},
        http::{Request, StatusCode},
    };
    use barrage_config::MetricsConfig;
    use barrage_core::{AttackOpts, AttackResult};
    use barrage_interfaces::ResultStream;
    use chrono::Utc;
    use serde_json::{json, Value};
    use std::sync::Arc;
    use std::time::Duration;
    use tokio::sync::mpsc;
    use tower::ServiceExt;

    /// Engine that answers every attack with the same three results
    fn canned_engine(opts: &AttackOpts) -> Option<ResultStream> {
        let (tx, rx) = mpsc::channel(8);
        for (seq, ms) in [1u64, 20, 600].into_iter().enumerate() {
            let result = AttackResult {
                attack: opts.name.clone(),
                seq: seq as u64,
                code: 200,
                timestamp: Utc::now(),
                latency: Duration::from_millis(ms),
                bytes_out: 0,
                bytes_in: 2,
                error: String::new(),
            };
            tx.try_send(result).ok()?;
        }
        Some(rx)
    }

    /// Engine whose stream stays open until the receiver goes away
    fn hanging_engine(_: &AttackOpts) -> Option<ResultStream> {
        let (tx, rx) = mpsc::channel(1);
        tokio::spawn(async move { tx.closed().await });
        Some(rx)
    }

    fn app_with(engine: fn(&AttackOpts) -> Option<ResultStream>) -> (Router, AppContext) {
        let context = AppContext::new(Arc::new(engine), &MetricsConfig::default()).unwrap();
        (create_app(context.clone(), "/metrics"), context)
    }

    async fn send(app: &Router, method: &str, uri: &str, body: Option<Value>) -> (StatusCode, Vec<u8>) {
        let builder = Request::builder().method(method).uri(uri);
        let request = match body {
            Some(body) => builder
                .header("content-type", "application/json")
                .body(Body::from(body.to_string()))
                .unwrap(),
            None => builder.body(Body::empty()).unwrap(),
        };
        let response = app.clone().oneshot(request).await.unwrap();
        let status = response.status();
        let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        (status, bytes.to_vec())
    }

    fn attack_body(rate: u32, duration: &str) -> Value {
        json!({
            "target": { "url": "http://localhost:8080/" },
            "rate": rate,
            "duration": duration
        })
    }

    async fn wait_for_status(context: &AppContext, id: &str, status: &str) {
        for _ in 0..100 {
            let info = context.dispatcher.get(&barrage_core::TaskId::from(id)).unwrap();
            if info.status.as_str() == status {
                return;
            }
            tokio::time::sleep(Duration::from_millis(10)).await;
        }
        panic!("task {} never reached {}", id, status);
    }

    #[tokio::test]
    async fn test_health() {
        let (app, _) = app_with(canned_engine);
        let (status, body) = send(&app, "GET", "/health", None).await;
        assert_eq!(status, StatusCode::OK);
        let body: Value = serde_json::from_slice(&body).unwrap();
        assert_eq!(body["status"], "ok");
        assert_eq!(body["attacks"], 0);
    }

    #[tokio::test]
    async fn test_attack_lifecycle_and_scrape() {
        let (app, context) = app_with(canned_engine);

        let (status, body) = send(&app, "POST", "/api/v1/attack", Some(attack_body(50, "10s"))).await;
        assert_eq!(status, StatusCode::CREATED);
        let info: Value = serde_json::from_slice(&body).unwrap();
        let id = info["id"].as_str().unwrap().to_string();

        wait_for_status(&context, &id, "completed").await;

        let (status, body) = send(&app, "GET", &format!("/api/v1/report/{}", id), None).await;
        assert_eq!(status, StatusCode::OK);
        let report: Value = serde_json::from_slice(&body).unwrap();
        assert_eq!(report["requests"], 3);

        let (status, body) = send(&app, "GET", "/metrics", None).await;
        assert_eq!(status, StatusCode::OK);
        let text = String::from_utf8(body).unwrap();
        assert!(text.contains(&format!(
            "barrage_requests_total{{duration=\"10s\",id=\"{}\",rate=\"50\"}} 3",
            id
        )));
        assert!(text.contains(&format!(
            "barrage_request_duration_histogram_bucket{{id=\"{}\",le=\"20\"}} 2",
            id
        )));
    }

    #[tokio::test]
    async fn test_cancel_running_attack() {
        let (app, context) = app_with(hanging_engine);

        let (_, body) = send(&app, "POST", "/api/v1/attack", Some(attack_body(10, "1m"))).await;
        let id = serde_json::from_slice::<Value>(&body).unwrap()["id"]
            .as_str()
            .unwrap()
            .to_string();
        wait_for_status(&context, &id, "running").await;

        let uri = format!("/api/v1/attack/{}/cancel", id);
        let (status, body) = send(&app, "POST", &uri, None).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(serde_json::from_slice::<Value>(&body).unwrap()["status"], "canceled");

        // running tasks cannot be purged, canceled ones can
        let (status, _) = send(&app, "GET", "/api/v1/attack?status=canceled", None).await;
        assert_eq!(status, StatusCode::OK);
        let (status, _) = send(&app, "DELETE", &format!("/api/v1/attack/{}", id), None).await;
        assert_eq!(status, StatusCode::OK);
        let (status, _) = send(&app, "GET", &format!("/api/v1/attack/{}", id), None).await;
        assert_eq!(status, StatusCode::NOT_FOUND);
    }

    #[tokio::test]
    async fn test_cancel_completed_attack_conflicts() {
        let (app, context) = app_with(canned_engine);

        let (_, body) = send(&app, "POST", "/api/v1/attack", Some(attack_body(50, "10s"))).await;
        let id = serde_json::from_slice::<Value>(&body).unwrap()["id"]
            .as_str()
            .unwrap()
            .to_string();
        wait_for_status(&context, &id, "completed").await;

        let (status, body) = send(&app, "POST", &format!("/api/v1/attack/{}/cancel", id), None).await;
        assert_eq!(status, StatusCode::CONFLICT);
        let body: Value = serde_json::from_slice(&body).unwrap();
        assert_eq!(body["error"]["code"], "CONFLICT");
        assert_eq!(body["error"]["status"], 409);

        // purging a finished attack drops its report as well
        let report_uri = format!("/api/v1/report/{}", id);
        let (status, _) = send(&app, "GET", &report_uri, None).await;
        assert_eq!(status, StatusCode::OK);
        let (status, _) = send(&app, "DELETE", &format!("/api/v1/attack/{}", id), None).await;
        assert_eq!(status, StatusCode::OK);
        let (status, _) = send(&app, "GET", &report_uri, None).await;
        assert_eq!(status, StatusCode::NOT_FOUND);
        assert!(context.reports.is_empty());
    }

    #[tokio::test]
    async fn test_unknown_attack_and_report() {
        let (app, _) = app_with(canned_engine);

        let (status, _) = send(&app, "POST", "/api/v1/attack/nope/cancel", None).await;
        assert_eq!(status, StatusCode::NOT_FOUND);
        let (status, _) = send(&app, "GET", "/api/v1/report/nope", None).await;
        assert_eq!(status, StatusCode::NOT_FOUND);
    }

    #[tokio::test]
    async fn test_invalid_requests() {
        let (app, _) = app_with(canned_engine);

        let (status, _) = send(&app, "POST", "/api/v1/attack", Some(attack_body(0, "10s"))).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);

        let (status, _) = send(&app, "POST", "/api/v1/attack", Some(attack_body(10, "soon"))).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);

        let (status, _) = send(&app, "POST", "/api/v1/attack", Some(json!({ "rate": 10 }))).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);

        let (status, _) = send(&app, "GET", "/metrics?status=done", None).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);

        let (status, _) = send(&app, "GET", "/api/v1/attack?status=done", None).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
    }
}
