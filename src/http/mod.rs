use std::sync::Arc;
use std::time::Duration;

use axum::{
    http::{header::CONTENT_TYPE, Method},
    routing::{get, patch, post},
    Router,
};
use tokio::net::TcpListener;
use tokio::signal;
use tower_http::cors::CorsLayer;
use tracing::{error, info};

use crate::state::AppState;

pub mod routes;

use routes::*;

pub fn router(state: Arc<AppState>) -> Router {
    let cors = CorsLayer::new()
        .allow_methods([
            Method::GET,
            Method::POST,
            Method::PATCH,
            Method::DELETE,
            Method::OPTIONS,
        ])
        .allow_headers([CONTENT_TYPE])
        .max_age(Duration::from_secs(60 * 60));

    Router::new()
        .route("/profiles", post(register_handler))
        .route("/tourists", get(tourists_handler))
        .route("/digital-ids/:user_id", get(digital_id_handler))
        .route("/digital-ids/:user_id/qr", get(qr_handler))
        .route("/scan/:code", get(scan_handler))
        .route("/sos", post(sos_handler))
        .route("/sos/holds", post(press_hold_handler))
        .route(
            "/sos/holds/:id",
            get(hold_status_handler).delete(release_hold_handler),
        )
        .route("/alerts", get(alerts_handler))
        .route("/alerts/:id/status", patch(alert_status_handler))
        .route("/alerts/:id/notes", post(alert_note_handler))
        .route("/efir", get(efir_handler))
        .route(
            "/danger-zones",
            get(danger_zones_handler).post(create_danger_zone_handler),
        )
        .route("/dashboard", get(dashboard_handler))
        .route("/analytics", get(analytics_handler))
        .route("/feed", get(feed_handler).post(share_post_handler))
        .route("/questions", get(questions_handler).post(ask_handler))
        .route("/questions/:id/answers", get(answers_handler))
        .route("/recommendations", get(recommendations_handler))
        .layer(cors)
        .with_state(state)
}

pub async fn serve(port: u16, state: Arc<AppState>) -> anyhow::Result<()> {
    let address = format!("0.0.0.0:{port}");
    let listener = TcpListener::bind(&address).await?;
    info!("HTTP server running on {address}");

    axum::serve(listener, router(state))
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    info!("HTTP server shut down");
    Ok(())
}

async fn shutdown_signal() {
    let ctrl_c = async {
        match signal::ctrl_c().await {
            Ok(()) => info!("Received Ctrl+C, shutting down"),
            Err(e) => {
                error!("Failed to install Ctrl+C handler: {}", e);
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match signal::unix::signal(signal::unix::SignalKind::terminate()) {
            Ok(mut sig) => {
                sig.recv().await;
                info!("Received terminate signal, shutting down");
            }
            Err(e) => {
                error!("Failed to install signal handler: {}", e);
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::community::CommunityBoard;
    use crate::config::ServiceSettings;
    use crate::db::memory::MemoryStore;
    use axum::body::{to_bytes, Body};
    use axum::http::{Request, StatusCode};
    use serde_json::{json, Value};
    use tower::ServiceExt;

    fn app() -> Router {
        let state = AppState::new(
            Arc::new(MemoryStore::new()),
            ServiceSettings::default(),
            CommunityBoard::seeded(chrono::Utc::now()),
        );
        router(Arc::new(state))
    }

    async fn call(
        app: &Router,
        method: Method,
        uri: &str,
        body: Option<Value>,
    ) -> (StatusCode, Value) {
        let request = Request::builder().method(method).uri(uri);
        let request = match body {
            Some(body) => request
                .header(CONTENT_TYPE, "application/json")
                .body(Body::from(body.to_string())),
            None => request.body(Body::empty()),
        }
        .unwrap();

        let response = app.clone().oneshot(request).await.unwrap();
        let status = response.status();
        let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        let value = if bytes.is_empty() {
            Value::Null
        } else {
            serde_json::from_slice(&bytes).unwrap()
        };
        (status, value)
    }

    fn sarah(user_id: &str) -> Value {
        json!({
            "user_id": user_id,
            "name": "Sarah Johnson",
            "email": "sarah.johnson@email.com",
            "phone": "+1-555-0123",
            "emergency_contact": "+1-555-0124",
            "nationality": "American"
        })
    }

    #[tokio::test]
    async fn registration_requires_every_field() {
        let app = app();
        let mut form = sarah("6f1c2a54-1d8e-4c1b-9a53-2d3f0b8c7e11");
        form["phone"] = json!("");

        let (status, body) = call(&app, Method::POST, "/profiles", Some(form)).await;
        assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
        assert_eq!(body["error"], "Please fill in all required fields.");

        let (status, tourists) = call(&app, Method::GET, "/tourists", None).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(tourists.as_array().map(Vec::len), Some(0));
    }

    #[tokio::test]
    async fn issued_id_can_be_scanned() {
        let app = app();
        let user = "6f1c2a54-1d8e-4c1b-9a53-2d3f0b8c7e11";
        let (status, _) = call(&app, Method::POST, "/profiles", Some(sarah(user))).await;
        assert_eq!(status, StatusCode::CREATED);

        let (status, card) = call(&app, Method::GET, &format!("/digital-ids/{user}"), None).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(card["validity_label"], "Active");
        let code = card["digital_id"].as_str().unwrap().to_string();

        let (status, qr) = call(&app, Method::GET, &format!("/digital-ids/{user}/qr"), None).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(qr["name"], "Sarah Johnson");

        let (status, scanned) = call(&app, Method::GET, &format!("/scan/{code}"), None).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(scanned["scanned_id"], code.as_str());
        assert_eq!(scanned["tourist"]["id_state"], "active");

        let (status, _) = call(&app, Method::GET, "/scan/TG0000", None).await;
        assert_eq!(status, StatusCode::NOT_FOUND);
    }

    #[tokio::test]
    async fn submitted_sos_shows_up_in_panels() {
        let app = app();
        let user = "6f1c2a54-1d8e-4c1b-9a53-2d3f0b8c7e11";
        let (status, sent) = call(
            &app,
            Method::POST,
            "/sos",
            Some(json!({ "user_id": user, "location_denied": true })),
        )
        .await;
        assert_eq!(status, StatusCode::CREATED);
        assert!(sent["location"].is_null());

        let (_, pending) = call(&app, Method::GET, "/alerts?status=pending", None).await;
        assert_eq!(pending.as_array().map(Vec::len), Some(1));
        let (_, resolved) = call(&app, Method::GET, "/alerts?status=resolved", None).await;
        assert_eq!(resolved.as_array().map(Vec::len), Some(0));

        let (status, _) = call(&app, Method::GET, "/alerts?status=open", None).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);

        let alert_id = sent["alert_id"].as_str().unwrap();
        let (status, updated) = call(
            &app,
            Method::PATCH,
            &format!("/alerts/{alert_id}/status"),
            Some(json!({ "status": "in_progress" })),
        )
        .await;
        assert_eq!(status, StatusCode::OK);
        assert!(!updated["response_time"].is_null());

        let (_, reports) = call(&app, Method::GET, &format!("/efir?user_id={user}"), None).await;
        assert_eq!(reports[0]["fir_number"], sent["fir_number"]);

        let (_, stats) = call(&app, Method::GET, "/dashboard", None).await;
        assert_eq!(stats["active_alerts"], 0);
        assert_eq!(stats["efir_reports"], 1);

        let (status, analytics) =
            call(&app, Method::GET, "/analytics?type=manual&status=in_progress", None).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(analytics["total_incidents"], 1);
        assert_eq!(analytics["in_progress"], 1);
        let (status, _) = call(&app, Method::GET, "/analytics?type=sms", None).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
    }

    #[tokio::test(start_paused = true)]
    async fn released_hold_sends_nothing() {
        let app = app();
        let (status, hold) = call(
            &app,
            Method::POST,
            "/sos/holds",
            Some(json!({ "user_id": "6f1c2a54-1d8e-4c1b-9a53-2d3f0b8c7e11" })),
        )
        .await;
        assert_eq!(status, StatusCode::CREATED);
        assert_eq!(hold["phase"], "holding");

        tokio::time::sleep(Duration::from_secs(1)).await;
        let id = hold["id"].as_str().unwrap();
        let (status, released) = call(&app, Method::DELETE, &format!("/sos/holds/{id}"), None).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(released["phase"], "aborted");

        tokio::time::sleep(Duration::from_secs(5)).await;
        let (_, alerts) = call(&app, Method::GET, "/alerts", None).await;
        assert_eq!(alerts.as_array().map(Vec::len), Some(0));
    }

    #[tokio::test]
    async fn community_boards_are_served() {
        let app = app();

        let (status, _) = call(&app, Method::POST, "/feed", Some(json!({ "content": "" }))).await;
        assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);

        let (_, food) = call(&app, Method::GET, "/questions?category=food", None).await;
        let question = food[0]["id"].as_str().unwrap();
        let (_, answers) =
            call(&app, Method::GET, &format!("/questions/{question}/answers"), None).await;
        assert_eq!(answers.as_array().map(Vec::len), Some(2));

        let (status, recs) = call(&app, Method::GET, "/recommendations", None).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(recs["events"][0]["name"], "Louvre Night Tours");
    }
}
