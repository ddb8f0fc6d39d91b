//! HTTP layer
//!
//! One signaling endpoint (`POST /offer`) plus the embedded browser client
//! and its `/config` data. The core stays behind `SignalingService`; this
//! module only maps HTTP to it.

use std::net::SocketAddr;
use std::sync::Arc;

use axum::extract::State;
use axum::http::{header, StatusCode};
use axum::response::{Html, IntoResponse, Response};
use axum::routing::{get, post};
use axum::{Json, Router};
use serde::Serialize;

use crate::signaling::{AnswerPayload, OfferPayload, SignalingError, SignalingService};

/// Settings exposed to the browser client via `GET /config`
#[derive(Debug, Clone, Serialize)]
pub struct ClientConfig {
    /// Streaming time limit for the client's display timer, in seconds
    pub max_connection_time: u64,
    /// Video width in pixels
    pub video_width: u32,
    /// Video height in pixels
    pub video_height: u32,
}

#[derive(Clone)]
struct AppState {
    service: Arc<SignalingService>,
    client: ClientConfig,
}

/// Build the application router
pub fn router(service: Arc<SignalingService>, client: ClientConfig) -> Router {
    Router::new()
        .route("/", get(index))
        .route("/client.js", get(client_js))
        .route("/config", get(client_config))
        .route("/offer", post(offer))
        .with_state(AppState { service, client })
}

/// Serve the HTTP API until a shutdown signal, then close all sessions
pub async fn serve(
    addr: SocketAddr,
    service: Arc<SignalingService>,
    client: ClientConfig,
) -> crate::error::Result<()> {
    let app = router(Arc::clone(&service), client);

    let listener = tokio::net::TcpListener::bind(addr).await?;
    tracing::info!(addr = %addr, "camcast server listening");

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    tracing::info!("Shutting down");
    service.shutdown_all().await;
    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!(error = %e, "Failed to listen for shutdown signal");
    }
}

async fn index() -> Html<&'static str> {
    Html(include_str!("../../web/index.html"))
}

async fn client_js() -> impl IntoResponse {
    (
        [(header::CONTENT_TYPE, "application/javascript")],
        include_str!("../../web/client.js"),
    )
}

async fn client_config(State(state): State<AppState>) -> Json<ClientConfig> {
    Json(state.client.clone())
}

async fn offer(
    State(state): State<AppState>,
    Json(payload): Json<OfferPayload>,
) -> Result<Json<AnswerPayload>, SignalingError> {
    state.service.handle_offer(payload).await.map(Json)
}

impl IntoResponse for SignalingError {
    fn into_response(self) -> Response {
        let status = match &self {
            SignalingError::InvalidOffer(_) => StatusCode::BAD_REQUEST,
            SignalingError::DeviceUnavailable(_) => StatusCode::SERVICE_UNAVAILABLE,
            SignalingError::NegotiationFailed(_) | SignalingError::SenderNotFound => {
                StatusCode::INTERNAL_SERVER_ERROR
            }
        };

        let body = Json(serde_json::json!({ "error": self.to_string() }));
        (status, body).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_status_mapping() {
        let resp = SignalingError::InvalidOffer("bad".into()).into_response();
        assert_eq!(resp.status(), StatusCode::BAD_REQUEST);

        let resp = SignalingError::DeviceUnavailable("gone".into()).into_response();
        assert_eq!(resp.status(), StatusCode::SERVICE_UNAVAILABLE);

        let resp = SignalingError::NegotiationFailed("boom".into()).into_response();
        assert_eq!(resp.status(), StatusCode::INTERNAL_SERVER_ERROR);

        let resp = SignalingError::SenderNotFound.into_response();
        assert_eq!(resp.status(), StatusCode::INTERNAL_SERVER_ERROR);
    }

    #[test]
    fn test_client_config_json_keys() {
        let client = ClientConfig {
            max_connection_time: 60,
            video_width: 1280,
            video_height: 720,
        };
        let json = serde_json::to_string(&client).unwrap();
        assert!(json.contains("max_connection_time"));
        assert!(json.contains("video_width"));
        assert!(json.contains("video_height"));
    }
}
