use axum::{
    extract::{
        ws::{Message, WebSocket, WebSocketUpgrade},
        Query, State,
    },
    response::IntoResponse,
    routing::get,
    Json, Router,
};
use futures::{sink::SinkExt, stream::StreamExt};
use log::{debug, info, warn};
use serde::{Deserialize, Serialize};
use std::net::SocketAddr;
use std::time::Duration;
use tokio::net::TcpListener;
use tokio::time::{interval, sleep};
use tower_http::cors::CorsLayer;

use crate::error::SentinelResult;
use crate::law::{self, Catalog};
use crate::routing::{RouteResult, RoutingEngine};
use crate::stop::StopFlag;
use crate::telemetry::LatestTelemetry;
use crate::types::TelemetrySample;

/// Websocket push period (2 Hz)
const WS_PUSH_INTERVAL: Duration = Duration::from_millis(500);

#[derive(Clone)]
pub struct AppState {
    pub latest: LatestTelemetry,
    pub engine: RoutingEngine,
    pub stale_after: Duration,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct TelemetryView {
    pub sample: TelemetrySample,
    /// Seconds since the last accepted datagram
    pub age_secs: Option<f64>,
    pub stale: bool,
    pub updates: u64,
}

#[derive(Debug, Serialize)]
pub struct RouteView {
    #[serde(flatten)]
    pub route: RouteResult,
    pub warning: Option<&'static str>,
    pub position_stale: bool,
    pub directory_version: String,
}

#[derive(Debug, Default, Deserialize)]
pub struct RouteQuery {
    #[serde(default)]
    pub plate: String,
}

impl AppState {
    pub fn telemetry_view(&self) -> TelemetryView {
        TelemetryView {
            sample: (*self.latest.snapshot()).clone(),
            age_secs: self.latest.age().map(|d| d.as_secs_f64()),
            stale: self.latest.is_stale(self.stale_after),
            updates: self.latest.updates(),
        }
    }

    /// Route a report about `plate` from the latest known position.
    pub fn route_view(&self, plate: &str) -> RouteView {
        let sample = self.latest.snapshot();
        let route = self.engine.resolve_sample(&sample, plate);
        RouteView {
            warning: route.warning(),
            route,
            position_stale: self.latest.is_stale(self.stale_after),
            directory_version: self.engine.directory().version().to_string(),
        }
    }
}

pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/api/telemetry", get(telemetry_handler))
        .route("/api/route", get(route_handler))
        .route("/api/catalog", get(catalog_handler))
        .route("/ws", get(ws_handler))
        .layer(CorsLayer::permissive())
        .with_state(state)
}

/// Serve the API until `stop` is raised.
pub async fn serve(state: AppState, addr: SocketAddr, stop: StopFlag) -> SentinelResult<()> {
    let listener = TcpListener::bind(addr).await?;
    info!("API listening on http://{}", listener.local_addr()?);

    axum::serve(listener, router(state))
        .with_graceful_shutdown(wait_for_stop(stop))
        .await?;
    info!("API stopped");
    Ok(())
}

async fn wait_for_stop(stop: StopFlag) {
    while !stop.is_stopped() {
        sleep(Duration::from_millis(200)).await;
    }
}

async fn telemetry_handler(State(state): State<AppState>) -> Json<TelemetryView> {
    Json(state.telemetry_view())
}

async fn route_handler(
    State(state): State<AppState>,
    Query(query): Query<RouteQuery>,
) -> Json<RouteView> {
    let view = state.route_view(&query.plate);
    if let Some(warning) = view.warning {
        warn!("Route for plate {:?}: {}", query.plate, warning);
    }
    Json(view)
}

async fn catalog_handler() -> Json<Catalog> {
    Json(law::catalog())
}

async fn ws_handler(ws: WebSocketUpgrade, State(state): State<AppState>) -> impl IntoResponse {
    ws.on_upgrade(|socket| handle_socket(socket, state))
}

async fn handle_socket(socket: WebSocket, state: AppState) {
    let (mut sender, mut receiver) = socket.split();

    let mut push = tokio::spawn(async move {
        let mut ticker = interval(WS_PUSH_INTERVAL);
        loop {
            ticker.tick().await;
            let json = match serde_json::to_string(&state.telemetry_view()) {
                Ok(json) => json,
                Err(e) => {
                    warn!("Failed to encode telemetry view: {}", e);
                    break;
                }
            };
            if sender.send(Message::Text(json)).await.is_err() {
                // Client disconnected
                break;
            }
        }
    });

    let mut listen = tokio::spawn(async move {
        while let Some(Ok(message)) = receiver.next().await {
            if let Message::Close(_) = message {
                break;
            }
        }
    });

    tokio::select! {
        _ = &mut push => listen.abort(),
        _ = &mut listen => push.abort(),
    }
    debug!("Websocket client disconnected");
}
