//! # HTTP API
//!
//! Axum routes for the tide forecast service:
//! - `GET /api/tides?location=<name>`: tide view model as JSON
//! - `GET /api/stations`: supported locations and their NOAA station ids
//! - `GET /health`: liveness probe
//!
//! Every failure while building a forecast collapses into the same
//! `500 {"error": "Failed to fetch tide data"}` body; the underlying cause is
//! only logged. Successful forecasts carry a `Cache-Control` header matching
//! the in-memory freshness window.

use std::sync::Arc;
use std::time::{Duration, Instant};

use axum::{
    extract::{rejection::QueryRejection, Query, State},
    http::{header, StatusCode},
    response::{IntoResponse, Response},
    routing::get,
    Json, Router,
};
use chrono::{Local, NaiveDateTime};
use serde::{Deserialize, Serialize};
use tower_http::trace::TraceLayer;
use tracing::{debug, error, info, warn};

use crate::cache::TideCache;
use crate::config::Config;
use crate::forecast::fetch_tide_data;
use crate::noaa::{NoaaClient, TideError};
use crate::stations::{Station, STATIONS};
use crate::TideData;

/// Body of every failed `/api/tides` response.
pub const TIDE_ERROR_MESSAGE: &str = "Failed to fetch tide data";

/// Source of the reference time handed to the view-model builder.
pub type Clock = fn() -> NaiveDateTime;

/// Wall-clock time in the server's local time zone.
pub fn local_now() -> NaiveDateTime {
    Local::now().naive_local()
}

/// Shared state of all routes.
#[derive(Clone)]
pub struct AppState {
    client: NoaaClient,
    cache: Arc<TideCache>,
    default_location: String,
    clock: Clock,
}

impl AppState {
    pub fn new(client: NoaaClient, config: &Config) -> Self {
        AppState {
            client,
            cache: Arc::new(TideCache::new(
                config.cache.ttl(),
                config.cache.max_entries,
            )),
            default_location: config.forecast.default_location.clone(),
            clock: local_now,
        }
    }

    /// Build the NOAA client described by `config` and wrap it in state.
    pub fn from_config(config: &Config) -> Result<Self, TideError> {
        let client = NoaaClient::new(config.noaa.base_url.clone(), config.noaa.timeout())?;
        Ok(Self::new(client, config))
    }

    /// Replace the wall clock, e.g. with a fixed instant in tests.
    pub fn with_clock(mut self, clock: Clock) -> Self {
        self.clock = clock;
        self
    }
}

/// Create the application router.
pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/api/tides", get(tides))
        .route("/api/stations", get(stations))
        .route("/health", get(health))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

/// Query parameters of `GET /api/tides`
#[derive(Debug, Deserialize)]
pub struct TidesQuery {
    location: Option<String>,
}

#[derive(Serialize)]
struct ErrorBody {
    error: &'static str,
}

#[derive(Serialize)]
struct HealthResponse {
    status: &'static str,
}

async fn tides(
    State(state): State<AppState>,
    query: Result<Query<TidesQuery>, QueryRejection>,
) -> Response {
    // A query that does not deserialize counts as no location at all
    let query = query.map(|Query(query)| query).unwrap_or_else(|rejection| {
        warn!("ignoring malformed query: {}", rejection);
        TidesQuery { location: None }
    });
    let location = query
        .location
        .filter(|location| !location.is_empty())
        .unwrap_or_else(|| state.default_location.clone());

    if let Some(data) = state.cache.get(&location, Instant::now()).await {
        debug!(%location, "serving cached forecast");
        return forecast_response(state.cache.ttl(), data);
    }

    match fetch_tide_data(&state.client, &location, (state.clock)()).await {
        Ok(data) => {
            info!(%location, events = data.today_tides.len(), "fetched fresh forecast");
            state
                .cache
                .insert(location, data.clone(), Instant::now())
                .await;
            forecast_response(state.cache.ttl(), data)
        }
        Err(e) => {
            error!(%location, "Error fetching NOAA tide data: {}", e);
            (
                StatusCode::INTERNAL_SERVER_ERROR,
                Json(ErrorBody {
                    error: TIDE_ERROR_MESSAGE,
                }),
            )
                .into_response()
        }
    }
}

fn forecast_response(ttl: Duration, data: TideData) -> Response {
    let cache_control = format!("public, max-age={}", ttl.as_secs());
    ([(header::CACHE_CONTROL, cache_control)], Json(data)).into_response()
}

async fn stations() -> Json<&'static [Station]> {
    Json(STATIONS)
}

async fn health() -> Json<HealthResponse> {
    Json(HealthResponse { status: "ok" })
}
