//! Local HTTP front end.
//!
//! Routes:
//! - `GET /`            the page with the two date pickers and the chart area
//! - `GET /api/bounds`  picker limits as JSON
//! - `GET /api/chart`   chart spec as JSON for `?start=&end=`
//! - `GET /chart.svg`   rendered chart for `?start=&end=`
//!
//! Every chart request dispatches `date-range-changed` on a blocking worker,
//! which re-fetches both tables. Requests are neither coalesced nor ordered.

use std::sync::Arc;

use axum::{
    Json, Router,
    extract::{Query, State},
    http::{StatusCode, header},
    response::{Html, IntoResponse, Response},
    routing::get,
};
use chrono::NaiveDate;
use serde::Deserialize;

use crate::config::Config;
use crate::domain::{ChartSpec, DateBounds, DateRange};
use crate::error::AppError;
use crate::render::svg::render_svg;
use crate::ui::{DATE_RANGE_CHANGED, EventHandlers};

pub mod page;

pub struct ServerState {
    pub title: String,
    pub bounds: DateBounds,
    pub handlers: EventHandlers,
}

/// Errors returned to the browser as plain text.
#[derive(Debug)]
pub enum ApiError {
    BadRequest(String),
    Upstream(String),
    Internal(String),
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, message) = match self {
            ApiError::BadRequest(m) => (StatusCode::BAD_REQUEST, m),
            ApiError::Upstream(m) => (StatusCode::BAD_GATEWAY, m),
            ApiError::Internal(m) => (StatusCode::INTERNAL_SERVER_ERROR, m),
        };
        (status, message).into_response()
    }
}

impl From<AppError> for ApiError {
    fn from(err: AppError) -> Self {
        ApiError::Upstream(err.to_string())
    }
}

type ApiResult<T> = Result<T, ApiError>;

/// Query string of the chart endpoints; empty values mean "unset".
#[derive(Debug, Default, Deserialize)]
pub struct RangeQuery {
    pub start: Option<String>,
    pub end: Option<String>,
}

impl RangeQuery {
    pub fn to_range(&self) -> ApiResult<DateRange> {
        Ok(DateRange::new(
            parse_bound("start", self.start.as_deref())?,
            parse_bound("end", self.end.as_deref())?,
        ))
    }
}

fn parse_bound(name: &str, raw: Option<&str>) -> ApiResult<Option<NaiveDate>> {
    let Some(raw) = raw.map(str::trim).filter(|s| !s.is_empty()) else {
        return Ok(None);
    };
    NaiveDate::parse_from_str(raw, "%Y-%m-%d")
        .map(Some)
        .map_err(|e| ApiError::BadRequest(format!("Invalid {name} date '{raw}': {e}")))
}

pub fn app_router(state: Arc<ServerState>) -> Router {
    Router::new()
        .route("/", get(index))
        .route("/api/bounds", get(get_bounds))
        .route("/api/chart", get(get_chart))
        .route("/chart.svg", get(get_chart_svg))
        .with_state(state)
}

async fn index(State(state): State<Arc<ServerState>>) -> Html<String> {
    Html(page::render_index(&state.title, &state.bounds))
}

async fn get_bounds(State(state): State<Arc<ServerState>>) -> Json<DateBounds> {
    Json(state.bounds)
}

async fn get_chart(
    State(state): State<Arc<ServerState>>,
    Query(q): Query<RangeQuery>,
) -> ApiResult<Json<ChartSpec>> {
    let range = q.to_range()?;
    let spec = blocking(move || state.handlers.dispatch(DATE_RANGE_CHANGED, range)).await?;
    Ok(Json(spec))
}

async fn get_chart_svg(
    State(state): State<Arc<ServerState>>,
    Query(q): Query<RangeQuery>,
) -> ApiResult<Response> {
    let range = q.to_range()?;
    let svg = blocking(move || {
        let spec = state.handlers.dispatch(DATE_RANGE_CHANGED, range)?;
        render_svg(&spec)
    })
    .await?;
    Ok(([(header::CONTENT_TYPE, "image/svg+xml")], svg).into_response())
}

/// Run a fetch/render cycle off the async workers; the HTTP client blocks.
async fn blocking<T: Send + 'static>(
    f: impl FnOnce() -> Result<T, AppError> + Send + 'static,
) -> ApiResult<T> {
    tokio::task::spawn_blocking(f)
        .await
        .map_err(|e| ApiError::Internal(format!("render task failed: {e}")))?
        .map_err(ApiError::from)
}

/// Bind and serve until Ctrl-C.
pub fn serve(config: &Config, state: ServerState) -> Result<(), AppError> {
    let runtime = tokio::runtime::Builder::new_multi_thread()
        .enable_all()
        .build()
        .map_err(|e| AppError::data(format!("Failed to start async runtime: {e}")))?;

    let addr = config.listen_addr;
    let router = app_router(Arc::new(state));
    runtime.block_on(async move {
        let listener = tokio::net::TcpListener::bind(addr)
            .await
            .map_err(|e| AppError::usage(format!("Failed to bind {addr}: {e}")))?;
        tracing::info!("Listening on http://{addr}");
        axum::serve(listener, router)
            .with_graceful_shutdown(shutdown_signal())
            .await
            .map_err(|e| AppError::data(format!("Server error: {e}")))
    })
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::warn!("failed to listen for Ctrl-C: {e}");
        std::future::pending::<()>().await;
    }
    tracing::info!("shutting down");
}

#[cfg(test)]
mod tests {
    use axum::body::{Body, to_bytes};
    use axum::http::Request;
    use tower::ServiceExt;

    use super::*;
    use crate::app::pipeline::testing::sample_table;
    use crate::chart::ChartBuilder;
    use crate::config::TableNames;
    use crate::error::DataError;

    fn d(y: i32, m: u32, day: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, day).unwrap()
    }

    fn state(fail: bool) -> Arc<ServerState> {
        let mut handlers = EventHandlers::new();
        handlers.on(DATE_RANGE_CHANGED, move |range| {
            if fail {
                return Err(DataError::Fetch {
                    table: "T20303".to_string(),
                    message: "connection refused".to_string(),
                });
            }
            ChartBuilder::new(&TableNames::default()).build(
                &sample_table(8, 100.0),
                &sample_table(8, 80.0),
                &range,
            )
        });
        Arc::new(ServerState {
            title: "NIPA TABLES T20303-T20304".to_string(),
            bounds: DateBounds::new(d(2008, 1, 1), d(2009, 10, 1)),
            handlers,
        })
    }

    async fn get(state: Arc<ServerState>, uri: &str) -> (StatusCode, String) {
        let resp = app_router(state)
            .oneshot(Request::builder().uri(uri).body(Body::empty()).unwrap())
            .await
            .unwrap();
        let status = resp.status();
        let bytes = to_bytes(resp.into_body(), usize::MAX).await.unwrap();
        (status, String::from_utf8(bytes.to_vec()).unwrap())
    }

    #[test]
    fn empty_query_values_are_unset() {
        let q = RangeQuery {
            start: Some(String::new()),
            end: None,
        };
        assert_eq!(q.to_range().unwrap(), DateRange::unbounded());
    }

    #[tokio::test]
    async fn chart_endpoint_filters_by_range() {
        let (status, body) = get(state(false), "/api/chart?start=2008-04-01&end=2008-12-31").await;
        assert_eq!(status, StatusCode::OK);
        let spec: ChartSpec = serde_json::from_str(&body).unwrap();
        assert_eq!(spec.goods.points.len(), 3);
        assert_eq!(spec.services.points.len(), 3);
    }

    #[tokio::test]
    async fn chart_endpoint_without_range_returns_everything() {
        let (status, body) = get(state(false), "/api/chart").await;
        assert_eq!(status, StatusCode::OK);
        let spec: ChartSpec = serde_json::from_str(&body).unwrap();
        assert_eq!(spec.goods.points.len(), 8);
    }

    #[tokio::test]
    async fn invalid_date_is_bad_request() {
        let (status, body) = get(state(false), "/api/chart?start=2008-13-01&end=2009-01-01").await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert!(body.contains("start"));
    }

    #[tokio::test]
    async fn failed_cycle_is_bad_gateway() {
        let (status, body) = get(state(true), "/chart.svg?start=2008-01-01&end=2009-01-01").await;
        assert_eq!(status, StatusCode::BAD_GATEWAY);
        assert!(body.contains("connection refused"));
    }

    #[tokio::test]
    async fn svg_endpoint_renders_chart() {
        let (status, body) = get(state(false), "/chart.svg").await;
        assert_eq!(status, StatusCode::OK);
        assert!(body.contains("<svg"));
    }

    #[tokio::test]
    async fn index_and_bounds() {
        let (status, html) = get(state(false), "/").await;
        assert_eq!(status, StatusCode::OK);
        assert!(html.contains("start-date-picker"));

        let (_, json) = get(state(false), "/api/bounds").await;
        let bounds: DateBounds = serde_json::from_str(&json).unwrap();
        assert_eq!(bounds.max, d(2009, 10, 1));
        assert_eq!(bounds.default_start, d(2009, 10, 1));
    }
}
