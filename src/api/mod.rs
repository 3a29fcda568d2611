//! HTTP presentation layer over the tracking engine.
//!
//! Thin by design: handlers translate between JSON and the engine's read
//! and registration surface. Per-round fetch failures are operational
//! concerns and never appear here; callers only ever see `404` for unknown
//! products and a generic `500` for store faults.

use std::sync::Arc;

use axum::{
    Json, Router,
    extract::{Path, Query, State},
    http::StatusCode,
    response::{Html, IntoResponse, Response},
    routing::get,
};
use chrono::Utc;
use tower_http::{cors::CorsLayer, trace::TraceLayer};
use serde::Deserialize;
use serde_json::{Value, json};

use crate::error::TrackerError;
use crate::model::{Product, ProductWithLatestPrice};
use crate::tracker::PriceTracker;

const DEFAULT_HISTORY_LIMIT: u32 = 50;

pub type ApiResult<T> = Result<T, ApiError>;

#[derive(Debug)]
pub struct ApiError {
    status: StatusCode,
    message: String,
}

impl ApiError {
    fn new(status: StatusCode, message: impl Into<String>) -> Self {
        Self {
            status,
            message: message.into(),
        }
    }

    fn bad_request(message: impl Into<String>) -> Self {
        Self::new(StatusCode::BAD_REQUEST, message)
    }

    fn not_found(message: impl Into<String>) -> Self {
        Self::new(StatusCode::NOT_FOUND, message)
    }

    fn internal(message: impl Into<String>) -> Self {
        Self::new(StatusCode::INTERNAL_SERVER_ERROR, message)
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let body = Json(json!({ "error": self.message }));
        (self.status, body).into_response()
    }
}

impl From<TrackerError> for ApiError {
    fn from(err: TrackerError) -> Self {
        match err {
            TrackerError::ProductNotFound(_) => Self::not_found(err.to_string()),
            TrackerError::InvalidProduct(_) => Self::bad_request(err.to_string()),
            TrackerError::Store(_) => Self::internal("internal error"),
        }
    }
}

#[derive(Clone)]
pub struct AppState {
    pub tracker: Arc<PriceTracker>,
}

pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/", get(index))
        .route(
            "/api/v1/products",
            get(list_products).post(create_product),
        )
        .route("/api/v1/products/{id}/history", get(price_history))
        .route("/api/v1/health", get(health))
        .layer(CorsLayer::permissive())
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

const INDEX_HTML: &str = r#"<!DOCTYPE html>
<html>
<head>
    <title>Price Tracker</title>
    <style>
        body { font-family: Arial, sans-serif; margin: 40px; }
        .endpoint { margin: 20px 0; padding: 10px; background: #f5f5f5; border-radius: 5px; }
        code { background: #e9e9e9; padding: 2px 6px; border-radius: 3px; }
    </style>
</head>
<body>
    <h1>Product Price Tracker API</h1>
    <p>Available endpoints:</p>

    <div class="endpoint">
        <h3>GET /api/v1/products</h3>
        <p>All tracked products with their latest prices</p>
        <p><a href="/api/v1/products">Try it</a></p>
    </div>

    <div class="endpoint">
        <h3>POST /api/v1/products</h3>
        <p>Register a product to track (JSON body: <code>id</code>, <code>name</code>, <code>url</code>)</p>
    </div>

    <div class="endpoint">
        <h3>GET /api/v1/products/{id}/history</h3>
        <p>Price history for one product</p>
        <p>Parameters: <code>?limit=N</code> (default: 50)</p>
        <p><a href="/api/v1/products/laptop-1/history?limit=10">laptop-1 history (limit 10)</a></p>
    </div>

    <div class="endpoint">
        <h3>GET /api/v1/health</h3>
        <p>Health check</p>
        <p><a href="/api/v1/health">Try it</a></p>
    </div>
</body>
</html>"#;

async fn index() -> Html<&'static str> {
    Html(INDEX_HTML)
}

async fn list_products(State(state): State<AppState>) -> Json<Vec<ProductWithLatestPrice>> {
    Json(state.tracker.products_with_latest().await)
}

async fn create_product(
    State(state): State<AppState>,
    Json(product): Json<Product>,
) -> ApiResult<StatusCode> {
    state.tracker.add_product(product).await?;
    Ok(StatusCode::CREATED)
}

#[derive(Deserialize)]
struct HistoryParams {
    limit: Option<String>,
}

async fn price_history(
    State(state): State<AppState>,
    Path(id): Path<String>,
    Query(params): Query<HistoryParams>,
) -> ApiResult<Json<Value>> {
    // Unparsable or non-positive limits fall back to the default.
    let limit = params
        .limit
        .as_deref()
        .and_then(|v| v.parse::<u32>().ok())
        .filter(|&v| v > 0)
        .unwrap_or(DEFAULT_HISTORY_LIMIT);

    let history = state.tracker.price_history(&id, limit).await?;

    Ok(Json(json!({
        "product_id": id,
        "history": history,
        "count": history.len(),
    })))
}

async fn health() -> Json<Value> {
    Json(json!({
        "status": "ok",
        "time": Utc::now().to_rfc3339(),
    }))
}
