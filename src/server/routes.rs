use axum::{
    extract::{Query, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::get,
    Json, Router,
};
use serde::Deserialize;
use serde_json::json;

use crate::services::QueryService;
use crate::types::{OverviewTotals, ProductRollup, UserView};

#[derive(Clone)]
pub struct AppState {
    pub query: QueryService,
}

pub fn app(state: AppState) -> Router {
    Router::new()
        .route("/api/overview", get(overview))
        .route("/api/user", get(user))
        .route("/api/products", get(products))
        .route("/api/top-users", get(top_users))
        .with_state(state)
}

#[derive(Debug, Deserialize)]
pub struct UserParams {
    pub phone: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct TopUsersParams {
    pub limit: Option<usize>,
}

/// Error body is `{"detail": "..."}`
#[derive(Debug, PartialEq)]
pub enum ApiError {
    NotFound,
    BadRequest(&'static str),
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, detail) = match self {
            ApiError::NotFound => (StatusCode::NOT_FOUND, "user not found"),
            ApiError::BadRequest(detail) => (StatusCode::BAD_REQUEST, detail),
        };
        (status, Json(json!({ "detail": detail }))).into_response()
    }
}

pub async fn overview(State(state): State<AppState>) -> Json<OverviewTotals> {
    Json(state.query.overview())
}

pub async fn user(
    State(state): State<AppState>,
    Query(params): Query<UserParams>,
) -> Result<Json<UserView>, ApiError> {
    let phone = params
        .phone
        .as_deref()
        .map(str::trim)
        .filter(|p| !p.is_empty())
        .ok_or(ApiError::BadRequest("phone is required"))?;

    state.query.user_view(phone).map(Json).ok_or_else(|| {
        tracing::debug!(phone, "user lookup miss");
        ApiError::NotFound
    })
}

pub async fn products(State(state): State<AppState>) -> Json<Vec<ProductRollup>> {
    Json(state.query.products().to_vec())
}

pub async fn top_users(
    State(state): State<AppState>,
    Query(params): Query<TopUsersParams>,
) -> Json<Vec<UserView>> {
    Json(
        state
            .query
            .top_users(params.limit)
            .into_iter()
            .map(UserView::from)
            .collect(),
    )
}
