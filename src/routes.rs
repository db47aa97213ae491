use std::sync::Arc;

use axum::{
    extract::{Path, Query, Request, State},
    http::StatusCode,
    middleware::Next,
    response::{IntoResponse, Response},
    Json,
};
use chrono::Utc;
use jsonwebtoken::{encode, EncodingKey, Header};
use serde::{Deserialize, Serialize};
use serde_json::json;
use tracing::error;

use crate::{
    error::ApiError,
    state::AppState,
    store::model::{NewRestaurant, Restaurant, RestaurantPatch},
};

const TOKEN_TTL_SECS: i64 = 60 * 60;

#[derive(Deserialize)]
pub struct LoginRequest {
    pub username: Option<String>,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
pub struct LoginResponse {
    pub access_token: String,
}

#[derive(Serialize)]
struct Claims {
    sub: String,
    exp: i64,
}

/// Issues an HS256 token with a 1-hour expiry. Nothing in this service
/// verifies it; enforcement is out of scope.
pub async fn login_handler(
    State(state): State<Arc<AppState>>,
    Json(body): Json<LoginRequest>,
) -> Result<Json<LoginResponse>, ApiError> {
    let username = body
        .username
        .as_deref()
        .map(str::trim)
        .filter(|u| !u.is_empty())
        .ok_or(ApiError::MissingUsername)?;

    let claims = Claims {
        sub: username.to_string(),
        exp: Utc::now().timestamp() + TOKEN_TTL_SECS,
    };
    let access_token = encode(
        &Header::default(),
        &claims,
        &EncodingKey::from_secret(state.config.secret_key.as_bytes()),
    )
    .map_err(|err| {
        error!(%err, "token signing failed");
        ApiError::TokenSigning
    })?;

    Ok(Json(LoginResponse { access_token }))
}

pub async fn health_handler() -> Json<serde_json::Value> {
    Json(json!({ "ok": true }))
}

#[derive(Deserialize)]
pub struct ListParams {
    pub page: Option<i64>,
    #[serde(rename = "perPage")]
    pub per_page: Option<i64>,
    pub borough: Option<String>,
}

pub async fn list_restaurants(
    State(state): State<Arc<AppState>>,
    Query(params): Query<ListParams>,
) -> Result<Json<Vec<Restaurant>>, ApiError> {
    let restaurants = state
        .store
        .list(
            params.page.unwrap_or(1),
            params.per_page.unwrap_or(10),
            params.borough.as_deref(),
        )
        .await?;
    Ok(Json(restaurants))
}

pub async fn get_restaurant(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
) -> Result<Json<Restaurant>, ApiError> {
    Ok(Json(state.store.get(&id).await?))
}

pub async fn create_restaurant(
    State(state): State<Arc<AppState>>,
    Json(input): Json<NewRestaurant>,
) -> Result<(StatusCode, Json<Restaurant>), ApiError> {
    let created = state.store.create(input).await?;
    Ok((StatusCode::CREATED, Json(created)))
}

pub async fn update_restaurant(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
    Json(patch): Json<RestaurantPatch>,
) -> Result<Json<Restaurant>, ApiError> {
    Ok(Json(state.store.update(&id, patch).await?))
}

pub async fn delete_restaurant(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
) -> Result<StatusCode, ApiError> {
    state.store.delete(&id).await?;
    Ok(StatusCode::NO_CONTENT)
}

/// Readiness guard in front of the store-backed routes. `initialize` is a
/// no-op once connected, so in the eager deployment this costs nothing; in
/// the lazy one it turns an unreachable store into a 503 instead of
/// exiting the process.
pub async fn ready_guard(
    State(state): State<Arc<AppState>>,
    request: Request,
    next: Next,
) -> Response {
    if let Err(err) = state.store.initialize().await {
        error!(%err, "record store unavailable");
        return (
            StatusCode::SERVICE_UNAVAILABLE,
            Json(json!({ "error": "record store unavailable" })),
        )
            .into_response();
    }
    next.run(request).await
}
