use axum::{extract::Extension, http::StatusCode, Json};
use serde::{Deserialize, Serialize};

use crate::common::ApiResult;
use crate::domains::auth::actions;
use crate::server::app::AppState;

#[derive(Deserialize)]
pub struct RegisterRequest {
    pub email: String,
    pub password: String,
}

#[derive(Serialize)]
pub struct RegisterResponse {
    pub id: String,
    pub email: String,
}

/// POST /auth/register
pub async fn register_handler(
    Extension(state): Extension<AppState>,
    Json(body): Json<RegisterRequest>,
) -> ApiResult<(StatusCode, Json<RegisterResponse>)> {
    let identity = actions::register(&body.email, &body.password, &state.db_pool).await?;

    Ok((
        StatusCode::CREATED,
        Json(RegisterResponse {
            id: identity.id.to_string(),
            email: identity.email,
        }),
    ))
}

#[derive(Deserialize)]
pub struct TokenRequest {
    pub email: String,
    pub password: String,
}

#[derive(Serialize)]
pub struct TokenResponse {
    pub token: String,
}

/// POST /auth/token
pub async fn token_handler(
    Extension(state): Extension<AppState>,
    Json(body): Json<TokenRequest>,
) -> ApiResult<Json<TokenResponse>> {
    let token = actions::issue_token(
        &body.email,
        &body.password,
        &state.jwt_service,
        &state.db_pool,
    )
    .await?;

    Ok(Json(TokenResponse { token }))
}
