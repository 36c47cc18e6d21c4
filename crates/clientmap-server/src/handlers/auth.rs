//! Sign-up, sign-in and sign-out

use axum::{Json, extract::State, http::StatusCode};
use clientmap_core::AuthSession;
use serde::Deserialize;
use tracing::info;

use crate::app::{AppState, CurrentUser};
use crate::error::ApiError;

#[derive(Debug, Deserialize)]
pub struct SignUpRequest {
    pub email: String,
    pub password: String,
    pub confirm_password: String,
}

#[derive(Debug, Deserialize)]
pub struct SignInRequest {
    pub email: String,
    pub password: String,
}

/// Registration policy is checked before the provider sees the request
pub async fn sign_up(
    State(state): State<AppState>,
    Json(request): Json<SignUpRequest>,
) -> Result<(StatusCode, Json<AuthSession>), ApiError> {
    state
        .registration
        .validate(&request.email, &request.password, &request.confirm_password)?;
    let session = state
        .identity
        .sign_up(&request.email, &request.password)
        .await?;
    info!(uid = %session.user.uid, "New account registered");
    Ok((StatusCode::CREATED, Json(session)))
}

pub async fn sign_in(
    State(state): State<AppState>,
    Json(request): Json<SignInRequest>,
) -> Result<Json<AuthSession>, ApiError> {
    let session = state
        .identity
        .sign_in(&request.email, &request.password)
        .await?;
    Ok(Json(session))
}

pub async fn sign_out(
    State(state): State<AppState>,
    caller: CurrentUser,
) -> Result<StatusCode, ApiError> {
    state.identity.sign_out(&caller.token).await?;
    Ok(StatusCode::NO_CONTENT)
}
