use service_core::{
    axum::{extract::State, http::StatusCode, response::IntoResponse, Json},
    error::AppError,
};

use crate::{
    dtos::{auth::LoginRequest, ApiResponse},
    middleware::CurrentUser,
    utils::ValidatedJson,
    AppState,
};

/// Login with phone number and password
pub async fn login(
    State(state): State<AppState>,
    ValidatedJson(req): ValidatedJson<LoginRequest>,
) -> Result<impl IntoResponse, AppError> {
    let session = state.auth.login(req).await?;
    Ok((
        StatusCode::OK,
        Json(ApiResponse::with_message("login successful", session)),
    ))
}

/// Profile of the authenticated caller
pub async fn me(
    State(state): State<AppState>,
    CurrentUser(identity): CurrentUser,
) -> Result<impl IntoResponse, AppError> {
    let profile = state.auth.get_user(identity.id).await?;
    Ok(Json(ApiResponse::ok(profile)))
}
