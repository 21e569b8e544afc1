//! Administrative user endpoints under `/api/pengguna`.
//!
//! Role restrictions are applied where the routes are mounted.

use service_core::{
    axum::{
        extract::State,
        http::StatusCode,
        response::IntoResponse,
        Json,
    },
    error::AppError,
};

use crate::{
    dtos::{pengguna::CreateUserRequest, ApiResponse},
    middleware::CurrentUser,
    utils::{ValidatedJson, ValidatedPath},
    AppState,
};

pub async fn create_user(
    State(state): State<AppState>,
    ValidatedJson(req): ValidatedJson<CreateUserRequest>,
) -> Result<impl IntoResponse, AppError> {
    let profile = state.auth.create_user(req).await?;
    Ok((
        StatusCode::CREATED,
        Json(ApiResponse::with_message("user created", profile)),
    ))
}

pub async fn get_user(
    State(state): State<AppState>,
    ValidatedPath(id): ValidatedPath<i32>,
) -> Result<impl IntoResponse, AppError> {
    let profile = state.auth.get_user(id).await?;
    Ok(Json(ApiResponse::ok(profile)))
}

pub async fn delete_user(
    State(state): State<AppState>,
    CurrentUser(identity): CurrentUser,
    ValidatedPath(id): ValidatedPath<i32>,
) -> Result<impl IntoResponse, AppError> {
    state.auth.deactivate_user(&identity, id).await?;
    Ok(Json(ApiResponse::with_message(
        "user deleted",
        serde_json::Value::Null,
    )))
}
