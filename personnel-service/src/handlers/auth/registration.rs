use service_core::{
    axum::{extract::State, http::StatusCode, response::IntoResponse, Json},
    error::AppError,
};

use crate::{
    dtos::{auth::RegisterRequest, ApiResponse},
    utils::ValidatedJson,
    AppState,
};

/// Self-registration; the new account is an employee.
pub async fn register(
    State(state): State<AppState>,
    ValidatedJson(req): ValidatedJson<RegisterRequest>,
) -> Result<impl IntoResponse, AppError> {
    let session = state.auth.register(req).await?;
    Ok((
        StatusCode::CREATED,
        Json(ApiResponse::with_message("registration successful", session)),
    ))
}
