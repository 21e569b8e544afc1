use service_core::{
    axum::{extract::State, response::IntoResponse, Json},
    error::AppError,
};

use crate::{
    dtos::{auth::ChangePasswordRequest, ApiResponse},
    middleware::CurrentUser,
    utils::ValidatedJson,
    AppState,
};

pub async fn change_password(
    State(state): State<AppState>,
    CurrentUser(identity): CurrentUser,
    ValidatedJson(req): ValidatedJson<ChangePasswordRequest>,
) -> Result<impl IntoResponse, AppError> {
    state.auth.change_password(identity.id, req).await?;
    Ok(Json(ApiResponse::with_message(
        "password changed",
        serde_json::Value::Null,
    )))
}
