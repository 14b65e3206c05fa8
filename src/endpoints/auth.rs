use axum::{extract::State, routing::post, Json, Router};
use serde::Deserialize;

use crate::error::Result;
use crate::services::users::{authenticate, UserResponse};
use crate::state::AppState;

/// Create auth routes
pub fn auth_routes(state: AppState) -> Router {
    Router::new()
        .route("/login", post(login))
        .with_state(state)
}

#[derive(Debug, Deserialize, utoipa::ToSchema)]
pub struct LoginRequest {
    #[serde(default)]
    pub email: String,
    #[serde(default)]
    pub password: String,
}

/// Check credentials and return the user record
#[utoipa::path(
    post,
    path = "/login",
    tag = "Auth",
    request_body = LoginRequest,
    responses(
        (status = 200, body = UserResponse),
        (status = 401, description = "Invalid credentials or inactive user")
    )
)]
pub async fn login(
    State(state): State<AppState>,
    Json(request): Json<LoginRequest>,
) -> Result<Json<UserResponse>> {
    let user = authenticate(&state.db, &request.email, &request.password).await?;
    Ok(Json(user))
}
