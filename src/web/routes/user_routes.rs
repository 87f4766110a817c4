use axum::{extract::Extension, routing::get, Json, Router};
use std::sync::Arc;

use crate::web::models::{AuthenticatedUser, UserResponse};
use crate::web::{AppError, AppState};

async fn me_handler(
    Extension(user): Extension<AuthenticatedUser>,
) -> Result<Json<UserResponse>, AppError> {
    Ok(Json(UserResponse {
        id: user.id,
        email: user.email,
        name: user.name,
    }))
}

pub fn create_user_router() -> Router<Arc<AppState>> {
    Router::new().route("/me", get(me_handler))
}
