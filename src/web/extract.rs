use axum::extract::{FromRequest, FromRequestParts};

use crate::web::error::AppError;

/// `axum::Json` with rejections reported as `AppError`, so malformed bodies
/// get the same 400 + JSON error shape as everything else.
#[derive(FromRequest)]
#[from_request(via(axum::Json), rejection(AppError))]
pub struct JsonPayload<T>(pub T);

/// `axum::extract::Path` whose rejections become a JSON 404: an id that does
/// not parse cannot name an existing object.
#[derive(FromRequestParts)]
#[from_request(via(axum::extract::Path), rejection(AppError))]
pub struct PathParam<T>(pub T);
