use axum::extract::FromRequest;

use crate::error::ApiError;

/// `axum::Json` whose rejection is an [`ApiError`], so malformed bodies get
/// the same `{"error": ...}` shape as every other failure.
#[derive(Debug, Clone, Copy, Default, FromRequest)]
#[from_request(via(axum::Json), rejection(ApiError))]
pub struct ApiJson<T>(pub T);
