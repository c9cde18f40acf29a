use axum::extract::{Query, Request};
use axum::middleware::Next;
use axum::response::{IntoResponse, Response};
use serde::Deserialize;

use crate::error::AppError;

#[derive(Deserialize)]
pub struct TokenQuery {
    token: Option<String>,
}

/// Rejects requests that carry no `token` query parameter. The token itself
/// is not verified.
pub async fn require_token(Query(query): Query<TokenQuery>, req: Request, next: Next) -> Response {
    match query.token.as_deref().map(str::trim) {
        Some(token) if !token.is_empty() => next.run(req).await,
        _ => AppError::Unauthorized("Missing token".to_string()).into_response(),
    }
}
