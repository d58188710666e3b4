use super::jwt::Authenticator;
use super::models::AuthContext;
use crate::error::HttpAppError;
use axum::{
    extract::{Request, State},
    middleware::Next,
    response::{IntoResponse, Response},
};
use std::sync::Arc;
use tubely_core::AppError;

#[derive(Clone)]
pub struct AuthState {
    pub authenticator: Arc<dyn Authenticator>,
}

/// Validate `Authorization: Bearer <jwt>` and attach an [`AuthContext`] to the request.
pub async fn auth_middleware(
    State(auth_state): State<Arc<AuthState>>,
    mut request: Request,
    next: Next,
) -> Response {
    let auth_header = match request
        .headers()
        .get("Authorization")
        .and_then(|h| h.to_str().ok())
    {
        Some(h) => h,
        None => {
            return HttpAppError(AppError::Authentication(
                "Missing authorization header".to_string(),
            ))
            .into_response();
        }
    };

    let token = match auth_header.strip_prefix("Bearer ") {
        Some(token) if !token.trim().is_empty() => token.trim().to_string(),
        _ => {
            return HttpAppError(AppError::Authentication(
                "Invalid authorization header format".to_string(),
            ))
            .into_response();
        }
    };

    match auth_state.authenticator.authenticate(&token).await {
        Ok(user_id) => {
            request.extensions_mut().insert(AuthContext { user_id });
            next.run(request).await
        }
        Err(e) => HttpAppError(e).into_response(),
    }
}
