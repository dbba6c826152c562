//! Middleware for protecting authenticated routes.
//!
//! The gate resolves the session cookie into a user and attaches it to the
//! request context; the request never reaches the handler otherwise.

use crate::api::AppState;
use crate::api::context::RequestContext;
use crate::errors::{ApiError, SessionError, StoreError};
use axum::{Extension, extract::Request, middleware::Next, response::Response};

/// Session authentication middleware
pub async fn authenticate_user(
    Extension(state): Extension<AppState>,
    mut request: Request,
    next: Next,
) -> Result<Response, ApiError> {
    let session = state
        .sessions
        .resolve_session(request.headers())
        .map_err(|e| {
            if !matches!(e, SessionError::Unauthenticated) {
                tracing::error!("Session resolution failed: {}", e);
            }
            ApiError::from(e)
        })?;

    let user = match state.users.find_by_id(session.user_id).await {
        Ok(user) => user,
        Err(StoreError::NotFound) => {
            tracing::debug!("Session refers to missing user {}", session.user_id);
            return Err(ApiError::not_authenticated());
        }
        Err(e) => {
            tracing::error!("User lookup for session failed: {}", e);
            return Err(ApiError::internal(e.to_string()));
        }
    };

    match request.extensions_mut().get_mut::<RequestContext>() {
        Some(context) => context.user = Some(user),
        None => {
            let context = RequestContext {
                user: Some(user),
                ..RequestContext::default()
            };
            request.extensions_mut().insert(context);
        }
    }

    Ok(next.run(request).await)
}
