//! Authentication middleware
//!
//! JWT authentication and the Administrator gate

use axum::{
    extract::{Request, State},
    http::{header::AUTHORIZATION, request::Parts},
    middleware::Next,
    response::{IntoResponse, Response},
};

use crate::error::AppError;
use crate::services::auth::decode_access_token;
use crate::AppState;
use shared::access::{authorize, Identity, ADMINISTRATOR};

/// Authentication middleware that validates JWT tokens
///
/// On success the caller's `Identity` is stored in the request extensions
/// for the extractors below.
pub async fn auth_middleware(
    State(state): State<AppState>,
    mut request: Request,
    next: Next,
) -> Response {
    let auth_header = request
        .headers()
        .get(AUTHORIZATION)
        .and_then(|h| h.to_str().ok());

    let token = match auth_header.and_then(|h| h.strip_prefix("Bearer ")) {
        Some(token) => token,
        None => return unauthorized("Missing or invalid Authorization header"),
    };

    let identity = match decode_access_token(token, &state.config.jwt.secret) {
        Ok(claims) => match claims.identity() {
            Some(identity) => identity,
            None => return unauthorized("Invalid user ID in token"),
        },
        Err(err) => return err.into_response(),
    };

    request.extensions_mut().insert(identity);

    next.run(request).await
}

fn unauthorized(message: &str) -> Response {
    AppError::Unauthorized {
        message: message.to_string(),
    }
    .into_response()
}

/// Extractor for authenticated user
/// Use this in handlers to get the current user
#[derive(Clone, Debug)]
pub struct CurrentUser(pub Identity);

#[axum::async_trait]
impl<S> axum::extract::FromRequestParts<S> for CurrentUser
where
    S: Send + Sync,
{
    type Rejection = AppError;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        let identity = authorize(parts.extensions.get::<Identity>(), None)?;
        Ok(CurrentUser(identity.clone()))
    }
}

/// Extractor for a caller holding the Administrator role
#[derive(Clone, Debug)]
pub struct AdminUser(pub Identity);

#[axum::async_trait]
impl<S> axum::extract::FromRequestParts<S> for AdminUser
where
    S: Send + Sync,
{
    type Rejection = AppError;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        let identity = authorize(parts.extensions.get::<Identity>(), Some(ADMINISTRATOR))?;
        Ok(AdminUser(identity.clone()))
    }
}
