use super::core::around;
use crate::context::{HasClaims, HasRequest, HasTokens};
use crate::response::{error_response, ApiResponse};
use crate::router::Router;
use crate::security::{Claims, TokenError};
use http::header::AUTHORIZATION;
use http::StatusCode;
use std::sync::Arc;
use tracing::{debug, warn};

pub const NOT_AUTHORIZED: &str = "You are not authorized";
pub const ERROR_DECODING_TOKEN: &str = "Error decoding token";

/// Which callers a guarded route admits
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Access {
    Authenticated,
    Admin,
}

fn reject(status: StatusCode, message: &str) -> ApiResponse {
    error_response(message).with_status(status)
}

// Everything after the first `Bearer`, trimmed.
fn bearer_token(header: &str) -> Option<&str> {
    header
        .split_once("Bearer")
        .map(|(_, token)| token.trim())
        .filter(|token| !token.is_empty())
}

/// Check the request's bearer token.
///
/// - no `Authorization` header: `401 You are not authorized`
/// - header without a `Bearer` token: `400 Error decoding token`
/// - token that cannot be decoded: `401 Error decoding token`
/// - admin required but `isAdmin` is not set: `401 You are not authorized`
/// - bad signature or expired: `401 You are not authorized`
fn authenticate<C: HasRequest + HasTokens>(
    ctx: &C,
    access: Access,
) -> Result<Claims, ApiResponse> {
    let Some(header) = ctx.request().header(AUTHORIZATION.as_str()) else {
        debug!("Missing authorization header");
        return Err(reject(StatusCode::UNAUTHORIZED, NOT_AUTHORIZED));
    };
    let Some(token) = bearer_token(header) else {
        debug!("Authorization header carries no bearer token");
        return Err(reject(StatusCode::BAD_REQUEST, ERROR_DECODING_TOKEN));
    };

    let tokens = ctx.tokens();
    let decoded = tokens.decode(token).map_err(|e| {
        debug!(error = %e, "Bearer token could not be decoded");
        reject(StatusCode::UNAUTHORIZED, ERROR_DECODING_TOKEN)
    })?;
    if access == Access::Admin && !decoded.is_admin {
        warn!(email = %decoded.email, "Non-admin caller on admin route");
        return Err(reject(StatusCode::UNAUTHORIZED, NOT_AUTHORIZED));
    }

    tokens.verify(token).map_err(|e| {
        match e {
            TokenError::Malformed(_) => debug!(error = %e, "Bearer token malformed"),
            _ => warn!(error = %e, "Bearer token rejected"),
        }
        reject(StatusCode::UNAUTHORIZED, NOT_AUTHORIZED)
    })
}

fn guard<C>(child: Router<C>, access: Access) -> Router<C>
where
    C: HasRequest + HasTokens + HasClaims,
{
    around(child, move |ctx: Arc<C>, next| async move {
        match authenticate(ctx.as_ref(), access) {
            Ok(claims) => next.run(Arc::new(ctx.with_claims(claims))).await,
            Err(rejection) => Ok(rejection),
        }
    })
}

/// Require a valid bearer token on every route under `child`.
///
/// Handlers behind it find the verified claims through [`HasClaims::claims`].
pub fn auth_middleware<C>(child: Router<C>) -> Router<C>
where
    C: HasRequest + HasTokens + HasClaims,
{
    guard(child, Access::Authenticated)
}

/// Require a valid bearer token whose `isAdmin` claim is set
pub fn admin_middleware<C>(child: Router<C>) -> Router<C>
where
    C: HasRequest + HasTokens + HasClaims,
{
    guard(child, Access::Admin)
}
