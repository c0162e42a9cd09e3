//! # Context Module
//!
//! Capability traits through which handlers declare what they need from the
//! per-request context.
//!
//! A handler generic over `C: HasRequest + HasTokens` can only run where the context
//! provides both; composing routers means picking one concrete context type that
//! implements the union of every leaf's bounds. The reference application's
//! [`AppContext`](crate::app::AppContext) is such a type.
//!
//! ```rust
//! use edgeroute::context::HasRequest;
//! use edgeroute::pipeline::Defect;
//! use edgeroute::response::ApiResponse;
//! use http::StatusCode;
//! use std::sync::Arc;
//!
//! async fn echo_path<C: HasRequest>(ctx: Arc<C>) -> Result<ApiResponse, Defect> {
//!     Ok(ApiResponse::text(StatusCode::OK, ctx.request().pathname()))
//! }
//! ```

use crate::app::stream::StreamingService;
use crate::app::upload::UploadService;
use crate::config::Env;
use crate::request::ApiRequest;
use crate::security::{Claims, PasswordHasher, TokenService};
use crate::static_files::StaticAssets;
use crate::storage::KeyValueStore;

/// Access to the request being handled
pub trait HasRequest: Send + Sync + 'static {
    fn request(&self) -> &ApiRequest;
}

/// Access to worker configuration
pub trait HasEnv: Send + Sync + 'static {
    fn env(&self) -> &Env;
}

/// Access to the bearer-token service
pub trait HasTokens: Send + Sync + 'static {
    fn tokens(&self) -> &dyn TokenService;
}

/// Access to the password hasher
pub trait HasPasswordHasher: Send + Sync + 'static {
    fn password_hasher(&self) -> &dyn PasswordHasher;
}

/// Access to record storage
pub trait HasStore: Send + Sync + 'static {
    fn store(&self) -> &dyn KeyValueStore;
}

/// Access to static assets
pub trait HasStaticAssets: Send + Sync + 'static {
    fn static_assets(&self) -> Option<&dyn StaticAssets>;
}

/// Access to the live-streaming platform
pub trait HasStreaming: Send + Sync + 'static {
    fn streaming(&self) -> &dyn StreamingService;
}

/// Access to the video upload platform
pub trait HasUpload: Send + Sync + 'static {
    fn upload(&self) -> &dyn UploadService;
}

/// Claims of an authenticated caller.
///
/// Authentication middleware verifies the bearer token and hands its handler a copy of
/// the context extended with the claims; handlers behind it read them back.
pub trait HasClaims: Send + Sync + 'static {
    /// Claims established by authentication, if any
    fn claims(&self) -> Option<&Claims>;

    /// A copy of this context carrying `claims`
    #[must_use]
    fn with_claims(&self, claims: Claims) -> Self
    where
        Self: Sized;
}
