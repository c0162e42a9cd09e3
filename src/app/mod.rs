//! # Application Module
//!
//! The reference edge program assembled from the router, middleware and pipeline.
//!
//! ## Routes
//!
//! | Method   | Path                 | Guard   | Handler                      |
//! |----------|----------------------|---------|------------------------------|
//! | `POST`   | `/v1/user`           | -       | [`user::create_user`]        |
//! | `GET`    | `/v1/foo`            | -       | [`foo`]                      |
//! | `POST`   | `/v1/login`          | -       | [`user::login_user`]         |
//! | `GET`    | `/v1/user/:email`    | auth    | [`user::get_user`]           |
//! | `POST`   | `/v1/upload.copy`    | auth    | [`upload::upload_from_url`]  |
//! | `POST`   | `/v1/create.stream`  | admin   | [`stream::create_stream`]    |
//! | `DELETE` | `/v1/delete.stream`  | admin   | [`stream::delete_stream`]    |
//!
//! Every route is wrapped by [`log_middleware`]. Requests no route accepts are served
//! from the static directory when one is configured, otherwise `404 Not Found`.
//!
//! ## Example
//!
//! ```rust,no_run
//! use edgeroute::app::{build_worker, Services};
//! use edgeroute::config::Env;
//! use edgeroute::request::ApiRequest;
//! use edgeroute::storage::MemoryStore;
//! use std::sync::Arc;
//!
//! # async fn run() -> anyhow::Result<()> {
//! let services = Services::from_env(Env::from_env()?, Arc::new(MemoryStore::new()))?;
//! let worker = build_worker(services)?;
//! let response = worker
//!     .handle(ApiRequest::new(http::Method::GET, "https://edge.example.com/v1/foo")?)
//!     .await;
//! assert_eq!(response.body_text(), "You're on foo");
//! # Ok(())
//! # }
//! ```

/// Declares a domain failure carrying a message, with a default message.
macro_rules! unable_to {
    ($name:ident, $default:literal) => {
        #[derive(Debug, Clone, PartialEq, Eq)]
        pub struct $name {
            message: String,
        }

        impl $name {
            pub fn new(message: impl Into<String>) -> Self {
                Self {
                    message: message.into(),
                }
            }

            pub fn message(&self) -> &str {
                &self.message
            }
        }

        impl Default for $name {
            fn default() -> Self {
                Self::new($default)
            }
        }

        impl std::fmt::Display for $name {
            fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
                f.write_str(&self.message)
            }
        }

        impl std::error::Error for $name {}
    };
}

pub mod cloudflare;
pub mod stream;
pub mod upload;
pub mod user;

use crate::config::Env;
use crate::context::{
    HasClaims, HasEnv, HasPasswordHasher, HasRequest, HasStaticAssets, HasStore, HasStreaming,
    HasTokens, HasUpload,
};
use crate::dispatcher::{RouteTableError, RouterHandler};
use crate::middleware::{admin_middleware, auth_middleware, log_middleware};
use crate::pipeline::{Defect, Worker};
use crate::request::ApiRequest;
use crate::response::{error_response, ApiResponse};
use crate::router::{handler, merge, route, RouteSpec, Router, RouterMethod};
use crate::security::{Claims, JwtTokens, PasswordHasher, Pbkdf2PasswordHasher, TokenService};
use crate::static_files::{StaticAssets, StaticFiles};
use crate::storage::KeyValueStore;
use cloudflare::CloudflareClient;
use http::StatusCode;
use std::sync::Arc;
use std::time::Duration;
use stream::{CloudflareStreaming, StreamingService};
use tracing::info;
use upload::{CloudflareUpload, UploadService};

/// API version prefix of every application route
pub const API_V1: &str = "v1";

/// `{"error": message}` with the given status
pub(crate) fn failure(status: StatusCode, message: &str) -> ApiResponse {
    error_response(message).with_status(status)
}

/// `GET /v1/foo`
pub async fn foo<C: HasRequest>(_ctx: Arc<C>) -> Result<ApiResponse, Defect> {
    info!("foo route called!");
    Ok(ApiResponse::text(StatusCode::OK, "You're on foo"))
}

/// Bounds a context must satisfy to run [`app_router`]
pub trait AppCapabilities:
    HasRequest
    + HasEnv
    + HasTokens
    + HasPasswordHasher
    + HasStore
    + HasStaticAssets
    + HasStreaming
    + HasUpload
    + HasClaims
{
}

impl<C> AppCapabilities for C where
    C: HasRequest
        + HasEnv
        + HasTokens
        + HasPasswordHasher
        + HasStore
        + HasStaticAssets
        + HasStreaming
        + HasUpload
        + HasClaims
{
}

fn v1(path: &str, method: RouterMethod) -> RouteSpec {
    RouteSpec::new(path, API_V1, method)
}

/// The application's route tree
pub fn app_router<C: AppCapabilities>() -> Router<C> {
    let public = merge([
        route(v1("user", RouterMethod::Post), handler(user::create_user::<C>)),
        route(v1("foo", RouterMethod::Get), handler(foo::<C>)),
        route(v1("login", RouterMethod::Post), handler(user::login_user::<C>)),
    ]);
    let authorized = merge([
        route(v1("user/:email", RouterMethod::Get), handler(user::get_user::<C>)),
        route(
            v1("upload.copy", RouterMethod::Post),
            handler(upload::upload_from_url::<C>),
        ),
    ]);
    let admin = merge([
        route(
            v1("create.stream", RouterMethod::Post),
            handler(stream::create_stream::<C>),
        ),
        route(
            v1("delete.stream", RouterMethod::Delete),
            handler(stream::delete_stream::<C>),
        ),
    ]);

    log_middleware(merge([
        public,
        auth_middleware(authorized),
        admin_middleware(admin),
    ]))
}

/// Long-lived collaborators shared by every request.
#[derive(Clone)]
pub struct Services {
    pub env: Arc<Env>,
    pub store: Arc<dyn KeyValueStore>,
    pub tokens: Arc<dyn TokenService>,
    pub password_hasher: Arc<dyn PasswordHasher>,
    pub static_assets: Option<Arc<dyn StaticAssets>>,
    pub streaming: Arc<dyn StreamingService>,
    pub upload: Arc<dyn UploadService>,
}

impl Services {
    /// Production collaborators for `env`, storing records in `store`.
    ///
    /// Tokens are HS256 signed with `jwt_secret`, passwords are hashed with
    /// [`Pbkdf2PasswordHasher`], and static assets are served from `static_dir` when set.
    ///
    /// # Errors
    ///
    /// Fails when the HTTP client for the streaming platform cannot be initialized.
    pub fn from_env(env: Env, store: Arc<dyn KeyValueStore>) -> Result<Self, reqwest::Error> {
        let client = CloudflareClient::from_env(&env)?;
        let tokens = JwtTokens::new(&env.jwt_secret, Duration::from_secs(env.token_ttl_secs));
        let static_assets = env
            .static_dir
            .as_ref()
            .map(|dir| Arc::new(StaticFiles::new(dir)) as Arc<dyn StaticAssets>);

        Ok(Self {
            env: Arc::new(env),
            store,
            tokens: Arc::new(tokens),
            password_hasher: Arc::new(Pbkdf2PasswordHasher),
            static_assets,
            streaming: Arc::new(CloudflareStreaming::new(client.clone())),
            upload: Arc::new(CloudflareUpload::new(client)),
        })
    }
}

impl std::fmt::Debug for Services {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Services")
            .field("env", &self.env)
            .field("static_assets", &self.static_assets.is_some())
            .finish_non_exhaustive()
    }
}

/// Per-request context of the application.
///
/// Cloning is cheap: the request and the services are shared.
#[derive(Clone)]
pub struct AppContext {
    services: Arc<Services>,
    request: Arc<ApiRequest>,
    claims: Option<Claims>,
}

impl AppContext {
    pub fn new(services: Arc<Services>, request: ApiRequest) -> Self {
        Self {
            services,
            request: Arc::new(request),
            claims: None,
        }
    }
}

impl HasRequest for AppContext {
    fn request(&self) -> &ApiRequest {
        &self.request
    }
}

impl HasEnv for AppContext {
    fn env(&self) -> &Env {
        &self.services.env
    }
}

impl HasTokens for AppContext {
    fn tokens(&self) -> &dyn TokenService {
        self.services.tokens.as_ref()
    }
}

impl HasPasswordHasher for AppContext {
    fn password_hasher(&self) -> &dyn PasswordHasher {
        self.services.password_hasher.as_ref()
    }
}

impl HasStore for AppContext {
    fn store(&self) -> &dyn KeyValueStore {
        self.services.store.as_ref()
    }
}

impl HasStaticAssets for AppContext {
    fn static_assets(&self) -> Option<&dyn StaticAssets> {
        self.services.static_assets.as_deref()
    }
}

impl HasStreaming for AppContext {
    fn streaming(&self) -> &dyn StreamingService {
        self.services.streaming.as_ref()
    }
}

impl HasUpload for AppContext {
    fn upload(&self) -> &dyn UploadService {
        self.services.upload.as_ref()
    }
}

impl HasClaims for AppContext {
    fn claims(&self) -> Option<&Claims> {
        self.claims.as_ref()
    }

    fn with_claims(&self, claims: Claims) -> Self {
        Self {
            claims: Some(claims),
            ..self.clone()
        }
    }
}

/// Build the application worker over `services`.
///
/// # Errors
///
/// Fails when a declared route path cannot be compiled.
pub fn build_worker(services: Services) -> Result<Worker<AppContext>, RouteTableError> {
    let router = RouterHandler::build(&app_router::<AppContext>())?;
    info!(routes = router.routes().len(), "Application routes loaded");
    let services = Arc::new(services);
    Ok(Worker::new(router, move |request| {
        Ok(AppContext::new(Arc::clone(&services), request))
    }))
}
