use super::core::{recover, sandbox, Cause, Defect};
use crate::context::{HasRequest, HasStaticAssets};
use crate::dispatcher::{RouteNotFound, RouterHandler};
use crate::ids::RequestId;
use crate::request::ApiRequest;
use crate::response::{error_response, ApiResponse};
use crate::static_files::AssetError;
use futures::TryFutureExt;
use http::StatusCode;
use std::convert::Infallible;
use std::fmt;
use std::sync::Arc;
use tracing::{debug, error, info_span, Instrument};

/// Message sent to the caller for any failure that reaches the sandbox
pub const INTERNAL_SERVER_ERROR: &str = "Internal server error";

/// Builds the per-request context from the inbound request.
pub type ContextFactory<C> = Arc<dyn Fn(ApiRequest) -> Result<C, Defect> + Send + Sync>;

/// Terminal state of one request.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Outcome {
    /// A route matched and its handler produced the response
    Succeeded,
    /// No route matched; the static fallback or the plain 404 answered
    Recovered,
    /// A failure reached the sandbox and became a generic 500
    ErrorResponse,
}

impl fmt::Display for Outcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Outcome::Succeeded => "succeeded",
            Outcome::Recovered => "recovered",
            Outcome::ErrorResponse => "error_response",
        })
    }
}

/// `404 Not Found` in plain text
pub fn not_found_response() -> ApiResponse {
    ApiResponse::text(StatusCode::NOT_FOUND, "404 Not Found")
}

/// Host entry point: one request in, one response out, nothing escapes.
///
/// The worker owns the route table (built once) and a factory that assembles the
/// per-request context. Each call to [`Worker::handle`]:
///
/// 1. builds the context
/// 2. dispatches through the route table
/// 3. narrows `RouteNotFound` to the static fallback, then to a plain `404`
/// 4. sandboxes everything above, so typed failures, returned defects and panics all
///    end as `500 {"error":"Internal server error"}` with the cause logged
pub struct Worker<C> {
    router: RouterHandler<C>,
    context: ContextFactory<C>,
}

impl<C> Clone for Worker<C> {
    fn clone(&self) -> Self {
        Self {
            router: self.router.clone(),
            context: Arc::clone(&self.context),
        }
    }
}

impl<C: HasRequest + HasStaticAssets> Worker<C> {
    pub fn new<F>(router: RouterHandler<C>, context: F) -> Self
    where
        F: Fn(ApiRequest) -> Result<C, Defect> + Send + Sync + 'static,
    {
        Self {
            router,
            context: Arc::new(context),
        }
    }

    pub fn router(&self) -> &RouterHandler<C> {
        &self.router
    }

    /// Handle one request
    pub async fn handle(&self, request: ApiRequest) -> ApiResponse {
        self.handle_with_outcome(request).await.0
    }

    /// Handle one request and report how it ended
    pub async fn handle_with_outcome(&self, request: ApiRequest) -> (ApiResponse, Outcome) {
        let request_id = RequestId::from_header_or_new(request.header("x-request-id"));
        let span = info_span!(
            "request",
            request_id = %request_id,
            method = %request.method(),
            path = %request.pathname(),
        );

        let run = run(self.router.clone(), Arc::clone(&self.context), request);
        async move {
            match sandbox(run).await {
                Ok((response, outcome)) => {
                    debug!(status = response.status().as_u16(), %outcome, "Request finished");
                    (response, outcome)
                }
                Err(cause) => {
                    error!(cause = %cause, detail = ?cause, "Request failed");
                    (error_response(INTERNAL_SERVER_ERROR), Outcome::ErrorResponse)
                }
            }
        }
        .instrument(span)
        .await
    }
}

async fn run<C: HasRequest + HasStaticAssets>(
    router: RouterHandler<C>,
    context: ContextFactory<C>,
    request: ApiRequest,
) -> Result<(ApiResponse, Outcome), Cause<Infallible>> {
    let ctx = Arc::new(context(request)?);
    let dispatched = router
        .handle(Arc::clone(&ctx))
        .map_ok(|response| (response, Outcome::Succeeded));
    recover(dispatched, |not_found| fallback(ctx, not_found)).await
}

async fn fallback<C: HasRequest + HasStaticAssets>(
    ctx: Arc<C>,
    not_found: RouteNotFound,
) -> Result<(ApiResponse, Outcome), Cause<Infallible>> {
    debug!(%not_found, "Falling back to static assets");
    let response = match ctx.static_assets() {
        Some(assets) => match assets.fetch(ctx.request()).await {
            Ok(response) => response,
            Err(AssetError::NotFound(_)) => not_found_response(),
            Err(e @ AssetError::Io(_)) => return Err(Cause::Die(Defect::new(e))),
        },
        None => not_found_response(),
    };
    Ok((response, Outcome::Recovered))
}
