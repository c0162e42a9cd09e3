use crate::pipeline::Defect;
use crate::response::ApiResponse;
use crate::router::{middleware, Handler, Router};
use futures::FutureExt;
use std::future::Future;
use std::sync::Arc;
use std::time::{Duration, Instant};
use tracing::{Instrument, Span};

/// Hook-style middleware: inspect the context before the handler, the response after.
///
/// Returning a response from [`before`](Middleware::before) short-circuits the handler
/// and skips [`after`](Middleware::after).
pub trait Middleware<C>: Send + Sync + 'static {
    fn before(&self, _ctx: &C) -> Option<ApiResponse> {
        None
    }

    fn after(&self, _ctx: &C, _res: &mut ApiResponse, _latency: Duration) {}

    /// Span the handler runs in
    fn span(&self, _ctx: &C) -> Span {
        Span::current()
    }
}

/// Apply a hook-style [`Middleware`] to every handler under `child`
pub fn layer<C, M>(child: Router<C>, mw: M) -> Router<C>
where
    C: Send + Sync + 'static,
    M: Middleware<C>,
{
    let mw = Arc::new(mw);
    middleware(child, move |inner: Handler<C>| -> Handler<C> {
        let mw = Arc::clone(&mw);
        Arc::new(move |ctx: Arc<C>| {
            let mw = Arc::clone(&mw);
            let inner = Arc::clone(&inner);
            async move {
                if let Some(early) = mw.before(&ctx) {
                    return Ok(early);
                }
                let span = mw.span(&ctx);
                let start = Instant::now();
                let mut res = inner(Arc::clone(&ctx)).instrument(span).await?;
                mw.after(&ctx, &mut res, start.elapsed());
                Ok(res)
            }
            .boxed()
        })
    })
}

/// The rest of the handler chain, handed to an [`around`] function.
pub struct Next<C> {
    handler: Handler<C>,
}

impl<C> Next<C> {
    /// Run the wrapped handler with `ctx`
    pub async fn run(self, ctx: Arc<C>) -> Result<ApiResponse, Defect> {
        (self.handler)(ctx).await
    }
}

/// Wrap every handler under `child` with an async function of `(ctx, next)`.
///
/// The function decides whether, and with which context, to call `next`. It can answer
/// on its own (an authentication failure), or pass an extended context down.
///
/// ```rust
/// use edgeroute::middleware::around;
/// use edgeroute::response::ApiResponse;
/// use edgeroute::router::{handler, route, RouteSpec, RouterMethod};
/// use http::StatusCode;
///
/// let api = route(
///     RouteSpec::new("ping", "v1", RouterMethod::Get),
///     handler(|_ctx: std::sync::Arc<()>| async { Ok(ApiResponse::text(StatusCode::OK, "pong")) }),
/// );
/// let api = around(api, |ctx, next| async move {
///     next.run(ctx)
///         .await
///         .map(|res| res.with_header("x-served-by", "edge"))
/// });
/// assert_eq!(api.collect_routes().len(), 1);
/// ```
pub fn around<C, F, Fut>(child: Router<C>, f: F) -> Router<C>
where
    C: Send + Sync + 'static,
    F: Fn(Arc<C>, Next<C>) -> Fut + Send + Sync + 'static,
    Fut: Future<Output = Result<ApiResponse, Defect>> + Send + 'static,
{
    let f = Arc::new(f);
    middleware(child, move |inner: Handler<C>| -> Handler<C> {
        let f = Arc::clone(&f);
        Arc::new(move |ctx: Arc<C>| {
            let next = Next {
                handler: Arc::clone(&inner),
            };
            f(ctx, next).boxed()
        })
    })
}
