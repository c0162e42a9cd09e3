use std::time::Duration;

use tracing::{info, info_span, Span};

use super::core::{layer, Middleware};
use crate::context::HasRequest;
use crate::response::ApiResponse;
use crate::router::Router;

/// Logs each request on the way in and its status and latency on the way out.
pub struct TracingMiddleware;

impl<C: HasRequest> Middleware<C> for TracingMiddleware {
    fn before(&self, ctx: &C) -> Option<ApiResponse> {
        let req = ctx.request();
        info!("Request: {} {}", req.method(), req.url());
        None
    }

    fn after(&self, _ctx: &C, res: &mut ApiResponse, latency: Duration) {
        info!(
            status = res.status().as_u16(),
            latency_ms = u64::try_from(latency.as_millis()).unwrap_or(u64::MAX),
            "Response"
        );
    }

    fn span(&self, ctx: &C) -> Span {
        let req = ctx.request();
        info_span!("handler", method = %req.method(), path = %req.pathname())
    }
}

/// Log every request handled under `child`
pub fn log_middleware<C: HasRequest>(child: Router<C>) -> Router<C> {
    layer(child, TracingMiddleware)
}
