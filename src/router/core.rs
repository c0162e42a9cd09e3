use crate::pipeline::Defect;
use crate::response::ApiResponse;
use futures::future::BoxFuture;
use futures::FutureExt;
use http::Method;
use std::fmt;
use std::future::Future;
use std::str::FromStr;
use std::sync::Arc;

/// A route handler: an async computation over the shared per-request context.
///
/// Handlers never fail with a typed error; anything they cannot turn into a response
/// themselves is a [`Defect`].
pub type Handler<C> = Arc<dyn Fn(Arc<C>) -> BoxFuture<'static, Result<ApiResponse, Defect>> + Send + Sync>;

/// A middleware transform: wraps one handler into another.
pub type Transform<C> = Arc<dyn Fn(Handler<C>) -> Handler<C> + Send + Sync>;

/// Build a [`Handler`] from an async function or closure.
///
/// ```rust
/// use edgeroute::router::{handler, Handler};
/// use edgeroute::response::ApiResponse;
/// use http::StatusCode;
///
/// let h: Handler<()> = handler(|_ctx| async { Ok(ApiResponse::text(StatusCode::OK, "hi")) });
/// ```
pub fn handler<C, F, Fut>(f: F) -> Handler<C>
where
    C: Send + Sync + 'static,
    F: Fn(Arc<C>) -> Fut + Send + Sync + 'static,
    Fut: Future<Output = Result<ApiResponse, Defect>> + Send + 'static,
{
    Arc::new(move |ctx| f(ctx).boxed())
}

/// HTTP verbs a route can be declared for.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum RouterMethod {
    Get,
    Post,
    Put,
    Delete,
    Patch,
    Head,
    Options,
}

impl RouterMethod {
    /// All declarable verbs
    pub const ALL: [RouterMethod; 7] = [
        RouterMethod::Get,
        RouterMethod::Post,
        RouterMethod::Put,
        RouterMethod::Delete,
        RouterMethod::Patch,
        RouterMethod::Head,
        RouterMethod::Options,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            RouterMethod::Get => "GET",
            RouterMethod::Post => "POST",
            RouterMethod::Put => "PUT",
            RouterMethod::Delete => "DELETE",
            RouterMethod::Patch => "PATCH",
            RouterMethod::Head => "HEAD",
            RouterMethod::Options => "OPTIONS",
        }
    }

    /// Whether a request method is this verb
    pub fn matches(self, method: &Method) -> bool {
        method.as_str() == self.as_str()
    }
}

impl fmt::Display for RouterMethod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// The verb is not one a route can be declared for
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UnsupportedMethod(pub String);

impl fmt::Display for UnsupportedMethod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "unsupported method: {}", self.0)
    }
}

impl std::error::Error for UnsupportedMethod {}

impl FromStr for RouterMethod {
    type Err = UnsupportedMethod;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        RouterMethod::ALL
            .into_iter()
            .find(|m| m.as_str().eq_ignore_ascii_case(s))
            .ok_or_else(|| UnsupportedMethod(s.to_owned()))
    }
}

impl TryFrom<&Method> for RouterMethod {
    type Error = UnsupportedMethod;

    fn try_from(method: &Method) -> Result<Self, Self::Error> {
        method.as_str().parse()
    }
}

/// Where a route lives: `/{version}/{path}` for one verb.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RouteSpec {
    /// Path below the version segment, e.g. `user/:email`
    pub path: String,
    /// Version segment, e.g. `v1`
    pub version: String,
    pub method: RouterMethod,
}

impl RouteSpec {
    pub fn new(path: impl Into<String>, version: impl Into<String>, method: RouterMethod) -> Self {
        Self {
            path: path.into(),
            version: version.into(),
            method,
        }
    }

    /// Full declared path, `/{version}/{path}`
    pub fn full_path(&self) -> String {
        format!("/{}/{}", self.version, self.path.trim_start_matches('/'))
    }
}

/// A leaf route: path, verb and handler.
pub struct Route<C> {
    pub path: String,
    pub method: RouterMethod,
    pub handler: Handler<C>,
}

impl<C> Clone for Route<C> {
    fn clone(&self) -> Self {
        Self {
            path: self.path.clone(),
            method: self.method,
            handler: Arc::clone(&self.handler),
        }
    }
}

impl<C> fmt::Debug for Route<C> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Route")
            .field("method", &self.method)
            .field("path", &self.path)
            .finish_non_exhaustive()
    }
}

/// Declarative description of a route tree.
///
/// Building a router performs no matching and no I/O; the tree is interpreted once by
/// [`RouterHandler::build`](crate::dispatcher::RouterHandler::build).
pub enum Router<C> {
    /// Matches nothing
    Empty,
    /// A single leaf
    Route(Route<C>),
    /// Children in declaration order; earlier children take precedence
    Merge(Vec<Router<C>>),
    /// Every handler under `child` is wrapped by `transform`
    Middleware {
        child: Box<Router<C>>,
        transform: Transform<C>,
    },
}

impl<C> fmt::Debug for Router<C> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Router::Empty => f.write_str("Empty"),
            Router::Route(r) => r.fmt(f),
            Router::Merge(routes) => f.debug_tuple("Merge").field(routes).finish(),
            Router::Middleware { child, .. } => f
                .debug_struct("Middleware")
                .field("child", child)
                .finish_non_exhaustive(),
        }
    }
}

/// Router that matches nothing
pub fn empty<C>() -> Router<C> {
    Router::Empty
}

/// Single route at `/{version}/{path}`
pub fn route<C>(spec: RouteSpec, handler: Handler<C>) -> Router<C> {
    Router::Route(Route {
        path: spec.full_path(),
        method: spec.method,
        handler,
    })
}

/// Combine routers; on overlap the earlier router wins
pub fn merge<C>(routers: impl IntoIterator<Item = Router<C>>) -> Router<C> {
    Router::Merge(routers.into_iter().collect())
}

/// Wrap every handler under `child` with `transform`
pub fn middleware<C, T>(child: Router<C>, transform: T) -> Router<C>
where
    T: Fn(Handler<C>) -> Handler<C> + Send + Sync + 'static,
{
    Router::Middleware {
        child: Box::new(child),
        transform: Arc::new(transform),
    }
}

impl<C> Router<C> {
    /// Flatten into leaf routes with middleware applied.
    ///
    /// Order is a pre-order traversal with merges expanded in place. Transforms are
    /// applied bottom-up: a handler nested in two middlewares is wrapped by the inner
    /// one first, so the outer one runs first at request time.
    pub fn collect_routes(&self) -> Vec<Route<C>> {
        match self {
            Router::Empty => Vec::new(),
            Router::Route(r) => vec![r.clone()],
            Router::Merge(routers) => routers.iter().flat_map(Router::collect_routes).collect(),
            Router::Middleware { child, transform } => child
                .collect_routes()
                .into_iter()
                .map(|r| Route {
                    handler: transform(r.handler),
                    ..r
                })
                .collect(),
        }
    }
}
