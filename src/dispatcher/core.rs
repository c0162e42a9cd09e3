use crate::context::HasRequest;
use crate::pipeline::Cause;
use crate::response::ApiResponse;
use crate::router::{Handler, Router, RouterMethod};
use futures::future::BoxFuture;
use futures::FutureExt;
use http::Method;
use regex::Regex;
use std::fmt;
use std::sync::Arc;
use tracing::{debug, info};

/// No flattened route accepts the request's method and pathname.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RouteNotFound {
    pub method: Method,
    pub path: String,
}

impl fmt::Display for RouteNotFound {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "RouteNotFound: {} {}", self.method, self.path)
    }
}

impl std::error::Error for RouteNotFound {}

/// The declared path could not be compiled into a matcher.
#[derive(Debug)]
pub struct RouteTableError {
    pub path: String,
    pub source: regex::Error,
}

impl fmt::Display for RouteTableError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "invalid route path {}: {}", self.path, self.source)
    }
}

impl std::error::Error for RouteTableError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        Some(&self.source)
    }
}

/// How a flattened route's path is matched against a request pathname.
#[derive(Debug, Clone)]
pub enum PathPattern {
    /// Whole-string equality
    Exact(String),
    /// `^<prefix>/(.*)$`, for paths with a `:name` segment after the first character
    Wildcard(Regex),
}

impl PathPattern {
    /// Compile a declared path.
    ///
    /// A path containing `/:` anywhere but at position 0 becomes a wildcard over
    /// everything below the text preceding the first `/:`. Any other path, including one
    /// that starts with `/:`, matches literally.
    ///
    /// # Errors
    ///
    /// Returns the regex error if the wildcard pattern fails to compile.
    pub fn compile(path: &str) -> Result<Self, regex::Error> {
        match path.find("/:") {
            Some(idx) if idx > 0 => {
                let prefix = &path[..idx];
                let re = Regex::new(&format!("^{}/(.*)$", regex::escape(prefix)))?;
                Ok(PathPattern::Wildcard(re))
            }
            _ => Ok(PathPattern::Exact(path.to_owned())),
        }
    }

    pub fn is_match(&self, pathname: &str) -> bool {
        match self {
            PathPattern::Exact(p) => p == pathname,
            PathPattern::Wildcard(re) => re.is_match(pathname),
        }
    }
}

/// One entry of the flattened table.
pub struct FlatRoute<C> {
    pub method: RouterMethod,
    /// Path as declared, e.g. `/v1/user/:email`
    pub path: String,
    pub pattern: PathPattern,
    pub handler: Handler<C>,
}

impl<C> fmt::Debug for FlatRoute<C> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("FlatRoute")
            .field("method", &self.method)
            .field("path", &self.path)
            .field("pattern", &self.pattern)
            .finish_non_exhaustive()
    }
}

/// Immutable, flattened route table with first-match dispatch.
///
/// Built once per program; share it behind an `Arc` across concurrent requests.
pub struct RouterHandler<C> {
    routes: Arc<[FlatRoute<C>]>,
}

impl<C> Clone for RouterHandler<C> {
    fn clone(&self) -> Self {
        Self {
            routes: Arc::clone(&self.routes),
        }
    }
}

impl<C: HasRequest> RouterHandler<C> {
    /// Flatten `router` and compile every path.
    ///
    /// # Errors
    ///
    /// Returns [`RouteTableError`] if a declared path cannot be compiled.
    pub fn build(router: &Router<C>) -> Result<Self, RouteTableError> {
        let routes = router
            .collect_routes()
            .into_iter()
            .map(|r| {
                let pattern = PathPattern::compile(&r.path).map_err(|source| RouteTableError {
                    path: r.path.clone(),
                    source,
                })?;
                Ok(FlatRoute {
                    method: r.method,
                    path: r.path,
                    pattern,
                    handler: r.handler,
                })
            })
            .collect::<Result<Vec<_>, RouteTableError>>()?;

        info!(routes_count = routes.len(), "Route table built");
        for r in &routes {
            debug!(method = %r.method, path = %r.path, "Route registered");
        }

        Ok(Self {
            routes: routes.into(),
        })
    }

    /// Flattened routes in match order
    pub fn routes(&self) -> &[FlatRoute<C>] {
        &self.routes
    }

    /// First route, in flattened order, for `method` whose pattern matches `pathname`
    pub fn find(&self, method: &Method, pathname: &str) -> Option<&FlatRoute<C>> {
        self.routes
            .iter()
            .filter(|r| r.method.matches(method))
            .find(|r| r.pattern.is_match(pathname))
    }

    /// Dispatch the context's request.
    ///
    /// Resolves to the matched handler's result, or fails with [`RouteNotFound`].
    pub fn handle(&self, ctx: Arc<C>) -> BoxFuture<'static, Result<ApiResponse, Cause<RouteNotFound>>> {
        let request = ctx.request();
        let method = request.method().clone();
        let pathname = request.pathname().to_owned();

        match self.find(&method, &pathname) {
            // method is re-checked on the matched entry
            Some(route) if route.method.matches(&method) => {
                debug!(method = %method, path = %pathname, route = %route.path, "Route matched");
                let handler = Arc::clone(&route.handler);
                async move { handler(ctx).await.map_err(Cause::Die) }.boxed()
            }
            _ => {
                debug!(method = %method, path = %pathname, "Route not found");
                futures::future::ready(Err(Cause::Fail(RouteNotFound {
                    method,
                    path: pathname,
                })))
                .boxed()
            }
        }
    }
}
