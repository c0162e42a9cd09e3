//! # Router Module
//!
//! The router module provides the declarative route algebra: a closed tree of leaf
//! routes, merges and middleware wrappers, independent of how requests are matched.
//!
//! ## Overview
//!
//! A [`Router<C>`] is one of:
//!
//! - [`Router::Empty`] - matches nothing, the identity for [`merge`]
//! - [`Router::Route`] - a leaf: `/{version}/{path}`, a [`RouterMethod`] and a [`Handler`]
//! - [`Router::Merge`] - children in declaration order
//! - [`Router::Middleware`] - a child whose handlers are all wrapped by a [`Transform`]
//!
//! `C` is the per-request context every handler in the tree runs against. Handlers
//! declare what they need through capability traits (see [`crate::context`]), and a
//! composed router is usable with any context type implementing all of them.
//!
//! ## Example
//!
//! ```rust
//! use edgeroute::router::{handler, merge, middleware, route, RouteSpec, RouterMethod};
//! use edgeroute::response::ApiResponse;
//! use http::StatusCode;
//!
//! let hello = route(
//!     RouteSpec::new("hello", "v1", RouterMethod::Get),
//!     handler(|_ctx: std::sync::Arc<()>| async { Ok(ApiResponse::text(StatusCode::OK, "hi")) }),
//! );
//! let api = middleware(merge([hello]), |inner| inner);
//!
//! let routes = api.collect_routes();
//! assert_eq!(routes.len(), 1);
//! assert_eq!(routes[0].path, "/v1/hello");
//! ```
//!
//! ## Path Wildcards
//!
//! A path may contain one `:name` segment (`user/:email`). The router only records the
//! declared path; matching rules live in [`crate::dispatcher`], and handlers re-derive
//! the captured value with [`crate::request::get_path_params`].

mod core;

pub use self::core::{
    empty, handler, merge, middleware, route, Handler, Route, RouteSpec, Router, RouterMethod,
    Transform, UnsupportedMethod,
};
