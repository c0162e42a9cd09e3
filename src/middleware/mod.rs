//! # Middleware Module
//!
//! Cross-cutting behavior applied to whole subtrees of a router.
//!
//! Middleware here is a router combinator: it takes a child [`Router`](crate::router::Router)
//! and returns one whose handlers are all wrapped. Two ways to write one:
//!
//! - [`around`] - an async function of `(ctx, next)`, free to answer early or to call
//!   `next` with an extended context
//! - [`Middleware`] + [`layer`] - `before`/`after` hooks around the handler
//!
//! Shipped middleware:
//!
//! - [`auth_middleware`] - requires a verified bearer token
//! - [`admin_middleware`] - additionally requires the `isAdmin` claim
//! - [`log_middleware`] - logs `Request: <METHOD> <URL>`, then status and latency
//!
//! When middlewares nest, the outermost one runs first at request time.

mod auth;
mod core;
mod tracing;

pub use auth::{admin_middleware, auth_middleware, ERROR_DECODING_TOKEN, NOT_AUTHORIZED};
pub use self::core::{around, layer, Middleware, Next};
pub use self::tracing::{log_middleware, TracingMiddleware};
