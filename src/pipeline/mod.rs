//! # Pipeline Module
//!
//! The typed-failure execution model that runs handlers and turns every way a request
//! can end into a response.
//!
//! ## Overview
//!
//! Every computation in the pipeline resolves to `Result<A, Cause<E>>`:
//!
//! - [`Cause::Fail`] - a declared failure of type `E` (for the dispatcher, [`RouteNotFound`](crate::dispatcher::RouteNotFound))
//! - [`Cause::Die`] - a [`Defect`]: an unexpected error or a captured panic
//!
//! Inner layers narrow typed failures with [`recover`]; the outermost layer wraps the
//! whole computation in [`sandbox`], which also turns panics into `Die`.
//!
//! ## Request Lifecycle
//!
//! ```text
//! Received -> Matching -> Matched -> Executing -> Succeeded
//!                |                         \----> FailedDefect --\
//!                \-> Unmatched (RouteNotFound) -> Recovered       +-> Sandboxed -> ErrorResponse
//!                                       \----> (asset I/O error) -/
//! ```
//!
//! [`Worker::handle_with_outcome`] reports the terminal state as an [`Outcome`].
//!
//! ## Error Reporting
//!
//! Captured causes are logged once at the sandbox boundary with `tracing::error!`,
//! including the full defect chain. The caller only ever sees
//! `500 {"error":"Internal server error"}`. Nothing is retried.

mod core;
mod worker;

pub use self::core::{recover, sandbox, Cause, Defect};
pub use worker::{not_found_response, ContextFactory, Outcome, Worker, INTERNAL_SERVER_ERROR};
