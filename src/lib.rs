//! # edgeroute
//!
//! **edgeroute** is a declarative, composable request router for edge workers, with
//! runtime codecs for request and response bodies and a typed-failure execution pipeline
//! that turns every way a request can end into a response.
//!
//! ## Overview
//!
//! Routes are values. A program declares a tree of routes, merges and middleware once;
//! the tree is flattened into an immutable table, and each request is matched against it,
//! run against a per-request context, and sandboxed so that no failure escapes as
//! anything other than a well-formed response.
//!
//! ## Architecture
//!
//! - **[`codec`]** - bidirectional wire mappings with validation (`required`, `optional`,
//!   `intersection`, `array`) and the `{data}`/`{error}` envelope
//! - **[`request`]** / **[`response`]** - request/response types, body discrimination by
//!   content type, path and query helpers, envelope responses
//! - **[`router`]** - the route algebra: `route`, `merge`, `middleware`, `empty`
//! - **[`dispatcher`]** - flattening, path patterns, first-match dispatch
//! - **[`pipeline`]** - `Cause`/`Defect`, `sandbox`, `recover` and the [`Worker`](pipeline::Worker)
//! - **[`middleware`]** - `around`, before/after layers, auth, admin and logging middleware
//! - **[`context`]** - capability traits handlers use to declare dependencies
//! - **[`security`]** - bearer tokens and password hashing
//! - **[`storage`]** - key-value record storage
//! - **[`static_files`]** - static asset fallback
//! - **[`app`]** - the reference application: users, live streams, uploads
//! - **[`config`]** / **[`logging`]** - environment and tracing setup
//!
//! ### Request Handling Flow
//!
//! ```mermaid
//! sequenceDiagram
//!     participant Host
//!     participant Worker
//!     participant Dispatcher as RouterHandler
//!     participant MW as Middleware
//!     participant Handler
//!     participant Assets as StaticAssets
//!
//!     Host->>Worker: handle(ApiRequest)
//!     Worker->>Worker: build context
//!     Worker->>Dispatcher: handle(ctx)
//!     alt route matched
//!         Dispatcher->>MW: outermost transform
//!         MW->>Handler: ctx (possibly extended)
//!         Handler-->>MW: ApiResponse
//!         MW-->>Dispatcher: ApiResponse
//!     else RouteNotFound
//!         Worker->>Assets: fetch(request)
//!         Assets-->>Worker: asset or 404 Not Found
//!     end
//!     Note over Worker: panics and defects become<br/>500 {"error":"Internal server error"}
//!     Worker-->>Host: ApiResponse
//! ```
//!
//! ## Quick Start
//!
//! ```rust
//! use edgeroute::codec::{field, required, string};
//! use edgeroute::context::{HasRequest, HasStaticAssets};
//! use edgeroute::dispatcher::RouterHandler;
//! use edgeroute::pipeline::{Defect, Worker};
//! use edgeroute::request::{discriminate, ApiRequest};
//! use edgeroute::response::{data_response, ApiResponse};
//! use edgeroute::router::{handler, route, RouteSpec, RouterMethod};
//! use edgeroute::static_files::StaticAssets;
//! use std::sync::Arc;
//!
//! struct Ctx(ApiRequest);
//!
//! impl HasRequest for Ctx {
//!     fn request(&self) -> &ApiRequest {
//!         &self.0
//!     }
//! }
//!
//! impl HasStaticAssets for Ctx {
//!     fn static_assets(&self) -> Option<&dyn StaticAssets> {
//!         None
//!     }
//! }
//!
//! async fn greet(ctx: Arc<Ctx>) -> Result<ApiResponse, Defect> {
//!     let codec = required((field("name", string()),));
//!     let (name,) = discriminate(&codec, ctx.request()).map_err(Defect::new)?;
//!     Ok(data_response(&string(), format!("hello {name}")))
//! }
//!
//! # #[tokio::main]
//! # async fn main() {
//! let router = route(RouteSpec::new("greet", "v1", RouterMethod::Post), handler(greet));
//! let worker = Worker::new(RouterHandler::build(&router).unwrap(), |req| Ok(Ctx(req)));
//!
//! let req = ApiRequest::new(http::Method::POST, "https://edge.local/v1/greet")
//!     .unwrap()
//!     .with_json(&serde_json::json!({"name": "Ada"}));
//! let res = worker.handle(req).await;
//! assert_eq!(res.body_text(), r#"{"data":"hello Ada"}"#);
//! # }
//! ```
//!
//! ## Runtime Considerations
//!
//! The core never blocks and spawns nothing: every collaborator call is an `.await`
//! point run in program order on the host's executor. The route table is built once and
//! shared read-only across concurrent requests; contexts live for one request.
//! Timeouts and cancellation belong to the host.

pub mod app;
pub mod cli;
pub mod codec;
pub mod config;
pub mod context;
pub mod dispatcher;
pub mod ids;
pub mod logging;
pub mod middleware;
pub mod pipeline;
pub mod request;
pub mod response;
pub mod router;
pub mod security;
pub mod static_files;
pub mod storage;

pub use codec::{Codec, DecodeError};
pub use dispatcher::{RouteNotFound, RouterHandler};
pub use pipeline::{Cause, Defect, Worker};
pub use request::ApiRequest;
pub use response::ApiResponse;
pub use router::{merge, route, Router, RouterMethod};
