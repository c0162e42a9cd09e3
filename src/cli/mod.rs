//! # CLI Module
//!
//! Command-line host for the reference application.
//!
//! ## Commands
//!
//! ### `routes`
//!
//! Print the flattened route table in the order requests are matched against it:
//!
//! ```bash
//! edgeroute routes
//! ```
//!
//! ### `invoke`
//!
//! Build one request from flags, run it through the application backed by an
//! in-memory store, and print status, headers and body:
//!
//! ```bash
//! JWT_SECRET=dev edgeroute invoke -X POST https://edge.local/v1/user \
//!     -H 'X-EffEng-PSK: dev-key' \
//!     --body '{"name":"Ada","surname":"Lovelace","email":"ada@example.com","password":"pw"}'
//! ```
//!
//! Options:
//! - `-X, --method <METHOD>` - request method (default `GET`)
//! - `-H, --header <NAME: VALUE>` - request header, repeatable
//! - `-b, --body <BODY>` - request body, sent as JSON unless a `Content-Type` is given
//! - `-c, --config <FILE>` - TOML configuration; otherwise read from the environment

mod commands;

pub use commands::{build_request, parse_header, render_response, render_routes, run_cli, Cli, Commands};
