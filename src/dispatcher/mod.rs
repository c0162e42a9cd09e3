//! # Dispatcher Module
//!
//! The dispatcher interprets a [`Router`](crate::router::Router) tree into a flat,
//! immutable route table and matches requests against it.
//!
//! ## Overview
//!
//! [`RouterHandler::build`] runs once per program:
//!
//! 1. The tree is flattened in pre-order, merges expanded in place
//! 2. Middleware transforms are applied bottom-up, innermost first
//! 3. Every declared path is compiled into a [`PathPattern`]
//!
//! The resulting table is shared read-only across requests without locks.
//!
//! ## Request Flow
//!
//! 1. Keep only entries whose method equals the request method
//! 2. Take the first entry, in flattened order, whose pattern matches the pathname
//! 3. Run its handler, or fail with [`RouteNotFound`]
//!
//! ## Path Matching
//!
//! | Declared path        | Pattern                     | Matches                  |
//! |----------------------|-----------------------------|--------------------------|
//! | `/v1/user`           | exact                       | `/v1/user` only          |
//! | `/v1/user/:email`    | `^/v1/user/(.*)$`           | `/v1/user/a@b.c`, ...    |
//! | `/:anything`         | exact (leading `/:`)        | the literal `/:anything` |
//!
//! Because a wildcard requires the `/` after its prefix, `GET /v1/user` and
//! `GET /v1/user/:email` never shadow each other regardless of declaration order.

mod core;

pub use self::core::{FlatRoute, PathPattern, RouteNotFound, RouteTableError, RouterHandler};
