//! Keepsake API server library.
//!
//! Exposes the building blocks (config, state, error handling, routes, the
//! publication engine, quota gate, and background jobs) so integration
//! tests and the binary entrypoint can both access them.

pub mod background;
pub mod config;
pub mod error;
pub mod handlers;
pub mod identity;
pub mod publish;
pub mod quota;
pub mod response;
pub mod routes;
pub mod slugs;
pub mod state;
