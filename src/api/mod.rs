//! HTTP layer: router, middleware, endpoint handlers, error mapping.

pub mod endpoints;
pub mod error;
pub mod middleware;
pub mod router;
pub mod types;
