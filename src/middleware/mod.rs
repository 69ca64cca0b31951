//! Middleware components for HTTP request processing.
//!
//! Cross-cutting concerns layered around every route: response security
//! headers, CSRF protection for state-changing requests and early request
//! validation.

pub mod csrf;
pub mod security_headers;
pub mod validation;
