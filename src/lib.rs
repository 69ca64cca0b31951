//! # MCP Config Manager
//!
//! Local web editor for the Claude Desktop configuration file
//! (`claude_desktop_config.json`), which lists the MCP servers Claude starts:
//! their command, arguments, environment and whether they are disabled.
//!
//! ## Architecture
//!
//! - **Axum** serves a JSON API and the static browser UI
//! - **Serde** reads and writes the configuration, preserving key order and unknown fields
//! - **Tokio** runs blocking file access on its blocking pool
//!
//! ## Core Components
//!
//! - [`paths`]: per-OS location of the config file and backup naming
//! - [`validation`]: shape check that reports every issue with a JSON path
//! - [`store`]: load, back up and save the file
//! - [`presets`]: read-only catalog of server templates
//! - [`routes`]: HTTP handlers and router assembly
//! - [`middleware`]: security headers, CSRF check, request validation
//! - [`config`]: application settings (TOML, `.env`, environment)
//! - [`error`]: HTTP error responses
//! - [`metrics`]: request counters
//! - [`state`]: shared application state
//! - [`types`]: data model and DTOs

pub mod config;
pub mod error;
pub mod metrics;
pub mod middleware;
pub mod paths;
pub mod presets;
pub mod routes;
pub mod state;
pub mod store;
pub mod types;
pub mod validation;
