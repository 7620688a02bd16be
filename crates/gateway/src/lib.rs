//! Gateway: the HTTP façade in front of the dispatcher.
//!
//! Lifecycle:
//! 1. Build the capability registry, block store and transports
//! 2. Bind the listener
//! 3. Run the initialization hook (webhook registration) when configured
//! 4. Serve `/telegram_respond`, `/answer` and the operational endpoints
//!
//! With the `metrics` feature every request is counted and timed; the
//! `prometheus` feature adds the `/metrics` scrape endpoint.
//!
//! Capability logic lives in `vocalis-tools`, selection in
//! `vocalis-auto-reply`; this crate only decodes, dispatches and encodes.

pub mod auth_middleware;
pub mod error;
pub mod metrics_middleware;
pub mod metrics_routes;
pub mod routes;
pub mod server;
pub mod state;

pub use {
    error::GatewayError,
    server::{AppState, build_gateway_app, start_gateway},
    state::GatewayState,
};
