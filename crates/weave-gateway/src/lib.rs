//! HTTP surface of the Weave dashboard: issue proxy, chat proxy, health probe
//! and the dashboard page, served from one axum router.
pub mod weave_gateway;

pub use weave_gateway::*;
