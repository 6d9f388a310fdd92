//! paperscope - client for academic paper analysis backends
//!
//! Picks an analysis backend from a prioritized list, either immediately
//! or by health-probing candidates and caching the first healthy one, and
//! sends API requests with per-backend timeouts, bounded failover and
//! persistent-failure tracking.

pub mod api;
pub mod cli;
pub mod clock;
pub mod config;
pub mod executor;
pub mod failure;
pub mod health;
pub mod logging;
pub mod registry;
pub mod resolver;
pub mod store;
