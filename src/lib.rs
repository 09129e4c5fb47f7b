//! Offline-tolerant beer catalogue client.
//!
//! Beer lists come straight from the API. Images go through a cache-first
//! pipeline backed by a local SQLite store, so anything seen once keeps
//! loading without a network. See [`compose`] for how the pieces fit.

pub mod beer;
pub mod cache;
pub mod compose;
pub mod config;
pub mod http;
pub mod logging;
pub mod presentation;
pub mod task;

#[cfg(test)]
mod test_support;
