//! Client-side state machines for the Stagehand link-curation service.
//!
//! Layers, leaf first: `api` talks HTTP, `repository` turns wire data into domain
//! values and flattens failures, `controller` owns the view state that a rendering
//! layer subscribes to.

pub mod api;
pub mod config;
pub mod controller;
pub mod error;
pub mod logging;
pub mod repository;
pub mod version;

#[cfg(test)]
pub(crate) mod testing;

pub use stagehand_common::{dto, models};
