//! HTTP handlers for notescape-api.

pub mod analysis;
pub mod graph;
pub mod health;
pub mod notes;
pub mod search;
