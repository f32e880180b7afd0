#![doc = include_str!("../../../README.md")]
//!

//! This crate bundles the result-table pipeline with the dashboard server.

pub use borderhub_core::*;
pub use borderhub_server as server;
