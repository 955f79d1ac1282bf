//! API module for episode-finder
//!
//! Serves discussion lookups over HTTP.

pub mod models;
pub mod server;

pub use server::{router, serve, AppState};
