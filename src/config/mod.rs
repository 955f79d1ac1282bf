//! Configuration module for episode-finder
//!
//! This module defines the application configuration and config file lookup.

pub mod app_config;
pub mod path_resolver;

pub use app_config::{AppConfig, ConfigOverrides};
