//! Bootstrap module for wiring the metadata services
//!
//! This module handles:
//! - Configuration loading
//! - Service initialization and dependency injection

pub mod config;
pub mod services;

pub use config::load_config;
pub use services::{init_services, Services};
