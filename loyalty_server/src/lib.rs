//! # Loyalty server
//! This crate hosts the binary that runs the loyalty accrual pipeline. It is responsible for:
//! * Reading the configuration from the environment.
//! * Connecting to the order database, and running migrations if asked to.
//! * Running the accrual pipeline until the process is asked to stop, and shutting it down cleanly.
//!
//! ## Configuration
//! The server is configured via environment variables. See [config](config/index.html) for more information.

pub mod cli;
pub mod config;
pub mod errors;
pub mod server;
