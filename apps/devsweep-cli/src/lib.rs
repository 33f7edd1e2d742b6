//! devsweep CLI library
//!
//! This library exposes the command modules for integration testing.
//! The binary entry point is in main.rs.

pub mod commands;
pub mod config;
pub mod error;
pub mod formats;
pub mod logging;
