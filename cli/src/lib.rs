//! Invitely CLI library
//!
//! Exposes the command implementations so they can be tested without
//! spawning the binary.

#![forbid(unsafe_code)]

pub mod commands;
pub mod config;

pub use commands::*;
pub use config::*;
