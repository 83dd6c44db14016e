//! ixctl - IXML-based GPU telemetry library
//!
//! Binds the Iluvatar CoreX management library (`libixml.so`) at
//! runtime and forwards enumeration, identification, and telemetry
//! calls to its resolved symbols.
//!
//! # Modules
//!
//! - [`cli`]: Command-line interface definitions
//! - [`commands`]: Command handlers
//! - [`domain`]: Typed telemetry values
//! - [`error`]: Error types
//! - [`ixml`]: Safe wrapper layer
//! - [`sys`]: Raw ABI and dynamic loader

pub mod cli;
pub mod commands;
pub mod domain;
pub mod error;
pub mod ixml;
pub mod sys;

#[cfg(test)]
pub mod mock;

pub use error::{IxmlError, Result};
pub use ixml::{GpuDevice, GpuManager, Ixml, IxmlDevice};
