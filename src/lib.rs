//! Library entry point for the termfolio crate.
//!
//! termfolio is a terminal-style landing page: a scripted typing intro
//! followed by a cached, refreshable list of project links fetched from a
//! JSON endpoint. Every subsystem is an actor spawned on the tokio runtime.

pub mod app;
pub mod config;
pub mod feed;
pub mod fs;
pub mod log;
pub mod net;
pub mod terminal;
pub mod utils;

pub use utils::*;

/// Default capacity of the mpsc channels backing the actors.
pub const BUFFER_SIZE: usize = 64;
