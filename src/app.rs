//! Application layer: the display state, the scripted typing intro, the
//! debounced manual refresh and the main event loop.

mod core;
pub mod debounce;
pub mod sequencer;
pub mod ui;

pub use core::{App, Command};
