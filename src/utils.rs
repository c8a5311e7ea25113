use std::path::Path;
use std::sync::Arc;

/// Cheaply clonable shared string, passed between actors by reference count.
pub type ArcStr = Arc<str>;

/// Cheaply clonable shared path.
pub type ArcPath = Arc<Path>;

/// Replaces the standard panic hook with one that restores the terminal
/// before printing the panic, so a crash never leaves the user's shell in
/// raw mode on the alternate screen.
pub fn install_panic_hook() {
    let hook = std::panic::take_hook();
    std::panic::set_hook(Box::new(move |info| {
        ratatui::restore();
        hook(info);
    }));
}
