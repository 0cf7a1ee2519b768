//! Terminal-agnostic keyboard input.

/// Keyboard input abstraction.
///
/// Decouples the turn controller from terminal libraries so simulations can
/// type into a session without a terminal.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum KeyInput {
    /// Printable character.
    Char(char),
    /// Enter/Return key (skip, continue or submit, depending on mode).
    Enter,
    /// Backspace key (delete character before cursor).
    Backspace,
    /// Delete key (delete character at cursor).
    Delete,
    /// Escape key (dismiss notice, otherwise leave the session).
    Esc,
    /// Left arrow key.
    Left,
    /// Right arrow key.
    Right,
    /// Up arrow key (previous suggestion).
    Up,
    /// Down arrow key (next suggestion).
    Down,
    /// Home key (cursor to start).
    Home,
    /// End key (cursor to end).
    End,
    /// Tab key (open or close the session-info panel).
    Tab,
}
