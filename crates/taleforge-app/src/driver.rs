//! Frontend seam of the runtime.
//!
//! A [`Driver`] supplies input, a clock and a place to draw. The terminal and
//! the simulation harness each implement it, and [`crate::Runtime`] runs the
//! same loop over either.

use std::{future::Future, ops::Sub, time::Duration};

use crate::{App, AppEvent, Route};

/// Input, time and drawing for one session view.
///
/// Everything the [`Runtime`](crate::Runtime) needs from its surroundings
/// apart from the backend.
///
/// Gateway traffic does not go through the driver: requests are futures
/// produced by the [`Bridge`](crate::Bridge).
///
/// # Implementations
///
/// - **TUI**: Uses crossterm for terminal events and ratatui for drawing
/// - **Simulation**: Scripted input on a virtual clock
///
/// # Associated Types
///
/// - [`Error`](Driver::Error): Failure of the frontend's own I/O
/// - [`Instant`](Driver::Instant): Wall clock or virtual clock reading
pub trait Driver: Send {
    /// Frontend I/O failure. Ends the run.
    type Error: std::error::Error + Send + 'static;

    /// Clock reading. Only differences are used, as typing time.
    type Instant: Copy + Ord + Send + Sync + Sub<Output = Duration>;

    /// Wait for the next key or resize.
    ///
    /// Returns an available event, or `None` after a short idle period so the
    /// runtime can advance typing. The future may be dropped before it
    /// completes when a gateway reply arrives first, so it must not lose
    /// input when cancelled.
    fn poll_event(&mut self) -> impl Future<Output = Result<Option<AppEvent>, Self::Error>> + Send;

    /// Current time instant.
    fn now(&self) -> Self::Instant;

    /// Draw the current view.
    ///
    /// # Errors
    ///
    /// Returns an error if the frame cannot be drawn.
    fn render(&mut self, app: &App) -> Result<(), Self::Error>;

    /// Leave the session view for `route`, showing `reason` if present.
    ///
    /// # Errors
    ///
    /// Returns an error if the notice cannot be shown.
    fn navigate(&mut self, route: Route, reason: Option<&str>) -> Result<(), Self::Error>;

    /// Release platform resources. Called exactly once, after the loop ends.
    fn stop(&mut self);

    /// The loop has ended but `requests` replies are still outstanding and
    /// will be awaited before the run returns. Called after [`stop`], and
    /// only if something is outstanding.
    ///
    /// [`stop`]: Driver::stop
    fn draining(&mut self, requests: usize) {
        let _ = requests;
    }
}
