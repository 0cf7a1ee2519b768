//! Generic runtime for application orchestration.
//!
//! The Runtime drives the application event loop, coordinating between:
//! - [`App`]: Turn controller
//! - [`Bridge`]: Gateway requests
//! - [`Driver`]: Platform-specific I/O

use std::pin::pin;

use futures::{
    StreamExt,
    future::{BoxFuture, Either, select},
    stream::FuturesUnordered,
};
use taleforge_client::Gateway;

use crate::{App, AppAction, AppEvent, Bridge, Driver, SessionOrigin};

/// Generic runtime that orchestrates App, Bridge, and Driver.
///
/// # Type Parameters
///
/// - `D`: Platform-specific I/O driver
/// - `G`: Backend gateway
pub struct Runtime<D, G>
where
    D: Driver,
    G: Gateway,
{
    driver: D,
    app: App,
    bridge: Bridge<G>,
    origin: Option<SessionOrigin>,
    started: D::Instant,
    pending: FuturesUnordered<BoxFuture<'static, AppEvent>>,
}

impl<D, G> Runtime<D, G>
where
    D: Driver,
    G: Gateway,
{
    /// Create a runtime that opens `app` with `origin` when run.
    pub fn new(driver: D, app: App, bridge: Bridge<G>, origin: SessionOrigin) -> Self {
        let started = driver.now();
        Self {
            driver,
            app,
            bridge,
            origin: Some(origin),
            started,
            pending: FuturesUnordered::new(),
        }
    }

    /// Run the main event loop until the view quits or navigates away.
    ///
    /// Each cycle waits for whichever comes first: driver input (or an idle
    /// tick) or a gateway reply. On exit the driver is stopped and requests
    /// still in flight are awaited (the driver is told how many), then handed
    /// to the closed App, which discards them. Returns the final App.
    ///
    /// # Errors
    ///
    /// Returns an error if the driver encounters an I/O error.
    pub async fn run(mut self) -> Result<App, D::Error> {
        let result = self.event_loop().await;

        self.app.close();
        self.driver.stop();

        let outstanding = self.pending.len();
        if outstanding > 0 {
            tracing::info!(requests = outstanding, "waiting for in-flight requests to settle");
            self.driver.draining(outstanding);
        }
        while let Some(event) = self.pending.next().await {
            let _ = self.app.handle(event);
        }

        result.map(|()| self.app)
    }

    async fn event_loop(&mut self) -> Result<(), D::Error> {
        self.driver.render(&self.app)?;
        if let Some(origin) = self.origin.take() {
            let actions = self.app.open(origin);
            if self.process_actions(actions)? {
                return Ok(());
            }
        }

        loop {
            let should_quit = self.process_cycle().await?;
            if should_quit {
                return Ok(());
            }
        }
    }

    /// Process one cycle of the event loop.
    ///
    /// Returns `true` if the application should quit.
    async fn process_cycle(&mut self) -> Result<bool, D::Error> {
        let event = if self.pending.is_empty() {
            self.driver.poll_event().await?
        } else {
            let input = pin!(self.driver.poll_event());
            match select(self.pending.next(), input).await {
                Either::Left((reply, _)) => reply,
                Either::Right((input, _)) => input?,
            }
        };

        let event =
            event.unwrap_or_else(|| AppEvent::Tick { now: self.driver.now() - self.started });
        let actions = self.app.handle(event);
        self.process_actions(actions)
    }

    /// Process actions returned by the App.
    ///
    /// Returns `true` if should quit.
    fn process_actions(&mut self, actions: Vec<AppAction>) -> Result<bool, D::Error> {
        let mut quit = false;
        for action in actions {
            match action {
                AppAction::Render => self.driver.render(&self.app)?,
                AppAction::Quit => quit = true,
                AppAction::Dispatch { ticket, request } => {
                    self.pending.push(self.bridge.dispatch(ticket, request));
                },
                AppAction::Navigate { route, reason } => {
                    tracing::info!(?route, ?reason, "leaving session view");
                    self.driver.navigate(route, reason.as_deref())?;
                    quit = true;
                },
                AppAction::ForgetCredentials => self.bridge.forget_credentials(),
            }
        }
        Ok(quit)
    }
}
