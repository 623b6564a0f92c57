//! Kiosk Event Loop
//!
//! The single cooperative loop that owns all display state. It waits on
//! exactly three things: shutdown, the next poll result, and the next
//! animation deadline. Everything else (mapping, change detection, event
//! fan-out, orchestration) runs synchronously inside one loop turn, so no
//! two transitions ever interleave.
//!
//! ```text
//! poll result ─▶ ResponseMapper ─▶ ChangeDetector ─▶ EventEmitter (listeners)
//!                                                 └▶ Orchestrator ─▶ DisplayCommand ─▶ surface
//! animation deadline ─────────────────────────────────▶ Orchestrator ─┘
//! ```

use std::sync::Arc;
use std::time::Duration;

use tokio::sync::{mpsc, watch};
use tokio::time::{sleep_until, Instant};

use crate::backend::{BookingSource, FetchError};
use crate::booking::{CurrentBooking, UpcomingBookings};
use crate::config::DisplayConfig;
use crate::detector::ChangeDetector;
use crate::events::{BookingEvent, EventEmitter};
use crate::mapper::ResponseMapper;
use crate::messages::DisplayCommand;
use crate::orchestrator::Orchestrator;
use crate::payload::BookingPayload;
use crate::poller::{PollStats, Poller};

/// The display core
pub struct Kiosk<S: BookingSource + ?Sized + 'static> {
    poller: Poller<S>,
    mapper: ResponseMapper,
    detector: ChangeDetector,
    emitter: EventEmitter,
    orchestrator: Orchestrator,
    tx: mpsc::Sender<DisplayCommand>,
    origin: Instant,
    failing: bool,
}

impl<S: BookingSource + ?Sized + 'static> Kiosk<S> {
    /// Create a kiosk polling `source` and rendering to `tx`
    pub fn new(source: Arc<S>, config: &DisplayConfig, tx: mpsc::Sender<DisplayCommand>) -> Self {
        Self {
            poller: Poller::new(source, config.api.poll_interval),
            mapper: ResponseMapper::new(config),
            detector: ChangeDetector::new(),
            emitter: EventEmitter::new(),
            orchestrator: Orchestrator::new(config),
            tx,
            origin: Instant::now(),
            failing: false,
        }
    }

    /// Receive every booking event the kiosk emits
    pub fn subscribe(&mut self) -> mpsc::UnboundedReceiver<BookingEvent> {
        self.emitter.subscribe()
    }

    /// The orchestrator (for inspection)
    #[must_use]
    pub fn orchestrator(&self) -> &Orchestrator {
        &self.orchestrator
    }

    /// Poll counters
    #[must_use]
    pub fn poll_stats(&self) -> PollStats {
        self.poller.stats()
    }

    /// Run until `shutdown` turns true or its sender is dropped
    ///
    /// # Errors
    ///
    /// Returns an error if the display surface stops receiving commands.
    pub async fn run(&mut self, mut shutdown: watch::Receiver<bool>) -> anyhow::Result<()> {
        self.origin = Instant::now();
        let frame = self.orchestrator.initial_frame();
        self.send_all(frame).await?;

        self.poller.start();
        tracing::info!("Kiosk running");

        while !*shutdown.borrow() {
            let deadline = self
                .orchestrator
                .next_deadline()
                .map(|ms| self.origin + Duration::from_millis(ms));

            tokio::select! {
                biased;

                changed = shutdown.changed() => {
                    if changed.is_err() {
                        break;
                    }
                }

                outcome = self.poller.next_outcome() => {
                    let now = self.now_ms();
                    let commands = self.apply_outcome(outcome, now);
                    self.send_all(commands).await?;
                }

                () = wait_for(deadline) => {
                    let now = self.now_ms();
                    let commands = self.orchestrator.advance(now);
                    self.send_all(commands).await?;
                }
            }
        }

        self.poller.stop();
        tracing::info!(
            polls = self.poller.stats().completed,
            "Kiosk stopped"
        );
        Ok(())
    }

    /// Map, filter and dispatch one poll result
    fn apply_outcome(
        &mut self,
        outcome: Result<BookingPayload, FetchError>,
        now_ms: u64,
    ) -> Vec<DisplayCommand> {
        match outcome {
            Ok(payload) => {
                if self.failing {
                    tracing::info!("Backend reachable again");
                    self.failing = false;
                }
                let current = self.mapper.map_current(&payload);
                let upcoming = self.mapper.map_upcoming(&payload);
                self.dispatch(current, Some(upcoming), now_ms)
            }
            Err(e) => {
                if self.failing {
                    tracing::debug!(error = %e, "Fetch still failing");
                } else {
                    tracing::warn!(error = %e, "Fetch failed");
                    self.failing = true;
                }
                // upcoming bookings stay as they were
                let current = self.mapper.map_error(&e);
                self.dispatch(current, None, now_ms)
            }
        }
    }

    fn dispatch(
        &mut self,
        current: CurrentBooking,
        upcoming: Option<UpcomingBookings>,
        now_ms: u64,
    ) -> Vec<DisplayCommand> {
        // current first: the orchestrator needs the new id for the promotion check
        let mut events = Vec::with_capacity(2);
        if let Some(current) = self.detector.accept_current(current) {
            events.push(BookingEvent::CurrentBookingChanged(current));
        }
        if let Some(upcoming) = upcoming.and_then(|u| self.detector.accept_upcoming(u)) {
            events.push(BookingEvent::UpcomingBookingsChanged(upcoming));
        }

        if events.is_empty() {
            tracing::debug!("Bookings unchanged");
            return Vec::new();
        }

        let mut commands = Vec::new();
        for event in &events {
            match event {
                BookingEvent::CurrentBookingChanged(current) => tracing::info!(
                    booking_id = %current.id,
                    state = ?current.state,
                    "Current booking changed"
                ),
                BookingEvent::UpcomingBookingsChanged(upcoming) => tracing::info!(
                    first = %upcoming.first().id,
                    "Upcoming bookings changed"
                ),
            }
            self.emitter.emit(event);
            commands.extend(self.orchestrator.handle_event(event, now_ms));
        }
        commands
    }

    async fn send_all(&mut self, commands: Vec<DisplayCommand>) -> anyhow::Result<()> {
        for command in commands {
            self.tx
                .send(command)
                .await
                .map_err(|_| anyhow::anyhow!("display surface closed"))?;
        }
        Ok(())
    }

    fn now_ms(&self) -> u64 {
        u64::try_from(self.origin.elapsed().as_millis()).unwrap_or(u64::MAX)
    }
}

async fn wait_for(deadline: Option<Instant>) {
    match deadline {
        Some(deadline) => sleep_until(deadline).await,
        None => std::future::pending().await,
    }
}
