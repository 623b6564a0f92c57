//! Booking Poller
//!
//! Fetches from a [`BookingSource`] on a fixed cadence, one request at a
//! time. A tick that fires while a request is still in flight is skipped,
//! so results always complete in the order they were issued and the latest
//! completed result is also the latest issued one.
//!
//! The in-flight request lives in the poller rather than in the caller's
//! future, which makes [`Poller::next_outcome`] cancel-safe: a caller may
//! drop it in a `select!` and call it again without losing the request.

use std::future::pending;
use std::sync::Arc;
use std::time::Duration;

use futures::future::BoxFuture;
use tokio::time::{interval_at, Instant, Interval, MissedTickBehavior};

use crate::backend::{BookingSource, FetchError};
use crate::payload::BookingPayload;

type FetchFuture = BoxFuture<'static, Result<BookingPayload, FetchError>>;

/// Request counters
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct PollStats {
    /// Requests started
    pub issued: u64,
    /// Requests that produced a payload or an error
    pub completed: u64,
    /// Ticks dropped because a request was still in flight
    pub skipped_ticks: u64,
}

/// Fixed-cadence fetch loop
pub struct Poller<S: BookingSource + ?Sized + 'static> {
    source: Arc<S>,
    cadence: Duration,
    ticker: Option<Interval>,
    in_flight: Option<FetchFuture>,
    stats: PollStats,
}

impl<S: BookingSource + ?Sized + 'static> Poller<S> {
    /// Create a stopped poller
    #[must_use]
    pub fn new(source: Arc<S>, cadence: Duration) -> Self {
        Self {
            source,
            cadence,
            ticker: None,
            in_flight: None,
            stats: PollStats::default(),
        }
    }

    /// Issue the startup fetch and start the cadence
    ///
    /// The first tick fires one cadence after the startup fetch. Calling
    /// `start` on a running poller does nothing.
    pub fn start(&mut self) {
        if self.ticker.is_some() {
            return;
        }
        self.issue();

        let mut ticker = interval_at(Instant::now() + self.cadence, self.cadence);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
        self.ticker = Some(ticker);

        tracing::debug!(
            source = self.source.name(),
            cadence_ms = self.cadence.as_millis() as u64,
            "Poller started"
        );
    }

    /// Stop the cadence
    ///
    /// A request already in flight is left alone; it is dropped with the
    /// poller.
    pub fn stop(&mut self) {
        if self.ticker.take().is_some() {
            tracing::debug!(source = self.source.name(), "Poller stopped");
        }
    }

    /// Whether the cadence is running
    #[must_use]
    pub fn is_running(&self) -> bool {
        self.ticker.is_some()
    }

    /// Whether a request is outstanding
    #[must_use]
    pub fn is_in_flight(&self) -> bool {
        self.in_flight.is_some()
    }

    /// Request counters
    #[must_use]
    pub fn stats(&self) -> PollStats {
        self.stats
    }

    /// Wait for the next completed request
    ///
    /// Drives the cadence while waiting. Pending forever when the poller is
    /// stopped and nothing is in flight.
    pub async fn next_outcome(&mut self) -> Result<BookingPayload, FetchError> {
        loop {
            tokio::select! {
                biased;

                result = await_in_flight(&mut self.in_flight) => {
                    self.in_flight = None;
                    self.stats.completed += 1;
                    return result;
                }

                () = tick(&mut self.ticker) => {
                    if self.in_flight.is_some() {
                        self.stats.skipped_ticks += 1;
                        tracing::debug!(
                            skipped = self.stats.skipped_ticks,
                            "Request still in flight, skipping tick"
                        );
                    } else {
                        self.issue();
                    }
                }
            }
        }
    }

    fn issue(&mut self) {
        let source = Arc::clone(&self.source);
        self.in_flight = Some(Box::pin(async move { source.fetch().await }));
        self.stats.issued += 1;
    }
}

async fn await_in_flight(in_flight: &mut Option<FetchFuture>) -> Result<BookingPayload, FetchError> {
    match in_flight {
        Some(fetch) => fetch.await,
        None => pending().await,
    }
}

async fn tick(ticker: &mut Option<Interval>) {
    match ticker {
        Some(ticker) => {
            ticker.tick().await;
        }
        None => pending().await,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use std::sync::atomic::{AtomicU64, Ordering};
    use tokio_test::{assert_pending, task};

    /// Answers every fetch after a fixed delay, tagging payloads with a counter
    struct SlowSource {
        delay: Duration,
        calls: AtomicU64,
    }

    impl SlowSource {
        fn new(delay: Duration) -> Arc<Self> {
            Arc::new(Self {
                delay,
                calls: AtomicU64::new(0),
            })
        }
    }

    #[async_trait]
    impl BookingSource for SlowSource {
        fn name(&self) -> &str {
            "slow"
        }

        async fn fetch(&self) -> Result<BookingPayload, FetchError> {
            let n = self.calls.fetch_add(1, Ordering::SeqCst) + 1;
            if !self.delay.is_zero() {
                tokio::time::sleep(self.delay).await;
            }
            let mut payload = BookingPayload::default();
            payload.current_booking.id = n.to_string();
            Ok(payload)
        }
    }

    #[test]
    fn test_stopped_poller_is_pending() {
        let mut poller = Poller::new(SlowSource::new(Duration::ZERO), Duration::from_secs(1));
        let mut outcome = task::spawn(poller.next_outcome());
        assert_pending!(outcome.poll());
    }

    #[tokio::test(start_paused = true)]
    async fn test_startup_fetch_is_immediate() {
        let mut poller = Poller::new(SlowSource::new(Duration::ZERO), Duration::from_secs(1));
        let started = Instant::now();
        poller.start();
        assert!(poller.is_in_flight());

        let payload = poller.next_outcome().await.unwrap();
        assert_eq!(payload.current_booking.id, "1");
        assert_eq!(Instant::now(), started);
    }

    #[tokio::test(start_paused = true)]
    async fn test_fetches_follow_cadence() {
        let mut poller = Poller::new(SlowSource::new(Duration::ZERO), Duration::from_secs(1));
        let started = Instant::now();
        poller.start();

        poller.next_outcome().await.unwrap();
        let second = poller.next_outcome().await.unwrap();
        assert_eq!(second.current_booking.id, "2");
        let elapsed = Instant::now() - started;
        assert!(elapsed >= Duration::from_secs(1) && elapsed < Duration::from_millis(1010));

        poller.next_outcome().await.unwrap();
        let elapsed = Instant::now() - started;
        assert!(elapsed >= Duration::from_secs(2) && elapsed < Duration::from_millis(2010));
    }

    #[tokio::test(start_paused = true)]
    async fn test_ticks_are_skipped_while_in_flight() {
        let mut poller = Poller::new(
            SlowSource::new(Duration::from_millis(2500)),
            Duration::from_secs(1),
        );
        poller.start();

        let first = poller.next_outcome().await.unwrap();
        assert_eq!(first.current_booking.id, "1");

        let stats = poller.stats();
        assert_eq!(stats.issued, 1);
        assert_eq!(stats.completed, 1);
        assert_eq!(stats.skipped_ticks, 2);
    }

    #[tokio::test(start_paused = true)]
    async fn test_stop_releases_ticker() {
        let mut poller = Poller::new(SlowSource::new(Duration::ZERO), Duration::from_secs(1));
        poller.start();
        poller.next_outcome().await.unwrap();

        poller.stop();
        assert!(!poller.is_running());

        let waited = tokio::time::timeout(Duration::from_secs(10), poller.next_outcome()).await;
        assert!(waited.is_err());
        assert_eq!(poller.stats().issued, 1);
    }
}
