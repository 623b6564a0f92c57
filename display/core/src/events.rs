//! Booking Events
//!
//! Named change events and a small typed emitter. Listeners register for
//! all events or a subset of kinds and receive them, in emission order, on
//! an unbounded channel. Listeners whose receiver was dropped are pruned on
//! the next emit.

use std::fmt;

use serde::Serialize;
use tokio::sync::mpsc;

use crate::booking::{CurrentBooking, UpcomingBookings};

/// Event kinds
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize)]
pub enum EventKind {
    /// The booking occupying the room changed
    #[serde(rename = "currentBookingChanged")]
    CurrentBookingChanged,
    /// The upcoming list changed
    #[serde(rename = "upcomingBookingsChanged")]
    UpcomingBookingsChanged,
}

impl EventKind {
    /// Event name
    #[must_use]
    pub fn name(&self) -> &'static str {
        match self {
            Self::CurrentBookingChanged => "currentBookingChanged",
            Self::UpcomingBookingsChanged => "upcomingBookingsChanged",
        }
    }
}

impl fmt::Display for EventKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// A change that passed the detector
#[derive(Clone, Debug, PartialEq)]
pub enum BookingEvent {
    /// New current booking
    CurrentBookingChanged(CurrentBooking),
    /// New upcoming list
    UpcomingBookingsChanged(UpcomingBookings),
}

impl BookingEvent {
    /// The kind of this event
    #[must_use]
    pub fn kind(&self) -> EventKind {
        match self {
            Self::CurrentBookingChanged(_) => EventKind::CurrentBookingChanged,
            Self::UpcomingBookingsChanged(_) => EventKind::UpcomingBookingsChanged,
        }
    }
}

struct Listener {
    kinds: Option<Vec<EventKind>>,
    tx: mpsc::UnboundedSender<BookingEvent>,
}

impl Listener {
    fn wants(&self, kind: EventKind) -> bool {
        match &self.kinds {
            Some(kinds) => kinds.contains(&kind),
            None => true,
        }
    }
}

/// Fan-out of booking events to registered listeners
#[derive(Default)]
pub struct EventEmitter {
    listeners: Vec<Listener>,
}

impl EventEmitter {
    /// Create an emitter with no listeners
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Listen to every event
    pub fn subscribe(&mut self) -> mpsc::UnboundedReceiver<BookingEvent> {
        self.register(None)
    }

    /// Listen to the given kinds only
    pub fn subscribe_to(&mut self, kinds: &[EventKind]) -> mpsc::UnboundedReceiver<BookingEvent> {
        self.register(Some(kinds.to_vec()))
    }

    fn register(&mut self, kinds: Option<Vec<EventKind>>) -> mpsc::UnboundedReceiver<BookingEvent> {
        let (tx, rx) = mpsc::unbounded_channel();
        self.listeners.push(Listener { kinds, tx });
        rx
    }

    /// Deliver `event` to interested listeners
    ///
    /// Returns the number of listeners it was delivered to.
    pub fn emit(&mut self, event: &BookingEvent) -> usize {
        let kind = event.kind();
        let mut delivered = 0;

        self.listeners.retain(|listener| {
            if listener.tx.is_closed() {
                return false;
            }
            if listener.wants(kind) {
                if listener.tx.send(event.clone()).is_err() {
                    return false;
                }
                delivered += 1;
            }
            true
        });

        tracing::trace!(event = %kind, delivered, "Emitted booking event");
        delivered
    }

    /// Number of live listeners
    #[must_use]
    pub fn listener_count(&self) -> usize {
        self.listeners.iter().filter(|l| !l.tx.is_closed()).count()
    }
}

impl fmt::Debug for EventEmitter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("EventEmitter")
            .field("listeners", &self.listeners.len())
            .finish()
    }
}
