//! Booking Domain Model
//!
//! Typed records for what the kiosk shows: the booking currently occupying
//! the room and the next three upcoming bookings.
//!
//! # Equality
//!
//! Both record types implement a *partial* `PartialEq` that the change
//! detector relies on:
//!
//! - [`CurrentBooking`] compares `id` and `status` only. A name or info
//!   correction that keeps the same id and time range does not count as a
//!   change and will not trigger an animated refresh. This narrowing may be
//!   unintentional upstream; it is kept as-is because widening it changes how
//!   often the display animates.
//! - [`UpcomingBooking`] compares `id` and `time_string` only.

use std::ops::Index;

use serde::{Deserialize, Serialize};

/// Number of upcoming-booking slots on the display
pub const UPCOMING_SLOTS: usize = 3;

/// Classification of the booking currently occupying the room
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CurrentBookingState {
    /// The backend reports no active booking
    Unbooked,
    /// The backend reports an active booking
    Booked,
    /// The last fetch failed
    #[default]
    Error,
}

/// The booking currently occupying the room
#[derive(Clone, Debug, Default, Serialize, Deserialize)]
pub struct CurrentBooking {
    /// Derived state (see [`CurrentBookingState`])
    pub state: CurrentBookingState,
    /// Backend booking id, `""` when unbooked, `"error"` after a failed fetch
    pub id: String,
    /// Large headline text
    pub name: String,
    /// Secondary line ("Booked by ..." or the unbooked info text)
    pub info: String,
    /// Time range or the unbooked status text
    pub status: String,
}

impl CurrentBooking {
    /// Whether the room is currently booked
    #[must_use]
    pub fn is_booked(&self) -> bool {
        self.state == CurrentBookingState::Booked
    }
}

impl PartialEq for CurrentBooking {
    fn eq(&self, other: &Self) -> bool {
        self.id == other.id && self.status == other.status
    }
}

/// One upcoming booking slot
#[derive(Clone, Debug, Default, Serialize, Deserialize)]
pub struct UpcomingBooking {
    /// Backend booking id, `""` for an empty slot
    pub id: String,
    /// Booking name
    pub name: String,
    /// Formatted `HH:MM - HH:MM` range, `""` when there is no time to show
    pub time_string: String,
}

impl UpcomingBooking {
    /// Whether this slot holds no booking
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.id.is_empty()
    }
}

impl PartialEq for UpcomingBooking {
    fn eq(&self, other: &Self) -> bool {
        self.id == other.id && self.time_string == other.time_string
    }
}

/// A fixed upcoming-booking display position
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Slot {
    /// Top slot, fully opaque
    First,
    /// Middle slot
    Second,
    /// Bottom slot, most faded
    Third,
}

impl Slot {
    /// All slots, top to bottom
    pub const ALL: [Slot; UPCOMING_SLOTS] = [Slot::First, Slot::Second, Slot::Third];

    /// Zero-based position
    #[must_use]
    pub const fn index(self) -> usize {
        match self {
            Self::First => 0,
            Self::Second => 1,
            Self::Third => 2,
        }
    }

    /// Key of this slot in the backend payload
    #[must_use]
    pub const fn payload_key(self) -> &'static str {
        match self {
            Self::First => "first_upcoming_booking",
            Self::Second => "second_upcoming_booking",
            Self::Third => "third_upcoming_booking",
        }
    }
}

/// The three upcoming-booking slots, always fully populated
///
/// Slots the backend has no booking for hold an empty [`UpcomingBooking`].
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct UpcomingBookings([UpcomingBooking; UPCOMING_SLOTS]);

impl UpcomingBookings {
    /// Build from exactly three slots
    #[must_use]
    pub fn new(slots: [UpcomingBooking; UPCOMING_SLOTS]) -> Self {
        Self(slots)
    }

    /// Build from up to three bookings, padding with empty slots
    ///
    /// Bookings beyond the third are ignored.
    pub fn padded(bookings: impl IntoIterator<Item = UpcomingBooking>) -> Self {
        let mut slots: [UpcomingBooking; UPCOMING_SLOTS] = Default::default();
        for (slot, booking) in slots.iter_mut().zip(bookings) {
            *slot = booking;
        }
        Self(slots)
    }

    /// The booking in a given slot
    #[must_use]
    pub fn get(&self, slot: Slot) -> &UpcomingBooking {
        &self.0[slot.index()]
    }

    /// The top slot
    #[must_use]
    pub fn first(&self) -> &UpcomingBooking {
        self.get(Slot::First)
    }

    /// Iterate slots top to bottom
    pub fn iter(&self) -> impl Iterator<Item = &UpcomingBooking> {
        self.0.iter()
    }

    /// Whether every slot is empty
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.0.iter().all(UpcomingBooking::is_empty)
    }
}

impl Index<Slot> for UpcomingBookings {
    type Output = UpcomingBooking;

    fn index(&self, slot: Slot) -> &Self::Output {
        self.get(slot)
    }
}
