//! Backend Payload
//!
//! Wire types for `GET {address}/rooms/{room_id}/{timezone_id}`.
//!
//! Every field defaults when absent: a missing booking object reads as an
//! empty booking (`id = ""`, times `0`), which the mapper treats as "no
//! booking". Values of the wrong JSON type are a decode error and surface as
//! [`FetchError::Malformed`](crate::backend::FetchError::Malformed).

use serde::{Deserialize, Serialize};

use crate::booking::Slot;

/// One booking object as sent by the backend
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct RawBooking {
    /// Booking id, `""` when there is no booking
    pub id: String,
    /// Booking name
    pub name: String,
    /// Display name of the user who made the booking
    pub user: String,
    /// Start time in Unix seconds, `0` when unknown
    pub start_time: i64,
    /// End time in Unix seconds
    pub end_time: i64,
}

/// Full response body for one room
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct BookingPayload {
    /// Booking occupying the room right now
    pub current_booking: RawBooking,
    /// Next booking
    pub first_upcoming_booking: RawBooking,
    /// Booking after that
    pub second_upcoming_booking: RawBooking,
    /// Third upcoming booking
    pub third_upcoming_booking: RawBooking,
}

impl BookingPayload {
    /// The raw booking for an upcoming slot
    #[must_use]
    pub fn upcoming(&self, slot: Slot) -> &RawBooking {
        match slot {
            Slot::First => &self.first_upcoming_booking,
            Slot::Second => &self.second_upcoming_booking,
            Slot::Third => &self.third_upcoming_booking,
        }
    }
}
