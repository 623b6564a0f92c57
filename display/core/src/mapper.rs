//! Response Mapper
//!
//! Turns a backend payload, or the reason there is none, into the typed
//! booking records the rest of the core works with.
//!
//! # Rules
//!
//! - `current_booking.id == ""` means the room is free: the configured
//!   unbooked texts are shown, whatever else the payload carries.
//! - Otherwise the room is booked: `info` is the booked-by prefix plus the
//!   booking user, `status` the formatted time range.
//! - Each upcoming slot maps independently of the current booking.
//! - A failed fetch maps to the error booking. A 404 names the room as the
//!   problem; everything else is reported as a connection problem.
//!
//! # Time ranges
//!
//! `HH:MM - HH:MM` in the display's timezone. The end is formatted from
//! `end_time + 1` so a booking stored as ending at `10:59:59` reads
//! `10:00 - 11:00`. A start time of `0` means there is nothing to show and
//! formats as the empty string.

use chrono::TimeZone;
use chrono_tz::Tz;

use crate::backend::FetchError;
use crate::booking::{CurrentBooking, CurrentBookingState, Slot, UpcomingBooking, UpcomingBookings};
use crate::config::{DisplayConfig, TextsConfig};
use crate::payload::{BookingPayload, RawBooking};

/// Fixed id of the error booking
pub const ERROR_BOOKING_ID: &str = "error";

/// Headline after a transport failure
pub const CONNECTION_PROBLEM_NAME: &str = "Connection problem!";

/// Info line after a transport failure
pub const CONNECTION_PROBLEM_INFO: &str = "Is the backend running properly?";

/// Headline when the backend does not know the room
pub const ROOM_NOT_FOUND_NAME: &str = "ERROR: Room ID not found";

/// Info line when the backend does not know the room
pub const ROOM_NOT_FOUND_INFO: &str = "Please provide a valid room ID.";

/// Status line of the error booking
pub const ERROR_STATUS: &str = "???";

const TIME_FORMAT: &str = "%H:%M";

/// Maps backend payloads to booking records
#[derive(Clone, Debug)]
pub struct ResponseMapper {
    texts: TextsConfig,
    timezone: Tz,
}

impl ResponseMapper {
    /// Create a mapper from the configuration
    ///
    /// The timezone is resolved now. An id `chrono-tz` does not know falls
    /// back to UTC.
    #[must_use]
    pub fn new(config: &DisplayConfig) -> Self {
        let id = config.timezone_id();
        let timezone = id.parse::<Tz>().unwrap_or_else(|_| {
            tracing::warn!(timezone = %id, "Unknown timezone, formatting times in UTC");
            Tz::UTC
        });

        Self {
            texts: config.texts.clone(),
            timezone,
        }
    }

    /// Timezone used for formatting
    #[must_use]
    pub fn timezone(&self) -> Tz {
        self.timezone
    }

    /// Map the booking occupying the room
    #[must_use]
    pub fn map_current(&self, payload: &BookingPayload) -> CurrentBooking {
        let raw = &payload.current_booking;

        if raw.id.is_empty() {
            return CurrentBooking {
                state: CurrentBookingState::Unbooked,
                id: String::new(),
                name: self.texts.unbooked_name.clone(),
                info: self.texts.unbooked_info.clone(),
                status: self.texts.unbooked_status.clone(),
            };
        }

        CurrentBooking {
            state: CurrentBookingState::Booked,
            id: raw.id.clone(),
            name: raw.name.clone(),
            info: format!("{}{}", self.texts.booked_by_prefix, raw.user),
            status: self.format_range(raw),
        }
    }

    /// Map the three upcoming slots
    #[must_use]
    pub fn map_upcoming(&self, payload: &BookingPayload) -> UpcomingBookings {
        UpcomingBookings::new(Slot::ALL.map(|slot| self.map_slot(payload.upcoming(slot))))
    }

    /// Map a failed fetch to the error booking
    #[must_use]
    pub fn map_error(&self, error: &FetchError) -> CurrentBooking {
        let (name, info) = if error.is_not_found() {
            (ROOM_NOT_FOUND_NAME, ROOM_NOT_FOUND_INFO)
        } else {
            (CONNECTION_PROBLEM_NAME, CONNECTION_PROBLEM_INFO)
        };

        CurrentBooking {
            state: CurrentBookingState::Error,
            id: ERROR_BOOKING_ID.to_string(),
            name: name.to_string(),
            info: info.to_string(),
            status: ERROR_STATUS.to_string(),
        }
    }

    fn map_slot(&self, raw: &RawBooking) -> UpcomingBooking {
        UpcomingBooking {
            id: raw.id.clone(),
            name: raw.name.clone(),
            time_string: self.format_range(raw),
        }
    }

    fn format_range(&self, raw: &RawBooking) -> String {
        format_time_range(&self.timezone, raw.start_time, raw.end_time)
    }
}

/// Format `start..end` (Unix seconds) as `HH:MM - HH:MM` in `tz`
///
/// Returns `""` when `start` is `0` or either instant is out of range.
#[must_use]
pub fn format_time_range<Z: TimeZone>(tz: &Z, start: i64, end: i64) -> String
where
    Z::Offset: std::fmt::Display,
{
    if start == 0 {
        return String::new();
    }

    let instant = |secs: i64| tz.timestamp_opt(secs, 0).single();
    match (instant(start), end.checked_add(1).and_then(instant)) {
        (Some(from), Some(to)) => format!(
            "{} - {}",
            from.format(TIME_FORMAT),
            to.format(TIME_FORMAT)
        ),
        _ => String::new(),
    }
}
