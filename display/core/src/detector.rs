//! Change Detector
//!
//! Filters mapped results down to real changes. The current booking and the
//! upcoming list are tracked independently, each against the last value that
//! was let through, using the partial equality defined on the booking types.
//!
//! Nothing has been emitted before the first result, so the first result of
//! each kind always passes.

use crate::booking::{CurrentBooking, UpcomingBookings};

/// Last-emitted state of the display
#[derive(Debug, Default)]
pub struct ChangeDetector {
    last_current: Option<CurrentBooking>,
    last_upcoming: Option<UpcomingBookings>,
}

impl ChangeDetector {
    /// Create a detector that has emitted nothing
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Offer a freshly mapped current booking
    ///
    /// Returns the booking if it differs from the last emitted one, and
    /// records it as emitted.
    pub fn accept_current(&mut self, current: CurrentBooking) -> Option<CurrentBooking> {
        accept(&mut self.last_current, current)
    }

    /// Offer a freshly mapped upcoming list
    pub fn accept_upcoming(&mut self, upcoming: UpcomingBookings) -> Option<UpcomingBookings> {
        accept(&mut self.last_upcoming, upcoming)
    }

    /// The last emitted current booking
    #[must_use]
    pub fn last_current(&self) -> Option<&CurrentBooking> {
        self.last_current.as_ref()
    }

    /// The last emitted upcoming list
    #[must_use]
    pub fn last_upcoming(&self) -> Option<&UpcomingBookings> {
        self.last_upcoming.as_ref()
    }
}

fn accept<T: PartialEq + Clone>(last: &mut Option<T>, value: T) -> Option<T> {
    if last.as_ref() == Some(&value) {
        return None;
    }
    *last = Some(value.clone());
    Some(value)
}
