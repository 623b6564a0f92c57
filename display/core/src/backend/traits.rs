//! Booking Source Traits
//!
//! A booking source answers one question: what does the room look like right
//! now. The kiosk never talks HTTP directly; it polls a [`BookingSource`],
//! so tests and alternative backends plug in without touching the loop.

use async_trait::async_trait;
use thiserror::Error;

use crate::payload::BookingPayload;

/// Why a fetch produced no payload
#[derive(Clone, Debug, Error, PartialEq, Eq)]
pub enum FetchError {
    /// Unreachable, timed out, or an unexpected HTTP status
    #[error("transport error: {0}")]
    Transport(String),

    /// The backend does not know the configured room
    #[error("room not found")]
    NotFound,

    /// The body could not be decoded
    #[error("malformed response: {0}")]
    Malformed(String),
}

impl FetchError {
    /// Whether this is the room-not-found case
    #[must_use]
    pub fn is_not_found(&self) -> bool {
        matches!(self, Self::NotFound)
    }
}

/// Booking source trait
///
/// Implement this trait to feed the kiosk from a different backend.
#[async_trait]
pub trait BookingSource: Send + Sync {
    /// Get the source name (for logs)
    fn name(&self) -> &str;

    /// Fetch the room's current and upcoming bookings
    ///
    /// Called at most once at a time by the poller.
    async fn fetch(&self) -> Result<BookingPayload, FetchError>;
}
