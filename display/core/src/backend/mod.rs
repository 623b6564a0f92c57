//! Booking Backend Integration
//!
//! Abstracted access to the booking backend through a common trait.
//!
//! # Available Sources
//!
//! - **HTTP**: the booking backend's display API (default)
//!
//! # Usage
//!
//! ```ignore
//! use roomboard_core::backend::{BookingSource, HttpBookingSource};
//!
//! let source = HttpBookingSource::from_config(&config)?;
//! let payload = source.fetch().await?;
//! ```

mod http;
mod traits;

pub use http::HttpBookingSource;
pub use traits::{BookingSource, FetchError};
