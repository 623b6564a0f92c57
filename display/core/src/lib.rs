//! Roomboard Core - Headless Booking Display Orchestration
//!
//! This crate holds everything a meeting-room kiosk needs between the booking
//! backend and the pixels: polling, mapping raw bookings to display-ready
//! values, change detection, and the timed choreography of fades, slides and
//! color wipes. It never draws anything itself. A display surface receives a
//! stream of [`DisplayCommand`]s and renders them however it likes.
//!
//! # Architecture
//!
//! ```text
//! ┌──────────────────────────────────────────────────────────────────┐
//! │                        Booking Backend                           │
//! │        GET {address}/rooms/{room_id}/{timezone}                  │
//! └───────────────────────────────┬──────────────────────────────────┘
//!                                 │ BookingPayload (JSON)
//! ┌───────────────────────────────┼──────────────────────────────────┐
//! │                         ROOMBOARD CORE                           │
//! │  ┌────────────────────────────┴───────────────────────────────┐  │
//! │  │                          Kiosk                              │  │
//! │  │  ┌────────┐  ┌────────┐  ┌──────────┐  ┌──────────────────┐ │  │
//! │  │  │ Poller │─▶│ Mapper │─▶│ Detector │─▶│   Orchestrator   │ │  │
//! │  │  └────────┘  └────────┘  └────┬─────┘  │ regions + strip  │ │  │
//! │  │                               │        └────────┬─────────┘ │  │
//! │  │                        EventEmitter             │           │  │
//! │  └───────────────────────────────┼─────────────────┼───────────┘  │
//! └──────────────────────────────────┼─────────────────┼──────────────┘
//!                                    │ BookingEvent    │ DisplayCommand
//!                                    ▼                 ▼
//!                               listeners        display surface
//! ```
//!
//! # Key Types
//!
//! - [`Kiosk`]: The single event loop that owns all display state
//! - [`DisplayCommand`]: Messages sent from the core to the display surface
//! - [`BookingEvent`]: Change notifications for listeners
//! - [`CurrentBooking`] / [`UpcomingBookings`]: Display-ready booking values
//! - [`BookingSource`]: Where bookings come from ([`HttpBookingSource`] in production)
//! - [`Orchestrator`]: Turns booking changes into timed animation commands
//!
//! # Quick Start
//!
//! ```ignore
//! use std::sync::Arc;
//! use roomboard_core::{load_config, HttpBookingSource, Kiosk};
//! use tokio::sync::{mpsc, watch};
//!
//! #[tokio::main]
//! async fn main() -> anyhow::Result<()> {
//!     let config = load_config()?;
//!     let source = Arc::new(HttpBookingSource::from_config(&config)?);
//!
//!     // Commands for the display surface
//!     let (tx, mut rx) = mpsc::channel(64);
//!     tokio::spawn(async move {
//!         while let Some(command) = rx.recv().await {
//!             // Render command
//!         }
//!     });
//!
//!     let (_shutdown_tx, shutdown_rx) = watch::channel(false);
//!     let mut kiosk = Kiosk::new(source, &config, tx);
//!     kiosk.run(shutdown_rx).await
//! }
//! ```
//!
//! # Module Overview
//!
//! - [`animation`]: Easing, tweens, the deadline timeline, region and strip state machines
//! - [`backend`]: Booking source abstraction and the HTTP client
//! - [`booking`]: Display-ready booking values
//! - [`config`]: Layered configuration (defaults, TOML file, environment, CLI)
//! - [`detector`]: Suppression of unchanged results
//! - [`events`]: Booking change events and listener fan-out
//! - [`kiosk`]: The event loop tying everything together
//! - [`mapper`]: Raw payload to display values, including error states
//! - [`messages`]: Commands from the core to the display surface
//! - [`orchestrator`]: Transition choreography
//! - [`payload`]: Wire format of the backend response
//! - [`poller`]: Serialized fixed-cadence fetching
//!
//! # No UI Dependencies
//!
//! This crate has **zero** dependencies on any rendering toolkit. All timing
//! runs on the tokio clock, so tests drive it with paused time.

#![deny(missing_docs)]
#![deny(clippy::all)]
#![warn(clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]

pub mod animation;
pub mod backend;
pub mod booking;
pub mod config;
pub mod detector;
pub mod events;
pub mod kiosk;
pub mod mapper;
pub mod messages;
pub mod orchestrator;
pub mod payload;
pub mod poller;

// Re-exports for convenience
pub use animation::{EasingFunction, RegionPhase, StatusStrip, StripPhase, Tween};
pub use backend::{BookingSource, FetchError, HttpBookingSource};
pub use booking::{CurrentBooking, CurrentBookingState, Slot, UpcomingBooking, UpcomingBookings};
pub use config::{
    load_config, load_config_from_path, ConfigError, ConfigOverrides, ConfigSource, DisplayConfig,
};
pub use detector::ChangeDetector;
pub use events::{BookingEvent, EventEmitter, EventKind};
pub use kiosk::Kiosk;
pub use mapper::ResponseMapper;
pub use messages::{DisplayCommand, Property, RegionId, Rgb, SlotText, Target};
pub use orchestrator::Orchestrator;
pub use payload::{BookingPayload, RawBooking};
pub use poller::{PollStats, Poller};
