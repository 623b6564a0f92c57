//! Display Messages
//!
//! Render commands sent from the core to a Display Surface. The surface is a
//! pure renderer: it draws what it is told and interpolates the tweens it
//! receives. It never decides *when* content changes.
//!
//! Animations are described, not stepped. An [`DisplayCommand::Animate`]
//! carries a [`Tween`] that starts the moment the surface receives it; the
//! core schedules the follow-up step itself, so a surface that drops frames
//! still ends up in the right state.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::animation::Tween;
use crate::booking::{Slot, UpcomingBooking, UPCOMING_SLOTS};

/// Marker appended to truncated text
pub const ELLIPSIS: &str = "...";

/// Independently animated visual unit
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RegionId {
    /// Current booking headline
    Name,
    /// Current booking secondary line
    Info,
    /// Current booking time range / status text
    Status,
    /// Colored strip along the bottom edge
    StatusStrip,
    /// The three upcoming-booking slots
    Upcoming,
}

impl RegionId {
    /// Stable lowercase name, used in logs
    #[must_use]
    pub fn name(&self) -> &'static str {
        match self {
            Self::Name => "name",
            Self::Info => "info",
            Self::Status => "status",
            Self::StatusStrip => "status_strip",
            Self::Upcoming => "upcoming",
        }
    }
}

impl fmt::Display for RegionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Element a property animation applies to
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Target {
    /// Current booking headline label
    Name,
    /// Current booking info label
    Info,
    /// Current booking status label
    Status,
    /// The status strip
    StatusStrip,
    /// One upcoming-booking slot
    UpcomingSlot(Slot),
}

/// Animatable property
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Property {
    /// Opacity, 0.0 to 1.0
    Opacity,
    /// Vertical offset from the layout position, in pixels (negative is up)
    OffsetY,
}

/// Text shown in one upcoming slot
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SlotText {
    /// Bold time line
    pub time: String,
    /// Light name line
    pub name: String,
}

impl SlotText {
    /// Render an upcoming booking, truncating its name
    #[must_use]
    pub fn from_booking(booking: &UpcomingBooking, name_max_chars: usize) -> Self {
        Self {
            time: booking.time_string.clone(),
            name: truncate_with_ellipsis(&booking.name, name_max_chars),
        }
    }
}

/// Commands from the core to a Display Surface
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum DisplayCommand {
    /// Fill the background
    SetBackground {
        /// Background color
        color: Rgb,
    },

    /// Paint the whole status strip in one color
    SetStatusColor {
        /// Strip color
        color: Rgb,
    },

    /// Replace a text region's content (only sent while it is invisible)
    SetText {
        /// Region to update
        region: RegionId,
        /// New, already truncated text
        text: String,
    },

    /// Replace all three upcoming slots (only sent while they are invisible)
    SetSlots {
        /// Slot texts, top to bottom
        slots: [SlotText; UPCOMING_SLOTS],
    },

    /// Jump a property to a value without animating
    SetOpacity {
        /// Element to update
        target: Target,
        /// New opacity
        opacity: f32,
    },

    /// Animate a property
    Animate {
        /// Element to animate
        target: Target,
        /// Property to animate
        property: Property,
        /// Value curve, starting on receipt
        tween: Tween,
    },

    /// Slide the incoming strip color in from the trailing edge
    ///
    /// `tween` drives wipe progress from 0.0 to 1.0. See
    /// [`StatusStrip::segments`](crate::animation::StatusStrip::segments)
    /// for the geometry.
    WipeStatusColor {
        /// Color being replaced
        from: Rgb,
        /// Color sliding in
        to: Rgb,
        /// Progress curve
        tween: Tween,
    },

    /// Put an element back at its layout position
    ResetOffset {
        /// Element to reset
        target: Target,
    },
}

impl DisplayCommand {
    /// Short command name for logs
    #[must_use]
    pub fn kind(&self) -> &'static str {
        match self {
            Self::SetBackground { .. } => "set_background",
            Self::SetStatusColor { .. } => "set_status_color",
            Self::SetText { .. } => "set_text",
            Self::SetSlots { .. } => "set_slots",
            Self::SetOpacity { .. } => "set_opacity",
            Self::Animate { .. } => "animate",
            Self::WipeStatusColor { .. } => "wipe_status_color",
            Self::ResetOffset { .. } => "reset_offset",
        }
    }
}

/// Truncate `text` to `max_chars` characters, appending [`ELLIPSIS`]
///
/// Text at or under the limit is returned unchanged.
#[must_use]
pub fn truncate_with_ellipsis(text: &str, max_chars: usize) -> String {
    match text.char_indices().nth(max_chars) {
        Some((cut, _)) => format!("{}{ELLIPSIS}", &text[..cut]),
        None => text.to_string(),
    }
}

/// Error parsing a `#RRGGBB` color
#[derive(Debug, Error, PartialEq, Eq)]
#[error("invalid color {0:?}, expected #RRGGBB")]
pub struct ColorParseError(
    /// The rejected input
    pub String,
);

/// An opaque RGB color, serialized as `"#RRGGBB"`
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct Rgb {
    /// Red channel
    pub r: u8,
    /// Green channel
    pub g: u8,
    /// Blue channel
    pub b: u8,
}

impl Rgb {
    /// Pure black
    pub const BLACK: Rgb = Rgb::new(0, 0, 0);

    /// Create a color from channels
    #[must_use]
    pub const fn new(r: u8, g: u8, b: u8) -> Self {
        Self { r, g, b }
    }
}

impl FromStr for Rgb {
    type Err = ColorParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let err = || ColorParseError(s.to_string());
        let hex = s.trim().strip_prefix('#').ok_or_else(err)?;
        if hex.len() != 6 || !hex.is_ascii() {
            return Err(err());
        }
        let channel = |i: usize| u8::from_str_radix(&hex[i..i + 2], 16).map_err(|_| err());
        Ok(Self::new(channel(0)?, channel(2)?, channel(4)?))
    }
}

impl TryFrom<String> for Rgb {
    type Error = ColorParseError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

impl From<Rgb> for String {
    fn from(color: Rgb) -> Self {
        color.to_string()
    }
}

impl fmt::Display for Rgb {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{:02X}{:02X}{:02X}", self.r, self.g, self.b)
    }
}
