//! Status Strip
//!
//! The colored strip along the bottom edge changes color with a wipe: the
//! incoming color grows from the trailing (right) edge while the outgoing
//! color shrinks, and the displayed color only becomes the new one at 100%.
//!
//! The strip has no separate fade-in. The wipe is its fade-out and the swap
//! happens when the wipe completes.

use std::ops::Range;

use crate::animation::region::PhaseError;
use crate::animation::timing::Tween;
use crate::messages::{DisplayCommand, RegionId, Rgb};

/// Duration of a color wipe
pub const WIPE_MS: u64 = 700;

/// Strip phase
#[derive(Clone, Copy, Debug, PartialEq, Eq, Default)]
pub enum StripPhase {
    /// One color, no wipe running
    #[default]
    Idle,
    /// A wipe is running
    Wiping,
}

impl StripPhase {
    fn name(&self) -> &'static str {
        match self {
            Self::Idle => "idle",
            Self::Wiping => "wiping",
        }
    }
}

/// One painted span of the strip
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct StripSegment {
    /// Fill color
    pub color: Rgb,
    /// Horizontal pixel span
    pub span: Range<u32>,
}

/// The status strip's color state
#[derive(Debug)]
pub struct StatusStrip {
    displayed: Rgb,
    target: Rgb,
    phase: StripPhase,
    queued: Option<Rgb>,
    wipe_started_ms: u64,
}

impl StatusStrip {
    /// Create a strip showing `color`
    #[must_use]
    pub fn new(color: Rgb) -> Self {
        Self {
            displayed: color,
            target: color,
            phase: StripPhase::Idle,
            queued: None,
            wipe_started_ms: 0,
        }
    }

    /// Color currently committed to the strip
    #[must_use]
    pub fn displayed(&self) -> Rgb {
        self.displayed
    }

    /// Color the running wipe is heading to
    #[must_use]
    pub fn target(&self) -> Rgb {
        self.target
    }

    /// Current phase
    #[must_use]
    pub fn phase(&self) -> StripPhase {
        self.phase
    }

    /// Wipe to `color`, starting at `now_ms`
    ///
    /// Returns the wipe command when a wipe started. During a wipe the color
    /// is queued (replacing any earlier queued color) and `None` is returned.
    /// An unchanged color still wipes.
    pub fn request(&mut self, color: Rgb, now_ms: u64) -> Option<DisplayCommand> {
        match self.phase {
            StripPhase::Idle => Some(self.start_wipe(color, now_ms)),
            StripPhase::Wiping => {
                self.queued = Some(color);
                None
            }
        }
    }

    /// The running wipe reached 100%
    ///
    /// Commits the target color. If a color was queued, the next wipe starts
    /// at `now_ms` and its command is returned.
    pub fn finish_wipe(&mut self, now_ms: u64) -> Result<Option<DisplayCommand>, PhaseError> {
        if self.phase != StripPhase::Wiping {
            return Err(PhaseError {
                region: RegionId::StatusStrip,
                cue: "wipe done",
                phase: self.phase.name(),
            });
        }
        self.displayed = self.target;
        self.phase = StripPhase::Idle;

        Ok(self
            .queued
            .take()
            .map(|color| self.start_wipe(color, now_ms)))
    }

    /// Wipe progress at `now_ms`, 0.0 to 1.0 (1.0 when idle)
    #[must_use]
    pub fn progress_at(&self, now_ms: u64) -> f32 {
        match self.phase {
            StripPhase::Idle => 1.0,
            StripPhase::Wiping => {
                wipe_tween().value_at(now_ms.saturating_sub(self.wipe_started_ms))
            }
        }
    }

    /// Painted spans of a `width`-pixel strip at `now_ms`
    ///
    /// Empty spans are omitted.
    #[must_use]
    pub fn frame_at(&self, now_ms: u64, width: u32) -> Vec<StripSegment> {
        if self.phase == StripPhase::Idle {
            return vec![StripSegment {
                color: self.displayed,
                span: 0..width,
            }];
        }
        let (outgoing, incoming) = Self::segments(width, self.progress_at(now_ms));
        [(self.displayed, outgoing), (self.target, incoming)]
            .into_iter()
            .filter(|(_, span)| !span.is_empty())
            .map(|(color, span)| StripSegment { color, span })
            .collect()
    }

    /// Spans of the outgoing and incoming colors at `progress`
    ///
    /// `slide = floor(width × progress)`; the outgoing color covers
    /// `[0, width − slide)` and the incoming color `[width − slide, width)`.
    #[must_use]
    pub fn segments(width: u32, progress: f32) -> (Range<u32>, Range<u32>) {
        let slide = ((width as f32) * progress.clamp(0.0, 1.0)).floor() as u32;
        let boundary = width - slide.min(width);
        (0..boundary, boundary..width)
    }

    fn start_wipe(&mut self, color: Rgb, now_ms: u64) -> DisplayCommand {
        self.target = color;
        self.phase = StripPhase::Wiping;
        self.wipe_started_ms = now_ms;
        DisplayCommand::WipeStatusColor {
            from: self.displayed,
            to: color,
            tween: wipe_tween(),
        }
    }
}

fn wipe_tween() -> Tween {
    Tween::new(0.0, 1.0, WIPE_MS)
}
