//! Animated Regions
//!
//! Every text region on the display (and the upcoming-slot group) shares one
//! transition shape:
//!
//! ```text
//! Idle ──request──▶ FadingOut ──finish_fade_out──▶ Swapping
//!  ▲                    ▲                              │ begin_fade_in
//!  │                    │ (queued content)             ▼
//!  └────────────────────┴─────────finish_fade_in──── FadingIn
//! ```
//!
//! The content swap can only be taken out of a region that finished fading
//! out, and a fade-in can only begin from `Swapping`, so a fade-in can never
//! overlap its own fade-out. Requests that arrive mid-transition are
//! coalesced: only the latest one is kept and it starts as soon as the
//! current fade-in completes.
//!
//! Regions differ only in their [`RegionProfile`]: which targets they
//! animate, for how long, and with which curves.

use thiserror::Error;

use crate::animation::timing::{EasingFunction, Tween};
use crate::booking::{Slot, UpcomingBookings};
use crate::messages::{DisplayCommand, Property, RegionId, Target};

/// Baseline opacity of each upcoming slot, top to bottom
pub const SLOT_OPACITY: [f32; 3] = [1.0, 0.6, 0.4];

/// Distance the name label drops while fading out
const NAME_FADE_OUT_DROP_PX: f32 = 21.0;

/// Height the name label rises from while fading in
const NAME_FADE_IN_RISE_PX: f32 = 39.0;

/// Transition phase of a region
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Default)]
pub enum RegionPhase {
    /// Showing settled content
    #[default]
    Idle,
    /// Old content is fading out
    FadingOut,
    /// Invisible, content is being replaced
    Swapping,
    /// New content is fading in
    FadingIn,
}

impl RegionPhase {
    /// Lowercase name for logs and errors
    #[must_use]
    pub fn name(&self) -> &'static str {
        match self {
            Self::Idle => "idle",
            Self::FadingOut => "fading_out",
            Self::Swapping => "swapping",
            Self::FadingIn => "fading_in",
        }
    }
}

/// A transition cue arrived for a region in the wrong phase
#[derive(Debug, Error, Clone, PartialEq, Eq)]
#[error("{cue} for region {region} while {phase}")]
pub struct PhaseError {
    /// Region the cue was for
    pub region: RegionId,
    /// The step that was attempted
    pub cue: &'static str,
    /// Phase the region was actually in
    pub phase: &'static str,
}

/// Content a region swaps in while invisible
#[derive(Clone, Debug, PartialEq)]
pub enum RegionContent {
    /// Already-truncated label text
    Text(String),
    /// The three upcoming slots
    Slots(UpcomingBookings),
}

/// Outcome of [`AnimatedRegion::request`]
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Request {
    /// The region was idle and has begun fading out
    Started,
    /// A transition is running; the content will follow it
    Queued,
}

/// One animated property of a region's transition
#[derive(Clone, Debug, PartialEq)]
pub struct Track {
    /// Element to animate
    pub target: Target,
    /// Property to animate
    pub property: Property,
    /// Value curve
    pub tween: Tween,
}

impl Track {
    fn opacity(target: Target, tween: Tween) -> Self {
        Self {
            target,
            property: Property::Opacity,
            tween,
        }
    }

    fn offset(target: Target, tween: Tween) -> Self {
        Self {
            target,
            property: Property::OffsetY,
            tween,
        }
    }

    /// Render as a surface command
    #[must_use]
    pub fn command(&self) -> DisplayCommand {
        DisplayCommand::Animate {
            target: self.target,
            property: self.property,
            tween: self.tween.clone(),
        }
    }
}

/// The fade-out and fade-in choreography of a region
#[derive(Clone, Debug, PartialEq)]
pub struct RegionProfile {
    /// Tracks played while fading out
    pub fade_out: Vec<Track>,
    /// Tracks played while fading in
    pub fade_in: Vec<Track>,
}

impl RegionProfile {
    /// Headline: drops and fades out, rises back in
    #[must_use]
    pub fn name() -> Self {
        let out = |from: f32, to: f32| {
            Tween::new(from, to, 500).with_easing(EasingFunction::EaseInOutQuad)
        };
        Self {
            fade_out: vec![
                Track::opacity(Target::Name, out(1.0, 0.0)),
                Track::offset(Target::Name, out(0.0, NAME_FADE_OUT_DROP_PX)),
            ],
            fade_in: vec![
                Track::opacity(Target::Name, Tween::new(0.0, 1.0, 1000)),
                Track::offset(
                    Target::Name,
                    Tween::new(-NAME_FADE_IN_RISE_PX, 0.0, 800)
                        .with_easing(EasingFunction::EaseOutQuad),
                ),
            ],
        }
    }

    /// Info line: plain cross-fade
    #[must_use]
    pub fn info() -> Self {
        Self {
            fade_out: vec![Track::opacity(
                Target::Info,
                Tween::new(1.0, 0.0, 500).with_easing(EasingFunction::EaseInOutQuad),
            )],
            fade_in: vec![Track::opacity(Target::Info, Tween::new(0.0, 1.0, 1000))],
        }
    }

    /// Status line: vanishes early in its fade-out
    #[must_use]
    pub fn status() -> Self {
        Self {
            fade_out: vec![Track::opacity(
                Target::Status,
                Tween::new(1.0, 0.0, 800)
                    .with_easing(EasingFunction::EaseInOutQuad)
                    .with_keyframe(0.3, 0.0),
            )],
            fade_in: vec![Track::opacity(Target::Status, Tween::new(0.0, 1.0, 800))],
        }
    }

    /// Upcoming group: staggered durations and baseline opacities
    #[must_use]
    pub fn upcoming() -> Self {
        // (slot, fade-out extra ms, hold-until, fade-in extra ms, delay-until)
        let stagger = [
            (Slot::First, 1000, 0.5, 600, 0.375),
            (Slot::Second, 500, 0.33, 300, 0.23),
            (Slot::Third, 0, 0.0, 0, 0.0),
        ];

        let mut fade_out = Vec::with_capacity(stagger.len());
        let mut fade_in = Vec::with_capacity(stagger.len());
        for (slot, out_extra, hold, in_extra, delay) in stagger {
            let target = Target::UpcomingSlot(slot);
            let opacity = SLOT_OPACITY[slot.index()];
            fade_out.push(Track::opacity(
                target,
                Tween::new(opacity, 0.0, 1000 + out_extra).with_keyframe(hold, opacity),
            ));
            fade_in.push(Track::opacity(
                target,
                Tween::new(0.0, opacity, 1000 + in_extra).with_keyframe(delay, 0.0),
            ));
        }

        Self { fade_out, fade_in }
    }

    /// Time until every fade-out track has finished
    #[must_use]
    pub fn fade_out_ms(&self) -> u64 {
        longest(&self.fade_out)
    }

    /// Time until every fade-in track has finished
    #[must_use]
    pub fn fade_in_ms(&self) -> u64 {
        longest(&self.fade_in)
    }
}

fn longest(tracks: &[Track]) -> u64 {
    tracks
        .iter()
        .map(|t| t.tween.duration_ms)
        .max()
        .unwrap_or(0)
}

/// A region running fade-out → swap → fade-in transitions
#[derive(Debug)]
pub struct AnimatedRegion {
    id: RegionId,
    profile: RegionProfile,
    phase: RegionPhase,
    /// Content the running transition will swap in
    incoming: Option<RegionContent>,
    /// Latest content requested mid-transition
    queued: Option<RegionContent>,
}

impl AnimatedRegion {
    /// Create an idle region
    #[must_use]
    pub fn new(id: RegionId, profile: RegionProfile) -> Self {
        Self {
            id,
            profile,
            phase: RegionPhase::Idle,
            incoming: None,
            queued: None,
        }
    }

    /// Region identifier
    #[must_use]
    pub fn id(&self) -> RegionId {
        self.id
    }

    /// Current phase
    #[must_use]
    pub fn phase(&self) -> RegionPhase {
        self.phase
    }

    /// Choreography of this region
    #[must_use]
    pub fn profile(&self) -> &RegionProfile {
        &self.profile
    }

    /// Whether content is waiting behind the running transition
    #[must_use]
    pub fn has_queued(&self) -> bool {
        self.queued.is_some()
    }

    /// Ask the region to show `content`
    ///
    /// An idle region starts fading out. Otherwise the content replaces any
    /// earlier queued request.
    pub fn request(&mut self, content: RegionContent) -> Request {
        if self.phase == RegionPhase::Idle {
            self.phase = RegionPhase::FadingOut;
            self.incoming = Some(content);
            Request::Started
        } else {
            self.queued = Some(content);
            Request::Queued
        }
    }

    /// The fade-out finished; take the content to swap in
    pub fn finish_fade_out(&mut self) -> Result<RegionContent, PhaseError> {
        if self.phase != RegionPhase::FadingOut {
            return Err(self.phase_error("fade-out done"));
        }
        let content = self.incoming.take().ok_or_else(|| self.phase_error("fade-out done"))?;
        self.phase = RegionPhase::Swapping;
        Ok(content)
    }

    /// The swap is applied; start fading in
    pub fn begin_fade_in(&mut self) -> Result<(), PhaseError> {
        if self.phase != RegionPhase::Swapping {
            return Err(self.phase_error("fade-in start"));
        }
        self.phase = RegionPhase::FadingIn;
        Ok(())
    }

    /// The fade-in finished
    ///
    /// Returns the queued content when another transition has started
    /// (the region is fading out again), `None` when the region is idle.
    pub fn finish_fade_in(&mut self) -> Result<Option<RegionContent>, PhaseError> {
        if self.phase != RegionPhase::FadingIn {
            return Err(self.phase_error("fade-in done"));
        }
        match self.queued.take() {
            Some(next) => {
                self.phase = RegionPhase::FadingOut;
                self.incoming = Some(next.clone());
                Ok(Some(next))
            }
            None => {
                self.phase = RegionPhase::Idle;
                Ok(None)
            }
        }
    }

    /// Commands that start the fade-out
    #[must_use]
    pub fn fade_out_commands(&self) -> Vec<DisplayCommand> {
        self.profile.fade_out.iter().map(Track::command).collect()
    }

    /// Commands that start the fade-in
    #[must_use]
    pub fn fade_in_commands(&self) -> Vec<DisplayCommand> {
        self.profile.fade_in.iter().map(Track::command).collect()
    }

    fn phase_error(&self, cue: &'static str) -> PhaseError {
        PhaseError {
            region: self.id,
            cue,
            phase: self.phase.name(),
        }
    }
}
