//! Animation Building Blocks
//!
//! Tweens, the cue timeline, the region state machine and the status strip.
//! The [`Orchestrator`](crate::orchestrator::Orchestrator) composes these
//! into the display's choreography.

pub mod region;
pub mod strip;
pub mod timeline;
pub mod timing;

pub use region::{
    AnimatedRegion, PhaseError, RegionContent, RegionPhase, RegionProfile, Request, Track,
    SLOT_OPACITY,
};
pub use strip::{StatusStrip, StripPhase, StripSegment, WIPE_MS};
pub use timeline::Timeline;
pub use timing::{EasingFunction, Keyframe, Tween};
