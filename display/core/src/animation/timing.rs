//! Tween Timing
//!
//! Time-based value curves with easing and keyframes. A [`Tween`] is a pure
//! description: sampling it at an elapsed time always yields the same value,
//! so the core and any surface agree on what a region looks like at a moment
//! without sharing a frame clock.

use serde::{Deserialize, Serialize};

/// Easing functions for smooth animation
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum EasingFunction {
    /// No easing (constant speed)
    #[default]
    Linear,

    /// Quadratic ease in
    EaseInQuad,

    /// Quadratic ease out
    EaseOutQuad,

    /// Quadratic ease in and out
    EaseInOutQuad,

    /// Cubic ease in
    EaseInCubic,

    /// Cubic ease out
    EaseOutCubic,
}

impl EasingFunction {
    /// Apply the easing function to a progress value (0.0 to 1.0)
    #[must_use]
    pub fn apply(self, t: f32) -> f32 {
        let t = t.clamp(0.0, 1.0);

        match self {
            Self::Linear => t,
            Self::EaseInQuad => t * t,
            Self::EaseOutQuad => 1.0 - (1.0 - t) * (1.0 - t),
            Self::EaseInOutQuad => {
                if t < 0.5 {
                    2.0 * t * t
                } else {
                    1.0 - (-2.0 * t + 2.0).powi(2) / 2.0
                }
            }
            Self::EaseInCubic => t * t * t,
            Self::EaseOutCubic => 1.0 - (1.0 - t).powi(3),
        }
    }
}

/// An intermediate value pinned at a point of eased progress
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct Keyframe {
    /// Eased progress, strictly between 0.0 and 1.0
    pub at: f32,
    /// Value at that point
    pub value: f32,
}

/// A value animated from `from` to `to` over `duration_ms`
///
/// Easing maps elapsed time to progress first; the value is then linearly
/// interpolated between the surrounding keyframes. A fade that must hold its
/// start value for the first half is `from = 1.0, to = 0.0` with a keyframe
/// `(0.5, 1.0)`.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Tween {
    /// Start value
    pub from: f32,
    /// End value
    pub to: f32,
    /// Total duration in milliseconds
    pub duration_ms: u64,
    /// Progress curve
    #[serde(default)]
    pub easing: EasingFunction,
    /// Intermediate values, sorted by `at`
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub keyframes: Vec<Keyframe>,
}

impl Tween {
    /// Linear tween without keyframes
    #[must_use]
    pub fn new(from: f32, to: f32, duration_ms: u64) -> Self {
        Self {
            from,
            to,
            duration_ms,
            easing: EasingFunction::Linear,
            keyframes: Vec::new(),
        }
    }

    /// Set easing function
    #[must_use]
    pub fn with_easing(mut self, easing: EasingFunction) -> Self {
        self.easing = easing;
        self
    }

    /// Pin `value` at eased progress `at`
    ///
    /// Keyframes at or outside the 0.0/1.0 boundaries are ignored; those
    /// points are `from` and `to`.
    #[must_use]
    pub fn with_keyframe(mut self, at: f32, value: f32) -> Self {
        if at > 0.0 && at < 1.0 {
            let pos = self.keyframes.partition_point(|k| k.at < at);
            self.keyframes.insert(pos, Keyframe { at, value });
        }
        self
    }

    /// Linear (un-eased) progress after `elapsed_ms`, clamped to 0.0..=1.0
    #[must_use]
    pub fn progress(&self, elapsed_ms: u64) -> f32 {
        if self.duration_ms == 0 {
            return 1.0;
        }
        (elapsed_ms as f32 / self.duration_ms as f32).min(1.0)
    }

    /// Whether the tween has reached its end value
    #[must_use]
    pub fn is_complete(&self, elapsed_ms: u64) -> bool {
        elapsed_ms >= self.duration_ms
    }

    /// Sample the value after `elapsed_ms`
    #[must_use]
    pub fn value_at(&self, elapsed_ms: u64) -> f32 {
        let p = self.easing.apply(self.progress(elapsed_ms));

        let mut prev = Keyframe {
            at: 0.0,
            value: self.from,
        };
        let end = Keyframe {
            at: 1.0,
            value: self.to,
        };

        for next in self.keyframes.iter().copied().chain(std::iter::once(end)) {
            if p <= next.at {
                let span = next.at - prev.at;
                if span <= f32::EPSILON {
                    return next.value;
                }
                let local = (p - prev.at) / span;
                return prev.value + (next.value - prev.value) * local;
            }
            prev = next;
        }

        self.to
    }
}
