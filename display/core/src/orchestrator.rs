//! Animation Orchestrator
//!
//! Turns booking events into timed surface commands. The orchestrator is a
//! pure state machine over logical milliseconds: [`Orchestrator::handle_event`]
//! and [`Orchestrator::advance`] take the current time and return the
//! commands to send, and [`Orchestrator::next_deadline`] says when to call
//! `advance` next. It never sleeps or spawns; the kiosk loop owns time.
//!
//! # Choreography
//!
//! ```text
//! upcomingBookingsChanged @t   ──▶ upcoming group fades out @t
//!                                  (promotion slide @t+1100 if the first
//!                                   stored slot is now the current booking)
//! currentBookingChanged   @t   ──▶ strip wipe, name, info, status @t+1600
//! ```
//!
//! The current booking id used for the promotion check is updated as soon
//! as the event arrives, not when the delayed update is applied. The kiosk
//! emits the current booking before the upcoming list, so a booking that
//! just started is recognised in the same poll.
//!
//! Cues that fall due together run in the order they were scheduled, and a
//! cue's follow-ups are scheduled relative to its due time, so the output
//! does not depend on how late `advance` is called.

use crate::animation::{
    AnimatedRegion, EasingFunction, PhaseError, RegionContent, RegionPhase, RegionProfile,
    Request, StatusStrip, StripSegment, Timeline, Tween, SLOT_OPACITY, WIPE_MS,
};
use crate::booking::{CurrentBooking, CurrentBookingState, Slot, UpcomingBookings};
use crate::config::{ColorsConfig, DisplayConfig, LimitsConfig, TextsConfig};
use crate::events::BookingEvent;
use crate::messages::{
    truncate_with_ellipsis, DisplayCommand, Property, RegionId, Rgb, SlotText, Target,
};

/// Delay between a current-booking change and its display update
pub const CURRENT_BOOKING_DELAY_MS: u64 = 1600;

/// Delay between an upcoming change and the promotion slide
pub const PROMOTION_DELAY_MS: u64 = 1100;

/// Duration of the promotion slide
pub const PROMOTION_SLIDE_MS: u64 = 1200;

/// Vertical travel of the promotion slide (up and out)
pub const PROMOTION_OFFSET_PX: f32 = -159.0;

#[derive(Clone, Debug)]
enum Cue {
    ApplyCurrentBooking(CurrentBooking),
    FadeOutDone(RegionId),
    FadeInDone(RegionId),
    WipeDone,
    StartPromotion,
    PromotionDone,
}

impl Cue {
    fn name(&self) -> &'static str {
        match self {
            Self::ApplyCurrentBooking(_) => "apply_current_booking",
            Self::FadeOutDone(_) => "fade_out_done",
            Self::FadeInDone(_) => "fade_in_done",
            Self::WipeDone => "wipe_done",
            Self::StartPromotion => "start_promotion",
            Self::PromotionDone => "promotion_done",
        }
    }
}

/// Sequences the display's animated transitions
#[derive(Debug)]
pub struct Orchestrator {
    colors: ColorsConfig,
    limits: LimitsConfig,
    texts: TextsConfig,
    regions: Vec<AnimatedRegion>,
    strip: StatusStrip,
    timeline: Timeline<Cue>,
    current_booking_id: String,
    stored_upcoming: Option<UpcomingBookings>,
    promoting: bool,
}

impl Orchestrator {
    /// Create an orchestrator showing the unbooked state
    #[must_use]
    pub fn new(config: &DisplayConfig) -> Self {
        Self {
            colors: config.colors,
            limits: config.limits,
            texts: config.texts.clone(),
            regions: vec![
                AnimatedRegion::new(RegionId::Name, RegionProfile::name()),
                AnimatedRegion::new(RegionId::Info, RegionProfile::info()),
                AnimatedRegion::new(RegionId::Status, RegionProfile::status()),
                AnimatedRegion::new(RegionId::Upcoming, RegionProfile::upcoming()),
            ],
            strip: StatusStrip::new(config.colors.unbooked),
            timeline: Timeline::new(),
            current_booking_id: String::new(),
            stored_upcoming: None,
            promoting: false,
        }
    }

    /// Commands that draw the boot state
    #[must_use]
    pub fn initial_frame(&self) -> Vec<DisplayCommand> {
        let mut frame = vec![
            DisplayCommand::SetBackground {
                color: self.colors.background,
            },
            DisplayCommand::SetStatusColor {
                color: self.strip.displayed(),
            },
            DisplayCommand::SetText {
                region: RegionId::Name,
                text: truncate_with_ellipsis(&self.texts.unbooked_name, self.limits.name_max_chars),
            },
            DisplayCommand::SetText {
                region: RegionId::Info,
                text: truncate_with_ellipsis(
                    &self.texts.unbooked_info,
                    self.limits.username_max_chars,
                ),
            },
            DisplayCommand::SetText {
                region: RegionId::Status,
                text: self.texts.unbooked_status.clone(),
            },
            self.slots_command(&UpcomingBookings::default()),
        ];

        for target in [Target::Name, Target::Info, Target::Status] {
            frame.push(DisplayCommand::SetOpacity {
                target,
                opacity: 1.0,
            });
        }
        for slot in Slot::ALL {
            frame.push(DisplayCommand::SetOpacity {
                target: Target::UpcomingSlot(slot),
                opacity: SLOT_OPACITY[slot.index()],
            });
        }
        frame
    }

    /// React to a booking event arriving at `now_ms`
    pub fn handle_event(&mut self, event: &BookingEvent, now_ms: u64) -> Vec<DisplayCommand> {
        let mut out = Vec::new();

        match event {
            BookingEvent::CurrentBookingChanged(current) => {
                self.current_booking_id.clone_from(&current.id);
                self.timeline.schedule(
                    now_ms + CURRENT_BOOKING_DELAY_MS,
                    Cue::ApplyCurrentBooking(current.clone()),
                );
            }
            BookingEvent::UpcomingBookingsChanged(upcoming) => {
                if self.first_upcoming_started() {
                    tracing::debug!(
                        booking_id = %self.current_booking_id,
                        "First upcoming booking has started, promoting"
                    );
                    self.timeline
                        .schedule(now_ms + PROMOTION_DELAY_MS, Cue::StartPromotion);
                }
                self.stored_upcoming = Some(upcoming.clone());
                self.request(
                    RegionId::Upcoming,
                    RegionContent::Slots(upcoming.clone()),
                    now_ms,
                    &mut out,
                );
            }
        }

        out
    }

    /// Run every cue due at or before `now_ms`
    pub fn advance(&mut self, now_ms: u64) -> Vec<DisplayCommand> {
        let mut out = Vec::new();
        while let Some((due, cue)) = self.timeline.pop_due(now_ms) {
            tracing::trace!(cue = cue.name(), due, "Cue fired");
            if let Err(e) = self.run_cue(cue, due, &mut out) {
                tracing::warn!(error = %e, "Ignoring out-of-phase animation cue");
            }
        }
        out
    }

    /// When `advance` next has work to do
    #[must_use]
    pub fn next_deadline(&self) -> Option<u64> {
        self.timeline.next_deadline()
    }

    /// Number of scheduled cues
    #[must_use]
    pub fn pending_cues(&self) -> usize {
        self.timeline.len()
    }

    /// Phase of a text region or the upcoming group
    #[must_use]
    pub fn region_phase(&self, id: RegionId) -> Option<RegionPhase> {
        self.regions.iter().find(|r| r.id() == id).map(AnimatedRegion::phase)
    }

    /// The status strip
    #[must_use]
    pub fn strip(&self) -> &StatusStrip {
        &self.strip
    }

    /// Painted spans of a `width`-pixel status strip at `now_ms`
    #[must_use]
    pub fn strip_segments(&self, now_ms: u64, width: u32) -> Vec<StripSegment> {
        self.strip.frame_at(now_ms, width)
    }

    /// Id of the booking most recently reported as current
    #[must_use]
    pub fn current_booking_id(&self) -> &str {
        &self.current_booking_id
    }

    /// Whether the promotion slide is running
    #[must_use]
    pub fn is_promoting(&self) -> bool {
        self.promoting
    }

    fn first_upcoming_started(&self) -> bool {
        self.stored_upcoming.as_ref().is_some_and(|stored| {
            let first = &stored.first().id;
            !first.is_empty() && *first == self.current_booking_id
        })
    }

    fn run_cue(
        &mut self,
        cue: Cue,
        now_ms: u64,
        out: &mut Vec<DisplayCommand>,
    ) -> Result<(), PhaseError> {
        match cue {
            Cue::ApplyCurrentBooking(current) => self.apply_current(&current, now_ms, out),
            Cue::FadeOutDone(id) => self.swap_and_fade_in(id, now_ms, out)?,
            Cue::FadeInDone(id) => self.settle(id, now_ms, out)?,
            Cue::WipeDone => {
                let next = self.strip.finish_wipe(now_ms)?;
                out.push(DisplayCommand::SetStatusColor {
                    color: self.strip.displayed(),
                });
                if let Some(wipe) = next {
                    out.push(wipe);
                    self.timeline.schedule(now_ms + WIPE_MS, Cue::WipeDone);
                }
            }
            Cue::StartPromotion => {
                if self.promoting {
                    tracing::debug!("Promotion slide already running");
                } else {
                    self.promoting = true;
                    out.push(DisplayCommand::Animate {
                        target: Target::UpcomingSlot(Slot::First),
                        property: Property::OffsetY,
                        tween: Tween::new(0.0, PROMOTION_OFFSET_PX, PROMOTION_SLIDE_MS)
                            .with_easing(EasingFunction::EaseInCubic),
                    });
                    self.timeline
                        .schedule(now_ms + PROMOTION_SLIDE_MS, Cue::PromotionDone);
                }
            }
            Cue::PromotionDone => {
                self.promoting = false;
                out.push(DisplayCommand::ResetOffset {
                    target: Target::UpcomingSlot(Slot::First),
                });
            }
        }
        Ok(())
    }

    fn apply_current(&mut self, current: &CurrentBooking, now_ms: u64, out: &mut Vec<DisplayCommand>) {
        tracing::debug!(booking_id = %current.id, state = ?current.state, "Applying current booking");

        if let Some(wipe) = self.strip.request(self.strip_color(current.state), now_ms) {
            out.push(wipe);
            self.timeline.schedule(now_ms + WIPE_MS, Cue::WipeDone);
        } else {
            tracing::debug!("Strip wipe running, color queued");
        }

        let name = truncate_with_ellipsis(&current.name, self.limits.name_max_chars);
        let info = truncate_with_ellipsis(&current.info, self.limits.username_max_chars);
        self.request(RegionId::Name, RegionContent::Text(name), now_ms, out);
        self.request(
            RegionId::Status,
            RegionContent::Text(current.status.clone()),
            now_ms,
            out,
        );
        self.request(RegionId::Info, RegionContent::Text(info), now_ms, out);
    }

    fn request(
        &mut self,
        id: RegionId,
        content: RegionContent,
        now_ms: u64,
        out: &mut Vec<DisplayCommand>,
    ) {
        let Some(region) = self.regions.iter_mut().find(|r| r.id() == id) else {
            return;
        };

        match region.request(content) {
            Request::Started => {
                out.extend(region.fade_out_commands());
                let due = now_ms + region.profile().fade_out_ms();
                self.timeline.schedule(due, Cue::FadeOutDone(id));
            }
            Request::Queued => {
                tracing::debug!(region = %id, "Transition running, coalescing update");
            }
        }
    }

    fn swap_and_fade_in(
        &mut self,
        id: RegionId,
        now_ms: u64,
        out: &mut Vec<DisplayCommand>,
    ) -> Result<(), PhaseError> {
        let upcoming_limit = self.limits.upcoming_name_max_chars;
        let Some(region) = self.regions.iter_mut().find(|r| r.id() == id) else {
            return Ok(());
        };

        match region.finish_fade_out()? {
            RegionContent::Text(text) => out.push(DisplayCommand::SetText { region: id, text }),
            RegionContent::Slots(slots) => out.push(slots_command(&slots, upcoming_limit)),
        }
        region.begin_fade_in()?;
        out.extend(region.fade_in_commands());

        let due = now_ms + region.profile().fade_in_ms();
        self.timeline.schedule(due, Cue::FadeInDone(id));
        Ok(())
    }

    fn settle(
        &mut self,
        id: RegionId,
        now_ms: u64,
        out: &mut Vec<DisplayCommand>,
    ) -> Result<(), PhaseError> {
        let Some(region) = self.regions.iter_mut().find(|r| r.id() == id) else {
            return Ok(());
        };

        if region.finish_fade_in()?.is_some() {
            out.extend(region.fade_out_commands());
            let due = now_ms + region.profile().fade_out_ms();
            self.timeline.schedule(due, Cue::FadeOutDone(id));
        }
        Ok(())
    }

    fn strip_color(&self, state: CurrentBookingState) -> Rgb {
        match state {
            CurrentBookingState::Unbooked => self.colors.unbooked,
            CurrentBookingState::Booked => self.colors.booked,
            CurrentBookingState::Error => self.colors.error,
        }
    }

    fn slots_command(&self, upcoming: &UpcomingBookings) -> DisplayCommand {
        slots_command(upcoming, self.limits.upcoming_name_max_chars)
    }
}

fn slots_command(upcoming: &UpcomingBookings, name_max_chars: usize) -> DisplayCommand {
    DisplayCommand::SetSlots {
        slots: Slot::ALL.map(|slot| SlotText::from_booking(&upcoming[slot], name_max_chars)),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::booking::UpcomingBooking;
    use pretty_assertions::assert_eq;

    fn orchestrator() -> Orchestrator {
        Orchestrator::new(&DisplayConfig::default())
    }

    fn booked(id: &str, name: &str) -> CurrentBooking {
        CurrentBooking {
            state: CurrentBookingState::Booked,
            id: id.to_string(),
            name: name.to_string(),
            info: "Booked by Sam".to_string(),
            status: "10:00 - 11:00".to_string(),
        }
    }

    fn upcoming(ids: &[&str]) -> UpcomingBookings {
        UpcomingBookings::padded(ids.iter().map(|id| UpcomingBooking {
            id: id.to_string(),
            name: format!("Booking {id}"),
            time_string: "10:00 - 11:00".to_string(),
        }))
    }

    fn kinds(commands: &[DisplayCommand]) -> Vec<&'static str> {
        commands.iter().map(DisplayCommand::kind).collect()
    }

    fn has_promotion_slide(commands: &[DisplayCommand]) -> bool {
        commands.iter().any(|c| {
            matches!(
                c,
                DisplayCommand::Animate {
                    target: Target::UpcomingSlot(Slot::First),
                    property: Property::OffsetY,
                    ..
                }
            )
        })
    }

    #[test]
    fn test_initial_frame_shows_unbooked_state() {
        let frame = orchestrator().initial_frame();

        assert!(frame.contains(&DisplayCommand::SetStatusColor {
            color: ColorsConfig::default().unbooked
        }));
        assert!(frame.contains(&DisplayCommand::SetText {
            region: RegionId::Name,
            text: "Configure me please!".to_string()
        }));
        assert!(frame.contains(&DisplayCommand::SetOpacity {
            target: Target::UpcomingSlot(Slot::Third),
            opacity: 0.4
        }));
    }

    #[test]
    fn test_current_booking_applies_after_delay() {
        let mut orch = orchestrator();
        let immediate =
            orch.handle_event(&BookingEvent::CurrentBookingChanged(booked("1", "Standup")), 0);

        assert!(immediate.is_empty());
        assert_eq!(orch.current_booking_id(), "1");
        assert_eq!(orch.next_deadline(), Some(CURRENT_BOOKING_DELAY_MS));
        assert!(orch.advance(CURRENT_BOOKING_DELAY_MS - 1).is_empty());

        let applied = orch.advance(CURRENT_BOOKING_DELAY_MS);
        assert_eq!(kinds(&applied)[0], "wipe_status_color");
        assert_eq!(orch.region_phase(RegionId::Name), Some(RegionPhase::FadingOut));
        assert_eq!(orch.region_phase(RegionId::Info), Some(RegionPhase::FadingOut));
        assert_eq!(orch.region_phase(RegionId::Status), Some(RegionPhase::FadingOut));
    }

    #[test]
    fn test_text_swaps_only_after_fade_out() {
        let mut orch = orchestrator();
        orch.handle_event(&BookingEvent::CurrentBookingChanged(booked("1", "Standup")), 0);
        orch.advance(1600);

        // Name fades out for 500 ms
        assert!(orch.advance(2099).is_empty());
        let swapped = orch.advance(2100);
        assert_eq!(
            swapped[0],
            DisplayCommand::SetText {
                region: RegionId::Name,
                text: "Standup".to_string()
            }
        );
        assert_eq!(orch.region_phase(RegionId::Name), Some(RegionPhase::FadingIn));

        // Name fade-in is 1000 ms
        orch.advance(3099);
        assert_eq!(orch.region_phase(RegionId::Name), Some(RegionPhase::FadingIn));
        orch.advance(3100);
        assert_eq!(orch.region_phase(RegionId::Name), Some(RegionPhase::Idle));
    }

    #[test]
    fn test_strip_commits_color_at_end_of_wipe() {
        let mut orch = orchestrator();
        orch.handle_event(&BookingEvent::CurrentBookingChanged(booked("1", "Standup")), 0);
        orch.advance(1600);

        let booked_color = ColorsConfig::default().booked;
        assert_eq!(orch.strip().target(), booked_color);
        assert_ne!(orch.strip().displayed(), booked_color);

        let mid = orch.strip_segments(1950, 100);
        assert_eq!(mid.len(), 2);
        assert_eq!(mid[1].color, booked_color);
        assert_eq!(mid[1].span, 50..100);

        let done = orch.advance(2300);
        assert!(done.contains(&DisplayCommand::SetStatusColor {
            color: booked_color
        }));
        assert_eq!(orch.strip().displayed(), booked_color);
    }

    #[test]
    fn test_error_state_paints_strip_black() {
        let mut orch = orchestrator();
        let error = CurrentBooking {
            state: CurrentBookingState::Error,
            id: "error".to_string(),
            ..Default::default()
        };
        orch.handle_event(&BookingEvent::CurrentBookingChanged(error), 0);
        orch.advance(1600);

        assert_eq!(orch.strip().target(), Rgb::BLACK);
    }

    #[test]
    fn test_upcoming_group_fades_immediately() {
        let mut orch = orchestrator();
        let out = orch.handle_event(&BookingEvent::UpcomingBookingsChanged(upcoming(&["5"])), 0);

        assert_eq!(kinds(&out), vec!["animate", "animate", "animate"]);
        assert_eq!(orch.region_phase(RegionId::Upcoming), Some(RegionPhase::FadingOut));

        // slots are swapped once the slowest slot (2000 ms) has faded out
        assert!(orch.advance(1999).is_empty());
        let swapped = orch.advance(2000);
        assert_eq!(kinds(&swapped)[0], "set_slots");
        assert_eq!(orch.region_phase(RegionId::Upcoming), Some(RegionPhase::FadingIn));

        orch.advance(3600);
        assert_eq!(orch.region_phase(RegionId::Upcoming), Some(RegionPhase::Idle));
    }

    #[test]
    fn test_slot_names_are_truncated() {
        let mut orch = orchestrator();
        let list = UpcomingBookings::padded(vec![UpcomingBooking {
            id: "9".to_string(),
            name: "Quarterly business review".to_string(),
            time_string: "13:00 - 14:00".to_string(),
        }]);
        orch.handle_event(&BookingEvent::UpcomingBookingsChanged(list), 0);

        let swapped = orch.advance(2000);
        let DisplayCommand::SetSlots { slots } = &swapped[0] else {
            panic!("expected set_slots, got {:?}", swapped[0]);
        };
        assert_eq!(slots[0].name, "Quarterly busines...");
        assert_eq!(slots[1], SlotText::default());
    }

    #[test]
    fn test_changes_during_transition_coalesce() {
        let mut orch = orchestrator();
        orch.handle_event(&BookingEvent::UpcomingBookingsChanged(upcoming(&["1"])), 0);
        assert!(orch
            .handle_event(&BookingEvent::UpcomingBookingsChanged(upcoming(&["2"])), 500)
            .is_empty());
        assert!(orch
            .handle_event(&BookingEvent::UpcomingBookingsChanged(upcoming(&["3"])), 900)
            .is_empty());

        let first_swap = orch.advance(2000);
        let DisplayCommand::SetSlots { slots } = &first_swap[0] else {
            panic!("expected set_slots");
        };
        assert_eq!(slots[0].name, "Booking 1");

        // fade-in ends at 3600 and the latest list starts fading out again
        let restart = orch.advance(3600);
        assert_eq!(kinds(&restart), vec!["animate", "animate", "animate"]);
        let second_swap = orch.advance(5600);
        let DisplayCommand::SetSlots { slots } = &second_swap[0] else {
            panic!("expected set_slots");
        };
        assert_eq!(slots[0].name, "Booking 3");
    }

    #[test]
    fn test_promotion_when_first_upcoming_becomes_current() {
        let mut orch = orchestrator();
        orch.handle_event(&BookingEvent::UpcomingBookingsChanged(upcoming(&["7", "8"])), 0);
        orch.advance(10_000);

        // Next poll: booking 7 has started
        let t = 20_000;
        orch.handle_event(&BookingEvent::CurrentBookingChanged(booked("7", "Planning")), t);
        orch.handle_event(&BookingEvent::UpcomingBookingsChanged(upcoming(&["8"])), t);

        assert!(!has_promotion_slide(&orch.advance(t + PROMOTION_DELAY_MS - 1)));
        let slide = orch.advance(t + PROMOTION_DELAY_MS);
        assert!(has_promotion_slide(&slide));
        assert!(orch.is_promoting());

        let end = t + PROMOTION_DELAY_MS + PROMOTION_SLIDE_MS;
        let reset = orch.advance(end);
        assert!(reset.contains(&DisplayCommand::ResetOffset {
            target: Target::UpcomingSlot(Slot::First)
        }));
        assert!(!orch.is_promoting());
    }

    #[test]
    fn test_no_promotion_without_matching_id() {
        let mut orch = orchestrator();
        orch.handle_event(&BookingEvent::UpcomingBookingsChanged(upcoming(&["7"])), 0);
        orch.advance(10_000);

        orch.handle_event(&BookingEvent::CurrentBookingChanged(booked("3", "Other")), 20_000);
        orch.handle_event(&BookingEvent::UpcomingBookingsChanged(upcoming(&["8"])), 20_000);

        for t in (20_000..30_000).step_by(100) {
            assert!(!has_promotion_slide(&orch.advance(t)));
        }
    }

    #[test]
    fn test_empty_ids_never_promote() {
        let mut orch = orchestrator();
        orch.handle_event(&BookingEvent::UpcomingBookingsChanged(upcoming(&[])), 0);
        orch.handle_event(
            &BookingEvent::CurrentBookingChanged(CurrentBooking::default()),
            10,
        );
        orch.handle_event(&BookingEvent::UpcomingBookingsChanged(upcoming(&["1"])), 20);

        assert!(!has_promotion_slide(&orch.advance(10_000)));
    }
}
