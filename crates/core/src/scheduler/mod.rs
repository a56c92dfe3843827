//! Rotation state and content pre-loading for a bank of stripes.
//!
//! The scheduler owns one piece of persistent state, the accumulated angle.
//! Content for the face about to turn towards the viewer is loaded the moment
//! an advance starts; only the visual transforms are staggered through the
//! timer queue.

use std::time::Duration;

use crate::{
    config::VenetianConfig,
    flap::{Flap, FlapQueue},
    stripe::{FaceSlot, Stripe, STEP_DEGREES},
    timeline::{TaskHandle, TimerQueue},
    Result, VenetianError,
};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum SchedulerTask {
    /// Hand the rotation for `stripe` to the host.
    Reveal { stripe: usize, angle: i64 },
    /// Self-repeating advance.
    AutoAdvance,
}

/// Observable outcome of [`FlapScheduler::poll`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SchedulerEvent {
    /// A stripe's staggered transform is due and has been applied.
    StripeRevealed { stripe: usize, angle: i64 },
    /// The repeat timer fired and every stripe advanced to `angle`.
    Advanced { angle: u64 },
}

#[derive(Debug)]
pub struct FlapScheduler {
    config: VenetianConfig,
    stripes: Vec<Stripe>,
    flaps: FlapQueue,
    current_angle: u64,
    timers: TimerQueue<SchedulerTask>,
    auto_advance: Option<TaskHandle>,
}

impl FlapScheduler {
    pub fn new(config: VenetianConfig) -> Result<Self> {
        config.validate()?;
        let stripes = (0..config.stripes).map(Stripe::new).collect();
        Ok(Self {
            config,
            stripes,
            flaps: FlapQueue::new(),
            current_angle: 0,
            timers: TimerQueue::new(),
            auto_advance: None,
        })
    }

    pub fn config(&self) -> &VenetianConfig {
        &self.config
    }

    pub fn stripes(&self) -> &[Stripe] {
        &self.stripes
    }

    pub fn stripe(&self, index: usize) -> Option<&Stripe> {
        self.stripes.get(index)
    }

    /// Accumulated rotation in degrees. Always a multiple of 120, never wraps.
    pub fn current_angle(&self) -> u64 {
        self.current_angle
    }

    pub fn flap_count(&self) -> usize {
        self.flaps.len()
    }

    pub fn flaps(&self) -> &FlapQueue {
        &self.flaps
    }

    /// Index of the registered flap the front faces show, if any.
    pub fn current_flap(&self) -> Option<usize> {
        self.flaps.resolve(self.current_angle / STEP_DEGREES as u64)
    }

    /// Appends a flap to the queue.
    ///
    /// The very first flap is loaded straight onto every stripe's front face;
    /// later ones only show up through [`advance`](Self::advance).
    pub fn register_flap(&mut self, flap: impl Into<Flap>) -> Result<()> {
        let flap = flap.into();
        if flap.len() > self.stripes.len() {
            return Err(VenetianError::CapacityExceeded {
                contents: flap.len(),
                stripes: self.stripes.len(),
            });
        }

        self.flaps.push(flap);
        tracing::debug!(flaps = self.flaps.len(), "registered flap");

        if self.flaps.len() == 1 {
            for stripe in 0..self.stripes.len() {
                self.load_face_content(stripe, FaceSlot::Front, 0);
            }
        }
        Ok(())
    }

    /// Loads the content `relative_flap_index` wraps onto into one face.
    ///
    /// Returns `false` and leaves the face untouched when the flap has no
    /// content for this stripe, when no flap is registered yet, or when the
    /// stripe does not exist.
    pub fn load_face_content(
        &mut self,
        stripe: usize,
        slot: FaceSlot,
        relative_flap_index: u64,
    ) -> bool {
        let Some(content) = self.flaps.content(relative_flap_index, stripe) else {
            return false;
        };
        let Some(target) = self.stripes.get_mut(stripe) else {
            return false;
        };
        target.face_mut(slot).load(content);
        true
    }

    /// Turns every stripe one flap further.
    ///
    /// Content is loaded and the angle committed before returning; transforms
    /// are released one `animation_delay` apart from `now`. Any pending
    /// repeat is cancelled and, with auto-play, replaced by a fresh one.
    pub fn advance(&mut self, now: Duration) -> u64 {
        let next_angle = self.current_angle + STEP_DEGREES as u64;
        self.cancel_auto_advance();

        let relative_next_flap = next_angle / STEP_DEGREES as u64;
        let delay = self.config.animation_delay();
        for index in 0..self.stripes.len() {
            let stripe = &mut self.stripes[index];
            let angle = stripe.rotation().signed(next_angle as i64);
            let slot = FaceSlot::facing_at(angle);
            stripe.set_target(angle);

            self.load_face_content(index, slot, relative_next_flap);

            let stagger = delay.saturating_mul(u32::try_from(index).unwrap_or(u32::MAX));
            let at = now.saturating_add(stagger);
            self.timers
                .schedule(at, SchedulerTask::Reveal { stripe: index, angle });
        }
        self.current_angle = next_angle;
        tracing::debug!(angle = next_angle, "advanced stripes");

        if self.config.auto_play {
            self.start(now);
        }
        next_angle
    }

    /// Arms the repeat timer without advancing, replacing any pending one.
    ///
    /// Nothing is armed when the deadline would not fit in a `Duration`.
    pub fn start(&mut self, now: Duration) {
        self.cancel_auto_advance();
        let Some(at) = now.checked_add(self.config.animation_interval()) else {
            tracing::warn!(?now, "repeat deadline out of range, auto-advance not armed");
            return;
        };
        self.auto_advance = Some(self.timers.schedule(at, SchedulerTask::AutoAdvance));
    }

    /// Cancels the pending repeat. In-flight transforms still land.
    pub fn stop(&mut self) {
        self.cancel_auto_advance();
    }

    fn cancel_auto_advance(&mut self) {
        if let Some(handle) = self.auto_advance.take() {
            self.timers.cancel(handle);
        }
    }

    /// Fires every task due at `now`, including tasks scheduled by those
    /// that fire.
    pub fn poll(&mut self, now: Duration) -> Vec<SchedulerEvent> {
        let mut events = Vec::new();
        loop {
            let due = self.timers.drain_due(now);
            if due.is_empty() {
                break;
            }
            for task in due {
                match task {
                    SchedulerTask::Reveal { stripe, angle } => {
                        if let Some(target) = self.stripes.get_mut(stripe) {
                            target.apply(angle);
                            tracing::trace!(stripe, angle, "stripe revealed");
                            events.push(SchedulerEvent::StripeRevealed { stripe, angle });
                        }
                    }
                    SchedulerTask::AutoAdvance => {
                        self.auto_advance = None;
                        let angle = self.advance(now);
                        events.push(SchedulerEvent::Advanced { angle });
                    }
                }
            }
        }
        events
    }

    /// Number of repeat timers outstanding. Never more than one.
    pub fn pending_auto_advance(&self) -> usize {
        self.timers
            .count_matching(|task| matches!(task, SchedulerTask::AutoAdvance))
    }

    pub fn pending_reveals(&self) -> usize {
        self.timers
            .count_matching(|task| matches!(task, SchedulerTask::Reveal { .. }))
    }

    pub fn next_deadline(&self) -> Option<Duration> {
        self.timers.next_deadline()
    }

    /// Back to the freshly built state: no flaps, angle zero, empty faces,
    /// nothing scheduled.
    pub fn reset(&mut self) {
        self.timers.clear();
        self.auto_advance = None;
        self.flaps.clear();
        self.current_angle = 0;
        for stripe in &mut self.stripes {
            stripe.reset();
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::flap::FlapContent;

    fn ms(value: u64) -> Duration {
        Duration::from_millis(value)
    }

    fn scheduler(stripes: usize) -> FlapScheduler {
        FlapScheduler::new(VenetianConfig {
            stripes,
            ..Default::default()
        })
        .unwrap()
    }

    fn flap(prefix: &str, count: usize) -> Flap {
        (0..count)
            .map(|i| FlapContent::new(format!("{prefix}{i}")))
            .collect()
    }

    #[test]
    fn rejects_flaps_larger_than_the_stripe_count() {
        for stripes in 1..5 {
            let mut scheduler = scheduler(stripes);
            assert!(scheduler.register_flap(flap("a", stripes)).is_ok());
            let err = scheduler.register_flap(flap("b", stripes + 1)).unwrap_err();
            assert!(matches!(
                err,
                VenetianError::CapacityExceeded { contents, stripes: s } if contents == stripes + 1 && s == stripes
            ));
            assert_eq!(scheduler.flap_count(), 1);
        }
    }

    #[test]
    fn first_flap_loads_front_faces() {
        let mut scheduler = scheduler(3);
        scheduler.register_flap(flap("a", 2)).unwrap();

        let fronts: Vec<_> = scheduler
            .stripes()
            .iter()
            .map(|s| s.face(FaceSlot::Front).html())
            .collect();
        assert_eq!(fronts, vec![Some("a0"), Some("a1"), None]);
    }

    #[test]
    fn first_flap_after_advance_still_fills_physical_front() {
        let mut scheduler = scheduler(2);
        scheduler.advance(ms(0));
        scheduler.register_flap(flap("a", 2)).unwrap();

        let even = scheduler.stripe(0).unwrap();
        assert_eq!(even.face(FaceSlot::Front).html(), Some("a0"));
        assert_eq!(FaceSlot::facing_at(even.target_angle()), FaceSlot::Top);
        assert!(even.front_face().html().is_none());
        let odd = scheduler.stripe(1).unwrap();
        assert_eq!(odd.face(FaceSlot::Front).html(), Some("a1"));
        assert!(odd.front_face().html().is_none());
    }

    #[test]
    fn deadlines_saturate_at_the_end_of_time() {
        let mut scheduler = scheduler(3);
        scheduler.advance(Duration::MAX - ms(50));
        assert_eq!(scheduler.next_deadline(), Some(Duration::MAX - ms(50)));
        assert_eq!(scheduler.pending_reveals(), 3);
        assert_eq!(scheduler.pending_auto_advance(), 0);
        assert_eq!(scheduler.poll(Duration::MAX).len(), 3);
    }

    #[test]
    fn later_flaps_stay_hidden_until_advance() {
        let mut scheduler = scheduler(2);
        scheduler.register_flap(flap("a", 2)).unwrap();
        scheduler.register_flap(flap("b", 2)).unwrap();

        for stripe in scheduler.stripes() {
            for face in stripe.faces() {
                assert!(!face.html().unwrap_or_default().starts_with('b'));
            }
        }
    }

    #[test]
    fn angle_grows_by_one_step_per_advance() {
        let mut scheduler = scheduler(3);
        for call in 1..=7u64 {
            assert_eq!(scheduler.advance(ms(call)), call * 120);
        }
        assert_eq!(scheduler.current_angle(), 840);
    }

    #[test]
    fn advance_preloads_the_face_turning_forward() {
        let mut scheduler = scheduler(2);
        scheduler.register_flap(flap("a", 2)).unwrap();
        scheduler.register_flap(flap("b", 2)).unwrap();

        scheduler.advance(ms(0));
        let even = scheduler.stripe(0).unwrap();
        let odd = scheduler.stripe(1).unwrap();
        assert_eq!(even.face(FaceSlot::Top).html(), Some("b0"));
        assert_eq!(odd.face(FaceSlot::Bottom).html(), Some("b1"));
        assert_eq!(even.front_face().html(), Some("b0"));
        assert_eq!(odd.front_face().html(), Some("b1"));
    }

    #[test]
    fn front_faces_follow_the_flap_cycle() {
        let mut scheduler = scheduler(3);
        scheduler.register_flap(flap("a", 3)).unwrap();
        scheduler.register_flap(flap("b", 3)).unwrap();

        for call in 1..=6u64 {
            scheduler.advance(ms(call * 10));
            let expected = if call % 2 == 0 { "a" } else { "b" };
            for (i, stripe) in scheduler.stripes().iter().enumerate() {
                assert_eq!(
                    stripe.front_face().html(),
                    Some(format!("{expected}{i}").as_str())
                );
            }
            assert_eq!(scheduler.current_flap(), Some((call % 2) as usize));
        }
    }

    #[test]
    fn third_advance_with_two_flaps_loads_flap_one() {
        let mut scheduler = scheduler(1);
        scheduler.register_flap(flap("a", 1)).unwrap();
        scheduler.register_flap(flap("b", 1)).unwrap();
        scheduler.advance(ms(0));
        scheduler.advance(ms(0));
        scheduler.advance(ms(0));

        assert_eq!(scheduler.current_angle(), 360);
        let stripe = scheduler.stripe(0).unwrap();
        assert_eq!(FaceSlot::facing_at(stripe.target_angle()), FaceSlot::Front);
        assert_eq!(stripe.face(FaceSlot::Front).html(), Some("b0"));
    }

    #[test]
    fn missing_content_leaves_faces_untouched() {
        let mut scheduler = scheduler(3);
        scheduler.register_flap(flap("a", 3)).unwrap();
        scheduler.register_flap(flap("b", 1)).unwrap();
        scheduler.advance(ms(0));
        scheduler.advance(ms(0));
        scheduler.advance(ms(0));

        // Flap "b" never carries content for stripe 2.
        let stripe = scheduler.stripe(2).unwrap();
        assert_eq!(stripe.face(FaceSlot::Front).html(), Some("a2"));
        assert_eq!(stripe.front_face().html(), Some("a2"));
        assert!(!scheduler.load_face_content(2, FaceSlot::Top, 1));
    }

    #[test]
    fn advance_without_flaps_still_rotates() {
        let mut scheduler = scheduler(2);
        scheduler.advance(ms(0));
        assert_eq!(scheduler.current_angle(), 120);
        assert!(scheduler.stripes().iter().all(|s| s.front_face().html().is_none()));
    }

    #[test]
    fn styles_are_reset_when_content_has_none() {
        let mut scheduler = scheduler(1);
        scheduler
            .register_flap(vec![FlapContent::new("a").with_style("color", "red")])
            .unwrap();
        scheduler.register_flap(vec![FlapContent::new("b")]).unwrap();
        assert_eq!(scheduler.stripe(0).unwrap().face(FaceSlot::Front).styles().len(), 1);

        scheduler.advance(ms(0));
        scheduler.advance(ms(0));
        scheduler.advance(ms(0));
        let front = scheduler.stripe(0).unwrap().face(FaceSlot::Front);
        assert_eq!(front.html(), Some("b"));
        assert!(front.styles().is_empty());
    }

    #[test]
    fn transforms_are_staggered_per_stripe() {
        let mut scheduler = scheduler(3);
        scheduler.advance(ms(1000));
        assert_eq!(scheduler.pending_reveals(), 3);

        let events = scheduler.poll(ms(1000));
        assert_eq!(
            events,
            vec![SchedulerEvent::StripeRevealed { stripe: 0, angle: -120 }]
        );
        assert_eq!(scheduler.stripe(1).unwrap().applied_angle(), 0);

        let events = scheduler.poll(ms(1200));
        assert_eq!(
            events,
            vec![
                SchedulerEvent::StripeRevealed { stripe: 1, angle: 120 },
                SchedulerEvent::StripeRevealed { stripe: 2, angle: -120 },
            ]
        );
        assert_eq!(scheduler.stripe(2).unwrap().transform(), "rotateX( -120deg )");
    }

    #[test]
    fn angle_is_committed_before_transforms_land() {
        let mut scheduler = scheduler(3);
        scheduler.advance(ms(0));
        scheduler.advance(ms(10));
        assert_eq!(scheduler.current_angle(), 240);
        assert_eq!(scheduler.stripe(2).unwrap().target_angle(), -240);
        assert_eq!(scheduler.stripe(2).unwrap().applied_angle(), 0);

        scheduler.poll(ms(1000));
        assert_eq!(scheduler.stripe(2).unwrap().applied_angle(), -240);
    }

    #[test]
    fn rapid_advances_leave_one_repeat_outstanding() {
        let mut scheduler = scheduler(3);
        scheduler.advance(ms(0));
        scheduler.advance(ms(1));
        assert_eq!(scheduler.pending_auto_advance(), 1);

        scheduler.start(ms(2));
        assert_eq!(scheduler.pending_auto_advance(), 1);
    }

    #[test]
    fn repeat_timer_advances_and_rearms() {
        let mut scheduler = scheduler(1);
        scheduler.advance(ms(0));
        assert!(scheduler.poll(ms(4999)).iter().all(|e| !matches!(e, SchedulerEvent::Advanced { .. })));

        let events = scheduler.poll(ms(5000));
        assert!(events.contains(&SchedulerEvent::Advanced { angle: 240 }));
        assert!(events.contains(&SchedulerEvent::StripeRevealed { stripe: 0, angle: -240 }));
        assert_eq!(scheduler.pending_auto_advance(), 1);
        assert_eq!(scheduler.next_deadline(), Some(ms(10_000)));
    }

    #[test]
    fn stop_and_manual_mode_schedule_no_repeat() {
        let mut scheduler = FlapScheduler::new(VenetianConfig {
            auto_play: false,
            ..Default::default()
        })
        .unwrap();
        scheduler.advance(ms(0));
        assert_eq!(scheduler.pending_auto_advance(), 0);

        scheduler.start(ms(0));
        scheduler.stop();
        scheduler.stop();
        assert_eq!(scheduler.pending_auto_advance(), 0);
    }

    #[test]
    fn reset_returns_to_initial_state() {
        let mut scheduler = scheduler(2);
        scheduler.register_flap(flap("a", 2)).unwrap();
        scheduler.advance(ms(0));
        scheduler.reset();

        assert_eq!(scheduler.current_angle(), 0);
        assert_eq!(scheduler.flap_count(), 0);
        assert_eq!(scheduler.next_deadline(), None);
        assert!(scheduler.stripes().iter().all(|s| s.front_face().html().is_none()));
    }
}
