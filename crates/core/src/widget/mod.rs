use std::time::Duration;

use crate::{
    config::VenetianConfig,
    flap::Flap,
    lighting::{LightingAdapter, LightingRenderer},
    scheduler::{FlapScheduler, SchedulerEvent},
    stripe::Stripe,
    timeline::PlaybackClock,
    Result,
};

/// A complete split-flap widget: scheduler, clock and lighting overlay.
///
/// Each instance owns its state; hosts create one per display element and
/// call [`tick`](Self::tick) from their event loop.
#[derive(Debug)]
pub struct Venetian {
    scheduler: FlapScheduler,
    lighting: LightingAdapter,
    clock: PlaybackClock,
}

impl Venetian {
    pub fn new(
        config: VenetianConfig,
        lighting: Option<Box<dyn LightingRenderer>>,
    ) -> Result<Self> {
        config.validate()?;
        let lighting = LightingAdapter::new(lighting, config.lighting_tick())
            .with_light(config.light)
            .with_weight(config.face_weight);
        let scheduler = FlapScheduler::new(config)?;
        tracing::info!(stripes = scheduler.stripes().len(), "built venetian widget");
        Ok(Self {
            scheduler,
            lighting,
            clock: PlaybackClock::new(),
        })
    }

    pub fn scheduler(&self) -> &FlapScheduler {
        &self.scheduler
    }

    pub fn lighting(&self) -> &LightingAdapter {
        &self.lighting
    }

    pub fn stripes(&self) -> &[Stripe] {
        self.scheduler.stripes()
    }

    pub fn now(&self) -> Duration {
        self.clock.now()
    }

    pub fn register_flap(&mut self, flap: impl Into<Flap>) -> Result<()> {
        self.scheduler.register_flap(flap)
    }

    /// Advances to the next flap at the widget's current time.
    pub fn advance(&mut self) -> u64 {
        self.scheduler.advance(self.clock.now())
    }

    /// Starts the self-repeating advance without flipping right away.
    pub fn start(&mut self) {
        self.scheduler.start(self.clock.now());
    }

    pub fn stop(&mut self) {
        self.scheduler.stop();
    }

    /// Moves the clock to `now`, fires due scheduler tasks and refreshes
    /// the lighting overlay.
    pub fn tick(&mut self, now: Duration) -> Vec<SchedulerEvent> {
        self.clock.set(now);
        let now = self.clock.now();
        let events = self.scheduler.poll(now);
        self.lighting.tick(now, self.scheduler.stripes());
        events
    }

    /// Earliest instant at which [`tick`](Self::tick) has scheduler work.
    pub fn next_deadline(&self) -> Option<Duration> {
        self.scheduler.next_deadline()
    }

    /// Clears flaps and rotation, keeping the stripes and lighting.
    pub fn reset(&mut self) {
        self.scheduler.reset();
    }

    pub fn teardown(&mut self) {
        self.scheduler.stop();
        self.lighting.teardown();
        tracing::debug!("venetian widget torn down");
    }
}
