//! Optional lighting overlay.
//!
//! The overlay is decorative: a [`LightingAdapter`] without a renderer is a
//! valid configuration and every call on it is a no-op.

use std::{f32::consts::PI, fmt, time::Duration};

use serde::{Deserialize, Serialize};

use crate::stripe::{FaceSlot, Stripe, STEP_DEGREES};

/// Weight applied to each stripe's faces when none is configured.
pub const DEFAULT_FACE_WEIGHT: f32 = 0.5;

/// Point light, in the same space as the stripes. The viewer looks down -z.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Light {
    pub x: f32,
    pub y: f32,
    pub z: f32,
}

impl Default for Light {
    fn default() -> Self {
        Self {
            x: 0.0,
            y: 0.0,
            z: 1000.0,
        }
    }
}

impl Light {
    fn direction(&self) -> [f32; 3] {
        let len = (self.x * self.x + self.y * self.y + self.z * self.z).sqrt();
        if len <= f32::EPSILON {
            return [0.0, 0.0, 1.0];
        }
        [self.x / len, self.y / len, self.z / len]
    }
}

/// Faces of one stripe as seen by a lighting renderer.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FaceGroup {
    pub stripe: usize,
    /// Angle of the transform currently shown.
    pub angle: i64,
    pub faces: [FaceSlot; 3],
    pub weight: f32,
}

impl FaceGroup {
    pub fn from_stripe(stripe: &Stripe, weight: f32) -> Self {
        Self {
            stripe: stripe.index(),
            angle: stripe.applied_angle(),
            faces: FaceSlot::ALL,
            weight,
        }
    }

    /// Unit normal of `slot` after the stripe's rotation about the x axis.
    pub fn normal(&self, slot: FaceSlot) -> [f32; 3] {
        let degrees = (slot.index() as i64 * STEP_DEGREES + self.angle).rem_euclid(360);
        let radians = degrees as f32 * PI / 180.0;
        [0.0, radians.sin(), radians.cos()]
    }
}

/// Lighting capability injected by the host.
pub trait LightingRenderer {
    fn render(&mut self, light: &Light, groups: &[FaceGroup]);
}

/// Drives an optional [`LightingRenderer`] on a fixed tick.
pub struct LightingAdapter {
    renderer: Option<Box<dyn LightingRenderer>>,
    light: Light,
    weight: f32,
    tick: Duration,
    next_tick: Duration,
    torn_down: bool,
}

impl LightingAdapter {
    pub fn new(renderer: Option<Box<dyn LightingRenderer>>, tick: Duration) -> Self {
        if renderer.is_none() {
            tracing::warn!("no lighting renderer available, stripes will render without shading");
        }
        Self {
            renderer,
            light: Light::default(),
            weight: DEFAULT_FACE_WEIGHT,
            tick,
            next_tick: Duration::ZERO,
            torn_down: false,
        }
    }

    pub fn with_light(mut self, light: Light) -> Self {
        self.light = light;
        self
    }

    pub fn with_weight(mut self, weight: f32) -> Self {
        self.weight = weight;
        self
    }

    pub fn is_active(&self) -> bool {
        self.renderer.is_some() && !self.torn_down
    }

    pub fn light(&self) -> &Light {
        &self.light
    }

    /// Renders once if a tick has elapsed. Returns whether a frame was drawn.
    ///
    /// A host that falls more than one tick behind skips the backlog instead
    /// of rendering a burst.
    pub fn tick(&mut self, now: Duration, stripes: &[Stripe]) -> bool {
        if self.torn_down || now < self.next_tick {
            return false;
        }
        let Some(renderer) = self.renderer.as_mut() else {
            return false;
        };

        let groups: Vec<FaceGroup> = stripes
            .iter()
            .map(|stripe| FaceGroup::from_stripe(stripe, self.weight))
            .collect();
        renderer.render(&self.light, &groups);

        self.next_tick += self.tick;
        if self.next_tick <= now {
            self.next_tick = now + self.tick;
        }
        true
    }

    pub fn teardown(&mut self) {
        self.torn_down = true;
    }
}

impl fmt::Debug for LightingAdapter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("LightingAdapter")
            .field("renderer", &self.renderer.is_some())
            .field("light", &self.light)
            .field("tick", &self.tick)
            .field("torn_down", &self.torn_down)
            .finish()
    }
}

/// Built-in renderer darkening faces that turn away from the light.
///
/// A face looking straight at the light keeps full brightness; a face at a
/// right angle or beyond drops to `1 - weight`.
#[derive(Debug, Default, Clone)]
pub struct ShadeRenderer {
    shades: Vec<[f32; 3]>,
}

impl ShadeRenderer {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn shade(&self, stripe: usize, slot: FaceSlot) -> Option<f32> {
        self.shades.get(stripe).map(|faces| faces[slot.index()])
    }

    pub fn shades(&self) -> &[[f32; 3]] {
        &self.shades
    }
}

impl LightingRenderer for ShadeRenderer {
    fn render(&mut self, light: &Light, groups: &[FaceGroup]) {
        let direction = light.direction();
        self.shades.clear();
        for group in groups {
            let faces = group.faces.map(|slot| {
                let normal = group.normal(slot);
                let lambert = (normal[0] * direction[0]
                    + normal[1] * direction[1]
                    + normal[2] * direction[2])
                    .max(0.0);
                1.0 - group.weight * (1.0 - lambert)
            });
            self.shades.push(faces);
        }
    }
}
