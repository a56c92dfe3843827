//! Rotating prisms and their three faces.
//!
//! A stripe never moves its faces: rotating the prism by 120 degrees brings a
//! different physical face towards the viewer. Which one is computed from the
//! accumulated angle, so the stored angle is never wrapped.

use serde::{Deserialize, Serialize};

use crate::flap::{FlapContent, StyleMap};

/// Degrees a stripe turns per flap.
pub const STEP_DEGREES: i64 = 120;

const VENDOR_PREFIXES: [&str; 5] = ["-webkit-", "-moz-", "-ms-", "-o-", ""];

/// Physical face position on a stripe, in layout order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum FaceSlot {
    Front,
    Top,
    Bottom,
}

impl FaceSlot {
    pub const ALL: [FaceSlot; 3] = [FaceSlot::Front, FaceSlot::Top, FaceSlot::Bottom];

    pub fn index(self) -> usize {
        match self {
            FaceSlot::Front => 0,
            FaceSlot::Top => 1,
            FaceSlot::Bottom => 2,
        }
    }

    /// Slot facing the viewer once the stripe sits at `angle` degrees.
    ///
    /// `%` keeps the sign of the dividend, so the count of steps is reduced
    /// with `rem_euclid` to stay in `0..3` for either rotation direction.
    pub fn facing_at(angle: i64) -> FaceSlot {
        let steps = -angle / STEP_DEGREES;
        Self::ALL[steps.rem_euclid(3) as usize]
    }
}

/// Direction a stripe turns in. Neighbouring stripes turn opposite ways.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Rotation {
    Clockwise,
    CounterClockwise,
}

impl Rotation {
    pub fn for_stripe(index: usize) -> Self {
        if index % 2 == 0 {
            Rotation::Clockwise
        } else {
            Rotation::CounterClockwise
        }
    }

    /// Signed transform angle for an accumulated rotation.
    pub fn signed(self, angle: i64) -> i64 {
        match self {
            Rotation::Clockwise => -angle,
            Rotation::CounterClockwise => angle,
        }
    }
}

/// One of the three surfaces of a stripe.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Face {
    slot: FaceSlot,
    html: Option<String>,
    styles: StyleMap,
}

impl Face {
    pub fn new(slot: FaceSlot) -> Self {
        Self {
            slot,
            html: None,
            styles: StyleMap::new(),
        }
    }

    pub fn slot(&self) -> FaceSlot {
        self.slot
    }

    /// Markup currently held by the inner container, `None` if never loaded.
    pub fn html(&self) -> Option<&str> {
        self.html.as_deref()
    }

    /// Inline style overrides currently applied to the face.
    pub fn styles(&self) -> &StyleMap {
        &self.styles
    }

    /// Replaces the markup and updates inline styles.
    ///
    /// Overrides carried by the content are set on top of the current ones;
    /// content without overrides strips every inline style.
    pub fn load(&mut self, content: &FlapContent) {
        self.html = Some(content.html.clone());
        match &content.styles {
            Some(styles) => self
                .styles
                .extend(styles.iter().map(|(k, v)| (k.clone(), v.clone()))),
            None => self.styles.clear(),
        }
    }

    pub fn clear(&mut self) {
        self.html = None;
        self.styles.clear();
    }
}

/// A rotating three-faced prism.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Stripe {
    index: usize,
    rotation: Rotation,
    faces: [Face; 3],
    target_angle: i64,
    applied_angle: i64,
}

impl Stripe {
    pub fn new(index: usize) -> Self {
        Self {
            index,
            rotation: Rotation::for_stripe(index),
            faces: FaceSlot::ALL.map(Face::new),
            target_angle: 0,
            applied_angle: 0,
        }
    }

    pub fn index(&self) -> usize {
        self.index
    }

    pub fn rotation(&self) -> Rotation {
        self.rotation
    }

    pub fn faces(&self) -> &[Face; 3] {
        &self.faces
    }

    pub fn face(&self, slot: FaceSlot) -> &Face {
        &self.faces[slot.index()]
    }

    pub fn face_mut(&mut self, slot: FaceSlot) -> &mut Face {
        &mut self.faces[slot.index()]
    }

    /// Angle the stripe is heading to. Updated as soon as an advance starts.
    pub fn target_angle(&self) -> i64 {
        self.target_angle
    }

    /// Angle of the last transform handed to the host.
    pub fn applied_angle(&self) -> i64 {
        self.applied_angle
    }

    pub(crate) fn set_target(&mut self, angle: i64) {
        self.target_angle = angle;
    }

    pub(crate) fn apply(&mut self, angle: i64) {
        self.applied_angle = angle;
    }

    /// Face that will face the viewer once the pending rotation lands.
    pub fn front_face(&self) -> &Face {
        self.face(FaceSlot::facing_at(self.target_angle))
    }

    /// Face the viewer currently sees.
    pub fn visible_face(&self) -> &Face {
        self.face(FaceSlot::facing_at(self.applied_angle))
    }

    /// CSS transform value for the applied angle.
    pub fn transform(&self) -> String {
        transform_value(self.applied_angle)
    }

    /// `(property, value)` pairs covering every vendor prefix.
    pub fn vendor_transforms(&self) -> Vec<(String, String)> {
        let value = self.transform();
        VENDOR_PREFIXES
            .iter()
            .map(|prefix| (format!("{prefix}transform"), value.clone()))
            .collect()
    }

    pub(crate) fn reset(&mut self) {
        self.target_angle = 0;
        self.applied_angle = 0;
        for face in &mut self.faces {
            face.clear();
        }
    }
}

pub fn transform_value(angle: i64) -> String {
    format!("rotateX( {angle}deg )")
}
