use std::{path::Path, time::Duration};

use serde::{Deserialize, Serialize};

use crate::{
    lighting::{Light, DEFAULT_FACE_WEIGHT},
    Result, VenetianError,
};

/// Upper bound for every `*_ms` timing value: one day.
pub const MAX_TIMING_MS: u64 = 24 * 60 * 60 * 1000;

/// Top-level configuration structure for a Venetian widget.
///
/// Every field has a default, so a partial JSON document such as
/// `{"stripes": 5}` is a valid configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct VenetianConfig {
    /// Number of stripes, and therefore the maximum number of entries per flap.
    pub stripes: usize,
    /// Duration of a single stripe transform. Passed through to the host.
    pub animation_duration_ms: u64,
    /// Stagger between two neighbouring stripes starting their rotation.
    pub animation_delay_ms: u64,
    /// Period of the self-repeating advance.
    pub animation_interval_ms: u64,
    /// Re-arm the repeat timer after every advance.
    pub auto_play: bool,
    /// Period of the lighting overlay refresh.
    pub lighting_tick_ms: u64,
    /// Light source handed to the lighting renderer.
    pub light: Light,
    /// How strongly faces turned away from the light are darkened.
    pub face_weight: f32,
    pub classes: StripeClasses,
}

impl Default for VenetianConfig {
    fn default() -> Self {
        Self {
            stripes: 3,
            animation_duration_ms: 1000,
            animation_delay_ms: 100,
            animation_interval_ms: 5000,
            auto_play: true,
            lighting_tick_ms: 34,
            light: Light::default(),
            face_weight: DEFAULT_FACE_WEIGHT,
            classes: StripeClasses::default(),
        }
    }
}

impl VenetianConfig {
    /// Parses a JSON document and validates the result.
    pub fn from_json_str(json: &str) -> Result<Self> {
        let config: Self = serde_json::from_str(json)?;
        config.validate()?;
        Ok(config)
    }

    /// Reads and parses a JSON configuration file.
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let raw = std::fs::read_to_string(path)?;
        Self::from_json_str(&raw)
    }

    pub fn validate(&self) -> Result<()> {
        if self.stripes == 0 {
            return Err(VenetianError::InvalidConfig(
                "a widget needs at least one stripe".to_string(),
            ));
        }
        if self.auto_play && self.animation_interval_ms == 0 {
            return Err(VenetianError::InvalidConfig(
                "auto-play requires a non-zero animation interval".to_string(),
            ));
        }
        if self.lighting_tick_ms == 0 {
            return Err(VenetianError::InvalidConfig(
                "lighting tick must be non-zero".to_string(),
            ));
        }
        let timings = [
            ("animation_duration_ms", self.animation_duration_ms),
            ("animation_delay_ms", self.animation_delay_ms),
            ("animation_interval_ms", self.animation_interval_ms),
            ("lighting_tick_ms", self.lighting_tick_ms),
        ];
        if let Some((name, value)) = timings.iter().find(|(_, value)| *value > MAX_TIMING_MS) {
            return Err(VenetianError::InvalidConfig(format!(
                "{name} = {value} exceeds {MAX_TIMING_MS}"
            )));
        }
        if !(0.0..=1.0).contains(&self.face_weight) {
            return Err(VenetianError::InvalidConfig(
                "face weight must lie in [0, 1]".to_string(),
            ));
        }
        Ok(())
    }

    pub fn animation_duration(&self) -> Duration {
        Duration::from_millis(self.animation_duration_ms)
    }

    pub fn animation_delay(&self) -> Duration {
        Duration::from_millis(self.animation_delay_ms)
    }

    pub fn animation_interval(&self) -> Duration {
        Duration::from_millis(self.animation_interval_ms)
    }

    pub fn lighting_tick(&self) -> Duration {
        Duration::from_millis(self.lighting_tick_ms)
    }
}

/// Class names the host applies to the generated markup. Purely cosmetic.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct StripeClasses {
    /// Encapsulates the 3D space in which the stripe turns.
    pub space: String,
    pub stripe: String,
    pub face: String,
    pub face_front: String,
    pub face_top: String,
    pub face_bottom: String,
    /// Inner container of a face, so padding can be applied.
    pub face_inner: String,
}

impl Default for StripeClasses {
    fn default() -> Self {
        Self {
            space: "stripe-space".to_string(),
            stripe: "stripe".to_string(),
            face: "stripe__face".to_string(),
            face_front: "stripe__face--front".to_string(),
            face_top: "stripe__face--top".to_string(),
            face_bottom: "stripe__face--bottom".to_string(),
            face_inner: "stripe__face__inner".to_string(),
        }
    }
}
