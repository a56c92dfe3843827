//! Core library for the Venetian split-flap display.
//!
//! A widget is a bank of rotating three-faced stripes cycling through
//! registered flaps. Each module owns one concern (configuration, flap
//! content, stripe geometry, timers, scheduling, lighting, text output) and
//! [`Venetian`] ties them together for hosts. Markup and styles are carried
//! as data; applying them to a document is left to the host.

pub mod config;
pub mod error;
pub mod flap;
pub mod lighting;
pub mod render;
pub mod scheduler;
pub mod stripe;
pub mod timeline;
pub mod widget;

pub use config::{StripeClasses, VenetianConfig};
pub use error::{Result, VenetianError};
pub use flap::{Flap, FlapContent, FlapQueue, StyleMap};
pub use lighting::{FaceGroup, Light, LightingAdapter, LightingRenderer, ShadeRenderer};
pub use render::TextRenderer;
pub use scheduler::{FlapScheduler, SchedulerEvent};
pub use stripe::{Face, FaceSlot, Rotation, Stripe};
pub use timeline::{PlaybackClock, TaskHandle, TimerQueue};
pub use widget::Venetian;
