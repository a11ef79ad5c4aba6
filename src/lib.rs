//! Credit Rush - A tilt-controlled credit catching arcade game
//!
//! Core modules:
//! - `sim`: Deterministic simulation (spawning, falling, collisions, progression)
//! - `platform`: Controller link state and transport error guidance
//! - `settings`: Variant presets and JSON-backed rule configuration
//! - `web`: Browser bindings (wasm32 only)

pub mod platform;
pub mod settings;
pub mod sim;

#[cfg(target_arch = "wasm32")]
pub mod web;

pub use settings::{Settings, Variant};

use glam::Vec2;

/// Game configuration constants
pub mod consts {
    /// Field bounds for the player token (percent of field span)
    pub const FIELD_MIN: f32 = 5.0;
    pub const FIELD_MAX: f32 = 95.0;

    /// Tokens spawn at the top of the field
    pub const SPAWN_Y: f32 = 5.0;
    /// Tokens with y beyond this have left the field
    pub const FIELD_EXIT_Y: f32 = 100.0;

    /// Player start/reset position
    pub const PLAYER_START_X: f32 = 50.0;
    pub const PLAYER_START_Y: f32 = 80.0;

    /// Fall/collision resolver period (ms)
    pub const FALL_TICK_MS: u32 = 80;

    /// Score shown as the gauge ceiling
    pub const MAX_SCORE: u32 = 124;

    /// Tilt curve: angles below this are ignored (degrees)
    pub const TILT_DEAD_ZONE_DEG: f32 = 3.0;
    /// Tilt curve: angles above this are clipped (degrees)
    pub const TILT_MAX_DEG: f32 = 35.0;
    /// Displacement per sample at maximum tilt (percent)
    pub const TILT_MAX_STEP: f32 = 2.2;
}

/// Clamp a single axis to the playable field
#[inline]
pub fn clamp_to_field(value: f32) -> f32 {
    value.clamp(consts::FIELD_MIN, consts::FIELD_MAX)
}

/// Player start position as a vector
#[inline]
pub fn player_start() -> Vec2 {
    Vec2::new(consts::PLAYER_START_X, consts::PLAYER_START_Y)
}
