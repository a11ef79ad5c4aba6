//! Controller samples and tilt normalization
//!
//! Decodes the controller's notification packet and turns tilt into a bounded
//! per-sample displacement of the player token.

use glam::Vec2;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::consts::*;

/// Size of one controller packet in bytes
pub const PACKET_LEN: usize = 16;

/// Fixed-point divisors used by the controller firmware
const ACCEL_SCALE: f32 = 1000.0;
const GYRO_SCALE: f32 = 100.0;

/// Rejected controller input
#[derive(Debug, Clone, PartialEq, Error)]
pub enum SampleError {
    #[error("packet too short: expected {expected} bytes, got {actual}")]
    TooShort { expected: usize, actual: usize },
    #[error("sample field `{field}` is not a finite number")]
    NonFinite { field: &'static str },
}

/// One reading from the controller
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct Sample {
    pub button_a: bool,
    pub button_b: bool,
    pub accel: [f32; 3],
    pub gyro: [f32; 3],
}

impl Sample {
    /// Sample with the given acceleration and no buttons or rotation
    pub fn from_accel(x: f32, y: f32, z: f32) -> Self {
        Self {
            accel: [x, y, z],
            ..Default::default()
        }
    }

    /// Reject samples carrying NaN or infinite readings
    pub fn validate(&self) -> Result<(), SampleError> {
        const ACCEL_FIELDS: [&str; 3] = ["accel_x", "accel_y", "accel_z"];
        const GYRO_FIELDS: [&str; 3] = ["gyro_x", "gyro_y", "gyro_z"];

        for (value, field) in self.accel.iter().zip(ACCEL_FIELDS) {
            if !value.is_finite() {
                return Err(SampleError::NonFinite { field });
            }
        }
        for (value, field) in self.gyro.iter().zip(GYRO_FIELDS) {
            if !value.is_finite() {
                return Err(SampleError::NonFinite { field });
            }
        }
        Ok(())
    }

    /// Whether the device is visibly tilted (drives the controller check screen)
    pub fn is_tilted(&self) -> bool {
        self.accel[0].abs() > 0.1 || self.accel[1].abs() > 0.1
    }
}

/// Decode a controller packet
///
/// Layout (little endian): `[a u8][b u8][ax i16][ay i16][az i16][gx i16][gy i16][gz i16][pad 2]`.
/// The 2 padding bytes are required but unread; bytes past the first 16 are ignored.
pub fn decode_packet(bytes: &[u8]) -> Result<Sample, SampleError> {
    if bytes.len() < PACKET_LEN {
        return Err(SampleError::TooShort {
            expected: PACKET_LEN,
            actual: bytes.len(),
        });
    }

    let word = |i: usize| i16::from_le_bytes([bytes[2 + i * 2], bytes[3 + i * 2]]) as f32;

    Ok(Sample {
        button_a: bytes[0] != 0,
        button_b: bytes[1] != 0,
        accel: [
            word(0) / ACCEL_SCALE,
            word(1) / ACCEL_SCALE,
            word(2) / ACCEL_SCALE,
        ],
        gyro: [word(3) / GYRO_SCALE, word(4) / GYRO_SCALE, word(5) / GYRO_SCALE],
    })
}

/// Which axes tilt controls
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum Axes {
    /// Roll moves left/right, vertical position is fixed
    #[default]
    Single,
    /// Roll moves left/right, pitch moves up/down
    Dual,
}

/// Tilt-to-displacement curve
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct TiltConfig {
    pub dead_zone_deg: f32,
    pub max_tilt_deg: f32,
    pub max_step: f32,
}

impl Default for TiltConfig {
    fn default() -> Self {
        Self {
            dead_zone_deg: TILT_DEAD_ZONE_DEG,
            max_tilt_deg: TILT_MAX_DEG,
            max_step: TILT_MAX_STEP,
        }
    }
}

impl TiltConfig {
    /// Map an angle in degrees to a displacement
    pub fn curve(&self, deg: f32) -> f32 {
        if !deg.is_finite() || deg.abs() < self.dead_zone_deg {
            return 0.0;
        }
        let limited = deg.clamp(-self.max_tilt_deg, self.max_tilt_deg);
        limited / self.max_tilt_deg * self.max_step
    }
}

/// Roll angle (left/right tilt) in degrees
#[inline]
pub fn roll_deg(sample: &Sample) -> f32 {
    sample.accel[1].atan2(sample.accel[2]).to_degrees()
}

/// Pitch angle (forward/back tilt) in degrees
#[inline]
pub fn pitch_deg(sample: &Sample) -> f32 {
    let [x, y, z] = sample.accel;
    (-x).atan2(y.hypot(z)).to_degrees()
}

/// Convert a sample into a player displacement
pub fn tilt_to_delta(sample: &Sample, tilt: &TiltConfig, axes: Axes) -> Vec2 {
    let dx = tilt.curve(roll_deg(sample));
    let dy = match axes {
        Axes::Single => 0.0,
        Axes::Dual => tilt.curve(pitch_deg(sample)),
    };
    Vec2::new(dx, dy)
}
