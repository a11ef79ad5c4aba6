//! Deterministic simulation module
//!
//! All gameplay logic lives here. This module must be pure and deterministic:
//! - Logical millisecond timers only
//! - Seeded RNG only
//! - Stable iteration order (by token ID)
//! - No rendering or transport dependencies

pub mod fall;
pub mod input;
pub mod player;
pub mod progression;
pub mod rules;
pub mod session;
pub mod spawn;
pub mod state;
pub mod timer;

pub use fall::{FallOutcome, fall_tick};
pub use input::{Axes, Sample, SampleError, TiltConfig, decode_packet, tilt_to_delta};
pub use player::apply_delta;
pub use progression::Decision;
pub use rules::{
    CatalogMode, Checkpoint, QuotaPolicy, RuleSet, RulesError, SpecialCourse, SpecialPolicy,
    StageConfig,
};
pub use session::{CourseView, GameSession, SessionView, TokenView};
pub use spawn::spawn_tick;
pub use state::{GameOverReason, GamePhase, SessionState, StageTally, Token, TokenKind};
pub use timer::{FrameClock, Timer};
