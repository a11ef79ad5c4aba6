//! Game session: start/stop, input handling and the logical tick loop
//!
//! The session is the only owner of `SessionState`. Every spawn, resolver and
//! banner tick is driven from `advance`, in chronological order.

use glam::Vec2;
use rand::SeedableRng;
use rand_pcg::Pcg32;
use serde::Serialize;

use super::input::{Sample, SampleError, decode_packet, tilt_to_delta};
use super::player::apply_delta;
use super::rules::RuleSet;
use super::state::{GamePhase, SessionState, StageTally, TokenKind};
use super::timer::Timer;
use super::{fall, progression, spawn};
use crate::consts::MAX_SCORE;
use crate::platform::LinkState;

/// A token as the host should draw it
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TokenView {
    pub id: u32,
    pub x: f32,
    pub y: f32,
    pub kind: TokenKind,
    pub label: String,
}

/// A catalog course and whether it has been obtained
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CourseView {
    pub id: String,
    pub label: String,
    pub obtained: bool,
}

/// Everything a host UI renders
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SessionView {
    pub phase: GamePhase,
    /// Human-readable game over reason
    pub reason: Option<String>,
    pub score: u32,
    pub max_score: u32,
    pub stage: u8,
    pub grade_label: String,
    pub is_final_stage: bool,
    pub stage_cap: u32,
    pub collected: u32,
    pub dropped: u32,
    pub spawned: u32,
    pub active: usize,
    pub player: Vec2,
    pub tokens: Vec<TokenView>,
    pub courses: Vec<CourseView>,
    pub link: LinkState,
    pub last_sample: Option<Sample>,
    /// Last sample shows visible tilt (controller check screen)
    pub tilted: bool,
    pub last_input_error: Option<String>,
}

/// One game session
#[derive(Debug, Clone)]
pub struct GameSession {
    rules: RuleSet,
    state: SessionState,
    rng: Pcg32,
    spawn_timer: Timer,
    fall_timer: Timer,
    /// Remaining banner time while in `StageTransition`
    transition_ms: u32,
    link: LinkState,
    last_sample: Option<Sample>,
    last_input_error: Option<String>,
}

impl GameSession {
    pub fn new(rules: RuleSet, seed: u64) -> Self {
        let spawn_timer = Timer::new(rules.stage(1).map_or(1, |s| s.spawn_interval_ms));
        let fall_timer = Timer::new(rules.fall_tick_ms);
        Self {
            rules,
            state: SessionState::new(),
            rng: Pcg32::seed_from_u64(seed),
            spawn_timer,
            fall_timer,
            transition_ms: 0,
            link: LinkState::default(),
            last_sample: None,
            last_input_error: None,
        }
    }

    pub fn rules(&self) -> &RuleSet {
        &self.rules
    }

    pub fn state(&self) -> &SessionState {
        &self.state
    }

    pub fn phase(&self) -> &GamePhase {
        &self.state.phase
    }

    /// Begin a fresh run at stage 1
    pub fn start(&mut self) {
        self.reset();
        self.state.phase = GamePhase::Running;
        log::info!("Session started");
    }

    /// Abandon the run and return to the start screen
    pub fn stop(&mut self) {
        self.reset();
        log::info!("Session stopped");
    }

    /// Clear all session state and cancel every pending timer
    fn reset(&mut self) {
        self.state = SessionState::new();
        self.restart_timers();
        self.transition_ms = 0;
    }

    fn restart_timers(&mut self) {
        let interval = self
            .rules
            .stage(self.state.stage)
            .map_or(1, |s| s.spawn_interval_ms);
        self.spawn_timer.restart(interval);
        self.fall_timer.restart(self.rules.fall_tick_ms);
    }

    pub fn on_connected(&mut self, device_name: &str) {
        log::info!("Controller connected: {device_name}");
        self.link = LinkState::Connected {
            device_name: device_name.to_string(),
        };
        self.last_input_error = None;
    }

    pub fn on_disconnected(&mut self) {
        log::info!("Controller disconnected");
        self.link = LinkState::Disconnected;
    }

    /// Feed one decoded sample
    ///
    /// Movement applies in every phase so the player can check the controller
    /// before starting. Samples are ignored while the link is down.
    pub fn on_sample(&mut self, sample: Sample) -> Result<(), SampleError> {
        if !self.link.accepts_samples() {
            return Ok(());
        }
        if let Err(err) = sample.validate() {
            log::warn!("Rejected sample: {err}");
            self.last_input_error = Some(err.to_string());
            return Err(err);
        }

        let delta = tilt_to_delta(&sample, &self.rules.tilt, self.rules.axes);
        self.state.player = apply_delta(self.state.player, delta);
        self.last_sample = Some(sample);
        Ok(())
    }

    /// Feed one raw controller packet
    pub fn on_packet(&mut self, bytes: &[u8]) -> Result<(), SampleError> {
        if !self.link.accepts_samples() {
            return Ok(());
        }
        match decode_packet(bytes) {
            Ok(sample) => self.on_sample(sample),
            Err(err) => {
                log::warn!("Rejected packet: {err}");
                self.last_input_error = Some(err.to_string());
                Err(err)
            }
        }
    }

    /// Advance simulated time by `dt_ms`
    ///
    /// Due timers fire in time order; when the resolver and spawner are due at
    /// the same instant the resolver runs first.
    pub fn advance(&mut self, dt_ms: u32) {
        let mut left = dt_ms;

        loop {
            match self.state.phase {
                GamePhase::Running => {
                    let step = self.fall_timer.until_due().min(self.spawn_timer.until_due());
                    if step > left {
                        self.fall_timer.advance(left);
                        self.spawn_timer.advance(left);
                        return;
                    }
                    left -= step;

                    let fall_due = self.fall_timer.advance(step);
                    let spawn_due = self.spawn_timer.advance(step);

                    if fall_due {
                        self.fall_tick();
                    }
                    if spawn_due && self.state.phase == GamePhase::Running {
                        spawn::spawn_tick(&mut self.state, &self.rules, &mut self.rng);
                    }
                }
                GamePhase::StageTransition { .. } => {
                    if self.transition_ms > left {
                        self.transition_ms -= left;
                        return;
                    }
                    left -= self.transition_ms;
                    self.transition_ms = 0;
                    progression::finish_transition(&mut self.state);
                    self.restart_timers();
                    log::info!("Now in {}", self.rules.stage_label(self.state.stage));
                }
                GamePhase::NotStarted | GamePhase::GameOver { .. } | GamePhase::Graduated => {
                    return;
                }
            }
        }
    }

    fn fall_tick(&mut self) {
        fall::fall_tick(&mut self.state, &self.rules);
        let decision = progression::evaluate(&self.state, &self.rules);
        if let progression::Decision::Advance { .. } = decision {
            self.transition_ms = self.rules.transition_delay_ms;
        }
        progression::apply(&mut self.state, decision);
    }

    /// Snapshot for rendering
    pub fn view(&self) -> SessionView {
        let state = &self.state;
        let reason = match &state.phase {
            GamePhase::GameOver { reason } => Some(reason.to_string()),
            _ => None,
        };

        SessionView {
            phase: state.phase.clone(),
            reason,
            score: state.score,
            max_score: MAX_SCORE,
            stage: state.stage,
            grade_label: self.rules.stage_label(state.stage),
            is_final_stage: state.stage >= self.rules.final_stage(),
            stage_cap: self.rules.stage_cap,
            collected: state.tally.collected,
            dropped: state.tally.dropped,
            spawned: state.tally.settled() + state.active() as u32,
            active: state.active(),
            player: state.player,
            tokens: state
                .tokens
                .iter()
                .map(|t| TokenView {
                    id: t.id,
                    x: t.pos.x,
                    y: t.pos.y,
                    kind: t.kind,
                    label: t.label.clone(),
                })
                .collect(),
            courses: self
                .rules
                .catalog
                .iter()
                .map(|c| CourseView {
                    id: c.id.clone(),
                    label: c.label.clone(),
                    obtained: state.obtained.contains(&c.id),
                })
                .collect(),
            link: self.link.clone(),
            last_sample: self.last_sample,
            tilted: self.last_sample.is_some_and(|s| s.is_tilted()),
            last_input_error: self.last_input_error.clone(),
        }
    }

    /// Whole-session accounting
    pub fn session_tally(&self) -> StageTally {
        self.state.session_tally
    }

    /// Test and demo hook: place the player directly
    pub fn set_player(&mut self, pos: Vec2) {
        self.state.player = Vec2::new(crate::clamp_to_field(pos.x), crate::clamp_to_field(pos.y));
    }
}
