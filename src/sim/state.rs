//! Session state and core simulation types
//!
//! Everything a tick reads or replaces lives in `SessionState`.

use std::collections::BTreeSet;
use std::fmt;

use glam::Vec2;
use serde::{Deserialize, Serialize};

use super::rules::{QuotaPolicy, RuleSet};
use crate::player_start;

/// Current phase of the session
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum GamePhase {
    /// Waiting for start (controller check mode)
    NotStarted,
    /// Tokens spawning and falling
    Running,
    /// Between-stage banner; timers other than the banner are paused
    StageTransition { next_stage: u8 },
    /// Run failed a checkpoint
    GameOver { reason: GameOverReason },
    /// Run passed the final checkpoint
    Graduated,
}

impl GamePhase {
    pub fn is_terminal(&self) -> bool {
        matches!(self, GamePhase::GameOver { .. } | GamePhase::Graduated)
    }
}

/// Why a run ended in failure
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum GameOverReason {
    ScoreBelow { stage: u8, required: u32, actual: u32 },
    MissingCourses { stage: u8, missing: Vec<String> },
}

impl fmt::Display for GameOverReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::ScoreBelow {
                stage,
                required,
                actual,
            } => write!(
                f,
                "Score {actual} did not reach {required} by the end of stage {stage}."
            ),
            Self::MissingCourses { stage, missing } => write!(
                f,
                "Required courses missing at the end of stage {stage}: {}.",
                missing.join(", ")
            ),
        }
    }
}

/// Token kinds
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum TokenKind {
    Credit,
    Special,
}

/// A falling token
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Token {
    pub id: u32,
    pub pos: Vec2,
    pub kind: TokenKind,
    pub label: String,
    /// Catalog id for special tokens
    pub special_id: Option<String>,
}

/// Per-stage (or per-session) token accounting
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct StageTally {
    pub spawned: u32,
    pub collected: u32,
    /// Fell past the bottom of the field
    pub dropped: u32,
    /// Hit after the stage cap was already reached
    pub discarded: u32,
}

impl StageTally {
    /// Tokens that have left the board, by any route
    pub fn settled(&self) -> u32 {
        self.collected + self.dropped + self.discarded
    }

    /// Stage progress measured the way `quota` asks
    pub fn progress(&self, quota: QuotaPolicy, active: usize) -> u32 {
        match quota {
            QuotaPolicy::Accounted => self.settled() + active as u32,
            QuotaPolicy::Spawned => self.spawned,
            QuotaPolicy::Collected => self.collected,
        }
    }
}

/// Complete mutable session state
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SessionState {
    pub phase: GamePhase,
    /// Current stage (1-based)
    pub stage: u8,
    pub score: u32,
    pub tally: StageTally,
    /// Whole-session accounting (never reset between stages)
    pub session_tally: StageTally,
    /// Tokens on the board (sorted by id)
    pub tokens: Vec<Token>,
    pub player: Vec2,
    /// Token ids that have already scored
    pub scored_ids: BTreeSet<u32>,
    /// Courses obtained this session; never offered again
    pub obtained: BTreeSet<String>,
    /// Courses already spawned in the current stage
    pub spawned_this_stage: BTreeSet<String>,
    next_id: u32,
}

impl Default for SessionState {
    fn default() -> Self {
        Self::new()
    }
}

impl SessionState {
    pub fn new() -> Self {
        Self {
            phase: GamePhase::NotStarted,
            stage: 1,
            score: 0,
            tally: StageTally::default(),
            session_tally: StageTally::default(),
            tokens: Vec::new(),
            player: player_start(),
            scored_ids: BTreeSet::new(),
            obtained: BTreeSet::new(),
            spawned_this_stage: BTreeSet::new(),
            next_id: 0,
        }
    }

    /// Allocate a new token id
    pub fn next_token_id(&mut self) -> u32 {
        let id = self.next_id;
        self.next_id += 1;
        id
    }

    /// Peek at the id the next spawned token will get
    pub fn peek_token_id(&self) -> u32 {
        self.next_id
    }

    pub fn active(&self) -> usize {
        self.tokens.len()
    }

    /// Current stage progress under the rule set's quota policy
    pub fn progress(&self, rules: &RuleSet) -> u32 {
        self.tally.progress(rules.quota, self.tokens.len())
    }

    /// Clear the board and per-stage tracking for a fresh stage
    pub fn reset_stage(&mut self) {
        self.tally = StageTally::default();
        self.tokens.clear();
        self.spawned_this_stage.clear();
        self.player = player_start();
    }

    /// Required courses for `stage` that are not yet obtained, as labels
    pub fn missing_courses(&self, rules: &RuleSet, stage: u8) -> Vec<String> {
        rules
            .checkpoint_for(stage)
            .map(|checkpoint| {
                checkpoint
                    .required
                    .iter()
                    .filter(|id| !self.obtained.contains(*id))
                    .map(|id| {
                        rules
                            .course(id)
                            .map(|c| c.label.clone())
                            .unwrap_or_else(|| id.clone())
                    })
                    .collect()
            })
            .unwrap_or_default()
    }
}
