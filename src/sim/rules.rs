//! Rule sets: stages, quotas, the special course catalog and checkpoints
//!
//! Every game variant is one `RuleSet`. Nothing in the simulation branches on
//! a variant name; it only reads these parameters.

use serde::{Deserialize, Serialize};
use thiserror::Error;

use super::input::{Axes, TiltConfig};
use crate::consts::*;

/// One grade of the run
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StageConfig {
    /// Grade label shown to the player
    pub label: String,
    /// Time between spawn attempts (ms)
    pub spawn_interval_ms: u32,
    /// Vertical advance per resolver tick (percent of field)
    pub fall_speed: f32,
}

impl StageConfig {
    pub fn new(label: &str, spawn_interval_ms: u32, fall_speed: f32) -> Self {
        Self {
            label: label.to_string(),
            spawn_interval_ms,
            fall_speed,
        }
    }
}

/// What counts as stage progress, for both the spawn gate and completion
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum QuotaPolicy {
    /// collected + dropped + discarded + on board
    #[default]
    Accounted,
    /// Spawn events this stage
    Spawned,
    /// Collected tokens only; misses do not count toward the cap
    Collected,
}

/// How a spawn picks between a special course and an ordinary credit
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub enum SpecialPolicy {
    /// Spawn a random candidate course with the given probability
    Probabilistic { chance: f64 },
    /// Always spawn the first candidate course; once none remain, fall back to
    /// credits only from `credit_fallback_from_stage` onward
    Priority { credit_fallback_from_stage: u8 },
}

impl Default for SpecialPolicy {
    fn default() -> Self {
        SpecialPolicy::Probabilistic { chance: 0.3 }
    }
}

/// Which catalog subsets are offered in a stage
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum CatalogMode {
    /// Stage n offers every course unlocked in stages 1..=n
    #[default]
    Cumulative,
    /// Stage n offers only the courses unlocked in stage n
    StageOnly,
}

/// A named one-time token
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SpecialCourse {
    pub id: String,
    pub label: String,
    /// First stage (1-based) the course may appear in
    pub unlock_stage: u8,
}

impl SpecialCourse {
    pub fn new(id: &str, label: &str, unlock_stage: u8) -> Self {
        Self {
            id: id.to_string(),
            label: label.to_string(),
            unlock_stage,
        }
    }
}

/// Gate evaluated when `stage` completes
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Checkpoint {
    pub stage: u8,
    pub min_score: u32,
    /// Course ids that must be obtained by this point
    pub required: Vec<String>,
}

/// Invalid rule set (from configuration)
#[derive(Debug, Clone, PartialEq, Error)]
pub enum RulesError {
    #[error("rule set has no stages")]
    NoStages,
    #[error("rule set has {count} stages, at most 255 are supported")]
    TooManyStages { count: usize },
    #[error("stage {stage} has a zero spawn interval")]
    ZeroSpawnInterval { stage: u8 },
    #[error("fall tick must be positive")]
    ZeroFallTick,
    #[error("max_active must be at least 1")]
    ZeroMaxActive,
    #[error("stage cap must be at least 1")]
    ZeroStageCap,
    #[error("checkpoint refers to stage {stage}, which does not exist")]
    UnknownCheckpointStage { stage: u8 },
    #[error("checkpoint requires unknown course `{id}`")]
    UnknownCourse { id: String },
    #[error("spawn band {min}..{max} is empty or outside the field")]
    BadSpawnBand { min: f32, max: f32 },
}

/// Complete parameter set for one game variant
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RuleSet {
    pub stages: Vec<StageConfig>,
    /// Tokens per stage (progress cap, measured by `quota`)
    pub stage_cap: u32,
    pub quota: QuotaPolicy,
    /// Maximum tokens falling at once
    pub max_active: usize,
    pub hit_radius: f32,
    pub points_per_token: u32,
    /// Resolver period (ms)
    pub fall_tick_ms: u32,
    /// Duration of the between-stage banner (ms)
    pub transition_delay_ms: u32,
    /// Discard simultaneous hits that would push collected past the stage cap
    pub cap_hits_per_tick: bool,
    pub special_policy: SpecialPolicy,
    pub catalog_mode: CatalogMode,
    pub catalog: Vec<SpecialCourse>,
    pub checkpoints: Vec<Checkpoint>,
    pub axes: Axes,
    pub tilt: TiltConfig,
    /// Horizontal spawn band [min, max)
    pub spawn_x_min: f32,
    pub spawn_x_max: f32,
    pub credit_label: String,
}

impl Default for RuleSet {
    fn default() -> Self {
        Self::classic()
    }
}

impl RuleSet {
    /// One credit at a time, probabilistic courses, accounted quota
    pub fn classic() -> Self {
        Self {
            stages: vec![
                StageConfig::new("Year 1", 500, 2.0),
                StageConfig::new("Year 2", 1000, 2.0),
                StageConfig::new("Year 3", 1000, 2.0),
                StageConfig::new("Year 4", 1000, 2.0),
            ],
            stage_cap: 18,
            quota: QuotaPolicy::Accounted,
            max_active: 1,
            hit_radius: 7.0,
            points_per_token: 4,
            fall_tick_ms: FALL_TICK_MS,
            transition_delay_ms: 2000,
            cap_hits_per_tick: false,
            special_policy: SpecialPolicy::default(),
            catalog_mode: CatalogMode::Cumulative,
            catalog: default_catalog(),
            checkpoints: default_checkpoints(),
            axes: Axes::Single,
            tilt: TiltConfig::default(),
            spawn_x_min: 10.0,
            spawn_x_max: 90.0,
            credit_label: "Credit".to_string(),
        }
    }

    /// Two tokens in flight, wider hit radius, collected-count quota
    ///
    /// Misses do not count toward the stage, and hits that would overshoot the
    /// cap are discarded.
    pub fn twin() -> Self {
        Self {
            stages: vec![
                StageConfig::new("Year 1", 700, 2.0),
                StageConfig::new("Year 2", 650, 2.5),
                StageConfig::new("Year 3", 600, 3.0),
                StageConfig::new("Year 4", 550, 3.0),
            ],
            quota: QuotaPolicy::Collected,
            max_active: 2,
            hit_radius: 8.0,
            cap_hits_per_tick: true,
            transition_delay_ms: 1000,
            ..Self::classic()
        }
    }

    /// Courses are always preferred; stage-only catalog; stage 1 offers no credits
    pub fn priority() -> Self {
        Self {
            special_policy: SpecialPolicy::Priority {
                credit_fallback_from_stage: 2,
            },
            catalog_mode: CatalogMode::StageOnly,
            ..Self::classic()
        }
    }

    /// Roll and pitch both steer the player
    pub fn dual() -> Self {
        Self {
            axes: Axes::Dual,
            ..Self::classic()
        }
    }

    /// Number of the last stage (1-based)
    pub fn final_stage(&self) -> u8 {
        u8::try_from(self.stages.len()).unwrap_or(u8::MAX)
    }

    /// Config for a 1-based stage number
    pub fn stage(&self, stage: u8) -> Option<&StageConfig> {
        stage
            .checked_sub(1)
            .and_then(|i| self.stages.get(i as usize))
    }

    /// Grade label for a 1-based stage number
    pub fn stage_label(&self, stage: u8) -> String {
        self.stage(stage)
            .map(|s| s.label.clone())
            .unwrap_or_else(|| format!("Stage {stage}"))
    }

    /// Courses offered in a stage, in catalog order
    pub fn catalog_for_stage(&self, stage: u8) -> impl Iterator<Item = &SpecialCourse> {
        let mode = self.catalog_mode;
        self.catalog.iter().filter(move |c| match mode {
            CatalogMode::Cumulative => c.unlock_stage <= stage,
            CatalogMode::StageOnly => c.unlock_stage == stage,
        })
    }

    pub fn course(&self, id: &str) -> Option<&SpecialCourse> {
        self.catalog.iter().find(|c| c.id == id)
    }

    pub fn checkpoint_for(&self, stage: u8) -> Option<&Checkpoint> {
        self.checkpoints.iter().find(|c| c.stage == stage)
    }

    /// Check internal consistency of a rule set loaded from configuration
    pub fn validate(&self) -> Result<(), RulesError> {
        if self.stages.is_empty() {
            return Err(RulesError::NoStages);
        }
        if self.stages.len() > usize::from(u8::MAX) {
            return Err(RulesError::TooManyStages {
                count: self.stages.len(),
            });
        }
        for (stage, config) in (1..=u8::MAX).zip(&self.stages) {
            if config.spawn_interval_ms == 0 {
                return Err(RulesError::ZeroSpawnInterval { stage });
            }
        }
        if self.fall_tick_ms == 0 {
            return Err(RulesError::ZeroFallTick);
        }
        if self.max_active == 0 {
            return Err(RulesError::ZeroMaxActive);
        }
        if self.stage_cap == 0 {
            return Err(RulesError::ZeroStageCap);
        }
        if !(self.spawn_x_min < self.spawn_x_max
            && self.spawn_x_min >= 0.0
            && self.spawn_x_max <= 100.0)
        {
            return Err(RulesError::BadSpawnBand {
                min: self.spawn_x_min,
                max: self.spawn_x_max,
            });
        }
        for checkpoint in &self.checkpoints {
            if self.stage(checkpoint.stage).is_none() {
                return Err(RulesError::UnknownCheckpointStage {
                    stage: checkpoint.stage,
                });
            }
            if let Some(id) = checkpoint
                .required
                .iter()
                .find(|id| self.course(id).is_none())
            {
                return Err(RulesError::UnknownCourse { id: id.clone() });
            }
        }
        Ok(())
    }
}

fn default_catalog() -> Vec<SpecialCourse> {
    vec![
        SpecialCourse::new("statistics", "Intro to Statistics", 1),
        SpecialCourse::new("info_exercise", "Social Informatics Lab", 1),
        SpecialCourse::new("social_science", "Intro to Social Science", 1),
        SpecialCourse::new("programming", "Programming Basics", 2),
        SpecialCourse::new("seminar", "Research Seminar", 3),
        SpecialCourse::new("thesis", "Graduation Thesis", 4),
    ]
}

fn default_checkpoints() -> Vec<Checkpoint> {
    vec![
        Checkpoint {
            stage: 3,
            min_score: 90,
            required: vec![
                "statistics".to_string(),
                "info_exercise".to_string(),
                "social_science".to_string(),
                "seminar".to_string(),
            ],
        },
        Checkpoint {
            stage: 4,
            min_score: MAX_SCORE,
            required: vec!["thesis".to_string()],
        },
    ]
}
