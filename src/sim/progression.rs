//! Stage progression, checkpoints and terminal outcomes

use super::rules::RuleSet;
use super::spawn::stage_exhausted;
use super::state::{GameOverReason, GamePhase, SessionState};

/// What the controller wants to happen after a tick
#[derive(Debug, Clone, PartialEq)]
pub enum Decision {
    Continue,
    Advance { next_stage: u8 },
    GameOver(GameOverReason),
    Graduated,
}

/// A stage is complete once its quota is met (or nothing more can spawn)
/// and every token has left the board
pub fn stage_complete(state: &SessionState, rules: &RuleSet) -> bool {
    state.tokens.is_empty()
        && (state.progress(rules) >= rules.stage_cap || stage_exhausted(state, rules))
}

/// Evaluate the checkpoint attached to `stage`, if any
///
/// The score requirement is checked before required courses.
pub fn check_gate(state: &SessionState, rules: &RuleSet, stage: u8) -> Result<(), GameOverReason> {
    let Some(checkpoint) = rules.checkpoint_for(stage) else {
        return Ok(());
    };

    if state.score < checkpoint.min_score {
        return Err(GameOverReason::ScoreBelow {
            stage,
            required: checkpoint.min_score,
            actual: state.score,
        });
    }

    let missing = state.missing_courses(rules, stage);
    if !missing.is_empty() {
        return Err(GameOverReason::MissingCourses { stage, missing });
    }
    Ok(())
}

/// Decide the next step for a running session
pub fn evaluate(state: &SessionState, rules: &RuleSet) -> Decision {
    if state.phase != GamePhase::Running || !stage_complete(state, rules) {
        return Decision::Continue;
    }

    if let Err(reason) = check_gate(state, rules, state.stage) {
        return Decision::GameOver(reason);
    }

    if state.stage >= rules.final_stage() {
        Decision::Graduated
    } else {
        Decision::Advance {
            next_stage: state.stage + 1,
        }
    }
}

/// Commit a decision to the session phase
pub fn apply(state: &mut SessionState, decision: Decision) {
    match decision {
        Decision::Continue => {}
        Decision::Advance { next_stage } => {
            log::info!(
                "Stage {} complete (score {}), advancing to stage {}",
                state.stage,
                state.score,
                next_stage
            );
            state.phase = GamePhase::StageTransition { next_stage };
        }
        Decision::GameOver(reason) => {
            log::info!("Game over at stage {}: {}", state.stage, reason);
            state.tokens.clear();
            state.phase = GamePhase::GameOver { reason };
        }
        Decision::Graduated => {
            log::info!("Graduated with score {}", state.score);
            state.tokens.clear();
            state.phase = GamePhase::Graduated;
        }
    }
}

/// End the between-stage banner: reset per-stage state and resume
pub fn finish_transition(state: &mut SessionState) {
    if let GamePhase::StageTransition { next_stage } = state.phase {
        state.reset_stage();
        state.stage = next_stage;
        state.phase = GamePhase::Running;
    }
}
