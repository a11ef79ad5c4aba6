//! Fall and collision resolution
//!
//! `resolve` evaluates every token against one snapshot of the player
//! position and scored set; `apply` then commits the whole outcome at once.

use super::player::is_hit;
use super::rules::RuleSet;
use super::state::{SessionState, Token};
use crate::consts::FIELD_EXIT_Y;

/// Everything one resolver tick decided
#[derive(Debug, Clone, Default, PartialEq)]
pub struct FallOutcome {
    /// Tokens still on the board, advanced
    pub remaining: Vec<Token>,
    /// Token ids that scored this tick
    pub scored: Vec<u32>,
    pub dropped: u32,
    /// Hits beyond the stage cap (removed without scoring)
    pub discarded: u32,
    /// Courses obtained this tick
    pub obtained: Vec<String>,
}

impl FallOutcome {
    pub fn hits(&self) -> u32 {
        self.scored.len() as u32
    }
}

/// Advance all tokens one tick and classify them
pub fn resolve(state: &SessionState, rules: &RuleSet, fall_speed: f32) -> FallOutcome {
    let player = state.player;
    let room = if rules.cap_hits_per_tick {
        rules.stage_cap.saturating_sub(state.tally.collected)
    } else {
        u32::MAX
    };

    let mut outcome = FallOutcome::default();
    for token in &state.tokens {
        let mut moved = token.clone();
        moved.pos.y += fall_speed;

        if is_hit(player, moved.pos, rules.hit_radius) && !state.scored_ids.contains(&moved.id) {
            if outcome.hits() < room {
                outcome.scored.push(moved.id);
                if let Some(id) = moved.special_id {
                    outcome.obtained.push(id);
                }
            } else {
                outcome.discarded += 1;
            }
            continue;
        }

        if moved.pos.y > FIELD_EXIT_Y {
            outcome.dropped += 1;
            continue;
        }

        outcome.remaining.push(moved);
    }
    outcome
}

/// Commit a resolver outcome as a single update
pub fn apply(state: &mut SessionState, rules: &RuleSet, outcome: FallOutcome) {
    let hits = outcome.hits();

    state.score += hits * rules.points_per_token;
    state.tally.collected += hits;
    state.tally.dropped += outcome.dropped;
    state.tally.discarded += outcome.discarded;
    state.session_tally.collected += hits;
    state.session_tally.dropped += outcome.dropped;
    state.session_tally.discarded += outcome.discarded;
    state.scored_ids.extend(outcome.scored);
    state.obtained.extend(outcome.obtained);
    state.tokens = outcome.remaining;
}

/// One resolver timer tick; returns the outcome's counts as (hits, dropped)
pub fn fall_tick(state: &mut SessionState, rules: &RuleSet) -> (u32, u32) {
    let fall_speed = rules.stage(state.stage).map_or(0.0, |s| s.fall_speed);
    let outcome = resolve(state, rules, fall_speed);
    let counts = (outcome.hits(), outcome.dropped);

    if counts.0 > 0 || counts.1 > 0 || outcome.discarded > 0 {
        log::debug!(
            "resolver: {} hit, {} dropped, {} discarded, obtained {:?}",
            counts.0,
            counts.1,
            outcome.discarded,
            outcome.obtained
        );
    }
    apply(state, rules, outcome);
    counts
}
