//! Token spawning
//!
//! A spawn tick is split in two: `plan_spawn` decides what would appear given
//! the current state, and `insert_token` re-checks the quota and active gates
//! against the state the token actually lands in.

use rand::Rng;
use rand_pcg::Pcg32;

use super::rules::{RuleSet, SpecialCourse, SpecialPolicy};
use super::state::{SessionState, Token, TokenKind};
use crate::consts::SPAWN_Y;

/// Outcome of the selection policy for one spawn
#[derive(Debug, Clone, PartialEq)]
pub enum Selection<'a> {
    Special(&'a SpecialCourse),
    Credit,
    Nothing,
}

/// Courses that may still appear in the current stage, in catalog order
pub fn candidates<'a>(state: &SessionState, rules: &'a RuleSet) -> Vec<&'a SpecialCourse> {
    rules
        .catalog_for_stage(state.stage)
        .filter(|c| !state.obtained.contains(&c.id) && !state.spawned_this_stage.contains(&c.id))
        .collect()
}

/// Apply the rule set's special policy
pub fn select<'a>(
    policy: SpecialPolicy,
    stage: u8,
    candidates: &[&'a SpecialCourse],
    rng: &mut Pcg32,
) -> Selection<'a> {
    match policy {
        SpecialPolicy::Probabilistic { chance } => {
            if !candidates.is_empty() && rng.random_bool(chance.clamp(0.0, 1.0)) {
                let pick = rng.random_range(0..candidates.len());
                Selection::Special(candidates[pick])
            } else {
                Selection::Credit
            }
        }
        SpecialPolicy::Priority {
            credit_fallback_from_stage,
        } => match candidates.first() {
            Some(&course) => Selection::Special(course),
            None if stage >= credit_fallback_from_stage => Selection::Credit,
            None => Selection::Nothing,
        },
    }
}

/// True when the current stage can never spawn another token
///
/// Only the priority policy withholds credits, so only it can run dry.
pub fn stage_exhausted(state: &SessionState, rules: &RuleSet) -> bool {
    match rules.special_policy {
        SpecialPolicy::Priority {
            credit_fallback_from_stage,
        } => state.stage < credit_fallback_from_stage && candidates(state, rules).is_empty(),
        SpecialPolicy::Probabilistic { .. } => false,
    }
}

/// Quota and active-count gates
fn gates_open(state: &SessionState, rules: &RuleSet) -> bool {
    state.progress(rules) < rules.stage_cap && state.active() < rules.max_active
}

/// Decide what one spawn tick would add, without touching state
///
/// The returned token carries the id it will receive if inserted.
pub fn plan_spawn(state: &SessionState, rules: &RuleSet, rng: &mut Pcg32) -> Option<Token> {
    if !gates_open(state, rules) {
        return None;
    }

    let candidates = candidates(state, rules);
    let (kind, label, special_id) =
        match select(rules.special_policy, state.stage, &candidates, rng) {
            Selection::Special(course) => {
                (TokenKind::Special, course.label.clone(), Some(course.id.clone()))
            }
            Selection::Credit => (TokenKind::Credit, rules.credit_label.clone(), None),
            Selection::Nothing => return None,
        };

    let x = rng.random_range(rules.spawn_x_min..rules.spawn_x_max);
    Some(Token {
        id: state.peek_token_id(),
        pos: glam::Vec2::new(x, SPAWN_Y),
        kind,
        label,
        special_id,
    })
}

/// Insert a planned token, re-validating the gates at the point of insertion
///
/// Returns false (and leaves state untouched) when the board or quota filled
/// up after planning.
pub fn insert_token(state: &mut SessionState, rules: &RuleSet, mut token: Token) -> bool {
    if !gates_open(state, rules) {
        return false;
    }
    if let Some(id) = &token.special_id {
        if state.obtained.contains(id) || state.spawned_this_stage.contains(id) {
            return false;
        }
        state.spawned_this_stage.insert(id.clone());
    }

    token.id = state.next_token_id();
    log::debug!(
        "spawned token {} ({:?} {}) at x={:.1}",
        token.id,
        token.kind,
        token.label,
        token.pos.x
    );
    state.tokens.push(token);
    state.tally.spawned += 1;
    state.session_tally.spawned += 1;
    true
}

/// One spawn timer tick
pub fn spawn_tick(state: &mut SessionState, rules: &RuleSet, rng: &mut Pcg32) -> Option<u32> {
    let token = plan_spawn(state, rules, rng)?;
    let id = token.id;
    insert_token(state, rules, token).then_some(id)
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::SeedableRng;

    fn rng() -> Pcg32 {
        Pcg32::seed_from_u64(7)
    }

    #[test]
    fn test_spawn_at_top_inside_band() {
        let rules = RuleSet::classic();
        let mut state = SessionState::new();
        let mut rng = rng();

        let id = spawn_tick(&mut state, &rules, &mut rng);
        assert_eq!(id, Some(0));
        assert_eq!(state.tokens.len(), 1);
        let token = &state.tokens[0];
        assert_eq!(token.pos.y, SPAWN_Y);
        assert!(token.pos.x >= 10.0 && token.pos.x < 90.0);
        assert_eq!(state.tally.spawned, 1);
    }

    #[test]
    fn test_active_cap_blocks_spawn() {
        let rules = RuleSet::classic();
        let mut state = SessionState::new();
        let mut rng = rng();

        assert!(spawn_tick(&mut state, &rules, &mut rng).is_some());
        assert!(spawn_tick(&mut state, &rules, &mut rng).is_none());
        assert_eq!(state.tokens.len(), 1);
    }

    #[test]
    fn test_quota_blocks_spawn() {
        let rules = RuleSet::classic();
        let mut state = SessionState::new();
        state.tally.collected = 10;
        state.tally.dropped = 8;
        assert!(spawn_tick(&mut state, &rules, &mut rng()).is_none());
    }

    #[test]
    fn test_insert_rechecks_gates() {
        let rules = RuleSet::classic();
        let mut state = SessionState::new();
        let mut rng = rng();

        // Two plans made against the same empty board
        let first = plan_spawn(&state, &rules, &mut rng).unwrap();
        let second = plan_spawn(&state, &rules, &mut rng).unwrap();

        assert!(insert_token(&mut state, &rules, first));
        assert!(!insert_token(&mut state, &rules, second));
        assert_eq!(state.tokens.len(), rules.max_active);
        assert_eq!(state.tally.spawned, 1);
    }

    #[test]
    fn test_priority_prefers_courses_in_catalog_order() {
        let rules = RuleSet::priority();
        let mut state = SessionState::new();
        let mut rng = rng();

        spawn_tick(&mut state, &rules, &mut rng);
        assert_eq!(state.tokens[0].special_id.as_deref(), Some("statistics"));
        state.tokens.clear();

        spawn_tick(&mut state, &rules, &mut rng);
        assert_eq!(state.tokens[0].special_id.as_deref(), Some("info_exercise"));
    }

    #[test]
    fn test_priority_withholds_credits_in_stage_one() {
        let rules = RuleSet::priority();
        let mut state = SessionState::new();
        for id in ["statistics", "info_exercise", "social_science"] {
            state.spawned_this_stage.insert(id.to_string());
        }

        assert!(spawn_tick(&mut state, &rules, &mut rng()).is_none());
        assert!(stage_exhausted(&state, &rules));

        // Stage 2 falls back to credits once its course is used
        state.stage = 2;
        state.spawned_this_stage.clear();
        state.obtained.insert("programming".to_string());
        assert!(!stage_exhausted(&state, &rules));
        spawn_tick(&mut state, &rules, &mut rng());
        assert_eq!(state.tokens[0].kind, TokenKind::Credit);
    }

    #[test]
    fn test_obtained_course_never_candidate() {
        let rules = RuleSet::classic();
        let mut state = SessionState::new();
        state.obtained.insert("statistics".to_string());
        state.spawned_this_stage.insert("info_exercise".to_string());

        let ids: Vec<_> = candidates(&state, &rules)
            .into_iter()
            .map(|c| c.id.as_str())
            .collect();
        assert_eq!(ids, ["social_science"]);
    }

    #[test]
    fn test_probabilistic_without_candidates_spawns_credit() {
        let mut rng = rng();
        for _ in 0..20 {
            let selection = select(SpecialPolicy::Probabilistic { chance: 1.0 }, 1, &[], &mut rng);
            assert_eq!(selection, Selection::Credit);
        }
    }
}
