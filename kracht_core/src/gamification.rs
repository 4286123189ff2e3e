//! Levels, experience points and rank names.
//!
//! XP curve:
//! - every completed workout earns `xp_per_workout` (default 100)
//! - going from level L to L+1 costs `100 + 50 * (L - 1)` XP
//!
//! so level 2 starts at 100 XP, level 3 at 250, level 4 at 450, and so on.

use crate::Workout;

/// XP awarded per completed workout when not configured
pub const DEFAULT_XP_PER_WORKOUT: u64 = 100;

const BASE_LEVEL_COST: u64 = 100;
const LEVEL_COST_STEP: u64 = 50;

/// Rank names by the first level they apply to, ascending
const RANKS: &[(u32, &str)] = &[
    (1, "Rookie"),
    (3, "Gym Regular"),
    (5, "Iron Apprentice"),
    (8, "Steel Athlete"),
    (11, "Powerhouse"),
    (15, "Titan"),
    (20, "Legend"),
];

/// Derived progress snapshot, never persisted
#[derive(Clone, Debug, PartialEq)]
pub struct GamificationStats {
    pub level: u32,
    pub total_xp: u64,
    /// XP earned inside the current level
    pub current_xp: u64,
    /// XP the current level spans
    pub next_level_xp: u64,
    /// Always within [0, 100]
    pub progress_percent: f64,
    pub rank_name: &'static str,
}

/// XP needed to advance from `level` to `level + 1`
pub fn level_cost(level: u32) -> u64 {
    BASE_LEVEL_COST + LEVEL_COST_STEP * u64::from(level.saturating_sub(1))
}

/// XP needed to clear the first `levels` levels: `100n + 25n(n - 1)`
fn cleared_cost(levels: u64) -> u128 {
    let n = u128::from(levels);
    u128::from(BASE_LEVEL_COST) * n + u128::from(LEVEL_COST_STEP) * n * n.saturating_sub(1) / 2
}

/// Cumulative XP at which `level` begins (level 1 begins at 0)
///
/// Saturates at `u64::MAX` for levels no XP total can reach.
pub fn level_threshold(level: u32) -> u64 {
    let cleared = u64::from(level.max(1) - 1);
    u64::try_from(cleared_cost(cleared)).unwrap_or(u64::MAX)
}

/// Rank label for a level
pub fn rank_for_level(level: u32) -> &'static str {
    RANKS
        .iter()
        .rev()
        .find(|(min_level, _)| level >= *min_level)
        .map(|(_, name)| *name)
        .unwrap_or(RANKS[0].1)
}

/// Total XP earned by the completed workouts in `history`
pub fn total_xp(history: &[Workout], xp_per_workout: u64) -> u64 {
    let completed = history.iter().filter(|w| w.is_finished()).count() as u64;
    completed.saturating_mul(xp_per_workout)
}

/// Resolve level, progress and rank for a cumulative XP total
pub fn stats_for_xp(total_xp: u64) -> GamificationStats {
    let xp = u128::from(total_xp);

    // Root of 25n² + 75n = xp, corrected for float rounding
    let estimate = ((5625.0 + 100.0 * total_xp as f64).sqrt() - 75.0) / 50.0;
    let mut cleared = estimate.max(0.0) as u64;
    while cleared > 0 && cleared_cost(cleared) > xp {
        cleared -= 1;
    }
    while cleared_cost(cleared + 1) <= xp {
        cleared += 1;
    }

    let level = u32::try_from(cleared + 1).unwrap_or(u32::MAX);
    let threshold = u64::try_from(cleared_cost(cleared)).unwrap_or(u64::MAX);
    let current_xp = total_xp.saturating_sub(threshold);
    let next_level_xp = level_cost(level);
    let progress_percent = if next_level_xp == 0 {
        0.0
    } else {
        (current_xp as f64 / next_level_xp as f64 * 100.0).clamp(0.0, 100.0)
    };

    GamificationStats {
        level,
        total_xp,
        current_xp,
        next_level_xp,
        progress_percent,
        rank_name: rank_for_level(level),
    }
}

/// Convenience: stats straight from workout history
pub fn calculate_stats(history: &[Workout], xp_per_workout: u64) -> GamificationStats {
    stats_for_xp(total_xp(history, xp_per_workout))
}
