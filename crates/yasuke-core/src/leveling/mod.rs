//! XP and leveling.
//!
//! Levels follow a fixed quadratic curve: reaching level `L` requires
//! `(L - 1)^2 * 100` cumulative XP, so level 1 spans 0-99 XP, level 2 spans
//! 100-399 XP, level 3 spans 400-899 XP and so on.
//!
//! Everything in this module except [`XpSystem::award_xp`] is a pure function
//! of its arguments.

mod award;

pub use award::{
    award_notifications, AwardOutcome, XpAward, XpSource, XpStore, XpSystem, XpTransaction,
};

use serde::{Deserialize, Serialize};

/// XP per unit of the quadratic curve.
pub const XP_PER_LEVEL_UNIT: u64 = 100;

/// Integer square root (floor).
fn isqrt(n: u64) -> u64 {
    if n < 2 {
        return n;
    }
    // f64 gets within one of the answer for every u64; fix up the edges.
    let mut x = (n as f64).sqrt() as u64;
    while x.checked_mul(x).map_or(true, |sq| sq > n) {
        x -= 1;
    }
    while (x + 1).checked_mul(x + 1).is_some_and(|sq| sq <= n) {
        x += 1;
    }
    x
}

/// Level reached with `xp` cumulative experience: `floor(sqrt(xp / 100)) + 1`.
///
/// `floor(sqrt(floor(x)))` equals `floor(sqrt(x))` for non-negative `x`, so the
/// integer division is exact.
pub fn level_for_xp(xp: u64) -> u32 {
    // isqrt(u64::MAX / 100) < 2^32 - 1
    (isqrt(xp / XP_PER_LEVEL_UNIT) + 1) as u32
}

/// Cumulative XP at which [`level_for_xp`] first returns `level`.
///
/// Level 0 is treated as level 1. Saturates at `u64::MAX` for levels that
/// cannot be reached.
pub fn xp_threshold_for_level(level: u32) -> u64 {
    let steps = u64::from(level.max(1) - 1);
    steps.saturating_mul(steps).saturating_mul(XP_PER_LEVEL_UNIT)
}

/// Cumulative XP needed to reach the level after the one `current_xp` is in.
pub fn xp_for_next_level(current_xp: u64) -> u64 {
    xp_threshold_for_level(level_for_xp(current_xp).saturating_add(1))
}

/// XP still missing before the next level.
pub fn xp_to_next_level(current_xp: u64) -> u64 {
    xp_for_next_level(current_xp).saturating_sub(current_xp)
}

/// Percent progress from the current level's threshold to the next one.
///
/// Rounded half-up, then capped at 99: 100% is only ever reached by crossing
/// the threshold, at which point the next level starts again at 0.
pub fn progress_to_next_level(current_xp: u64) -> u8 {
    let level = level_for_xp(current_xp);
    let floor = xp_threshold_for_level(level);
    let ceiling = xp_threshold_for_level(level.saturating_add(1));
    let span = u128::from(ceiling.saturating_sub(floor));
    if span == 0 {
        return 0;
    }
    let earned = u128::from(current_xp.saturating_sub(floor));
    let percent = (200 * earned + span) / (2 * span);
    percent.min(99) as u8
}

/// Display-ready summary of where an XP total sits on the curve.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct LevelProgress {
    pub xp: u64,
    pub level: u32,
    /// Threshold of the current level.
    pub current_level_xp: u64,
    /// Threshold of the next level.
    pub next_level_xp: u64,
    pub xp_to_next: u64,
    /// 0..=99
    pub percent: u8,
}

impl LevelProgress {
    pub fn from_xp(xp: u64) -> Self {
        let level = level_for_xp(xp);
        Self {
            xp,
            level,
            current_level_xp: xp_threshold_for_level(level),
            next_level_xp: xp_for_next_level(xp),
            xp_to_next: xp_to_next_level(xp),
            percent: progress_to_next_level(xp),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn level_boundaries() {
        assert_eq!(level_for_xp(0), 1);
        assert_eq!(level_for_xp(99), 1);
        assert_eq!(level_for_xp(100), 2);
        assert_eq!(level_for_xp(399), 2);
        assert_eq!(level_for_xp(400), 3);
        assert_eq!(level_for_xp(899), 3);
        assert_eq!(level_for_xp(900), 4);
    }

    #[test]
    fn thresholds() {
        assert_eq!(xp_threshold_for_level(0), 0);
        assert_eq!(xp_threshold_for_level(1), 0);
        assert_eq!(xp_threshold_for_level(2), 100);
        assert_eq!(xp_threshold_for_level(3), 400);
        assert_eq!(xp_threshold_for_level(10), 8100);
        assert_eq!(xp_threshold_for_level(u32::MAX), u64::MAX);
    }

    #[test]
    fn next_level_figures() {
        assert_eq!(xp_for_next_level(0), 100);
        assert_eq!(xp_for_next_level(150), 400);
        assert_eq!(xp_to_next_level(150), 250);
        assert_eq!(xp_to_next_level(400), 500);
    }

    #[test]
    fn progress_rounding() {
        assert_eq!(progress_to_next_level(0), 0);
        assert_eq!(progress_to_next_level(50), 50);
        // 100..400: 250 earned of 300 -> 83.33
        assert_eq!(progress_to_next_level(350), 83);
        // 100..400: 150 of 300 -> exactly 50
        assert_eq!(progress_to_next_level(250), 50);
        // 99.5 would round to 100 without the cap
        assert_eq!(progress_to_next_level(99), 99);
        assert_eq!(progress_to_next_level(100), 0);
    }

    #[test]
    fn isqrt_exact_near_squares() {
        for n in [0u64, 1, 2, 3, 4, 15, 16, 17, 99, 100, 101] {
            let r = isqrt(n);
            assert!(r * r <= n && (r + 1) * (r + 1) > n, "isqrt({n}) = {r}");
        }
        assert_eq!(isqrt(u64::MAX), 4_294_967_295);
    }

    #[test]
    fn level_progress_bundle() {
        let p = LevelProgress::from_xp(110);
        assert_eq!(p.level, 2);
        assert_eq!(p.current_level_xp, 100);
        assert_eq!(p.next_level_xp, 400);
        assert_eq!(p.xp_to_next, 290);
        assert_eq!(p.percent, 3);
    }

    #[test]
    fn level_for_max_xp_does_not_overflow() {
        assert_eq!(level_for_xp(u64::MAX), 429_496_730);
    }

    proptest! {
        #[test]
        fn level_is_at_least_one(xp in any::<u64>()) {
            prop_assert!(level_for_xp(xp) >= 1);
        }

        #[test]
        fn level_is_monotonic(a in any::<u64>(), b in any::<u64>()) {
            let (lo, hi) = if a <= b { (a, b) } else { (b, a) };
            prop_assert!(level_for_xp(lo) <= level_for_xp(hi));
        }

        #[test]
        fn threshold_round_trips(level in 1u32..2_000_000) {
            let threshold = xp_threshold_for_level(level);
            prop_assert_eq!(level_for_xp(threshold), level);
            if threshold > 0 {
                prop_assert_eq!(level_for_xp(threshold - 1), level - 1);
            }
        }

        #[test]
        fn progress_is_bounded(xp in 0u64..10_000_000_000) {
            let level = level_for_xp(xp);
            prop_assert_eq!(progress_to_next_level(xp_threshold_for_level(level)), 0);
            prop_assert!(progress_to_next_level(xp) < 100);
            let last = xp_threshold_for_level(level + 1) - 1;
            prop_assert!(progress_to_next_level(last) < 100);
        }
    }
}
