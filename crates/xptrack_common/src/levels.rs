//! Tibia level-cost model.
//!
//! Cumulative experience required to reach a level, using the per-level step
//! cost `(l^2 + 50l + 100) * 50` summed from level 1 up to the target. Two
//! formula variants circulated in earlier revisions of this project; the
//! summed series below is the canonical one (see DESIGN.md).

/// Total cumulative XP required to reach `level`.
///
/// `level_cost(1)` is the baseline 0; levels below 2 cost nothing.
pub fn level_cost(level: u32) -> i64 {
    if level <= 1 {
        return 0;
    }

    (1..i64::from(level))
        .map(|l| (l * l + 50 * l + 100) * 50)
        .sum()
}

/// XP still missing from `current_xp` to reach `target` level.
///
/// Negative when the character already holds more XP than the target needs.
pub fn xp_to_level(current_xp: i64, target: u32) -> i64 {
    level_cost(target) - current_xp
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn baseline_levels_cost_nothing() {
        assert_eq!(level_cost(0), 0);
        assert_eq!(level_cost(1), 0);
    }

    #[test]
    fn fixed_point_regression_levels_two_and_three() {
        // Step from 1 to 2: (1 + 50 + 100) * 50 = 7550.
        assert_eq!(level_cost(2), 7550);
        // Plus step from 2 to 3: (4 + 100 + 100) * 50 = 10200.
        assert_eq!(level_cost(3), 17_750);
    }

    #[test]
    fn cost_is_strictly_increasing() {
        let mut prev = level_cost(1);
        for level in 2..200 {
            let cost = level_cost(level);
            assert!(cost > prev, "cost must grow at level {}", level);
            prev = cost;
        }
    }

    #[test]
    fn high_levels_stay_in_range() {
        // A +100 projection from level 1000 must not overflow i64.
        assert!(level_cost(1100) > level_cost(1000));
    }

    #[test]
    fn xp_to_level_subtracts_current_total() {
        assert_eq!(xp_to_level(0, 2), 7550);
        assert_eq!(xp_to_level(7550, 2), 0);
        assert_eq!(xp_to_level(10_000, 2), -2450);
    }
}
