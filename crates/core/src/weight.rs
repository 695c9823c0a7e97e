// ABOUTME: Numeric relevance weight for hierarchy level names.
// ABOUTME: lvlN maps to 100 - 10*N without clamping; any other name weighs zero.

/// Returns the ranking weight of a level name.
///
/// `lvl0` weighs 100 and each deeper level 10 less, going negative past
/// `lvl10`. Names that are not exactly `lvl` followed by decimal digits
/// (including `content`) weigh 0.
pub fn level_weight(level: &str) -> i64 {
    level_number(level)
        .and_then(|n| n.checked_mul(10))
        .and_then(|scaled| 100_i64.checked_sub(scaled))
        .unwrap_or(0)
}

/// Parses the `N` out of a `lvlN` level name.
pub(crate) fn level_number(level: &str) -> Option<i64> {
    let digits = level.strip_prefix("lvl")?;
    if digits.is_empty() || !digits.bytes().all(|b| b.is_ascii_digit()) {
        return None;
    }
    digits.parse().ok()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn heading_levels_decrease_by_ten() {
        assert_eq!(level_weight("lvl0"), 100);
        assert_eq!(level_weight("lvl1"), 90);
        assert_eq!(level_weight("lvl3"), 70);
        assert_eq!(level_weight("lvl10"), 0);
    }

    #[test]
    fn deep_levels_go_negative() {
        assert_eq!(level_weight("lvl11"), -10);
        assert_eq!(level_weight("lvl25"), -150);
    }

    #[test]
    fn weight_law_holds_for_a_range() {
        for n in 0..200_i64 {
            assert_eq!(level_weight(&format!("lvl{}", n)), 100 - 10 * n);
        }
    }

    #[test]
    fn other_names_weigh_zero() {
        for name in ["content", "lvl", "text", "lvl-1", "lvl+1", "lvl2a", "LVL1", "", "xlvl1"] {
            assert_eq!(level_weight(name), 0, "{:?}", name);
        }
    }

    #[test]
    fn overflowing_level_weighs_zero() {
        assert_eq!(level_weight("lvl99999999999999999999"), 0);
        assert_eq!(level_weight(&format!("lvl{}", i64::MAX)), 0);
    }

    #[test]
    fn leading_zeros_are_accepted() {
        assert_eq!(level_weight("lvl02"), 80);
    }
}
