//! Match rules: set targets and the set-win test
//!
//! All functions here are pure. The engine evaluates them on every point,
//! so a set can be won on any qualifying point, not only when a team first
//! crosses the target.

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Default points needed to win a regular set
pub const DEFAULT_POINTS_PER_SET: u32 = 25;

/// Default points needed to win the deciding set
pub const DEFAULT_LAST_SET_POINTS: u32 = 15;

/// Default number of sets needed to win the match (best of 3)
pub const DEFAULT_SETS_TO_WIN: u32 = 2;

/// Lowest target the settings surface allows
pub const MIN_SET_POINTS: u32 = 5;

/// Highest target the settings surface allows
pub const MAX_SET_POINTS: u32 = 99;

/// Sets-to-win choices offered by the settings surface (best of 1, 3, 5)
pub const SETS_TO_WIN_CHOICES: [u32; 3] = [1, 2, 3];

/// Rule values rejected by the settings surface.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ConfigError {
    #[error("points per set must be between {min} and {max}, got {found}")]
    PointsPerSet { found: u32, min: u32, max: u32 },
    #[error("tie-break points must be between {min} and {max}, got {found}")]
    LastSetPoints { found: u32, min: u32, max: u32 },
    #[error("sets to win must be one of 1, 2 or 3, got {0}")]
    SetsToWin(u32),
}

/// The ruleset for one match.
///
/// Immutable while a match is in progress. The engine trusts these values;
/// range checks belong to whoever builds the config (see [`MatchConfig::validate`]).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct MatchConfig {
    /// Target for every set except the decider
    pub points_per_set: u32,
    /// Target for the deciding (tie-break) set
    pub last_set_points: u32,
    /// First team to this many sets wins the match
    pub sets_to_win: u32,
    /// Require a two-point margin at or above the target
    pub win_by_two: bool,
}

impl Default for MatchConfig {
    fn default() -> Self {
        Self {
            points_per_set: DEFAULT_POINTS_PER_SET,
            last_set_points: DEFAULT_LAST_SET_POINTS,
            sets_to_win: DEFAULT_SETS_TO_WIN,
            win_by_two: true,
        }
    }
}

impl MatchConfig {
    /// Zero-based index of the deciding set.
    ///
    /// This is the set played when both teams have `sets_to_win - 1` sets.
    pub fn decider_index(&self) -> u32 {
        self.sets_to_win.saturating_mul(2).saturating_sub(2)
    }

    /// Maximum number of sets the match can last (2N - 1)
    pub fn max_sets(&self) -> u32 {
        self.sets_to_win.saturating_mul(2).saturating_sub(1)
    }

    /// Points needed to win the set at `set_index`
    pub fn target_for(&self, set_index: u32) -> u32 {
        if set_index == self.decider_index() {
            self.last_set_points
        } else {
            self.points_per_set
        }
    }

    /// Whether a team holding `own` points against `opp` has won the set.
    ///
    /// Only the scoring side is tested. Callers checking both teams pass each
    /// team's own score as `own`.
    pub fn is_set_win(&self, own: u32, opp: u32, set_index: u32) -> bool {
        if own < self.target_for(set_index) {
            return false;
        }
        !self.win_by_two || own >= opp.saturating_add(2)
    }

    /// Whether the team holding `own` points wins the set with its next point
    pub fn is_set_point(&self, own: u32, opp: u32, set_index: u32) -> bool {
        self.is_set_win(own.saturating_add(1), opp, set_index)
    }

    /// Check the values against the ranges the settings surface offers.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if !(MIN_SET_POINTS..=MAX_SET_POINTS).contains(&self.points_per_set) {
            return Err(ConfigError::PointsPerSet {
                found: self.points_per_set,
                min: MIN_SET_POINTS,
                max: MAX_SET_POINTS,
            });
        }
        if !(MIN_SET_POINTS..=MAX_SET_POINTS).contains(&self.last_set_points) {
            return Err(ConfigError::LastSetPoints {
                found: self.last_set_points,
                min: MIN_SET_POINTS,
                max: MAX_SET_POINTS,
            });
        }
        if !SETS_TO_WIN_CHOICES.contains(&self.sets_to_win) {
            return Err(ConfigError::SetsToWin(self.sets_to_win));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn config(points: u32, last: u32, sets: u32, win_by_two: bool) -> MatchConfig {
        MatchConfig {
            points_per_set: points,
            last_set_points: last,
            sets_to_win: sets,
            win_by_two,
        }
    }

    #[test]
    fn test_defaults() {
        let cfg = MatchConfig::default();
        assert_eq!(cfg.points_per_set, 25);
        assert_eq!(cfg.last_set_points, 15);
        assert_eq!(cfg.sets_to_win, 2);
        assert!(cfg.win_by_two);
    }

    #[test]
    fn test_decider_index_best_of_three() {
        let cfg = config(25, 15, 2, true);
        assert_eq!(cfg.decider_index(), 2);
        assert_eq!(cfg.max_sets(), 3);
    }

    #[test]
    fn test_decider_index_single_set() {
        // Best of 1: the only set is the decider
        let cfg = config(25, 15, 1, true);
        assert_eq!(cfg.decider_index(), 0);
        assert_eq!(cfg.target_for(0), 15);
    }

    #[test]
    fn test_target_switches_on_decider() {
        let cfg = config(25, 15, 2, true);
        assert_eq!(cfg.target_for(0), 25);
        assert_eq!(cfg.target_for(1), 25);
        assert_eq!(cfg.target_for(2), 15);
    }

    #[test]
    fn test_target_best_of_five() {
        let cfg = config(25, 15, 3, true);
        for set in 0..4 {
            assert_eq!(cfg.target_for(set), 25);
        }
        assert_eq!(cfg.target_for(4), 15);
    }

    #[test]
    fn test_win_by_two_margin() {
        let cfg = config(25, 15, 2, true);
        assert!(!cfg.is_set_win(24, 24, 0));
        assert!(!cfg.is_set_win(25, 24, 0));
        assert!(cfg.is_set_win(26, 24, 0));
        assert!(!cfg.is_set_win(27, 26, 0));
        assert!(cfg.is_set_win(28, 26, 0));
    }

    #[test]
    fn test_without_win_by_two() {
        let cfg = config(25, 15, 2, false);
        assert!(cfg.is_set_win(25, 24, 0));
        assert!(!cfg.is_set_win(24, 23, 0));
    }

    #[test]
    fn test_set_win_below_target() {
        let cfg = config(25, 15, 2, true);
        assert!(!cfg.is_set_win(20, 0, 0));
        assert!(cfg.is_set_win(15, 0, 2));
    }

    #[test]
    fn test_only_scoring_side_is_tested() {
        let cfg = config(25, 15, 2, true);
        // Trailing side never "wins" even if the opponent has
        assert!(!cfg.is_set_win(10, 25, 0));
    }

    #[test]
    fn test_set_point() {
        let cfg = config(25, 15, 2, true);
        assert!(cfg.is_set_point(24, 20, 0));
        assert!(!cfg.is_set_point(24, 24, 0));
        assert!(cfg.is_set_point(25, 24, 0));
        assert!(!cfg.is_set_point(23, 10, 0));
    }

    #[test]
    fn test_validate_accepts_defaults() {
        assert_eq!(MatchConfig::default().validate(), Ok(()));
    }

    #[test]
    fn test_validate_rejects_out_of_range() {
        assert_eq!(
            config(3, 15, 2, true).validate(),
            Err(ConfigError::PointsPerSet {
                found: 3,
                min: MIN_SET_POINTS,
                max: MAX_SET_POINTS
            })
        );
        assert!(matches!(
            config(25, 100, 2, true).validate(),
            Err(ConfigError::LastSetPoints { found: 100, .. })
        ));
        assert_eq!(
            config(25, 15, 4, true).validate(),
            Err(ConfigError::SetsToWin(4))
        );
    }

    #[test]
    fn test_config_error_messages() {
        let err = ConfigError::SetsToWin(7);
        assert_eq!(err.to_string(), "sets to win must be one of 1, 2 or 3, got 7");
    }

    #[test]
    fn test_huge_values_do_not_overflow() {
        let cfg = config(u32::MAX, u32::MAX, u32::MAX, true);
        assert_eq!(cfg.decider_index(), u32::MAX - 2);
        assert_eq!(cfg.max_sets(), u32::MAX - 1);
        assert_eq!(cfg.target_for(u32::MAX - 2), u32::MAX);
        assert!(cfg.is_set_point(u32::MAX, 0, 0));
        assert!(!cfg.is_set_win(u32::MAX - 1, 0, 0));
    }
}
