//! User preferences: match rules, team presets and cue settings
//!
//! Edited on the setup screen, persisted between sessions by
//! [`crate::storage::Storage`].

use crate::engine::rules::{MAX_SET_POINTS, MIN_SET_POINTS, SETS_TO_WIN_CHOICES};
use crate::engine::{normalize_name, ColorToken, MatchConfig, Team, TeamState};
use serde::{Deserialize, Serialize};

/// Name and color a team starts a match with
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TeamPreset {
    pub name: String,
    pub color: ColorToken,
}

impl TeamPreset {
    pub fn default_for(team: Team) -> Self {
        let state = TeamState::default_for(team);
        TeamPreset {
            name: state.name,
            color: state.color,
        }
    }

    /// Fresh team state from this preset
    pub fn to_state(&self) -> TeamState {
        TeamState::new(self.name.clone(), self.color)
    }
}

/// Everything the setup screen edits
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Preferences {
    pub config: MatchConfig,
    pub team_a: TeamPreset,
    pub team_b: TeamPreset,
    /// Ring the terminal bell on points, sets and match wins
    #[serde(default = "default_sound")]
    pub sound: bool,
}

fn default_sound() -> bool {
    true
}

impl Default for Preferences {
    fn default() -> Self {
        Preferences {
            config: MatchConfig::default(),
            team_a: TeamPreset::default_for(Team::A),
            team_b: TeamPreset::default_for(Team::B),
            sound: true,
        }
    }
}

impl Preferences {
    pub fn team(&self, team: Team) -> &TeamPreset {
        match team {
            Team::A => &self.team_a,
            Team::B => &self.team_b,
        }
    }

    pub fn team_mut(&mut self, team: Team) -> &mut TeamPreset {
        match team {
            Team::A => &mut self.team_a,
            Team::B => &mut self.team_b,
        }
    }

    /// Set a preset name, keeping the old one if the new one is blank
    pub fn rename(&mut self, team: Team, name: &str) -> bool {
        match normalize_name(name) {
            Some(name) => {
                self.team_mut(team).name = name;
                true
            }
            None => false,
        }
    }

    /// Step points-per-set by `delta`, clamped to the allowed range
    pub fn adjust_points_per_set(&mut self, delta: i32) {
        self.config.points_per_set = step_points(self.config.points_per_set, delta);
    }

    /// Step tie-break points by `delta`, clamped to the allowed range
    pub fn adjust_last_set_points(&mut self, delta: i32) {
        self.config.last_set_points = step_points(self.config.last_set_points, delta);
    }

    /// Move to the next/previous sets-to-win choice (best of 1/3/5)
    pub fn cycle_sets_to_win(&mut self, forward: bool) {
        let choices = SETS_TO_WIN_CHOICES;
        let idx = choices
            .iter()
            .position(|&c| c == self.config.sets_to_win)
            .unwrap_or(0);
        let next = if forward {
            (idx + 1) % choices.len()
        } else {
            (idx + choices.len() - 1) % choices.len()
        };
        self.config.sets_to_win = choices[next];
    }

    /// Bring values loaded from disk back into the allowed ranges
    pub fn sanitized(mut self) -> Self {
        if self.config.validate().is_err() {
            let defaults = MatchConfig::default();
            self.config.points_per_set = self
                .config
                .points_per_set
                .clamp(MIN_SET_POINTS, MAX_SET_POINTS);
            self.config.last_set_points = self
                .config
                .last_set_points
                .clamp(MIN_SET_POINTS, MAX_SET_POINTS);
            if !SETS_TO_WIN_CHOICES.contains(&self.config.sets_to_win) {
                self.config.sets_to_win = defaults.sets_to_win;
            }
        }
        for team in Team::BOTH {
            if normalize_name(&self.team(team).name).is_none() {
                self.team_mut(team).name = TeamPreset::default_for(team).name;
            }
        }
        self
    }
}

fn step_points(current: u32, delta: i32) -> u32 {
    let next = current as i64 + delta as i64;
    next.clamp(MIN_SET_POINTS as i64, MAX_SET_POINTS as i64) as u32
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let prefs = Preferences::default();
        assert_eq!(prefs.config, MatchConfig::default());
        assert_eq!(prefs.team_a.name, "Home");
        assert_eq!(prefs.team_b.color, ColorToken::Red);
        assert!(prefs.sound);
    }

    #[test]
    fn test_points_adjust_is_clamped() {
        let mut prefs = Preferences::default();
        prefs.config.points_per_set = 6;
        prefs.adjust_points_per_set(-1);
        assert_eq!(prefs.config.points_per_set, 5);
        prefs.adjust_points_per_set(-1);
        assert_eq!(prefs.config.points_per_set, 5);

        prefs.config.last_set_points = 98;
        prefs.adjust_last_set_points(5);
        assert_eq!(prefs.config.last_set_points, 99);
    }

    #[test]
    fn test_cycle_sets_to_win() {
        let mut prefs = Preferences::default();
        assert_eq!(prefs.config.sets_to_win, 2);
        prefs.cycle_sets_to_win(true);
        assert_eq!(prefs.config.sets_to_win, 3);
        prefs.cycle_sets_to_win(true);
        assert_eq!(prefs.config.sets_to_win, 1);
        prefs.cycle_sets_to_win(false);
        assert_eq!(prefs.config.sets_to_win, 3);
    }

    #[test]
    fn test_rename_rejects_blank() {
        let mut prefs = Preferences::default();
        assert!(prefs.rename(Team::A, " Setters "));
        assert_eq!(prefs.team_a.name, "Setters");
        assert!(!prefs.rename(Team::A, "  "));
        assert_eq!(prefs.team_a.name, "Setters");
    }

    #[test]
    fn test_sanitized_repairs_bad_values() {
        let mut prefs = Preferences::default();
        prefs.config.points_per_set = 1;
        prefs.config.sets_to_win = 9;
        prefs.team_b.name = "   ".to_string();

        let fixed = prefs.sanitized();
        assert_eq!(fixed.config.points_per_set, MIN_SET_POINTS);
        assert_eq!(fixed.config.sets_to_win, 2);
        assert_eq!(fixed.team_b.name, "Guest");
        assert_eq!(fixed.config.validate(), Ok(()));
    }

    #[test]
    fn test_missing_sound_field_defaults_on() {
        let json = r#"{
            "config": {"points_per_set": 21, "last_set_points": 15, "sets_to_win": 2, "win_by_two": true},
            "team_a": {"name": "A", "color": "blue"},
            "team_b": {"name": "B", "color": "red"}
        }"#;
        let prefs: Preferences = serde_json::from_str(json).unwrap();
        assert!(prefs.sound);
        assert_eq!(prefs.config.points_per_set, 21);
    }

    #[test]
    fn test_preset_to_state() {
        let preset = TeamPreset {
            name: "Lions".to_string(),
            color: ColorToken::Orange,
        };
        let state = preset.to_state();
        assert_eq!(state.name, "Lions");
        assert_eq!(state.score, 0);
        assert_eq!(state.sets_won, 0);
    }
}
