//! Match statistics and lifetime team records
//!
//! This module provides:
//! - Per-match statistics derived from the point log alone
//! - Set-by-set results (final score of each completed set)
//! - Lifetime records aggregated from archived matches, keyed by team name
//! - Share and report text (see [`share`])

pub mod share;

use crate::engine::{history, HistoryEvent, MatchSnapshot, ScoreSnapshot, Team};
use std::collections::HashMap;

/// Result of one completed set
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SetResult {
    /// One-based set number
    pub number: u32,
    /// Side that took the set
    pub winner: Team,
    /// Final score, including the set-winning point
    pub score: ScoreSnapshot,
}

/// Statistics for a single match
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct MatchStats {
    /// Rally points won by A
    pub points_a: u32,
    /// Rally points won by B
    pub points_b: u32,
    /// Longest unbroken scoring run by A
    pub longest_run_a: u32,
    /// Longest unbroken scoring run by B
    pub longest_run_b: u32,
    /// Completed sets in order
    pub sets: Vec<SetResult>,
}

impl MatchStats {
    /// Compute statistics from a point log
    pub fn from_history(events: &[HistoryEvent]) -> Self {
        let mut stats = MatchStats::default();
        let mut run_team: Option<Team> = None;
        let mut run_len = 0;

        for event in events {
            match event.team {
                Team::A => stats.points_a += 1,
                Team::B => stats.points_b += 1,
            }

            if run_team == Some(event.team) {
                run_len += 1;
            } else {
                run_team = Some(event.team);
                run_len = 1;
            }
            let best = match event.team {
                Team::A => &mut stats.longest_run_a,
                Team::B => &mut stats.longest_run_b,
            };
            *best = (*best).max(run_len);
        }

        stats.sets = history::set_closers(events)
            .enumerate()
            .map(|(i, e)| SetResult {
                number: i as u32 + 1,
                winner: e.team,
                score: e.score_after(),
            })
            .collect();

        stats
    }

    /// Total rally points played
    pub fn total_points(&self) -> u32 {
        self.points_a + self.points_b
    }

    pub fn points(&self, team: Team) -> u32 {
        match team {
            Team::A => self.points_a,
            Team::B => self.points_b,
        }
    }

    pub fn longest_run(&self, team: Team) -> u32 {
        match team {
            Team::A => self.longest_run_a,
            Team::B => self.longest_run_b,
        }
    }

    /// Share of all points won by `team`, as a rounded percentage.
    ///
    /// An empty match is shown as an even split.
    pub fn point_share(&self, team: Team) -> u32 {
        let total = self.total_points();
        if total == 0 {
            return 50;
        }
        ((self.points(team) as f64 / total as f64) * 100.0).round() as u32
    }
}

/// Lifetime record for one team name
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TeamRecord {
    /// Team name
    pub name: String,
    /// Completed matches played
    pub matches_played: u32,
    /// Matches won
    pub matches_won: u32,
    /// Sets won across all matches
    pub sets_won: u32,
    /// Rally points won across all matches
    pub points_won: u32,
}

impl TeamRecord {
    pub fn new(name: String) -> Self {
        TeamRecord {
            name,
            ..Default::default()
        }
    }

    /// Fraction of matches won (0.0 when none played)
    pub fn win_rate(&self) -> f64 {
        if self.matches_played == 0 {
            0.0
        } else {
            self.matches_won as f64 / self.matches_played as f64
        }
    }
}

/// Aggregates archived matches into per-team records.
///
/// Records are keyed by team name, so two sides sharing a name in one
/// match would land on the same record. Match setup and renames reject
/// duplicate names to keep that from happening.
#[derive(Debug, Default)]
pub struct RecordTracker {
    records: HashMap<String, TeamRecord>,
}

impl RecordTracker {
    pub fn new() -> Self {
        RecordTracker::default()
    }

    /// Build records by replaying archived matches in order
    pub fn from_matches<'a>(matches: impl IntoIterator<Item = &'a MatchSnapshot>) -> Self {
        let mut tracker = RecordTracker::new();
        for snapshot in matches {
            tracker.process_match(snapshot);
        }
        tracker
    }

    /// Record for a team name (read-only)
    #[cfg(test)]
    pub fn get(&self, name: &str) -> Option<&TeamRecord> {
        self.records.get(name)
    }

    fn get_or_create(&mut self, name: &str) -> &mut TeamRecord {
        self.records
            .entry(name.to_string())
            .or_insert_with(|| TeamRecord::new(name.to_string()))
    }

    /// Fold one match into the records. Undecided matches are skipped.
    pub fn process_match(&mut self, snapshot: &MatchSnapshot) {
        let Some(winner) = snapshot.winning_team() else {
            return;
        };
        let stats = MatchStats::from_history(&snapshot.history);

        for team in Team::BOTH {
            let state = snapshot.team(team);
            let record = self.get_or_create(&state.name);
            record.matches_played += 1;
            record.sets_won += state.sets_won;
            record.points_won += stats.points(team);
            if team == winner {
                record.matches_won += 1;
            }
        }
    }

    /// Take back a match folded in by [`process_match`](Self::process_match).
    ///
    /// Records left with no matches played are dropped.
    pub fn retract_match(&mut self, snapshot: &MatchSnapshot) {
        let Some(winner) = snapshot.winning_team() else {
            return;
        };
        let stats = MatchStats::from_history(&snapshot.history);

        for team in Team::BOTH {
            let state = snapshot.team(team);
            let Some(record) = self.records.get_mut(&state.name) else {
                continue;
            };
            record.matches_played = record.matches_played.saturating_sub(1);
            record.sets_won = record.sets_won.saturating_sub(state.sets_won);
            record.points_won = record.points_won.saturating_sub(stats.points(team));
            if team == winner {
                record.matches_won = record.matches_won.saturating_sub(1);
            }
            if record.matches_played == 0 {
                self.records.remove(&state.name);
            }
        }
    }

    /// Records sorted by matches won, then win rate, then name
    pub fn standings(&self) -> Vec<&TeamRecord> {
        let mut records: Vec<_> = self.records.values().collect();
        records.sort_by(|a, b| {
            b.matches_won
                .cmp(&a.matches_won)
                .then(
                    b.win_rate()
                        .partial_cmp(&a.win_rate())
                        .unwrap_or(std::cmp::Ordering::Equal),
                )
                .then(a.name.cmp(&b.name))
        });
        records
    }

    /// Number of distinct team names seen
    #[cfg(test)]
    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::engine::{MatchConfig, ScoreEngine};

    fn play(engine: &mut ScoreEngine, points: &[(Team, u32)]) {
        for (team, n) in points {
            for _ in 0..*n {
                engine.apply_point(*team);
            }
        }
    }

    fn short_config() -> MatchConfig {
        MatchConfig {
            points_per_set: 5,
            last_set_points: 3,
            sets_to_win: 2,
            win_by_two: true,
        }
    }

    fn finished_match(a_name: &str, b_name: &str, a_wins: bool) -> MatchSnapshot {
        let mut engine = ScoreEngine::new(short_config());
        engine.rename_team(Team::A, a_name);
        engine.rename_team(Team::B, b_name);
        engine.start_match();
        let w = if a_wins { Team::A } else { Team::B };
        play(&mut engine, &[(w.other(), 2), (w, 5), (w, 5)]);
        engine.snapshot()
    }

    #[test]
    fn test_empty_history() {
        let stats = MatchStats::from_history(&[]);
        assert_eq!(stats.total_points(), 0);
        assert_eq!(stats.point_share(Team::A), 50);
        assert_eq!(stats.point_share(Team::B), 50);
        assert!(stats.sets.is_empty());
    }

    #[test]
    fn test_points_and_runs() {
        let mut engine = ScoreEngine::new(MatchConfig::default());
        engine.start_match();
        play(
            &mut engine,
            &[(Team::A, 3), (Team::B, 1), (Team::A, 1), (Team::B, 4)],
        );
        let stats = MatchStats::from_history(engine.history());
        assert_eq!(stats.points_a, 4);
        assert_eq!(stats.points_b, 5);
        assert_eq!(stats.longest_run_a, 3);
        assert_eq!(stats.longest_run_b, 4);
        assert_eq!(stats.point_share(Team::A), 44);
        assert_eq!(stats.point_share(Team::B), 56);
    }

    #[test]
    fn test_set_results_include_winning_point() {
        let mut engine = ScoreEngine::new(short_config());
        engine.start_match();
        play(
            &mut engine,
            &[(Team::B, 3), (Team::A, 5), (Team::B, 5), (Team::A, 3)],
        );
        let stats = MatchStats::from_history(engine.history());
        assert_eq!(
            stats.sets,
            vec![
                SetResult {
                    number: 1,
                    winner: Team::A,
                    score: ScoreSnapshot { a: 5, b: 3 }
                },
                SetResult {
                    number: 2,
                    winner: Team::B,
                    score: ScoreSnapshot { a: 0, b: 5 }
                },
                SetResult {
                    number: 3,
                    winner: Team::A,
                    score: ScoreSnapshot { a: 3, b: 0 }
                },
            ]
        );
    }

    #[test]
    fn test_stats_follow_undo() {
        let mut engine = ScoreEngine::new(short_config());
        engine.start_match();
        play(&mut engine, &[(Team::A, 5)]);
        assert_eq!(MatchStats::from_history(engine.history()).sets.len(), 1);
        engine.undo();
        let stats = MatchStats::from_history(engine.history());
        assert!(stats.sets.is_empty());
        assert_eq!(stats.points_a, 4);
    }

    #[test]
    fn test_record_tracker() {
        let matches = vec![
            finished_match("Aces", "Blockers", true),
            finished_match("Aces", "Blockers", false),
            finished_match("Aces", "Diggers", true),
        ];
        let tracker = RecordTracker::from_matches(&matches);

        let aces = tracker.get("Aces").unwrap();
        assert_eq!(aces.matches_played, 3);
        assert_eq!(aces.matches_won, 2);
        assert_eq!(aces.sets_won, 4);
        assert_eq!(aces.points_won, 5 + 5 + 2 + 5 + 5);

        let blockers = tracker.get("Blockers").unwrap();
        assert_eq!(blockers.matches_won, 1);
        assert_eq!(tracker.len(), 3);
    }

    #[test]
    fn test_retract_match() {
        let first = finished_match("Aces", "Blockers", true);
        let second = finished_match("Aces", "Diggers", false);
        let mut tracker = RecordTracker::from_matches([&first, &second]);

        tracker.retract_match(&second);
        let aces = tracker.get("Aces").unwrap();
        assert_eq!(aces.matches_played, 1);
        assert_eq!(aces.matches_won, 1);
        assert_eq!(aces.sets_won, 2);
        assert_eq!(aces.points_won, 10);
        assert!(tracker.get("Diggers").is_none());
        assert_eq!(tracker.len(), 2);

        tracker.retract_match(&first);
        assert!(tracker.is_empty());
    }

    #[test]
    fn test_record_tracker_skips_undecided() {
        let mut engine = ScoreEngine::new(short_config());
        engine.start_match();
        play(&mut engine, &[(Team::A, 5)]);
        let tracker = RecordTracker::from_matches(&[engine.snapshot()]);
        assert!(tracker.is_empty());
    }

    #[test]
    fn test_standings_order() {
        let matches = vec![
            finished_match("Zebras", "Yaks", true),
            finished_match("Zebras", "Yaks", true),
            finished_match("Yaks", "Ants", true),
        ];
        let tracker = RecordTracker::from_matches(&matches);
        let names: Vec<_> = tracker.standings().iter().map(|r| r.name.as_str()).collect();
        assert_eq!(names, vec!["Zebras", "Yaks", "Ants"]);
    }

    #[test]
    fn test_win_rate() {
        let mut record = TeamRecord::new("X".to_string());
        assert_eq!(record.win_rate(), 0.0);
        record.matches_played = 4;
        record.matches_won = 1;
        assert!((record.win_rate() - 0.25).abs() < f64::EPSILON);
    }
}
