//! Append-only point log
//!
//! One event per applied point. The log is the source of truth for set
//! counts: after any undo, `sets_won` is recomputed from it rather than
//! decremented, because the popped event is itself the set-winning point.

use super::Team;
use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Outcome classification of a single point
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum EventKind {
    /// Ordinary rally point
    Point,
    /// The point closed a set
    SetWin,
    /// The point closed the match
    MatchWin,
}

impl EventKind {
    /// True for points that closed a set (including the match-deciding one)
    pub fn closes_set(&self) -> bool {
        matches!(self, EventKind::SetWin | EventKind::MatchWin)
    }

    pub fn label(&self) -> &'static str {
        match self {
            EventKind::Point => "POINT",
            EventKind::SetWin => "SET_WIN",
            EventKind::MatchWin => "MATCH_WIN",
        }
    }
}

/// Set scores at a moment in time
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ScoreSnapshot {
    pub a: u32,
    pub b: u32,
}

impl ScoreSnapshot {
    /// Score of the given team
    pub fn of(&self, team: Team) -> u32 {
        match team {
            Team::A => self.a,
            Team::B => self.b,
        }
    }

    /// Snapshot with one more point for `team`
    pub fn with_point(&self, team: Team) -> Self {
        match team {
            Team::A => Self { a: self.a + 1, b: self.b },
            Team::B => Self { a: self.a, b: self.b + 1 },
        }
    }
}

/// A single applied point
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct HistoryEvent {
    /// Who scored
    pub team: Team,
    /// What the point did
    pub kind: EventKind,
    /// Zero-based set the point belongs to
    pub set_index: u32,
    /// Scores immediately BEFORE this point
    pub snapshot: ScoreSnapshot,
    /// Monotonic offset from match start
    pub at: Duration,
}

impl HistoryEvent {
    /// Final set score for a set-closing event (pre-point snapshot plus the point itself)
    pub fn score_after(&self) -> ScoreSnapshot {
        self.snapshot.with_point(self.team)
    }
}

/// Count the sets `team` has won according to `history`.
///
/// The match-deciding point is reclassified `MatchWin` but still closed a
/// set, so it counts. It is always the last event of a log, which means a log
/// left behind by an undo only ever holds `SetWin` closers.
pub fn sets_won_in(history: &[HistoryEvent], team: Team) -> u32 {
    history
        .iter()
        .filter(|e| e.kind.closes_set() && e.team == team)
        .count() as u32
}

/// Events that closed a set, in order
pub fn set_closers(history: &[HistoryEvent]) -> impl Iterator<Item = &HistoryEvent> {
    history.iter().filter(|e| e.kind.closes_set())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn event(team: Team, kind: EventKind, set_index: u32, a: u32, b: u32) -> HistoryEvent {
        HistoryEvent {
            team,
            kind,
            set_index,
            snapshot: ScoreSnapshot { a, b },
            at: Duration::ZERO,
        }
    }

    #[test]
    fn test_sets_won_counts_set_closers() {
        let history = vec![
            event(Team::A, EventKind::Point, 0, 0, 0),
            event(Team::A, EventKind::SetWin, 0, 24, 10),
            event(Team::B, EventKind::SetWin, 1, 3, 24),
        ];
        assert_eq!(sets_won_in(&history, Team::A), 1);
        assert_eq!(sets_won_in(&history, Team::B), 1);
    }

    #[test]
    fn test_sets_won_includes_match_point() {
        let history = vec![
            event(Team::A, EventKind::SetWin, 0, 24, 10),
            event(Team::B, EventKind::SetWin, 1, 3, 24),
            event(Team::A, EventKind::MatchWin, 2, 14, 2),
        ];
        assert_eq!(sets_won_in(&history, Team::A), 2);
        assert_eq!(sets_won_in(&history, Team::B), 1);
    }

    #[test]
    fn test_sets_won_empty_history() {
        assert_eq!(sets_won_in(&[], Team::A), 0);
        assert_eq!(sets_won_in(&[], Team::B), 0);
    }

    #[test]
    fn test_score_after_adds_the_point() {
        let e = event(Team::B, EventKind::SetWin, 1, 20, 24);
        assert_eq!(e.score_after(), ScoreSnapshot { a: 20, b: 25 });
    }

    #[test]
    fn test_set_closers() {
        let history = vec![
            event(Team::A, EventKind::Point, 0, 0, 0),
            event(Team::A, EventKind::SetWin, 0, 24, 10),
            event(Team::B, EventKind::Point, 1, 0, 0),
            event(Team::B, EventKind::MatchWin, 1, 0, 24),
        ];
        let closers: Vec<_> = set_closers(&history).map(|e| e.kind).collect();
        assert_eq!(closers, vec![EventKind::SetWin, EventKind::MatchWin]);
    }

    #[test]
    fn test_event_kind_serializes_screaming_case() {
        let json = serde_json::to_string(&EventKind::MatchWin).unwrap();
        assert_eq!(json, "\"MATCH_WIN\"");
        assert_eq!(EventKind::SetWin.label(), "SET_WIN");
    }

    #[test]
    fn test_closes_set() {
        assert!(!EventKind::Point.closes_set());
        assert!(EventKind::SetWin.closes_set());
        assert!(EventKind::MatchWin.closes_set());
    }
}
