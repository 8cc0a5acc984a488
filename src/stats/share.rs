//! Shareable text built from match state

use super::MatchStats;
use crate::engine::{format_duration, MatchSnapshot, Team};
use std::fmt::Write;

/// One-line status for sharing mid-match or after it ends.
///
/// In progress: `Match update: Home 1-0 Guest (Set 2: 3-5)`
/// Decided: `Final: Home 2-1 Guest (Home wins)`
pub fn share_text(snapshot: &MatchSnapshot) -> String {
    let a = &snapshot.team_a;
    let b = &snapshot.team_b;
    match &snapshot.winner {
        Some(winner) => format!(
            "Final: {} {}-{} {} ({} wins)",
            a.name, a.sets_won, b.sets_won, b.name, winner
        ),
        None => format!(
            "Match update: {} {}-{} {} (Set {}: {}-{})",
            a.name,
            a.sets_won,
            b.sets_won,
            b.name,
            snapshot.current_set_index() + 1,
            a.score,
            b.score
        ),
    }
}

/// Multi-line match report: status, set results, totals and runs
pub fn match_report(snapshot: &MatchSnapshot) -> String {
    let stats = MatchStats::from_history(&snapshot.history);
    let a = &snapshot.team_a;
    let b = &snapshot.team_b;
    let mut out = String::new();

    let _ = writeln!(out, "{} vs {}", a.name, b.name);
    match &snapshot.winner {
        Some(winner) => {
            let _ = writeln!(out, "Winner: {} ({}-{})", winner, a.sets_won, b.sets_won);
        }
        None => {
            let _ = writeln!(
                out,
                "In progress: sets {}-{}, set {} at {}-{}",
                a.sets_won,
                b.sets_won,
                snapshot.current_set_index() + 1,
                a.score,
                b.score
            );
        }
    }
    let _ = writeln!(
        out,
        "Time: {}",
        format_duration(snapshot.clock.duration_seconds)
    );

    if !stats.sets.is_empty() {
        let _ = writeln!(out);
        let _ = writeln!(out, "Sets:");
        for set in &stats.sets {
            let _ = writeln!(
                out,
                "  #{} {}-{} {}",
                set.number,
                set.score.a,
                set.score.b,
                snapshot.team(set.winner).name
            );
        }
    }

    let _ = writeln!(out);
    for team in Team::BOTH {
        let _ = writeln!(
            out,
            "{}: {} points ({}%), longest run {}",
            snapshot.team(team).name,
            stats.points(team),
            stats.point_share(team),
            stats.longest_run(team)
        );
    }

    out
}
