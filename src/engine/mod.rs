//! Match scoring engine
//!
//! Owns the whole live match: both teams, the point log, the clock and the
//! winner. Every change goes through one command method; readers get shared
//! references or a cloned [`MatchSnapshot`].
//!
//! Illegal commands (scoring after the match is decided, undo with nothing
//! to undo, blank renames) are silent no-ops, never errors.

pub mod clock;
pub mod debounce;
pub mod history;
pub mod notify;
pub mod rules;
pub mod team;

pub use clock::{format_duration, ClockSnapshot, MatchClock};
pub use debounce::CommandGate;
pub use history::{sets_won_in, EventKind, HistoryEvent, ScoreSnapshot};
pub use notify::{Notification, Notifier};
pub use rules::MatchConfig;
pub use team::{normalize_name, same_name, ColorToken, Team, TeamState};

use serde::{Deserialize, Serialize};
use std::sync::mpsc::Receiver;
use std::time::Instant;
use tracing::{debug, info};

/// Serializable copy of the full match state
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MatchSnapshot {
    pub config: MatchConfig,
    pub team_a: TeamState,
    pub team_b: TeamState,
    pub history: Vec<HistoryEvent>,
    pub clock: ClockSnapshot,
    pub winner: Option<String>,
}

impl MatchSnapshot {
    pub fn team(&self, team: Team) -> &TeamState {
        match team {
            Team::A => &self.team_a,
            Team::B => &self.team_b,
        }
    }

    /// Zero-based index of the set in progress
    pub fn current_set_index(&self) -> u32 {
        self.team_a.sets_won + self.team_b.sets_won
    }

    /// Side that won the match, if decided
    pub fn winning_team(&self) -> Option<Team> {
        self.history
            .last()
            .filter(|e| e.kind == EventKind::MatchWin)
            .map(|e| e.team)
    }
}

/// The single owner of live match state
#[derive(Debug)]
pub struct ScoreEngine {
    config: MatchConfig,
    team_a: TeamState,
    team_b: TeamState,
    history: Vec<HistoryEvent>,
    clock: MatchClock,
    winner: Option<String>,
    /// False until `start_match`, and again after `reset_match`
    started: bool,
    /// Zero point for history timestamps
    origin: Instant,
    gate: CommandGate,
    notifier: Notifier,
}

impl ScoreEngine {
    /// A not-yet-started engine with the default teams
    pub fn new(config: MatchConfig) -> Self {
        Self::with_teams(
            config,
            TeamState::default_for(Team::A),
            TeamState::default_for(Team::B),
        )
    }

    /// A not-yet-started engine with the given team names and colors.
    ///
    /// Scores and set counts on the passed states are discarded.
    pub fn with_teams(config: MatchConfig, team_a: TeamState, team_b: TeamState) -> Self {
        let mut engine = ScoreEngine {
            config,
            team_a,
            team_b,
            history: Vec::new(),
            clock: MatchClock::new(),
            winner: None,
            started: false,
            origin: Instant::now(),
            gate: CommandGate::default(),
            notifier: Notifier::new(),
        };
        engine.clear_match();
        engine
    }

    /// Replace the double-tap gate (e.g. a different interval)
    pub fn with_gate(mut self, gate: CommandGate) -> Self {
        self.gate = gate;
        self
    }

    // ---- queries ----

    pub fn config(&self) -> &MatchConfig {
        &self.config
    }

    pub fn team(&self, team: Team) -> &TeamState {
        match team {
            Team::A => &self.team_a,
            Team::B => &self.team_b,
        }
    }

    pub fn team_a(&self) -> &TeamState {
        &self.team_a
    }

    pub fn team_b(&self) -> &TeamState {
        &self.team_b
    }

    /// Every applied point, oldest first
    pub fn history(&self) -> &[HistoryEvent] {
        &self.history
    }

    /// Name of the match winner, once decided
    pub fn winner(&self) -> Option<&str> {
        self.winner.as_deref()
    }

    /// Side that won the match, once decided
    pub fn winning_team(&self) -> Option<Team> {
        self.winner.as_ref()?;
        self.history.last().map(|e| e.team)
    }

    pub fn clock(&self) -> ClockSnapshot {
        self.clock.snapshot()
    }

    /// True between `start_match` and `reset_match`
    pub fn is_started(&self) -> bool {
        self.started
    }

    /// True once a winner has been decided
    pub fn is_concluded(&self) -> bool {
        self.winner.is_some()
    }

    /// Zero-based index of the set in progress
    pub fn current_set_index(&self) -> u32 {
        self.team_a.sets_won + self.team_b.sets_won
    }

    /// Points needed to win the set in progress
    pub fn current_set_target(&self) -> u32 {
        self.config.target_for(self.current_set_index())
    }

    /// Current set scores
    pub fn scores(&self) -> ScoreSnapshot {
        ScoreSnapshot {
            a: self.team_a.score,
            b: self.team_b.score,
        }
    }

    /// Whether `team` would win the current set with its next point
    pub fn is_set_point(&self, team: Team) -> bool {
        if self.is_concluded() {
            return false;
        }
        let scores = self.scores();
        self.config.is_set_point(
            scores.of(team),
            scores.of(team.other()),
            self.current_set_index(),
        )
    }

    /// Whether `team` would win the match with its next point
    pub fn is_match_point(&self, team: Team) -> bool {
        self.is_set_point(team) && self.team(team).sets_won + 1 >= self.config.sets_to_win
    }

    /// Copy of the full state for persistence and summaries
    pub fn snapshot(&self) -> MatchSnapshot {
        MatchSnapshot {
            config: self.config,
            team_a: self.team_a.clone(),
            team_b: self.team_b.clone(),
            history: self.history.clone(),
            clock: self.clock.snapshot(),
            winner: self.winner.clone(),
        }
    }

    /// Receive a notification for every accepted point, undo and reset
    pub fn subscribe(&mut self) -> Receiver<Notification> {
        self.notifier.subscribe()
    }

    // ---- configuration ----

    /// Swap the ruleset. Only accepted while no match is active.
    pub fn reconfigure(&mut self, config: MatchConfig) -> bool {
        if self.started {
            debug!("reconfigure rejected: match in progress");
            return false;
        }
        self.config = config;
        true
    }

    // ---- commands ----

    /// Clear the match and make it active.
    pub fn start_match(&mut self) {
        self.clear_match();
        self.started = true;
        info!(
            team_a = %self.team_a.name,
            team_b = %self.team_b.name,
            sets_to_win = self.config.sets_to_win,
            "match started"
        );
        self.notifier.emit(Notification::Reset);
    }

    /// Clear the match and return to the not-started state.
    pub fn reset_match(&mut self) {
        self.clear_match();
        self.started = false;
        info!("match reset");
        self.notifier.emit(Notification::Reset);
    }

    /// Score a point for `team` now.
    pub fn apply_point(&mut self, team: Team) -> Option<EventKind> {
        self.apply_point_at(team, Instant::now())
    }

    /// Score a point unless it arrives within the double-tap window of the
    /// previous accepted submission.
    pub fn submit_point(&mut self, team: Team, now: Instant) -> Option<EventKind> {
        if !self.accepts_points() {
            return None;
        }
        if !self.gate.admit(now) {
            debug!(team = team.label(), "point coalesced as double tap");
            return None;
        }
        self.apply_point_at(team, now)
    }

    /// Score a point for `team` at `now`.
    ///
    /// Returns how the point was classified, or `None` if it was rejected
    /// because no match is active or the match is already decided.
    pub fn apply_point_at(&mut self, team: Team, now: Instant) -> Option<EventKind> {
        if !self.accepts_points() {
            debug!(team = team.label(), "point ignored: match not accepting points");
            return None;
        }

        let set_index = self.current_set_index();
        self.history.push(HistoryEvent {
            team,
            kind: EventKind::Point,
            set_index,
            snapshot: self.scores(),
            at: now.saturating_duration_since(self.origin),
        });

        self.team_mut(team).score += 1;
        let own = self.team(team).score;
        let opp = self.team(team.other()).score;

        let mut kind = EventKind::Point;
        if self.config.is_set_win(own, opp, set_index) {
            kind = EventKind::SetWin;
            self.team_mut(team).sets_won += 1;
            self.team_a.score = 0;
            self.team_b.score = 0;
            self.clock.stop(now);

            if self.team(team).sets_won == self.config.sets_to_win {
                kind = EventKind::MatchWin;
                self.winner = Some(self.team(team).name.clone());
                info!(
                    winner = %self.team(team).name,
                    sets_a = self.team_a.sets_won,
                    sets_b = self.team_b.sets_won,
                    "match won"
                );
            } else {
                info!(
                    team = %self.team(team).name,
                    set = set_index + 1,
                    final_score = %format!("{}-{}", own, opp),
                    "set won"
                );
            }

            if let Some(event) = self.history.last_mut() {
                event.kind = kind;
            }
        } else {
            debug!(team = team.label(), a = self.team_a.score, b = self.team_b.score, "point");
        }

        // A point that closes a set leaves the clock stopped until the next
        // set's first point.
        if kind == EventKind::Point && !self.clock.is_running() {
            self.clock.start(now);
        }

        self.notifier
            .emit(Notification::for_point(team, kind, set_index));
        Some(kind)
    }

    /// Take back the last point, restoring the exact prior state.
    ///
    /// When the removed point closed a set, set counts are recounted from the
    /// remaining log. The recount includes the match-winning event along with
    /// plain set wins, since that event also closed the deciding set; this keeps
    /// `sets_won` equal to the closed sets in the log even while a match is
    /// decided.
    ///
    /// Returns the removed event, or `None` if there was nothing to undo.
    pub fn undo(&mut self) -> Option<HistoryEvent> {
        let event = self.history.pop()?;

        self.team_a.score = event.snapshot.a;
        self.team_b.score = event.snapshot.b;

        if event.kind.closes_set() {
            // Recount from the log: the popped event was itself the set
            // winner, so a plain decrement could not tell which side to undo.
            self.team_a.sets_won = sets_won_in(&self.history, Team::A);
            self.team_b.sets_won = sets_won_in(&self.history, Team::B);
            self.winner = None;
        }

        if self.history.is_empty() {
            self.clock.reset();
        }

        debug!(
            team = event.team.label(),
            kind = event.kind.label(),
            remaining = self.history.len(),
            "undo"
        );
        self.notifier.emit(Notification::Undo);
        Some(event)
    }

    /// Advance the clock to `now`; returns seconds added
    pub fn tick(&mut self, now: Instant) -> u64 {
        self.clock.tick(now)
    }

    pub fn pause_clock(&mut self) -> bool {
        self.pause_clock_at(Instant::now())
    }

    pub fn resume_clock(&mut self) -> bool {
        self.resume_clock_at(Instant::now())
    }

    pub fn toggle_clock(&mut self) -> bool {
        self.toggle_clock_at(Instant::now())
    }

    /// Stop the clock. Returns false if the clock is not under manual control.
    pub fn pause_clock_at(&mut self, now: Instant) -> bool {
        if !self.clock_is_manual() {
            return false;
        }
        self.clock.stop(now);
        true
    }

    /// Start the clock. Returns false if the clock is not under manual control.
    pub fn resume_clock_at(&mut self, now: Instant) -> bool {
        if !self.clock_is_manual() {
            return false;
        }
        self.clock.start(now);
        true
    }

    pub fn toggle_clock_at(&mut self, now: Instant) -> bool {
        if !self.clock_is_manual() {
            return false;
        }
        self.clock.toggle(now);
        debug!(running = self.clock.is_running(), "clock toggled");
        true
    }

    /// Rename a team. The name is trimmed; blank names are ignored.
    pub fn rename_team(&mut self, team: Team, name: &str) -> bool {
        let Some(name) = normalize_name(name) else {
            return false;
        };
        debug!(team = team.label(), name = %name, "team renamed");
        self.team_mut(team).name = name;
        true
    }

    pub fn set_team_color(&mut self, team: Team, color: ColorToken) {
        self.team_mut(team).color = color;
    }

    // ---- internals ----

    fn accepts_points(&self) -> bool {
        self.started && self.winner.is_none()
    }

    fn clock_is_manual(&self) -> bool {
        self.started && self.winner.is_none()
    }

    fn team_mut(&mut self, team: Team) -> &mut TeamState {
        match team {
            Team::A => &mut self.team_a,
            Team::B => &mut self.team_b,
        }
    }

    fn clear_match(&mut self) {
        self.history.clear();
        for team in [&mut self.team_a, &mut self.team_b] {
            team.score = 0;
            team.sets_won = 0;
        }
        self.winner = None;
        self.clock.reset();
        self.gate.clear();
        self.origin = Instant::now();
    }
}
