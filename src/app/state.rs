//! Match screen state
//!
//! Wraps the [`ScoreEngine`] with what the match screen needs on top of it:
//! a feedback line, the rename prompt, overlays, the reset confirmation and
//! pending sound cues.

use crate::engine::{same_name, ColorToken, Notification, ScoreEngine, Team};
use crate::stats::share::{match_report, share_text};
use std::sync::mpsc::{Receiver, TryRecvError};
use std::time::Instant;
use tracing::{debug, info};

/// Longest team name the rename prompt accepts
pub const MAX_NAME_LEN: usize = 20;

/// An in-progress team rename
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RenamePrompt {
    pub team: Team,
    pub input: String,
}

/// Number of terminal bells rung for a notification
pub fn bell_count(notification: &Notification) -> u8 {
    match notification {
        Notification::Point { .. } => 1,
        Notification::SetWin { .. } => 2,
        Notification::MatchWin { .. } => 3,
        Notification::Undo | Notification::Reset => 0,
    }
}

/// Match screen state
pub struct App {
    engine: ScoreEngine,
    notifications: Receiver<Notification>,
    /// Feedback message from the last command
    pub feedback: String,
    /// Active rename prompt, if any
    pub rename: Option<RenamePrompt>,
    /// Whether the stats overlay is shown
    pub show_stats: bool,
    /// Whether the match report overlay is shown
    pub show_report: bool,
    /// Waiting for the user to confirm a reset
    pub confirm_reset: bool,
    /// Last generated share text
    pub share: Option<String>,
    /// Ring bells on notifications
    pub sound: bool,
    pending_bells: u8,
}

impl App {
    /// Wrap an engine, subscribing to its notifications
    pub fn new(mut engine: ScoreEngine, sound: bool) -> Self {
        let notifications = engine.subscribe();
        App {
            engine,
            notifications,
            feedback: String::new(),
            rename: None,
            show_stats: false,
            show_report: false,
            confirm_reset: false,
            share: None,
            sound,
            pending_bells: 0,
        }
    }

    pub fn engine(&self) -> &ScoreEngine {
        &self.engine
    }

    pub fn engine_mut(&mut self) -> &mut ScoreEngine {
        &mut self.engine
    }

    /// Whether a prompt or confirmation is capturing input
    pub fn is_modal(&self) -> bool {
        self.rename.is_some() || self.confirm_reset
    }

    /// Score a point for `team` (debounced)
    pub fn on_point(&mut self, team: Team, now: Instant) {
        if self.is_modal() {
            return;
        }
        if self.engine.is_concluded() {
            self.feedback = "Match is over. Undo or reset to continue".to_string();
            return;
        }
        if self.engine.submit_point(team, now).is_none() {
            debug!(team = team.label(), "point ignored");
        }
    }

    /// Undo the last point
    pub fn on_undo(&mut self) {
        if self.is_modal() {
            return;
        }
        if self.engine.undo().is_none() {
            self.feedback = "Nothing to undo".to_string();
        }
    }

    /// Pause or resume the match clock
    pub fn on_toggle_clock(&mut self, now: Instant) {
        if self.is_modal() {
            return;
        }
        if self.engine.toggle_clock_at(now) {
            self.feedback = if self.engine.clock().running {
                "Clock running".to_string()
            } else {
                "Clock paused".to_string()
            };
        }
    }

    /// Advance the clock; called once per UI tick
    pub fn tick(&mut self, now: Instant) {
        self.engine.tick(now);
    }

    pub fn toggle_stats(&mut self) {
        self.show_stats = !self.show_stats;
        self.show_report = false;
    }

    pub fn toggle_report(&mut self) {
        self.show_report = !self.show_report;
        self.show_stats = false;
    }

    /// Build the share line and show it
    pub fn on_share(&mut self) {
        let text = share_text(&self.engine.snapshot());
        info!(text = %text, "share");
        self.feedback = "Share text ready".to_string();
        self.share = Some(text);
    }

    /// Full text report for the current match
    pub fn report(&self) -> String {
        match_report(&self.engine.snapshot())
    }

    /// Open the rename prompt for `team`, prefilled with its current name
    pub fn begin_rename(&mut self, team: Team) {
        if self.is_modal() {
            return;
        }
        self.rename = Some(RenamePrompt {
            team,
            input: self.engine.team(team).name.clone(),
        });
    }

    pub fn rename_char(&mut self, c: char) {
        if let Some(prompt) = &mut self.rename {
            if prompt.input.chars().count() < MAX_NAME_LEN {
                prompt.input.push(c);
            }
        }
    }

    pub fn rename_backspace(&mut self) {
        if let Some(prompt) = &mut self.rename {
            prompt.input.pop();
        }
    }

    /// Apply the prompt. Blank names and the other side's name leave the
    /// team as it was.
    pub fn commit_rename(&mut self) {
        if let Some(prompt) = self.rename.take() {
            let other = &self.engine.team(prompt.team.other()).name;
            if same_name(&prompt.input, other) {
                self.feedback = format!("{} is already playing", other.trim());
            } else if self.engine.rename_team(prompt.team, &prompt.input) {
                self.feedback = format!("Renamed to {}", self.engine.team(prompt.team).name);
            } else {
                self.feedback = "Name can't be blank".to_string();
            }
        }
    }

    pub fn cancel_rename(&mut self) {
        self.rename = None;
    }

    /// Step a team's color through the palette
    pub fn cycle_color(&mut self, team: Team) {
        if self.is_modal() {
            return;
        }
        let next: ColorToken = self.engine.team(team).color.next();
        self.engine.set_team_color(team, next);
    }

    /// Ask for reset confirmation
    pub fn request_reset(&mut self) {
        if self.rename.is_none() {
            self.confirm_reset = true;
        }
    }

    /// Reset the match. The engine goes back to its not-started state.
    pub fn confirm_reset(&mut self) {
        if !self.confirm_reset {
            return;
        }
        self.confirm_reset = false;
        self.show_stats = false;
        self.show_report = false;
        self.share = None;
        self.engine.reset_match();
    }

    pub fn cancel_reset(&mut self) {
        self.confirm_reset = false;
    }

    /// Drain engine notifications, updating feedback and queueing cues.
    ///
    /// Returns the drained notifications so the caller can react to them.
    pub fn drain_notifications(&mut self) -> Vec<Notification> {
        let mut drained = Vec::new();
        loop {
            match self.notifications.try_recv() {
                Ok(n) => drained.push(n),
                Err(TryRecvError::Empty) | Err(TryRecvError::Disconnected) => break,
            }
        }

        for notification in &drained {
            if self.sound {
                self.pending_bells = self.pending_bells.saturating_add(bell_count(notification));
            }
            if let Some(text) = self.describe(notification) {
                self.feedback = text;
            }
        }
        drained
    }

    /// Take the queued bell count, leaving none pending
    pub fn take_bells(&mut self) -> u8 {
        std::mem::take(&mut self.pending_bells)
    }

    fn describe(&self, notification: &Notification) -> Option<String> {
        let name = |team: &Team| self.engine.team(*team).name.clone();
        match notification {
            Notification::Point { team } => Some(format!("Point {}", name(team))),
            Notification::SetWin { team, set_index } => {
                Some(format!("Set {} to {}", set_index + 1, name(team)))
            }
            Notification::MatchWin { team } => Some(format!("{} wins the match!", name(team))),
            Notification::Undo => Some("Undone".to_string()),
            Notification::Reset => None,
        }
    }
}
