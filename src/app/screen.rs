//! Application screen state management
//!
//! Handles transitions between the two screens:
//! - Setup: team presets, rules and sound, then start
//! - Match: live scoring
//!
//! One engine lives for the whole session. Setup edits are applied to it
//! while it is in its not-started state, and a confirmed reset returns here.

use crate::engine::{same_name, MatchSnapshot, Notification, ScoreEngine, Team};
use crate::stats::RecordTracker;
use crate::storage::Storage;
use tracing::{info, warn};

use super::settings::Preferences;
use super::state::{App, MAX_NAME_LEN};

/// Editable row on the setup screen
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SetupField {
    TeamAName,
    TeamAColor,
    TeamBName,
    TeamBColor,
    PointsPerSet,
    LastSetPoints,
    SetsToWin,
    WinByTwo,
    Sound,
    Start,
}

impl SetupField {
    /// Get all fields in display order
    pub fn all() -> &'static [SetupField] {
        &[
            SetupField::TeamAName,
            SetupField::TeamAColor,
            SetupField::TeamBName,
            SetupField::TeamBColor,
            SetupField::PointsPerSet,
            SetupField::LastSetPoints,
            SetupField::SetsToWin,
            SetupField::WinByTwo,
            SetupField::Sound,
            SetupField::Start,
        ]
    }

    pub fn label(&self) -> &'static str {
        match self {
            SetupField::TeamAName => "Team A",
            SetupField::TeamAColor => "Team A color",
            SetupField::TeamBName => "Team B",
            SetupField::TeamBColor => "Team B color",
            SetupField::PointsPerSet => "Points per set",
            SetupField::LastSetPoints => "Tie-break points",
            SetupField::SetsToWin => "Sets to win",
            SetupField::WinByTwo => "Win by two",
            SetupField::Sound => "Sound",
            SetupField::Start => "Start match",
        }
    }

    /// Current value as shown on the setup screen
    pub fn value(&self, prefs: &Preferences) -> String {
        let on_off = |b: bool| (if b { "On" } else { "Off" }).to_string();
        match self {
            SetupField::TeamAName => prefs.team_a.name.clone(),
            SetupField::TeamAColor => prefs.team_a.color.label().to_string(),
            SetupField::TeamBName => prefs.team_b.name.clone(),
            SetupField::TeamBColor => prefs.team_b.color.label().to_string(),
            SetupField::PointsPerSet => prefs.config.points_per_set.to_string(),
            SetupField::LastSetPoints => prefs.config.last_set_points.to_string(),
            SetupField::SetsToWin => format!(
                "{} (best of {})",
                prefs.config.sets_to_win,
                prefs.config.max_sets()
            ),
            SetupField::WinByTwo => on_off(prefs.config.win_by_two),
            SetupField::Sound => on_off(prefs.sound),
            SetupField::Start => String::new(),
        }
    }

    fn name_team(&self) -> Option<Team> {
        match self {
            SetupField::TeamAName => Some(Team::A),
            SetupField::TeamBName => Some(Team::B),
            _ => None,
        }
    }
}

/// Setup screen state
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SetupForm {
    /// Index into [`SetupField::all`]
    pub selected: usize,
    /// Name being typed, while a name field is in edit mode
    pub editing: Option<String>,
    /// Last validation error
    pub error: Option<String>,
}

impl SetupForm {
    pub fn field(&self) -> SetupField {
        let fields = SetupField::all();
        fields[self.selected.min(fields.len() - 1)]
    }
}

/// The current application screen
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Screen {
    Setup(SetupForm),
    Match,
}

/// Main application coordinator
pub struct AppCoordinator {
    /// Current screen
    pub screen: Screen,
    /// Match screen state; its engine is idle while on setup
    pub app: App,
    /// Settings being edited, and used for the next match
    pub prefs: Preferences,
    /// Lifetime records built from the archive
    pub records: RecordTracker,
    storage: Storage,
    /// Archive row and snapshot of the match won this session, until the
    /// win is undone or a new match starts
    archived: Option<(i64, MatchSnapshot)>,
    /// Whether the application should quit
    pub should_quit: bool,
}

impl AppCoordinator {
    /// Create a coordinator starting at the setup screen.
    ///
    /// Saved preferences and the match archive are loaded from `storage`;
    /// failures fall back to defaults and an empty record book.
    pub fn new(storage: Storage) -> Self {
        let prefs = match storage.load_preferences() {
            Ok(Some(prefs)) => prefs,
            Ok(None) => Preferences::default(),
            Err(e) => {
                warn!(error = %e, "could not load preferences, using defaults");
                Preferences::default()
            }
        };

        let records = match storage.archived_matches() {
            Ok(matches) => RecordTracker::from_matches(matches.iter().map(|m| &m.snapshot)),
            Err(e) => {
                warn!(error = %e, "could not read match archive");
                RecordTracker::new()
            }
        };

        let engine = ScoreEngine::with_teams(
            prefs.config,
            prefs.team_a.to_state(),
            prefs.team_b.to_state(),
        );
        let mut app = App::new(engine, prefs.sound);
        app.drain_notifications();

        Self {
            screen: Screen::Setup(SetupForm::default()),
            app,
            prefs,
            records,
            storage,
            archived: None,
            should_quit: false,
        }
    }

    /// Quit the application
    pub fn quit(&mut self) {
        self.should_quit = true;
    }

    #[cfg(test)]
    pub fn storage(&self) -> &Storage {
        &self.storage
    }

    /// Whether a setup name field is in edit mode
    pub fn is_editing_name(&self) -> bool {
        matches!(&self.screen, Screen::Setup(form) if form.editing.is_some())
    }

    // ---- setup screen ----

    pub fn setup_up(&mut self) {
        if let Screen::Setup(form) = &mut self.screen {
            if form.editing.is_none() && form.selected > 0 {
                form.selected -= 1;
            }
        }
    }

    pub fn setup_down(&mut self) {
        if let Screen::Setup(form) = &mut self.screen {
            if form.editing.is_none() && form.selected < SetupField::all().len() - 1 {
                form.selected += 1;
            }
        }
    }

    /// Change the selected value (Left/Right)
    pub fn setup_adjust(&mut self, forward: bool) {
        let Screen::Setup(form) = &mut self.screen else {
            return;
        };
        if form.editing.is_some() {
            return;
        }
        form.error = None;

        let delta = if forward { 1 } else { -1 };
        let prefs = &mut self.prefs;
        match form.field() {
            SetupField::TeamAColor | SetupField::TeamBColor => {
                let team = if form.field() == SetupField::TeamAColor {
                    Team::A
                } else {
                    Team::B
                };
                let preset = prefs.team_mut(team);
                preset.color = if forward {
                    preset.color.next()
                } else {
                    preset.color.prev()
                };
            }
            SetupField::PointsPerSet => prefs.adjust_points_per_set(delta),
            SetupField::LastSetPoints => prefs.adjust_last_set_points(delta),
            SetupField::SetsToWin => prefs.cycle_sets_to_win(forward),
            SetupField::WinByTwo => prefs.config.win_by_two = !prefs.config.win_by_two,
            SetupField::Sound => prefs.sound = !prefs.sound,
            SetupField::TeamAName | SetupField::TeamBName | SetupField::Start => {}
        }
    }

    /// Activate the selected row (Enter)
    pub fn setup_select(&mut self) {
        let Screen::Setup(form) = &mut self.screen else {
            return;
        };
        let field = form.field();

        if let Some(team) = field.name_team() {
            match form.editing.take() {
                Some(input) => {
                    if !self.prefs.rename(team, &input) {
                        form.error = Some("Team name can't be blank".to_string());
                    }
                }
                None => {
                    form.error = None;
                    form.editing = Some(self.prefs.team(team).name.clone());
                }
            }
            return;
        }

        match field {
            SetupField::Start => self.start_match(),
            SetupField::WinByTwo | SetupField::Sound => self.setup_adjust(true),
            _ => {}
        }
    }

    pub fn setup_char(&mut self, c: char) {
        if let Screen::Setup(SetupForm {
            editing: Some(input),
            ..
        }) = &mut self.screen
        {
            if input.chars().count() < MAX_NAME_LEN {
                input.push(c);
            }
        }
    }

    pub fn setup_backspace(&mut self) {
        if let Screen::Setup(SetupForm {
            editing: Some(input),
            ..
        }) = &mut self.screen
        {
            input.pop();
        }
    }

    /// Leave name editing without applying it
    pub fn setup_cancel_edit(&mut self) {
        if let Screen::Setup(form) = &mut self.screen {
            form.editing = None;
        }
    }

    /// Apply the preferences to the engine and start a match.
    ///
    /// Preferences are saved first; a save failure is logged and play goes on.
    pub fn start_match(&mut self) {
        let error = if let Err(e) = self.prefs.config.validate() {
            Some(e.to_string())
        } else if same_name(&self.prefs.team_a.name, &self.prefs.team_b.name) {
            Some("Team names must differ".to_string())
        } else {
            None
        };
        if let Some(error) = error {
            if let Screen::Setup(form) = &mut self.screen {
                form.error = Some(error);
            }
            return;
        }

        if let Err(e) = self.storage.save_preferences(&self.prefs) {
            warn!(error = %e, "could not save preferences");
        }

        let engine = self.app.engine_mut();
        engine.reconfigure(self.prefs.config);
        for team in Team::BOTH {
            let preset = self.prefs.team(team);
            engine.rename_team(team, &preset.name);
            engine.set_team_color(team, preset.color);
        }
        engine.start_match();

        self.app.sound = self.prefs.sound;
        self.app.feedback.clear();
        self.app.drain_notifications();
        self.app.take_bells();
        self.archived = None;
        self.screen = Screen::Match;
    }

    // ---- match screen ----

    /// Handle engine notifications: archive finished matches, withdraw them
    /// again when the winning point is undone, and go back to setup after a
    /// confirmed reset.
    ///
    /// A match keeps at most one archive row however often its last point is
    /// undone and replayed.
    pub fn process_notifications(&mut self) {
        for notification in self.app.drain_notifications() {
            match notification {
                Notification::MatchWin { .. } => {
                    self.withdraw_archived();
                    self.archive_current();
                }
                Notification::Undo if !self.app.engine().is_concluded() => {
                    self.withdraw_archived()
                }
                Notification::Reset if !self.app.engine().is_started() => self.return_to_setup(),
                _ => {}
            }
        }
    }

    fn archive_current(&mut self) {
        let snapshot = self.app.engine().snapshot();
        match self.storage.archive_match(&snapshot) {
            Ok(id) => {
                info!(id, winner = ?snapshot.winner, "match archived");
                self.records.process_match(&snapshot);
                self.archived = Some((id, snapshot));
            }
            Err(e) => warn!(error = %e, "could not archive match"),
        }
    }

    /// Drop this session's archived match from storage and the records
    fn withdraw_archived(&mut self) {
        let Some((id, snapshot)) = self.archived.take() else {
            return;
        };
        match self.storage.delete_match(id) {
            Ok(_) => info!(id, "archived match withdrawn"),
            Err(e) => warn!(id, error = %e, "could not withdraw archived match"),
        }
        self.records.retract_match(&snapshot);
    }

    /// Keep in-match renames and colors for the next match, then show setup
    fn return_to_setup(&mut self) {
        for team in Team::BOTH {
            let state = self.app.engine().team(team);
            let preset = self.prefs.team_mut(team);
            preset.name = state.name.clone();
            preset.color = state.color;
        }
        self.archived = None;
        self.screen = Screen::Setup(SetupForm::default());
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::engine::{ColorToken, MatchConfig};
    use std::time::{Duration, Instant};

    fn coordinator() -> AppCoordinator {
        AppCoordinator::new(Storage::open_in_memory().unwrap())
    }

    fn select(coord: &mut AppCoordinator, field: SetupField) {
        let idx = SetupField::all().iter().position(|f| *f == field).unwrap();
        if let Screen::Setup(form) = &mut coord.screen {
            form.selected = idx;
        }
    }

    fn form(coord: &AppCoordinator) -> &SetupForm {
        match &coord.screen {
            Screen::Setup(form) => form,
            Screen::Match => panic!("expected setup screen"),
        }
    }

    fn tiny_prefs(coord: &mut AppCoordinator) {
        coord.prefs.config = MatchConfig {
            points_per_set: 5,
            last_set_points: 5,
            sets_to_win: 1,
            win_by_two: false,
        };
    }

    fn score(coord: &mut AppCoordinator, team: Team, n: u32, now: &mut Instant) {
        for _ in 0..n {
            *now += Duration::from_millis(200);
            coord.app.on_point(team, *now);
            coord.process_notifications();
        }
    }

    #[test]
    fn test_starts_on_setup_with_defaults() {
        let coord = coordinator();
        assert_eq!(coord.screen, Screen::Setup(SetupForm::default()));
        assert_eq!(coord.prefs, Preferences::default());
        assert!(!coord.app.engine().is_started());
    }

    #[test]
    fn test_setup_navigation_bounds() {
        let mut coord = coordinator();
        coord.setup_up();
        assert_eq!(form(&coord).selected, 0);
        for _ in 0..20 {
            coord.setup_down();
        }
        assert_eq!(form(&coord).field(), SetupField::Start);
    }

    #[test]
    fn test_setup_adjusts_values() {
        let mut coord = coordinator();
        select(&mut coord, SetupField::PointsPerSet);
        coord.setup_adjust(false);
        assert_eq!(coord.prefs.config.points_per_set, 24);

        select(&mut coord, SetupField::TeamBColor);
        coord.setup_adjust(true);
        assert_eq!(coord.prefs.team_b.color, ColorToken::Green);

        select(&mut coord, SetupField::WinByTwo);
        coord.setup_select();
        assert!(!coord.prefs.config.win_by_two);

        select(&mut coord, SetupField::SetsToWin);
        coord.setup_adjust(true);
        assert_eq!(SetupField::SetsToWin.value(&coord.prefs), "3 (best of 5)");
    }

    #[test]
    fn test_setup_name_editing() {
        let mut coord = coordinator();
        select(&mut coord, SetupField::TeamAName);
        coord.setup_select();
        assert!(coord.is_editing_name());

        // Navigation is locked while typing
        coord.setup_down();
        assert_eq!(form(&coord).field(), SetupField::TeamAName);

        for _ in 0..4 {
            coord.setup_backspace();
        }
        for c in "Aces".chars() {
            coord.setup_char(c);
        }
        coord.setup_select();
        assert!(!coord.is_editing_name());
        assert_eq!(coord.prefs.team_a.name, "Aces");
    }

    #[test]
    fn test_setup_blank_name_is_rejected() {
        let mut coord = coordinator();
        select(&mut coord, SetupField::TeamBName);
        coord.setup_select();
        for _ in 0..10 {
            coord.setup_backspace();
        }
        coord.setup_select();
        assert_eq!(coord.prefs.team_b.name, "Guest");
        assert!(form(&coord).error.is_some());
    }

    #[test]
    fn test_start_match_applies_prefs() {
        let mut coord = coordinator();
        coord.prefs.team_a.name = "Aces".to_string();
        coord.prefs.team_b.color = ColorToken::Purple;
        coord.prefs.config.points_per_set = 21;

        coord.start_match();
        assert_eq!(coord.screen, Screen::Match);
        let engine = coord.app.engine();
        assert!(engine.is_started());
        assert_eq!(engine.team_a().name, "Aces");
        assert_eq!(engine.team_b().color, ColorToken::Purple);
        assert_eq!(engine.current_set_target(), 21);

        // Preferences were saved
        let saved = coord.storage().load_preferences().unwrap().unwrap();
        assert_eq!(saved.team_a.name, "Aces");
    }

    #[test]
    fn test_start_match_rejects_invalid_config() {
        let mut coord = coordinator();
        coord.prefs.config.points_per_set = 0;
        coord.start_match();
        assert!(form(&coord).error.is_some());
        assert!(!coord.app.engine().is_started());
    }

    #[test]
    fn test_match_win_is_archived() {
        let mut coord = coordinator();
        tiny_prefs(&mut coord);
        coord.start_match();

        let mut now = Instant::now();
        score(&mut coord, Team::A, 5, &mut now);
        assert!(coord.app.engine().is_concluded());
        assert_eq!(coord.storage().match_count().unwrap(), 1);

        let home = coord.records.get("Home").unwrap();
        assert_eq!(home.matches_won, 1);
        assert_eq!(home.points_won, 5);
    }

    #[test]
    fn test_undone_win_is_replaced_by_the_new_result() {
        let mut coord = coordinator();
        tiny_prefs(&mut coord);
        coord.start_match();

        let mut now = Instant::now();
        score(&mut coord, Team::A, 4, &mut now);
        score(&mut coord, Team::B, 4, &mut now);
        score(&mut coord, Team::A, 1, &mut now);
        assert_eq!(coord.storage().match_count().unwrap(), 1);

        coord.app.on_undo();
        coord.process_notifications();
        assert_eq!(coord.storage().match_count().unwrap(), 0);
        assert!(coord.records.is_empty());

        score(&mut coord, Team::B, 1, &mut now);
        let archived = coord.storage().archived_matches().unwrap();
        assert_eq!(archived.len(), 1);
        assert_eq!(archived[0].snapshot.winner.as_deref(), Some("Guest"));

        let home = coord.records.get("Home").unwrap();
        assert_eq!((home.matches_played, home.matches_won), (1, 0));
        let guest = coord.records.get("Guest").unwrap();
        assert_eq!((guest.matches_played, guest.matches_won), (1, 1));
        assert_eq!(guest.points_won, 5);
    }

    #[test]
    fn test_undo_before_the_win_keeps_the_archive() {
        let mut coord = coordinator();
        tiny_prefs(&mut coord);
        coord.start_match();

        let mut now = Instant::now();
        score(&mut coord, Team::A, 5, &mut now);
        coord.app.request_reset();
        coord.app.confirm_reset();
        coord.process_notifications();

        coord.start_match();
        score(&mut coord, Team::B, 2, &mut now);
        coord.app.on_undo();
        coord.process_notifications();
        assert_eq!(coord.storage().match_count().unwrap(), 1);
        assert_eq!(coord.records.get("Home").unwrap().matches_won, 1);
    }

    #[test]
    fn test_start_match_rejects_duplicate_names() {
        let mut coord = coordinator();
        coord.prefs.team_b.name = "home ".to_string();
        coord.start_match();
        assert_eq!(form(&coord).error.as_deref(), Some("Team names must differ"));
        assert!(!coord.app.engine().is_started());
    }

    #[test]
    fn test_reset_returns_to_setup_keeping_names() {
        let mut coord = coordinator();
        coord.start_match();
        coord.app.engine_mut().rename_team(Team::B, "Diggers");
        coord.app.cycle_color(Team::A);

        coord.app.request_reset();
        coord.app.confirm_reset();
        coord.process_notifications();

        assert!(matches!(coord.screen, Screen::Setup(_)));
        assert_eq!(coord.prefs.team_b.name, "Diggers");
        assert_eq!(coord.prefs.team_a.color, ColorToken::Red);
        assert!(!coord.app.engine().is_started());
    }

    #[test]
    fn test_reconfigure_between_matches() {
        let mut coord = coordinator();
        coord.start_match();
        coord.app.request_reset();
        coord.app.confirm_reset();
        coord.process_notifications();

        coord.prefs.config.sets_to_win = 3;
        coord.prefs.config.points_per_set = 11;
        coord.start_match();
        assert_eq!(coord.app.engine().config().sets_to_win, 3);
        assert_eq!(coord.app.engine().current_set_target(), 11);
    }

    #[test]
    fn test_loads_saved_prefs_and_records() {
        let storage = Storage::open_in_memory().unwrap();
        let mut prefs = Preferences::default();
        prefs.team_a.name = "Saved".to_string();
        prefs.sound = false;
        storage.save_preferences(&prefs).unwrap();

        let coord = AppCoordinator::new(storage);
        assert_eq!(coord.prefs.team_a.name, "Saved");
        assert!(!coord.app.sound);
        assert_eq!(coord.app.engine().team_a().name, "Saved");
        assert!(coord.records.is_empty());
    }
}
