//! UI rendering using ratatui
//!
//! Two screens:
//! - Setup: team presets, rules and sound
//! - Match: team panels, clock, feedback, with overlays for stats, the
//!   winner, the rename prompt and the reset confirmation

use crate::app::{App, AppCoordinator, Preferences, Screen, SetupField, SetupForm};
use crate::engine::{format_duration, ColorToken, Team};
use crate::stats::{MatchStats, RecordTracker};
use ratatui::{
    prelude::*,
    widgets::{Block, Borders, Clear, List, ListItem, Paragraph, Wrap},
};

/// Render the appropriate screen based on app state
pub fn render(frame: &mut Frame, coordinator: &AppCoordinator) {
    match &coordinator.screen {
        Screen::Setup(form) => render_setup(frame, form, &coordinator.prefs),
        Screen::Match => render_match(frame, &coordinator.app, &coordinator.records),
    }
}

/// Terminal color for a team color token
fn team_color(token: ColorToken) -> Color {
    match token {
        ColorToken::Blue => Color::Blue,
        ColorToken::Red => Color::Red,
        ColorToken::Green => Color::Green,
        ColorToken::Orange => Color::Rgb(255, 140, 0),
        ColorToken::Purple => Color::Magenta,
        ColorToken::Pink => Color::LightMagenta,
        ColorToken::Teal => Color::Cyan,
        ColorToken::Gray => Color::Gray,
    }
}

/// Render the setup screen
fn render_setup(frame: &mut Frame, form: &SetupForm, prefs: &Preferences) {
    let area = frame.area();

    let layout = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(3),  // Header
            Constraint::Min(12),    // Fields
            Constraint::Length(1),  // Error
            Constraint::Length(2),  // Footer
        ])
        .margin(1)
        .split(area);

    let header = Paragraph::new("COURTSIDE · Match Setup")
        .style(Style::default().fg(Color::Yellow).bold())
        .alignment(Alignment::Center)
        .block(Block::default().borders(Borders::BOTTOM));
    frame.render_widget(header, layout[0]);

    let items: Vec<ListItem> = SetupField::all()
        .iter()
        .enumerate()
        .map(|(i, field)| {
            let is_selected = i == form.selected;
            let prefix = if is_selected { "> " } else { "  " };

            if *field == SetupField::Start {
                let style = if is_selected {
                    Style::default().fg(Color::Green).bold()
                } else {
                    Style::default().fg(Color::Green)
                };
                return ListItem::new(format!("{}[ {} ]", prefix, field.label())).style(style);
            }

            let value = match (&form.editing, is_selected) {
                (Some(input), true) => format!("[{}]_", input),
                _ => field.value(prefs),
            };
            let value_style = match field {
                SetupField::TeamAColor | SetupField::TeamAName => {
                    Style::default().fg(team_color(prefs.team_a.color))
                }
                SetupField::TeamBColor | SetupField::TeamBName => {
                    Style::default().fg(team_color(prefs.team_b.color))
                }
                _ => Style::default().fg(Color::White),
            };
            let label_style = if is_selected {
                Style::default().fg(Color::Yellow).bold()
            } else {
                Style::default().fg(Color::DarkGray)
            };

            ListItem::new(Line::from(vec![
                Span::styled(format!("{}{:<18}", prefix, field.label()), label_style),
                Span::styled(value, value_style),
            ]))
        })
        .collect();

    let list = List::new(items).block(
        Block::default()
            .borders(Borders::ALL)
            .border_style(Style::default().fg(Color::DarkGray))
            .title("Settings"),
    );
    frame.render_widget(list, layout[1]);

    if let Some(error) = &form.error {
        let error = Paragraph::new(error.as_str())
            .style(Style::default().fg(Color::Red))
            .alignment(Alignment::Center);
        frame.render_widget(error, layout[2]);
    }

    let footer_text = if form.editing.is_some() {
        "Type name  Enter Save  Esc Cancel"
    } else {
        "↑↓ Navigate  ←→ Change  Enter Select  Esc Quit"
    };
    let footer = Paragraph::new(footer_text)
        .style(Style::default().fg(Color::DarkGray))
        .alignment(Alignment::Center);
    frame.render_widget(footer, layout[3]);
}

/// Render the match screen
fn render_match(frame: &mut Frame, app: &App, records: &RecordTracker) {
    let area = frame.area();

    let layout = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(3), // Header: set info, clock
            Constraint::Min(9),    // Team panels
            Constraint::Length(1), // Feedback
            Constraint::Length(1), // Share text
            Constraint::Length(1), // Footer
        ])
        .split(area);

    render_header(frame, layout[0], app);

    let panels = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([Constraint::Percentage(50), Constraint::Percentage(50)])
        .split(layout[1]);
    render_team_panel(frame, panels[0], app, Team::A);
    render_team_panel(frame, panels[1], app, Team::B);

    let feedback = Paragraph::new(app.feedback.as_str())
        .style(Style::default().fg(Color::Cyan))
        .alignment(Alignment::Center);
    frame.render_widget(feedback, layout[2]);

    if let Some(share) = &app.share {
        let share = Paragraph::new(share.as_str())
            .style(Style::default().fg(Color::White))
            .alignment(Alignment::Center);
        frame.render_widget(share, layout[3]);
    }

    let footer = Paragraph::new(
        "a/b Point  u Undo  Space Clock  n/m Rename  c/v Color  x Share  s Stats  e Report  r Reset  Esc Quit",
    )
    .style(Style::default().fg(Color::DarkGray))
    .alignment(Alignment::Center);
    frame.render_widget(footer, layout[4]);

    // Overlays, most urgent last so it ends up on top
    if app.show_stats {
        render_stats_overlay(frame, area, app, records);
    } else if app.show_report {
        render_report_overlay(frame, area, app);
    } else if app.engine().is_concluded() {
        render_winner_overlay(frame, area, app);
    }
    if let Some(prompt) = &app.rename {
        let title = format!("Rename {}", app.engine().team(prompt.team).name);
        render_prompt(
            frame,
            area,
            &title,
            &format!("[{}]_", prompt.input),
            "Enter Save  Esc Cancel",
        );
    }
    if app.confirm_reset {
        render_prompt(
            frame,
            area,
            "Reset match?",
            "Scores, sets and the clock will be cleared",
            "y Confirm  n Cancel",
        );
    }
}

/// Render the header: title, current set, clock
fn render_header(frame: &mut Frame, area: Rect, app: &App) {
    let engine = app.engine();
    let block = Block::default()
        .borders(Borders::BOTTOM)
        .border_style(Style::default().fg(Color::DarkGray));

    let inner = block.inner(area);
    frame.render_widget(block, area);

    let header_layout = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([
            Constraint::Length(12), // Logo
            Constraint::Min(20),    // Set info
            Constraint::Length(12), // Clock
        ])
        .split(inner);

    let logo = Paragraph::new("COURTSIDE")
        .style(Style::default().fg(Color::Yellow).bold())
        .alignment(Alignment::Left);
    frame.render_widget(logo, header_layout[0]);

    let set_info = if engine.is_concluded() {
        "Final".to_string()
    } else {
        let set_number = engine.current_set_index() + 1;
        let decider = if engine.current_set_index() == engine.config().decider_index() {
            " (tie-break)"
        } else {
            ""
        };
        format!(
            "Set {} of {}{} · to {}",
            set_number,
            engine.config().max_sets(),
            decider,
            engine.current_set_target()
        )
    };
    let set_info = Paragraph::new(set_info)
        .style(Style::default().fg(Color::White).bold())
        .alignment(Alignment::Center);
    frame.render_widget(set_info, header_layout[1]);

    let clock = engine.clock();
    let (indicator, color) = if clock.running {
        ("▶", Color::Green)
    } else {
        ("⏸", Color::DarkGray)
    };
    let clock = Paragraph::new(format!(
        "{} {}",
        indicator,
        format_duration(clock.duration_seconds)
    ))
    .style(Style::default().fg(color).bold())
    .alignment(Alignment::Right);
    frame.render_widget(clock, header_layout[2]);
}

/// Render one team's panel: name, score, set dots, set/match point hint
fn render_team_panel(frame: &mut Frame, area: Rect, app: &App, team: Team) {
    let engine = app.engine();
    let state = engine.team(team);
    let color = team_color(state.color);
    let key = match team {
        Team::A => "a",
        Team::B => "b",
    };

    let block = Block::default()
        .borders(Borders::ALL)
        .border_style(Style::default().fg(color))
        .title(Span::styled(
            format!(" {} [{}] ", state.name, key),
            Style::default().fg(color).bold(),
        ));
    let inner = block.inner(area);
    frame.render_widget(block, area);

    let rows = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Min(1),    // Spacer
            Constraint::Length(1), // Score
            Constraint::Length(1), // Spacer
            Constraint::Length(1), // Set dots
            Constraint::Length(1), // Hint
            Constraint::Min(1),    // Spacer
        ])
        .split(inner);

    let score = Paragraph::new(format!("{}", state.score))
        .style(Style::default().fg(color).bold())
        .alignment(Alignment::Center);
    frame.render_widget(score, rows[1]);

    let sets_to_win = engine.config().sets_to_win;
    let dots: String = (0..sets_to_win)
        .map(|i| if i < state.sets_won { "● " } else { "○ " })
        .collect();
    let dots = Paragraph::new(format!("Sets {}", dots.trim_end()))
        .style(Style::default().fg(Color::White))
        .alignment(Alignment::Center);
    frame.render_widget(dots, rows[3]);

    let hint = if engine.winning_team() == Some(team) {
        Some(("WINNER", Color::Yellow))
    } else if engine.is_match_point(team) {
        Some(("MATCH POINT", Color::Red))
    } else if engine.is_set_point(team) {
        Some(("SET POINT", Color::Yellow))
    } else {
        None
    };
    if let Some((text, hint_color)) = hint {
        let hint = Paragraph::new(text)
            .style(Style::default().fg(hint_color).bold())
            .alignment(Alignment::Center);
        frame.render_widget(hint, rows[4]);
    }
}

/// Render the winner overlay with per-set results
fn render_winner_overlay(frame: &mut Frame, area: Rect, app: &App) {
    let engine = app.engine();
    let Some(winner) = engine.winner() else {
        return;
    };
    let stats = MatchStats::from_history(engine.history());

    let mut lines = vec![
        Line::from(Span::styled(
            format!("{} wins!", winner),
            Style::default().fg(Color::Yellow).bold(),
        )),
        Line::from(format!(
            "Sets {}-{}  ·  Time {}",
            engine.team_a().sets_won,
            engine.team_b().sets_won,
            format_duration(engine.clock().duration_seconds)
        )),
        Line::from(""),
    ];
    for set in &stats.sets {
        let color = team_color(engine.team(set.winner).color);
        lines.push(Line::from(vec![
            Span::raw(format!("Set {}: {}-{}  ", set.number, set.score.a, set.score.b)),
            Span::styled(engine.team(set.winner).name.clone(), Style::default().fg(color)),
        ]));
    }
    lines.push(Line::from(""));
    lines.push(Line::from(Span::styled(
        "u Undo last point  r New match  s Stats  e Report",
        Style::default().fg(Color::DarkGray),
    )));

    let popup = centered_rect(area, 50, lines.len() as u16 + 2);
    frame.render_widget(Clear, popup);
    let body = Paragraph::new(lines).alignment(Alignment::Center).block(
        Block::default()
            .borders(Borders::ALL)
            .border_style(Style::default().fg(Color::Yellow))
            .title("Match Over"),
    );
    frame.render_widget(body, popup);
}

/// Render the stats overlay: this match, then lifetime standings
fn render_stats_overlay(frame: &mut Frame, area: Rect, app: &App, records: &RecordTracker) {
    let engine = app.engine();
    let stats = MatchStats::from_history(engine.history());

    let mut lines = vec![Line::from(Span::styled(
        "This match",
        Style::default().fg(Color::Cyan).bold(),
    ))];
    for team in Team::BOTH {
        lines.push(Line::from(format!(
            "{}: {} pts ({}%), best run {}",
            engine.team(team).name,
            stats.points(team),
            stats.point_share(team),
            stats.longest_run(team)
        )));
    }
    for set in &stats.sets {
        lines.push(Line::from(format!(
            "Set {}: {}-{} {}",
            set.number,
            set.score.a,
            set.score.b,
            engine.team(set.winner).name
        )));
    }

    lines.push(Line::from(""));
    lines.push(Line::from(Span::styled(
        "Lifetime",
        Style::default().fg(Color::Cyan).bold(),
    )));
    if records.is_empty() {
        lines.push(Line::from(Span::styled(
            "No finished matches yet",
            Style::default().fg(Color::DarkGray),
        )));
    } else {
        for record in records.standings().into_iter().take(6) {
            lines.push(Line::from(format!(
                "{}: {}W/{}P ({:.0}%), {} sets",
                record.name,
                record.matches_won,
                record.matches_played,
                record.win_rate() * 100.0,
                record.sets_won
            )));
        }
    }

    let popup = centered_rect(area, 60, lines.len() as u16 + 2);
    frame.render_widget(Clear, popup);
    let body = Paragraph::new(lines).wrap(Wrap { trim: true }).block(
        Block::default()
            .borders(Borders::ALL)
            .border_style(Style::default().fg(Color::Cyan))
            .title("Stats (s to close)"),
    );
    frame.render_widget(body, popup);
}

/// Small centered box with a title, a body line and a key hint
/// Render the full match report
fn render_report_overlay(frame: &mut Frame, area: Rect, app: &App) {
    let report = app.report();
    let lines: Vec<Line> = report.lines().map(|l| Line::from(l.to_string())).collect();

    let popup = centered_rect(area, 70, lines.len() as u16 + 2);
    frame.render_widget(Clear, popup);
    let body = Paragraph::new(lines).block(
        Block::default()
            .borders(Borders::ALL)
            .border_style(Style::default().fg(Color::Cyan))
            .title("Report (e to close)"),
    );
    frame.render_widget(body, popup);
}

fn render_prompt(frame: &mut Frame, area: Rect, title: &str, body: &str, hint: &str) {
    let popup = centered_rect(area, 50, 5);
    frame.render_widget(Clear, popup);
    let lines = vec![
        Line::from(body.to_string()),
        Line::from(""),
        Line::from(Span::styled(hint.to_string(), Style::default().fg(Color::DarkGray))),
    ];
    let prompt = Paragraph::new(lines).alignment(Alignment::Center).block(
        Block::default()
            .borders(Borders::ALL)
            .border_style(Style::default().fg(Color::Yellow))
            .title(title.to_string()),
    );
    frame.render_widget(prompt, popup);
}

/// A rect `percent_x` wide and `height` tall, centered in `area`
fn centered_rect(area: Rect, percent_x: u16, height: u16) -> Rect {
    let height = height.min(area.height);
    let vertical = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Fill(1),
            Constraint::Length(height),
            Constraint::Fill(1),
        ])
        .split(area);
    let horizontal = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([
            Constraint::Percentage((100 - percent_x) / 2),
            Constraint::Percentage(percent_x),
            Constraint::Percentage((100 - percent_x) / 2),
        ])
        .split(vertical[1]);
    horizontal[1]
}
