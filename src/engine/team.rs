//! The two sides of a match

use serde::{Deserialize, Serialize};

/// Default name for the first team
pub const DEFAULT_TEAM_A_NAME: &str = "Home";

/// Default name for the second team
pub const DEFAULT_TEAM_B_NAME: &str = "Guest";

/// Side identifier
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Team {
    A,
    B,
}

impl Team {
    pub const BOTH: [Team; 2] = [Team::A, Team::B];

    /// The opposing side
    pub fn other(&self) -> Team {
        match self {
            Team::A => Team::B,
            Team::B => Team::A,
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            Team::A => "A",
            Team::B => "B",
        }
    }
}

/// Presentation color for a team.
///
/// The engine only stores and hands back the token; what it looks like is up
/// to the front end.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ColorToken {
    Blue,
    Red,
    Green,
    Orange,
    Purple,
    Pink,
    Teal,
    Gray,
}

impl ColorToken {
    /// Every token in palette order
    pub fn all() -> &'static [ColorToken] {
        &[
            ColorToken::Blue,
            ColorToken::Red,
            ColorToken::Green,
            ColorToken::Orange,
            ColorToken::Purple,
            ColorToken::Pink,
            ColorToken::Teal,
            ColorToken::Gray,
        ]
    }

    pub fn label(&self) -> &'static str {
        match self {
            ColorToken::Blue => "Blue",
            ColorToken::Red => "Red",
            ColorToken::Green => "Green",
            ColorToken::Orange => "Orange",
            ColorToken::Purple => "Purple",
            ColorToken::Pink => "Pink",
            ColorToken::Teal => "Teal",
            ColorToken::Gray => "Gray",
        }
    }

    /// Next token in the palette, wrapping around
    pub fn next(&self) -> ColorToken {
        let all = Self::all();
        let idx = all.iter().position(|c| c == self).unwrap_or(0);
        all[(idx + 1) % all.len()]
    }

    /// Previous token in the palette, wrapping around
    pub fn prev(&self) -> ColorToken {
        let all = Self::all();
        let idx = all.iter().position(|c| c == self).unwrap_or(0);
        all[(idx + all.len() - 1) % all.len()]
    }
}

/// One side's live state
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TeamState {
    /// Display name
    pub name: String,
    /// Display color
    pub color: ColorToken,
    /// Points in the current set
    pub score: u32,
    /// Sets won so far this match
    pub sets_won: u32,
}

impl TeamState {
    /// A fresh team with no points or sets
    pub fn new(name: impl Into<String>, color: ColorToken) -> Self {
        TeamState {
            name: name.into(),
            color,
            score: 0,
            sets_won: 0,
        }
    }

    /// Default state for a side ("Home" in blue, "Guest" in red)
    pub fn default_for(team: Team) -> Self {
        match team {
            Team::A => TeamState::new(DEFAULT_TEAM_A_NAME, ColorToken::Blue),
            Team::B => TeamState::new(DEFAULT_TEAM_B_NAME, ColorToken::Red),
        }
    }
}

/// Trim a proposed team name, rejecting blank ones
pub fn normalize_name(name: &str) -> Option<String> {
    let trimmed = name.trim();
    if trimmed.is_empty() {
        None
    } else {
        Some(trimmed.to_string())
    }
}

/// Whether two team names would be read as the same team
pub fn same_name(a: &str, b: &str) -> bool {
    a.trim().to_lowercase() == b.trim().to_lowercase()
}
