//! Application state and screen flow

pub mod screen;
pub mod settings;
pub mod state;

pub use screen::{AppCoordinator, Screen, SetupField, SetupForm};
pub use settings::Preferences;
pub use state::App;
