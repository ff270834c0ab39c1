//! Per-actor-type cloak configuration
//!
//! Loaded from the `[actors.<type>.cloak]` table of a rules file. Every field
//! is optional in TOML and falls back to the defaults below.

use serde::{Deserialize, Serialize};

/// Ticks before a freshly spawned actor first cloaks
pub const DEFAULT_INITIAL_DELAY: u32 = 10;

/// Ticks a default uncloak keeps the actor revealed
pub const DEFAULT_CLOAK_DELAY: u32 = 30;

pub const DEFAULT_CLOAK_SOUND: &str = "subshow1.aud";
pub const DEFAULT_UNCLOAK_SOUND: &str = "subshow1.aud";
pub const DEFAULT_PALETTE: &str = "cloak";

/// Cloak behavior for one actor type
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct CloakConfig {
    /// Ticks from spawn until the first cloak
    pub initial_delay: u32,
    /// Ticks an uncloak without explicit duration lasts
    pub cloak_delay: u32,
    /// Any change of cell uncloaks the actor
    pub uncloak_on_move: bool,
    /// Cue emitted when the cloak engages
    pub cloak_sound: String,
    /// Cue emitted when a cloaked actor is revealed
    pub uncloak_sound: String,
    /// Palette the presentation layer applies to visible cloaked actors
    pub palette: String,
}

impl Default for CloakConfig {
    fn default() -> Self {
        Self {
            initial_delay: DEFAULT_INITIAL_DELAY,
            cloak_delay: DEFAULT_CLOAK_DELAY,
            uncloak_on_move: false,
            cloak_sound: DEFAULT_CLOAK_SOUND.to_string(),
            uncloak_sound: DEFAULT_UNCLOAK_SOUND.to_string(),
            palette: DEFAULT_PALETTE.to_string(),
        }
    }
}

impl CloakConfig {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_delays(initial_delay: u32, cloak_delay: u32) -> Self {
        Self {
            initial_delay,
            cloak_delay,
            ..Self::default()
        }
    }

    pub fn with_uncloak_on_move(mut self, uncloak_on_move: bool) -> Self {
        self.uncloak_on_move = uncloak_on_move;
        self
    }

    /// Validate configuration for internal consistency
    pub fn validate(&self) -> Result<(), String> {
        if self.palette.is_empty() {
            return Err("cloak palette must not be empty".into());
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_match_constants() {
        let config = CloakConfig::default();
        assert_eq!(config.initial_delay, 10);
        assert_eq!(config.cloak_delay, 30);
        assert!(!config.uncloak_on_move);
        assert_eq!(config.palette, "cloak");
    }

    #[test]
    fn test_partial_toml_fills_defaults() {
        let config: CloakConfig = toml::from_str("cloak_delay = 45\nuncloak_on_move = true")
            .expect("Should parse partial cloak table");
        assert_eq!(config.initial_delay, DEFAULT_INITIAL_DELAY);
        assert_eq!(config.cloak_delay, 45);
        assert!(config.uncloak_on_move);
        assert_eq!(config.cloak_sound, DEFAULT_CLOAK_SOUND);
    }

    #[test]
    fn test_negative_delay_rejected_by_parser() {
        let result: Result<CloakConfig, _> = toml::from_str("initial_delay = -5");
        assert!(result.is_err());
    }

    #[test]
    fn test_empty_palette_invalid() {
        let config = CloakConfig {
            palette: String::new(),
            ..CloakConfig::default()
        };
        assert!(config.validate().is_err());
    }
}
