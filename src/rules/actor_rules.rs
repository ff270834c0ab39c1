//! Validated per-actor-type and per-faction rules

use std::sync::Arc;

use serde::{Deserialize, Serialize};

use crate::cloak::config::CloakConfig;
use crate::core::types::{Color, FactionId};

/// Raw `[actors.<type>.detect_cloaked]` table
///
/// Range is signed in rules files; negative values are rejected when the
/// catalog is built.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct DetectCloakedConfig {
    pub range: i32,
}

/// One actor type after validation
#[derive(Debug, Clone)]
pub struct ActorType {
    pub name: String,
    /// Shared by every actor of this type
    pub cloak: Option<Arc<CloakConfig>>,
    /// Detection range in cells, if the type detects cloaked actors
    pub detect_range: Option<u32>,
}

impl ActorType {
    pub fn is_cloakable(&self) -> bool {
        self.cloak.is_some()
    }

    pub fn is_detector(&self) -> bool {
        self.detect_range.is_some()
    }
}

/// A faction declared in the rules file
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FactionRules {
    pub id: u32,
    pub name: String,
    /// Base radar color (RGB)
    pub color: [u8; 3],
    /// Factions this one regards as allies (one direction)
    #[serde(default)]
    pub allies: Vec<u32>,
    /// Factions this one regards as neutral (one direction)
    #[serde(default)]
    pub neutral: Vec<u32>,
}

impl FactionRules {
    pub fn faction_id(&self) -> FactionId {
        FactionId(self.id)
    }

    pub fn base_color(&self) -> Color {
        let [r, g, b] = self.color;
        Color::rgb(r, g, b)
    }
}
