//! Load actor and faction rules from TOML files
//!
//! ```toml
//! [[factions]]
//! id = 1
//! name = "Soviet"
//! color = [200, 40, 40]
//!
//! [actors.submarine.cloak]
//! initial_delay = 10
//! cloak_delay = 30
//!
//! [actors.destroyer.detect_cloaked]
//! range = 5
//! ```

use std::collections::BTreeMap;
use std::path::Path;
use std::sync::Arc;

use serde::Deserialize;

use crate::cloak::config::CloakConfig;
use crate::core::error::{CloakError, Result};
use crate::core::types::{Color, FactionId};
use crate::diplomacy::stance::{Stance, StanceTable};
use crate::rules::actor_rules::{ActorType, DetectCloakedConfig, FactionRules};

#[derive(Debug, Deserialize)]
struct TomlRules {
    #[serde(default)]
    factions: Vec<FactionRules>,
    #[serde(default)]
    actors: BTreeMap<String, TomlActor>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct TomlActor {
    cloak: Option<CloakConfig>,
    detect_cloaked: Option<DetectCloakedConfig>,
}

/// All actor types and factions known to a session
#[derive(Debug, Clone, Default)]
pub struct RulesCatalog {
    actors: BTreeMap<String, ActorType>,
    factions: Vec<FactionRules>,
}

impl RulesCatalog {
    pub fn new() -> Self {
        Self::default()
    }

    /// Load rules from a TOML file
    pub fn load_from_toml(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)?;
        let catalog = Self::parse_toml(&content)?;
        tracing::info!(
            "Loaded {} actor types and {} factions from {}",
            catalog.actors.len(),
            catalog.factions.len(),
            path.display()
        );
        Ok(catalog)
    }

    /// Parse rules from TOML string
    pub fn parse_toml(content: &str) -> Result<Self> {
        let raw: TomlRules = toml::from_str(content)?;

        let mut catalog = Self::new();
        for faction in raw.factions {
            catalog.add_faction(faction)?;
        }
        for (name, actor) in raw.actors {
            if let Some(cloak) = &actor.cloak {
                cloak
                    .validate()
                    .map_err(|e| CloakError::Config(format!("{}: {}", name, e)))?;
            }
            catalog.add_actor(&name, actor.cloak, actor.detect_cloaked)?;
        }
        Ok(catalog)
    }

    /// Register an actor type
    pub fn add_actor(
        &mut self,
        name: &str,
        cloak: Option<CloakConfig>,
        detect_cloaked: Option<DetectCloakedConfig>,
    ) -> Result<()> {
        let detect_range = match detect_cloaked {
            Some(DetectCloakedConfig { range }) if range < 0 => {
                return Err(CloakError::InvariantViolation(format!(
                    "actor type '{}' has negative detection range {}",
                    name, range
                )));
            }
            Some(DetectCloakedConfig { range }) => Some(range as u32),
            None => None,
        };

        self.actors.insert(
            name.to_string(),
            ActorType {
                name: name.to_string(),
                cloak: cloak.map(Arc::new),
                detect_range,
            },
        );
        Ok(())
    }

    /// Register a faction; ids must be unique
    pub fn add_faction(&mut self, faction: FactionRules) -> Result<()> {
        if self.factions.iter().any(|f| f.id == faction.id) {
            return Err(CloakError::Config(format!("duplicate faction id {}", faction.id)));
        }
        self.factions.push(faction);
        Ok(())
    }

    pub fn actor(&self, name: &str) -> Result<&ActorType> {
        self.actors
            .get(name)
            .ok_or_else(|| CloakError::UnknownActorType(name.to_string()))
    }

    pub fn actors(&self) -> impl Iterator<Item = &ActorType> + '_ {
        self.actors.values()
    }

    pub fn factions(&self) -> &[FactionRules] {
        &self.factions
    }

    pub fn faction_color(&self, faction: FactionId) -> Option<Color> {
        self.factions
            .iter()
            .find(|f| f.faction_id() == faction)
            .map(|f| f.base_color())
    }

    /// Stance table built from the declared allies and neutrals
    ///
    /// Pairs not declared either way are enemies.
    pub fn stance_table(&self) -> StanceTable {
        let mut table = StanceTable::new();
        for faction in &self.factions {
            for &ally in &faction.allies {
                table.set(faction.faction_id(), FactionId(ally), Stance::Ally);
            }
            for &neutral in &faction.neutral {
                table.set(faction.faction_id(), FactionId(neutral), Stance::Neutral);
            }
        }
        table
    }
}
