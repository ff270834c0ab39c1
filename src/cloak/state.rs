//! Per-actor cloak state machine
//!
//! Two states, derived from a single reveal timer:
//! - Revealed: `remaining_ticks > 0`, counting down toward a cloak
//! - Cloaked: `remaining_ticks == 0`
//!
//! The timer only counts down in `tick`, and only while the actor is healthy
//! enough to cloak. Every other entry point can only raise it.

use std::sync::Arc;

use serde::{Deserialize, Serialize};

use crate::cloak::config::CloakConfig;
use crate::cloak::events::CloakEvent;
use crate::core::error::{CloakError, Result};
use crate::core::types::{ActorId, CellPos, DamageState};

/// What the rest of the simulation knows about the actor this tick
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct UnitStatus {
    pub disabled: bool,
    pub location: CellPos,
}

/// Serializable copy of the mutable cloak state
///
/// The timer is signed so that corrupted saves are caught on restore
/// instead of wrapping.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CloakSnapshot {
    pub remaining_ticks: i64,
    pub can_cloak: bool,
    pub last_position: Option<CellPos>,
}

#[derive(Debug, Clone)]
pub struct Cloak {
    actor: ActorId,
    config: Arc<CloakConfig>,
    remaining_ticks: u32,
    can_cloak: bool,
    last_position: Option<CellPos>,
}

impl Cloak {
    pub fn new(actor: ActorId, config: Arc<CloakConfig>) -> Self {
        let remaining_ticks = config.initial_delay;
        Self {
            actor,
            config,
            remaining_ticks,
            can_cloak: true,
            last_position: None,
        }
    }

    /// Rebuild a cloak from a snapshot
    pub fn restore(actor: ActorId, config: Arc<CloakConfig>, snapshot: &CloakSnapshot) -> Result<Self> {
        if snapshot.remaining_ticks < 0 {
            return Err(CloakError::InvariantViolation(format!(
                "cloak snapshot for {} has negative timer {}",
                actor, snapshot.remaining_ticks
            )));
        }
        let remaining_ticks = u32::try_from(snapshot.remaining_ticks).map_err(|_| {
            CloakError::InvariantViolation(format!(
                "cloak snapshot for {} has out-of-range timer {}",
                actor, snapshot.remaining_ticks
            ))
        })?;

        Ok(Self {
            actor,
            config,
            remaining_ticks,
            can_cloak: snapshot.can_cloak,
            last_position: snapshot.last_position,
        })
    }

    pub fn snapshot(&self) -> CloakSnapshot {
        CloakSnapshot {
            remaining_ticks: self.remaining_ticks as i64,
            can_cloak: self.can_cloak,
            last_position: self.last_position,
        }
    }

    pub fn actor(&self) -> ActorId {
        self.actor
    }

    pub fn config(&self) -> &CloakConfig {
        &self.config
    }

    pub fn shared_config(&self) -> Arc<CloakConfig> {
        Arc::clone(&self.config)
    }

    pub fn remaining_ticks(&self) -> u32 {
        self.remaining_ticks
    }

    pub fn can_cloak(&self) -> bool {
        self.can_cloak
    }

    pub fn last_position(&self) -> Option<CellPos> {
        self.last_position
    }

    pub fn is_cloaked(&self) -> bool {
        self.remaining_ticks == 0
    }

    /// Uncloak for the configured default delay
    pub fn uncloak(&mut self) -> Option<CloakEvent> {
        self.uncloak_for(self.config.cloak_delay)
    }

    /// Keep the actor revealed for at least `duration` more ticks
    ///
    /// Never shortens a reveal already in progress. The uncloak cue fires
    /// whenever the actor was cloaked at call time, even for a zero duration.
    pub fn uncloak_for(&mut self, duration: u32) -> Option<CloakEvent> {
        let was_cloaked = self.is_cloaked();
        self.remaining_ticks = self.remaining_ticks.max(duration);
        tracing::trace!(
            "{} uncloak request {} -> {} ticks",
            self.actor,
            duration,
            self.remaining_ticks
        );

        if was_cloaked {
            Some(CloakEvent::Uncloaked {
                actor: self.actor,
                sound: self.config.uncloak_sound.clone(),
            })
        } else {
            None
        }
    }

    /// The actor fired a weapon
    pub fn on_attack(&mut self) -> Option<CloakEvent> {
        self.uncloak()
    }

    /// Critically damaged actors cannot cloak and are revealed at once
    pub fn on_damage_state_changed(&mut self, state: DamageState) -> Option<CloakEvent> {
        self.can_cloak = state < DamageState::Critical;
        if self.can_cloak {
            None
        } else {
            self.uncloak()
        }
    }

    /// Called every tick the actor stays disabled
    pub fn on_disabled(&mut self) -> Option<CloakEvent> {
        self.uncloak()
    }

    /// Track cell changes when the actor type uncloaks on move
    ///
    /// The first observed position is only recorded as a baseline.
    pub fn on_moved(&mut self, location: CellPos) -> Option<CloakEvent> {
        if !self.config.uncloak_on_move {
            return None;
        }

        match self.last_position {
            None => {
                self.last_position = Some(location);
                None
            }
            Some(last) if last != location => {
                self.last_position = Some(location);
                self.uncloak()
            }
            Some(_) => None,
        }
    }

    /// Advance one simulation tick
    ///
    /// Decay runs first, then the disabled and moved checks. An actor that is
    /// disabled or has moved therefore never stays cloaked past the tick its
    /// timer hit zero, and both cues are emitted in that tick.
    pub fn tick(&mut self, status: UnitStatus) -> Vec<CloakEvent> {
        let mut events = Vec::new();

        if self.remaining_ticks > 0 && self.can_cloak {
            self.remaining_ticks -= 1;
            if self.remaining_ticks == 0 {
                events.push(CloakEvent::Cloaked {
                    actor: self.actor,
                    sound: self.config.cloak_sound.clone(),
                });
            }
        }

        if status.disabled {
            events.extend(self.on_disabled());
        }

        events.extend(self.on_moved(status.location));

        events
    }

    /// Deterministic digest of the lockstep-relevant state
    ///
    /// FNV-1a over the timer and the cloak flag. Independent of process and
    /// platform, unlike the std hasher.
    pub fn sync_hash(&self) -> u64 {
        let mut hash = FNV_OFFSET;
        for byte in self.remaining_ticks.to_le_bytes() {
            hash = fnv_step(hash, byte);
        }
        fnv_step(hash, self.can_cloak as u8)
    }
}

pub(crate) const FNV_OFFSET: u64 = 0xcbf2_9ce4_8422_2325;
const FNV_PRIME: u64 = 0x0000_0100_0000_01b3;

#[inline]
pub(crate) fn fnv_step(hash: u64, byte: u8) -> u64 {
    (hash ^ byte as u64).wrapping_mul(FNV_PRIME)
}
