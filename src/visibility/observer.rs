//! Observer contexts for visibility queries
//!
//! Nothing here is global: whoever asks "can this be seen?" passes the full
//! viewpoint in.

use serde::{Deserialize, Serialize};

use crate::core::types::FactionId;

/// A fog-of-war view that visibility is being evaluated for
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct FogView {
    /// Faction whose fog this is, if any
    pub owner: Option<FactionId>,
    /// This is the view the local client renders
    pub is_local: bool,
    /// Spectator/replay mode: the local view sees everything
    pub observing: bool,
}

impl FogView {
    /// A faction's own fog
    pub fn faction(owner: FactionId) -> Self {
        Self {
            owner: Some(owner),
            is_local: false,
            observing: false,
        }
    }

    /// The locally rendered fog of a playing faction
    pub fn local(owner: FactionId) -> Self {
        Self {
            owner: Some(owner),
            is_local: true,
            observing: false,
        }
    }

    /// The locally rendered fog of a spectator
    pub fn spectator() -> Self {
        Self {
            owner: None,
            is_local: true,
            observing: true,
        }
    }
}

/// Everything a visibility query needs to know about who is looking
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct ObserverContext {
    /// The fog being evaluated; `None` when no fog is involved
    pub view: Option<FogView>,
    /// Faction of the local player, if one is playing
    pub local_player: Option<FactionId>,
}

impl ObserverContext {
    /// Query on behalf of a single faction with no local player
    pub fn for_faction(faction: FactionId) -> Self {
        Self {
            view: Some(FogView::faction(faction)),
            local_player: None,
        }
    }

    /// Query for the local client's own rendered view
    pub fn local(player: FactionId) -> Self {
        Self {
            view: Some(FogView::local(player)),
            local_player: Some(player),
        }
    }

    /// Omniscient spectator view
    pub fn spectator() -> Self {
        Self {
            view: Some(FogView::spectator()),
            local_player: None,
        }
    }

    pub fn with_local_player(mut self, player: FactionId) -> Self {
        self.local_player = Some(player);
        self
    }

    /// Faction the fog belongs to, if resolvable
    pub fn viewer(&self) -> Option<FactionId> {
        self.view.and_then(|v| v.owner)
    }

    pub fn is_omniscient(&self) -> bool {
        self.view.map(|v| v.is_local && v.observing).unwrap_or(false)
    }
}
