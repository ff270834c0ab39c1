//! Cue events emitted by cloak state changes
//!
//! The subsystem never plays sounds itself. Callers drain these and hand
//! them to whatever audio layer they use.

use std::collections::VecDeque;

use serde::{Deserialize, Serialize};

use crate::core::types::{ActorId, Tick};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum CloakEvent {
    /// The reveal timer reached zero
    Cloaked { actor: ActorId, sound: String },
    /// A cloaked actor was revealed
    Uncloaked { actor: ActorId, sound: String },
}

impl CloakEvent {
    pub fn actor(&self) -> ActorId {
        match self {
            CloakEvent::Cloaked { actor, .. } | CloakEvent::Uncloaked { actor, .. } => *actor,
        }
    }

    pub fn sound(&self) -> &str {
        match self {
            CloakEvent::Cloaked { sound, .. } | CloakEvent::Uncloaked { sound, .. } => sound,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LoggedCloakEvent {
    pub tick: Tick,
    pub event: CloakEvent,
}

/// Bounded log of cue events, oldest dropped first
#[derive(Debug, Clone)]
pub struct CloakEventLog {
    events: VecDeque<LoggedCloakEvent>,
    capacity: usize,
}

impl CloakEventLog {
    pub fn new(capacity: usize) -> Self {
        Self {
            events: VecDeque::new(),
            capacity: capacity.max(1),
        }
    }

    pub fn push(&mut self, event: CloakEvent, tick: Tick) {
        if self.events.len() == self.capacity {
            self.events.pop_front();
        }
        self.events.push_back(LoggedCloakEvent { tick, event });
    }

    pub fn extend(&mut self, events: impl IntoIterator<Item = CloakEvent>, tick: Tick) {
        for event in events {
            self.push(event, tick);
        }
    }

    pub fn iter(&self) -> impl Iterator<Item = &LoggedCloakEvent> + '_ {
        self.events.iter()
    }

    /// Remove and return everything logged so far
    pub fn drain(&mut self) -> Vec<LoggedCloakEvent> {
        self.events.drain(..).collect()
    }

    pub fn len(&self) -> usize {
        self.events.len()
    }

    pub fn is_empty(&self) -> bool {
        self.events.is_empty()
    }
}
