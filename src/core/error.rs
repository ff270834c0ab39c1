use thiserror::Error;

use crate::core::types::ActorId;

#[derive(Error, Debug)]
pub enum CloakError {
    /// Corrupted or impossible data reached the subsystem. Always a bug upstream.
    #[error("Invariant violation: {0}")]
    InvariantViolation(String),

    #[error("Actor not found: {0}")]
    UnknownActor(ActorId),

    #[error("Unknown actor type: {0}")]
    UnknownActorType(String),

    #[error("Actor has no cloak: {0}")]
    NotCloakable(ActorId),

    #[error("Config error: {0}")]
    Config(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("TOML error: {0}")]
    Toml(#[from] toml::de::Error),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

pub type Result<T> = std::result::Result<T, CloakError>;
