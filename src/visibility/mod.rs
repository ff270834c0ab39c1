//! Visibility - who can see a cloaked actor, and how it is presented

pub mod observer;
pub mod presentation;
pub mod resolver;

pub use observer::{FogView, ObserverContext};
pub use presentation::{radar_color, render_directive, RenderDirective, CLOAKED_RADAR_ALPHA};
pub use resolver::{CloakTarget, VisibilityResolver};
