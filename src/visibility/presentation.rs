//! Presentation hints derived from cloak state
//!
//! The renderer and radar decide how to draw; these only say what to draw.

use serde::{Deserialize, Serialize};

use crate::core::types::{Color, FactionId};
use crate::diplomacy::stance::StanceResolver;
use crate::visibility::observer::ObserverContext;
use crate::visibility::resolver::{CloakTarget, VisibilityResolver};

/// Alpha applied to the local player's own cloaked actors on the radar
pub const CLOAKED_RADAR_ALPHA: u8 = 128;

/// How the renderer should treat an actor this frame
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum RenderDirective {
    /// Draw as usual
    Normal,
    /// Draw with the cloak overlay palette
    WithPalette(String),
    /// Skip drawing entirely
    Hidden,
}

/// Radar color for an actor, faded when it is the viewer's own cloaked actor
pub fn radar_color(target: &CloakTarget<'_>, base: Color, viewer: Option<FactionId>) -> Color {
    if viewer == Some(target.owner) && target.cloak.is_cloaked() {
        base.with_alpha(CLOAKED_RADAR_ALPHA)
    } else {
        base.with_alpha(255)
    }
}

/// Render treatment for an actor as seen through `rendered`
pub fn render_directive<S: StanceResolver>(
    resolver: &VisibilityResolver<'_, S>,
    target: &CloakTarget<'_>,
    rendered: &ObserverContext,
) -> RenderDirective {
    if !target.cloak.is_cloaked() {
        return RenderDirective::Normal;
    }

    if resolver.is_visible(target, rendered) {
        RenderDirective::WithPalette(target.cloak.config().palette.clone())
    } else {
        RenderDirective::Hidden
    }
}
