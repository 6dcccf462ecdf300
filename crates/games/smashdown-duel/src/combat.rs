use serde::{Deserialize, Serialize};

use smashdown_core::Rect;

use crate::fighter::{ActionCtx, Fighter};
use crate::variant::Slot;

/// Source of a resolved hit.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum AttackKind {
    Basic,
    Dash,
    /// Dasher landing on the opponent mid-jump.
    Stomp,
    Shell,
}

/// Things collaborators (audio, hit popups, UI) may want to react to.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum MatchEvent {
    Hit {
        attacker: Slot,
        target: Slot,
        kind: AttackKind,
        damage: f32,
        health_after: f32,
    },
    ShellThrown {
        id: u32,
        owner: Slot,
    },
    ShellExpired {
        id: u32,
    },
    MatchOver {
        winner: Slot,
    },
}

/// Resolve `hitbox` against `target` once. On overlap the damage goes through
/// [`Fighter::take_damage`] and a [`MatchEvent::Hit`] is recorded.
pub fn strike(
    attacker: Slot,
    hitbox: &Rect,
    target: &mut Fighter,
    kind: AttackKind,
    damage: f32,
    ctx: &mut ActionCtx<'_>,
) -> bool {
    if !hitbox.overlaps(&target.bounds(ctx.config)) {
        return false;
    }

    target.take_damage(damage, ctx);
    tracing::debug!(
        attacker = attacker.number(),
        target = target.slot().number(),
        ?kind,
        damage,
        health = target.health(),
        "hit landed"
    );
    ctx.events.push(MatchEvent::Hit {
        attacker,
        target: target.slot(),
        kind,
        damage,
        health_after: target.health(),
    });
    true
}
