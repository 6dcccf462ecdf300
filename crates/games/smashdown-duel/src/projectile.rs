use std::time::Duration;

use smashdown_core::Rect;

use crate::combat::{self, AttackKind, MatchEvent};
use crate::config::ms;
use crate::fighter::{ActionCtx, Fighter};
use crate::physics::{Body, integrate_shell};
use crate::variant::Slot;

/// A bouncing shell thrown by a Thrower.
#[derive(Debug, Clone)]
pub struct Shell {
    pub id: u32,
    pub body: Body,
    pub bounces: u8,
    pub owner: Slot,
    last_hit: Option<Duration>,
}

impl Shell {
    pub fn hitbox(&self, size: f32) -> Rect {
        Rect::at(self.body.x, self.body.y, size, size)
    }

    fn armed(&self, now: Duration, rehit: Duration) -> bool {
        self.last_hit
            .is_none_or(|at| now.saturating_sub(at) >= rehit)
    }
}

/// Owns every live shell in the match.
#[derive(Debug, Default)]
pub struct ShellSystem {
    shells: Vec<Shell>,
    next_id: u32,
}

impl ShellSystem {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn shells(&self) -> &[Shell] {
        &self.shells
    }

    /// Launch a shell in front of `owner`, travelling the way it faces.
    pub fn spawn(&mut self, owner: &Fighter, ctx: &mut ActionCtx<'_>) -> u32 {
        let cfg = &ctx.config.shell;
        let id = self.next_id;
        self.next_id = self.next_id.wrapping_add(1);

        let facing = owner.facing();
        let mut body = Body::at(owner.x() + facing * cfg.spawn_offset, 0.0);
        body.vx = facing * cfg.speed;
        self.shells.push(Shell {
            id,
            body,
            bounces: 0,
            owner: owner.slot(),
            last_hit: None,
        });

        tracing::debug!(id, owner = owner.slot().number(), "shell thrown");
        ctx.events.push(MatchEvent::ShellThrown {
            id,
            owner: owner.slot(),
        });
        id
    }

    /// Move every shell, count wall bounces and resolve hits on the
    /// non-owning fighter. A shell that reaches its bounce limit is removed
    /// before it can hit anything that tick.
    pub fn update(&mut self, fighters: &mut [Fighter; 2], ctx: &mut ActionCtx<'_>) {
        let config = ctx.config;
        let cfg = &config.shell;
        let max_x = config.max_shell_x();
        let rehit = ms(cfg.rehit_ms);
        let now = ctx.now();

        self.shells.retain_mut(|shell| {
            if integrate_shell(&mut shell.body, config.gravity, max_x).is_some() {
                shell.bounces = shell.bounces.saturating_add(1);
                if shell.bounces >= cfg.max_bounces {
                    tracing::debug!(id = shell.id, "shell expired");
                    ctx.events.push(MatchEvent::ShellExpired { id: shell.id });
                    return false;
                }
            }

            if !shell.armed(now, rehit) {
                return true;
            }
            let hitbox = shell.hitbox(cfg.size);
            let target = &mut fighters[shell.owner.other().index()];
            if combat::strike(shell.owner, &hitbox, target, AttackKind::Shell, cfg.damage, ctx) {
                shell.body.vx = -shell.body.vx;
                shell.last_hit = Some(now);
            }
            true
        });
    }
}
