use std::time::Duration;

use serde::{Deserialize, Serialize};

use smashdown_core::{Cooldowns, Rect, Scheduler, TimerHandle};

use crate::combat::{self, AttackKind, MatchEvent};
use crate::config::{DuelConfig, ms};
use crate::physics::{Body, integrate_fighter};
use crate::projectile::ShellSystem;
use crate::variant::{Slot, Variant};

/// Maximum health, also the starting value.
pub const MAX_HEALTH: f32 = 100.0;

/// Below this horizontal speed a fighter counts as standing still.
const STILL_SPEED: f32 = 0.1;

/// The single active state of a fighter.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum FighterState {
    Idle,
    Walking,
    Jumping,
    BasicAttacking,
    SpecialAttacking,
    Hit,
    Win,
    Fail,
}

impl FighterState {
    pub fn is_terminal(self) -> bool {
        matches!(self, Self::Win | Self::Fail)
    }
}

/// Abilities tracked by a fighter's cooldowns.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Ability {
    Basic,
    Special,
    Stomp,
}

/// Deferred work scheduled on the match clock.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TimedEvent {
    EndBasic(Slot),
    EndSpecial(Slot),
    EndHit(Slot),
    StopRecoil(Slot),
    /// AI follow-up special queued after a jump.
    AiSpecial(Slot),
}

impl TimedEvent {
    /// The fighter this event belongs to.
    pub fn slot(self) -> Slot {
        match self {
            Self::EndBasic(slot)
            | Self::EndSpecial(slot)
            | Self::EndHit(slot)
            | Self::StopRecoil(slot)
            | Self::AiSpecial(slot) => slot,
        }
    }
}

/// Everything a fighter action may touch besides the two fighters.
pub struct ActionCtx<'a> {
    pub scheduler: &'a mut Scheduler<TimedEvent>,
    pub config: &'a DuelConfig,
    pub events: &'a mut Vec<MatchEvent>,
}

impl<'a> ActionCtx<'a> {
    pub fn new(
        scheduler: &'a mut Scheduler<TimedEvent>,
        config: &'a DuelConfig,
        events: &'a mut Vec<MatchEvent>,
    ) -> Self {
        Self {
            scheduler,
            config,
            events,
        }
    }

    pub fn now(&self) -> Duration {
        self.scheduler.now()
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
struct DashRun {
    target: Slot,
    origin_x: f32,
}

/// One combatant and its state machine.
#[derive(Debug, Clone)]
pub struct Fighter {
    slot: Slot,
    variant: Variant,
    body: Body,
    airborne: bool,
    health: f32,
    /// +1 facing right, -1 facing left.
    facing: f32,
    state: FighterState,
    ai_controlled: bool,
    cooldowns: Cooldowns<Ability>,
    state_timer: Option<TimerHandle>,
    air_dash_ready: bool,
    dash: Option<DashRun>,
    /// Basic-attack hitbox and the time it stops being reported.
    active_hitbox: Option<(Rect, Duration)>,
}

impl Fighter {
    pub fn new(slot: Slot, variant: Variant, x: f32, ai_controlled: bool) -> Self {
        Self {
            slot,
            variant,
            body: Body::at(x, 0.0),
            airborne: false,
            health: MAX_HEALTH,
            facing: 1.0,
            state: FighterState::Idle,
            ai_controlled,
            cooldowns: Cooldowns::new(),
            state_timer: None,
            air_dash_ready: true,
            dash: None,
            active_hitbox: None,
        }
    }

    pub fn slot(&self) -> Slot {
        self.slot
    }

    pub fn variant(&self) -> Variant {
        self.variant
    }

    pub fn body(&self) -> &Body {
        &self.body
    }

    pub fn x(&self) -> f32 {
        self.body.x
    }

    pub fn y(&self) -> f32 {
        self.body.y
    }

    pub fn health(&self) -> f32 {
        self.health
    }

    pub fn facing(&self) -> f32 {
        self.facing
    }

    pub fn state(&self) -> FighterState {
        self.state
    }

    pub fn is_airborne(&self) -> bool {
        self.airborne
    }

    pub fn is_ai(&self) -> bool {
        self.ai_controlled
    }

    /// Mid dash strike.
    pub fn is_dashing(&self) -> bool {
        self.state == FighterState::SpecialAttacking && self.dash.is_some()
    }

    pub fn air_dash_ready(&self) -> bool {
        self.air_dash_ready
    }

    pub fn bounds(&self, config: &DuelConfig) -> Rect {
        Rect::at(
            self.body.x,
            self.body.y,
            config.fighter_width,
            config.fighter_height,
        )
    }

    /// Basic-attack hitbox while it is still active at `now`.
    pub fn active_hitbox(&self, now: Duration) -> Option<Rect> {
        self.active_hitbox
            .filter(|&(_, until)| now < until)
            .map(|(rect, _)| rect)
    }

    /// The cooldown gating the special button.
    fn special_ability(&self) -> Ability {
        if self.variant.capabilities().has_distinct_special {
            Ability::Special
        } else {
            Ability::Basic
        }
    }

    pub fn special_ready(&self, now: Duration) -> bool {
        self.cooldowns.is_ready(self.special_ability(), now)
    }

    pub fn special_cooldown(&self, now: Duration) -> Duration {
        self.cooldowns.remaining(self.special_ability(), now)
    }

    /// Place the fighter directly, e.g. for scripted setups. Negative y puts
    /// it in the air.
    pub fn teleport(&mut self, x: f32, y: f32) {
        self.body.x = x;
        self.body.y = y.min(0.0);
        self.airborne = self.body.y < 0.0;
        if self.airborne && matches!(self.state, FighterState::Idle | FighterState::Walking) {
            self.state = FighterState::Jumping;
        }
    }

    pub fn face(&mut self, dir: f32) {
        if dir != 0.0 {
            self.facing = dir.signum();
        }
    }

    fn is_attacking(&self) -> bool {
        matches!(
            self.state,
            FighterState::BasicAttacking | FighterState::SpecialAttacking
        )
    }

    /// Movement and jump input is only accepted from these states.
    pub(crate) fn accepts_input(&self) -> bool {
        matches!(
            self.state,
            FighterState::Idle | FighterState::Walking | FighterState::Jumping
        )
    }

    // ================================================================
    // Commands
    // ================================================================

    /// Walk left (-1), right (+1) or stop (0).
    pub fn walk(&mut self, dir: i8, config: &DuelConfig) {
        if !self.accepts_input() {
            return;
        }
        let dir = dir.clamp(-1, 1);
        self.body.vx = f32::from(dir) * config.tuning(self.variant).walk_speed;
        self.face(f32::from(dir));
        if !self.airborne {
            self.state = if dir != 0 {
                FighterState::Walking
            } else {
                FighterState::Idle
            };
        }
    }

    pub fn jump(&mut self, config: &DuelConfig) {
        if self.airborne || !self.accepts_input() {
            return;
        }
        self.body.vy = -config.jump_speed;
        self.airborne = true;
        self.state = FighterState::Jumping;
    }

    /// Swing the basic attack. Returns false if a guard or cooldown refused it.
    /// Allowed out of hit-stun, which it replaces.
    pub fn basic_attack(&mut self, target: &mut Fighter, ctx: &mut ActionCtx<'_>) -> bool {
        if self.state.is_terminal() || self.is_attacking() {
            return false;
        }
        if self.variant.capabilities().grounded_attacks_only && self.airborne {
            return false;
        }
        let now = ctx.now();
        if !self.cooldowns.is_ready(Ability::Basic, now) {
            return false;
        }

        let config = ctx.config;
        let tuning = config.tuning(self.variant);
        self.cooldowns
            .trigger(Ability::Basic, now, ms(tuning.basic_cooldown_ms));
        self.enter_timed(
            FighterState::BasicAttacking,
            ms(tuning.basic_duration_ms),
            TimedEvent::EndBasic(self.slot),
            ctx,
        );

        let hitbox = Rect::ahead(
            self.body.x,
            self.body.y,
            self.facing,
            config.basic_hitbox_offset,
            config.basic_hitbox_size,
            config.basic_hitbox_size,
        );
        self.active_hitbox = Some((hitbox, now + ms(config.basic_active_ms)));
        combat::strike(
            self.slot,
            &hitbox,
            target,
            AttackKind::Basic,
            config.basic_damage,
            ctx,
        );
        true
    }

    /// Use the variant's special. Returns false if it was refused.
    pub fn special_attack(
        &mut self,
        target: &mut Fighter,
        ctx: &mut ActionCtx<'_>,
        shells: &mut ShellSystem,
    ) -> bool {
        let caps = self.variant.capabilities();
        if !caps.has_distinct_special {
            return self.basic_attack(target, ctx);
        }
        if caps.has_projectile {
            self.throw_shell(ctx, shells)
        } else if caps.can_air_dash {
            self.dash_strike(target, ctx)
        } else {
            false
        }
    }

    fn dash_strike(&mut self, target: &Fighter, ctx: &mut ActionCtx<'_>) -> bool {
        if !self.accepts_input() || (self.airborne && !self.air_dash_ready) {
            return false;
        }
        let dash = &ctx.config.dash;
        let speed = if self.airborne {
            self.air_dash_ready = false;
            dash.air_speed
        } else {
            dash.ground_speed
        };
        self.body.vx = self.facing * speed;
        self.dash = Some(DashRun {
            target: target.slot,
            origin_x: self.body.x,
        });
        let length = ms(dash.duration_ms);
        self.enter_timed(
            FighterState::SpecialAttacking,
            length,
            TimedEvent::EndSpecial(self.slot),
            ctx,
        );
        true
    }

    fn throw_shell(&mut self, ctx: &mut ActionCtx<'_>, shells: &mut ShellSystem) -> bool {
        let now = ctx.now();
        if self.state.is_terminal()
            || self.is_attacking()
            || self.airborne
            || !self.cooldowns.is_ready(Ability::Special, now)
        {
            return false;
        }
        let shell = &ctx.config.shell;
        let (cooldown, length) = (ms(shell.cooldown_ms), ms(shell.throw_duration_ms));
        self.cooldowns.trigger(Ability::Special, now, cooldown);
        self.enter_timed(
            FighterState::SpecialAttacking,
            length,
            TimedEvent::EndSpecial(self.slot),
            ctx,
        );
        shells.spawn(self, ctx);
        true
    }

    /// Lose health; enter hit-stun unless already stunned.
    pub fn take_damage(&mut self, amount: f32, ctx: &mut ActionCtx<'_>) {
        if self.state.is_terminal() {
            return;
        }
        self.health = (self.health - amount.max(0.0)).clamp(0.0, MAX_HEALTH);
        if self.state == FighterState::Hit {
            return;
        }
        self.dash = None;
        self.body.vx = 0.0;
        let stun = ms(ctx.config.hit_stun_ms);
        self.enter_timed(FighterState::Hit, stun, TimedEvent::EndHit(self.slot), ctx);
    }

    /// Enter the terminal state at match end.
    pub(crate) fn finish(&mut self, won: bool) {
        self.state_timer = None;
        self.dash = None;
        self.state = if won {
            FighterState::Win
        } else {
            FighterState::Fail
        };
    }

    // ================================================================
    // Tick
    // ================================================================

    /// Integrate physics and run per-tick contact checks against `other`.
    pub fn update(&mut self, other: &mut Fighter, ctx: &mut ActionCtx<'_>) {
        if self.state.is_terminal() {
            return;
        }
        let config = ctx.config;
        let landed = integrate_fighter(
            &mut self.body,
            &mut self.airborne,
            config.gravity,
            config.max_fighter_x(),
        );
        if landed && self.state == FighterState::Jumping {
            self.state = if self.body.vx.abs() >= STILL_SPEED {
                FighterState::Walking
            } else {
                FighterState::Idle
            };
        }

        if self.variant.capabilities().can_air_dash {
            self.dash_contacts(other, ctx);
        }

        if !self.airborne {
            self.air_dash_ready = true;
            if self.state == FighterState::Walking && self.body.vx.abs() < STILL_SPEED {
                self.state = FighterState::Idle;
            }
        }

        if self
            .active_hitbox
            .is_some_and(|(_, until)| ctx.now() >= until)
        {
            self.active_hitbox = None;
        }
    }

    /// Dasher-only contact rules: mid-air bounces, stomps, dash clashes and
    /// the dash strike itself.
    fn dash_contacts(&mut self, other: &mut Fighter, ctx: &mut ActionCtx<'_>) {
        let config = ctx.config;
        let dash = &config.dash;

        if self.airborne && self.state == FighterState::Jumping {
            let mine = self.bounds(config);
            if mine.overlaps(&other.bounds(config)) {
                if other.variant.capabilities().can_air_dash
                    && other.airborne
                    && other.state == FighterState::Jumping
                {
                    let push = if self.body.x < other.body.x {
                        -dash.air_bounce_x
                    } else {
                        dash.air_bounce_x
                    };
                    self.body.vx = push;
                    other.body.vx = -push;
                    self.body.vy = -dash.air_bounce_y;
                    other.body.vy = -dash.air_bounce_y;
                } else if self.cooldowns.is_ready(Ability::Stomp, ctx.now()) {
                    self.cooldowns
                        .trigger(Ability::Stomp, ctx.now(), ms(dash.stomp_lock_ms));
                    combat::strike(
                        self.slot,
                        &mine,
                        other,
                        AttackKind::Stomp,
                        dash.stomp_damage,
                        ctx,
                    );
                }
            }
        }

        if self.is_dashing()
            && other.is_dashing()
            && (self.body.x - other.body.x).abs() < dash.clash_distance
        {
            self.recoil(ctx);
            other.recoil(ctx);
            return;
        }

        let Some(run) = self.dash else {
            return;
        };
        if self.state != FighterState::SpecialAttacking || run.target != other.slot {
            return;
        }
        let hitbox = Rect::ahead(
            self.body.x,
            self.body.y,
            self.facing,
            dash.hitbox_offset,
            dash.hitbox_size,
            dash.hitbox_size,
        );
        let travelled = (self.body.x - run.origin_x).abs();
        let damage = (travelled * dash.damage_per_unit).clamp(dash.min_damage, dash.max_damage);
        if combat::strike(self.slot, &hitbox, other, AttackKind::Dash, damage, ctx) {
            self.dash = None;
            self.body.vx = 0.0;
            self.settle(ctx);
        }
    }

    /// Cancel a dash and bounce backwards for a short while.
    fn recoil(&mut self, ctx: &mut ActionCtx<'_>) {
        self.dash = None;
        self.settle(ctx);
        self.body.vx = self.facing * -ctx.config.dash.clash_recoil_speed;
        let length = ms(ctx.config.dash.clash_recoil_ms);
        ctx.scheduler
            .after(length, TimedEvent::StopRecoil(self.slot));
    }

    /// React to one of this fighter's scheduled events.
    pub fn on_timer(&mut self, event: TimedEvent, ctx: &mut ActionCtx<'_>) {
        if self.state.is_terminal() || event.slot() != self.slot {
            return;
        }
        match event {
            TimedEvent::EndBasic(_) if self.state == FighterState::BasicAttacking => {
                self.settle(ctx);
            },
            TimedEvent::EndSpecial(_) if self.state == FighterState::SpecialAttacking => {
                if self.dash.take().is_some() {
                    self.body.vx = 0.0;
                }
                self.settle(ctx);
            },
            TimedEvent::EndHit(_) if self.state == FighterState::Hit => {
                self.settle(ctx);
            },
            TimedEvent::StopRecoil(_) if self.state != FighterState::SpecialAttacking => {
                self.body.vx = 0.0;
            },
            _ => {},
        }
    }

    // ================================================================
    // State helpers
    // ================================================================

    fn enter_timed(
        &mut self,
        state: FighterState,
        length: Duration,
        event: TimedEvent,
        ctx: &mut ActionCtx<'_>,
    ) {
        self.cancel_state_timer(ctx.scheduler);
        self.state = state;
        self.state_timer = Some(ctx.scheduler.after(length, event));
    }

    fn cancel_state_timer(&mut self, scheduler: &mut Scheduler<TimedEvent>) {
        if let Some(handle) = self.state_timer.take() {
            scheduler.cancel(handle);
        }
    }

    /// Drop out of a timed state into whatever the fighter's motion implies.
    fn settle(&mut self, ctx: &mut ActionCtx<'_>) {
        self.cancel_state_timer(ctx.scheduler);
        self.state = if self.airborne {
            FighterState::Jumping
        } else {
            FighterState::Idle
        };
    }
}
