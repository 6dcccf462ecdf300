use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::error::SetupError;
use crate::variant::Variant;

/// Upper bound for every millisecond setting.
pub const MAX_TIMER_MS: u64 = 60_000;

/// Per-variant movement and basic-attack tuning.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct VariantTuning {
    /// Horizontal walk speed (units/tick).
    pub walk_speed: f32,
    pub basic_cooldown_ms: u64,
    pub basic_duration_ms: u64,
}

impl Default for VariantTuning {
    fn default() -> Self {
        Self {
            walk_speed: 5.0,
            basic_cooldown_ms: 500,
            basic_duration_ms: 500,
        }
    }
}

/// Dasher special (dash strike) tuning.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct DashConfig {
    pub ground_speed: f32,
    pub air_speed: f32,
    pub duration_ms: u64,
    pub hitbox_offset: f32,
    pub hitbox_size: f32,
    /// Damage per unit travelled before clamping.
    pub damage_per_unit: f32,
    pub min_damage: f32,
    pub max_damage: f32,
    /// Two dashing Dashers closer than this cancel each other.
    pub clash_distance: f32,
    pub clash_recoil_speed: f32,
    pub clash_recoil_ms: u64,
    /// Impulses applied when two airborne Dashers collide.
    pub air_bounce_x: f32,
    pub air_bounce_y: f32,
    /// Flat damage for landing on the opponent mid-jump.
    pub stomp_damage: f32,
    pub stomp_lock_ms: u64,
}

impl Default for DashConfig {
    fn default() -> Self {
        Self {
            ground_speed: 15.0,
            air_speed: 20.0,
            duration_ms: 300,
            hitbox_offset: 30.0,
            hitbox_size: 50.0,
            damage_per_unit: 0.01,
            min_damage: 3.0,
            max_damage: 4.0,
            clash_distance: 50.0,
            clash_recoil_speed: 15.0,
            clash_recoil_ms: 200,
            air_bounce_x: 10.0,
            air_bounce_y: 10.0,
            stomp_damage: 3.0,
            stomp_lock_ms: 500,
        }
    }
}

/// Thrower special (shell throw) and shell tuning.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ShellConfig {
    pub throw_duration_ms: u64,
    pub cooldown_ms: u64,
    pub spawn_offset: f32,
    pub speed: f32,
    pub size: f32,
    pub max_bounces: u8,
    pub damage: f32,
    /// Minimum time between two hits from the same shell.
    pub rehit_ms: u64,
}

impl Default for ShellConfig {
    fn default() -> Self {
        Self {
            throw_duration_ms: 500,
            cooldown_ms: 5000,
            spawn_offset: 50.0,
            speed: 10.0,
            size: 32.0,
            max_bounces: 3,
            damage: 5.0,
            rehit_ms: 200,
        }
    }
}

/// Data-driven configuration for a duel, loadable from TOML.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct DuelConfig {
    pub arena_width: f32,
    pub fighter_width: f32,
    pub fighter_height: f32,
    /// Added to vertical velocity each airborne tick.
    pub gravity: f32,
    /// Upward launch speed of a jump (applied as negative vy).
    pub jump_speed: f32,
    pub hit_stun_ms: u64,
    pub basic_damage: f32,
    pub basic_hitbox_offset: f32,
    pub basic_hitbox_size: f32,
    /// How long the basic-attack hitbox is reported as active.
    pub basic_active_ms: u64,
    /// Spawn x for slot 1 and slot 2.
    pub spawn_x: [f32; 2],
    pub dasher: VariantTuning,
    pub thrower: VariantTuning,
    pub brawler: VariantTuning,
    pub dash: DashConfig,
    pub shell: ShellConfig,
}

impl Default for DuelConfig {
    fn default() -> Self {
        Self {
            arena_width: 960.0,
            fighter_width: 64.0,
            fighter_height: 64.0,
            gravity: 0.8,
            jump_speed: 15.0,
            hit_stun_ms: 500,
            basic_damage: 5.0,
            basic_hitbox_offset: 50.0,
            basic_hitbox_size: 50.0,
            basic_active_ms: 100,
            spawn_x: [100.0, 700.0],
            dasher: VariantTuning {
                walk_speed: 7.0,
                ..VariantTuning::default()
            },
            thrower: VariantTuning::default(),
            brawler: VariantTuning {
                basic_cooldown_ms: 1000,
                ..VariantTuning::default()
            },
            dash: DashConfig::default(),
            shell: ShellConfig::default(),
        }
    }
}

impl DuelConfig {
    /// Load config from `SMASHDOWN_DUEL_CONFIG` or `config/duel.toml`, falling
    /// back to defaults if the file is missing or unparseable.
    pub fn load() -> Self {
        let path = std::env::var("SMASHDOWN_DUEL_CONFIG")
            .unwrap_or_else(|_| "config/duel.toml".to_string());
        match std::fs::read_to_string(&path) {
            Ok(content) => Self::from_toml(&content).unwrap_or_else(|e| {
                tracing::warn!("Failed to parse {path}: {e}, using defaults");
                Self::default()
            }),
            Err(_) => Self::default(),
        }
    }

    pub fn from_toml(content: &str) -> Result<Self, toml::de::Error> {
        toml::from_str(content)
    }

    /// Reject layouts the simulation cannot honour.
    pub fn validate(&self) -> Result<(), SetupError> {
        if !(self.fighter_width > 0.0 && self.fighter_height > 0.0) {
            return Err(SetupError::InvalidFighterSize {
                width: self.fighter_width,
                height: self.fighter_height,
            });
        }
        let furthest_spawn = self.spawn_x[0].max(self.spawn_x[1]).max(0.0);
        let required = furthest_spawn + self.fighter_width;
        if self.arena_width < required {
            return Err(SetupError::ArenaTooNarrow {
                width: self.arena_width,
                required,
            });
        }
        for (field, ms) in self.timers() {
            if ms > MAX_TIMER_MS {
                return Err(SetupError::TimerOutOfRange {
                    field,
                    ms,
                    max: MAX_TIMER_MS,
                });
            }
        }
        Ok(())
    }

    fn timers(&self) -> [(&'static str, u64); 14] {
        [
            ("hit_stun_ms", self.hit_stun_ms),
            ("basic_active_ms", self.basic_active_ms),
            ("dasher.basic_cooldown_ms", self.dasher.basic_cooldown_ms),
            ("dasher.basic_duration_ms", self.dasher.basic_duration_ms),
            ("thrower.basic_cooldown_ms", self.thrower.basic_cooldown_ms),
            ("thrower.basic_duration_ms", self.thrower.basic_duration_ms),
            ("brawler.basic_cooldown_ms", self.brawler.basic_cooldown_ms),
            ("brawler.basic_duration_ms", self.brawler.basic_duration_ms),
            ("dash.duration_ms", self.dash.duration_ms),
            ("dash.clash_recoil_ms", self.dash.clash_recoil_ms),
            ("dash.stomp_lock_ms", self.dash.stomp_lock_ms),
            ("shell.throw_duration_ms", self.shell.throw_duration_ms),
            ("shell.cooldown_ms", self.shell.cooldown_ms),
            ("shell.rehit_ms", self.shell.rehit_ms),
        ]
    }

    pub fn tuning(&self, variant: Variant) -> &VariantTuning {
        match variant {
            Variant::Dasher => &self.dasher,
            Variant::Thrower => &self.thrower,
            Variant::Brawler => &self.brawler,
        }
    }

    /// Largest x a fighter may occupy.
    pub fn max_fighter_x(&self) -> f32 {
        (self.arena_width - self.fighter_width).max(0.0)
    }

    /// Largest x a shell may occupy before it bounces off the right wall.
    pub fn max_shell_x(&self) -> f32 {
        (self.arena_width - self.shell.size).max(0.0)
    }
}

/// Milliseconds from config into a [`Duration`].
pub(crate) fn ms(v: u64) -> Duration {
    Duration::from_millis(v)
}
