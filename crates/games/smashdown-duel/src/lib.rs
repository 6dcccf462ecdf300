pub mod ai;
pub mod combat;
pub mod config;
pub mod error;
pub mod fighter;
pub mod physics;
pub mod projectile;
pub mod variant;

use std::str::FromStr;

use rand::SeedableRng;
use rand::rngs::StdRng;
use rand::seq::IndexedRandom;
use serde::{Deserialize, Serialize};

use smashdown_core::clock::as_millis_u64;
use smashdown_core::{FrameDriven, Rect, Scheduler, TICK};

pub use ai::{AiController, AiIntent, Difficulty, DifficultyProfile};
pub use combat::{AttackKind, MatchEvent};
pub use config::DuelConfig;
pub use error::SetupError;
pub use fighter::{ActionCtx, Fighter, FighterState, TimedEvent};
pub use projectile::{Shell, ShellSystem};
pub use variant::{Slot, Variant};

/// Per-tick command from the human-controlled fighter (slot 1).
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct InputCommand {
    /// -1 left, 0 stop, +1 right.
    pub move_dir: i8,
    pub jump: bool,
    pub basic_attack: bool,
    pub special_attack: bool,
}

/// How slot 2's variant is chosen.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OpponentPick {
    Fixed(Variant),
    /// Any variant other than the player's.
    Random,
}

impl FromStr for OpponentPick {
    type Err = SetupError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        if s.trim().eq_ignore_ascii_case("random") {
            Ok(OpponentPick::Random)
        } else {
            s.parse().map(OpponentPick::Fixed)
        }
    }
}

/// Everything needed to start a match.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MatchSetup {
    pub player: Variant,
    pub opponent: OpponentPick,
    pub difficulty: Difficulty,
    /// Hand slot 1 to an AI as well.
    pub autopilot: bool,
    /// RNG seed for AI decisions and the random opponent pick. A fresh seed is
    /// drawn (and logged) when unset.
    pub seed: Option<u64>,
}

impl Default for MatchSetup {
    fn default() -> Self {
        Self {
            player: Variant::Dasher,
            opponent: OpponentPick::Random,
            difficulty: Difficulty::Normal,
            autopilot: false,
            seed: None,
        }
    }
}

impl MatchSetup {
    /// Build a setup from menu names, failing on anything unrecognised.
    pub fn from_names(player: &str, opponent: &str, difficulty: &str) -> Result<Self, SetupError> {
        Ok(Self {
            player: player.parse()?,
            opponent: opponent.parse()?,
            difficulty: difficulty.parse()?,
            ..Self::default()
        })
    }
}

/// Render-facing view of one fighter.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FighterSnapshot {
    pub slot: u8,
    pub variant: Variant,
    pub x: f32,
    pub y: f32,
    pub facing: f32,
    pub state: FighterState,
    pub health: u8,
    pub ai_controlled: bool,
    pub special_cooldown_ms: u64,
    /// Basic-attack hitbox while it is live.
    pub hitbox: Option<Rect>,
}

/// Render-facing view of one projectile.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ShellSnapshot {
    pub id: u32,
    pub x: f32,
    pub y: f32,
    pub bounces: u8,
    /// Variant of the fighter that threw it.
    pub variant: Variant,
    pub owner: u8,
}

/// Everything a renderer needs for one frame. Empty before a match starts.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct MatchSnapshot {
    pub time_ms: u64,
    pub fighters: Vec<FighterSnapshot>,
    pub projectiles: Vec<ShellSnapshot>,
    pub game_over: bool,
    pub winner_slot: Option<u8>,
}

struct MatchState {
    fighters: [Fighter; 2],
    shells: ShellSystem,
    ai: AiController,
    game_over: bool,
    winner: Option<Slot>,
    /// Held direction last applied to the human fighter. Cleared while it
    /// cannot move so the hold is re-applied once it recovers.
    applied_move: Option<i8>,
}

/// Split the pair into (`slot`'s fighter, the other one).
fn pair_mut(fighters: &mut [Fighter; 2], slot: Slot) -> (&mut Fighter, &mut Fighter) {
    let [one, two] = fighters;
    match slot {
        Slot::One => (one, two),
        Slot::Two => (two, one),
    }
}

/// The match controller: owns the clock, both fighters and the shells, and
/// runs the fixed per-tick order.
pub struct Duel {
    config: DuelConfig,
    scheduler: Scheduler<TimedEvent>,
    state: Option<MatchState>,
    rng: StdRng,
    pending_input: InputCommand,
}

impl Duel {
    pub fn new() -> Self {
        Self::with_config(DuelConfig::load())
    }

    pub fn with_config(config: DuelConfig) -> Self {
        Self {
            config,
            scheduler: Scheduler::new(),
            state: None,
            rng: StdRng::seed_from_u64(0),
            pending_input: InputCommand::default(),
        }
    }

    pub fn config(&self) -> &DuelConfig {
        &self.config
    }

    /// Tear down whatever is running and start a fresh match.
    pub fn start(&mut self, setup: &MatchSetup) -> Result<(), SetupError> {
        self.config.validate()?;
        self.reset();

        let seed = setup.seed.unwrap_or_else(rand::random);
        self.rng = StdRng::seed_from_u64(seed);

        let opponent = match setup.opponent {
            OpponentPick::Fixed(variant) => variant,
            OpponentPick::Random => {
                let others: Vec<Variant> = Variant::ALL
                    .into_iter()
                    .filter(|&v| v != setup.player)
                    .collect();
                others.choose(&mut self.rng).copied().unwrap_or(setup.player)
            },
        };

        let [x1, x2] = self.config.spawn_x;
        let fighters = [
            Fighter::new(Slot::One, setup.player, x1, setup.autopilot),
            Fighter::new(Slot::Two, opponent, x2, true),
        ];
        tracing::info!(
            player = %setup.player,
            %opponent,
            difficulty = %setup.difficulty,
            autopilot = setup.autopilot,
            seed,
            "Match started"
        );
        self.state = Some(MatchState {
            fighters,
            shells: ShellSystem::new(),
            ai: AiController::new(setup.difficulty),
            game_over: false,
            applied_move: None,
            winner: None,
        });
        Ok(())
    }

    pub fn is_running(&self) -> bool {
        self.state.as_ref().is_some_and(|s| !s.game_over)
    }

    pub fn winner(&self) -> Option<Slot> {
        self.state.as_ref().and_then(|s| s.winner)
    }

    pub fn now(&self) -> std::time::Duration {
        self.scheduler.now()
    }

    pub fn fighter(&self, slot: Slot) -> Option<&Fighter> {
        self.state.as_ref().map(|s| &s.fighters[slot.index()])
    }

    /// Direct access for scripted setups and tests.
    pub fn fighter_mut(&mut self, slot: Slot) -> Option<&mut Fighter> {
        self.state.as_mut().map(|s| &mut s.fighters[slot.index()])
    }

    pub fn shells(&self) -> &[Shell] {
        self.state
            .as_ref()
            .map(|s| s.shells.shells())
            .unwrap_or_default()
    }

    fn run_tick(&mut self, state: &mut MatchState) -> Vec<MatchEvent> {
        let mut events = Vec::new();
        let due = self.scheduler.advance(TICK);
        let input = self.pending_input;
        self.pending_input = InputCommand {
            move_dir: input.move_dir,
            ..InputCommand::default()
        };

        let mut ctx = ActionCtx::new(&mut self.scheduler, &self.config, &mut events);

        for event in due {
            let slot = event.slot();
            let (me, other) = pair_mut(&mut state.fighters, slot);
            match event {
                TimedEvent::AiSpecial(_) => {
                    me.special_attack(other, &mut ctx, &mut state.shells);
                },
                _ => me.on_timer(event, &mut ctx),
            }
        }

        // AI decisions.
        for slot in [Slot::One, Slot::Two] {
            if !state.fighters[slot.index()].is_ai() {
                continue;
            }
            let plan = state.ai.decide(
                &state.fighters[slot.index()],
                Some(&state.fighters[slot.other().index()]),
                state.game_over,
                ctx.config,
                ctx.now(),
                &mut self.rng,
            );
            for intent in plan {
                let (me, other) = pair_mut(&mut state.fighters, slot);
                match intent {
                    AiIntent::Move(dir) => me.walk(dir, ctx.config),
                    AiIntent::Jump => me.jump(ctx.config),
                    AiIntent::Special => {
                        me.special_attack(other, &mut ctx, &mut state.shells);
                    },
                    AiIntent::SpecialAfter(delay) => {
                        ctx.scheduler.after(delay, TimedEvent::AiSpecial(slot));
                    },
                }
            }
        }

        // Human input.
        let (player, opponent) = pair_mut(&mut state.fighters, Slot::One);
        if !player.is_ai() {
            // Steer only on a new direction or after regaining control.
            if !player.accepts_input() {
                state.applied_move = None;
            } else if state.applied_move != Some(input.move_dir) {
                player.walk(input.move_dir, ctx.config);
                state.applied_move = Some(input.move_dir);
            }
            if input.jump {
                player.jump(ctx.config);
            }
            if input.basic_attack {
                player.basic_attack(opponent, &mut ctx);
            }
            if input.special_attack {
                player.special_attack(opponent, &mut ctx, &mut state.shells);
            }
        }

        for slot in [Slot::One, Slot::Two] {
            let (me, other) = pair_mut(&mut state.fighters, slot);
            me.update(other, &mut ctx);
        }

        state.shells.update(&mut state.fighters, &mut ctx);

        let [one, two] = &state.fighters;
        if one.health() <= 0.0 || two.health() <= 0.0 {
            let winner = if one.health() <= 0.0 {
                Slot::Two
            } else {
                Slot::One
            };
            state.game_over = true;
            state.winner = Some(winner);
            for fighter in &mut state.fighters {
                fighter.finish(fighter.slot() == winner);
            }
            ctx.scheduler.cancel_all();
            ctx.events.push(MatchEvent::MatchOver { winner });
            tracing::info!(
                winner = winner.number(),
                time_ms = as_millis_u64(ctx.now()),
                "Match over"
            );
        }

        events
    }
}

impl Default for Duel {
    fn default() -> Self {
        Self::with_config(DuelConfig::default())
    }
}

impl FrameDriven for Duel {
    type Command = InputCommand;
    type Snapshot = MatchSnapshot;
    type Event = MatchEvent;

    /// Continuous movement is overwritten with the latest value; button
    /// presses accumulate until a tick consumes them.
    fn queue_command(&mut self, command: InputCommand) {
        if !self.is_running() || self.fighter(Slot::One).is_some_and(Fighter::is_ai) {
            tracing::debug!(?command, "Dropping input: no human-controlled fighter");
            return;
        }
        let pending = &mut self.pending_input;
        pending.move_dir = command.move_dir.clamp(-1, 1);
        pending.jump |= command.jump;
        pending.basic_attack |= command.basic_attack;
        pending.special_attack |= command.special_attack;
    }

    fn tick(&mut self) -> Vec<MatchEvent> {
        let Some(mut state) = self.state.take() else {
            return Vec::new();
        };
        let events = if state.game_over {
            Vec::new()
        } else {
            self.run_tick(&mut state)
        };
        self.state = Some(state);
        events
    }

    fn snapshot(&self) -> MatchSnapshot {
        let Some(state) = &self.state else {
            return MatchSnapshot::default();
        };
        let now = self.scheduler.now();
        let fighters = state
            .fighters
            .iter()
            .map(|f| FighterSnapshot {
                slot: f.slot().number(),
                variant: f.variant(),
                x: f.x(),
                y: f.y(),
                facing: f.facing(),
                state: f.state(),
                health: f.health().ceil().clamp(0.0, 100.0) as u8,
                ai_controlled: f.is_ai(),
                special_cooldown_ms: as_millis_u64(f.special_cooldown(now)),
                hitbox: f.active_hitbox(now),
            })
            .collect();
        let projectiles = state
            .shells
            .shells()
            .iter()
            .map(|s| ShellSnapshot {
                id: s.id,
                x: s.body.x,
                y: s.body.y,
                bounces: s.bounces,
                variant: state.fighters[s.owner.index()].variant(),
                owner: s.owner.number(),
            })
            .collect();
        MatchSnapshot {
            time_ms: as_millis_u64(now),
            fighters,
            projectiles,
            game_over: state.game_over,
            winner_slot: state.winner.map(Slot::number),
        }
    }

    fn is_over(&self) -> bool {
        self.state.as_ref().is_some_and(|s| s.game_over)
    }

    fn reset(&mut self) {
        self.scheduler.reset();
        self.state = None;
        self.pending_input = InputCommand::default();
    }
}
