use std::str::FromStr;
use std::time::Duration;

use rand::Rng;
use serde::{Deserialize, Serialize};
use smallvec::SmallVec;

use crate::config::DuelConfig;
use crate::error::SetupError;
use crate::fighter::Fighter;
use crate::variant::Variant;

/// Distance from either wall that counts as cornered.
const CORNER_MARGIN: f32 = 50.0;
/// Easy-tier bots back off inside this distance.
const RUN_AWAY_DISTANCE: f32 = 150.0;
/// Opponent dashes inside this distance trigger defensive jumps.
const DASH_THREAT_DISTANCE: f32 = 150.0;

const DASHER_ENGAGE: f32 = 200.0;
const THROWER_ADVANCE: f32 = 300.0;
const THROWER_RETREAT: f32 = 150.0;
const BRAWLER_ADVANCE: f32 = 150.0;
const BRAWLER_REACH: f32 = 100.0;

const COUNTER_DELAY: Duration = Duration::from_millis(200);
const HOP_ATTACK_DELAY: Duration = Duration::from_millis(100);

/// AI difficulty tier.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum Difficulty {
    Easy,
    #[default]
    Normal,
    Hard,
    Insane,
}

/// Per-tick probabilities that shape bot behaviour.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct DifficultyProfile {
    /// Chance of a speculative jump each tick.
    pub reaction_time: f32,
    pub attack_frequency: f32,
    /// Chance of reacting correctly to an incoming dash.
    pub smartness: f32,
}

impl Difficulty {
    pub fn profile(self) -> DifficultyProfile {
        let (reaction_time, attack_frequency, smartness) = match self {
            Difficulty::Easy => (0.01, 0.01, 0.3),
            Difficulty::Normal => (0.02, 0.02, 0.5),
            Difficulty::Hard => (0.03, 0.03, 0.7),
            Difficulty::Insane => (0.04, 0.04, 0.9),
        };
        DifficultyProfile {
            reaction_time,
            attack_frequency,
            smartness,
        }
    }

    pub fn name(self) -> &'static str {
        match self {
            Difficulty::Easy => "easy",
            Difficulty::Normal => "normal",
            Difficulty::Hard => "hard",
            Difficulty::Insane => "insane",
        }
    }
}

impl FromStr for Difficulty {
    type Err = SetupError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "easy" => Ok(Difficulty::Easy),
            "normal" => Ok(Difficulty::Normal),
            "hard" => Ok(Difficulty::Hard),
            "insane" => Ok(Difficulty::Insane),
            _ => Err(SetupError::UnknownDifficulty(s.to_string())),
        }
    }
}

impl std::fmt::Display for Difficulty {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.name())
    }
}

/// One thing the bot wants to do this tick.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AiIntent {
    /// Walk direction: -1, 0 or +1.
    Move(i8),
    Jump,
    Special,
    /// Special attack fired later through the match clock.
    SpecialAfter(Duration),
}

/// Intents for a single tick, executed in order.
pub type AiPlan = SmallVec<[AiIntent; 4]>;

/// Heuristic opponent. Holds no per-tick state; everything it needs is read
/// from the fighters, and every random choice comes from the caller's RNG.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AiController {
    difficulty: Difficulty,
}

fn roll(rng: &mut impl Rng, chance: f32) -> bool {
    rng.random::<f32>() < chance
}

impl AiController {
    pub fn new(difficulty: Difficulty) -> Self {
        Self { difficulty }
    }

    /// Decide what `me` does this tick.
    pub fn decide(
        &self,
        me: &Fighter,
        opponent: Option<&Fighter>,
        match_over: bool,
        config: &DuelConfig,
        now: Duration,
        rng: &mut impl Rng,
    ) -> AiPlan {
        let mut plan = AiPlan::new();
        let Some(opponent) = opponent else {
            return plan;
        };
        if match_over {
            return plan;
        }

        let profile = self.difficulty.profile();
        let distance = (me.x() - opponent.x()).abs();
        let toward: i8 = if opponent.x() > me.x() { 1 } else { -1 };
        // Opponent mid dash on the ground: something to jump over.
        let dash_incoming = opponent.is_dashing() && !opponent.is_airborne();

        // Corner escape.
        let near_left = me.x() < CORNER_MARGIN;
        let near_right = me.x() > config.arena_width - config.fighter_width - CORNER_MARGIN;
        if (near_left || near_right) && !me.is_airborne() {
            plan.push(AiIntent::Jump);
            plan.push(AiIntent::Move(if near_left { 1 } else { -1 }));
            return plan;
        }

        if self.difficulty == Difficulty::Easy && distance < RUN_AWAY_DISTANCE {
            plan.push(AiIntent::Move(-toward));
            return plan;
        }

        match me.variant() {
            Variant::Dasher => {
                if distance > DASHER_ENGAGE {
                    plan.push(AiIntent::Move(toward));
                } else if distance < DASHER_ENGAGE {
                    if dash_incoming && roll(rng, profile.smartness) {
                        plan.push(AiIntent::Jump);
                        if roll(rng, profile.smartness) {
                            plan.push(AiIntent::SpecialAfter(COUNTER_DELAY));
                        }
                    } else if roll(rng, profile.attack_frequency) {
                        plan.push(AiIntent::Special);
                    }
                }

                if roll(rng, profile.reaction_time)
                    && !(opponent.is_dashing() && opponent.is_airborne())
                {
                    plan.push(AiIntent::Jump);
                    if roll(rng, profile.smartness * 0.7) {
                        plan.push(AiIntent::SpecialAfter(HOP_ATTACK_DELAY));
                    }
                }
            },
            Variant::Thrower => {
                if distance > THROWER_ADVANCE {
                    plan.push(AiIntent::Move(toward));
                } else if distance < THROWER_RETREAT {
                    plan.push(AiIntent::Move(-toward));
                } else if roll(rng, profile.attack_frequency * 1.5) && me.special_ready(now) {
                    plan.push(AiIntent::Special);
                }

                if dash_incoming && distance < DASH_THREAT_DISTANCE && roll(rng, profile.smartness)
                {
                    plan.push(AiIntent::Jump);
                    if roll(rng, profile.smartness * 0.8) {
                        plan.push(AiIntent::SpecialAfter(COUNTER_DELAY));
                    }
                }
            },
            Variant::Brawler => {
                if distance > BRAWLER_ADVANCE {
                    plan.push(AiIntent::Move(toward));
                } else if distance <= BRAWLER_REACH && roll(rng, profile.attack_frequency * 1.5) {
                    plan.push(AiIntent::Special);
                }

                if dash_incoming && distance < DASH_THREAT_DISTANCE && roll(rng, profile.smartness)
                {
                    plan.push(AiIntent::Jump);
                }
            },
        }
        plan
    }
}

#[cfg(test)]
mod tests {
    use rand::SeedableRng;
    use rand::rngs::StdRng;
    use smashdown_core::Scheduler;

    use super::*;
    use crate::fighter::ActionCtx;
    use crate::projectile::ShellSystem;
    use crate::variant::Slot;

    fn bot(variant: Variant, x: f32) -> Fighter {
        Fighter::new(Slot::Two, variant, x, true)
    }

    fn human(variant: Variant, x: f32) -> Fighter {
        Fighter::new(Slot::One, variant, x, false)
    }

    /// Count how often `intent` shows up over `n` decisions.
    fn frequency(
        ai: AiController,
        me: &Fighter,
        opponent: &Fighter,
        n: usize,
        intent: AiIntent,
    ) -> usize {
        let config = DuelConfig::default();
        let mut rng = StdRng::seed_from_u64(7);
        (0..n)
            .filter(|_| {
                ai.decide(me, Some(opponent), false, &config, Duration::ZERO, &mut rng)
                    .contains(&intent)
            })
            .count()
    }

    /// Put `dasher` into a grounded dash toward +x.
    fn start_dash(dasher: &mut Fighter, target: &mut Fighter) {
        let config = DuelConfig::default();
        let mut scheduler = Scheduler::new();
        let mut events = Vec::new();
        let mut shells = ShellSystem::new();
        let mut ctx = ActionCtx::new(&mut scheduler, &config, &mut events);
        assert!(dasher.special_attack(target, &mut ctx, &mut shells));
        assert!(dasher.is_dashing());
    }

    #[test]
    fn difficulty_table() {
        assert_eq!(Difficulty::Easy.profile().smartness, 0.3);
        assert_eq!(Difficulty::Insane.profile().attack_frequency, 0.04);
        assert_eq!("HARD".parse::<Difficulty>(), Ok(Difficulty::Hard));
        assert_eq!(
            "nightmare".parse::<Difficulty>(),
            Err(SetupError::UnknownDifficulty("nightmare".to_string()))
        );
    }

    #[test]
    fn no_opponent_or_match_over_is_noop() {
        let config = DuelConfig::default();
        let mut rng = StdRng::seed_from_u64(1);
        let ai = AiController::new(Difficulty::Insane);
        let me = bot(Variant::Dasher, 500.0);
        let them = human(Variant::Dasher, 520.0);
        assert!(
            ai.decide(&me, None, false, &config, Duration::ZERO, &mut rng)
                .is_empty()
        );
        assert!(
            ai.decide(&me, Some(&them), true, &config, Duration::ZERO, &mut rng)
                .is_empty()
        );
    }

    #[test]
    fn cornered_bot_jumps_away_from_wall() {
        let config = DuelConfig::default();
        let mut rng = StdRng::seed_from_u64(2);
        let ai = AiController::new(Difficulty::Normal);
        let them = human(Variant::Thrower, 400.0);

        let left = bot(Variant::Brawler, 20.0);
        let plan = ai.decide(&left, Some(&them), false, &config, Duration::ZERO, &mut rng);
        assert_eq!(plan.as_slice(), &[AiIntent::Jump, AiIntent::Move(1)]);

        // 960 - 64 - 50 = 846
        let right = bot(Variant::Brawler, 850.0);
        let plan = ai.decide(&right, Some(&them), false, &config, Duration::ZERO, &mut rng);
        assert_eq!(plan.as_slice(), &[AiIntent::Jump, AiIntent::Move(-1)]);
    }

    #[test]
    fn airborne_bot_in_corner_uses_normal_logic() {
        let config = DuelConfig::default();
        let mut rng = StdRng::seed_from_u64(3);
        let ai = AiController::new(Difficulty::Normal);
        let mut me = bot(Variant::Brawler, 20.0);
        me.teleport(20.0, -40.0);
        let them = human(Variant::Thrower, 400.0);
        let plan = ai.decide(&me, Some(&them), false, &config, Duration::ZERO, &mut rng);
        assert_eq!(plan.as_slice(), &[AiIntent::Move(1)]);
    }

    #[test]
    fn easy_bot_runs_away_up_close() {
        let ai = AiController::new(Difficulty::Easy);
        let me = bot(Variant::Brawler, 500.0);
        let them = human(Variant::Brawler, 420.0);
        assert_eq!(frequency(ai, &me, &them, 200, AiIntent::Move(1)), 200);

        // Harder tiers stand their ground.
        let ai = AiController::new(Difficulty::Normal);
        assert_eq!(frequency(ai, &me, &them, 200, AiIntent::Move(1)), 0);
    }

    #[test]
    fn thrower_far_away_advances() {
        let ai = AiController::new(Difficulty::Normal);
        let me = bot(Variant::Thrower, 600.0);
        let them = human(Variant::Dasher, 200.0);
        assert_eq!(frequency(ai, &me, &them, 500, AiIntent::Move(-1)), 500);
        assert_eq!(frequency(ai, &me, &them, 500, AiIntent::Special), 0);
    }

    #[test]
    fn thrower_backs_off_when_crowded() {
        let ai = AiController::new(Difficulty::Hard);
        let me = bot(Variant::Thrower, 300.0);
        let them = human(Variant::Brawler, 200.0);
        assert_eq!(frequency(ai, &me, &them, 100, AiIntent::Move(1)), 100);
    }

    #[test]
    fn thrower_in_range_attacks_only_when_ready() {
        let ai = AiController::new(Difficulty::Insane);
        let mut me = bot(Variant::Thrower, 450.0);
        let mut them = human(Variant::Brawler, 200.0);
        let attacks = frequency(ai, &me, &them, 5000, AiIntent::Special);
        // 0.06 per tick.
        assert!((200..=400).contains(&attacks), "attacks={attacks}");

        let config = DuelConfig::default();
        let mut scheduler = Scheduler::new();
        let mut events = Vec::new();
        let mut shells = ShellSystem::new();
        let mut ctx = ActionCtx::new(&mut scheduler, &config, &mut events);
        me.face(-1.0);
        assert!(me.special_attack(&mut them, &mut ctx, &mut shells));
        assert_eq!(frequency(ai, &me, &them, 5000, AiIntent::Special), 0);
    }

    #[test]
    fn dasher_attack_rate_follows_profile() {
        let ai = AiController::new(Difficulty::Insane);
        let me = bot(Variant::Dasher, 500.0);
        let them = human(Variant::Brawler, 400.0);
        let attacks = frequency(ai, &me, &them, 10_000, AiIntent::Special);
        // 0.04 per tick.
        assert!((250..=550).contains(&attacks), "attacks={attacks}");
    }

    #[test]
    fn dasher_hops_sometimes() {
        let ai = AiController::new(Difficulty::Hard);
        let me = bot(Variant::Dasher, 700.0);
        let them = human(Variant::Brawler, 100.0);
        let hops = frequency(ai, &me, &them, 10_000, AiIntent::Jump);
        // 0.03 per tick.
        assert!((180..=420).contains(&hops), "hops={hops}");
    }

    #[test]
    fn brawler_jumps_over_incoming_dash() {
        let ai = AiController::new(Difficulty::Insane);
        let mut them = human(Variant::Dasher, 400.0);
        let mut me = bot(Variant::Brawler, 500.0);
        start_dash(&mut them, &mut me);

        let jumps = frequency(ai, &me, &them, 2000, AiIntent::Jump);
        // 0.9 smartness.
        assert!((1700..=1900).contains(&jumps), "jumps={jumps}");
    }

    #[test]
    fn thrower_counters_incoming_dash() {
        let ai = AiController::new(Difficulty::Insane);
        let mut them = human(Variant::Dasher, 400.0);
        let mut me = bot(Variant::Thrower, 500.0);
        start_dash(&mut them, &mut me);

        let counters = frequency(ai, &me, &them, 2000, AiIntent::SpecialAfter(COUNTER_DELAY));
        // 0.9 smartness, then 0.72 for the follow-up.
        assert!((1150..=1450).contains(&counters), "counters={counters}");
    }
}
