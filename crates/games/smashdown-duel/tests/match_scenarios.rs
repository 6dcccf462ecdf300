//! Whole-match scenarios driven through the public `Duel` surface.

use std::time::Duration;

use rand::SeedableRng;
use rand::rngs::StdRng;

use smashdown_core::test_helpers::run_ticks;
use smashdown_core::{FrameDriven, Scheduler};
use smashdown_duel::{
    ActionCtx, AiController, AiIntent, Difficulty, Duel, DuelConfig, Fighter, FighterState,
    InputCommand, MatchEvent, MatchSetup, OpponentPick, Slot, Variant,
};

fn setup(player: Variant, opponent: Variant, difficulty: Difficulty) -> MatchSetup {
    MatchSetup {
        player,
        opponent: OpponentPick::Fixed(opponent),
        difficulty,
        autopilot: false,
        seed: Some(7),
    }
}

const PUNCH: InputCommand = InputCommand {
    move_dir: 0,
    jump: false,
    basic_attack: true,
    special_attack: false,
};

#[test]
fn mashing_punches_wins_against_a_bot_facing_away() {
    let mut duel = Duel::default();
    duel.start(&setup(Variant::Brawler, Variant::Brawler, Difficulty::Normal))
        .unwrap();
    // Inside the bot's reach band, so it never walks and keeps facing right.
    duel.fighter_mut(Slot::Two).unwrap().teleport(150.0, 0.0);

    let mut hits = 0;
    let mut over_events = 0;
    let mut ticks = 0;
    while !duel.is_over() && ticks < 2000 {
        duel.queue_command(PUNCH);
        for event in duel.tick() {
            match event {
                MatchEvent::Hit {
                    attacker: Slot::One,
                    ..
                } => hits += 1,
                MatchEvent::MatchOver { .. } => over_events += 1,
                _ => {},
            }
        }
        ticks += 1;
    }

    assert!(duel.is_over(), "match should end");
    assert_eq!(duel.winner(), Some(Slot::One));
    assert_eq!(hits, 20);
    assert_eq!(over_events, 1);
    // One punch per 1000ms cooldown.
    assert!((1100..=1250).contains(&ticks), "ended after {ticks} ticks");

    let frozen = duel.snapshot();
    assert_eq!(frozen.fighters[0].state, FighterState::Win);
    assert_eq!(frozen.fighters[1].state, FighterState::Fail);
    duel.queue_command(PUNCH);
    assert!(run_ticks(&mut duel, 30).is_empty());
    assert_eq!(duel.snapshot(), frozen);
}

#[test]
fn thrown_shell_bounces_out_of_the_arena() {
    let mut duel = Duel::default();
    duel.start(&setup(Variant::Thrower, Variant::Brawler, Difficulty::Easy))
        .unwrap();
    duel.queue_command(InputCommand {
        special_attack: true,
        ..InputCommand::default()
    });

    let mut thrown = None;
    let mut expired = None;
    let mut last_bounces = 0;
    for tick in 0..1000 {
        for event in duel.tick() {
            match event {
                MatchEvent::ShellThrown { id, owner } => {
                    assert_eq!(owner, Slot::One);
                    thrown = Some(id);
                },
                MatchEvent::ShellExpired { id } => expired = Some((id, tick)),
                _ => {},
            }
        }
        if let Some(shell) = duel.shells().first() {
            assert!(shell.bounces >= last_bounces, "bounce count went down");
            assert!(shell.bounces < 3);
            last_bounces = shell.bounces;
        }
        if expired.is_some() {
            break;
        }
    }

    let id = thrown.expect("shell thrown on the first tick");
    let (expired_id, _) = expired.expect("shell should expire");
    assert_eq!(expired_id, id);
    assert!(duel.shells().is_empty());
    assert_eq!(duel.fighter(Slot::One).unwrap().health(), 100.0);
}

#[test]
fn airborne_dashers_bounce_apart() {
    let config = DuelConfig::default();
    let mut scheduler = Scheduler::new();
    let mut events = Vec::new();
    let mut ctx = ActionCtx::new(&mut scheduler, &config, &mut events);

    let mut a = Fighter::new(Slot::One, Variant::Dasher, 100.0, false);
    let mut b = Fighter::new(Slot::Two, Variant::Dasher, 140.0, true);
    a.teleport(100.0, -60.0);
    b.teleport(140.0, -60.0);

    a.update(&mut b, &mut ctx);
    b.update(&mut a, &mut ctx);

    assert_eq!(a.body().vx, -10.0);
    assert_eq!(b.body().vx, 10.0);
    assert_eq!(a.body().vy, -10.0);
    assert_eq!(b.body().vy, -10.0);
    assert_eq!(a.health(), 100.0);
    assert_eq!(b.health(), 100.0);
    assert!(events.is_empty());
}

#[test]
fn distant_thrower_bot_mostly_advances() {
    let config = DuelConfig::default();
    let ai = AiController::new(Difficulty::Normal);
    let me = Fighter::new(Slot::Two, Variant::Thrower, 500.0, true);
    let them = Fighter::new(Slot::One, Variant::Brawler, 100.0, false);
    let mut rng = StdRng::seed_from_u64(99);

    let advances = (0..1000)
        .filter(|_| {
            ai.decide(&me, Some(&them), false, &config, Duration::ZERO, &mut rng)
                .contains(&AiIntent::Move(-1))
        })
        .count();
    assert!(advances >= 950, "advanced {advances}/1000");
}

#[test]
fn autopilot_match_keeps_invariants() {
    let mut duel = Duel::default();
    duel.start(&MatchSetup {
        player: Variant::Dasher,
        opponent: OpponentPick::Fixed(Variant::Thrower),
        difficulty: Difficulty::Insane,
        autopilot: true,
        seed: Some(2024),
    })
    .unwrap();
    assert!(duel.snapshot().fighters.iter().all(|f| f.ai_controlled));

    let max_x = duel.config().max_fighter_x();
    for _ in 0..3600 {
        duel.tick();
        let snap = duel.snapshot();
        for f in &snap.fighters {
            assert!(f.health <= 100);
            assert!((0.0..=max_x).contains(&f.x));
            assert!(f.y <= 0.0);
        }
        if snap.game_over {
            assert!(snap.winner_slot.is_some());
            break;
        }
    }
}

#[test]
fn pre_start_snapshot_is_empty_json() {
    let duel = Duel::default();
    let json = serde_json::to_value(duel.snapshot()).unwrap();
    assert_eq!(json["fighters"], serde_json::json!([]));
    assert_eq!(json["game_over"], serde_json::json!(false));
    assert!(json["winner_slot"].is_null());
}
