use tracing_subscriber::EnvFilter;

use smashdown_core::{FrameDriven, run_until_over};
use smashdown_duel::{Duel, MatchSetup, SetupError};

/// Ten minutes of match time at 60 ticks/s.
const DEFAULT_MAX_TICKS: usize = 36_000;

#[derive(Debug, Clone, PartialEq)]
struct SimArgs {
    player: String,
    opponent: String,
    difficulty: String,
    seed: Option<u64>,
    max_ticks: usize,
    json: bool,
}

impl Default for SimArgs {
    fn default() -> Self {
        Self {
            player: "dasher".to_string(),
            opponent: "random".to_string(),
            difficulty: "normal".to_string(),
            seed: None,
            max_ticks: DEFAULT_MAX_TICKS,
            json: false,
        }
    }
}

impl SimArgs {
    /// `--key=value` flags in any order. Unknown flags and unparseable numbers
    /// are logged and ignored.
    fn parse(args: impl IntoIterator<Item = String>) -> Self {
        let mut parsed = Self::default();
        for arg in args {
            if arg == "--json" {
                parsed.json = true;
            } else if let Some(v) = arg.strip_prefix("--player=") {
                parsed.player = v.to_string();
            } else if let Some(v) = arg.strip_prefix("--opponent=") {
                parsed.opponent = v.to_string();
            } else if let Some(v) = arg.strip_prefix("--difficulty=") {
                parsed.difficulty = v.to_string();
            } else if let Some(v) = arg.strip_prefix("--seed=") {
                match v.parse::<u64>() {
                    Ok(seed) => parsed.seed = Some(seed),
                    Err(e) => tracing::warn!("Ignoring --seed={v}: {e}"),
                }
            } else if let Some(v) = arg.strip_prefix("--max-ticks=") {
                match v.parse::<usize>() {
                    Ok(n) => parsed.max_ticks = n,
                    Err(e) => tracing::warn!("Ignoring --max-ticks={v}: {e}"),
                }
            } else {
                tracing::warn!("Ignoring unknown argument {arg}");
            }
        }
        parsed
    }

    fn setup(&self) -> Result<MatchSetup, SetupError> {
        let mut setup = MatchSetup::from_names(&self.player, &self.opponent, &self.difficulty)?;
        setup.autopilot = true;
        setup.seed = self.seed;
        Ok(setup)
    }
}

fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .init();

    let args = SimArgs::parse(std::env::args().skip(1));
    let setup = match args.setup() {
        Ok(setup) => setup,
        Err(e) => {
            tracing::error!("Invalid match setup: {e}");
            std::process::exit(2);
        },
    };

    let mut duel = Duel::new();
    if let Err(e) = duel.start(&setup) {
        tracing::error!("Failed to start match: {e}");
        std::process::exit(2);
    }

    let ticks = run_until_over(&mut duel, args.max_ticks);
    let snapshot = duel.snapshot();

    if args.json {
        match serde_json::to_string_pretty(&snapshot) {
            Ok(json) => println!("{json}"),
            Err(e) => {
                tracing::error!("Failed to encode snapshot: {e}");
                std::process::exit(1);
            },
        }
        return;
    }

    match (ticks, snapshot.winner_slot) {
        (Some(n), Some(slot)) => {
            let fighter = &snapshot.fighters[usize::from(slot - 1)];
            println!(
                "Player {slot} ({}) wins after {n} ticks ({} ms)",
                fighter.variant, snapshot.time_ms
            );
        },
        _ => println!(
            "No winner after {} ticks ({} ms)",
            args.max_ticks, snapshot.time_ms
        ),
    }
    for f in &snapshot.fighters {
        println!("  P{} {:<8} health {:>3}", f.slot, f.variant.to_string(), f.health);
    }
}
