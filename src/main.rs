//! Headless cloak skirmish runner
//!
//! Spawns a cloaked submarine and a detector patrol, random-walks the patrol
//! with a seeded RNG, and reports how often the submarine was exposed.
//! The same seed always produces the same summary and sync hash.

use std::path::PathBuf;

use clap::Parser;
use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;
use serde::Serialize;

use cloak_sim::cloak::CloakEvent;
use cloak_sim::core::error::Result;
use cloak_sim::core::types::{CellPos, FactionId};
use cloak_sim::rules::RulesCatalog;
use cloak_sim::simulation::CloakWorld;
use cloak_sim::visibility::ObserverContext;

const HUNTED: FactionId = FactionId(1);
const HUNTER: FactionId = FactionId(2);

/// Cloak skirmish runner - seeded submarine hunt
#[derive(Parser, Debug)]
#[command(name = "cloak-sim")]
#[command(about = "Run a seeded submarine hunt and report cloak exposure")]
struct Args {
    /// Rules file with actor types and factions
    #[arg(long, default_value = "data/rules.toml")]
    rules: PathBuf,

    /// Number of ticks to simulate
    #[arg(long, default_value_t = 120)]
    ticks: u64,

    /// Random seed for deterministic runs
    #[arg(long)]
    seed: Option<u64>,

    /// Cloaked actor type for the hunted side
    #[arg(long, default_value = "submarine")]
    cloaked: String,

    /// Detector actor type for the hunting side
    #[arg(long, default_value = "destroyer")]
    detector: String,

    /// Starting distance between the two actors (cells)
    #[arg(long, default_value_t = 8)]
    distance: i32,

    /// Submarine fires every N ticks (0 = never)
    #[arg(long, default_value_t = 0)]
    attack_every: u64,

    /// Output format: json or text
    #[arg(long, default_value = "json")]
    format: String,

    /// Query through the omniscient spectator view instead of the hunter's
    #[arg(long)]
    observer_omniscient: bool,

    /// Enable verbose cue logging
    #[arg(long, short = 'v')]
    verbose: bool,
}

/// JSON output structure
#[derive(Serialize)]
struct HuntResult {
    ticks: u64,
    cloak_cues: usize,
    uncloak_cues: usize,
    ticks_cloaked: u64,
    ticks_exposed: u64,
    first_exposed_tick: Option<u64>,
    final_distance: u32,
    sync_hash: String,
    seed: u64,
}

fn main() -> Result<()> {
    let args = Args::parse();

    let filter = if args.verbose { "cloak_sim=debug" } else { "cloak_sim=info" };
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();

    let seed = args.seed.unwrap_or_else(rand::random);
    let mut rng = ChaCha8Rng::seed_from_u64(seed);

    let rules = RulesCatalog::load_from_toml(&args.rules)?;
    let mut world = CloakWorld::new(rules)?;

    let sub = world.spawn_unit(&args.cloaked, HUNTED, CellPos::new(0, 0))?;
    let hunter = world.spawn_unit(&args.detector, HUNTER, CellPos::new(args.distance, 0))?;
    world.sync_detectors();

    let observer = if args.observer_omniscient {
        ObserverContext::spectator()
    } else {
        ObserverContext::for_faction(HUNTER)
    };

    tracing::info!("Hunt started with seed {}", seed);

    let mut cloak_cues = 0;
    let mut uncloak_cues = 0;
    let mut ticks_cloaked = 0;
    let mut ticks_exposed = 0;
    let mut first_exposed_tick = None;
    let mut hunter_pos = CellPos::new(args.distance, 0);

    for _ in 0..args.ticks {
        // Patrol drifts one cell at most per tick
        let step = CellPos::new(rng.gen_range(-1..=1), rng.gen_range(-1..=1));
        hunter_pos = hunter_pos + step;
        world.move_unit(hunter, hunter_pos)?;

        if args.attack_every > 0 && world.current_tick > 0 && world.current_tick % args.attack_every == 0 {
            world.notify_attack(sub)?;
        }

        world.tick();

        let cloaked = world
            .unit(sub)
            .and_then(|u| u.cloak.as_ref())
            .map(|c| c.is_cloaked())
            .unwrap_or(false);
        if !cloaked {
            continue;
        }

        ticks_cloaked += 1;
        // Cloaked but still visible means a detector has it
        if world.is_visible(sub, &observer)? {
            ticks_exposed += 1;
            first_exposed_tick.get_or_insert(world.current_tick);
        }
    }

    for logged in world.drain_events() {
        match logged.event {
            CloakEvent::Cloaked { .. } => cloak_cues += 1,
            CloakEvent::Uncloaked { .. } => uncloak_cues += 1,
        }
    }

    let result = HuntResult {
        ticks: world.current_tick,
        cloak_cues,
        uncloak_cues,
        ticks_cloaked,
        ticks_exposed,
        first_exposed_tick,
        final_distance: CellPos::new(0, 0).distance(&hunter_pos),
        sync_hash: format!("{:016x}", world.sync_hash()),
        seed,
    };

    match args.format.as_str() {
        "text" => {
            println!("=== Hunt Result ===");
            println!("Ticks:            {}", result.ticks);
            println!("Cloak cues:       {}", result.cloak_cues);
            println!("Uncloak cues:     {}", result.uncloak_cues);
            println!("Ticks cloaked:    {}", result.ticks_cloaked);
            println!("Ticks exposed:    {}", result.ticks_exposed);
            match result.first_exposed_tick {
                Some(tick) => println!("First exposed:    tick {}", tick),
                None => println!("First exposed:    never"),
            }
            println!("Final distance:   {}", result.final_distance);
            println!("Sync hash:        {}", result.sync_hash);
            println!("Seed:             {}", result.seed);
        }
        _ => println!("{}", serde_json::to_string_pretty(&result)?),
    }

    Ok(())
}
