//! Headless battle simulator.
//!
//! Loads `config.toml` and `database.ron` from a data directory, fights one
//! troop with automatic party commands and prints the summary as JSON.

use std::path::PathBuf;

use anyhow::{Context, Result};
use battle_content::ContentFactory;
use battle_core::BattleSystem;
use battle_runtime::{BattleRuntime, Encounter, RuntimeConfig};
use clap::Parser;
use tracing::info;

#[derive(Parser)]
#[command(name = "battle-sim", about = "Run one automatic battle and print the outcome")]
struct Args {
    /// Directory containing config.toml and database.ron
    #[arg(long, value_name = "DIR", default_value = "data")]
    data: PathBuf,

    /// Troop to fight
    #[arg(long, value_name = "ID")]
    troop: u32,

    /// RNG seed (random when omitted)
    #[arg(long)]
    seed: Option<u64>,

    /// Overrides the configured battle system
    #[arg(long, value_enum)]
    system: Option<SystemArg>,

    /// Give up after this many ticks
    #[arg(long, default_value_t = 100_000)]
    max_ticks: u64,

    /// Forbid escaping
    #[arg(long)]
    no_escape: bool,

    /// Allow losing (the party is revived afterwards)
    #[arg(long)]
    can_lose: bool,

    /// Roll preemptive and surprise odds before the battle
    #[arg(long)]
    random_encounter: bool,
}

#[derive(Clone, Copy, clap::ValueEnum)]
enum SystemArg {
    /// Strict turns
    Turn,
    /// Active time bars
    Active,
    /// Time bars that wait for input
    Wait,
}

impl From<SystemArg> for BattleSystem {
    fn from(arg: SystemArg) -> Self {
        match arg {
            SystemArg::Turn => BattleSystem::TurnBased,
            SystemArg::Active => BattleSystem::ActiveTimeBar,
            SystemArg::Wait => BattleSystem::WaitTimeBar,
        }
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .with_writer(std::io::stderr)
        .init();

    let args = Args::parse();

    let factory = ContentFactory::new(&args.data);
    let (mut config, db) = factory
        .load_all()
        .with_context(|| format!("loading content from {}", args.data.display()))?;
    if let Some(system) = args.system {
        config.battle_system = system.into();
    }

    let seed = args.seed.unwrap_or_else(rand::random);
    info!(seed, troop = args.troop, system = %config.battle_system, "starting simulation");

    let runtime = BattleRuntime::builder(db, config)
        .runtime_config(RuntimeConfig {
            encounter_rolls: args.random_encounter,
            ..RuntimeConfig::default()
        })
        .encounter(Encounter {
            troop_id: args.troop,
            can_escape: !args.no_escape,
            can_lose: args.can_lose,
        })
        .seed(seed)
        .build()?;

    let (handle, worker) = runtime.spawn();
    let summary = handle.run_to_end(args.max_ticks).await?;
    drop(handle);
    worker.await?;

    let output = serde_json::json!({
        "seed": seed,
        "summary": summary,
    });
    println!("{}", serde_json::to_string_pretty(&output)?);
    Ok(())
}
