//! Demo battle between a scoring AI and a random AI.
//!
//! Set `RUST_LOG=debug` to see individual rolls.

use clap::Parser;
use creature_battle::battle::ai::{Behavior, RandomAI, ScoringAI};
use creature_battle::battle::rules::BattleRules;
use creature_battle::{
    begin_battle, end_battle, resolve_turn, BattleAction, BattleContext, Combatant, MemoryCatalog,
    SpeciesId, TurnRng,
};
use std::error::Error;
use std::num::ParseIntError;
use std::path::PathBuf;
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

const TURN_LIMIT: u32 = 100;

/// Two AIs fight one battle over a RON catalog.
#[derive(Parser)]
#[command(name = "battle-sim", version, long_about = None)]
struct Options {
    /// Catalog of moves, species, abilities and items.
    #[arg(default_value = "data/catalog.ron")]
    catalog: PathBuf,

    /// RNG seed, or `random` for OS entropy.
    #[arg(default_value = "42", value_parser = parse_seed)]
    seed: Seed,

    #[arg(default_value = "embear")]
    player_species: String,

    #[arg(default_value = "tidra")]
    opponent_species: String,

    /// Level for both combatants.
    #[arg(long, default_value_t = 30)]
    level: u8,

    /// Optional RON file overriding the battle rules.
    #[arg(long)]
    rules: Option<PathBuf>,

    /// Print each turn as one JSON object.
    #[arg(long)]
    json: bool,
}

#[derive(Debug, Clone, Copy)]
enum Seed {
    Fixed(u64),
    Random,
}

fn parse_seed(value: &str) -> Result<Seed, ParseIntError> {
    match value {
        "random" => Ok(Seed::Random),
        seed => seed.parse().map(Seed::Fixed),
    }
}

fn main() -> Result<(), Box<dyn Error>> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .with_writer(std::io::stderr)
        .init();

    let options = Options::parse();
    let catalog = MemoryCatalog::load(&options.catalog)?;
    let rules = match &options.rules {
        Some(path) => BattleRules::load(path)?,
        None => BattleRules::default(),
    };

    let mut player = Combatant::from_species(
        &catalog,
        "player",
        &SpeciesId::from(options.player_species.as_str()),
        options.level,
        None,
    )?;
    let mut opponent = Combatant::from_species(
        &catalog,
        "opponent",
        &SpeciesId::from(options.opponent_species.as_str()),
        options.level,
        None,
    )?;

    let battle_id = match options.seed {
        Seed::Fixed(seed) => format!("sim-{}", seed),
        Seed::Random => "sim-random".to_string(),
    };
    let mut context = BattleContext::new(
        battle_id,
        player.id.clone(),
        opponent.id.clone(),
    )
    .with_rules(rules);
    let mut rng = match options.seed {
        Seed::Fixed(seed) => TurnRng::from_seed(seed),
        Seed::Random => TurnRng::new_random(),
    };
    let player_ai = ScoringAI::new();
    let opponent_ai = RandomAI;

    println!(
        "{} (Lv. {}) vs {} (Lv. {})",
        player.name, player.level, opponent.name, opponent.level
    );
    for event in begin_battle(&catalog, &mut context, &player, &opponent)? {
        if let Some(message) = event.format() {
            println!("{}", message);
        }
    }

    while context.turn_number <= TURN_LIMIT {
        let player_action = choose(&player_ai, &catalog, &context, &player, &opponent, &mut rng)?;
        let opponent_action =
            choose(&opponent_ai, &catalog, &context, &opponent, &player, &mut rng)?;

        let turn = resolve_turn(
            &catalog,
            &mut context,
            &mut player,
            &mut opponent,
            player_action,
            opponent_action,
            &mut rng,
        )?;

        if options.json {
            println!("{}", serde_json::to_string(&turn)?);
        } else {
            for line in &turn.effects {
                println!("{}", line);
            }
            println!(
                "  {}: {}/{} HP | {}: {}/{} HP",
                player.name,
                player.current_hp,
                player.max_hp,
                opponent.name,
                opponent.current_hp,
                opponent.max_hp
            );
        }

        if turn.battle_ended {
            break;
        }
    }

    if context.turn_number > TURN_LIMIT {
        warn!(limit = TURN_LIMIT, "turn limit reached");
    }
    end_battle(&mut context);
    info!(turns = context.turn_number - 1, "simulation complete");
    Ok(())
}

/// An AI with nothing usable left gives up and tries to run.
fn choose(
    ai: &dyn Behavior,
    catalog: &MemoryCatalog,
    context: &BattleContext,
    actor: &Combatant,
    target: &Combatant,
    rng: &mut TurnRng,
) -> Result<BattleAction, Box<dyn Error>> {
    Ok(ai
        .decide_action(catalog, context, actor, target, rng)?
        .unwrap_or(BattleAction::Flee { guaranteed: false }))
}
