//! Headless AI-vs-AI skirmish
//!
//! Generates a random map, puts two agents with different personalities in
//! charge of the combatant roles, and runs the pipeline until one side is
//! wiped out or the tick limit is reached. Prints a JSON summary at the end.

use rand::Rng;
use rand_chacha::rand_core::SeedableRng;
use rand_chacha::ChaCha8Rng;
use serde::Serialize;

use nova_vanguard::core::config::AiConfig;
use nova_vanguard::core::types::{Owner, PlanetId, Vec2};
use nova_vanguard::world::sim::GameWorld;
use nova_vanguard::world::{Planet, WorldView};
use nova_vanguard::AiPlayer;

#[derive(Serialize)]
struct SkirmishSummary {
    ticks: u64,
    winner: Option<String>,
    ai_planets: usize,
    player_planets: usize,
    neutral_planets: usize,
    ai_strategies: u64,
    ai_successful: u64,
    player_strategies: u64,
    player_successful: u64,
}

fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "nova_vanguard=info".into()),
        )
        .init();

    tracing::info!("skirmish starting");

    let seed = std::env::args()
        .nth(1)
        .and_then(|s| s.parse().ok())
        .unwrap_or(42);
    let mut world = generate_world(seed);

    let mut aggressor_config = AiConfig::default();
    aggressor_config.aggressiveness = 0.85;
    aggressor_config.risk_tolerance = 0.7;

    let mut ai = AiPlayer::new(Owner::Ai, aggressor_config).expect("valid config");
    let mut player = AiPlayer::new(Owner::Player, AiConfig::default()).expect("valid config");

    let mut ticks = 0u64;
    let winner = loop {
        ai.tick(&mut world);
        player.tick(&mut world);
        world.step(1.0);
        ticks += 1;

        let (player_planets, ai_planets, _) = world.owned_counts();
        if ai_planets == 0 {
            break Some("player".to_string());
        }
        if player_planets == 0 {
            break Some("ai".to_string());
        }
        if ticks >= 600 {
            break None;
        }
    };

    let (player_planets, ai_planets, neutral_planets) = world.owned_counts();
    let summary = SkirmishSummary {
        ticks,
        winner,
        ai_planets,
        player_planets,
        neutral_planets,
        ai_strategies: ai.executor().metrics().total_strategies,
        ai_successful: ai.executor().metrics().successful_strategies,
        player_strategies: player.executor().metrics().total_strategies,
        player_successful: player.executor().metrics().successful_strategies,
    };

    tracing::info!(
        ticks,
        fleets_in_flight = world.fleets().len(),
        "skirmish finished"
    );
    println!(
        "{}",
        serde_json::to_string_pretty(&summary).expect("summary serializes")
    );
}

/// Two mirrored home planets plus a scatter of neutrals
fn generate_world(seed: u64) -> GameWorld {
    let mut rng = ChaCha8Rng::seed_from_u64(seed);
    let mut world = GameWorld::new();

    let mut home = Planet::new(PlanetId(0), Vec2::new(50.0, 250.0), Owner::Ai, 50);
    home.production = 2.0;
    world.add_planet(home);

    let mut home = Planet::new(PlanetId(1), Vec2::new(450.0, 250.0), Owner::Player, 50);
    home.production = 2.0;
    world.add_planet(home);

    for id in 2..14u32 {
        let mut planet = Planet::new(
            PlanetId(id),
            Vec2::new(rng.gen_range(80.0..420.0), rng.gen_range(60.0..440.0)),
            Owner::Neutral,
            rng.gen_range(5..35),
        );
        planet.production = rng.gen_range(0.5..2.5);
        planet.capacity = rng.gen_range(60..150);
        world.add_planet(planet);
    }

    world
}
