//! Opportunity detection
//!
//! Openings the agent could act on this tick: neutral planets we can claim,
//! enemy planets we can overwhelm, and our own planets that need shoring up.

use crate::analysis::snapshot::{Opportunity, OpportunityKind};
use crate::core::config::AiConfig;
use crate::core::types::{clamp01, Owner, PlanetId};
use crate::targeting::attack::success_probability;
use crate::world::{Planet, WorldView};

/// Scan the world for opportunities for `side`, sorted by value descending.
pub fn detect_opportunities(
    world: &impl WorldView,
    side: Owner,
    config: &AiConfig,
) -> Vec<Opportunity> {
    let own_planets = world.planets_owned_by(side);
    let enemy_planets = world.planets_owned_by(side.opponent());
    let neutral_planets = world.planets_owned_by(Owner::Neutral);

    let mut opportunities = Vec::new();

    // Expansion: neutral planets with a clearly stronger owned planet nearby
    for neutral in &neutral_planets {
        let actors: Vec<&Planet> = own_planets
            .iter()
            .filter(|p| {
                p.distance_to(neutral) <= config.expansion_range
                    && p.garrison as f32 > neutral.garrison as f32 * 1.5
            })
            .copied()
            .collect();
        if actors.is_empty() {
            continue;
        }

        let strongest = actors.iter().map(|p| p.garrison).max().unwrap_or(1).max(1);
        let difficulty = neutral.garrison as f32 / strongest as f32;
        opportunities.push(Opportunity {
            kind: OpportunityKind::Expansion,
            target: neutral.id,
            value: strategic_value(neutral),
            viability: clamp01(1.0 - difficulty / 1.5),
            actors: actor_ids(&actors),
        });
    }

    // Attack: enemy planets our combined nearby strength can overwhelm
    for enemy in &enemy_planets {
        let actors: Vec<&Planet> = own_planets
            .iter()
            .filter(|p| p.distance_to(enemy) <= config.attack_support_radius)
            .copied()
            .collect();
        let combined: u32 = actors.iter().map(|p| p.garrison).sum();
        let ratio = combined as f32 / enemy.garrison.max(1) as f32;
        if ratio <= config.strength_ratio_attack {
            continue;
        }

        let value = clamp01(
            success_probability(ratio) * 0.5
                + (enemy.production / 3.0).min(1.0) * 0.3
                + (1.0 - enemy.garrison as f32 / 100.0) * 0.2,
        );
        opportunities.push(Opportunity {
            kind: OpportunityKind::Attack,
            target: enemy.id,
            value,
            viability: clamp01(ratio / (config.strength_ratio_attack * 2.0)),
            actors: actor_ids(&actors),
        });
    }

    // Reinforce: our own planets below the defend floor, if help is in range
    for weak in &own_planets {
        if weak.garrison >= config.min_ships_to_defend {
            continue;
        }
        let actors: Vec<&Planet> = own_planets
            .iter()
            .filter(|p| {
                p.id != weak.id
                    && p.garrison > config.min_ships_to_defend * 2
                    && p.distance_to(weak) <= config.reinforce_range
            })
            .copied()
            .collect();
        if actors.is_empty() {
            continue;
        }

        let shortfall = 1.0 - weak.garrison as f32 / config.min_ships_to_defend.max(1) as f32;
        opportunities.push(Opportunity {
            kind: OpportunityKind::Reinforce,
            target: weak.id,
            value: clamp01(0.5 + 0.5 * shortfall),
            viability: clamp01(0.3 + 0.2 * actors.len() as f32),
            actors: actor_ids(&actors),
        });
    }

    opportunities.sort_by(|a, b| b.value.partial_cmp(&a.value).unwrap());
    opportunities
}

/// How desirable a planet is to hold, independent of who holds it
fn strategic_value(planet: &Planet) -> f32 {
    clamp01(
        (planet.production / 3.0).min(1.0) * 0.5
            + planet.capacity as f32 / 200.0 * 0.3
            + (1.0 - planet.garrison as f32 / 100.0) * 0.2,
    )
}

fn actor_ids(actors: &[&Planet]) -> Vec<PlanetId> {
    actors.iter().map(|p| p.id).collect()
}
