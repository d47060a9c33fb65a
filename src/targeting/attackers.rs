//! Attacker-combination selection
//!
//! Greedy accumulation: rank candidate planets by effectiveness and keep
//! adding them until the committed force clears the required strength ratio
//! or the attacker cap is hit.

use serde::{Deserialize, Serialize};

use crate::core::config::AiConfig;
use crate::core::types::{clamp01, Owner, PlanetId};
use crate::world::{Planet, WorldView};

/// One planet committed to an attack
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AttackerPick {
    pub planet: PlanetId,
    pub effectiveness: f32,
    /// Ships this planet would actually send
    pub committed: u32,
    pub distance: f32,
}

/// Rank candidate attackers for `target` and greedily pick a combination.
pub fn select_attackers(
    world: &impl WorldView,
    side: Owner,
    target: PlanetId,
    count: usize,
    config: &AiConfig,
) -> Vec<AttackerPick> {
    let Some(target_planet) = world.planet(target) else {
        return Vec::new();
    };

    let mut candidates: Vec<(f32, f32, &Planet)> = world
        .planets_owned_by(side)
        .into_iter()
        .filter(|p| p.id != target && p.garrison > config.min_ships_to_attack)
        .filter_map(|p| {
            let distance = p.distance_to(target_planet);
            if distance > config.attack_support_radius {
                return None;
            }
            Some((effectiveness(p, distance, config), distance, p))
        })
        .collect();

    candidates.sort_by(|a, b| b.0.partial_cmp(&a.0).unwrap());

    let required = target_planet.garrison as f32 * config.strength_ratio_attack;
    let cap = count.min(config.max_attackers);
    let mut picks = Vec::new();
    let mut accumulated = 0.0;

    for (effectiveness, distance, planet) in candidates {
        if picks.len() >= cap || accumulated >= required {
            break;
        }
        let committed = (planet.garrison as f32 * config.attack_percentage).floor() as u32;
        if committed == 0 {
            continue;
        }
        accumulated += committed as f32;
        picks.push(AttackerPick {
            planet: planet.id,
            effectiveness,
            committed,
            distance,
        });
    }

    picks
}

/// Efficiency x availability x positioning, each in [0, 1]
fn effectiveness(planet: &Planet, distance: f32, config: &AiConfig) -> f32 {
    let efficiency = (planet.garrison as f32 / 100.0).min(1.0);
    let availability = clamp01(
        (planet.garrison.saturating_sub(config.min_ships_to_defend)) as f32
            / planet.garrison.max(1) as f32,
    );
    let positioning = clamp01(1.0 - distance / config.attack_support_radius);
    efficiency * availability * positioning
}
