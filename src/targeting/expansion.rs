//! Expansion target scoring

use serde::{Deserialize, Serialize};

use crate::core::config::AiConfig;
use crate::core::types::{clamp01, Owner, PlanetId};
use crate::world::{Planet, WorldView};

/// A scored neutral planet worth claiming
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ExpansionTarget {
    pub planet: PlanetId,
    /// Nearest owned planet strong enough to take it
    pub attacker: PlanetId,
    /// Target garrison over attacker garrison
    pub difficulty: f32,
    pub value: f32,
    pub viability: f32,
}

/// Score every claimable neutral planet, best first.
pub fn score_expansion_targets(
    world: &impl WorldView,
    side: Owner,
    config: &AiConfig,
) -> Vec<ExpansionTarget> {
    let own_planets = world.planets_owned_by(side);
    let enemy_planets = world.planets_owned_by(side.opponent());
    let mut targets = Vec::new();

    for neutral in world.planets_owned_by(Owner::Neutral) {
        // Nearest owned planet that clearly outguns the garrison
        let attacker = own_planets
            .iter()
            .filter(|p| {
                p.distance_to(neutral) <= config.expansion_range
                    && p.garrison as f32 > neutral.garrison as f32 * 1.5
            })
            .min_by(|a, b| {
                a.distance_to(neutral)
                    .partial_cmp(&b.distance_to(neutral))
                    .unwrap()
            });
        let Some(attacker) = attacker else { continue };

        let difficulty = neutral.garrison as f32 / attacker.garrison.max(1) as f32;

        let supporters = own_planets
            .iter()
            .filter(|p| p.id != attacker.id && p.distance_to(neutral) <= config.expansion_range)
            .count();
        let proximity_bonus = (supporters as f32 * 0.05).min(0.15);

        let hostiles = enemy_planets
            .iter()
            .filter(|p| p.distance_to(neutral) <= config.threat_radius)
            .count();
        let risk = (hostiles as f32 * 0.05).min(0.2);

        targets.push(ExpansionTarget {
            planet: neutral.id,
            attacker: attacker.id,
            difficulty,
            value: clamp01(strategic_value(neutral) + proximity_bonus - risk),
            viability: clamp01(1.0 - difficulty / 1.5),
        });
    }

    targets.sort_by(|a, b| b.value.partial_cmp(&a.value).unwrap());
    targets
}

fn strategic_value(planet: &Planet) -> f32 {
    clamp01(
        (planet.production / 3.0).min(1.0) * 0.5
            + planet.capacity as f32 / 200.0 * 0.3
            + (1.0 - planet.garrison as f32 / 100.0) * 0.2,
    )
}
