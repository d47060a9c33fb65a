//! Attack target scoring

use serde::{Deserialize, Serialize};

use crate::core::config::AiConfig;
use crate::core::types::{clamp01, Owner, PlanetId};
use crate::world::WorldView;

/// Step table mapping a strength ratio to an attack success probability.
///
/// The cutoffs are balance-tuned; there is deliberately no interpolation
/// between bands.
pub fn success_probability(ratio: f32) -> f32 {
    if ratio >= 2.0 {
        0.9
    } else if ratio >= 1.5 {
        0.75
    } else if ratio >= 1.2 {
        0.6
    } else if ratio >= 1.0 {
        0.45
    } else {
        0.2
    }
}

/// A scored enemy planet worth assaulting
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AttackTarget {
    pub planet: PlanetId,
    /// Total garrison of owned planets within support range
    pub combined_strength: u32,
    /// Combined strength over target garrison
    pub ratio: f32,
    pub success_probability: f32,
    /// Expected ships lost out of the committed force
    pub estimated_losses: f32,
    pub value: f32,
    pub viability: f32,
}

/// Score every enemy planet against our nearby combined strength, best first.
pub fn score_attack_targets(
    world: &impl WorldView,
    side: Owner,
    config: &AiConfig,
) -> Vec<AttackTarget> {
    let own_planets = world.planets_owned_by(side);
    let mut targets = Vec::new();

    for enemy in world.planets_owned_by(side.opponent()) {
        let combined_strength: u32 = own_planets
            .iter()
            .filter(|p| p.distance_to(enemy) <= config.attack_support_radius)
            .map(|p| p.garrison)
            .sum();
        if combined_strength == 0 {
            continue;
        }

        let ratio = combined_strength as f32 / enemy.garrison.max(1) as f32;
        let probability = success_probability(ratio);
        let committed = combined_strength as f32 * config.attack_percentage;

        targets.push(AttackTarget {
            planet: enemy.id,
            combined_strength,
            ratio,
            success_probability: probability,
            estimated_losses: committed * (1.0 - probability),
            value: clamp01(
                probability * 0.5
                    + (enemy.production / 3.0).min(1.0) * 0.3
                    + (1.0 - enemy.garrison as f32 / 100.0) * 0.2,
            ),
            viability: clamp01(ratio / config.strength_ratio_attack),
        });
    }

    targets.sort_by(|a, b| b.value.partial_cmp(&a.value).unwrap());
    targets
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::types::Vec2;
    use crate::world::sim::GameWorld;
    use crate::world::Planet;
    use proptest::prelude::*;

    #[test]
    fn test_success_probability_bands() {
        assert_eq!(success_probability(2.5), 0.9);
        assert_eq!(success_probability(2.0), 0.9);
        assert_eq!(success_probability(1.99), 0.75);
        assert_eq!(success_probability(1.5), 0.75);
        assert_eq!(success_probability(1.49), 0.6);
        assert_eq!(success_probability(1.2), 0.6);
        assert_eq!(success_probability(1.19), 0.45);
        assert_eq!(success_probability(1.0), 0.45);
        assert_eq!(success_probability(0.99), 0.2);
        assert_eq!(success_probability(0.1), 0.2);
    }

    proptest! {
        #[test]
        fn prop_success_probability_is_step_exact(ratio in 0.0f32..10.0) {
            let p = success_probability(ratio);
            let expected = if ratio >= 2.0 {
                0.9
            } else if ratio >= 1.5 {
                0.75
            } else if ratio >= 1.2 {
                0.6
            } else if ratio >= 1.0 {
                0.45
            } else {
                0.2
            };
            prop_assert_eq!(p, expected);
        }

        #[test]
        fn prop_success_probability_monotonic(a in 0.0f32..10.0, b in 0.0f32..10.0) {
            let (lo, hi) = if a <= b { (a, b) } else { (b, a) };
            prop_assert!(success_probability(lo) <= success_probability(hi));
        }
    }

    fn planet(id: u32, x: f32, owner: Owner, garrison: u32) -> Planet {
        Planet::new(PlanetId(id), Vec2::new(x, 0.0), owner, garrison)
    }

    #[test]
    fn test_combined_strength_within_radius_only() {
        let mut world = GameWorld::new();
        world.add_planet(planet(1, 0.0, Owner::Ai, 40));
        world.add_planet(planet(2, 100.0, Owner::Ai, 30));
        world.add_planet(planet(3, 1000.0, Owner::Ai, 500)); // out of range
        world.add_planet(planet(4, 50.0, Owner::Player, 35));

        let targets = score_attack_targets(&world, Owner::Ai, &AiConfig::default());
        assert_eq!(targets.len(), 1);
        assert_eq!(targets[0].combined_strength, 70);
        assert!((targets[0].ratio - 2.0).abs() < 1e-6);
        assert_eq!(targets[0].success_probability, 0.9);
    }

    #[test]
    fn test_estimated_losses_complement() {
        let mut world = GameWorld::new();
        world.add_planet(planet(1, 0.0, Owner::Ai, 100));
        world.add_planet(planet(2, 50.0, Owner::Player, 50));

        let targets = score_attack_targets(&world, Owner::Ai, &AiConfig::default());
        let target = &targets[0];
        // ratio 2.0 -> p 0.9; committed 70 -> losses 7
        assert!((target.estimated_losses - 70.0 * 0.1).abs() < 1e-3);
    }

    #[test]
    fn test_weak_positions_still_scored() {
        // Scoring reports even hopeless targets; the viability score and the
        // decision layer are what rule them out.
        let mut world = GameWorld::new();
        world.add_planet(planet(1, 0.0, Owner::Ai, 20));
        world.add_planet(planet(2, 50.0, Owner::Player, 100));

        let targets = score_attack_targets(&world, Owner::Ai, &AiConfig::default());
        assert_eq!(targets.len(), 1);
        assert_eq!(targets[0].success_probability, 0.2);
        assert!(targets[0].viability < 0.2);
    }
}
