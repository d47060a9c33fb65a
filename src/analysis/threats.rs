//! Threat detection
//!
//! Two sources of danger: enemy fleets already in flight toward our planets,
//! and strong enemy planets sitting inside the threat radius.

use crate::analysis::snapshot::{Threat, ThreatKind};
use crate::core::config::AiConfig;
use crate::core::types::{clamp01, Owner};
use crate::world::WorldView;

/// Scan the world for threats against `side`, sorted by severity descending.
pub fn detect_threats(world: &impl WorldView, side: Owner, config: &AiConfig) -> Vec<Threat> {
    let enemy = side.opponent();
    let own_planets = world.planets_owned_by(side);
    let mut threats = Vec::new();

    // Inbound enemy fleets
    for fleet in world.fleets() {
        if fleet.owner != enemy || fleet.arrived {
            continue;
        }
        let Some(target) = own_planets.iter().find(|p| p.id == fleet.target) else {
            continue;
        };

        let defense = target.garrison.max(1) as f32;
        let severity = clamp01(fleet.ships as f32 / defense * 0.5 + 0.2);
        let eta = (fleet.position.distance(&target.position) / config.fleet_speed) as f64;
        let defendable = own_planets.iter().any(|p| {
            p.id != target.id
                && p.garrison > config.min_ships_to_defend * 2
                && p.distance_to(target) <= config.reinforce_range
        });

        threats.push(Threat {
            target: target.id,
            severity,
            kind: ThreatKind::FleetAttack {
                fleet: fleet.id,
                eta,
                defendable,
            },
        });
    }

    // Standing enemy presence: one threat per enemy planet, paired with the
    // most endangered of our planets in range.
    for enemy_planet in world.planets_owned_by(enemy) {
        let mut worst: Option<Threat> = None;
        for own in &own_planets {
            let distance = enemy_planet.distance_to(own);
            if distance > config.threat_radius {
                continue;
            }
            if (enemy_planet.garrison as f32) <= own.garrison as f32 * 0.8 {
                continue;
            }

            let ratio = enemy_planet.garrison as f32 / own.garrison.max(1) as f32;
            let severity = clamp01(ratio * 0.3 + (1.0 - distance / config.threat_radius) * 0.4);
            if worst.as_ref().map_or(true, |t| severity > t.severity) {
                worst = Some(Threat {
                    target: own.id,
                    severity,
                    kind: ThreatKind::NearbyEnemy {
                        planet: enemy_planet.id,
                        distance,
                    },
                });
            }
        }
        if let Some(threat) = worst {
            threats.push(threat);
        }
    }

    threats.sort_by(|a, b| b.severity.partial_cmp(&a.severity).unwrap());
    threats
}

/// Aggregate threat pressure: the worst severity, nudged up by crowd size.
pub fn threat_level(threats: &[Threat]) -> f32 {
    match threats.first() {
        None => 0.0,
        Some(worst) => clamp01(worst.severity + 0.1 * (threats.len() as f32 - 1.0)),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::types::{FleetId, PlanetId, Vec2};
    use crate::world::sim::GameWorld;
    use crate::world::{FleetDispatch, Planet};

    fn create_test_world() -> GameWorld {
        let mut world = GameWorld::new();
        world.add_planet(Planet::new(PlanetId(1), Vec2::new(0.0, 0.0), Owner::Ai, 40));
        world.add_planet(Planet::new(PlanetId(2), Vec2::new(100.0, 0.0), Owner::Player, 60));
        world
    }

    #[test]
    fn test_inbound_fleet_threat_severity() {
        let mut world = create_test_world();
        // Player sends 30 ships at our planet (garrison 40)
        world.send_fleet(PlanetId(2), PlanetId(1), 0.5).unwrap();

        let threats = detect_threats(&world, Owner::Ai, &AiConfig::default());
        let fleet_threat = threats
            .iter()
            .find(|t| matches!(t.kind, ThreatKind::FleetAttack { .. }))
            .expect("inbound fleet should register");

        assert_eq!(fleet_threat.target, PlanetId(1));
        // 30 / 40 * 0.5 + 0.2 = 0.575
        assert!((fleet_threat.severity - 0.575).abs() < 1e-4);
        match fleet_threat.kind {
            ThreatKind::FleetAttack { eta, defendable, .. } => {
                assert!(eta > 0.0);
                assert!(!defendable); // no second AI planet in range
            }
            _ => unreachable!(),
        }
    }

    #[test]
    fn test_nearby_enemy_requires_80_percent_garrison() {
        let mut world = GameWorld::new();
        world.add_planet(Planet::new(PlanetId(1), Vec2::new(0.0, 0.0), Owner::Ai, 100));
        // 70 < 0.8 * 100: no threat
        world.add_planet(Planet::new(PlanetId(2), Vec2::new(50.0, 0.0), Owner::Player, 70));
        let threats = detect_threats(&world, Owner::Ai, &AiConfig::default());
        assert!(threats.is_empty());

        // 90 > 0.8 * 100: threat appears
        world.planet_mut(PlanetId(2)).unwrap().garrison = 90;
        let threats = detect_threats(&world, Owner::Ai, &AiConfig::default());
        assert_eq!(threats.len(), 1);
        assert_eq!(threats[0].target, PlanetId(1));
    }

    #[test]
    fn test_threats_sorted_by_severity() {
        let mut world = create_test_world();
        world.add_planet(Planet::new(PlanetId(3), Vec2::new(40.0, 0.0), Owner::Player, 200));
        world.send_fleet(PlanetId(2), PlanetId(1), 0.2).unwrap();

        let threats = detect_threats(&world, Owner::Ai, &AiConfig::default());
        assert!(threats.len() >= 2);
        for pair in threats.windows(2) {
            assert!(pair[0].severity >= pair[1].severity);
        }
    }

    #[test]
    fn test_threat_level_empty_and_crowded() {
        assert_eq!(threat_level(&[]), 0.0);

        let threat = Threat {
            target: PlanetId(1),
            severity: 0.6,
            kind: ThreatKind::FleetAttack {
                fleet: FleetId(0),
                eta: 1.0,
                defendable: false,
            },
        };
        assert!((threat_level(&[threat.clone()]) - 0.6).abs() < 1e-6);
        assert!((threat_level(&[threat.clone(), threat]) - 0.7).abs() < 1e-6);
    }

    #[test]
    fn test_arrived_fleets_ignored() {
        let mut world = create_test_world();
        world.send_fleet(PlanetId(2), PlanetId(1), 0.5).unwrap();
        // Walk the fleet all the way in
        for _ in 0..20 {
            world.step(0.5);
        }
        let threats = detect_threats(&world, Owner::Ai, &AiConfig::default());
        assert!(threats
            .iter()
            .all(|t| !matches!(t.kind, ThreatKind::FleetAttack { .. })));
    }
}
