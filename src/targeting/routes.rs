//! Route and timing estimation for multi-attacker strikes

use serde::{Deserialize, Serialize};

use crate::core::config::AiConfig;
use crate::core::types::{Owner, PlanetId};
use crate::world::WorldView;

/// Direct-route estimate for one attacker
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Route {
    pub attacker: PlanetId,
    pub distance: f32,
    /// Seconds to arrival at fleet speed
    pub eta: f64,
    /// Exposure to enemy planets along the way, in [0, 0.5]
    pub risk: f32,
}

/// Whether attackers should launch together or in sequence
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ArrivalPlan {
    /// Arrival spread is tight enough to hit as one wave
    Simultaneous,
    /// Spread is wide; stagger launches so fleets land together
    Staggered,
}

/// Routes for a set of attackers plus the arrival recommendation
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AttackTiming {
    pub routes: Vec<Route>,
    pub arrival: ArrivalPlan,
}

/// Estimate direct routes from each attacker to `target`.
pub fn plan_routes(
    world: &impl WorldView,
    side: Owner,
    attackers: &[PlanetId],
    target: PlanetId,
    config: &AiConfig,
) -> AttackTiming {
    let Some(target_planet) = world.planet(target) else {
        return AttackTiming {
            routes: Vec::new(),
            arrival: ArrivalPlan::Simultaneous,
        };
    };
    let enemy_planets = world.planets_owned_by(side.opponent());

    let mut routes = Vec::new();
    for &attacker in attackers {
        let Some(source) = world.planet(attacker) else {
            continue;
        };
        let distance = source.distance_to(target_planet);
        let midpoint = source.position.midpoint(&target_planet.position);
        let exposed = enemy_planets
            .iter()
            .filter(|p| p.id != target && p.position.distance(&midpoint) <= config.threat_radius)
            .count();

        routes.push(Route {
            attacker,
            distance,
            eta: (distance / config.fleet_speed) as f64,
            risk: (exposed as f32 * 0.1).min(0.5),
        });
    }

    let arrival = match (
        routes.iter().map(|r| r.eta).fold(f64::INFINITY, f64::min),
        routes.iter().map(|r| r.eta).fold(0.0, f64::max),
    ) {
        (min, max) if routes.is_empty() || max - min <= config.stagger_spread => {
            ArrivalPlan::Simultaneous
        }
        _ => ArrivalPlan::Staggered,
    };

    AttackTiming { routes, arrival }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::types::Vec2;
    use crate::world::sim::GameWorld;
    use crate::world::Planet;

    fn create_test_world() -> GameWorld {
        let mut world = GameWorld::new();
        world.add_planet(Planet::new(PlanetId(1), Vec2::new(0.0, 0.0), Owner::Ai, 60));
        world.add_planet(Planet::new(PlanetId(2), Vec2::new(20.0, 0.0), Owner::Ai, 60));
        world.add_planet(Planet::new(PlanetId(3), Vec2::new(100.0, 0.0), Owner::Player, 40));
        world
    }

    #[test]
    fn test_close_attackers_strike_simultaneously() {
        let world = create_test_world();
        let timing = plan_routes(
            &world,
            Owner::Ai,
            &[PlanetId(1), PlanetId(2)],
            PlanetId(3),
            &AiConfig::default(),
        );
        assert_eq!(timing.routes.len(), 2);
        // ETAs 5.0 and 4.0 seconds: spread 1.0 <= 2.0
        assert_eq!(timing.arrival, ArrivalPlan::Simultaneous);
    }

    #[test]
    fn test_wide_spread_staggers() {
        let mut world = create_test_world();
        world.add_planet(Planet::new(PlanetId(4), Vec2::new(-80.0, 0.0), Owner::Ai, 60));
        let timing = plan_routes(
            &world,
            Owner::Ai,
            &[PlanetId(2), PlanetId(4)],
            PlanetId(3),
            &AiConfig::default(),
        );
        // ETAs 4.0 and 9.0 seconds: spread 5.0 > 2.0
        assert_eq!(timing.arrival, ArrivalPlan::Staggered);
    }

    #[test]
    fn test_route_risk_counts_enemy_presence() {
        let mut world = create_test_world();
        // Enemy planet sitting right on the approach midpoint
        world.add_planet(Planet::new(PlanetId(5), Vec2::new(50.0, 10.0), Owner::Player, 30));
        let timing = plan_routes(
            &world,
            Owner::Ai,
            &[PlanetId(1)],
            PlanetId(3),
            &AiConfig::default(),
        );
        assert!(timing.routes[0].risk >= 0.1);
    }

    #[test]
    fn test_missing_planets_skipped() {
        let world = create_test_world();
        let timing = plan_routes(
            &world,
            Owner::Ai,
            &[PlanetId(1), PlanetId(77)],
            PlanetId(3),
            &AiConfig::default(),
        );
        assert_eq!(timing.routes.len(), 1);

        let empty = plan_routes(&world, Owner::Ai, &[PlanetId(1)], PlanetId(99), &AiConfig::default());
        assert!(empty.routes.is_empty());
    }
}
