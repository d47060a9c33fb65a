//! Minimal reference host world
//!
//! Just enough simulation for the demo binary and integration tests:
//! production, straight-line fleet movement, and arrival resolution. The real
//! game owns all of this; the pipeline only ever sees the traits in the
//! parent module.

use crate::core::error::DispatchError;
use crate::core::types::{FleetId, GameTime, Owner, PlanetId};
use crate::world::{Fleet, FleetDispatch, Planet, WorldView};

#[derive(Debug, Clone, Default)]
pub struct GameWorld {
    planets: Vec<Planet>,
    fleets: Vec<Fleet>,
    time: GameTime,
    next_fleet_id: u32,
    fleet_speed: f32,
    /// When set, `send_fleet` raises a fault instead of dispatching.
    /// Test hook for the executor's isolation boundary.
    fail_dispatch: bool,
    fractional_production: Vec<f32>,
}

impl GameWorld {
    pub fn new() -> Self {
        Self {
            fleet_speed: 20.0,
            ..Self::default()
        }
    }

    pub fn with_fleet_speed(mut self, speed: f32) -> Self {
        self.fleet_speed = speed;
        self
    }

    pub fn add_planet(&mut self, planet: Planet) -> PlanetId {
        let id = planet.id;
        self.planets.push(planet);
        self.fractional_production.push(0.0);
        id
    }

    pub fn planet_mut(&mut self, id: PlanetId) -> Option<&mut Planet> {
        self.planets.iter_mut().find(|p| p.id == id)
    }

    pub fn set_fail_dispatch(&mut self, fail: bool) {
        self.fail_dispatch = fail;
    }

    /// Advance the simulation by `dt` seconds: production, movement, arrivals.
    pub fn step(&mut self, dt: f64) {
        self.time += dt;

        // Production on owned planets, up to capacity
        for (idx, planet) in self.planets.iter_mut().enumerate() {
            if planet.owner.is_combatant() && planet.garrison < planet.capacity {
                let produced = self.fractional_production[idx] + planet.production * dt as f32;
                let whole = produced.floor();
                self.fractional_production[idx] = produced - whole;
                planet.garrison = (planet.garrison + whole as u32).min(planet.capacity);
            }
        }

        // Fleet movement
        let step = self.fleet_speed * dt as f32;
        let mut arrivals = Vec::new();
        for fleet in &mut self.fleets {
            let Some(target) = self.planets.iter().find(|p| p.id == fleet.target) else {
                fleet.arrived = true;
                continue;
            };
            let remaining = fleet.position.distance(&target.position);
            if remaining <= step {
                fleet.position = target.position;
                fleet.arrived = true;
                arrivals.push((fleet.target, fleet.owner, fleet.ships));
            } else {
                let direction = (target.position - fleet.position) * (1.0 / remaining);
                fleet.position = fleet.position + direction * step;
            }
        }

        for (target, owner, ships) in arrivals {
            self.resolve_arrival(target, owner, ships);
        }
        self.fleets.retain(|f| !f.arrived);
    }

    /// Same owner reinforces; otherwise the fleet fights the garrison and
    /// flips ownership on surplus.
    fn resolve_arrival(&mut self, target: PlanetId, owner: Owner, ships: u32) {
        let Some(planet) = self.planets.iter_mut().find(|p| p.id == target) else {
            return;
        };
        if planet.owner == owner {
            planet.garrison = (planet.garrison + ships).min(planet.capacity.max(planet.garrison));
        } else if ships > planet.garrison {
            planet.garrison = ships - planet.garrison;
            planet.owner = owner;
        } else {
            planet.garrison -= ships;
        }
    }

    pub fn fleet_count(&self) -> usize {
        self.fleets.len()
    }

    /// Planet count per owner, for win checks in the demo driver
    pub fn owned_counts(&self) -> (usize, usize, usize) {
        let mut player = 0;
        let mut ai = 0;
        let mut neutral = 0;
        for planet in &self.planets {
            match planet.owner {
                Owner::Player => player += 1,
                Owner::Ai => ai += 1,
                Owner::Neutral => neutral += 1,
            }
        }
        (player, ai, neutral)
    }
}

impl WorldView for GameWorld {
    fn time(&self) -> GameTime {
        self.time
    }

    fn planets(&self) -> &[Planet] {
        &self.planets
    }

    fn fleets(&self) -> &[Fleet] {
        &self.fleets
    }
}

impl FleetDispatch for GameWorld {
    fn send_fleet(
        &mut self,
        source: PlanetId,
        target: PlanetId,
        fraction: f32,
    ) -> std::result::Result<bool, DispatchError> {
        if self.fail_dispatch {
            return Err(DispatchError("injected dispatch failure".to_string()));
        }
        if !(0.0..=1.0).contains(&fraction) {
            return Ok(false);
        }
        if self.planets.iter().all(|p| p.id != target) {
            return Ok(false);
        }

        let Some(planet) = self.planets.iter_mut().find(|p| p.id == source) else {
            return Ok(false);
        };
        let ships = (planet.garrison as f32 * fraction).floor() as u32;
        if ships == 0 {
            return Ok(false);
        }
        planet.garrison -= ships;
        let owner = planet.owner;
        let position = planet.position;

        let id = FleetId::new(self.next_fleet_id);
        self.next_fleet_id += 1;
        self.fleets.push(Fleet {
            id,
            owner,
            ships,
            source,
            target,
            position,
            arrived: false,
        });
        Ok(true)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::types::Vec2;

    fn create_test_world() -> GameWorld {
        let mut world = GameWorld::new();
        world.add_planet(Planet::new(PlanetId(1), Vec2::new(0.0, 0.0), Owner::Ai, 50));
        world.add_planet(Planet::new(PlanetId(2), Vec2::new(100.0, 0.0), Owner::Neutral, 20));
        world
    }

    #[test]
    fn test_send_fleet_deducts_garrison() {
        let mut world = create_test_world();
        let sent = world.send_fleet(PlanetId(1), PlanetId(2), 0.5).unwrap();
        assert!(sent);
        assert_eq!(world.planet(PlanetId(1)).unwrap().garrison, 25);
        assert_eq!(world.fleet_count(), 1);
        assert_eq!(world.fleets()[0].ships, 25);
    }

    #[test]
    fn test_send_fleet_refuses_missing_planets() {
        let mut world = create_test_world();
        assert_eq!(world.send_fleet(PlanetId(9), PlanetId(2), 0.5).unwrap(), false);
        assert_eq!(world.send_fleet(PlanetId(1), PlanetId(9), 0.5).unwrap(), false);
        assert_eq!(world.planet(PlanetId(1)).unwrap().garrison, 50);
    }

    #[test]
    fn test_fault_injection() {
        let mut world = create_test_world();
        world.set_fail_dispatch(true);
        assert!(world.send_fleet(PlanetId(1), PlanetId(2), 0.5).is_err());
    }

    #[test]
    fn test_fleet_arrival_flips_neutral() {
        let mut world = create_test_world();
        world.planet_mut(PlanetId(1)).unwrap().production = 0.0;
        world.send_fleet(PlanetId(1), PlanetId(2), 0.9).unwrap();
        // 45 ships over 100 units at speed 20: arrives within 6 seconds
        for _ in 0..12 {
            world.step(0.5);
        }
        let target = world.planet(PlanetId(2)).unwrap();
        assert_eq!(target.owner, Owner::Ai);
        assert_eq!(target.garrison, 25); // 45 - 20 defenders
        assert_eq!(world.fleet_count(), 0);
    }

    #[test]
    fn test_production_respects_capacity() {
        let mut world = GameWorld::new();
        let mut planet = Planet::new(PlanetId(1), Vec2::default(), Owner::Ai, 99);
        planet.production = 5.0;
        world.add_planet(planet);
        for _ in 0..10 {
            world.step(1.0);
        }
        assert_eq!(world.planet(PlanetId(1)).unwrap().garrison, 100);
    }
}
