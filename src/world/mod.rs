//! World boundary: entity records and the host-facing access traits
//!
//! The pipeline never owns the game world. It reads planets and fleets
//! through [`WorldView`] and acts only through the [`FleetDispatch`]
//! capability, which the host is free to refuse or fail.

pub mod sim;

use serde::{Deserialize, Serialize};

use crate::core::error::DispatchError;
use crate::core::types::{FleetId, GameTime, Owner, PlanetId, Vec2};

/// A planet as seen by the pipeline
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Planet {
    pub id: PlanetId,
    pub position: Vec2,
    pub owner: Owner,
    /// Ships currently stationed here, never negative
    pub garrison: u32,
    /// Ships produced per second while below capacity
    pub production: f32,
    pub capacity: u32,
}

impl Planet {
    pub fn new(id: PlanetId, position: Vec2, owner: Owner, garrison: u32) -> Self {
        Self {
            id,
            position,
            owner,
            garrison,
            production: 1.0,
            capacity: 100,
        }
    }

    pub fn distance_to(&self, other: &Planet) -> f32 {
        self.position.distance(&other.position)
    }
}

/// An in-flight fleet, read-only to the pipeline
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Fleet {
    pub id: FleetId,
    pub owner: Owner,
    pub ships: u32,
    pub source: PlanetId,
    pub target: PlanetId,
    pub position: Vec2,
    pub arrived: bool,
}

/// Read access to the host's world state
pub trait WorldView {
    /// Current simulation time in seconds
    fn time(&self) -> GameTime;

    fn planets(&self) -> &[Planet];

    fn fleets(&self) -> &[Fleet];

    fn planet(&self, id: PlanetId) -> Option<&Planet> {
        self.planets().iter().find(|p| p.id == id)
    }

    fn planets_owned_by(&self, owner: Owner) -> Vec<&Planet> {
        self.planets().iter().filter(|p| p.owner == owner).collect()
    }
}

/// The one mutating capability the host grants the pipeline.
pub trait FleetDispatch {
    /// Send `fraction` of the source garrison toward `target`.
    ///
    /// `Ok(true)` means the host accepted the order, `Ok(false)` that it
    /// refused (missing planet, empty garrison). `Err` is a host fault; the
    /// executor isolates it per call.
    fn send_fleet(
        &mut self,
        source: PlanetId,
        target: PlanetId,
        fraction: f32,
    ) -> std::result::Result<bool, DispatchError>;
}
