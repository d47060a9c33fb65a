//! Strategic situation assessment
//!
//! Boils the aggregates down to a handful of labels and scores the decision
//! selector keys off: phase, momentum, standing, urgency, confidence.

use crate::analysis::snapshot::{
    FleetAnalysis, GamePhase, PlanetAnalysis, Standing, StrategicSituation,
};
use crate::core::types::clamp01;

/// Ratio of our total to theirs. With no enemy force left, holding planets
/// reads as dominance; holding nothing reads as parity of nothing.
fn force_ratio(own: u32, enemy: u32) -> f32 {
    if enemy == 0 {
        if own > 0 {
            2.0
        } else {
            1.0
        }
    } else {
        own as f32 / enemy as f32
    }
}

pub fn assess(
    planets: &PlanetAnalysis,
    fleets: &FleetAnalysis,
    threat_level: f32,
) -> StrategicSituation {
    let total_planets = planets.own.count + planets.enemy.count + planets.neutral.count;
    let neutral_fraction = if total_planets == 0 {
        1.0
    } else {
        planets.neutral.count as f32 / total_planets as f32
    };

    let phase = if neutral_fraction > 0.6 {
        GamePhase::Early
    } else if neutral_fraction > 0.2 {
        GamePhase::Mid
    } else {
        GamePhase::Late
    };

    let strength_ratio = force_ratio(planets.own.total_garrison, planets.enemy.total_garrison);
    let fleet_ratio = force_ratio(fleets.own_ships, fleets.enemy_ships);

    let momentum =
        ((strength_ratio - 1.0) * 0.6 + (fleet_ratio - 1.0) * 0.4).clamp(-1.0, 1.0);

    let position = if strength_ratio < 0.5 || (threat_level > 0.8 && strength_ratio < 1.0) {
        Standing::Critical
    } else if strength_ratio >= 2.0 && threat_level < 0.5 {
        Standing::Dominant
    } else if strength_ratio >= 1.3 {
        Standing::Advantageous
    } else if strength_ratio >= 0.8 {
        Standing::Balanced
    } else {
        Standing::Disadvantaged
    };

    let vulnerable_fraction = if planets.own.count == 0 {
        0.0
    } else {
        planets.own.vulnerable.len() as f32 / planets.own.count as f32
    };
    let late_pressure = if phase == GamePhase::Late { 0.1 } else { 0.0 };
    let urgency = clamp01(threat_level * 0.6 + vulnerable_fraction * 0.2 + late_pressure);

    let confidence = (strength_ratio / (strength_ratio + 1.0) * 0.4
        + (1.0 - threat_level) * 0.4
        + (momentum + 1.0) / 2.0 * 0.2)
        .clamp(0.1, 0.9);

    let resource_availability = if planets.own.total_garrison == 0 {
        0.0
    } else {
        planets.own.spare_garrison as f32 / planets.own.total_garrison as f32
    };

    StrategicSituation {
        phase,
        momentum,
        position,
        threat_level,
        urgency,
        confidence,
        strength_ratio,
        resource_availability,
    }
}
