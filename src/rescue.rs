//! The built-in decision rule: send RescueBot where the weighted worth of the
//! occupants is highest.

use crate::character::{AgeCategory, BodyType, Characteristic, LivingBeing, Profession};
use crate::location::Location;
use crate::scenario::Scenario;

/// Score multiplier for locations entered illegally.
pub const TRESPASS_PENALTY: f64 = 0.5;

/// Weight of a single characteristic. Anything not listed scores zero.
pub fn weight(characteristic: Characteristic) -> f64 {
    match characteristic {
        Characteristic::Pregnant => 1.0,
        Characteristic::Pet => 0.75,
        Characteristic::Age(AgeCategory::Baby) => 1.0,
        Characteristic::Age(AgeCategory::Child) => 0.75,
        Characteristic::Age(AgeCategory::Adult) => 0.5,
        Characteristic::Age(AgeCategory::Senior) => 0.25,
        Characteristic::Body(BodyType::Athletic) => 1.0,
        Characteristic::Body(BodyType::Average) => 0.5,
        Characteristic::Body(BodyType::Overweight) => 0.25,
        Characteristic::Profession(Profession::Doctor)
        | Characteristic::Profession(Profession::Professor)
        | Characteristic::Profession(Profession::Engineer)
        | Characteristic::Profession(Profession::Lawyer) => 1.0,
        Characteristic::Profession(Profession::Student) => 0.8,
        Characteristic::Profession(Profession::Criminal) => -1.0,
        Characteristic::Profession(Profession::Ceo) => 0.7,
        Characteristic::Profession(Profession::Unemployed) => -0.5,
        _ => 0.0,
    }
}

pub fn location_score(location: &Location) -> f64 {
    let total: f64 = location
        .characters()
        .iter()
        .flat_map(|character| character.characteristics())
        .map(weight)
        .sum();
    if location.is_trespassing() {
        total * TRESPASS_PENALTY
    } else {
        total
    }
}

/// Index of the location RescueBot is deployed to, or `None` when the
/// scenario has no locations.
///
/// Only a strictly higher score displaces the current pick, and the running
/// best starts at zero, so ties go to the earliest location and a scenario
/// where nothing scores above zero resolves to location 0.
pub fn decide(scenario: &Scenario) -> Option<usize> {
    if scenario.location_count() == 0 {
        return None;
    }
    let mut best_score = 0.0;
    let mut best_index = 0;
    for (index, location) in scenario.locations().iter().enumerate() {
        let score = location_score(location);
        if score > best_score {
            best_score = score;
            best_index = index;
        }
    }
    Some(best_index)
}
