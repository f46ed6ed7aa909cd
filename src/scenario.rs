use std::fmt;

use rand::Rng;

use crate::character::ROW_WIDTH;
use crate::location::{Location, RowError};

const MIN_GENERATED_LOCATIONS: usize = 2;
const MAX_GENERATED_LOCATIONS: usize = 4;
const GENERATED_DISASTERS: [&str; 6] = [
    "flood",
    "cyclone",
    "earthquake",
    "bushfire",
    "tsunami",
    "tornado",
];

/// One disaster and the locations RescueBot could be sent to.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Scenario {
    disaster: String,
    locations: Vec<Location>,
}

impl Scenario {
    pub fn new(disaster: impl Into<String>) -> Self {
        Self {
            disaster: disaster.into(),
            locations: Vec::new(),
        }
    }

    pub fn random<R: Rng + ?Sized>(rng: &mut R) -> Self {
        let disaster = GENERATED_DISASTERS[rng.gen_range(0..GENERATED_DISASTERS.len())];
        let mut scenario = Self::new(disaster);
        let count = rng.gen_range(MIN_GENERATED_LOCATIONS..=MAX_GENERATED_LOCATIONS);
        for _ in 0..count {
            scenario.push_location(Location::random(rng));
        }
        scenario
    }

    pub fn generate<R: Rng + ?Sized>(rng: &mut R, count: usize) -> Vec<Self> {
        (0..count).map(|_| Self::random(rng)).collect()
    }

    /// Adds a location from `latitude;longitude;entryType`.
    pub fn add_location(&mut self, raw: &str) -> Result<(), RowError> {
        self.push_location(Location::parse(raw)?);
        Ok(())
    }

    pub fn push_location(&mut self, location: Location) {
        self.locations.push(location);
    }

    /// Adds a character to the most recently added location.
    pub fn add_character<S: AsRef<str>>(
        &mut self,
        fields: &[S; ROW_WIDTH],
    ) -> Result<bool, RowError> {
        let location = self.locations.last_mut().ok_or(RowError::NoLocation)?;
        Ok(location.add_character(fields)?)
    }

    pub fn disaster(&self) -> &str {
        &self.disaster
    }

    pub fn locations(&self) -> &[Location] {
        &self.locations
    }

    pub fn location(&self, index: usize) -> Option<&Location> {
        self.locations.get(index)
    }

    pub fn location_count(&self) -> usize {
        self.locations.len()
    }
}

impl fmt::Display for Scenario {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "======================================")?;
        writeln!(f, "# Scenario: {}", self.disaster)?;
        writeln!(f, "======================================")?;
        for (index, location) in self.locations.iter().enumerate() {
            write!(f, "[{}] Location: {location}", index + 1)?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::character::split_row;
    use rand::SeedableRng;
    use rand_chacha::ChaCha8Rng;

    #[test]
    fn characters_join_the_latest_location() {
        let mut scenario = Scenario::new("flood");
        scenario.add_location("1;1;legal").unwrap();
        scenario.add_location("2;2;trespassing").unwrap();
        scenario
            .add_character(&split_row("human,female,30,average,none,false,,").unwrap())
            .unwrap();

        assert!(scenario.locations()[0].characters().is_empty());
        assert_eq!(scenario.locations()[1].characters().len(), 1);
    }

    #[test]
    fn character_without_location_is_rejected() {
        let mut scenario = Scenario::new("flood");
        let err = scenario
            .add_character(&split_row("human,female,30,average,none,false,,").unwrap())
            .unwrap_err();
        assert_eq!(err, RowError::NoLocation);
    }

    #[test]
    fn display_numbers_locations_from_one() {
        let mut scenario = Scenario::new("cyclone");
        scenario.add_location("1 N;2 E;legal").unwrap();
        scenario.add_location("3 S;4 W;trespassing").unwrap();
        let text = scenario.to_string();
        assert!(text.contains("# Scenario: cyclone"));
        assert!(text.contains("[1] Location: 1 N, 2 E\nTrespassing: no\n0 Characters: \n"));
        assert!(text.contains("[2] Location: 3 S, 4 W\nTrespassing: yes\n"));
    }

    #[test]
    fn random_scenarios_have_two_to_four_locations() {
        let mut rng = ChaCha8Rng::seed_from_u64(5);
        for scenario in Scenario::generate(&mut rng, 100) {
            let count = scenario.location_count();
            assert!((MIN_GENERATED_LOCATIONS..=MAX_GENERATED_LOCATIONS).contains(&count));
            assert!(GENERATED_DISASTERS.contains(&scenario.disaster()));
        }
    }
}
