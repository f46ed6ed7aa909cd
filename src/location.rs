use std::fmt;

use rand::Rng;
use thiserror::Error;

use crate::character::{Character, CharacterError, ROW_WIDTH};

const MIN_GENERATED_CHARACTERS: usize = 1;
const MAX_GENERATED_CHARACTERS: usize = 6;

/// Problems assembling scenarios and locations from rows.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum RowError {
    #[error("location must be written as latitude;longitude;entryType")]
    MalformedLocation,
    #[error("location listed before any scenario")]
    NoScenario,
    #[error("character listed before any location")]
    NoLocation,
    #[error(transparent)]
    Character(#[from] CharacterError),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Location {
    latitude: String,
    longitude: String,
    illegal_entry: bool,
    characters: Vec<Character>,
}

impl Location {
    pub fn new(
        latitude: impl Into<String>,
        longitude: impl Into<String>,
        illegal_entry: bool,
    ) -> Self {
        Self {
            latitude: latitude.into(),
            longitude: longitude.into(),
            illegal_entry,
            characters: Vec::new(),
        }
    }

    pub fn random<R: Rng + ?Sized>(rng: &mut R) -> Self {
        let latitude = random_coordinate(rng, 90.0, 'N', 'S');
        let longitude = random_coordinate(rng, 180.0, 'E', 'W');
        let mut location = Self::new(latitude, longitude, rng.gen_bool(0.5));
        let count = rng.gen_range(MIN_GENERATED_CHARACTERS..=MAX_GENERATED_CHARACTERS);
        for _ in 0..count {
            location.push(Character::random(rng));
        }
        location
    }

    /// Parses `latitude;longitude;entryType`. Extra `;` fields are ignored, and
    /// an entry type other than `trespassing` or `legal` leaves the location
    /// legal.
    pub fn parse(raw: &str) -> Result<Self, RowError> {
        let mut parts = raw.split(';');
        let (Some(latitude), Some(longitude), Some(entry)) =
            (parts.next(), parts.next(), parts.next())
        else {
            return Err(RowError::MalformedLocation);
        };
        Ok(Self::new(latitude, longitude, entry == "trespassing"))
    }

    /// Appends the character described by `fields`. Returns `false` when the
    /// row names neither a human nor an animal and was skipped.
    pub fn add_character<S: AsRef<str>>(
        &mut self,
        fields: &[S; ROW_WIDTH],
    ) -> Result<bool, CharacterError> {
        match Character::from_fields(fields)? {
            Some(character) => {
                self.push(character);
                Ok(true)
            }
            None => Ok(false),
        }
    }

    pub fn push(&mut self, character: Character) {
        self.characters.push(character);
    }

    pub fn latitude(&self) -> &str {
        &self.latitude
    }

    pub fn longitude(&self) -> &str {
        &self.longitude
    }

    pub fn is_trespassing(&self) -> bool {
        self.illegal_entry
    }

    pub fn entry_type(&self) -> &'static str {
        if self.illegal_entry {
            "trespassing"
        } else {
            "legal"
        }
    }

    pub fn characters(&self) -> &[Character] {
        &self.characters
    }
}

impl fmt::Display for Location {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "{}, {}", self.latitude, self.longitude)?;
        writeln!(
            f,
            "Trespassing: {}",
            if self.illegal_entry { "yes" } else { "no" }
        )?;
        writeln!(f, "{} Characters: ", self.characters.len())?;
        for character in &self.characters {
            writeln!(f, "- {character}")?;
        }
        Ok(())
    }
}

fn random_coordinate<R: Rng + ?Sized>(
    rng: &mut R,
    max: f64,
    positive: char,
    negative: char,
) -> String {
    let value: f64 = rng.gen_range(0.0..max);
    let hemisphere = if rng.gen_bool(0.5) { positive } else { negative };
    format!("{value:.4} {hemisphere}")
}
