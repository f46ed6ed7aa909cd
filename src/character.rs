//! People and animals waiting at a rescue location.
//!
//! Characters are built either at random or from the eight-column row format
//! shared by scenario imports and the decision log. Once built they never
//! change.

use std::fmt;
use std::num::ParseIntError;

use rand::Rng;
use thiserror::Error;

/// Number of comma separated columns in a character row.
pub const ROW_WIDTH: usize = 8;

const MAX_GENERATED_AGE: u32 = 80;
const PET_SPECIES: [&str; 3] = ["dog", "cat", "ferret"];
const GENERATED_SPECIES: [&str; 13] = [
    "dog", "cat", "ferret", "chicken", "cow", "wolf", "kangaroo", "emu", "snake", "cockatoo",
    "koala", "possum", "wallaby",
];

/// Column positions inside a character row.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Column {
    Kind = 0,
    Gender = 1,
    Age = 2,
    BodyType = 3,
    Profession = 4,
    Pregnant = 5,
    Species = 6,
    IsPet = 7,
}

impl Column {
    pub fn index(self) -> usize {
        self as usize
    }

    pub fn name(self) -> &'static str {
        match self {
            Column::Kind => "kind",
            Column::Gender => "gender",
            Column::Age => "age",
            Column::BodyType => "bodyType",
            Column::Profession => "profession",
            Column::Pregnant => "pregnant",
            Column::Species => "species",
            Column::IsPet => "isPet",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum CharacterError {
    #[error("invalid characteristic in column {}", .0.name())]
    InvalidCharacteristic(Column),
    #[error("invalid number format for age: {0}")]
    InvalidAge(#[from] ParseIntError),
}

/// Closed vocabularies that appear as lowercase tokens in rows and reports.
trait Token: Sized + Copy + 'static {
    const ALL: &'static [Self];

    fn as_str(self) -> &'static str;

    fn parse(raw: &str) -> Option<Self> {
        Self::ALL
            .iter()
            .copied()
            .find(|value| value.as_str().eq_ignore_ascii_case(raw))
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Gender {
    Male,
    Female,
    Unknown,
}

impl Token for Gender {
    const ALL: &'static [Self] = &[Gender::Male, Gender::Female, Gender::Unknown];

    fn as_str(self) -> &'static str {
        match self {
            Gender::Male => "male",
            Gender::Female => "female",
            Gender::Unknown => "unknown",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum BodyType {
    Overweight,
    Athletic,
    Average,
    Unspecified,
}

impl Token for BodyType {
    const ALL: &'static [Self] = &[
        BodyType::Overweight,
        BodyType::Athletic,
        BodyType::Average,
        BodyType::Unspecified,
    ];

    fn as_str(self) -> &'static str {
        match self {
            BodyType::Overweight => "overweight",
            BodyType::Athletic => "athletic",
            BodyType::Average => "average",
            BodyType::Unspecified => "unspecified",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Profession {
    None,
    Student,
    Doctor,
    Professor,
    Criminal,
    Ceo,
    Homeless,
    Lawyer,
    Engineer,
    Unemployed,
}

impl Profession {
    /// Professions an adult can be generated with.
    const WORKING: [Profession; 9] = [
        Profession::Student,
        Profession::Doctor,
        Profession::Professor,
        Profession::Criminal,
        Profession::Ceo,
        Profession::Homeless,
        Profession::Lawyer,
        Profession::Engineer,
        Profession::Unemployed,
    ];
}

impl Token for Profession {
    const ALL: &'static [Self] = &[
        Profession::None,
        Profession::Student,
        Profession::Doctor,
        Profession::Professor,
        Profession::Criminal,
        Profession::Ceo,
        Profession::Homeless,
        Profession::Lawyer,
        Profession::Engineer,
        Profession::Unemployed,
    ];

    fn as_str(self) -> &'static str {
        match self {
            Profession::None => "none",
            Profession::Student => "student",
            Profession::Doctor => "doctor",
            Profession::Professor => "professor",
            Profession::Criminal => "criminal",
            Profession::Ceo => "ceo",
            Profession::Homeless => "homeless",
            Profession::Lawyer => "lawyer",
            Profession::Engineer => "engineer",
            Profession::Unemployed => "unemployed",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum AgeCategory {
    Baby,
    Child,
    Adult,
    Senior,
}

impl AgeCategory {
    pub fn from_age(age: u32) -> Self {
        if age > 68 {
            AgeCategory::Senior
        } else if age >= 17 {
            AgeCategory::Adult
        } else if age >= 5 {
            AgeCategory::Child
        } else {
            AgeCategory::Baby
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            AgeCategory::Baby => "baby",
            AgeCategory::Child => "child",
            AgeCategory::Adult => "adult",
            AgeCategory::Senior => "senior",
        }
    }
}

macro_rules! display_token {
    ($($ty:ty),*) => {
        $(impl fmt::Display for $ty {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str(self.as_str())
            }
        })*
    };
}

display_token!(Gender, BodyType, Profession, AgeCategory);

/// A scoring-relevant fact about a character.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Characteristic {
    Body(BodyType),
    Age(AgeCategory),
    Profession(Profession),
    Gender(Gender),
    Pregnant,
    Pet,
}

/// Attributes shared by every living being.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Vitals {
    pub gender: Gender,
    pub age: u32,
    pub body_type: BodyType,
}

impl Vitals {
    fn random<R: Rng + ?Sized>(rng: &mut R) -> Self {
        let gender = if rng.gen_bool(0.5) {
            Gender::Female
        } else {
            Gender::Male
        };
        let age = rng.gen_range(0..MAX_GENERATED_AGE);
        let body_type = match rng.gen_range(0..3) {
            0 => BodyType::Overweight,
            1 => BodyType::Athletic,
            _ => BodyType::Average,
        };
        Self {
            gender,
            age,
            body_type,
        }
    }

    fn parse(gender: &str, age: u32, body_type: &str) -> Result<Self, CharacterError> {
        let gender = Gender::parse(gender)
            .ok_or(CharacterError::InvalidCharacteristic(Column::Gender))?;
        let body_type = BodyType::parse(body_type)
            .ok_or(CharacterError::InvalidCharacteristic(Column::BodyType))?;
        Ok(Self {
            gender,
            age,
            body_type,
        })
    }
}

/// Behaviour common to humans and animals.
pub trait LivingBeing: fmt::Display {
    fn vitals(&self) -> &Vitals;

    /// Discriminator written in column 0 of a row.
    fn kind(&self) -> &'static str;

    /// Facts the rescue decision scores on.
    fn characteristics(&self) -> Vec<Characteristic>;

    /// Attribute labels tracked by survival statistics.
    fn statistic_labels(&self) -> Vec<&str>;

    /// The eight-column row written to logs.
    fn csv_row(&self) -> String;
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Human {
    vitals: Vitals,
    profession: Profession,
    pregnant: bool,
    age_category: AgeCategory,
}

impl Human {
    pub fn random<R: Rng + ?Sized>(rng: &mut R) -> Self {
        let vitals = Vitals::random(rng);
        let age_category = AgeCategory::from_age(vitals.age);
        let adult = age_category == AgeCategory::Adult;
        let pregnant = adult && vitals.gender == Gender::Female && rng.gen_bool(0.5);
        let profession = if adult {
            Profession::WORKING[rng.gen_range(0..Profession::WORKING.len())]
        } else {
            Profession::None
        };
        Self {
            vitals,
            profession,
            pregnant,
            age_category,
        }
    }

    pub fn new(
        gender: &str,
        age: u32,
        body_type: &str,
        profession: &str,
        pregnant: bool,
    ) -> Result<Self, CharacterError> {
        let vitals = Vitals::parse(gender, age, body_type)?;
        let age_category = AgeCategory::from_age(age);
        let profession = Profession::parse(profession)
            .filter(|p| *p == Profession::None || age_category == AgeCategory::Adult)
            .ok_or(CharacterError::InvalidCharacteristic(Column::Profession))?;
        if pregnant && (vitals.gender != Gender::Female || age_category != AgeCategory::Adult) {
            return Err(CharacterError::InvalidCharacteristic(Column::Pregnant));
        }
        Ok(Self {
            vitals,
            profession,
            pregnant,
            age_category,
        })
    }

    pub fn profession(&self) -> Profession {
        self.profession
    }

    pub fn is_pregnant(&self) -> bool {
        self.pregnant
    }

    pub fn age_category(&self) -> AgeCategory {
        self.age_category
    }
}

impl LivingBeing for Human {
    fn vitals(&self) -> &Vitals {
        &self.vitals
    }

    fn kind(&self) -> &'static str {
        "human"
    }

    fn characteristics(&self) -> Vec<Characteristic> {
        let mut tags = vec![
            Characteristic::Body(self.vitals.body_type),
            Characteristic::Age(self.age_category),
        ];
        if self.profession != Profession::None {
            tags.push(Characteristic::Profession(self.profession));
        }
        tags.push(Characteristic::Gender(self.vitals.gender));
        if self.pregnant {
            tags.push(Characteristic::Pregnant);
        }
        tags
    }

    fn statistic_labels(&self) -> Vec<&str> {
        vec![
            self.vitals.gender.as_str(),
            self.age_category.as_str(),
            self.vitals.body_type.as_str(),
            self.profession.as_str(),
            if self.pregnant {
                "pregnant"
            } else {
                "non-pregnant"
            },
        ]
    }

    fn csv_row(&self) -> String {
        format!(
            "human,{},{},{},{},{},,",
            self.vitals.gender,
            self.vitals.age,
            self.vitals.body_type,
            self.profession,
            self.pregnant
        )
    }
}

impl fmt::Display for Human {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {} ", self.vitals.body_type, self.age_category)?;
        if self.profession != Profession::None {
            write!(f, "{} ", self.profession)?;
        }
        write!(f, "{}", self.vitals.gender)?;
        if self.pregnant {
            f.write_str(" pregnant")?;
        }
        Ok(())
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Animal {
    vitals: Vitals,
    species: String,
    is_pet: bool,
}

impl Animal {
    pub fn random<R: Rng + ?Sized>(rng: &mut R) -> Self {
        let vitals = Vitals::random(rng);
        let species = GENERATED_SPECIES[rng.gen_range(0..GENERATED_SPECIES.len())];
        let is_pet = PET_SPECIES.contains(&species) && rng.gen_bool(0.5);
        Self {
            vitals,
            species: species.to_string(),
            is_pet,
        }
    }

    pub fn new(
        gender: &str,
        age: u32,
        body_type: &str,
        species: &str,
        is_pet: bool,
    ) -> Result<Self, CharacterError> {
        let vitals = Vitals::parse(gender, age, body_type)?;
        let species = species.to_lowercase();
        if is_pet && !PET_SPECIES.contains(&species.as_str()) {
            return Err(CharacterError::InvalidCharacteristic(Column::IsPet));
        }
        Ok(Self {
            vitals,
            species,
            is_pet,
        })
    }

    pub fn species(&self) -> &str {
        &self.species
    }

    pub fn is_pet(&self) -> bool {
        self.is_pet
    }
}

impl LivingBeing for Animal {
    fn vitals(&self) -> &Vitals {
        &self.vitals
    }

    fn kind(&self) -> &'static str {
        "animal"
    }

    fn characteristics(&self) -> Vec<Characteristic> {
        if self.is_pet {
            vec![Characteristic::Pet]
        } else {
            Vec::new()
        }
    }

    fn statistic_labels(&self) -> Vec<&str> {
        vec![
            self.species.as_str(),
            if self.is_pet { "pet" } else { "non-pet" },
        ]
    }

    fn csv_row(&self) -> String {
        format!(
            "animal,{},{},{},,,{},{}",
            self.vitals.gender, self.vitals.age, self.vitals.body_type, self.species, self.is_pet
        )
    }
}

impl fmt::Display for Animal {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.species)?;
        if self.is_pet {
            f.write_str(" is pet")?;
        }
        Ok(())
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Character {
    Human(Human),
    Animal(Animal),
}

impl Character {
    pub fn random<R: Rng + ?Sized>(rng: &mut R) -> Self {
        if rng.gen_bool(0.5) {
            Character::Human(Human::random(rng))
        } else {
            Character::Animal(Animal::random(rng))
        }
    }

    /// Builds a character from a row. Rows whose kind is neither `human`
    /// nor `animal` yield `Ok(None)`.
    ///
    /// The age column is checked before the kind, so a row of unknown kind
    /// is only skipped when its age is a valid number.
    pub fn from_fields<S: AsRef<str>>(
        fields: &[S; ROW_WIDTH],
    ) -> Result<Option<Self>, CharacterError> {
        let age: u32 = field(fields, Column::Age).parse()?;
        match field(fields, Column::Kind) {
            "human" => {
                let pregnant = parse_bool(field(fields, Column::Pregnant))
                    .ok_or(CharacterError::InvalidCharacteristic(Column::Pregnant))?;
                let human = Human::new(
                    field(fields, Column::Gender),
                    age,
                    field(fields, Column::BodyType),
                    field(fields, Column::Profession),
                    pregnant,
                )?;
                Ok(Some(Character::Human(human)))
            }
            "animal" => {
                let is_pet = parse_bool(field(fields, Column::IsPet))
                    .ok_or(CharacterError::InvalidCharacteristic(Column::IsPet))?;
                let animal = Animal::new(
                    field(fields, Column::Gender),
                    age,
                    field(fields, Column::BodyType),
                    field(fields, Column::Species),
                    is_pet,
                )?;
                Ok(Some(Character::Animal(animal)))
            }
            _ => Ok(None),
        }
    }

    fn being(&self) -> &dyn LivingBeing {
        match self {
            Character::Human(human) => human,
            Character::Animal(animal) => animal,
        }
    }
}

impl LivingBeing for Character {
    fn vitals(&self) -> &Vitals {
        self.being().vitals()
    }

    fn kind(&self) -> &'static str {
        self.being().kind()
    }

    fn characteristics(&self) -> Vec<Characteristic> {
        self.being().characteristics()
    }

    fn statistic_labels(&self) -> Vec<&str> {
        self.being().statistic_labels()
    }

    fn csv_row(&self) -> String {
        self.being().csv_row()
    }
}

impl fmt::Display for Character {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Display::fmt(self.being(), f)
    }
}

/// Splits a row into exactly [`ROW_WIDTH`] columns.
pub fn split_row(line: &str) -> Option<[&str; ROW_WIDTH]> {
    let mut fields = [""; ROW_WIDTH];
    let mut parts = line.split(',');
    for slot in fields.iter_mut() {
        *slot = parts.next()?;
    }
    if parts.next().is_some() {
        return None;
    }
    Some(fields)
}

fn field<S: AsRef<str>>(fields: &[S; ROW_WIDTH], column: Column) -> &str {
    fields[column.index()].as_ref()
}

fn parse_bool(raw: &str) -> Option<bool> {
    if raw.eq_ignore_ascii_case("true") {
        Some(true)
    } else if raw.eq_ignore_ascii_case("false") {
        Some(false)
    } else {
        None
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::SeedableRng;
    use rand_chacha::ChaCha8Rng;

    fn row(line: &str) -> [&str; ROW_WIDTH] {
        split_row(line).expect("eight columns")
    }

    #[test]
    fn human_description_lists_tokens_in_order() {
        let human = Human::new("female", 30, "athletic", "doctor", true).unwrap();
        assert_eq!(human.to_string(), "athletic adult doctor female pregnant");

        let child = Human::new("Male", 8, "AVERAGE", "none", false).unwrap();
        assert_eq!(child.to_string(), "average child male");
    }

    #[test]
    fn animal_description_marks_pets() {
        let dog = Animal::new("male", 3, "unspecified", "Dog", true).unwrap();
        assert_eq!(dog.species(), "dog");
        assert_eq!(dog.to_string(), "dog is pet");
    }

    #[test]
    fn age_categories_follow_thresholds() {
        assert_eq!(AgeCategory::from_age(0), AgeCategory::Baby);
        assert_eq!(AgeCategory::from_age(4), AgeCategory::Baby);
        assert_eq!(AgeCategory::from_age(5), AgeCategory::Child);
        assert_eq!(AgeCategory::from_age(16), AgeCategory::Child);
        assert_eq!(AgeCategory::from_age(17), AgeCategory::Adult);
        assert_eq!(AgeCategory::from_age(68), AgeCategory::Adult);
        assert_eq!(AgeCategory::from_age(69), AgeCategory::Senior);
    }

    #[test]
    fn rejects_unknown_gender_and_body_type() {
        let err = Character::from_fields(&row("human,robot,30,average,none,false,,")).unwrap_err();
        assert_eq!(err, CharacterError::InvalidCharacteristic(Column::Gender));

        let err = Character::from_fields(&row("animal,male,3,fluffy,,,cat,false")).unwrap_err();
        assert_eq!(err, CharacterError::InvalidCharacteristic(Column::BodyType));
    }

    #[test]
    fn rejects_bad_and_negative_ages() {
        let err = Character::from_fields(&row("human,male,abc,average,none,false,,")).unwrap_err();
        assert!(matches!(err, CharacterError::InvalidAge(_)));

        let err = Character::from_fields(&row("human,male,-4,average,none,false,,")).unwrap_err();
        assert!(matches!(err, CharacterError::InvalidAge(_)));
    }

    #[test]
    fn profession_requires_adult() {
        let err = Character::from_fields(&row("human,male,10,average,doctor,false,,")).unwrap_err();
        assert_eq!(err, CharacterError::InvalidCharacteristic(Column::Profession));

        let err =
            Character::from_fields(&row("human,male,30,average,astronaut,false,,")).unwrap_err();
        assert_eq!(err, CharacterError::InvalidCharacteristic(Column::Profession));
    }

    #[test]
    fn pregnancy_requires_adult_female() {
        let err = Character::from_fields(&row("human,male,30,average,none,true,,")).unwrap_err();
        assert_eq!(err, CharacterError::InvalidCharacteristic(Column::Pregnant));

        let err = Character::from_fields(&row("human,female,12,average,none,true,,")).unwrap_err();
        assert_eq!(err, CharacterError::InvalidCharacteristic(Column::Pregnant));

        let err = Character::from_fields(&row("human,female,30,average,none,maybe,,")).unwrap_err();
        assert_eq!(err, CharacterError::InvalidCharacteristic(Column::Pregnant));
    }

    #[test]
    fn only_dogs_cats_and_ferrets_are_pets() {
        let err = Character::from_fields(&row("animal,male,3,average,,,wolf,true")).unwrap_err();
        assert_eq!(err, CharacterError::InvalidCharacteristic(Column::IsPet));

        let err = Character::from_fields(&row("animal,male,3,average,,,cat,yes")).unwrap_err();
        assert_eq!(err, CharacterError::InvalidCharacteristic(Column::IsPet));

        let ferret = Character::from_fields(&row("animal,female,2,athletic,,,ferret,TRUE"))
            .unwrap()
            .unwrap();
        assert_eq!(ferret.csv_row(), "animal,female,2,athletic,,,ferret,true");
    }

    #[test]
    fn unknown_kind_is_skipped() {
        let parsed = Character::from_fields(&row("alien,male,3,average,,,,false")).unwrap();
        assert!(parsed.is_none());
    }

    #[test]
    fn age_is_checked_before_kind() {
        let err = Character::from_fields(&row("alien,male,old,average,,,,false")).unwrap_err();
        assert!(matches!(err, CharacterError::InvalidAge(_)));
    }

    #[test]
    fn csv_rows_use_fixed_columns() {
        let human = Character::from_fields(&row("human,FEMALE,40,Overweight,CEO,False,,"))
            .unwrap()
            .unwrap();
        assert_eq!(human.csv_row(), "human,female,40,overweight,ceo,false,,");
        assert_eq!(split_row(&human.csv_row()).map(|r| r[0]), Some("human"));
    }

    #[test]
    fn split_row_requires_exactly_eight_columns() {
        assert!(split_row("a,b,c,d,e,f,g").is_none());
        assert!(split_row("a,b,c,d,e,f,g,h,i").is_none());
        assert_eq!(split_row(",,,,,,,"), Some([""; ROW_WIDTH]));
    }

    #[test]
    fn random_characters_respect_invariants() {
        let mut rng = ChaCha8Rng::seed_from_u64(11);
        for _ in 0..500 {
            match Character::random(&mut rng) {
                Character::Human(human) => {
                    let adult = human.age_category() == AgeCategory::Adult;
                    assert!(adult || human.profession() == Profession::None);
                    let female = human.vitals().gender == Gender::Female;
                    assert!(!human.is_pregnant() || (adult && female));
                    assert!(human.vitals().age < MAX_GENERATED_AGE);
                }
                Character::Animal(animal) => {
                    assert!(!animal.is_pet() || PET_SPECIES.contains(&animal.species()));
                }
            }
        }
    }
}
