//! Survival statistics over decided scenarios.

use std::collections::HashMap;
use std::fmt::Write as _;

use serde::Serialize;

use crate::character::{Character, LivingBeing};
use crate::scenario::Scenario;

/// Labels that are tracked but never printed.
pub const HIDDEN_LABELS: [&str; 5] = [
    "non-pregnant",
    "unknown",
    "unspecified",
    "none",
    "non-pet",
];

const RULE: &str = "======================================";

/// Rounds `numerator / denominator` up to two decimal places.
fn ceil_hundredths(numerator: u64, denominator: u64) -> Option<f64> {
    if denominator == 0 {
        return None;
    }
    let hundredths = (numerator * 100).div_ceil(denominator);
    Some(hundredths as f64 / 100.0)
}

/// Saved and total counts for one attribute.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SurvivalCount {
    saved: u64,
    total: u64,
}

impl SurvivalCount {
    pub fn record(&mut self, survived: bool) {
        if survived {
            self.saved += 1;
        }
        self.total += 1;
    }

    pub fn saved(&self) -> u64 {
        self.saved
    }

    pub fn total(&self) -> u64 {
        self.total
    }

    /// `saved / total` rounded up to two decimals, or `None` before any
    /// observation.
    pub fn ratio(&self) -> Option<f64> {
        ceil_hundredths(self.saved, self.total)
    }
}

/// Running sum and count of the ages of saved humans.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct AgeAccumulator {
    sum: u64,
    count: u64,
}

impl AgeAccumulator {
    pub fn add(&mut self, age: u32) {
        self.sum += u64::from(age);
        self.count += 1;
    }

    pub fn count(&self) -> u64 {
        self.count
    }

    pub fn mean(&self) -> Option<f64> {
        ceil_hundredths(self.sum, self.count)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AttributeRatio {
    pub attribute: String,
    pub ratio: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct StatisticsReport {
    pub runs: usize,
    pub attributes: Vec<AttributeRatio>,
    pub average_age: Option<f64>,
}

impl StatisticsReport {
    pub fn render(&self, title: &str) -> String {
        let mut out = String::new();
        let _ = writeln!(out, "{RULE}");
        let _ = writeln!(out, "# {title}");
        let _ = writeln!(out, "{RULE}");
        let _ = writeln!(out, "- % SAVED AFTER {} RUNS", self.runs);
        for entry in &self.attributes {
            let _ = writeln!(out, "{}: {:.2}", entry.attribute, entry.ratio);
        }
        let _ = writeln!(out, "--");
        let average = self
            .average_age
            .map_or_else(|| "n/a".to_string(), |age| format!("{age:.2}"));
        let _ = writeln!(out, "average age: {average}");
        out
    }
}

/// Accumulates survival counts across decided scenarios.
#[derive(Debug, Clone, Default)]
pub struct StatisticsGenerator {
    counts: HashMap<String, SurvivalCount>,
    age: AgeAccumulator,
    runs: usize,
}

impl StatisticsGenerator {
    pub fn new() -> Self {
        Self::default()
    }

    /// Folds in one scenario where the characters at `saved_index` survived.
    pub fn record(&mut self, scenario: &Scenario, saved_index: usize) {
        self.runs += 1;
        for (index, location) in scenario.locations().iter().enumerate() {
            let survived = index == saved_index;
            for character in location.characters() {
                for label in character.statistic_labels() {
                    self.bump(label, survived);
                }
                if survived {
                    if let Character::Human(human) = character {
                        self.age.add(human.vitals().age);
                    }
                }
                self.bump(location.entry_type(), survived);
            }
        }
    }

    fn bump(&mut self, label: &str, survived: bool) {
        match self.counts.get_mut(label) {
            Some(count) => count.record(survived),
            None => {
                let mut count = SurvivalCount::default();
                count.record(survived);
                self.counts.insert(label.to_string(), count);
            }
        }
    }

    pub fn count(&self, label: &str) -> Option<SurvivalCount> {
        self.counts.get(label).copied()
    }

    pub fn runs(&self) -> usize {
        self.runs
    }

    /// Visible attributes sorted by descending ratio, ties by label.
    pub fn report(&self) -> StatisticsReport {
        let mut attributes: Vec<AttributeRatio> = self
            .counts
            .iter()
            .filter(|(label, _)| !HIDDEN_LABELS.contains(&label.as_str()))
            .filter_map(|(label, count)| {
                count.ratio().map(|ratio| AttributeRatio {
                    attribute: label.clone(),
                    ratio,
                })
            })
            .collect();
        attributes.sort_by(|a, b| {
            b.ratio
                .total_cmp(&a.ratio)
                .then_with(|| a.attribute.cmp(&b.attribute))
        });
        StatisticsReport {
            runs: self.runs,
            attributes,
            average_age: self.age.mean(),
        }
    }
}
