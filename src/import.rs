//! Loading operator-supplied scenario files.
//!
//! Unlike the decision log, these files are written by hand, so the importer
//! repairs what it can: malformed rows are skipped and invalid character
//! fields are reset to a default, each with a warning naming the line.

use std::fmt;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use thiserror::Error;
use tracing::{debug, info};

use crate::character::{split_row, CharacterError, Column, ROW_WIDTH};
use crate::location::RowError;
use crate::scenario::Scenario;

const SCENARIO_PREFIX: &str = "scenario:";
const LOCATION_PREFIX: &str = "location:";

#[derive(Debug, Error)]
pub enum ImportError {
    #[error("could not find scenarios file {}", .0.display())]
    NotFound(PathBuf),
    #[error(transparent)]
    Io(#[from] io::Error),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ImportWarning {
    DataFormat { line: usize },
    NumberFormat { line: usize },
    Characteristic { line: usize, column: Column },
}

impl ImportWarning {
    pub fn line(&self) -> usize {
        match *self {
            ImportWarning::DataFormat { line }
            | ImportWarning::NumberFormat { line }
            | ImportWarning::Characteristic { line, .. } => line,
        }
    }
}

impl fmt::Display for ImportWarning {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let kind = match self {
            ImportWarning::DataFormat { .. } => "data format",
            ImportWarning::NumberFormat { .. } => "number format",
            ImportWarning::Characteristic { .. } => "characteristic",
        };
        write!(
            f,
            "WARNING: invalid {kind} in scenarios file in line {}",
            self.line()
        )
    }
}

#[derive(Debug, Clone, Default)]
pub struct ImportOutcome {
    pub scenarios: Vec<Scenario>,
    pub warnings: Vec<ImportWarning>,
}

pub fn import_scenarios(path: &Path) -> Result<ImportOutcome, ImportError> {
    let text = match fs::read_to_string(path) {
        Ok(text) => text,
        Err(err) if err.kind() == io::ErrorKind::NotFound => {
            return Err(ImportError::NotFound(path.to_path_buf()))
        }
        Err(err) => return Err(err.into()),
    };
    let outcome = parse_scenarios(&text);
    info!(
        path = %path.display(),
        scenarios = outcome.scenarios.len(),
        warnings = outcome.warnings.len(),
        "imported scenarios"
    );
    Ok(outcome)
}

pub fn parse_scenarios(text: &str) -> ImportOutcome {
    let mut importer = Importer::default();
    for (index, line) in text.lines().enumerate() {
        importer.feed(line, index + 1);
    }
    importer.finish()
}

#[derive(Default)]
struct Importer {
    outcome: ImportOutcome,
    /// Line of the most recent `scenario:` row.
    scenario_line: usize,
    /// Set by a malformed `location:` row until the next location or scenario.
    location_rejected: bool,
}

impl Importer {
    fn warn(&mut self, warning: ImportWarning) {
        self.outcome.warnings.push(warning);
    }

    fn feed(&mut self, line: &str, line_number: usize) {
        let Some(fields) = split_row(line) else {
            self.warn(ImportWarning::DataFormat { line: line_number });
            return;
        };
        let first = fields[Column::Kind.index()];

        if first.is_empty() {
            return;
        }
        if let Some(disaster) = first.strip_prefix(SCENARIO_PREFIX) {
            self.close_scenario();
            self.outcome.scenarios.push(Scenario::new(disaster));
            self.scenario_line = line_number;
            self.location_rejected = false;
            return;
        }

        let Some(scenario) = self.outcome.scenarios.last_mut() else {
            debug!(line = line_number, "row appears before any scenario");
            self.warn(ImportWarning::DataFormat { line: line_number });
            return;
        };

        if let Some(raw) = first.strip_prefix(LOCATION_PREFIX) {
            self.location_rejected = scenario.add_location(raw).is_err();
            if self.location_rejected {
                self.warn(ImportWarning::DataFormat { line: line_number });
            }
            return;
        }
        if self.location_rejected {
            debug!(line = line_number, "row belongs to a rejected location");
            self.warn(ImportWarning::DataFormat { line: line_number });
            return;
        }

        let mut fields: [String; ROW_WIDTH] = fields.map(str::to_string);
        loop {
            match scenario.add_character(&fields) {
                Ok(_) => return,
                Err(RowError::Character(CharacterError::InvalidAge(_))) => {
                    self.outcome
                        .warnings
                        .push(ImportWarning::NumberFormat { line: line_number });
                    fields[Column::Age.index()] = "0".to_string();
                }
                Err(RowError::Character(CharacterError::InvalidCharacteristic(column))) => {
                    self.outcome.warnings.push(ImportWarning::Characteristic {
                        line: line_number,
                        column,
                    });
                    let Some(default) = default_for(column) else {
                        return;
                    };
                    debug!(
                        line = line_number,
                        column = column.name(),
                        value = default,
                        "repairing field"
                    );
                    fields[column.index()] = default.to_string();
                }
                Err(_) => {
                    self.outcome
                        .warnings
                        .push(ImportWarning::DataFormat { line: line_number });
                    return;
                }
            }
        }
    }

    /// Drops the current scenario if it never received a location.
    fn close_scenario(&mut self) {
        let empty = self
            .outcome
            .scenarios
            .last()
            .is_some_and(|scenario| scenario.location_count() == 0);
        if empty {
            self.outcome.scenarios.pop();
            debug!(line = self.scenario_line, "dropping scenario without locations");
            self.warn(ImportWarning::DataFormat {
                line: self.scenario_line,
            });
        }
    }

    fn finish(mut self) -> ImportOutcome {
        self.close_scenario();
        self.outcome
    }
}

fn default_for(column: Column) -> Option<&'static str> {
    match column {
        Column::Gender => Some("unknown"),
        Column::Age => Some("0"),
        Column::BodyType => Some("unspecified"),
        Column::Profession => Some("none"),
        Column::Pregnant | Column::IsPet => Some("false"),
        Column::Kind | Column::Species => None,
    }
}
