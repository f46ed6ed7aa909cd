//! The append-only decision log.
//!
//! ```text
//! >>RescueBot Log File<<,gender,age,bodyType,profession,pregnant,species,isPet
//! decisionMaker:user
//! scenario:flood,,,,,,,
//! location:13.7 N;100.5 E;trespassing;saved
//! human,female,30,athletic,doctor,true,,
//! -----
//! ```

use std::fs::{self, OpenOptions};
use std::io::{self, BufWriter, Write};
use std::path::{Path, PathBuf};

use serde::Serialize;
use thiserror::Error;
use tracing::{debug, info, trace};

use crate::character::{split_row, LivingBeing};
use crate::location::{Location, RowError};
use crate::scenario::Scenario;

pub const HEADER: &str =
    ">>RescueBot Log File<<,gender,age,bodyType,profession,pregnant,species,isPet";
pub const SEPARATOR: &str = "-----";

const HEADER_TAG: &str = ">>RescueBot Log File<<";
const DECISION_MAKER_PREFIX: &str = "decisionMaker:";
const SCENARIO_PREFIX: &str = "scenario:";
const LOCATION_PREFIX: &str = "location:";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum DecisionMaker {
    User,
    Algorithm,
}

impl DecisionMaker {
    pub fn as_str(self) -> &'static str {
        match self {
            DecisionMaker::User => "user",
            DecisionMaker::Algorithm => "algorithm",
        }
    }

    /// Anything other than `user` is attributed to the algorithm.
    fn parse(raw: &str) -> Self {
        if raw == "user" {
            DecisionMaker::User
        } else {
            DecisionMaker::Algorithm
        }
    }
}

/// A scenario together with the index of the location that was saved.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Decision {
    pub scenario: Scenario,
    pub saved: usize,
}

/// Why a log line could not be trusted.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum Corruption {
    #[error("character row does not have eight columns")]
    ColumnCount,
    #[error("location status '{0}' is neither saved nor perished")]
    LocationStatus(String),
    #[error("scenario does not save exactly one location")]
    SavedCount,
    #[error("decision block opened before the previous one was closed")]
    UnclosedBlock,
    #[error(transparent)]
    Row(#[from] RowError),
}

#[derive(Debug, Error)]
pub enum LogError {
    #[error("no history found")]
    NoHistory,
    #[error("target directory {} does not exist", .0.display())]
    MissingDirectory(PathBuf),
    #[error("log file is corrupted at line {line}: {reason}")]
    Corrupted { line: usize, reason: Corruption },
    #[error(transparent)]
    Io(#[from] io::Error),
}

/// Writes one `decisionMaker:` block.
pub fn write_batch<'a, W, I>(out: &mut W, maker: DecisionMaker, decisions: I) -> io::Result<()>
where
    W: Write,
    I: IntoIterator<Item = (&'a Scenario, usize)>,
{
    writeln!(out, "{DECISION_MAKER_PREFIX}{}", maker.as_str())?;
    for (scenario, saved) in decisions {
        writeln!(out, "{SCENARIO_PREFIX}{},,,,,,,", scenario.disaster())?;
        for (index, location) in scenario.locations().iter().enumerate() {
            write_location(out, location, index == saved)?;
        }
    }
    writeln!(out, "{SEPARATOR}")
}

fn write_location<W: Write>(out: &mut W, location: &Location, saved: bool) -> io::Result<()> {
    writeln!(
        out,
        "{LOCATION_PREFIX}{};{};{};{}",
        location.latitude(),
        location.longitude(),
        location.entry_type(),
        if saved { "saved" } else { "perished" }
    )?;
    for character in location.characters() {
        writeln!(out, "{}", character.csv_row())?;
    }
    Ok(())
}

/// Appends a block to the log at `path`, creating the file with its header
/// when it does not exist yet.
pub fn append_batch<'a, I>(path: &Path, maker: DecisionMaker, decisions: I) -> Result<(), LogError>
where
    I: IntoIterator<Item = (&'a Scenario, usize)>,
{
    if let Some(parent) = path.parent() {
        if !parent.as_os_str().is_empty() && !parent.is_dir() {
            return Err(LogError::MissingDirectory(parent.to_path_buf()));
        }
    }
    let fresh = !path.exists();
    let file = OpenOptions::new().create(true).append(true).open(path)?;
    let mut out = BufWriter::new(file);
    if fresh {
        writeln!(out, "{HEADER}")?;
    }
    write_batch(&mut out, maker, decisions)?;
    out.flush()?;
    info!(path = %path.display(), maker = maker.as_str(), "appended decisions to log");
    Ok(())
}

/// Decisions recovered from a log, grouped by who made them.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct AuditLog {
    pub user: Vec<Decision>,
    pub algorithm: Vec<Decision>,
}

impl AuditLog {
    pub fn decisions(&self, maker: DecisionMaker) -> &[Decision] {
        match maker {
            DecisionMaker::User => &self.user,
            DecisionMaker::Algorithm => &self.algorithm,
        }
    }

    fn decisions_mut(&mut self, maker: DecisionMaker) -> &mut Vec<Decision> {
        match maker {
            DecisionMaker::User => &mut self.user,
            DecisionMaker::Algorithm => &mut self.algorithm,
        }
    }

    pub fn is_empty(&self) -> bool {
        self.user.is_empty() && self.algorithm.is_empty()
    }
}

/// Reads the log at `path`. A missing or empty file is [`LogError::NoHistory`].
pub fn read_log(path: &Path) -> Result<AuditLog, LogError> {
    let text = match fs::read_to_string(path) {
        Ok(text) => text,
        Err(err) if err.kind() == io::ErrorKind::NotFound => return Err(LogError::NoHistory),
        Err(err) => return Err(err.into()),
    };
    if text.is_empty() {
        return Err(LogError::NoHistory);
    }
    let log = parse_log(&text)?;
    debug!(
        user = log.user.len(),
        algorithm = log.algorithm.len(),
        "read decision log"
    );
    Ok(log)
}

pub fn parse_log(text: &str) -> Result<AuditLog, LogError> {
    let mut parser = LogParser::default();
    for (index, line) in text.lines().enumerate() {
        let line_number = index + 1;
        parser
            .feed(line, line_number)
            .map_err(|reason| LogError::Corrupted {
                line: line_number,
                reason,
            })?;
    }
    parser.finish()
}

struct PendingScenario {
    scenario: Scenario,
    saved: Option<usize>,
    line: usize,
}

struct Block {
    maker: DecisionMaker,
    pending: Option<PendingScenario>,
}

#[derive(Default)]
struct LogParser {
    log: AuditLog,
    block: Option<Block>,
}

impl LogParser {
    fn feed(&mut self, line: &str, line_number: usize) -> Result<(), Corruption> {
        let first = line.split(',').next().unwrap_or_default();
        if line.is_empty() || first == HEADER_TAG {
            return Ok(());
        }
        if line == SEPARATOR {
            return self.close_block();
        }

        let Some(block) = self.block.as_mut() else {
            if let Some(maker) = first.strip_prefix(DECISION_MAKER_PREFIX) {
                self.block = Some(Block {
                    maker: DecisionMaker::parse(maker),
                    pending: None,
                });
            } else {
                trace!(line = line_number, "ignoring line outside a decision block");
            }
            return Ok(());
        };

        if first.starts_with(DECISION_MAKER_PREFIX) {
            return Err(Corruption::UnclosedBlock);
        }

        if let Some(disaster) = first.strip_prefix(SCENARIO_PREFIX) {
            if let Some(done) = block.pending.take() {
                self.log.decisions_mut(block.maker).push(done.finish()?);
            }
            block.pending = Some(PendingScenario {
                scenario: Scenario::new(disaster),
                saved: None,
                line: line_number,
            });
            return Ok(());
        }

        let pending = block.pending.as_mut().ok_or(if first.starts_with(LOCATION_PREFIX) {
            RowError::NoScenario
        } else {
            RowError::NoLocation
        })?;

        if let Some(raw) = first.strip_prefix(LOCATION_PREFIX) {
            let status = raw.split(';').nth(3).unwrap_or_default();
            let index = pending.scenario.location_count();
            pending.scenario.push_location(Location::parse(raw)?);
            match status {
                "saved" if pending.saved.is_none() => pending.saved = Some(index),
                "saved" => return Err(Corruption::SavedCount),
                "perished" => {}
                other => return Err(Corruption::LocationStatus(other.to_string())),
            }
            return Ok(());
        }

        let fields = split_row(line).ok_or(Corruption::ColumnCount)?;
        pending.scenario.add_character(&fields)?;
        Ok(())
    }

    fn close_block(&mut self) -> Result<(), Corruption> {
        if let Some(block) = self.block.take() {
            if let Some(done) = block.pending {
                self.log.decisions_mut(block.maker).push(done.finish()?);
            }
        }
        Ok(())
    }

    fn finish(mut self) -> Result<AuditLog, LogError> {
        let last_line = self
            .block
            .as_ref()
            .and_then(|block| block.pending.as_ref())
            .map(|pending| pending.line)
            .unwrap_or_default();
        self.close_block().map_err(|reason| LogError::Corrupted {
            line: last_line,
            reason,
        })?;
        Ok(self.log)
    }
}

impl PendingScenario {
    fn finish(self) -> Result<Decision, Corruption> {
        let saved = self.saved.ok_or(Corruption::SavedCount)?;
        Ok(Decision {
            scenario: self.scenario,
            saved,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::character::CharacterError;
    use crate::character::Column;

    fn sample_scenario() -> Scenario {
        let mut scenario = Scenario::new("flood");
        scenario.add_location("13.7 N;100.5 E;trespassing").unwrap();
        scenario
            .add_character(&split_row("human,female,30,athletic,doctor,true,,").unwrap())
            .unwrap();
        scenario
            .add_character(&split_row("animal,male,4,average,,,dog,true").unwrap())
            .unwrap();
        scenario.add_location("1.0 S;2.0 W;legal").unwrap();
        scenario
            .add_character(&split_row("human,unknown,80,unspecified,none,false,,").unwrap())
            .unwrap();
        scenario
    }

    fn render(maker: DecisionMaker, decisions: &[(&Scenario, usize)]) -> String {
        let mut out = Vec::new();
        write_batch(&mut out, maker, decisions.iter().copied()).unwrap();
        String::from_utf8(out).unwrap()
    }

    #[test]
    fn writes_the_documented_block_layout() {
        let scenario = sample_scenario();
        let text = render(DecisionMaker::User, &[(&scenario, 1)]);
        assert_eq!(
            text,
            "decisionMaker:user\n\
             scenario:flood,,,,,,,\n\
             location:13.7 N;100.5 E;trespassing;perished\n\
             human,female,30,athletic,doctor,true,,\n\
             animal,male,4,average,,,dog,true\n\
             location:1.0 S;2.0 W;legal;saved\n\
             human,unknown,80,unspecified,none,false,,\n\
             -----\n"
        );
    }

    #[test]
    fn blocks_are_grouped_by_decision_maker() {
        let scenario = sample_scenario();
        let mut text = format!("{HEADER}\n");
        text.push_str(&render(DecisionMaker::Algorithm, &[(&scenario, 0)]));
        text.push_str(&render(DecisionMaker::User, &[(&scenario, 1), (&scenario, 0)]));

        let log = parse_log(&text).unwrap();
        assert_eq!(log.algorithm.len(), 1);
        assert_eq!(log.algorithm[0].saved, 0);
        assert_eq!(log.user.len(), 2);
        assert_eq!(log.user[0].saved, 1);
        assert_eq!(log.user[1].saved, 0);
        assert_eq!(log.user[0].scenario, scenario);
    }

    #[test]
    fn unknown_profession_is_corruption() {
        let text = format!(
            "{HEADER}\ndecisionMaker:user\nscenario:flood,,,,,,,\nlocation:1;1;legal;saved\n\
             human,female,30,athletic,unknown_profession,false,,\n-----\n"
        );
        let err = parse_log(&text).unwrap_err();
        match err {
            LogError::Corrupted { line, reason } => {
                assert_eq!(line, 5);
                assert_eq!(
                    reason,
                    Corruption::Row(RowError::Character(CharacterError::InvalidCharacteristic(
                        Column::Profession
                    )))
                );
            }
            other => panic!("unexpected error {other:?}"),
        }
    }

    #[test]
    fn orphan_rows_are_corruption() {
        let text = "decisionMaker:user\nhuman,female,30,athletic,none,false,,\n-----\n";
        assert!(matches!(
            parse_log(text),
            Err(LogError::Corrupted {
                line: 2,
                reason: Corruption::Row(RowError::NoLocation)
            })
        ));

        let text = "decisionMaker:user\nlocation:1;1;legal;saved\n-----\n";
        assert!(matches!(
            parse_log(text),
            Err(LogError::Corrupted {
                reason: Corruption::Row(RowError::NoScenario),
                ..
            })
        ));
    }

    #[test]
    fn scenarios_must_save_exactly_one_location() {
        let none_saved =
            "decisionMaker:algorithm\nscenario:flood,,,,,,,\nlocation:1;1;legal;perished\n-----\n";
        assert!(matches!(
            parse_log(none_saved),
            Err(LogError::Corrupted {
                reason: Corruption::SavedCount,
                ..
            })
        ));

        let twice = "decisionMaker:algorithm\nscenario:flood,,,,,,,\n\
                     location:1;1;legal;saved\nlocation:2;2;legal;saved\n-----\n";
        assert!(matches!(
            parse_log(twice),
            Err(LogError::Corrupted {
                line: 4,
                reason: Corruption::SavedCount
            })
        ));
    }

    #[test]
    fn bad_status_and_short_rows_are_corruption() {
        let text = "decisionMaker:user\nscenario:flood,,,,,,,\nlocation:1;1;legal;rescued\n-----\n";
        assert!(matches!(
            parse_log(text),
            Err(LogError::Corrupted {
                reason: Corruption::LocationStatus(_),
                ..
            })
        ));

        let text = "decisionMaker:user\nscenario:flood,,,,,,,\nlocation:1;1;legal;saved\n\
                    human,female,30\n-----\n";
        assert!(matches!(
            parse_log(text),
            Err(LogError::Corrupted {
                reason: Corruption::ColumnCount,
                ..
            })
        ));
    }

    #[test]
    fn unknown_kinds_are_skipped_only_with_a_numeric_age() {
        let block = |row: &str| {
            format!(
                "decisionMaker:user\nscenario:flood,,,,,,,\nlocation:1;1;legal;saved\n\
                 {row}\n-----\n"
            )
        };
        let log = parse_log(&block("robot,male,3,average,,,,false")).unwrap();
        assert!(log.user[0].scenario.locations()[0].characters().is_empty());

        assert!(matches!(
            parse_log(&block("robot,male,old,average,,,,false")),
            Err(LogError::Corrupted {
                line: 4,
                reason: Corruption::Row(RowError::Character(CharacterError::InvalidAge(_)))
            })
        ));
    }

    #[test]
    fn lines_outside_blocks_are_ignored() {
        let text = format!("{HEADER}\nstray text\n-----\n");
        let log = parse_log(&text).unwrap();
        assert!(log.is_empty());
    }

    #[test]
    fn missing_and_empty_files_have_no_history() {
        let dir = tempfile::tempdir().unwrap();
        let missing = dir.path().join("absent.log");
        assert!(matches!(read_log(&missing), Err(LogError::NoHistory)));

        let empty = dir.path().join("empty.log");
        fs::write(&empty, "").unwrap();
        assert!(matches!(read_log(&empty), Err(LogError::NoHistory)));
    }

    #[test]
    fn append_writes_header_once() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("rescuebot.log");
        let scenario = sample_scenario();
        append_batch(&path, DecisionMaker::User, [(&scenario, 0)]).unwrap();
        append_batch(&path, DecisionMaker::Algorithm, [(&scenario, 1)]).unwrap();

        let text = fs::read_to_string(&path).unwrap();
        assert_eq!(text.matches(HEADER_TAG).count(), 1);
        assert!(text.starts_with(HEADER));
        let log = read_log(&path).unwrap();
        assert_eq!(log.user.len(), 1);
        assert_eq!(log.algorithm.len(), 1);
    }

    #[test]
    fn append_refuses_missing_directory() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nope").join("rescuebot.log");
        let scenario = sample_scenario();
        let err = append_batch(&path, DecisionMaker::User, [(&scenario, 0)]).unwrap_err();
        assert!(matches!(err, LogError::MissingDirectory(_)));
    }
}
