//! Interactive operator menu.
//!
//! The menu reads whitespace-separated answers from any `BufRead` and writes
//! its transcript to any `Write`, so whole sessions can be scripted.

use std::io::{self, BufRead, Write};
use std::path::{Path, PathBuf};

use rand::Rng;
use serde::Serialize;
use thiserror::Error;
use tracing::{debug, info, warn};

use crate::logfile::{append_batch, read_log, AuditLog, DecisionMaker, LogError};
use crate::rescue::decide;
use crate::scenario::Scenario;
use crate::statistics::{StatisticsGenerator, StatisticsReport};

const MENU_TEXT: &str = "Please enter one of the following commands to continue:\n\
- judge scenarios: [judge] or [j]\n\
- run simulations with the in-built decision algorithm: [run] or [r]\n\
- show audit from history: [audit] or [a]\n\
- quit the program: [quit] or [q]";

#[derive(Debug, Error)]
pub enum MenuError {
    #[error("input closed")]
    EndOfInput,
    #[error(transparent)]
    Log(#[from] LogError),
    #[error(transparent)]
    Json(#[from] serde_json::Error),
    #[error(transparent)]
    Io(#[from] io::Error),
}

#[derive(Debug, Clone)]
pub struct MenuSettings {
    pub log_path: PathBuf,
    pub batch_size: usize,
    pub min_simulations: usize,
    pub json: bool,
}

#[derive(Debug, Serialize)]
struct AuditReport {
    algorithm: Option<StatisticsReport>,
    user: Option<StatisticsReport>,
}

pub struct Menu<R, W, G> {
    input: R,
    output: W,
    rng: G,
    settings: MenuSettings,
    scenarios: Vec<Scenario>,
    imported: bool,
}

impl<R: BufRead, W: Write, G: Rng> Menu<R, W, G> {
    pub fn new(input: R, output: W, rng: G, settings: MenuSettings) -> Self {
        Self {
            input,
            output,
            rng,
            settings,
            scenarios: Vec::new(),
            imported: false,
        }
    }

    /// Uses imported scenarios instead of generating fresh ones. Scenarios
    /// without a location cannot be judged and are left out.
    pub fn with_scenarios(mut self, mut scenarios: Vec<Scenario>) -> Self {
        let before = scenarios.len();
        scenarios.retain(|scenario| scenario.location_count() > 0);
        if scenarios.len() < before {
            warn!(
                dropped = before - scenarios.len(),
                "ignoring scenarios without locations"
            );
        }
        self.scenarios = scenarios;
        self.imported = true;
        self
    }

    /// Runs the menu until the operator quits or input runs out.
    ///
    /// Errors are fatal: the operator-facing message has already been
    /// written to the output by the time one is returned.
    pub fn run(&mut self) -> Result<(), MenuError> {
        match self.command_loop() {
            Err(MenuError::EndOfInput) => {
                debug!("input closed, leaving menu");
                Ok(())
            }
            other => other,
        }
    }

    pub fn into_output(self) -> W {
        self.output
    }

    fn command_loop(&mut self) -> Result<(), MenuError> {
        loop {
            writeln!(self.output, "{MENU_TEXT}")?;
            let command = self.prompt_token()?;
            match command.as_str() {
                "judge" | "j" => self.judge()?,
                "run" | "r" => self.simulate()?,
                "audit" | "a" => self.audit()?,
                "quit" | "q" => return Ok(()),
                _ => write!(self.output, "Invalid command! ")?,
            }
        }
    }

    fn judge(&mut self) -> Result<(), MenuError> {
        let consent = self.ask_yes_no(
            "Do you consent to have your decisions saved to a file? (yes/no)",
            "Invalid Response! ",
        )?;
        let batch_size = self.settings.batch_size;
        let mut stats = StatisticsGenerator::new();
        let mut cursor = 0;
        loop {
            if !self.imported {
                self.scenarios = Scenario::generate(&mut self.rng, batch_size);
                cursor = 0;
            }
            let start = cursor;
            let end = (start + batch_size).min(self.scenarios.len());
            let mut saved = Vec::with_capacity(end - start);
            for index in start..end {
                write!(self.output, "{}", self.scenarios[index])?;
                let count = self.scenarios[index].location_count();
                let choice = self.ask_location(count)?;
                stats.record(&self.scenarios[index], choice);
                saved.push(choice);
            }
            cursor = end;

            write!(self.output, "{}", stats.report().render("Statistic"))?;
            if consent {
                let batch = self.scenarios[start..end].iter().zip(saved);
                persist(
                    &mut self.output,
                    &self.settings.log_path,
                    DecisionMaker::User,
                    batch,
                )?;
            }

            let remaining = cursor < self.scenarios.len();
            if !remaining && self.imported {
                break;
            }
            let more =
                self.ask_yes_no("Would you like to continue? (yes/no)", "Invalid response! ")?;
            if !more {
                break;
            }
        }
        info!(runs = stats.runs(), consent, "judging finished");
        writeln!(self.output, "That's all. Press Enter to return to main menu.")?;
        self.wait_for_enter()
    }

    fn simulate(&mut self) -> Result<(), MenuError> {
        if !self.imported {
            let count = self.ask_simulation_count()?;
            self.scenarios = Scenario::generate(&mut self.rng, count);
        }
        let mut stats = StatisticsGenerator::new();
        let mut decisions = Vec::with_capacity(self.scenarios.len());
        for scenario in &self.scenarios {
            let Some(choice) = decide(scenario) else {
                continue;
            };
            stats.record(scenario, choice);
            decisions.push((scenario, choice));
        }
        write!(self.output, "{}", stats.report().render("Statistic"))?;
        persist(
            &mut self.output,
            &self.settings.log_path,
            DecisionMaker::Algorithm,
            decisions,
        )?;
        writeln!(self.output, "That's all. Press Enter to return to main menu.")?;
        self.wait_for_enter()
    }

    fn audit(&mut self) -> Result<(), MenuError> {
        match read_log(&self.settings.log_path) {
            Ok(log) => {
                info!(
                    user = log.user.len(),
                    algorithm = log.algorithm.len(),
                    "audit loaded"
                );
                self.print_audit(&log)?;
                write!(self.output, "That's all. ")?;
            }
            Err(LogError::NoHistory) => writeln!(self.output, "No history found. ")?,
            Err(err @ LogError::Corrupted { .. }) => {
                warn!(%err, "refusing to audit");
                write!(self.output, "ERROR: LogFile is corrupted!")?;
                self.output.flush()?;
                return Err(err.into());
            }
            Err(err) => return Err(err.into()),
        }
        writeln!(self.output, "Press Enter to return to main menu.")?;
        self.wait_for_enter()
    }

    fn print_audit(&mut self, log: &AuditLog) -> Result<(), MenuError> {
        let algorithm = audit_report(log, DecisionMaker::Algorithm);
        let user = audit_report(log, DecisionMaker::User);
        if self.settings.json {
            let report = AuditReport { algorithm, user };
            writeln!(self.output, "{}", serde_json::to_string_pretty(&report)?)?;
            return Ok(());
        }
        if let Some(report) = algorithm {
            write!(self.output, "{}", report.render("Algorithm Audit"))?;
        }
        if let Some(report) = user {
            writeln!(self.output)?;
            write!(self.output, "{}", report.render("User Audit"))?;
        }
        Ok(())
    }

    fn ask_location(&mut self, count: usize) -> Result<usize, MenuError> {
        loop {
            writeln!(self.output, "To which location should RescueBot be deployed?")?;
            let answer = self.prompt_token()?;
            match answer.parse::<usize>() {
                Ok(choice) if (1..=count).contains(&choice) => return Ok(choice - 1),
                _ => write!(self.output, "Invalid Response! ")?,
            }
        }
    }

    fn ask_simulation_count(&mut self) -> Result<usize, MenuError> {
        loop {
            writeln!(self.output, "How many scenarios should be run?")?;
            let answer = self.prompt_token()?;
            match answer.parse::<usize>() {
                Ok(count) if count >= self.settings.min_simulations => return Ok(count),
                _ => write!(self.output, "Invalid Input! ")?,
            }
        }
    }

    fn ask_yes_no(&mut self, question: &str, invalid: &str) -> Result<bool, MenuError> {
        loop {
            writeln!(self.output, "{question}")?;
            match self.prompt_token()?.as_str() {
                "yes" => return Ok(true),
                "no" => return Ok(false),
                _ => write!(self.output, "{invalid}")?,
            }
        }
    }

    /// Prints the prompt marker and returns the next non-blank token.
    fn prompt_token(&mut self) -> Result<String, MenuError> {
        write!(self.output, "> ")?;
        self.output.flush()?;
        loop {
            let line = self.read_line()?;
            if let Some(token) = line.split_whitespace().next() {
                return Ok(token.to_string());
            }
        }
    }

    fn wait_for_enter(&mut self) -> Result<(), MenuError> {
        write!(self.output, "> ")?;
        self.output.flush()?;
        self.read_line().map(|_| ())
    }

    fn read_line(&mut self) -> Result<String, MenuError> {
        let mut line = String::new();
        if self.input.read_line(&mut line)? == 0 {
            return Err(MenuError::EndOfInput);
        }
        Ok(line)
    }
}

/// Appends a batch to the log, reporting a missing target directory to the
/// operator before failing.
fn persist<'a, W, I>(
    output: &mut W,
    log_path: &Path,
    maker: DecisionMaker,
    batch: I,
) -> Result<(), MenuError>
where
    W: Write,
    I: IntoIterator<Item = (&'a Scenario, usize)>,
{
    match append_batch(log_path, maker, batch) {
        Ok(()) => Ok(()),
        Err(err @ LogError::MissingDirectory(_)) => {
            writeln!(
                output,
                "ERROR: could not print results. Target directory does not exist."
            )?;
            output.flush()?;
            Err(err.into())
        }
        Err(err) => Err(err.into()),
    }
}

fn audit_report(log: &AuditLog, maker: DecisionMaker) -> Option<StatisticsReport> {
    let decisions = log.decisions(maker);
    if decisions.is_empty() {
        return None;
    }
    let mut stats = StatisticsGenerator::new();
    for decision in decisions {
        stats.record(&decision.scenario, decision.saved);
    }
    Some(stats.report())
}
