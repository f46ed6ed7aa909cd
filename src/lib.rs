pub mod character;
pub mod config;
pub mod import;
pub mod location;
pub mod logfile;
pub mod menu;
pub mod rescue;
pub mod rng;
pub mod scenario;
pub mod statistics;

pub use character::{Animal, Character, Human, LivingBeing};
pub use config::Config;
pub use import::{import_scenarios, ImportOutcome, ImportWarning};
pub use location::Location;
pub use logfile::{read_log, AuditLog, DecisionMaker, LogError};
pub use menu::{Menu, MenuError, MenuSettings};
pub use rescue::decide;
pub use scenario::Scenario;
pub use statistics::{StatisticsGenerator, StatisticsReport};
