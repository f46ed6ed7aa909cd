use std::path::PathBuf;

use rescuebot::{
    character::{Character, Column, LivingBeing},
    config::Config,
    import::{import_scenarios, ImportWarning},
    rescue::decide,
};

fn fixture(name: &str) -> PathBuf {
    PathBuf::from(env!("CARGO_MANIFEST_DIR")).join(name)
}

#[test]
fn sample_file_imports_with_repairs() {
    let outcome = import_scenarios(&fixture("scenarios/sample.csv")).unwrap();

    let disasters: Vec<&str> = outcome.scenarios.iter().map(|s| s.disaster()).collect();
    assert_eq!(disasters, vec!["flood", "bushfire", "earthquake"]);
    assert_eq!(
        outcome.warnings,
        vec![
            ImportWarning::NumberFormat { line: 11 },
            ImportWarning::Characteristic {
                line: 11,
                column: Column::Profession
            },
            ImportWarning::DataFormat { line: 15 },
            ImportWarning::Characteristic {
                line: 18,
                column: Column::Gender
            },
        ]
    );
    assert_eq!(
        outcome.warnings[2].to_string(),
        "WARNING: invalid data format in scenarios file in line 15"
    );

    let bushfire = &outcome.scenarios[1];
    let repaired = &bushfire.locations()[0].characters()[0];
    assert_eq!(repaired.csv_row(), "human,male,0,average,none,false,,");
    assert_eq!(bushfire.locations()[1].characters().len(), 1);
}

#[test]
fn imported_characters_keep_their_descriptions() {
    let outcome = import_scenarios(&fixture("scenarios/sample.csv")).unwrap();
    let flood = &outcome.scenarios[0];
    let trespassers = flood.locations()[0].characters();

    assert_eq!(trespassers[0].to_string(), "athletic adult doctor female pregnant");
    assert!(matches!(&trespassers[1], Character::Animal(animal) if animal.is_pet()));
    assert!(flood.locations()[0].is_trespassing());
    assert!(!flood.locations()[1].is_trespassing());
}

#[test]
fn algorithm_decisions_for_sample_file() {
    let outcome = import_scenarios(&fixture("scenarios/sample.csv")).unwrap();
    let decisions: Vec<Option<usize>> = outcome.scenarios.iter().map(decide).collect();
    assert_eq!(decisions, vec![Some(0), Some(0), Some(0)]);
}

#[test]
fn sample_config_loads() {
    let config = Config::from_yaml(fixture("config/rescuebot.yaml")).unwrap();
    assert_eq!(config.random_seed, Some(2024));
    assert_eq!(config.batch_size, 3);
}
