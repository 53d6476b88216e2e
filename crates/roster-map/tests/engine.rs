use proptest::prelude::*;
use roster_map::{ColumnMappingEngine, ConfidenceBucket, MappingSet, auto_promote};
use roster_model::{
    ColumnMapping, FieldType, MappingAction, ParsedTable, TargetFieldSpec, TargetTableSpec,
};
use roster_standards::SchemaRegistry;

fn strings(values: &[&str]) -> Vec<String> {
    values.iter().map(|v| (*v).to_string()).collect()
}

fn parsed(headers: &[&str], rows: &[&[&str]]) -> ParsedTable {
    ParsedTable::new(
        strings(headers),
        rows.iter().map(|row| strings(row)).collect(),
    )
    .expect("valid table")
}

fn registry() -> SchemaRegistry {
    SchemaRegistry::load_default().expect("load catalog")
}

#[test]
fn scenario_first_last_mobile() {
    let registry = registry();
    let workers = registry.table("workers").unwrap();
    let table = parsed(
        &["First Name", "Last Name", "Mobile"],
        &[&["Jane", "Doe", "0400000000"]],
    );

    let mappings = ColumnMappingEngine::default().suggest(workers, &table);
    let targets: Vec<(&str, MappingAction, ConfidenceBucket)> = mappings
        .iter()
        .map(|m| {
            (
                m.target_field.as_str(),
                m.action,
                ConfidenceBucket::from_confidence(m.confidence),
            )
        })
        .collect();
    assert_eq!(
        targets,
        vec![
            ("first_name", MappingAction::Map, ConfidenceBucket::Excellent),
            ("surname", MappingAction::Map, ConfidenceBucket::Excellent),
            ("mobile_phone", MappingAction::Map, ConfidenceBucket::Excellent),
        ]
    );
    MappingSet::new("workers", mappings).check(&registry).unwrap();
}

#[test]
fn one_mapping_per_column_in_header_order() {
    let registry = registry();
    let workers = registry.table("workers").unwrap();
    let table = parsed(
        &["Shoe Size", "Email Address", "Home Address", "Phone", "Name"],
        &[&["9", "jane@example.org", "1 Main St", "0400", "Jane"]],
    );

    let mappings = ColumnMappingEngine::default().suggest(workers, &table);
    let summary: Vec<(&str, &str, u8)> = mappings
        .iter()
        .map(|m| (m.source_column.as_str(), m.target_field.as_str(), m.confidence))
        .collect();
    assert_eq!(
        summary,
        vec![
            ("Shoe Size", "", 0),
            ("Email Address", "email", 95),
            ("Home Address", "address_line_1", 70),
            ("Phone", "mobile_phone", 70),
            ("Name", "first_name", 70),
        ]
    );
    assert_eq!(mappings[0].action, MappingAction::Skip);
}

#[test]
fn date_samples_favor_first_date_field() {
    let registry = registry();
    let workers = registry.table("workers").unwrap();
    let table = parsed(
        &["DOB", "Start Date"],
        &[&["1990-02-01", "01/03/2024"], &["", "02-03-2024"], &["12/12/1985", ""]],
    );

    let mappings = ColumnMappingEngine::default().suggest(workers, &table);
    assert_eq!(mappings[0].target_field, "date_of_birth");
    assert_eq!(mappings[0].confidence, 80);
    assert_eq!(mappings[1].target_field, "start_date");
    assert_eq!(mappings[1].confidence, 100);
}

#[test]
fn non_date_sample_disables_date_heuristic() {
    let registry = registry();
    let workers = registry.table("workers").unwrap();
    let table = parsed(&["Joined"], &[&["2024-01-01"], &["last spring"]]);

    let mappings = ColumnMappingEngine::default().suggest(workers, &table);
    assert!(mappings[0].is_skip());
}

#[test]
fn equal_scores_go_to_first_declared_field() {
    let date_field = |name: &str| TargetFieldSpec {
        name: name.to_string(),
        field_type: FieldType::Date,
        required: false,
        description: String::new(),
        enum_options: None,
    };
    let spec = TargetTableSpec {
        name: "placements".to_string(),
        label: String::new(),
        primary_name_field: None,
        email_field: None,
        identifier_field: None,
        natural_key: Vec::new(),
        fields: vec![date_field("ended"), date_field("began")],
    };
    let table = parsed(&["When"], &[&["2024-01-01"]]);

    let mapping = &ColumnMappingEngine::default().suggest(&spec, &table)[0];
    assert_eq!(mapping.target_field, "ended");
    assert_eq!(mapping.confidence, 80);
}

#[test]
fn minimum_confidence_turns_weak_matches_into_skips() {
    let registry = registry();
    let workers = registry.table("workers").unwrap();
    let engine = ColumnMappingEngine::new(5, 50);
    let mapping = engine.suggest_column(workers, "Telephone", &[]);
    assert_eq!(mapping.target_field, "mobile_phone");

    let mapping = engine.suggest_column(workers, "Middle", &[]);
    assert!(mapping.is_skip(), "containment-only match scores below 50");
}

#[test]
fn employer_headers() {
    let registry = registry();
    let employers = registry.table("employers").unwrap();
    let table = parsed(
        &["name", "ABN", "Trading Name", "Business Name", "Phone"],
        &[&["Acme Pty Ltd", "51824753556", "Acme", "Acme Pty Ltd", "02 9999 0000"]],
    );

    let targets: Vec<String> = ColumnMappingEngine::default()
        .suggest(employers, &table)
        .into_iter()
        .map(|m| m.target_field)
        .collect();
    assert_eq!(targets, vec!["name", "abn", "trading_name", "name", "phone"]);
}

fn field_names() -> Vec<String> {
    registry()
        .table("workers")
        .unwrap()
        .fields
        .iter()
        .map(|f| f.name.clone())
        .collect()
}

fn respell(name: &str, upper: bool, separator: &str) -> String {
    let spaced = name.replace('_', separator);
    if upper {
        spaced.to_uppercase()
    } else {
        spaced
    }
}

proptest! {
    #[test]
    fn confidence_stays_in_range(header in "[A-Za-z0-9 _-]{1,24}", samples in prop::collection::vec("[0-9/-]{0,12}", 0..5)) {
        let registry = registry();
        let workers = registry.table("workers").unwrap();
        let samples: Vec<&str> = samples.iter().map(String::as_str).filter(|s| !s.trim().is_empty()).collect();
        let mapping = ColumnMappingEngine::default().suggest_column(workers, &header, &samples);
        prop_assert!(mapping.confidence <= 100);
        prop_assert_eq!(mapping.is_skip(), mapping.confidence == 0);
    }

    #[test]
    fn exact_normalized_name_always_wins(
        field in prop::sample::select(field_names()),
        upper in any::<bool>(),
        separator in prop::sample::select(vec![" ", "_", "-", ""]),
    ) {
        let registry = registry();
        let workers = registry.table("workers").unwrap();
        let header = respell(&field, upper, separator);
        let mapping = ColumnMappingEngine::default().suggest_column(workers, &header, &["2024-01-01"]);
        prop_assert_eq!(mapping.confidence, 100);
        prop_assert_eq!(mapping.target_field, field);
    }

    #[test]
    fn auto_promote_only_touches_confident_non_create(
        confidences in prop::collection::vec(0u8..=100, 1..12),
        actions in prop::collection::vec(0u8..3, 12),
        threshold in 0u8..=100,
    ) {
        let mappings: Vec<ColumnMapping> = confidences
            .iter()
            .zip(&actions)
            .map(|(confidence, action)| {
                let mut mapping = match action {
                    0 => ColumnMapping::map("Col", "workers", "notes", *confidence),
                    1 => ColumnMapping::create("Col", "workers", FieldType::Number),
                    _ => ColumnMapping::skip("Col", "workers"),
                };
                mapping.confidence = *confidence;
                mapping
            })
            .collect();

        let promoted = auto_promote(&mappings, threshold);
        prop_assert_eq!(promoted.len(), mappings.len());
        for (before, after) in mappings.iter().zip(&promoted) {
            if before.confidence < threshold || before.action == MappingAction::Create {
                prop_assert_eq!(before, after);
            }
            prop_assert!(after.check_shape().is_ok());
        }
    }
}
