use std::io::Cursor;
use vhn_readmission::analytics::dataset::{load_csv, ColumnType, Value};
use vhn_readmission::analytics::vci::{
    calculate_vci_score, categorize_vci_risk, PatientRecord, RiskCategory, VciEngine, VciFactor,
    CATEGORY_COLUMN, MAX_VCI_SCORE, SCORE_COLUMN,
};

fn record(
    time_in_hospital: i64,
    admission_type_id: i64,
    diagnoses: [Option<&str>; 3],
    num_procedures: i64,
    num_medications: i64,
    number_emergency: i64,
) -> PatientRecord {
    PatientRecord {
        time_in_hospital: Some(time_in_hospital),
        admission_type_id: Some(admission_type_id),
        diag_1: diagnoses[0].map(str::to_string),
        diag_2: diagnoses[1].map(str::to_string),
        diag_3: diagnoses[2].map(str::to_string),
        num_procedures: Some(num_procedures),
        num_medications: Some(num_medications),
        number_emergency: Some(number_emergency),
        readmitted: None,
    }
}

#[test]
fn empty_encounter_scores_zero_and_low() {
    let blank = record(0, 0, [None, None, None], 0, 0, 0);
    let score = calculate_vci_score(&blank);
    assert_eq!(score, 0);
    assert_eq!(categorize_vci_risk(i64::from(score)), RiskCategory::Low);

    assert_eq!(calculate_vci_score(&PatientRecord::default()), 0);
}

#[test]
fn long_emergency_stay_with_heavy_burden_scores_high() {
    let encounter = record(14, 1, [Some("250"), Some("401"), Some("427")], 4, 10, 5);
    let outcome = VciEngine::new().score(&encounter);

    assert_eq!(outcome.score, 18);
    assert_eq!(outcome.category, RiskCategory::High);

    let points: Vec<(VciFactor, u8)> = outcome
        .components
        .iter()
        .map(|component| (component.factor, component.points))
        .collect();
    assert_eq!(
        points,
        vec![
            (VciFactor::LengthOfStay, 7),
            (VciFactor::Acuity, 3),
            (VciFactor::Comorbidity, 3),
            (VciFactor::EmergencyVisits, 5),
        ]
    );
}

#[test]
fn missing_sentinel_diagnoses_do_not_count() {
    let sentinel = record(3, 3, [Some("?"), Some("?"), Some("250")], 0, 14, 0);
    let absent = record(3, 3, [None, None, Some("250")], 0, 14, 0);

    // one diagnosis + 14/5 medications = 3, below the comorbidity threshold
    assert_eq!(calculate_vci_score(&sentinel), 1);
    assert_eq!(calculate_vci_score(&sentinel), calculate_vci_score(&absent));
}

#[test]
fn scores_stay_within_bounds_and_categories_follow_thresholds() {
    let engine = VciEngine::new();
    for days in [-1, 0, 1, 4, 5, 13, 14, 30] {
        for admission in [0, 1, 2, 3, 7] {
            for procedures in [0, 3, 9] {
                for medications in [0, 8, 40] {
                    for emergency in [-4, 0, 1, 3, 4, 20] {
                        let encounter = record(
                            days,
                            admission,
                            [Some("428"), None, Some("?")],
                            procedures,
                            medications,
                            emergency,
                        );
                        let outcome = engine.score(&encounter);
                        assert!(outcome.score <= MAX_VCI_SCORE);
                        let expected = match outcome.score {
                            0..=6 => RiskCategory::Low,
                            7..=12 => RiskCategory::Medium,
                            _ => RiskCategory::High,
                        };
                        assert_eq!(outcome.category, expected);
                    }
                }
            }
        }
    }
}

#[test]
fn annotating_a_loaded_extract_appends_score_columns() {
    let csv = "\
encounter_id,time_in_hospital,admission_type_id,diag_1,diag_2,diag_3,num_procedures,num_medications,number_emergency,readmitted
1,14,1,250,401,427,4,10,5,<30
2,2,3,?,?,?,0,3,0,NO
3,7,2,V45,,E11,2,12,0,>30
";
    let table = load_csv(Cursor::new(csv)).expect("extract loads");
    let annotated = VciEngine::new()
        .annotate_table(table)
        .expect("annotation succeeds");

    let scores = annotated.require_column(SCORE_COLUMN).expect("score column");
    assert_eq!(scores.dtype(), ColumnType::Integer);
    assert_eq!(
        scores.values(),
        &[Value::Integer(18), Value::Integer(1), Value::Integer(10)]
    );

    let categories = annotated
        .require_column(CATEGORY_COLUMN)
        .expect("category column");
    assert_eq!(
        categories.values(),
        &[
            Value::Text("High".to_string()),
            Value::Text("Low".to_string()),
            Value::Text("Medium".to_string()),
        ]
    );
}

#[test]
fn distribution_covers_every_category() {
    let engine = VciEngine::new();
    let outcomes = vec![
        engine.score(&record(14, 1, [Some("250"), Some("401"), Some("427")], 4, 10, 5)),
        engine.score(&PatientRecord::default()),
        engine.score(&PatientRecord::default()),
    ];

    let distribution = engine.risk_distribution(&outcomes);
    let counts: Vec<(RiskCategory, usize)> = distribution
        .iter()
        .map(|share| (share.category, share.count))
        .collect();
    assert_eq!(
        counts,
        vec![
            (RiskCategory::Low, 2),
            (RiskCategory::Medium, 0),
            (RiskCategory::High, 1),
        ]
    );
    let total: f64 = distribution.iter().map(|share| share.percentage).sum();
    assert!((total - 100.0).abs() < 1e-9);
}
