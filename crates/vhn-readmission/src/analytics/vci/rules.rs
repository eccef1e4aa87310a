use super::domain::{NormalizedRecord, VciFactor};
use super::ScoreComponent;

pub(crate) fn length_of_stay_points(days: i64) -> u8 {
    if days < 1 {
        0
    } else if days <= 4 {
        1
    } else if days <= 13 {
        4
    } else {
        7
    }
}

pub(crate) fn acuity_points(admission_type_id: i64) -> u8 {
    // 1 = emergency, 2 = urgent/trauma
    if matches!(admission_type_id, 1 | 2) {
        3
    } else {
        0
    }
}

/// Diagnoses present, plus one per two procedures and one per five medications.
pub(crate) fn comorbidity_total(record: &NormalizedRecord) -> i64 {
    record.diagnosis_count()
        + record.num_procedures.div_euclid(2)
        + record.num_medications.div_euclid(5)
}

pub(crate) fn comorbidity_points(total: i64) -> u8 {
    if total < 4 {
        0
    } else if total <= 7 {
        3
    } else {
        5
    }
}

pub(crate) fn emergency_points(visits: i64) -> u8 {
    if visits < 1 {
        0
    } else if visits <= 3 {
        3
    } else {
        5
    }
}

pub(crate) fn score_record(record: &NormalizedRecord) -> (Vec<ScoreComponent>, u8) {
    let comorbidity = comorbidity_total(record);

    let components = vec![
        ScoreComponent {
            factor: VciFactor::LengthOfStay,
            points: length_of_stay_points(record.time_in_hospital),
            notes: format!("{} day(s) in hospital", record.time_in_hospital),
        },
        ScoreComponent {
            factor: VciFactor::Acuity,
            points: acuity_points(record.admission_type_id),
            notes: format!("admission type {}", record.admission_type_id),
        },
        ScoreComponent {
            factor: VciFactor::Comorbidity,
            points: comorbidity_points(comorbidity),
            notes: format!(
                "comorbidity total {} ({} diagnoses, {} procedures, {} medications)",
                comorbidity,
                record.diagnosis_count(),
                record.num_procedures,
                record.num_medications
            ),
        },
        ScoreComponent {
            factor: VciFactor::EmergencyVisits,
            points: emergency_points(record.number_emergency),
            notes: format!("{} prior emergency visit(s)", record.number_emergency),
        },
    ];

    let total = components.iter().map(|component| component.points).sum();
    (components, total)
}
