use crate::analytics::dataset::{Column, Table};
use serde::{Deserialize, Deserializer, Serialize};

/// Placeholder the encounter extract uses for an unrecorded code.
pub const MISSING_SENTINEL: &str = "?";

/// Shared missing-value predicate: absent, or the `"?"` sentinel.
pub fn is_missing_value(value: Option<&str>) -> bool {
    match value {
        None => true,
        Some(raw) => raw == MISSING_SENTINEL,
    }
}

/// One hospital encounter as it arrives from an extract. Every field may be
/// absent; defaults are applied by [`PatientRecord::normalize`] only.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct PatientRecord {
    pub time_in_hospital: Option<i64>,
    pub admission_type_id: Option<i64>,
    #[serde(deserialize_with = "code_as_string")]
    pub diag_1: Option<String>,
    #[serde(deserialize_with = "code_as_string")]
    pub diag_2: Option<String>,
    #[serde(deserialize_with = "code_as_string")]
    pub diag_3: Option<String>,
    pub num_procedures: Option<i64>,
    pub num_medications: Option<i64>,
    pub number_emergency: Option<i64>,
    pub readmitted: Option<String>,
}

impl PatientRecord {
    pub fn normalize(&self) -> NormalizedRecord {
        let diagnosis = |value: &Option<String>| {
            if is_missing_value(value.as_deref()) {
                None
            } else {
                value.clone()
            }
        };

        NormalizedRecord {
            time_in_hospital: self.time_in_hospital.unwrap_or(0),
            admission_type_id: self.admission_type_id.unwrap_or(0),
            diagnoses: [
                diagnosis(&self.diag_1),
                diagnosis(&self.diag_2),
                diagnosis(&self.diag_3),
            ],
            num_procedures: self.num_procedures.unwrap_or(0),
            num_medications: self.num_medications.unwrap_or(0),
            number_emergency: self.number_emergency.unwrap_or(0),
        }
    }
}

/// Record with every default substituted; the only input the scoring rules see.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NormalizedRecord {
    pub time_in_hospital: i64,
    pub admission_type_id: i64,
    pub diagnoses: [Option<String>; 3],
    pub num_procedures: i64,
    pub num_medications: i64,
    pub number_emergency: i64,
}

impl NormalizedRecord {
    pub fn diagnosis_count(&self) -> i64 {
        self.diagnoses.iter().filter(|code| code.is_some()).count() as i64
    }
}

/// The four sub-scores making up the composite index.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum VciFactor {
    LengthOfStay,
    Acuity,
    Comorbidity,
    EmergencyVisits,
}

impl VciFactor {
    pub const fn ordered() -> [Self; 4] {
        [
            Self::LengthOfStay,
            Self::Acuity,
            Self::Comorbidity,
            Self::EmergencyVisits,
        ]
    }

    pub const fn label(self) -> &'static str {
        match self {
            Self::LengthOfStay => "Length of Stay",
            Self::Acuity => "Acuity of Admission",
            Self::Comorbidity => "Comorbidity Burden",
            Self::EmergencyVisits => "Emergency Visits",
        }
    }

    pub const fn max_points(self) -> u8 {
        match self {
            Self::LengthOfStay => 7,
            Self::Acuity => 3,
            Self::Comorbidity => 5,
            Self::EmergencyVisits => 5,
        }
    }
}

/// Column handles for the scored fields, resolved once per table.
pub(crate) struct RecordColumns<'a> {
    time_in_hospital: Option<&'a Column>,
    admission_type_id: Option<&'a Column>,
    diag_1: Option<&'a Column>,
    diag_2: Option<&'a Column>,
    diag_3: Option<&'a Column>,
    num_procedures: Option<&'a Column>,
    num_medications: Option<&'a Column>,
    number_emergency: Option<&'a Column>,
    readmitted: Option<&'a Column>,
}

impl<'a> RecordColumns<'a> {
    pub(crate) fn resolve(table: &'a Table) -> Self {
        Self {
            time_in_hospital: table.column("time_in_hospital"),
            admission_type_id: table.column("admission_type_id"),
            diag_1: table.column("diag_1"),
            diag_2: table.column("diag_2"),
            diag_3: table.column("diag_3"),
            num_procedures: table.column("num_procedures"),
            num_medications: table.column("num_medications"),
            number_emergency: table.column("number_emergency"),
            readmitted: table.column("readmitted"),
        }
    }

    pub(crate) fn record(&self, row: usize) -> PatientRecord {
        let integer = |column: Option<&Column>| {
            column
                .and_then(|column| column.values().get(row))
                .filter(|value| !value.is_null())
                .map(|value| value.as_i64().unwrap_or(0))
        };
        let text = |column: Option<&Column>| {
            column
                .and_then(|column| column.values().get(row))
                .and_then(|value| value.as_text())
        };

        PatientRecord {
            time_in_hospital: integer(self.time_in_hospital),
            admission_type_id: integer(self.admission_type_id),
            diag_1: text(self.diag_1),
            diag_2: text(self.diag_2),
            diag_3: text(self.diag_3),
            num_procedures: integer(self.num_procedures),
            num_medications: integer(self.num_medications),
            number_emergency: integer(self.number_emergency),
            readmitted: text(self.readmitted),
        }
    }
}

fn code_as_string<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum Code {
        Text(String),
        Integer(i64),
        Float(f64),
    }

    let code = Option::<Code>::deserialize(deserializer)?;
    Ok(code.map(|code| match code {
        Code::Text(text) => text,
        Code::Integer(value) => value.to_string(),
        Code::Float(value) => value.to_string(),
    }))
}
