use std::fmt;

use serde::{Deserialize, Serialize};

pub type PatientId = u64;

/// Pregnancy stage derived from weeks pregnant.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[serde(into = "u8", try_from = "u8")]
pub enum Trimester {
    First,
    Second,
    Third,
}

impl Trimester {
    /// `None` for a missing or zero week count.
    pub fn from_weeks(weeks: u32) -> Option<Self> {
        match weeks {
            0 => None,
            1..=12 => Some(Self::First),
            13..=24 => Some(Self::Second),
            _ => Some(Self::Third),
        }
    }

    pub fn number(self) -> u8 {
        match self {
            Self::First => 1,
            Self::Second => 2,
            Self::Third => 3,
        }
    }
}

impl From<Trimester> for u8 {
    fn from(trimester: Trimester) -> Self {
        trimester.number()
    }
}

impl TryFrom<u8> for Trimester {
    type Error = String;

    fn try_from(value: u8) -> Result<Self, Self::Error> {
        match value {
            1 => Ok(Self::First),
            2 => Ok(Self::Second),
            3 => Ok(Self::Third),
            other => Err(format!("trimester must be 1, 2 or 3, received {other}")),
        }
    }
}

impl fmt::Display for Trimester {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.number())
    }
}

/// Pregnant patient as supplied by the records layer.
///
/// `between_17_35` keeps three states: absent (`None`), `Some(false)` and
/// `Some(true)`. The age-group factor is only scored when the flag is present.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Default)]
pub struct Patient {
    #[serde(default)]
    pub id: PatientId,
    #[serde(default)]
    pub name: String,
    pub age: u32,
    #[serde(default)]
    pub weeks_pregnant: Option<u32>,
    #[serde(default)]
    pub pregnancy_icd10: Option<String>,
    #[serde(default)]
    pub pregnancy_description: Option<String>,
    #[serde(default)]
    pub comorbidity_icd10: Option<String>,
    #[serde(default)]
    pub comorbidity_description: Option<String>,
    /// Legacy free list of diagnosis codes, split by the "O" prefix.
    #[serde(default)]
    pub conditions_icd10: Vec<String>,
    /// Semicolon-delimited medication names.
    #[serde(default)]
    pub medications: Option<String>,
    #[serde(default)]
    pub medication_notes: Option<String>,
    /// Semicolon-delimited NDC codes.
    #[serde(default)]
    pub ndc_codes: Option<String>,
    #[serde(default)]
    pub between_17_35: Option<bool>,
    pub zip_code: String,
    #[serde(default)]
    pub address: Option<String>,
    #[serde(default)]
    pub phone_number: Option<String>,
    #[serde(default)]
    pub email: Option<String>,
}

impl Patient {
    pub fn trimester(&self) -> Option<Trimester> {
        self.weeks_pregnant.and_then(Trimester::from_weeks)
    }

    pub fn medication_list(&self) -> Vec<String> {
        split_semicolon_list(self.medications.as_deref())
    }

    pub fn ndc_code_list(&self) -> Vec<String> {
        split_semicolon_list(self.ndc_codes.as_deref())
    }

    /// Explicit pregnancy and comorbidity codes, in that order.
    pub fn conditions(&self) -> Vec<String> {
        [&self.pregnancy_icd10, &self.comorbidity_icd10]
            .into_iter()
            .filter_map(|code| non_blank(code.as_deref()))
            .collect()
    }

    /// Outside the 17-35 group unless the flag is explicitly set.
    pub fn is_high_risk_age(&self) -> bool {
        self.between_17_35 != Some(true)
    }

    pub fn first_name(&self) -> Option<&str> {
        self.name.split_whitespace().next()
    }
}

fn non_blank(value: Option<&str>) -> Option<String> {
    value
        .map(str::trim)
        .filter(|text| !text.is_empty())
        .map(str::to_string)
}

fn split_semicolon_list(value: Option<&str>) -> Vec<String> {
    value
        .map(|raw| {
            raw.split(';')
                .map(str::trim)
                .filter(|item| !item.is_empty())
                .map(str::to_string)
                .collect()
        })
        .unwrap_or_default()
}
