use std::fmt;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::patient::PatientId;

/// Three-level risk classification shared by factors and assessments.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[serde(rename_all = "snake_case")]
pub enum RiskLevel {
    Low,
    Medium,
    High,
}

impl RiskLevel {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Low => "low",
            Self::Medium => "medium",
            Self::High => "high",
        }
    }
}

impl fmt::Display for RiskLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Score contributed by one risk factor.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct FactorScore {
    pub score: i32,
    pub level: RiskLevel,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub details: Vec<String>,
}

impl FactorScore {
    pub fn new(score: i32, level: RiskLevel) -> Self {
        Self {
            score,
            level,
            details: Vec::new(),
        }
    }

    pub fn with_details(mut self, details: Vec<String>) -> Self {
        self.details = details;
        self
    }
}

/// Per-factor breakdown of one assessment.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct RiskFactors {
    pub age_risk: FactorScore,
    pub trimester_risk: FactorScore,
    pub location_risk: FactorScore,
    pub conditions_risk: FactorScore,
    pub medications_risk: FactorScore,
    /// Present only when the patient carries the 17-35 flag.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub age_group_risk: Option<FactorScore>,
}

impl RiskFactors {
    /// Named factors in scoring order.
    pub fn iter(&self) -> impl Iterator<Item = (&'static str, &FactorScore)> {
        [
            ("age_risk", Some(&self.age_risk)),
            ("trimester_risk", Some(&self.trimester_risk)),
            ("location_risk", Some(&self.location_risk)),
            ("conditions_risk", Some(&self.conditions_risk)),
            ("medications_risk", Some(&self.medications_risk)),
            ("age_group_risk", self.age_group_risk.as_ref()),
        ]
        .into_iter()
        .filter_map(|(name, factor)| factor.map(|factor| (name, factor)))
    }

    pub fn total(&self) -> i32 {
        self.iter().map(|(_, factor)| factor.score).sum()
    }
}

/// Weather attributes used for the location factor.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct WeatherSnapshot {
    pub temperature: f64,
    pub feels_like: f64,
    pub humidity: f64,
    pub pressure: f64,
    pub description: String,
    pub is_heat_wave: bool,
    pub heat_index: f64,
}

impl WeatherSnapshot {
    /// Substitute used when the lookup fails.
    pub fn fallback() -> Self {
        Self {
            temperature: 25.0,
            feels_like: 25.0,
            humidity: 50.0,
            pressure: 1013.0,
            description: "Unknown".to_string(),
            is_heat_wave: false,
            heat_index: 25.0,
        }
    }
}

/// Where the weather snapshot of an assessment came from.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum WeatherSource {
    Live,
    Fallback,
}

/// Result of one scoring run. Never mutated once built.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct RiskAssessment {
    pub patient_id: PatientId,
    pub risk_score: i32,
    pub risk_level: RiskLevel,
    pub factors: RiskFactors,
    pub heat_wave_risk: bool,
    pub weather_data: WeatherSnapshot,
    pub weather_source: WeatherSource,
    pub assessed_at: DateTime<Utc>,
}

/// Share of `max_score` reached by `risk_score`, capped at 100.
pub fn risk_percentage(risk_score: i32, max_score: i32) -> u32 {
    if max_score <= 0 || risk_score <= 0 {
        return 0;
    }
    let percent = risk_score as i64 * 100 / max_score as i64;
    percent.min(100) as u32
}
