//! Multi-factor risk scoring.

use chrono::Utc;
use notifier_core::{
    FactorScore, Patient, RiskAssessment, RiskFactors, RiskLevel, ScoringConfig, Trimester,
    WeatherSnapshot, WeatherSource,
};
use tracing::{debug, warn};

use crate::tables::{
    contains_code, match_medication, HIGH_RISK_COMORBIDITY_CODES, HIGH_RISK_MEDICATIONS,
    HIGH_RISK_PREGNANCY_CODES, MEDIUM_RISK_COMORBIDITY_CODES, MEDIUM_RISK_MEDICATIONS,
};
use crate::weather::WeatherLookup;

/// Scores patients against the configured cut points and a weather source.
#[derive(Debug, Clone)]
pub struct RiskEngine<W> {
    weather: W,
    config: ScoringConfig,
}

impl<W: WeatherLookup> RiskEngine<W> {
    pub fn new(weather: W, config: ScoringConfig) -> Self {
        Self { weather, config }
    }

    pub fn config(&self) -> &ScoringConfig {
        &self.config
    }

    /// Runs one assessment. Weather failures are absorbed, never returned.
    pub fn assess(&self, patient: &Patient) -> RiskAssessment {
        let (location_risk, weather_data, weather_source) =
            match self.weather.lookup(&patient.zip_code) {
                Ok(weather) => {
                    let factor = location_risk(&weather, &self.config);
                    (factor, weather, WeatherSource::Live)
                }
                Err(err) => {
                    warn!(
                        patient_id = patient.id,
                        zip_code = %patient.zip_code,
                        error = %err,
                        "weather lookup failed, using default snapshot"
                    );
                    (
                        FactorScore::new(1, RiskLevel::Medium),
                        WeatherSnapshot::fallback(),
                        WeatherSource::Fallback,
                    )
                }
            };

        let factors = RiskFactors {
            age_risk: age_risk(patient.age),
            trimester_risk: trimester_risk(patient.trimester()),
            location_risk,
            conditions_risk: conditions_risk(patient, &self.config),
            medications_risk: medications_risk(&patient.medication_list(), &self.config),
            age_group_risk: patient.between_17_35.map(age_group_risk),
        };

        let risk_score = factors.total();
        let risk_level = classify_total(risk_score, &self.config);

        debug!(
            patient_id = patient.id,
            risk_score,
            risk_level = %risk_level,
            "risk assessment computed"
        );

        RiskAssessment {
            patient_id: patient.id,
            risk_score,
            risk_level,
            heat_wave_risk: weather_data.is_heat_wave,
            factors,
            weather_data,
            weather_source,
            assessed_at: Utc::now(),
        }
    }
}

/// Overall classification of a summed score.
pub fn classify_total(risk_score: i32, config: &ScoringConfig) -> RiskLevel {
    if risk_score <= config.overall_low_max {
        RiskLevel::Low
    } else if risk_score <= config.overall_medium_max {
        RiskLevel::Medium
    } else {
        RiskLevel::High
    }
}

pub fn age_risk(age: u32) -> FactorScore {
    match age {
        17..=20 | 31..=35 => FactorScore::new(2, RiskLevel::High),
        21..=30 => FactorScore::new(1, RiskLevel::Medium),
        _ => FactorScore::new(0, RiskLevel::Low),
    }
}

/// Unknown trimester scores like the second one.
pub fn trimester_risk(trimester: Option<Trimester>) -> FactorScore {
    match trimester {
        Some(Trimester::Third) => FactorScore::new(2, RiskLevel::High),
        Some(Trimester::First) => FactorScore::new(1, RiskLevel::Medium),
        Some(Trimester::Second) | None => FactorScore::new(0, RiskLevel::Low),
    }
}

pub fn location_risk(weather: &WeatherSnapshot, config: &ScoringConfig) -> FactorScore {
    if weather.is_heat_wave {
        FactorScore::new(2, RiskLevel::High)
    } else if weather.temperature > config.hot_temperature_c {
        FactorScore::new(1, RiskLevel::Medium)
    } else {
        FactorScore::new(0, RiskLevel::Low)
    }
}

/// Sums diagnosis code contributions; the level uses the conditions sub-scale.
pub fn conditions_risk(patient: &Patient, config: &ScoringConfig) -> FactorScore {
    let mut pregnancy_codes = Vec::new();
    let mut comorbidity_codes = Vec::new();

    if let Some(code) = present_code(patient.pregnancy_icd10.as_deref()) {
        pregnancy_codes.push(code);
    }
    if let Some(code) = present_code(patient.comorbidity_icd10.as_deref()) {
        comorbidity_codes.push(code);
    }
    for code in patient
        .conditions_icd10
        .iter()
        .filter_map(|code| present_code(Some(code.as_str())))
    {
        if is_pregnancy_code(code) {
            pregnancy_codes.push(code);
        } else {
            comorbidity_codes.push(code);
        }
    }

    let mut score = 0;
    let mut details = Vec::new();

    for code in pregnancy_codes {
        if contains_code(&HIGH_RISK_PREGNANCY_CODES, code) {
            score += 2;
            details.push(format!("High-risk pregnancy: {code}"));
        } else if is_pregnancy_code(code) {
            score += 1;
            details.push(format!("Pregnancy condition: {code}"));
        }
    }

    for code in comorbidity_codes {
        if contains_code(&HIGH_RISK_COMORBIDITY_CODES, code) {
            score += 2;
            details.push(format!("High-risk comorbidity: {code}"));
        } else if contains_code(&MEDIUM_RISK_COMORBIDITY_CODES, code) {
            score += 1;
            details.push(format!("Medium-risk comorbidity: {code}"));
        }
    }

    let level = classify_sub_score(
        score,
        config.conditions_medium_min,
        config.conditions_high_min,
    );
    FactorScore::new(score, level).with_details(details)
}

/// A medication is checked against the medium table only when no high-risk
/// entry matched it.
pub fn medications_risk(medications: &[String], config: &ScoringConfig) -> FactorScore {
    let mut score = 0;
    let mut details = Vec::new();

    for medication in medications {
        if let Some((_, description)) = match_medication(&HIGH_RISK_MEDICATIONS, medication) {
            score += 2;
            details.push(format!("High-risk medication: {medication} - {description}"));
        } else if let Some((_, description)) =
            match_medication(&MEDIUM_RISK_MEDICATIONS, medication)
        {
            score += 1;
            details.push(format!(
                "Medium-risk medication: {medication} - {description}"
            ));
        }
    }

    let level = classify_sub_score(
        score,
        config.medications_medium_min,
        config.medications_high_min,
    );
    FactorScore::new(score, level).with_details(details)
}

pub fn age_group_risk(between_17_35: bool) -> FactorScore {
    if between_17_35 {
        FactorScore::new(0, RiskLevel::Low)
            .with_details(vec!["Optimal age range (17-35 years)".to_string()])
    } else {
        FactorScore::new(2, RiskLevel::High)
            .with_details(vec!["Outside optimal age range (17-35 years)".to_string()])
    }
}

fn classify_sub_score(score: i32, medium_min: i32, high_min: i32) -> RiskLevel {
    if score >= high_min {
        RiskLevel::High
    } else if score >= medium_min {
        RiskLevel::Medium
    } else {
        RiskLevel::Low
    }
}

fn is_pregnancy_code(code: &str) -> bool {
    code.starts_with('O')
}

fn present_code(code: Option<&str>) -> Option<&str> {
    code.map(str::trim).filter(|code| !code.is_empty())
}
