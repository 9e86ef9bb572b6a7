//! Patient and facility message text.
//!
//! Generated text is preferred; every path has a deterministic template so a
//! message is always produced.

use chrono::{DateTime, Utc};
use notifier_core::{Facility, NotifierError, Patient, RiskAssessment, RiskLevel, Trimester};
use tracing::warn;

/// Generative text capability (for example a hosted language model).
pub trait MessageGenerator {
    fn generate(&self, prompt: &str) -> Result<String, NotifierError>;
}

impl<T: MessageGenerator + ?Sized> MessageGenerator for &T {
    fn generate(&self, prompt: &str) -> Result<String, NotifierError> {
        (**self).generate(prompt)
    }
}

impl<T: MessageGenerator + ?Sized> MessageGenerator for Box<T> {
    fn generate(&self, prompt: &str) -> Result<String, NotifierError> {
        (**self).generate(prompt)
    }
}

/// Generator used when no capability is configured; always fails.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoGenerator;

impl MessageGenerator for NoGenerator {
    fn generate(&self, _prompt: &str) -> Result<String, NotifierError> {
        Err(NotifierError::MessageUnavailable(
            "no message generator configured".to_string(),
        ))
    }
}

/// Inputs a message is tailored to.
#[derive(Debug, Clone, PartialEq)]
pub struct RiskContext {
    pub risk_level: RiskLevel,
    pub heat_wave: bool,
    pub temperature: f64,
    pub trimester: Option<Trimester>,
    pub trimester_level: Option<RiskLevel>,
}

impl RiskContext {
    pub fn from_assessment(assessment: &RiskAssessment, trimester: Option<Trimester>) -> Self {
        Self {
            risk_level: assessment.risk_level,
            heat_wave: assessment.heat_wave_risk,
            temperature: assessment.weather_data.temperature,
            trimester,
            trimester_level: Some(assessment.factors.trimester_risk.level),
        }
    }
}

#[derive(Debug, Clone)]
pub struct MessageComposer<G> {
    generator: G,
}

impl<G: MessageGenerator> MessageComposer<G> {
    pub fn new(generator: G) -> Self {
        Self { generator }
    }

    /// Generated text when available, otherwise the template for the context.
    pub fn compose(&self, patient: &Patient, context: &RiskContext) -> String {
        match self.generator.generate(&build_prompt(patient, context)) {
            Ok(text) if !text.trim().is_empty() => text.trim().to_string(),
            Ok(_) => {
                warn!(
                    patient_id = patient.id,
                    "message generator returned empty text, using template"
                );
                default_message(patient, context)
            }
            Err(err) => {
                warn!(
                    patient_id = patient.id,
                    error = %err,
                    "message generation failed, using template"
                );
                default_message(patient, context)
            }
        }
    }
}

pub fn build_prompt(patient: &Patient, context: &RiskContext) -> String {
    let conditions = patient.conditions();
    let conditions = if conditions.is_empty() {
        "None".to_string()
    } else {
        conditions.join(", ")
    };
    let trimester = context
        .trimester
        .map(|t| t.to_string())
        .unwrap_or_else(|| "unknown".to_string());
    let trimester_level = context
        .trimester_level
        .map(|level| level.as_str())
        .unwrap_or("unknown");

    format!(
        "Generate a personalized health notification for a pregnant woman with the following details:\n\
         - Name: {name}\n\
         - Age: {age} years\n\
         - Trimester: {trimester} (risk level: {trimester_level})\n\
         - Overall risk level: {level}\n\
         - Heat wave warning: {heat_wave}\n\
         - Current temperature: {temperature}°C\n\
         - Medical conditions: {conditions}\n\
         \n\
         The message should be:\n\
         - Warm and supportive\n\
         - Specific to her risk level and conditions\n\
         - Include practical advice\n\
         - Be in Russian language\n\
         - Maximum 200 words\n\
         - Professional but caring tone",
        name = patient.name,
        age = patient.age,
        level = context.risk_level,
        heat_wave = context.heat_wave,
        temperature = context.temperature,
    )
}

/// Template text used when generation is unavailable.
pub fn default_message(patient: &Patient, context: &RiskContext) -> String {
    let name = patient.first_name().unwrap_or("пациентка");
    match context.risk_level {
        RiskLevel::High if context.heat_wave => format!(
            "Уважаемая {name}, в вашем регионе ожидается жаркая погода ({temp}°C). \
             Учитывая ваш высокий риск, пожалуйста, оставайтесь в прохладном месте, \
             пейте больше воды и немедленно обратитесь к врачу при любых тревожных симптомах.",
            temp = context.temperature
        ),
        RiskLevel::High => format!(
            "Уважаемая {name}, ваш уровень риска повышен. Пожалуйста, регулярно посещайте \
             врача и следите за своим состоянием."
        ),
        RiskLevel::Medium => format!(
            "Уважаемая {name}, следите за своим здоровьем и регулярно консультируйтесь с врачом. \
             При ухудшении самочувствия не откладывайте визит к специалисту."
        ),
        RiskLevel::Low => format!(
            "Уважаемая {name}, продолжайте следить за своим здоровьем и регулярно посещайте \
             врача. Все идет хорошо!"
        ),
    }
}

/// Text sent to the hospital for a doctor call.
pub fn doctor_call_message(patient: &Patient, hospital: &Facility, at: DateTime<Utc>) -> String {
    let trimester = patient
        .trimester()
        .map(|t| t.to_string())
        .unwrap_or_else(|| NOT_SPECIFIED.to_string());
    let weeks = patient
        .weeks_pregnant
        .map(|w| w.to_string())
        .unwrap_or_else(|| NOT_SPECIFIED.to_string());

    format!(
        "🚨 ЭКСТРЕННОЕ УВЕДОМЛЕНИЕ - ВЫСОКИЙ РИСК 🚨\n\
         \n\
         Пациент: {name}\n\
         Возраст: {age} лет\n\
         Недели беременности: {weeks}\n\
         Триместр: {trimester}\n\
         \n\
         Медицинские состояния:\n\
         - Беременность: {pregnancy_code} - {pregnancy_description}\n\
         - Сопутствующие: {comorbidity_code} - {comorbidity_description}\n\
         \n\
         Адрес: {address}\n\
         ZIP: {zip}\n\
         Телефон: {phone}\n\
         \n\
         ТРЕБУЕТСЯ НЕМЕДЛЕННАЯ КОНСУЛЬТАЦИЯ ВРАЧА!\n\
         \n\
         Больница: {hospital_name}\n\
         Телефон: {hospital_phone}\n\
         Адрес: {hospital_address}\n\
         \n\
         Время уведомления: {time}",
        name = patient.name,
        age = patient.age,
        pregnancy_code = or_unspecified(&patient.pregnancy_icd10),
        pregnancy_description = or_unspecified(&patient.pregnancy_description),
        comorbidity_code = or_unspecified(&patient.comorbidity_icd10),
        comorbidity_description = or_unspecified(&patient.comorbidity_description),
        address = or_unspecified(&patient.address),
        zip = patient.zip_code,
        phone = or_unspecified(&patient.phone_number),
        hospital_name = hospital.facility_name,
        hospital_phone = or_unspecified(&hospital.facility_phone_number),
        hospital_address = hospital.full_address(),
        time = at.format("%Y-%m-%d %H:%M:%S"),
    )
}

/// Generic "contact your doctor" text for the fallback path.
pub fn fallback_message(patient: &Patient, risk_level: RiskLevel) -> String {
    format!(
        "⚠️ Уведомление о риске - {upper}\n\
         \n\
         Пациент: {name}\n\
         Уровень риска: {level}\n\
         \n\
         Пожалуйста, обратитесь к врачу для консультации.",
        upper = risk_level.as_str().to_uppercase(),
        name = patient.name,
        level = risk_level,
    )
}

pub fn risk_level_label(level: RiskLevel) -> &'static str {
    match level {
        RiskLevel::Low => "Низкий",
        RiskLevel::Medium => "Средний",
        RiskLevel::High => "Высокий",
    }
}

pub fn trimester_label(trimester: Trimester) -> &'static str {
    match trimester {
        Trimester::First => "Первый триместр",
        Trimester::Second => "Второй триместр",
        Trimester::Third => "Третий триместр",
    }
}

/// Advice lines for a risk level, with heat-wave advice appended.
pub fn recommendations(level: RiskLevel, heat_wave: bool) -> Vec<&'static str> {
    let mut lines = match level {
        RiskLevel::High => vec![
            "Регулярно консультируйтесь с врачом",
            "Следите за артериальным давлением",
            "Отслеживайте движения плода",
            "Избегайте стрессовых ситуаций",
        ],
        RiskLevel::Medium => vec![
            "Планируйте регулярные визиты к врачу",
            "Ведите здоровый образ жизни",
            "Следите за питанием",
        ],
        RiskLevel::Low => vec![
            "Продолжайте регулярные визиты к врачу",
            "Ведите активный образ жизни",
            "Следите за общим самочувствием",
        ],
    };

    if heat_wave {
        lines.extend([
            "Оставайтесь в прохладном месте",
            "Пейте больше воды",
            "Избегайте прямых солнечных лучей",
            "Немедленно обратитесь к врачу при ухудшении самочувствия",
        ]);
    }

    lines
}

const NOT_SPECIFIED: &str = "не указано";

fn or_unspecified(value: &Option<String>) -> &str {
    value
        .as_deref()
        .filter(|text| !text.trim().is_empty())
        .unwrap_or(NOT_SPECIFIED)
}
