use serde::{Deserialize, Serialize};

/// Top-level configuration handed to the engine and adapters at construction.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Default)]
#[serde(default)]
pub struct NotifierConfig {
    pub scoring: ScoringConfig,
    pub weather: WeatherConfig,
    pub messages: MessageConfig,
}

/// Cut points used by the scoring engine.
///
/// The overall scale and the two sub-score scales do not share cut points.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct ScoringConfig {
    /// Highest total score still classified as low.
    pub overall_low_max: i32,
    /// Highest total score still classified as medium.
    pub overall_medium_max: i32,
    /// Conditions sub-score at which the factor becomes medium.
    pub conditions_medium_min: i32,
    /// Conditions sub-score at which the factor becomes high.
    pub conditions_high_min: i32,
    /// Medications sub-score at which the factor becomes medium.
    pub medications_medium_min: i32,
    /// Medications sub-score at which the factor becomes high.
    pub medications_high_min: i32,
    /// Temperature (°C) above which a non heat-wave day still adds risk.
    pub hot_temperature_c: f64,
}

impl Default for ScoringConfig {
    fn default() -> Self {
        Self {
            overall_low_max: 3,
            overall_medium_max: 5,
            conditions_medium_min: 3,
            conditions_high_min: 6,
            medications_medium_min: 2,
            medications_high_min: 4,
            hot_temperature_c: 30.0,
        }
    }
}

/// Settings for the live weather lookup.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct WeatherConfig {
    pub api_key: Option<String>,
    pub base_url: String,
    pub timeout_secs: u64,
    /// Temperature (°C) above which the lookup reports a heat wave.
    pub heat_wave_temperature_c: f64,
}

impl WeatherConfig {
    /// The API key, unless it is missing or blank.
    pub fn configured_api_key(&self) -> Option<&str> {
        non_blank_key(self.api_key.as_deref())
    }
}

impl Default for WeatherConfig {
    fn default() -> Self {
        Self {
            api_key: None,
            base_url: "http://api.openweathermap.org/data/2.5/weather".to_string(),
            timeout_secs: 10,
            heat_wave_temperature_c: 35.0,
        }
    }
}

/// Settings for the generative message capability.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct MessageConfig {
    pub api_key: Option<String>,
    pub base_url: String,
    pub model: String,
    pub timeout_secs: u64,
}

impl MessageConfig {
    pub fn configured_api_key(&self) -> Option<&str> {
        non_blank_key(self.api_key.as_deref())
    }
}

impl Default for MessageConfig {
    fn default() -> Self {
        Self {
            api_key: None,
            base_url: "https://generativelanguage.googleapis.com/v1beta".to_string(),
            model: "gemini-pro".to_string(),
            timeout_secs: 10,
        }
    }
}

fn non_blank_key(key: Option<&str>) -> Option<&str> {
    key.map(str::trim).filter(|key| !key.is_empty())
}
