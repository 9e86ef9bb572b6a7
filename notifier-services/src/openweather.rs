//! OpenWeatherMap current-weather lookup by zip code.

use std::time::Duration;

use notifier_core::{NotifierError, WeatherConfig, WeatherSnapshot};
use notifier_engine::{heat_index_celsius, WeatherLookup};
use reqwest::blocking::Client;
use serde::Deserialize;
use tracing::debug;

#[derive(Debug, Deserialize)]
struct CurrentWeather {
    main: MainReadings,
    #[serde(default)]
    weather: Vec<Condition>,
}

#[derive(Debug, Deserialize)]
struct MainReadings {
    temp: f64,
    feels_like: f64,
    humidity: f64,
    pressure: f64,
}

#[derive(Debug, Deserialize)]
struct Condition {
    description: String,
}

/// Blocking client with the configured request timeout.
#[derive(Debug, Clone)]
pub struct OpenWeatherClient {
    http: Client,
    base_url: String,
    api_key: String,
    heat_wave_temperature_c: f64,
}

impl OpenWeatherClient {
    pub fn from_config(config: &WeatherConfig) -> Result<Self, NotifierError> {
        let api_key = config
            .configured_api_key()
            .map(str::to_string)
            .ok_or_else(|| NotifierError::Config("weather.api_key is not set".to_string()))?;

        let http = Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()
            .map_err(|err| NotifierError::Config(format!("weather client: {err}")))?;

        Ok(Self {
            http,
            base_url: config.base_url.clone(),
            api_key,
            heat_wave_temperature_c: config.heat_wave_temperature_c,
        })
    }
}

impl WeatherLookup for OpenWeatherClient {
    fn lookup(&self, location: &str) -> Result<WeatherSnapshot, NotifierError> {
        let response = self
            .http
            .get(&self.base_url)
            .query(&[
                ("zip", location),
                ("appid", self.api_key.as_str()),
                ("units", "metric"),
            ])
            .send()
            .map_err(|err| NotifierError::WeatherUnavailable(err.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            return Err(NotifierError::WeatherUnavailable(format!(
                "weather API returned status {status}"
            )));
        }

        let body = response
            .text()
            .map_err(|err| NotifierError::WeatherUnavailable(err.to_string()))?;
        let snapshot = parse_weather_payload(&body, self.heat_wave_temperature_c)?;
        debug!(zip_code = location, temperature = snapshot.temperature, "weather fetched");
        Ok(snapshot)
    }
}

/// Converts a current-weather response body into a snapshot.
pub fn parse_weather_payload(
    body: &str,
    heat_wave_temperature_c: f64,
) -> Result<WeatherSnapshot, NotifierError> {
    let payload: CurrentWeather =
        serde_json::from_str(body).map_err(|err| NotifierError::Parse(err.to_string()))?;
    let main = payload.main;

    Ok(WeatherSnapshot {
        temperature: main.temp,
        feels_like: main.feels_like,
        humidity: main.humidity,
        pressure: main.pressure,
        description: payload
            .weather
            .into_iter()
            .next()
            .map(|condition| condition.description)
            .unwrap_or_else(|| "Unknown".to_string()),
        is_heat_wave: main.temp > heat_wave_temperature_c,
        heat_index: heat_index_celsius(main.temp, main.humidity),
    })
}
