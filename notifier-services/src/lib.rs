//! HTTP-backed weather and message capabilities.
//!
//! Both clients are blocking with a bounded timeout. Callers in
//! `notifier-engine` treat any error as "capability unavailable".

mod gemini;
mod openweather;

pub use gemini::{parse_generation_payload, GeminiClient};
pub use openweather::{parse_weather_payload, OpenWeatherClient};
