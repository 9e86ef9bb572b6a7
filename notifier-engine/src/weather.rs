use notifier_core::{NotifierError, WeatherSnapshot};

/// Weather capability consulted for the location factor.
pub trait WeatherLookup {
    fn lookup(&self, location: &str) -> Result<WeatherSnapshot, NotifierError>;
}

impl<T: WeatherLookup + ?Sized> WeatherLookup for &T {
    fn lookup(&self, location: &str) -> Result<WeatherSnapshot, NotifierError> {
        (**self).lookup(location)
    }
}

impl<T: WeatherLookup + ?Sized> WeatherLookup for Box<T> {
    fn lookup(&self, location: &str) -> Result<WeatherSnapshot, NotifierError> {
        (**self).lookup(location)
    }
}

/// Returns the same snapshot for every location.
#[derive(Debug, Clone)]
pub struct FixedWeather(pub WeatherSnapshot);

impl WeatherLookup for FixedWeather {
    fn lookup(&self, _location: &str) -> Result<WeatherSnapshot, NotifierError> {
        Ok(self.0.clone())
    }
}

/// Lookup used when no weather source is configured; always fails.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoWeather;

impl WeatherLookup for NoWeather {
    fn lookup(&self, location: &str) -> Result<WeatherSnapshot, NotifierError> {
        Err(NotifierError::WeatherUnavailable(format!(
            "no weather source configured for {location}"
        )))
    }
}

/// Heat index in °C (Rothfusz regression, evaluated in °F).
pub fn heat_index_celsius(temp_c: f64, humidity: f64) -> f64 {
    let t = temp_c * 9.0 / 5.0 + 32.0;
    let rh = humidity;

    let hi = -42.379 + 2.049_015_23 * t + 10.143_331_27 * rh
        - 0.224_755_41 * t * rh
        - 6.837_83e-3 * t * t
        - 5.481_717e-2 * rh * rh
        + 1.228_74e-3 * t * t * rh
        + 8.5282e-4 * t * rh * rh
        - 1.99e-6 * t * t * rh * rh;

    (hi - 32.0) * 5.0 / 9.0
}
