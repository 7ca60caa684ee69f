use std::{fmt, str::FromStr};

use serde::{Deserialize, Serialize};

/// Text shown in place of a value the provider did not supply.
pub const UNAVAILABLE: &str = "unavailable";

/// Weather horizon requested by the user.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Period {
    Today,
    Tomorrow,
    #[serde(rename = "10days")]
    TenDays,
}

impl Period {
    pub fn as_str(&self) -> &'static str {
        match self {
            Period::Today => "today",
            Period::Tomorrow => "tomorrow",
            Period::TenDays => "10days",
        }
    }

    /// Human label used by menus and headers.
    pub fn label(&self) -> &'static str {
        match self {
            Period::Today => "Today",
            Period::Tomorrow => "Tomorrow",
            Period::TenDays => "10 days",
        }
    }

    /// Number of forecast entries the period displays, `None` for single-point periods.
    pub fn forecast_entries(&self) -> Option<usize> {
        match self {
            Period::Today => None,
            Period::Tomorrow => Some(2),
            Period::TenDays => Some(10),
        }
    }

    pub const fn all() -> &'static [Period] {
        &[Period::Today, Period::Tomorrow, Period::TenDays]
    }
}

impl fmt::Display for Period {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("Unknown period '{0}'. Supported periods: today, tomorrow, 10days.")]
pub struct ParsePeriodError(String);

impl FromStr for Period {
    type Err = ParsePeriodError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value.trim().to_lowercase().as_str() {
            "today" => Ok(Period::Today),
            "tomorrow" => Ok(Period::Tomorrow),
            "10days" | "10-days" | "ten-days" | "tendays" => Ok(Period::TenDays),
            _ => Err(ParsePeriodError(value.to_string())),
        }
    }
}

/// A (city, period) pair. The city is checked for emptiness by the fetch
/// controller, not here.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WeatherRequest {
    pub city: String,
    pub period: Period,
}

impl WeatherRequest {
    pub fn new(city: impl Into<String>, period: Period) -> Self {
        Self {
            city: city.into().trim().to_string(),
            period,
        }
    }
}

/// Raw provider payload handed from the fetch controller to the interpreter.
pub type Payload = serde_json::Value;

/// Interpreted current conditions. `None` means the provider omitted or
/// mangled the field.
#[derive(Debug, Clone, PartialEq)]
pub struct CurrentConditions {
    pub city_label: String,
    pub country: Option<String>,
    pub temperature_c: Option<f64>,
    pub feels_like_c: Option<f64>,
    pub humidity_pct: Option<f64>,
    pub pressure_hpa: Option<f64>,
    pub wind_speed_mps: Option<f64>,
    pub visibility_m: Option<f64>,
    pub description: Option<String>,
    /// Local wall-clock time, `HH:MM:SS`.
    pub sunrise: Option<String>,
    pub sunset: Option<String>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct ForecastEntry {
    pub timestamp: Option<String>,
    pub temperature_c: Option<f64>,
    pub description: Option<String>,
    pub wind_speed_mps: Option<f64>,
    pub humidity_pct: Option<f64>,
    pub pressure_hpa: Option<f64>,
}

#[derive(Debug, Clone, PartialEq)]
pub enum WeatherRecord {
    Current(CurrentConditions),
    /// Exactly [`Period::forecast_entries`] entries in provider order, so the
    /// entry count is the vector's length.
    Forecast(Vec<ForecastEntry>),
}

/// Formats an optional reading with its unit, or [`UNAVAILABLE`].
pub fn reading(value: Option<f64>, unit: &str) -> String {
    match value {
        Some(v) => format!("{v}{unit}"),
        None => UNAVAILABLE.to_string(),
    }
}

/// Formats optional text, or [`UNAVAILABLE`].
pub fn text_or_unavailable(value: Option<&str>) -> String {
    value.unwrap_or(UNAVAILABLE).to_string()
}
