//! Validates a provider payload and extracts a typed [`WeatherRecord`].
//!
//! Mandatory blocks (`main` for current conditions, `list` for forecasts)
//! decide between a record and a rejection. Everything below them is
//! optional: a missing or mistyped field becomes `None`, never an error.

use chrono::{DateTime, FixedOffset, Local};
use serde_json::Value;

use crate::{
    error::WeatherError,
    model::{CurrentConditions, ForecastEntry, Payload, WeatherRecord, WeatherRequest},
};

pub fn interpret(payload: &Payload, request: &WeatherRequest) -> Result<WeatherRecord, WeatherError> {
    if !payload.is_object() {
        return Err(WeatherError::UnexpectedFailure(
            "OpenWeather response is not a JSON object".to_string(),
        ));
    }

    match request.period.forecast_entries() {
        None => current(payload, request).map(WeatherRecord::Current),
        Some(count) => forecast(payload, request, count).map(WeatherRecord::Forecast),
    }
}

fn current(payload: &Value, request: &WeatherRequest) -> Result<CurrentConditions, WeatherError> {
    let main = match payload.get("main") {
        None | Some(Value::Null) => {
            let provider_message = payload.get("message").and_then(Value::as_str).unwrap_or("");
            tracing::info!(
                city = %request.city,
                provider_message,
                "No `main` block in current conditions",
            );
            return Err(WeatherError::CityNotFound(request.city.clone()));
        }
        Some(main) if !main.is_object() => {
            return Err(WeatherError::UnexpectedFailure(
                "`main` block in OpenWeather response is malformed".to_string(),
            ));
        }
        Some(main) => main,
    };

    let offset = payload
        .get("timezone")
        .and_then(Value::as_i64)
        .and_then(|secs| i32::try_from(secs).ok())
        .and_then(FixedOffset::east_opt);
    let sys = payload.get("sys");

    let city_label = payload
        .get("name")
        .and_then(Value::as_str)
        .map(str::trim)
        .filter(|name| !name.is_empty())
        .unwrap_or(request.city.as_str())
        .to_string();

    Ok(CurrentConditions {
        city_label,
        country: sys.and_then(|s| text(s.get("country"))),
        temperature_c: number(main.get("temp")),
        feels_like_c: number(main.get("feels_like")),
        humidity_pct: number(main.get("humidity")),
        pressure_hpa: number(main.get("pressure")),
        wind_speed_mps: number(payload.get("wind").and_then(|w| w.get("speed"))),
        visibility_m: number(payload.get("visibility")),
        description: description(payload),
        sunrise: sys
            .and_then(|s| s.get("sunrise"))
            .and_then(Value::as_i64)
            .and_then(|ts| wall_clock(ts, offset)),
        sunset: sys
            .and_then(|s| s.get("sunset"))
            .and_then(Value::as_i64)
            .and_then(|ts| wall_clock(ts, offset)),
    })
}

fn forecast(
    payload: &Value,
    request: &WeatherRequest,
    count: usize,
) -> Result<Vec<ForecastEntry>, WeatherError> {
    let Some(list) = payload.get("list").and_then(Value::as_array) else {
        tracing::info!(city = %request.city, "No `list` in forecast response");
        return Err(WeatherError::ForecastUnavailable(request.city.clone()));
    };

    if list.len() < count {
        tracing::info!(
            city = %request.city,
            period = %request.period,
            got = list.len(),
            needed = count,
            "Forecast response is too short",
        );
        return Err(WeatherError::ForecastUnavailable(request.city.clone()));
    }

    Ok(list.iter().take(count).map(forecast_entry).collect())
}

fn forecast_entry(entry: &Value) -> ForecastEntry {
    let main = entry.get("main");

    let timestamp = text(entry.get("dt_txt")).or_else(|| {
        entry
            .get("dt")
            .and_then(Value::as_i64)
            .and_then(|ts| DateTime::from_timestamp(ts, 0))
            .map(|dt| dt.format("%Y-%m-%d %H:%M:%S").to_string())
    });

    ForecastEntry {
        timestamp,
        temperature_c: number(main.and_then(|m| m.get("temp"))),
        description: description(entry),
        wind_speed_mps: number(entry.get("wind").and_then(|w| w.get("speed"))),
        humidity_pct: number(main.and_then(|m| m.get("humidity"))),
        pressure_hpa: number(main.and_then(|m| m.get("pressure"))),
    }
}

fn number(value: Option<&Value>) -> Option<f64> {
    value.and_then(Value::as_f64).filter(|v| v.is_finite())
}

fn text(value: Option<&Value>) -> Option<String> {
    value
        .and_then(Value::as_str)
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(str::to_string)
}

fn description(value: &Value) -> Option<String> {
    text(value.get("weather")?.get(0)?.get("description"))
}

/// Epoch seconds to `HH:MM:SS` in the city's offset, or the local zone when
/// the payload has none.
fn wall_clock(ts: i64, offset: Option<FixedOffset>) -> Option<String> {
    let utc = DateTime::from_timestamp(ts, 0)?;
    let formatted = match offset {
        Some(offset) => utc.with_timezone(&offset).format("%H:%M:%S").to_string(),
        None => utc.with_timezone(&Local).format("%H:%M:%S").to_string(),
    };
    Some(formatted)
}
