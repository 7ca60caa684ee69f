//! Turns interpreted records into display rows. Rows carry content plus a
//! color slot per text element; the composer never looks at the theme.

use crate::{
    model::{CurrentConditions, ForecastEntry, WeatherRecord, reading, text_or_unavailable},
    theme::Rgb,
};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum IconKind {
    Location,
    Thermometer,
    FeelsLike,
    Humidity,
    Pressure,
    Wind,
    Visibility,
    Sunrise,
    Sunset,
    Description,
    Forecast,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TextElement {
    pub text: String,
    /// Theme-dependent slot, rewritten by [`crate::theme::repaint`].
    pub color: Rgb,
}

impl TextElement {
    fn new(text: String) -> Self {
        Self {
            text,
            color: Rgb::default(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DisplayRow {
    pub icon: IconKind,
    pub elements: Vec<TextElement>,
}

impl DisplayRow {
    fn single(icon: IconKind, text: String) -> Self {
        Self {
            icon,
            elements: vec![TextElement::new(text)],
        }
    }

    fn field(icon: IconKind, label: &str, value: String) -> Self {
        Self::single(icon, format!("{label}: {value}"))
    }

    /// All text elements joined by newlines, colors ignored.
    pub fn text(&self) -> String {
        self.elements
            .iter()
            .map(|e| e.text.as_str())
            .collect::<Vec<_>>()
            .join("\n")
    }
}

pub fn compose(record: &WeatherRecord) -> Vec<DisplayRow> {
    match record {
        WeatherRecord::Current(current) => compose_current(current),
        WeatherRecord::Forecast(entries) => entries.iter().map(compose_entry).collect(),
    }
}

fn compose_current(c: &CurrentConditions) -> Vec<DisplayRow> {
    let header = match &c.country {
        Some(country) => format!("{}, {}", c.city_label, country),
        None => c.city_label.clone(),
    };

    vec![
        DisplayRow::single(IconKind::Location, header),
        DisplayRow::field(IconKind::Thermometer, "Temperature", reading(c.temperature_c, "°C")),
        DisplayRow::field(IconKind::FeelsLike, "Feels like", reading(c.feels_like_c, "°C")),
        DisplayRow::field(IconKind::Humidity, "Humidity", reading(c.humidity_pct, "%")),
        DisplayRow::field(IconKind::Pressure, "Pressure", reading(c.pressure_hpa, " hPa")),
        DisplayRow::field(IconKind::Wind, "Wind", reading(c.wind_speed_mps, " m/s")),
        DisplayRow::field(IconKind::Visibility, "Visibility", reading(c.visibility_m, " m")),
        DisplayRow::field(IconKind::Sunrise, "Sunrise", text_or_unavailable(c.sunrise.as_deref())),
        DisplayRow::field(IconKind::Sunset, "Sunset", text_or_unavailable(c.sunset.as_deref())),
        DisplayRow::field(
            IconKind::Description,
            "Description",
            text_or_unavailable(c.description.as_deref()),
        ),
    ]
}

fn compose_entry(e: &ForecastEntry) -> DisplayRow {
    let lines = [
        text_or_unavailable(e.timestamp.as_deref()),
        format!(
            "Temperature: {}, Description: {}",
            reading(e.temperature_c, "°C"),
            text_or_unavailable(e.description.as_deref()),
        ),
        format!(
            "Wind: {}, Humidity: {}, Pressure: {}",
            reading(e.wind_speed_mps, " m/s"),
            reading(e.humidity_pct, "%"),
            reading(e.pressure_hpa, " hPa"),
        ),
    ];

    DisplayRow {
        icon: IconKind::Forecast,
        elements: lines.into_iter().map(TextElement::new).collect(),
    }
}
