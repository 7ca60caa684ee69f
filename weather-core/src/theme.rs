use serde::{Deserialize, Serialize};

use crate::render::DisplayRow;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct Rgb(pub u8, pub u8, pub u8);

impl Rgb {
    pub const BLACK: Rgb = Rgb(0, 0, 0);
    pub const WHITE: Rgb = Rgb(255, 255, 255);
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Theme {
    #[default]
    Light,
    Dark,
}

impl Theme {
    pub fn toggled(self) -> Self {
        match self {
            Theme::Light => Theme::Dark,
            Theme::Dark => Theme::Light,
        }
    }

    pub fn foreground(self) -> Rgb {
        match self {
            Theme::Light => Rgb::BLACK,
            Theme::Dark => Rgb::WHITE,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Theme::Light => "light",
            Theme::Dark => "dark",
        }
    }
}

impl std::fmt::Display for Theme {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for Theme {
    type Err = anyhow::Error;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value.trim().to_lowercase().as_str() {
            "light" => Ok(Theme::Light),
            "dark" => Ok(Theme::Dark),
            _ => Err(anyhow::anyhow!(
                "Unknown theme '{value}'. Supported themes: light, dark."
            )),
        }
    }
}

/// Rewrites the color slot of every text element to `theme`'s foreground.
/// Content, order and row count are never touched.
pub fn repaint(rows: &mut [DisplayRow], theme: Theme) {
    let fg = theme.foreground();
    for element in rows.iter_mut().flat_map(|row| row.elements.iter_mut()) {
        element.color = fg;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        model::{ForecastEntry, WeatherRecord},
        render::compose,
    };

    fn forecast_rows() -> Vec<DisplayRow> {
        let entry = ForecastEntry {
            timestamp: Some("2026-10-20 00:00:00".into()),
            temperature_c: Some(9.0),
            description: Some("mist".into()),
            wind_speed_mps: None,
            humidity_pct: Some(91.0),
            pressure_hpa: None,
        };
        compose(&WeatherRecord::Forecast(vec![entry.clone(), entry]))
    }

    fn texts(rows: &[DisplayRow]) -> Vec<String> {
        rows.iter().map(DisplayRow::text).collect()
    }

    #[test]
    fn toggle_is_an_involution() {
        assert_eq!(Theme::Light.toggled(), Theme::Dark);
        assert_eq!(Theme::Light.toggled().toggled(), Theme::Light);
    }

    #[test]
    fn repaint_only_touches_colors() {
        let mut rows = forecast_rows();
        let before = texts(&rows);

        repaint(&mut rows, Theme::Dark);

        assert_eq!(texts(&rows), before);
        assert!(
            rows.iter()
                .flat_map(|r| &r.elements)
                .all(|e| e.color == Rgb::WHITE)
        );
    }

    #[test]
    fn repaint_is_idempotent() {
        let mut once = forecast_rows();
        repaint(&mut once, Theme::Dark);

        let mut twice = once.clone();
        repaint(&mut twice, Theme::Dark);

        assert_eq!(once, twice);
    }

    #[test]
    fn double_toggle_restores_original_colors() {
        let mut rows = forecast_rows();
        repaint(&mut rows, Theme::Light);
        let original = rows.clone();

        let mut theme = Theme::Light;
        for _ in 0..2 {
            theme = theme.toggled();
            repaint(&mut rows, theme);
        }

        assert_eq!(rows, original);
    }

    #[test]
    fn theme_parses_from_str() {
        assert_eq!("Dark".parse::<Theme>().unwrap(), Theme::Dark);
        assert!("sepia".parse::<Theme>().is_err());
    }
}
