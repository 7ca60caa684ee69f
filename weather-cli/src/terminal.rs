use std::io::IsTerminal;

use owo_colors::OwoColorize;
use weather_core::{DisplayRow, DisplaySurface, ErrorNotice, IconKind, Rgb, Theme};

/// Terminal display surface: rows go to stdout, notices to stderr.
#[derive(Debug)]
pub struct TerminalSurface {
    color: bool,
}

impl TerminalSurface {
    pub fn new() -> Self {
        Self {
            color: std::io::stdout().is_terminal(),
        }
    }
}

impl Default for TerminalSurface {
    fn default() -> Self {
        Self::new()
    }
}

impl DisplaySurface for TerminalSurface {
    // The city prompt draws suggestions itself.
    fn show_suggestions(&mut self, query: &str, suggestions: &[String]) {
        tracing::debug!(query, count = suggestions.len(), "Suggestions updated");
    }

    fn show_weather(&mut self, rows: &[DisplayRow]) {
        for row in rows {
            println!("{}", format_row(row, self.color));
        }
    }

    fn clear_weather(&mut self) {
        tracing::debug!("Weather cleared");
    }

    fn repaint(&mut self, theme: Theme, rows: &[DisplayRow]) {
        println!("Theme: {theme}");
        if !rows.is_empty() {
            println!();
            self.show_weather(rows);
        }
    }

    fn show_notice(&mut self, notice: &ErrorNotice) {
        eprintln!("{}", format_notice(notice, self.color));
    }

    fn dismiss_notice(&mut self) {
        tracing::debug!("Notice dismissed");
    }
}

fn glyph(icon: IconKind) -> &'static str {
    match icon {
        IconKind::Location => "📍",
        IconKind::Thermometer => "🌡",
        IconKind::FeelsLike => "🙂",
        IconKind::Humidity => "💧",
        IconKind::Pressure => "⏲",
        IconKind::Wind => "💨",
        IconKind::Visibility => "👁",
        IconKind::Sunrise => "🌅",
        IconKind::Sunset => "🌇",
        IconKind::Description => "📝",
        IconKind::Forecast => "☀",
    }
}

/// One row: glyph and first element on the first line, the rest indented.
pub fn format_row(row: &DisplayRow, color: bool) -> String {
    let emphasize = matches!(row.icon, IconKind::Location | IconKind::Forecast);

    row.elements
        .iter()
        .enumerate()
        .map(|(i, element)| {
            let text = if color {
                let Rgb(r, g, b) = element.color;
                if i == 0 && emphasize {
                    element.text.truecolor(r, g, b).bold().to_string()
                } else {
                    element.text.truecolor(r, g, b).to_string()
                }
            } else {
                element.text.clone()
            };

            if i == 0 {
                format!("{} {text}", glyph(row.icon))
            } else {
                format!("   {text}")
            }
        })
        .collect::<Vec<_>>()
        .join("\n")
}

pub fn format_notice(notice: &ErrorNotice, color: bool) -> String {
    let (mark, warning) = if notice.kind.is_warning() {
        ("⚠", true)
    } else {
        ("✗", false)
    };
    let line = format!("{mark} {}", notice.message);

    match (color, warning) {
        (false, _) => line,
        (true, true) => line.yellow().to_string(),
        (true, false) => line.red().bold().to_string(),
    }
}
