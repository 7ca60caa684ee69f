use inquire::{
    CustomUserError,
    autocompletion::{Autocomplete, Replacement},
};
use tokio::sync::mpsc::UnboundedSender;
use weather_core::{AppEvent, catalog};

/// City prompt autocompleter backed by the built-in catalog.
///
/// Every keystroke and every accepted suggestion is forwarded to the app as
/// an event, so the session state sees the same search box the prompt shows.
#[derive(Debug, Clone)]
pub struct CityCompleter {
    events: UnboundedSender<AppEvent>,
    last: Vec<String>,
}

impl CityCompleter {
    pub fn new(events: UnboundedSender<AppEvent>) -> Self {
        Self {
            events,
            last: Vec::new(),
        }
    }
}

impl Autocomplete for CityCompleter {
    fn get_suggestions(&mut self, input: &str) -> Result<Vec<String>, CustomUserError> {
        let _ = self.events.send(AppEvent::TextChanged(input.to_string()));

        self.last = catalog::suggest(catalog::CITIES, input)
            .into_iter()
            .map(str::to_string)
            .collect();
        Ok(self.last.clone())
    }

    fn get_completion(
        &mut self,
        _input: &str,
        highlighted_suggestion: Option<String>,
    ) -> Result<Replacement, CustomUserError> {
        let Some(picked) = highlighted_suggestion else {
            return Ok(None);
        };

        if let Some(index) = self.last.iter().position(|city| *city == picked) {
            let _ = self.events.send(AppEvent::SuggestionPicked(index));
        }
        self.last.clear();
        Ok(Some(picked))
    }
}
