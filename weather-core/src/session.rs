//! UI session state and its reaction to events.
//!
//! [`UiState::handle`] is synchronous and performs no I/O: it updates state
//! and returns the effects the driver must apply. Completions and retry
//! notices are honoured only for the latest request id.

use crate::{
    catalog::SearchBox,
    error::WeatherError,
    fetch::RequestId,
    model::{Period, WeatherRecord, WeatherRequest},
    notice::{ErrorNotice, NoticeId},
    render::{DisplayRow, compose},
    theme::{Theme, repaint},
};

#[derive(Debug, Clone, PartialEq)]
pub enum AppEvent {
    TextChanged(String),
    SuggestionPicked(usize),
    FetchRequested(Period),
    ThemeToggled,
    RetryScheduled {
        request_id: RequestId,
        notice: ErrorNotice,
    },
    FetchCompleted {
        request_id: RequestId,
        result: Result<WeatherRecord, WeatherError>,
    },
    NoticeExpired(NoticeId),
    Quit,
}

#[derive(Debug, Clone, PartialEq)]
pub enum Effect {
    /// Query text and suggestions, updated together.
    ShowSuggestions {
        query: String,
        suggestions: Vec<String>,
    },
    ClearWeather,
    ShowWeather(Vec<DisplayRow>),
    Repaint {
        theme: Theme,
        rows: Vec<DisplayRow>,
    },
    ShowNotice {
        id: NoticeId,
        notice: ErrorNotice,
    },
    DismissNotice(NoticeId),
    StartFetch {
        request_id: RequestId,
        request: WeatherRequest,
    },
    Exit,
}

#[derive(Debug, Clone, Default)]
pub struct UiState {
    theme: Theme,
    search: SearchBox,
    displayed_rows: Vec<DisplayRow>,
    latest_request_id: RequestId,
    pending_request: Option<RequestId>,
    notice: Option<(NoticeId, ErrorNotice)>,
    last_notice_id: NoticeId,
}

impl UiState {
    pub fn new(theme: Theme) -> Self {
        Self {
            theme,
            ..Self::default()
        }
    }

    pub fn theme(&self) -> Theme {
        self.theme
    }

    pub fn search(&self) -> &SearchBox {
        &self.search
    }

    pub fn displayed_rows(&self) -> &[DisplayRow] {
        &self.displayed_rows
    }

    pub fn latest_request_id(&self) -> RequestId {
        self.latest_request_id
    }

    /// The latest request, while it has not completed.
    pub fn pending_request(&self) -> Option<RequestId> {
        self.pending_request
    }

    pub fn notice(&self) -> Option<&ErrorNotice> {
        self.notice.as_ref().map(|(_, notice)| notice)
    }

    pub fn handle(&mut self, event: AppEvent) -> Vec<Effect> {
        match event {
            AppEvent::TextChanged(text) => {
                self.search.set_text(text);
                vec![self.search_effect()]
            }
            AppEvent::SuggestionPicked(index) => match self.search.pick(index) {
                Some(_) => vec![self.search_effect()],
                None => Vec::new(),
            },
            AppEvent::FetchRequested(period) => self.start_request(period),
            AppEvent::ThemeToggled => {
                self.theme = self.theme.toggled();
                repaint(&mut self.displayed_rows, self.theme);
                vec![Effect::Repaint {
                    theme: self.theme,
                    rows: self.displayed_rows.clone(),
                }]
            }
            AppEvent::RetryScheduled { request_id, notice } => {
                if self.is_stale(request_id) {
                    return Vec::new();
                }
                vec![self.show_notice(notice)]
            }
            AppEvent::FetchCompleted { request_id, result } => {
                if self.is_stale(request_id) {
                    return Vec::new();
                }
                self.pending_request = None;
                self.complete(result)
            }
            AppEvent::NoticeExpired(id) => match &self.notice {
                Some((current, _)) if *current == id => {
                    self.notice = None;
                    vec![Effect::DismissNotice(id)]
                }
                _ => Vec::new(),
            },
            AppEvent::Quit => vec![Effect::Exit],
        }
    }

    fn start_request(&mut self, period: Period) -> Vec<Effect> {
        let request_id = self.latest_request_id.next();
        self.latest_request_id = request_id;
        self.pending_request = Some(request_id);
        self.displayed_rows.clear();

        let request = WeatherRequest::new(self.search.text(), period);
        tracing::info!(%request_id, city = %request.city, %period, "Weather requested");

        vec![
            Effect::ClearWeather,
            Effect::StartFetch {
                request_id,
                request,
            },
        ]
    }

    fn complete(&mut self, result: Result<WeatherRecord, WeatherError>) -> Vec<Effect> {
        match result {
            Ok(record) => {
                let mut rows = compose(&record);
                repaint(&mut rows, self.theme);
                self.displayed_rows = rows.clone();
                vec![Effect::ClearWeather, Effect::ShowWeather(rows)]
            }
            Err(err) => vec![self.show_notice(ErrorNotice::from(&err))],
        }
    }

    fn is_stale(&self, request_id: RequestId) -> bool {
        let stale = request_id != self.latest_request_id;
        if stale {
            tracing::debug!(
                %request_id,
                latest = %self.latest_request_id,
                "Dropping event for superseded request"
            );
        }
        stale
    }

    fn show_notice(&mut self, notice: ErrorNotice) -> Effect {
        let id = NoticeId(self.last_notice_id.0 + 1);
        self.last_notice_id = id;
        self.notice = Some((id, notice.clone()));
        Effect::ShowNotice { id, notice }
    }

    fn search_effect(&self) -> Effect {
        Effect::ShowSuggestions {
            query: self.search.text().to_string(),
            suggestions: self.search.suggestions().to_vec(),
        }
    }
}
