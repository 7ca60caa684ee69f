//! Event loop tying the session reducer to a display surface.
//!
//! Handlers run one at a time on the caller's task. Network work runs in a
//! spawned task per request and reports back through the event channel, so
//! the loop stays free to accept new input while a request is retrying.

use std::{sync::Arc, time::Duration};

use anyhow::Result;
use tokio::{
    sync::mpsc::{self, UnboundedReceiver, UnboundedSender},
    task::JoinHandle,
};

use crate::{
    config::Config,
    error::WeatherError,
    fetch::{FetchController, RequestId},
    interpret::interpret,
    model::{WeatherRecord, WeatherRequest},
    notice::{ErrorNotice, NoticeId},
    provider::WeatherProvider,
    query::QueryBuilder,
    render::DisplayRow,
    session::{AppEvent, Effect, UiState},
    theme::Theme,
};

/// Rendering side of the application. Implementations only draw; they never
/// call back into the pipeline directly.
pub trait DisplaySurface {
    /// Shows the query text together with its suggestions in one update.
    fn show_suggestions(&mut self, query: &str, suggestions: &[String]);
    fn show_weather(&mut self, rows: &[DisplayRow]);
    fn clear_weather(&mut self);
    /// Rows are already recolored for `theme`.
    fn repaint(&mut self, theme: Theme, rows: &[DisplayRow]);
    fn show_notice(&mut self, notice: &ErrorNotice);
    fn dismiss_notice(&mut self);
}

/// Query builder, fetch controller and interpreter, in that order.
#[derive(Debug, Clone)]
pub struct Pipeline {
    builder: QueryBuilder,
    controller: FetchController,
}

impl Pipeline {
    pub fn new(builder: QueryBuilder, controller: FetchController) -> Self {
        Self {
            builder,
            controller,
        }
    }

    pub fn from_config(config: &Config, provider: Arc<dyn WeatherProvider>) -> Result<Self> {
        Ok(Self::new(
            QueryBuilder::from_config(config)?,
            FetchController::new(provider, config.retry_policy()),
        ))
    }

    pub async fn retrieve<F>(
        &self,
        request_id: RequestId,
        request: &WeatherRequest,
        on_retry: F,
    ) -> Result<WeatherRecord, WeatherError>
    where
        F: FnMut(ErrorNotice) + Send,
    {
        FetchController::admit(request)?;
        let endpoint = self.builder.build(request);
        let payload = self
            .controller
            .execute(request_id, request, &endpoint, on_retry)
            .await?;
        interpret(&payload, request)
    }
}

pub struct App<D> {
    state: UiState,
    surface: D,
    pipeline: Arc<Pipeline>,
    notice_ttl: Duration,
    tx: UnboundedSender<AppEvent>,
    rx: UnboundedReceiver<AppEvent>,
    in_flight: Option<JoinHandle<()>>,
}

impl<D: DisplaySurface> App<D> {
    pub fn new(pipeline: Pipeline, surface: D, theme: Theme, notice_ttl: Duration) -> Self {
        let (tx, rx) = mpsc::unbounded_channel();
        Self {
            state: UiState::new(theme),
            surface,
            pipeline: Arc::new(pipeline),
            notice_ttl,
            tx,
            rx,
            in_flight: None,
        }
    }

    /// Handle for feeding user events from elsewhere.
    pub fn sender(&self) -> UnboundedSender<AppEvent> {
        self.tx.clone()
    }

    pub fn state(&self) -> &UiState {
        &self.state
    }

    pub fn surface(&self) -> &D {
        &self.surface
    }

    /// Handles one event. Returns `false` once the app should exit.
    /// Must be called from within a tokio runtime.
    pub fn dispatch(&mut self, event: AppEvent) -> bool {
        let mut keep_running = true;
        for effect in self.state.handle(event) {
            keep_running &= self.apply(effect);
        }
        keep_running
    }

    /// Processes events until `Quit`.
    pub async fn run(&mut self) {
        while let Some(event) = self.rx.recv().await {
            if !self.dispatch(event) {
                break;
            }
        }
    }

    /// Processes events until no request is pending. Returns `false` if a
    /// `Quit` arrived meanwhile.
    pub async fn settle(&mut self) -> bool {
        while self.state.pending_request().is_some() {
            let Some(event) = self.rx.recv().await else {
                break;
            };
            if !self.dispatch(event) {
                return false;
            }
        }
        true
    }

    /// Handles whatever is already queued without waiting.
    pub fn drain(&mut self) -> bool {
        while let Ok(event) = self.rx.try_recv() {
            if !self.dispatch(event) {
                return false;
            }
        }
        true
    }

    fn apply(&mut self, effect: Effect) -> bool {
        match effect {
            Effect::ShowSuggestions { query, suggestions } => {
                self.surface.show_suggestions(&query, &suggestions)
            }
            Effect::ClearWeather => self.surface.clear_weather(),
            Effect::ShowWeather(rows) => self.surface.show_weather(&rows),
            Effect::Repaint { theme, rows } => self.surface.repaint(theme, &rows),
            Effect::ShowNotice { id, notice } => {
                self.surface.show_notice(&notice);
                self.schedule_dismiss(id);
            }
            Effect::DismissNotice(_) => self.surface.dismiss_notice(),
            Effect::StartFetch {
                request_id,
                request,
            } => return self.start_fetch(request_id, request),
            Effect::Exit => return false,
        }
        true
    }

    fn start_fetch(&mut self, request_id: RequestId, request: WeatherRequest) -> bool {
        if let Some(previous) = self.in_flight.take() {
            previous.abort();
        }

        if let Err(err) = FetchController::admit(&request) {
            return self.dispatch(AppEvent::FetchCompleted {
                request_id,
                result: Err(err),
            });
        }

        let pipeline = Arc::clone(&self.pipeline);
        let tx = self.tx.clone();
        self.in_flight = Some(tokio::spawn(async move {
            let progress = tx.clone();
            let result = pipeline
                .retrieve(request_id, &request, move |notice| {
                    let _ = progress.send(AppEvent::RetryScheduled { request_id, notice });
                })
                .await;
            let _ = tx.send(AppEvent::FetchCompleted { request_id, result });
        }));
        true
    }

    fn schedule_dismiss(&self, id: NoticeId) {
        let tx = self.tx.clone();
        let ttl = self.notice_ttl;
        tokio::spawn(async move {
            tokio::time::sleep(ttl).await;
            let _ = tx.send(AppEvent::NoticeExpired(id));
        });
    }
}

impl<D> Drop for App<D> {
    fn drop(&mut self) {
        if let Some(handle) = self.in_flight.take() {
            handle.abort();
        }
    }
}
