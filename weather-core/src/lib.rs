//! Core library for the `weather` CLI.
//!
//! This crate defines:
//! - City autocomplete over a fixed catalog
//! - Endpoint building, fetching with bounded retry, and payload interpretation
//! - Theme-agnostic display rows and in-place theme repainting
//! - The UI session state and the async event loop driving it
//!
//! It performs no terminal I/O; `weather-cli` supplies the display surface.

pub mod app;
pub mod catalog;
pub mod config;
pub mod error;
pub mod fetch;
pub mod interpret;
pub mod model;
pub mod notice;
pub mod provider;
pub mod query;
pub mod render;
pub mod session;
pub mod theme;

#[cfg(test)]
mod testing;

pub use app::{App, DisplaySurface, Pipeline};
pub use config::Config;
pub use error::{TransportError, WeatherError};
pub use fetch::{FetchController, RequestId, RetryPolicy};
pub use model::{Period, WeatherRecord, WeatherRequest};
pub use notice::{ErrorNotice, NoticeKind};
pub use provider::{WeatherProvider, provider_from_config};
pub use render::{DisplayRow, IconKind};
pub use session::{AppEvent, UiState};
pub use theme::{Rgb, Theme};
