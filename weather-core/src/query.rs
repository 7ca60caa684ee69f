//! Maps a [`WeatherRequest`] to the provider endpoint that serves it. No I/O.

use std::fmt;

use anyhow::{Context, Result};
use reqwest::Url;

use crate::{
    config::Config,
    model::{Period, WeatherRequest},
};

/// Time-series entries requested for every forecast period; the interpreter
/// truncates to what the period shows.
pub const FORECAST_ENTRIES_REQUESTED: usize = 10;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExpectedShape {
    SinglePoint,
    TimeSeries,
}

#[derive(Clone, PartialEq, Eq)]
pub struct Endpoint {
    pub url: Url,
    pub expected_shape: ExpectedShape,
}

// The URL carries the API key; keep it out of logs.
impl fmt::Debug for Endpoint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Endpoint")
            .field("path", &self.url.path())
            .field("expected_shape", &self.expected_shape)
            .finish()
    }
}

#[derive(Debug, Clone)]
pub struct QueryBuilder {
    base_url: Url,
    api_key: String,
    lang: String,
}

impl QueryBuilder {
    pub fn new(base_url: &str, api_key: impl Into<String>, lang: impl Into<String>) -> Result<Self> {
        let base_url =
            Url::parse(base_url).with_context(|| format!("Invalid provider base URL: {base_url}"))?;
        if base_url.cannot_be_a_base() {
            anyhow::bail!("Provider base URL cannot carry a path: {base_url}");
        }

        Ok(Self {
            base_url,
            api_key: api_key.into(),
            lang: lang.into(),
        })
    }

    pub fn from_config(config: &Config) -> Result<Self> {
        Self::new(&config.base_url, config.require_api_key()?, config.lang.clone())
    }

    pub fn build(&self, request: &WeatherRequest) -> Endpoint {
        let (path, expected_shape) = match request.period {
            Period::Today => ("data/2.5/weather", ExpectedShape::SinglePoint),
            Period::Tomorrow | Period::TenDays => ("data/2.5/forecast", ExpectedShape::TimeSeries),
        };

        let mut url = self.base_url.clone();
        url.path_segments_mut()
            .map(|mut segments| {
                segments.pop_if_empty().extend(path.split('/'));
            })
            .ok();

        {
            let mut query = url.query_pairs_mut();
            query.append_pair("q", &request.city);
            if expected_shape == ExpectedShape::TimeSeries {
                query.append_pair("cnt", &FORECAST_ENTRIES_REQUESTED.to_string());
            }
            query
                .append_pair("appid", &self.api_key)
                .append_pair("units", "metric")
                .append_pair("lang", &self.lang);
        }

        Endpoint { url, expected_shape }
    }
}
