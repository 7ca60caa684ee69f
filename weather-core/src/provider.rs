use crate::{Config, error::TransportError, model::Payload, query::Endpoint};
use async_trait::async_trait;
use std::{fmt::Debug, sync::Arc};

pub mod openweather;

pub use openweather::OpenWeatherProvider;

/// One network exchange against a built endpoint. Implementations classify
/// failures; they never interpret payload content.
#[async_trait]
pub trait WeatherProvider: Send + Sync + Debug {
    async fn fetch(&self, endpoint: &Endpoint) -> Result<Payload, TransportError>;
}

/// Construct the OpenWeather provider from config.
pub fn provider_from_config(config: &Config) -> anyhow::Result<Arc<dyn WeatherProvider>> {
    let provider = OpenWeatherProvider::new(config.request_timeout())?;
    Ok(Arc::new(provider))
}
