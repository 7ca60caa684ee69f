//! Test doubles shared by the fetch controller and app tests.

use std::{
    collections::{HashMap, VecDeque},
    sync::Mutex,
    time::Duration,
};

use async_trait::async_trait;

use crate::{
    error::TransportError,
    model::{Payload, Period, WeatherRequest},
    provider::WeatherProvider,
    query::{Endpoint, QueryBuilder},
};

pub(crate) const TEST_BASE_URL: &str = "http://weather.test";

#[derive(Debug)]
struct Scripted {
    delay: Duration,
    result: Result<Payload, TransportError>,
}

/// Replays queued responses per city (`q` parameter). Unscripted calls fail fatally.
#[derive(Debug, Default)]
pub(crate) struct ScriptedProvider {
    scripts: Mutex<HashMap<String, VecDeque<Scripted>>>,
    calls: Mutex<Vec<String>>,
}

impl ScriptedProvider {
    pub(crate) fn push(&self, city: &str, result: Result<Payload, TransportError>) -> &Self {
        self.push_delayed(city, Duration::ZERO, result)
    }

    pub(crate) fn push_delayed(
        &self,
        city: &str,
        delay: Duration,
        result: Result<Payload, TransportError>,
    ) -> &Self {
        self.scripts
            .lock()
            .unwrap()
            .entry(city.to_string())
            .or_default()
            .push_back(Scripted { delay, result });
        self
    }

    pub(crate) fn calls(&self) -> usize {
        self.calls.lock().unwrap().len()
    }

    pub(crate) fn calls_for(&self, city: &str) -> usize {
        self.calls.lock().unwrap().iter().filter(|c| *c == city).count()
    }
}

#[async_trait]
impl WeatherProvider for ScriptedProvider {
    async fn fetch(&self, endpoint: &Endpoint) -> Result<Payload, TransportError> {
        let city = endpoint
            .url
            .query_pairs()
            .find(|(k, _)| k == "q")
            .map(|(_, v)| v.into_owned())
            .unwrap_or_default();

        self.calls.lock().unwrap().push(city.clone());
        let next = self
            .scripts
            .lock()
            .unwrap()
            .get_mut(&city)
            .and_then(VecDeque::pop_front);

        match next {
            Some(Scripted { delay, result }) => {
                tokio::time::sleep(delay).await;
                result
            }
            None => Err(TransportError::Fatal(format!("no scripted response for {city}"))),
        }
    }
}

pub(crate) fn endpoint(request: &WeatherRequest) -> Endpoint {
    QueryBuilder::new(TEST_BASE_URL, "KEY", "en")
        .unwrap()
        .build(request)
}

pub(crate) fn transient() -> Result<Payload, TransportError> {
    Err(TransportError::Transient("connection reset".into()))
}

pub(crate) fn current_payload(name: &str, temp: f64) -> Result<Payload, TransportError> {
    Ok(serde_json::json!({
        "name": name,
        "main": { "temp": temp, "feels_like": temp, "humidity": 50, "pressure": 1010 },
        "wind": { "speed": 2.0 },
        "weather": [{ "description": "clear sky" }],
    }))
}

pub(crate) fn today(city: &str) -> WeatherRequest {
    WeatherRequest::new(city, Period::Today)
}
