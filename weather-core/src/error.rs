//! Failure kinds that reach the user, and the transport-level classification
//! the fetch controller retries on.

/// Terminal failure of a weather request. Every variant ends the request and
/// is surfaced as a notice.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum WeatherError {
    #[error("Enter a city name first")]
    EmptyCityInput,

    #[error("Network failure: {0}")]
    NetworkFailure(String),

    #[error("City '{0}' was not found")]
    CityNotFound(String),

    #[error("Forecast for '{0}' is unavailable")]
    ForecastUnavailable(String),

    #[error("Unexpected failure: {0}")]
    UnexpectedFailure(String),
}

/// Outcome of a single provider call that did not yield a payload.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum TransportError {
    /// Connectivity, timeout, 5xx or 429; worth retrying unchanged.
    #[error("{0}")]
    Transient(String),

    /// Rejected request or undecodable response; retrying will not help.
    #[error("{0}")]
    Fatal(String),
}

impl TransportError {
    pub fn is_transient(&self) -> bool {
        matches!(self, TransportError::Transient(_))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn weather_error_display() {
        assert_eq!(WeatherError::EmptyCityInput.to_string(), "Enter a city name first");
        assert!(
            WeatherError::NetworkFailure("timed out".into())
                .to_string()
                .contains("timed out")
        );
        assert!(WeatherError::CityNotFound("Atlantis".into()).to_string().contains("Atlantis"));
    }

    #[test]
    fn transport_classification() {
        assert!(TransportError::Transient("reset".into()).is_transient());
        assert!(!TransportError::Fatal("bad json".into()).is_transient());
    }
}
