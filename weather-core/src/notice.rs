use std::time::Duration;

use crate::error::WeatherError;

/// How long a notice stays on screen unless replaced.
pub const DEFAULT_NOTICE_TTL: Duration = Duration::from_secs(5);

/// Identifies one shown notice so that its dismiss timer cannot remove a
/// newer one.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Default)]
pub struct NoticeId(pub u64);

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum NoticeKind {
    EmptyCityInput,
    RetryInProgress { attempt: u32, max: u32 },
    NetworkFailure,
    CityNotFound,
    ForecastUnavailable,
    UnexpectedFailure,
}

impl NoticeKind {
    /// Warnings are transient progress; everything else is an error.
    pub fn is_warning(&self) -> bool {
        matches!(self, NoticeKind::RetryInProgress { .. })
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ErrorNotice {
    pub kind: NoticeKind,
    pub message: String,
}

impl ErrorNotice {
    pub fn retry(attempt: u32, max: u32) -> Self {
        Self {
            kind: NoticeKind::RetryInProgress { attempt, max },
            message: format!("Failed to load weather data. Retrying... ({attempt}/{max})"),
        }
    }
}

impl From<&WeatherError> for ErrorNotice {
    fn from(err: &WeatherError) -> Self {
        let kind = match err {
            WeatherError::EmptyCityInput => NoticeKind::EmptyCityInput,
            WeatherError::NetworkFailure(_) => NoticeKind::NetworkFailure,
            WeatherError::CityNotFound(_) => NoticeKind::CityNotFound,
            WeatherError::ForecastUnavailable(_) => NoticeKind::ForecastUnavailable,
            WeatherError::UnexpectedFailure(_) => NoticeKind::UnexpectedFailure,
        };

        Self {
            kind,
            message: err.to_string(),
        }
    }
}
