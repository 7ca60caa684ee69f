//! Fetch controller: one network exchange per attempt, bounded retry on
//! transport failures, nothing else.
//!
//! The retry loop is an explicit state machine ([`FetchMachine`]) so the
//! policy can be tested without I/O. [`FetchController::execute`] drives it
//! with an async timer; the delay parks only the task of this request.
//!
//! Retried:
//! - connectivity errors and timeouts
//! - server errors and rate limiting
//!
//! Not retried:
//! - malformed responses and other rejected statuses (fatal)
//! - any delivered payload, including "city not found"

use std::{fmt, sync::Arc, time::Duration};

use crate::{
    error::{TransportError, WeatherError},
    model::{Payload, WeatherRequest},
    notice::ErrorNotice,
    provider::WeatherProvider,
    query::Endpoint,
};

pub const DEFAULT_MAX_ATTEMPTS: u32 = 3;
pub const DEFAULT_RETRY_DELAY: Duration = Duration::from_secs(2);

/// Monotonically increasing identifier; the highest issued id wins.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Default)]
pub struct RequestId(pub u64);

impl RequestId {
    pub fn next(self) -> Self {
        RequestId(self.0 + 1)
    }
}

impl fmt::Display for RequestId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RetryPolicy {
    /// Total attempts including the first one.
    pub max_attempts: u32,
    /// Fixed gap between attempts.
    pub delay: Duration,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            max_attempts: DEFAULT_MAX_ATTEMPTS,
            delay: DEFAULT_RETRY_DELAY,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum FetchState {
    #[default]
    Idle,
    Requesting { attempt: u32 },
    /// Waiting out the delay before `attempt`.
    Retrying { attempt: u32 },
    Success,
    Exhausted,
}

#[derive(Debug, Clone, PartialEq)]
pub enum AttemptOutcome {
    Pending,
    Success(Payload),
    TransientFailure(String),
    FatalFailure(String),
}

/// Record of one attempt of one request.
#[derive(Debug, Clone, PartialEq)]
pub struct FetchAttempt {
    pub request_id: RequestId,
    pub attempt: u32,
    pub outcome: AttemptOutcome,
}

/// What the driver must do after an attempt resolves.
#[derive(Debug, Clone, PartialEq)]
pub enum Step {
    Retry {
        next_attempt: u32,
        delay: Duration,
        notice: ErrorNotice,
    },
    Done(Result<Payload, WeatherError>),
}

#[derive(Debug, Clone)]
pub struct FetchMachine {
    policy: RetryPolicy,
    state: FetchState,
    current: Option<FetchAttempt>,
    request_id: RequestId,
}

impl FetchMachine {
    pub fn new(request_id: RequestId, policy: RetryPolicy) -> Self {
        Self {
            policy,
            state: FetchState::Idle,
            current: None,
            request_id,
        }
    }

    pub fn state(&self) -> FetchState {
        self.state
    }

    /// The attempt in flight or last resolved.
    pub fn attempt(&self) -> Option<&FetchAttempt> {
        self.current.as_ref()
    }

    /// Enters `Requesting`. Returns the attempt number, or `None` if the
    /// machine is already requesting or finished.
    pub fn begin(&mut self) -> Option<u32> {
        let attempt = match self.state {
            FetchState::Idle => 1,
            FetchState::Retrying { attempt } => attempt,
            _ => return None,
        };

        self.state = FetchState::Requesting { attempt };
        self.current = Some(FetchAttempt {
            request_id: self.request_id,
            attempt,
            outcome: AttemptOutcome::Pending,
        });
        Some(attempt)
    }

    pub fn resolve(&mut self, result: Result<Payload, TransportError>) -> Step {
        let FetchState::Requesting { attempt } = self.state else {
            return Step::Done(Err(WeatherError::UnexpectedFailure(format!(
                "fetch {} resolved while {:?}",
                self.request_id, self.state
            ))));
        };

        let (outcome, step) = match result {
            Ok(payload) => {
                self.state = FetchState::Success;
                (
                    AttemptOutcome::Success(payload.clone()),
                    Step::Done(Ok(payload)),
                )
            }
            Err(TransportError::Transient(detail)) if attempt < self.policy.max_attempts => {
                let next_attempt = attempt + 1;
                self.state = FetchState::Retrying {
                    attempt: next_attempt,
                };
                (
                    AttemptOutcome::TransientFailure(detail),
                    Step::Retry {
                        next_attempt,
                        delay: self.policy.delay,
                        notice: ErrorNotice::retry(attempt, self.policy.max_attempts),
                    },
                )
            }
            Err(TransportError::Transient(detail)) => {
                self.state = FetchState::Exhausted;
                (
                    AttemptOutcome::TransientFailure(detail.clone()),
                    Step::Done(Err(WeatherError::NetworkFailure(detail))),
                )
            }
            Err(TransportError::Fatal(detail)) => {
                self.state = FetchState::Exhausted;
                (
                    AttemptOutcome::FatalFailure(detail.clone()),
                    Step::Done(Err(WeatherError::UnexpectedFailure(detail))),
                )
            }
        };

        self.current = Some(FetchAttempt {
            request_id: self.request_id,
            attempt,
            outcome,
        });
        step
    }
}

#[derive(Debug, Clone)]
pub struct FetchController {
    provider: Arc<dyn WeatherProvider>,
    policy: RetryPolicy,
}

impl FetchController {
    pub fn new(provider: Arc<dyn WeatherProvider>, policy: RetryPolicy) -> Self {
        Self { provider, policy }
    }

    /// Boundary check: a request without a city never reaches the network.
    pub fn admit(request: &WeatherRequest) -> Result<(), WeatherError> {
        if request.city.trim().is_empty() {
            return Err(WeatherError::EmptyCityInput);
        }
        Ok(())
    }

    /// Runs the attempt loop to a terminal state. `on_retry` is called with
    /// the progress notice before each inter-attempt delay.
    pub async fn execute<F>(
        &self,
        request_id: RequestId,
        request: &WeatherRequest,
        endpoint: &Endpoint,
        mut on_retry: F,
    ) -> Result<Payload, WeatherError>
    where
        F: FnMut(ErrorNotice) + Send,
    {
        Self::admit(request)?;

        let mut machine = FetchMachine::new(request_id, self.policy.clone());

        loop {
            let Some(attempt) = machine.begin() else {
                return Err(WeatherError::UnexpectedFailure(format!(
                    "fetch {request_id} cannot start another attempt"
                )));
            };

            tracing::debug!(
                %request_id,
                attempt,
                max = self.policy.max_attempts,
                ?endpoint,
                "Requesting weather"
            );

            match machine.resolve(self.provider.fetch(endpoint).await) {
                Step::Retry {
                    next_attempt,
                    delay,
                    notice,
                } => {
                    tracing::warn!(
                        %request_id,
                        attempt,
                        next_attempt,
                        ?delay,
                        "Transient failure, will retry"
                    );
                    on_retry(notice);
                    tokio::time::sleep(delay).await;
                }
                Step::Done(Ok(payload)) => {
                    if attempt > 1 {
                        tracing::info!(%request_id, attempt, "Request succeeded after retries");
                    }
                    return Ok(payload);
                }
                Step::Done(Err(err)) => {
                    tracing::error!(%request_id, attempt, error = %err, "Request failed");
                    return Err(err);
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        notice::NoticeKind,
        testing::{ScriptedProvider, current_payload, endpoint, today, transient},
    };
    use tokio::time::Instant;

    fn machine() -> FetchMachine {
        FetchMachine::new(RequestId(1), RetryPolicy::default())
    }

    #[test]
    fn request_id_increases() {
        assert_eq!(RequestId::default().next(), RequestId(1));
        assert!(RequestId(2) > RequestId(1));
    }

    #[test]
    fn machine_starts_idle_and_requests_first_attempt() {
        let mut m = machine();
        assert_eq!(m.state(), FetchState::Idle);
        assert_eq!(m.begin(), Some(1));
        assert_eq!(m.state(), FetchState::Requesting { attempt: 1 });
        assert_eq!(m.attempt().unwrap().outcome, AttemptOutcome::Pending);
    }

    #[test]
    fn machine_cannot_begin_twice() {
        let mut m = machine();
        m.begin();
        assert_eq!(m.begin(), None);
    }

    #[test]
    fn transient_failures_retry_then_exhaust() {
        let mut m = machine();

        for attempt in 1..=2 {
            assert_eq!(m.begin(), Some(attempt));
            let step = m.resolve(transient());
            assert_eq!(
                step,
                Step::Retry {
                    next_attempt: attempt + 1,
                    delay: Duration::from_secs(2),
                    notice: ErrorNotice::retry(attempt, 3),
                }
            );
            assert_eq!(m.state(), FetchState::Retrying { attempt: attempt + 1 });
        }

        assert_eq!(m.begin(), Some(3));
        let step = m.resolve(transient());
        assert!(matches!(step, Step::Done(Err(WeatherError::NetworkFailure(_)))));
        assert_eq!(m.state(), FetchState::Exhausted);
        assert_eq!(m.begin(), None);
    }

    #[test]
    fn fatal_failure_never_retries() {
        let mut m = machine();
        m.begin();
        let step = m.resolve(Err(TransportError::Fatal("bad json".into())));

        assert_eq!(
            step,
            Step::Done(Err(WeatherError::UnexpectedFailure("bad json".into())))
        );
        assert_eq!(m.state(), FetchState::Exhausted);
        assert_eq!(
            m.attempt().unwrap().outcome,
            AttemptOutcome::FatalFailure("bad json".into())
        );
    }

    #[test]
    fn success_on_second_attempt_short_circuits() {
        let mut m = machine();
        m.begin();
        m.resolve(transient());
        m.begin();
        let step = m.resolve(current_payload("Minsk", 3.0));

        assert!(matches!(step, Step::Done(Ok(_))));
        assert_eq!(m.state(), FetchState::Success);
        assert_eq!(m.attempt().unwrap().attempt, 2);
    }

    #[test]
    fn resolve_without_begin_is_an_error_not_a_panic() {
        let mut m = machine();
        assert!(matches!(
            m.resolve(transient()),
            Step::Done(Err(WeatherError::UnexpectedFailure(_)))
        ));
    }

    #[test]
    fn empty_city_is_not_admitted() {
        assert_eq!(
            FetchController::admit(&today("   ")),
            Err(WeatherError::EmptyCityInput)
        );
        assert!(FetchController::admit(&today("Paris")).is_ok());
    }

    #[tokio::test(start_paused = true)]
    async fn exhausts_after_three_attempts_two_seconds_apart() {
        let provider = Arc::new(ScriptedProvider::default());
        provider
            .push("Paris", transient())
            .push("Paris", transient())
            .push("Paris", transient());

        let controller = FetchController::new(provider.clone(), RetryPolicy::default());
        let request = today("Paris");
        let mut notices = Vec::new();
        let started = Instant::now();

        let result = controller
            .execute(RequestId(1), &request, &endpoint(&request), |n| notices.push(n))
            .await;

        assert!(matches!(result, Err(WeatherError::NetworkFailure(_))));
        assert_eq!(provider.calls(), 3);
        let elapsed = started.elapsed();
        assert!(elapsed >= Duration::from_secs(4) && elapsed < Duration::from_millis(4100));
        assert_eq!(
            notices.iter().map(|n| n.kind.clone()).collect::<Vec<_>>(),
            vec![
                NoticeKind::RetryInProgress { attempt: 1, max: 3 },
                NoticeKind::RetryInProgress { attempt: 2, max: 3 },
            ]
        );
    }

    #[tokio::test(start_paused = true)]
    async fn success_on_third_attempt() {
        let provider = Arc::new(ScriptedProvider::default());
        provider
            .push("Paris", transient())
            .push("Paris", transient())
            .push("Paris", current_payload("Paris", 14.0));

        let controller = FetchController::new(provider.clone(), RetryPolicy::default());
        let request = today("Paris");

        let payload = controller
            .execute(RequestId(1), &request, &endpoint(&request), |_| {})
            .await
            .unwrap();

        assert_eq!(payload["main"]["temp"], 14.0);
        assert_eq!(provider.calls(), 3);
    }

    #[tokio::test(start_paused = true)]
    async fn success_on_second_attempt_skips_remaining_retries() {
        let provider = Arc::new(ScriptedProvider::default());
        provider
            .push("Paris", transient())
            .push("Paris", current_payload("Paris", 14.0))
            .push("Paris", transient());

        let controller = FetchController::new(provider.clone(), RetryPolicy::default());
        let request = today("Paris");
        let started = Instant::now();

        let result = controller
            .execute(RequestId(1), &request, &endpoint(&request), |_| {})
            .await;

        assert!(result.is_ok());
        assert_eq!(provider.calls(), 2);
        let elapsed = started.elapsed();
        assert!(elapsed >= Duration::from_secs(2) && elapsed < Duration::from_millis(2100));
    }

    #[tokio::test(start_paused = true)]
    async fn city_not_found_payload_is_not_retried() {
        let provider = Arc::new(ScriptedProvider::default());
        provider.push(
            "Atlantis",
            Ok(serde_json::json!({ "cod": "404", "message": "city not found" })),
        );

        let controller = FetchController::new(provider.clone(), RetryPolicy::default());
        let request = today("Atlantis");

        let payload = controller
            .execute(RequestId(1), &request, &endpoint(&request), |_| {})
            .await
            .unwrap();

        assert_eq!(payload["cod"], "404");
        assert_eq!(provider.calls(), 1);
    }

    #[tokio::test(start_paused = true)]
    async fn fatal_failure_is_surfaced_immediately() {
        let provider = Arc::new(ScriptedProvider::default());
        provider.push("Paris", Err(TransportError::Fatal("bad json".into())));

        let controller = FetchController::new(provider.clone(), RetryPolicy::default());
        let request = today("Paris");
        let mut retried = false;

        let result = controller
            .execute(RequestId(1), &request, &endpoint(&request), |_| retried = true)
            .await;

        assert_eq!(result, Err(WeatherError::UnexpectedFailure("bad json".into())));
        assert!(!retried);
        assert_eq!(provider.calls(), 1);
    }

    #[tokio::test]
    async fn empty_city_makes_no_network_call() {
        let provider = Arc::new(ScriptedProvider::default());
        let controller = FetchController::new(provider.clone(), RetryPolicy::default());
        let request = today("");

        let result = controller
            .execute(RequestId(1), &request, &endpoint(&request), |_| {})
            .await;

        assert_eq!(result, Err(WeatherError::EmptyCityInput));
        assert_eq!(provider.calls(), 0);
    }
}
