use std::collections::HashSet;
use std::time::Duration;

use chrono::Utc;
use tokio::task::JoinSet;
use tokio::time::{timeout, timeout_at, Instant};
use uuid::Uuid;

use cabby_core::comparator::{self, ProviderPriority};
use cabby_core::config::AppConfig;
use cabby_core::domain::booking::Booking;
use cabby_core::domain::comparison::{Comparison, ComparisonRequest};
use cabby_core::domain::preferences::RidePreferences;
use cabby_core::domain::quote::{ProviderId, RideQuote};
use cabby_core::errors::{BookError, CompareError, ProviderError};

use crate::automation::AutomationBackend;
use crate::provider::ProviderSession;

/// Explicit runtime configuration for the orchestrator, passed in at
/// construction. There is no process-wide configuration singleton.
#[derive(Clone, Debug)]
pub struct OrchestratorConfig {
    pub comparison_timeout: Duration,
    pub booking_timeout: Duration,
    pub priority: ProviderPriority,
}

impl OrchestratorConfig {
    pub fn from_app(config: &AppConfig) -> Self {
        Self {
            comparison_timeout: config.comparison_timeout(),
            booking_timeout: config.booking_timeout(),
            priority: config.provider_priority(),
        }
    }
}

/// Coordinates one ride request: a concurrent quote round across all
/// configured providers, then at most one booking on the winner.
pub struct Orchestrator {
    config: OrchestratorConfig,
}

impl Orchestrator {
    pub fn new(config: OrchestratorConfig) -> Self {
        Self { config }
    }

    /// Run one quote round. Every provider gets its own task and its own
    /// session; the round completes when all providers have answered or
    /// the comparison timeout elapses, whichever comes first. Providers
    /// that error or miss the deadline are excluded, not awaited further.
    /// The only fatal outcome is zero usable quotes.
    pub async fn compare<B>(
        &self,
        pickup: &str,
        destination: &str,
        preferences: &RidePreferences,
        providers: Vec<ProviderSession<B>>,
    ) -> Result<Comparison, CompareError>
    where
        B: AutomationBackend + 'static,
    {
        let round_id = Uuid::new_v4();
        let deadline = Instant::now() + self.config.comparison_timeout;

        let mut join_set = JoinSet::new();
        let mut attempted = Vec::with_capacity(providers.len());
        for mut session in providers {
            attempted.push(session.provider());
            let pickup = pickup.to_string();
            let destination = destination.to_string();
            let preferences = preferences.clone();
            join_set.spawn(async move {
                let outcome =
                    fetch_quote(&mut session, &pickup, &destination, &preferences).await;
                (session.provider(), outcome)
            });
        }

        tracing::info!(
            round_id = %round_id,
            providers = attempted.len(),
            destination,
            "starting quote comparison round"
        );

        let mut pending: HashSet<ProviderId> = attempted.iter().cloned().collect();
        let mut quotes: Vec<RideQuote> = Vec::new();
        let mut errors: Vec<(ProviderId, ProviderError)> = Vec::new();

        loop {
            match timeout_at(deadline, join_set.join_next()).await {
                Ok(Some(Ok((provider, Ok(quote))))) => {
                    pending.remove(&provider);
                    tracing::info!(
                        round_id = %round_id,
                        provider = %provider,
                        tier = %quote.offered_ride_type,
                        price = %quote.price,
                        "quote received"
                    );
                    quotes.push(quote);
                }
                Ok(Some(Ok((provider, Err(error))))) => {
                    pending.remove(&provider);
                    tracing::warn!(
                        round_id = %round_id,
                        provider = %provider,
                        %error,
                        "provider excluded from round"
                    );
                    errors.push((provider, error));
                }
                Ok(Some(Err(join_error))) => {
                    tracing::warn!(round_id = %round_id, %join_error, "provider task died");
                }
                Ok(None) => break,
                Err(_elapsed) => {
                    // Deadline: abandon whatever is still running. Session
                    // cleanup stays the task's own best-effort duty; the
                    // round does not wait on it.
                    join_set.abort_all();
                    for provider in pending.drain() {
                        tracing::warn!(
                            round_id = %round_id,
                            provider = %provider,
                            "provider missed the round deadline"
                        );
                        errors
                            .push((provider, ProviderError::Timeout { phase: "quote".to_string() }));
                    }
                    break;
                }
            }
        }

        // Only reachable when a task died without reporting its provider.
        for provider in pending.drain() {
            errors.push((
                provider,
                ProviderError::Extraction("provider task did not complete".to_string()),
            ));
        }

        if quotes.is_empty() {
            return Err(CompareError::NoQuotes { attempted, errors });
        }

        for quote in &quotes {
            if !comparator::matches_requested_type(quote, preferences.ride_type) {
                tracing::debug!(
                    round_id = %round_id,
                    provider = %quote.provider,
                    offered = %quote.offered_ride_type,
                    requested = preferences.ride_type.as_str(),
                    "offered tier differs from requested, kept as substitute"
                );
            }
        }

        let ranked = comparator::rank(quotes, preferences, &self.config.priority);
        tracing::info!(
            round_id = %round_id,
            eligible = ranked.len(),
            excluded = errors.len(),
            "comparison round complete"
        );

        Ok(Comparison {
            request: ComparisonRequest {
                pickup: pickup.to_string(),
                destination: destination.to_string(),
                preferences: preferences.clone(),
            },
            quotes: ranked,
            generated_at: Utc::now(),
        })
    }

    /// Book the first quote of an already-ranked comparison on that single
    /// provider. No automatic fallback: a failure on the top entry is
    /// reported, never retried against the next-cheapest.
    pub async fn book_cheapest<B>(
        &self,
        pickup: &str,
        destination: &str,
        preferences: &RidePreferences,
        comparison: &Comparison,
        mut providers: Vec<ProviderSession<B>>,
    ) -> Result<Booking, BookError>
    where
        B: AutomationBackend,
    {
        let winner = comparison.cheapest().ok_or(BookError::EmptyComparison)?.clone();
        let provider = winner.provider.clone();

        let position = providers
            .iter()
            .position(|session| session.provider() == provider)
            .ok_or_else(|| BookError::SessionUnavailable(provider.clone()))?;
        let mut session = providers.swap_remove(position);
        drop(providers);

        tracing::info!(
            provider = %provider,
            tier = %winner.offered_ride_type,
            price = %winner.price,
            "booking cheapest quote"
        );

        // book() requires a quoted session, so the booking flow re-drives
        // the app to its fare screen before confirming.
        let outcome = timeout(self.config.booking_timeout, async {
            session.open().await?;
            let live = session.quote(pickup, destination, preferences).await?;
            if live.price != winner.price {
                tracing::info!(
                    provider = %provider,
                    compared = %winner.price,
                    live = %live.price,
                    "live fare differs from compared fare"
                );
            }
            session.book(pickup, destination, preferences, &winner).await
        })
        .await;

        let result = match outcome {
            Ok(Ok(booking)) => Ok(booking),
            Ok(Err(source)) => Err(BookError::Provider { provider: provider.clone(), source }),
            Err(_elapsed) => Err(BookError::Provider {
                provider: provider.clone(),
                source: ProviderError::Timeout { phase: "booking".to_string() },
            }),
        };
        session.close().await;

        match &result {
            Ok(booking) => tracing::info!(
                provider = %provider,
                booking_id = %booking.booking_id,
                "booking confirmed"
            ),
            Err(error) => tracing::warn!(
                provider = %provider,
                %error,
                "booking failed, not falling back to the next-cheapest provider"
            ),
        }

        result
    }
}

async fn fetch_quote<B: AutomationBackend>(
    session: &mut ProviderSession<B>,
    pickup: &str,
    destination: &str,
    preferences: &RidePreferences,
) -> Result<RideQuote, ProviderError> {
    let outcome = async {
        session.open().await?;
        session.quote(pickup, destination, preferences).await
    }
    .await;
    session.close().await;
    outcome
}

#[cfg(test)]
mod tests {
    use std::time::{Duration, Instant};

    use chrono::Utc;
    use rust_decimal::Decimal;
    use serde_json::json;

    use cabby_core::comparator::ProviderPriority;
    use cabby_core::domain::comparison::{Comparison, ComparisonRequest};
    use cabby_core::domain::preferences::RidePreferences;
    use cabby_core::domain::quote::{ProviderId, RideQuote};
    use cabby_core::errors::{BookError, CompareError, ProviderError};

    use super::{Orchestrator, OrchestratorConfig};
    use crate::automation::testing::ScriptedBackend;
    use crate::automation::AutomationError;
    use crate::provider::{AppProfile, ProviderSession};
    use crate::providers::{OlaProfile, RapidoProfile, UberProfile};

    fn config(comparison_ms: u64, booking_ms: u64) -> OrchestratorConfig {
        OrchestratorConfig {
            comparison_timeout: Duration::from_millis(comparison_ms),
            booking_timeout: Duration::from_millis(booking_ms),
            priority: ProviderPriority::new(vec![
                ProviderId::new("uber"),
                ProviderId::new("ola"),
                ProviderId::new("rapido"),
            ]),
        }
    }

    fn price_json(ride_type: &str, price: &str) -> serde_json::Value {
        json!({
            "ride_type": ride_type,
            "estimated_price": price,
            "estimated_time": "6 mins"
        })
    }

    fn session(
        profile: Box<dyn AppProfile>,
        backend: ScriptedBackend,
    ) -> ProviderSession<ScriptedBackend> {
        ProviderSession::new(profile, backend)
    }

    fn preferences() -> RidePreferences {
        RidePreferences::to_destination("airport")
    }

    fn comparison_of(quotes: Vec<RideQuote>) -> Comparison {
        Comparison {
            request: ComparisonRequest {
                pickup: "current location".to_string(),
                destination: "airport".to_string(),
                preferences: preferences(),
            },
            quotes,
            generated_at: Utc::now(),
        }
    }

    fn quote(provider: &str, ride_type: &str, price: Decimal) -> RideQuote {
        RideQuote {
            provider: ProviderId::new(provider),
            offered_ride_type: ride_type.to_string(),
            price,
            currency: "INR".to_string(),
            eta: "6 mins".to_string(),
            distance: None,
            available: true,
            surcharges: Default::default(),
        }
    }

    #[tokio::test]
    async fn compare_ranks_quotes_by_price_not_completion_order() {
        let orchestrator = Orchestrator::new(config(5_000, 1_000));

        // ola answers first but uber is cheaper
        let uber = ScriptedBackend::returning(vec![Ok(price_json("UberGo", "150.00"))])
            .with_delay(Duration::from_millis(50));
        let ola = ScriptedBackend::returning(vec![Ok(price_json("Ola Prime", "199.00"))]);

        let comparison = orchestrator
            .compare(
                "current location",
                "airport",
                &preferences(),
                vec![
                    session(Box::new(UberProfile), uber),
                    session(Box::new(OlaProfile), ola),
                ],
            )
            .await
            .expect("comparison");

        let order: Vec<&str> =
            comparison.quotes.iter().map(|q| q.provider.as_str()).collect();
        assert_eq!(order, vec!["uber", "ola"]);
    }

    #[tokio::test]
    async fn slow_provider_is_excluded_and_the_round_completes_at_the_deadline() {
        let orchestrator = Orchestrator::new(config(200, 1_000));

        let fast = ScriptedBackend::returning(vec![Ok(price_json("Ola Prime", "199.00"))]);
        let slow = ScriptedBackend::returning(vec![Ok(price_json("Auto", "99.00"))])
            .with_delay(Duration::from_secs(30));

        let started = Instant::now();
        let comparison = orchestrator
            .compare(
                "current location",
                "airport",
                &preferences(),
                vec![
                    session(Box::new(OlaProfile), fast),
                    session(Box::new(RapidoProfile), slow),
                ],
            )
            .await
            .expect("comparison");

        assert!(started.elapsed() < Duration::from_secs(5), "round must stop at the deadline");
        assert_eq!(comparison.quotes.len(), 1);
        assert_eq!(comparison.quotes[0].provider, ProviderId::new("ola"));
    }

    #[tokio::test]
    async fn failing_providers_degrade_the_round_instead_of_aborting_it() {
        let orchestrator = Orchestrator::new(config(5_000, 1_000));

        let unreachable = ScriptedBackend::failing_to_open(AutomationError::Connection(
            "device offline".to_string(),
        ));
        let healthy = ScriptedBackend::returning(vec![Ok(price_json("Ola Auto", "120.00"))]);

        let comparison = orchestrator
            .compare(
                "current location",
                "airport",
                &preferences(),
                vec![
                    session(Box::new(UberProfile), unreachable),
                    session(Box::new(OlaProfile), healthy),
                ],
            )
            .await
            .expect("one healthy provider keeps the round alive");

        assert_eq!(comparison.quotes.len(), 1);
        assert_eq!(comparison.quotes[0].provider, ProviderId::new("ola"));
    }

    #[tokio::test]
    async fn all_providers_failing_is_the_one_fatal_path() {
        let orchestrator = Orchestrator::new(config(5_000, 1_000));

        let offline = || {
            ScriptedBackend::failing_to_open(AutomationError::Connection(
                "device offline".to_string(),
            ))
        };

        let error = orchestrator
            .compare(
                "current location",
                "airport",
                &preferences(),
                vec![
                    session(Box::new(UberProfile), offline()),
                    session(Box::new(OlaProfile), offline()),
                ],
            )
            .await
            .expect_err("no provider produced a quote");

        let CompareError::NoQuotes { attempted, errors } = error;
        assert_eq!(attempted.len(), 2);
        assert_eq!(errors.len(), 2);
        assert!(errors
            .iter()
            .all(|(_, error)| matches!(error, ProviderError::Connectivity(_))));
    }

    #[tokio::test]
    async fn quotes_filtered_by_budget_yield_an_empty_comparison_not_an_error() {
        let orchestrator = Orchestrator::new(config(5_000, 1_000));

        let expensive = ScriptedBackend::returning(vec![Ok(price_json("UberGo", "900.00"))]);
        let tight_budget = RidePreferences {
            budget_ceiling: Some(Decimal::from(100)),
            ..preferences()
        };

        let comparison = orchestrator
            .compare(
                "current location",
                "airport",
                &tight_budget,
                vec![session(Box::new(UberProfile), expensive)],
            )
            .await
            .expect("a filtered-out quote is still a valid round");

        assert!(comparison.is_empty());
    }

    #[tokio::test]
    async fn book_cheapest_touches_exactly_one_provider() {
        let orchestrator = Orchestrator::new(config(5_000, 5_000));

        let rapido = ScriptedBackend::returning(vec![
            Ok(price_json("Auto", "99.00")),
            Ok(json!({"booking_id": "RAP-42", "estimated_arrival": "3 mins"})),
        ]);
        let ola = ScriptedBackend::default();

        let comparison = comparison_of(vec![
            quote("rapido", "Auto", Decimal::new(9900, 2)),
            quote("ola", "Ola Auto", Decimal::new(12000, 2)),
        ]);

        let booking = orchestrator
            .book_cheapest(
                "current location",
                "airport",
                &preferences(),
                &comparison,
                vec![
                    session(Box::new(RapidoProfile), rapido.clone()),
                    session(Box::new(OlaProfile), ola.clone()),
                ],
            )
            .await
            .expect("booking");

        assert_eq!(booking.booking_id, "RAP-42");
        assert_eq!(booking.provider, ProviderId::new("rapido"));
        assert!(ola.calls().is_empty(), "the runner-up provider must never be driven");
    }

    #[tokio::test]
    async fn booking_failure_does_not_fall_back_to_the_next_entry() {
        let orchestrator = Orchestrator::new(config(5_000, 5_000));

        let rapido = ScriptedBackend::returning(vec![
            Ok(price_json("Auto", "99.00")),
            Err(AutomationError::GoalFailed("payment screen did not load".to_string())),
        ]);
        let ola = ScriptedBackend::default();

        let comparison = comparison_of(vec![
            quote("rapido", "Auto", Decimal::new(9900, 2)),
            quote("ola", "Ola Auto", Decimal::new(12000, 2)),
        ]);

        let error = orchestrator
            .book_cheapest(
                "current location",
                "airport",
                &preferences(),
                &comparison,
                vec![
                    session(Box::new(RapidoProfile), rapido),
                    session(Box::new(OlaProfile), ola.clone()),
                ],
            )
            .await
            .expect_err("forced booking failure");

        assert!(matches!(
            error,
            BookError::Provider { ref provider, .. } if *provider == ProviderId::new("rapido")
        ));
        assert!(ola.calls().is_empty(), "no automatic fallback booking");
    }

    #[tokio::test]
    async fn booking_is_bounded_by_its_own_timeout() {
        let orchestrator = Orchestrator::new(config(5_000, 100));

        let stuck = ScriptedBackend::returning(vec![Ok(price_json("Auto", "99.00"))])
            .with_delay(Duration::from_secs(30));

        let comparison = comparison_of(vec![quote("rapido", "Auto", Decimal::new(9900, 2))]);

        let started = Instant::now();
        let error = orchestrator
            .book_cheapest(
                "current location",
                "airport",
                &preferences(),
                &comparison,
                vec![session(Box::new(RapidoProfile), stuck)],
            )
            .await
            .expect_err("booking must time out");

        assert!(started.elapsed() < Duration::from_secs(5));
        assert!(matches!(
            error,
            BookError::Provider { source: ProviderError::Timeout { .. }, .. }
        ));
    }

    #[tokio::test]
    async fn empty_comparison_cannot_be_booked() {
        let orchestrator = Orchestrator::new(config(5_000, 1_000));
        let comparison = comparison_of(Vec::new());

        let error = orchestrator
            .book_cheapest(
                "current location",
                "airport",
                &preferences(),
                &comparison,
                Vec::<ProviderSession<ScriptedBackend>>::new(),
            )
            .await
            .expect_err("nothing to book");

        assert_eq!(error, BookError::EmptyComparison);
    }

    #[tokio::test]
    async fn missing_winner_session_is_reported_not_substituted() {
        let orchestrator = Orchestrator::new(config(5_000, 1_000));

        let comparison = comparison_of(vec![quote("rapido", "Auto", Decimal::new(9900, 2))]);
        let ola = ScriptedBackend::default();

        let error = orchestrator
            .book_cheapest(
                "current location",
                "airport",
                &preferences(),
                &comparison,
                vec![session(Box::new(OlaProfile), ola.clone())],
            )
            .await
            .expect_err("winner has no session");

        assert_eq!(error, BookError::SessionUnavailable(ProviderId::new("rapido")));
        assert!(ola.calls().is_empty());
    }
}
