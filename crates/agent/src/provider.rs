use std::collections::BTreeMap;

use chrono::Utc;
use rust_decimal::Decimal;
use serde::Deserialize;

use cabby_core::domain::booking::{Booking, BookingStatus};
use cabby_core::domain::preferences::{RidePreferences, RideType};
use cabby_core::domain::quote::{ProviderId, RideQuote};
use cabby_core::errors::ProviderError;

use crate::automation::{AutomationBackend, AutomationError, OutputShape};

/// Lifecycle of one provider session. `Failed` is reachable from every
/// non-terminal state; `close` is legal from any state.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum SessionState {
    Closed,
    Opening,
    Open,
    Quoting,
    Quoted,
    Booking,
    Booked,
    Failed,
}

impl SessionState {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Closed => "closed",
            Self::Opening => "opening",
            Self::Open => "open",
            Self::Quoting => "quoting",
            Self::Quoted => "quoted",
            Self::Booking => "booking",
            Self::Booked => "booked",
            Self::Failed => "failed",
        }
    }
}

/// What one concrete ride-hailing integration contributes: identity, its
/// tier vocabulary, and the goal text handed to the automation backend.
/// The state machine and error classification are shared and live in
/// [`ProviderSession`].
pub trait AppProfile: Send + Sync {
    fn id(&self) -> ProviderId;
    fn app_name(&self) -> &'static str;
    fn package_id(&self) -> &'static str;

    /// The provider's own name for an abstract ride tier.
    fn map_ride_type(&self, ride_type: RideType) -> &'static str;

    fn price_goal(&self, pickup: &str, destination: &str, preferences: &RidePreferences)
        -> String;

    fn booking_goal(
        &self,
        pickup: &str,
        destination: &str,
        preferences: &RidePreferences,
        quote: &RideQuote,
    ) -> String;
}

/// One provider's automation session, driven through the shared
/// open/quote/book/close state machine. Owns its backend handle
/// exclusively; never shared across providers or reused across requests.
pub struct ProviderSession<B> {
    profile: Box<dyn AppProfile>,
    backend: B,
    state: SessionState,
}

impl<B: AutomationBackend> ProviderSession<B> {
    pub fn new(profile: Box<dyn AppProfile>, backend: B) -> Self {
        Self { profile, backend, state: SessionState::Closed }
    }

    pub fn provider(&self) -> ProviderId {
        self.profile.id()
    }

    pub fn state(&self) -> SessionState {
        self.state
    }

    /// Open the app. No-op success when the session is already open (or
    /// further along); only `Closed` and `Failed` sessions actually drive
    /// the backend.
    pub async fn open(&mut self) -> Result<(), ProviderError> {
        if !matches!(self.state, SessionState::Closed | SessionState::Failed) {
            return Ok(());
        }

        self.state = SessionState::Opening;
        match self.backend.open_app(self.profile.package_id()).await {
            Ok(()) => {
                self.state = SessionState::Open;
                tracing::debug!(
                    provider = %self.provider(),
                    app = self.profile.app_name(),
                    "automation session opened"
                );
                Ok(())
            }
            Err(error) => {
                self.state = SessionState::Failed;
                Err(classify(error))
            }
        }
    }

    /// Fetch a price estimate. Requires `Open`; a failure is non-fatal to
    /// the caller and leaves the session in `Failed`.
    pub async fn quote(
        &mut self,
        pickup: &str,
        destination: &str,
        preferences: &RidePreferences,
    ) -> Result<RideQuote, ProviderError> {
        if self.state != SessionState::Open {
            return Err(ProviderError::Precondition {
                expected: SessionState::Open.as_str().to_string(),
                actual: self.state.as_str().to_string(),
            });
        }

        self.state = SessionState::Quoting;
        let goal = self.profile.price_goal(pickup, destination, preferences);

        match self.backend.run_goal(&goal, OutputShape::Price).await {
            Ok(value) => match parse_price_output(value) {
                Ok(output) => {
                    self.state = SessionState::Quoted;
                    Ok(output.into_quote(self.provider()))
                }
                Err(error) => {
                    self.state = SessionState::Failed;
                    Err(error)
                }
            },
            Err(error) => {
                self.state = SessionState::Failed;
                Err(classify(error))
            }
        }
    }

    /// Book the ride described by `quote`. Requires `Quoted`; a second
    /// call before re-opening fails the at-most-once precondition.
    pub async fn book(
        &mut self,
        pickup: &str,
        destination: &str,
        preferences: &RidePreferences,
        quote: &RideQuote,
    ) -> Result<Booking, ProviderError> {
        if self.state != SessionState::Quoted {
            return Err(ProviderError::Precondition {
                expected: SessionState::Quoted.as_str().to_string(),
                actual: self.state.as_str().to_string(),
            });
        }

        self.state = SessionState::Booking;
        let goal = self.profile.booking_goal(pickup, destination, preferences, quote);

        match self.backend.run_goal(&goal, OutputShape::Booking).await {
            Ok(value) => match parse_booking_output(value) {
                Ok(output) => {
                    self.state = SessionState::Booked;
                    Ok(output.into_booking(self.provider(), quote))
                }
                Err(error) => {
                    self.state = SessionState::Failed;
                    Err(error)
                }
            },
            Err(error) => {
                self.state = SessionState::Failed;
                Err(ProviderError::Booking(classify(error).to_string()))
            }
        }
    }

    /// Release the automation session. Always succeeds; backend close
    /// failures are logged and swallowed.
    pub async fn close(&mut self) {
        if self.state == SessionState::Closed {
            return;
        }

        if let Err(error) = self.backend.close_app().await {
            tracing::debug!(provider = %self.provider(), %error, "close_app failed, session dropped anyway");
        }
        self.state = SessionState::Closed;
    }
}

fn classify(error: AutomationError) -> ProviderError {
    match error {
        AutomationError::Connection(message) => ProviderError::Connectivity(message),
        AutomationError::AppNotFound(app) => ProviderError::Unavailable { app },
        AutomationError::GoalFailed(message) => ProviderError::Extraction(message),
    }
}

#[derive(Debug, Deserialize)]
struct PriceOutput {
    ride_type: String,
    estimated_price: Decimal,
    #[serde(default)]
    estimated_time: Option<String>,
    #[serde(default)]
    distance: Option<String>,
    #[serde(default)]
    currency: Option<String>,
    #[serde(default = "default_available")]
    available: bool,
    #[serde(default)]
    surcharges: BTreeMap<String, Decimal>,
}

fn default_available() -> bool {
    true
}

impl PriceOutput {
    fn into_quote(self, provider: ProviderId) -> RideQuote {
        RideQuote {
            provider,
            offered_ride_type: self.ride_type,
            price: self.estimated_price,
            currency: self.currency.unwrap_or_else(|| "INR".to_string()),
            eta: self.estimated_time.unwrap_or_else(|| "unknown".to_string()),
            distance: self.distance,
            available: self.available,
            surcharges: self.surcharges,
        }
    }
}

#[derive(Debug, Deserialize)]
struct BookingOutput {
    booking_id: String,
    #[serde(default)]
    ride_type: Option<String>,
    #[serde(default)]
    final_price: Option<Decimal>,
    #[serde(default)]
    estimated_arrival: Option<String>,
    #[serde(default)]
    driver_name: Option<String>,
    #[serde(default)]
    driver_rating: Option<Decimal>,
    #[serde(default)]
    vehicle_details: Option<String>,
}

impl BookingOutput {
    fn into_booking(self, provider: ProviderId, quote: &RideQuote) -> Booking {
        Booking {
            booking_id: self.booking_id,
            provider,
            ride_type: self.ride_type.unwrap_or_else(|| quote.offered_ride_type.clone()),
            final_price: self.final_price.unwrap_or(quote.price),
            currency: quote.currency.clone(),
            confirmation_eta: self.estimated_arrival.unwrap_or_else(|| "unknown".to_string()),
            status: BookingStatus::Confirmed,
            driver_name: self.driver_name,
            driver_rating: self.driver_rating,
            vehicle_details: self.vehicle_details,
            booked_at: Utc::now(),
        }
    }
}

fn parse_price_output(value: serde_json::Value) -> Result<PriceOutput, ProviderError> {
    serde_json::from_value(value).map_err(|error| ProviderError::Extraction(error.to_string()))
}

fn parse_booking_output(value: serde_json::Value) -> Result<BookingOutput, ProviderError> {
    serde_json::from_value(value).map_err(|error| ProviderError::Extraction(error.to_string()))
}
