//! Deterministic-enough demo backend. Stands in for a real device
//! automation backend so the full extract/compare/book pipeline can be
//! exercised without a provisioned phone. Prices are jittered around a
//! per-provider base fare; bookings always confirm.

use async_trait::async_trait;
use rand::Rng;
use rust_decimal::Decimal;
use serde_json::{json, Value};

use cabby_core::domain::quote::ProviderId;

use crate::automation::{AutomationBackend, AutomationError, OutputShape};

pub struct SimulatedBackend {
    app_name: String,
    ride_label: String,
    base_fare: Decimal,
}

impl SimulatedBackend {
    pub fn new(
        app_name: impl Into<String>,
        ride_label: impl Into<String>,
        base_fare: Decimal,
    ) -> Self {
        Self { app_name: app_name.into(), ride_label: ride_label.into(), base_fare }
    }

    /// Preset simulation for a known provider.
    pub fn for_provider(provider: &ProviderId) -> Option<Self> {
        match provider.as_str() {
            "uber" => Some(Self::new("Uber", "UberGo", Decimal::from(240))),
            "ola" => Some(Self::new("Ola", "Ola Prime", Decimal::from(230))),
            "rapido" => Some(Self::new("Rapido", "Auto", Decimal::from(150))),
            _ => None,
        }
    }

    fn jittered_fare(&self) -> Decimal {
        let percent = rand::thread_rng().gen_range(85..=115);
        (self.base_fare * Decimal::from(percent) / Decimal::from(100)).round_dp(2)
    }
}

#[async_trait]
impl AutomationBackend for SimulatedBackend {
    async fn open_app(&self, _package_id: &str) -> Result<(), AutomationError> {
        Ok(())
    }

    async fn run_goal(&self, _goal: &str, shape: OutputShape) -> Result<Value, AutomationError> {
        let mut rng = rand::thread_rng();
        match shape {
            OutputShape::Price => Ok(json!({
                "ride_type": self.ride_label,
                "estimated_price": self.jittered_fare().to_string(),
                "estimated_time": format!("{} mins", rng.gen_range(3..=12)),
                "distance": format!("{}.{} km", rng.gen_range(2..=9), rng.gen_range(0..=9)),
                "available": true
            })),
            OutputShape::Booking => Ok(json!({
                "booking_id": format!("{}-{:06}", self.app_name.to_uppercase(), rng.gen_range(0..1_000_000)),
                "ride_type": self.ride_label,
                "final_price": self.jittered_fare().to_string(),
                "estimated_arrival": format!("{} mins", rng.gen_range(2..=8)),
                "driver_name": "Simulated Driver",
                "driver_rating": "4.7",
                "vehicle_details": "Simulated vehicle"
            })),
        }
    }

    async fn close_app(&self) -> Result<(), AutomationError> {
        Ok(())
    }
}
