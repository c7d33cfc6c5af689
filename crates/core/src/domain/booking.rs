use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::domain::quote::ProviderId;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BookingStatus {
    Confirmed,
    Failed,
}

/// Confirmation record for one booking action. Created at most once per
/// comparison round; immutable after creation.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Booking {
    pub booking_id: String,
    pub provider: ProviderId,
    pub ride_type: String,
    pub final_price: Decimal,
    pub currency: String,
    pub confirmation_eta: String,
    pub status: BookingStatus,
    #[serde(default)]
    pub driver_name: Option<String>,
    #[serde(default)]
    pub driver_rating: Option<Decimal>,
    #[serde(default)]
    pub vehicle_details: Option<String>,
    pub booked_at: DateTime<Utc>,
}
