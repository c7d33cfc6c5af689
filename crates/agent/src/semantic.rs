use anyhow::Result;
use async_trait::async_trait;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use cabby_core::domain::preferences::RideType;

/// Fields a semantic parse managed to recover. Anything `None` is filled
/// from pattern matches or defaults; explicit pattern matches always win
/// over these values.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct PartialPreferences {
    pub destination: Option<String>,
    pub ride_type: Option<RideType>,
    pub passengers: Option<u32>,
    pub luggage: Option<bool>,
    pub ac_preference: Option<bool>,
    pub budget_ceiling: Option<Decimal>,
}

/// Optional external capability for free-text intent understanding. Used
/// only as a fallback when pattern matching finds neither a destination
/// nor a ride type.
#[async_trait]
pub trait SemanticParser: Send + Sync {
    async fn parse_intent(&self, text: &str) -> Result<PartialPreferences>;
}
