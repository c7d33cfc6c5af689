use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// Sentinel destination used when no destination marker was found in the
/// user's text. Callers must treat it as a precondition failure before
/// starting a comparison round.
pub const UNSPECIFIED_DESTINATION: &str = "unspecified";

/// Abstract ride tier requested by the user. Each provider maps these to
/// its own vocabulary (e.g. `Rickshaw` becomes "Uber Auto" or "Ola Auto").
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RideType {
    #[default]
    Standard,
    Rickshaw,
    TwoWheeler,
    Premium,
}

impl RideType {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Standard => "standard",
            Self::Rickshaw => "rickshaw",
            Self::TwoWheeler => "two_wheeler",
            Self::Premium => "premium",
        }
    }
}

/// User preferences for one ride request, extracted once from natural
/// language and immutable afterwards.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct RidePreferences {
    pub destination: String,
    #[serde(default)]
    pub ride_type: RideType,
    #[serde(default = "default_passengers")]
    pub passengers: u32,
    #[serde(default)]
    pub luggage: bool,
    #[serde(default)]
    pub ac_preference: Option<bool>,
    #[serde(default)]
    pub budget_ceiling: Option<Decimal>,
}

fn default_passengers() -> u32 {
    1
}

impl Default for RidePreferences {
    fn default() -> Self {
        Self {
            destination: UNSPECIFIED_DESTINATION.to_string(),
            ride_type: RideType::default(),
            passengers: 1,
            luggage: false,
            ac_preference: None,
            budget_ceiling: None,
        }
    }
}

impl RidePreferences {
    pub fn to_destination(destination: impl Into<String>) -> Self {
        Self { destination: destination.into(), ..Self::default() }
    }

    /// Whether a real destination was extracted (the sentinel does not count).
    pub fn has_destination(&self) -> bool {
        let destination = self.destination.trim();
        !destination.is_empty() && destination != UNSPECIFIED_DESTINATION
    }
}
