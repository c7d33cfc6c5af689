use std::collections::BTreeMap;
use std::fmt;

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// Identifier of one ride-hailing integration (`uber`, `ola`, `rapido`).
/// Always stored lowercase so configured priority lists match regardless of
/// how the operator typed them.
#[derive(Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct ProviderId(String);

impl ProviderId {
    pub fn new(id: impl AsRef<str>) -> Self {
        Self(id.as_ref().trim().to_ascii_lowercase())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for ProviderId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for ProviderId {
    fn from(value: &str) -> Self {
        Self::new(value)
    }
}

fn default_currency() -> String {
    "INR".to_string()
}

fn default_available() -> bool {
    true
}

/// A priced offer returned by a single provider for one request.
/// Read-only after creation; lives for one comparison round.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct RideQuote {
    pub provider: ProviderId,
    /// The provider's own tier name ("UberGo", "Ola Auto", ...), not the
    /// abstract ride type it was mapped from.
    pub offered_ride_type: String,
    pub price: Decimal,
    #[serde(default = "default_currency")]
    pub currency: String,
    /// Free text as shown by the app, e.g. "7 mins" or "7-10 mins".
    pub eta: String,
    #[serde(default)]
    pub distance: Option<String>,
    #[serde(default = "default_available")]
    pub available: bool,
    #[serde(default)]
    pub surcharges: BTreeMap<String, Decimal>,
}

impl RideQuote {
    pub fn total_surcharges(&self) -> Decimal {
        self.surcharges.values().copied().sum()
    }
}
