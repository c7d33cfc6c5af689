use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::domain::preferences::RidePreferences;
use crate::domain::quote::RideQuote;

/// The request parameters a comparison round was run with.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct ComparisonRequest {
    pub pickup: String,
    pub destination: String,
    pub preferences: RidePreferences,
}

/// The ranked, filtered set of quotes for one request.
///
/// Invariant: `quotes` is sorted by price ascending with ties broken by the
/// configured provider priority, never by arrival order. Unavailable quotes
/// are excluded. An empty sequence is a valid result meaning "no eligible
/// quotes", not an error.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Comparison {
    pub request: ComparisonRequest,
    pub quotes: Vec<RideQuote>,
    pub generated_at: DateTime<Utc>,
}

impl Comparison {
    pub fn cheapest(&self) -> Option<&RideQuote> {
        self.quotes.first()
    }

    pub fn is_empty(&self) -> bool {
        self.quotes.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use chrono::Utc;
    use rust_decimal::Decimal;

    use super::{Comparison, ComparisonRequest};
    use crate::domain::preferences::RidePreferences;
    use crate::domain::quote::{ProviderId, RideQuote};

    fn quote(provider: &str, price: Decimal) -> RideQuote {
        RideQuote {
            provider: ProviderId::new(provider),
            offered_ride_type: "Auto".to_string(),
            price,
            currency: "INR".to_string(),
            eta: "4 mins".to_string(),
            distance: None,
            available: true,
            surcharges: Default::default(),
        }
    }

    #[test]
    fn cheapest_is_the_first_ranked_quote() {
        let comparison = Comparison {
            request: ComparisonRequest {
                pickup: "current location".to_string(),
                destination: "airport".to_string(),
                preferences: RidePreferences::to_destination("airport"),
            },
            quotes: vec![
                quote("rapido", Decimal::new(9900, 2)),
                quote("ola", Decimal::new(12000, 2)),
            ],
            generated_at: Utc::now(),
        };

        assert_eq!(comparison.cheapest().map(|q| q.provider.as_str()), Some("rapido"));
    }

    #[test]
    fn empty_comparison_is_a_valid_value() {
        let comparison = Comparison {
            request: ComparisonRequest {
                pickup: "home".to_string(),
                destination: "work".to_string(),
                preferences: RidePreferences::to_destination("work"),
            },
            quotes: Vec::new(),
            generated_at: Utc::now(),
        };

        assert!(comparison.is_empty());
        assert!(comparison.cheapest().is_none());
    }

    #[test]
    fn round_trip_is_field_equal() {
        let comparison = Comparison {
            request: ComparisonRequest {
                pickup: "current location".to_string(),
                destination: "airport".to_string(),
                preferences: RidePreferences::to_destination("airport"),
            },
            quotes: vec![quote("uber", Decimal::new(24950, 2))],
            generated_at: Utc::now(),
        };

        let json = serde_json::to_string(&comparison).expect("serialize");
        let restored: Comparison = serde_json::from_str(&json).expect("deserialize");

        assert_eq!(restored, comparison);
        assert_eq!(restored.quotes[0].price, Decimal::new(24950, 2));
    }
}
