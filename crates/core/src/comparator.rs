//! Deterministic quote ranking.
//!
//! Pure functions only: the same quotes, preferences, and priority order
//! always produce the same ranking, regardless of the order providers
//! happened to answer in.

use rust_decimal::Decimal;

use crate::domain::preferences::{RidePreferences, RideType};
use crate::domain::quote::{ProviderId, RideQuote};

/// Fixed total order among providers, taken from the configured provider
/// set. Used to break price ties so results never depend on arrival order.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ProviderPriority {
    order: Vec<ProviderId>,
}

impl ProviderPriority {
    pub fn new(order: Vec<ProviderId>) -> Self {
        Self { order }
    }

    /// Position of `provider` in the configured order. Unknown providers
    /// rank after every configured one.
    pub fn rank_of(&self, provider: &ProviderId) -> usize {
        self.order.iter().position(|candidate| candidate == provider).unwrap_or(self.order.len())
    }

    pub fn providers(&self) -> &[ProviderId] {
        &self.order
    }
}

pub trait QuoteRanker: Send + Sync {
    fn rank(
        &self,
        quotes: Vec<RideQuote>,
        preferences: &RidePreferences,
        priority: &ProviderPriority,
    ) -> Vec<RideQuote>;
}

#[derive(Clone, Copy, Debug, Default)]
pub struct DeterministicRanker;

impl QuoteRanker for DeterministicRanker {
    fn rank(
        &self,
        quotes: Vec<RideQuote>,
        preferences: &RidePreferences,
        priority: &ProviderPriority,
    ) -> Vec<RideQuote> {
        rank(quotes, preferences, priority)
    }
}

/// Rank quotes for selection:
/// 1. drop unavailable quotes,
/// 2. drop quotes above the budget ceiling (when one is set),
/// 3. sort ascending by price, ties broken by provider priority.
///
/// Ride-type filtering is advisory: providers name equivalent tiers
/// differently, so a mismatched `offered_ride_type` is kept as a
/// substitute rather than dropped (see [`matches_requested_type`]).
/// An empty result means "no eligible quotes", not an error.
pub fn rank(
    quotes: Vec<RideQuote>,
    preferences: &RidePreferences,
    priority: &ProviderPriority,
) -> Vec<RideQuote> {
    let mut eligible: Vec<RideQuote> = quotes
        .into_iter()
        .filter(|quote| quote.available)
        .filter(|quote| within_budget(quote.price, preferences.budget_ceiling))
        .collect();

    eligible.sort_by(|a, b| {
        a.price
            .cmp(&b.price)
            .then_with(|| priority.rank_of(&a.provider).cmp(&priority.rank_of(&b.provider)))
    });

    eligible
}

fn within_budget(price: Decimal, ceiling: Option<Decimal>) -> bool {
    match ceiling {
        Some(ceiling) => price <= ceiling,
        None => true,
    }
}

/// Whether a provider's tier name plausibly matches the requested abstract
/// ride type. Advisory only: callers may log mismatches, the ranking never
/// drops a quote on type grounds.
pub fn matches_requested_type(quote: &RideQuote, requested: RideType) -> bool {
    let offered = quote.offered_ride_type.to_ascii_lowercase();
    let synonyms: &[&str] = match requested {
        RideType::Standard => &["go", "prime", "car", "cab", "economy", "sedan", "mini"],
        RideType::Rickshaw => &["auto", "rickshaw"],
        RideType::TwoWheeler => &["bike", "moto"],
        RideType::Premium => &["xl", "plus", "premium", "comfort"],
    };
    synonyms.iter().any(|synonym| offered.contains(synonym))
}

#[cfg(test)]
mod tests {
    use rust_decimal::Decimal;

    use super::{matches_requested_type, rank, ProviderPriority};
    use crate::domain::preferences::{RidePreferences, RideType};
    use crate::domain::quote::{ProviderId, RideQuote};

    fn quote(provider: &str, ride_type: &str, price: Decimal, available: bool) -> RideQuote {
        RideQuote {
            provider: ProviderId::new(provider),
            offered_ride_type: ride_type.to_string(),
            price,
            currency: "INR".to_string(),
            eta: "5 mins".to_string(),
            distance: None,
            available,
            surcharges: Default::default(),
        }
    }

    fn priority() -> ProviderPriority {
        ProviderPriority::new(vec![
            ProviderId::new("uber"),
            ProviderId::new("ola"),
            ProviderId::new("rapido"),
        ])
    }

    #[test]
    fn cheapest_available_quote_ranks_first() {
        let quotes = vec![
            quote("uber", "UberGo", Decimal::new(24900, 2), true),
            quote("rapido", "Auto", Decimal::new(9900, 2), true),
            quote("ola", "Ola Prime", Decimal::new(19900, 2), true),
        ];

        let ranked = rank(quotes, &RidePreferences::default(), &priority());

        let order: Vec<&str> = ranked.iter().map(|q| q.provider.as_str()).collect();
        assert_eq!(order, vec!["rapido", "ola", "uber"]);
    }

    #[test]
    fn equal_prices_resolve_by_configured_priority_not_submission_order() {
        // rapido submitted first but uber precedes it in the configured set
        let quotes = vec![
            quote("rapido", "Auto", Decimal::new(15000, 2), true),
            quote("ola", "Ola Auto", Decimal::new(15000, 2), true),
            quote("uber", "Uber Auto", Decimal::new(15000, 2), true),
        ];

        let ranked = rank(quotes, &RidePreferences::default(), &priority());

        let order: Vec<&str> = ranked.iter().map(|q| q.provider.as_str()).collect();
        assert_eq!(order, vec!["uber", "ola", "rapido"]);
    }

    #[test]
    fn unavailable_quotes_are_excluded() {
        let quotes = vec![
            quote("uber", "UberGo", Decimal::new(10000, 2), false),
            quote("ola", "Ola Prime", Decimal::new(20000, 2), true),
        ];

        let ranked = rank(quotes, &RidePreferences::default(), &priority());

        assert_eq!(ranked.len(), 1);
        assert_eq!(ranked[0].provider, ProviderId::new("ola"));
    }

    #[test]
    fn quotes_strictly_over_the_budget_ceiling_are_dropped() {
        let preferences = RidePreferences {
            budget_ceiling: Some(Decimal::new(15000, 2)),
            ..RidePreferences::default()
        };
        let quotes = vec![
            quote("uber", "UberGo", Decimal::new(15000, 2), true),
            quote("ola", "Ola Prime", Decimal::new(15001, 2), true),
        ];

        let ranked = rank(quotes, &preferences, &priority());

        // a price exactly at the ceiling survives
        assert_eq!(ranked.len(), 1);
        assert_eq!(ranked[0].provider, ProviderId::new("uber"));
    }

    #[test]
    fn all_filtered_out_yields_an_empty_ranking_not_an_error() {
        let preferences = RidePreferences {
            budget_ceiling: Some(Decimal::new(5000, 2)),
            ..RidePreferences::default()
        };
        let quotes = vec![
            quote("uber", "UberGo", Decimal::new(24900, 2), true),
            quote("ola", "Ola Prime", Decimal::new(19900, 2), false),
        ];

        let ranked = rank(quotes, &preferences, &priority());

        assert!(ranked.is_empty());
    }

    #[test]
    fn mismatched_ride_type_is_kept_as_a_substitute() {
        let preferences =
            RidePreferences { ride_type: RideType::Rickshaw, ..RidePreferences::default() };
        let quotes = vec![quote("rapido", "Bike", Decimal::new(7500, 2), true)];

        let ranked = rank(quotes, &preferences, &priority());

        assert_eq!(ranked.len(), 1);
        assert!(!matches_requested_type(&ranked[0], RideType::Rickshaw));
    }

    #[test]
    fn type_match_is_recognized_across_provider_vocabularies() {
        let auto = quote("ola", "Ola Auto", Decimal::new(9900, 2), true);
        let moto = quote("uber", "Uber Moto", Decimal::new(7900, 2), true);
        let xl = quote("uber", "Uber XL", Decimal::new(39900, 2), true);

        assert!(matches_requested_type(&auto, RideType::Rickshaw));
        assert!(matches_requested_type(&moto, RideType::TwoWheeler));
        assert!(matches_requested_type(&xl, RideType::Premium));
        assert!(!matches_requested_type(&xl, RideType::TwoWheeler));
    }

    #[test]
    fn the_default_ranker_matches_the_free_function() {
        use super::{DeterministicRanker, QuoteRanker};

        let priority = priority();
        assert_eq!(priority.providers().len(), 3);

        let quotes = vec![
            quote("ola", "Ola Prime", Decimal::new(19900, 2), true),
            quote("rapido", "Auto", Decimal::new(9900, 2), true),
        ];

        let ranked =
            DeterministicRanker.rank(quotes.clone(), &RidePreferences::default(), &priority);

        assert_eq!(ranked, rank(quotes, &RidePreferences::default(), &priority));
        assert_eq!(ranked[0].provider, ProviderId::new("rapido"));
    }

    #[test]
    fn unknown_providers_rank_after_configured_ones_on_ties() {
        let quotes = vec![
            quote("metro", "Metro Cab", Decimal::new(15000, 2), true),
            quote("rapido", "Auto", Decimal::new(15000, 2), true),
        ];

        let ranked = rank(quotes, &RidePreferences::default(), &priority());

        let order: Vec<&str> = ranked.iter().map(|q| q.provider.as_str()).collect();
        assert_eq!(order, vec!["rapido", "metro"]);
    }
}
