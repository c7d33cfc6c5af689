use rust_decimal::Decimal;

use cabby_core::domain::preferences::{RidePreferences, RideType, UNSPECIFIED_DESTINATION};

use crate::semantic::SemanticParser;

/// A canonical destination and the keywords that map onto it, e.g. "work"
/// for "office" or "workplace". Checked before marker-based extraction.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct DestinationAlias {
    pub canonical: String,
    pub keywords: Vec<String>,
}

impl DestinationAlias {
    pub fn new(canonical: &str, keywords: &[&str]) -> Self {
        Self {
            canonical: canonical.to_string(),
            keywords: keywords.iter().map(|keyword| keyword.to_string()).collect(),
        }
    }
}

/// Turns free-text ride requests into a structured [`RidePreferences`].
///
/// Total: never fails. Each field is matched independently by an ordered
/// rule list; the first matching rule per field wins and unmatched fields
/// fall back to defaults. An input with no recognizable destination
/// degrades to the `unspecified` sentinel rather than an error.
#[derive(Clone, Debug)]
pub struct PreferenceExtractor {
    aliases: Vec<DestinationAlias>,
}

impl Default for PreferenceExtractor {
    fn default() -> Self {
        Self {
            aliases: vec![
                DestinationAlias::new("work", &["work", "office", "workplace", "company"]),
                DestinationAlias::new("home", &["home", "house", "apartment", "residence"]),
            ],
        }
    }
}

#[derive(Debug, Default)]
struct ScannedIntent {
    destination: Option<String>,
    ride_type: Option<RideType>,
    passengers: Option<u32>,
    luggage: Option<bool>,
    ac_preference: Option<bool>,
    budget_ceiling: Option<Decimal>,
}

impl PreferenceExtractor {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_aliases(aliases: Vec<DestinationAlias>) -> Self {
        Self { aliases }
    }

    pub fn extract(&self, text: &str) -> RidePreferences {
        finalize(self.scan(text))
    }

    /// Like [`extract`](Self::extract), but consults the semantic parser
    /// once when pattern matching found neither a destination nor a ride
    /// type. Pattern matches always win over parser output, and a parser
    /// failure degrades silently to the pattern result.
    pub async fn extract_with_fallback(
        &self,
        text: &str,
        parser: &dyn SemanticParser,
    ) -> RidePreferences {
        let mut scanned = self.scan(text);

        if scanned.destination.is_none() && scanned.ride_type.is_none() {
            tracing::debug!("pattern matching found no destination or ride type, trying semantic parser");
            match parser.parse_intent(text).await {
                Ok(partial) => {
                    scanned.destination =
                        partial.destination.filter(|destination| !destination.trim().is_empty());
                    scanned.ride_type = partial.ride_type;
                    scanned.passengers = scanned.passengers.or(partial.passengers);
                    scanned.luggage = scanned.luggage.or(partial.luggage);
                    scanned.ac_preference = scanned.ac_preference.or(partial.ac_preference);
                    scanned.budget_ceiling = scanned.budget_ceiling.or(partial.budget_ceiling);
                }
                Err(error) => {
                    tracing::warn!(%error, "semantic parser fallback failed, keeping pattern result");
                }
            }
        }

        finalize(scanned)
    }

    fn scan(&self, text: &str) -> ScannedIntent {
        let normalized = normalize_text(text);
        if normalized.is_empty() {
            return ScannedIntent::default();
        }
        let tokens = tokenize(&normalized);

        ScannedIntent {
            destination: extract_destination(&normalized, &self.aliases),
            ride_type: extract_ride_type(&normalized),
            passengers: extract_passengers(&tokens),
            luggage: extract_luggage(&normalized),
            ac_preference: extract_ac_preference(&normalized),
            budget_ceiling: extract_budget(&tokens),
        }
    }
}

fn finalize(scanned: ScannedIntent) -> RidePreferences {
    RidePreferences {
        destination: scanned
            .destination
            .unwrap_or_else(|| UNSPECIFIED_DESTINATION.to_string()),
        ride_type: scanned.ride_type.unwrap_or_default(),
        passengers: scanned.passengers.unwrap_or(1),
        luggage: scanned.luggage.unwrap_or(false),
        ac_preference: scanned.ac_preference,
        budget_ceiling: scanned.budget_ceiling,
    }
}

fn normalize_text(text: &str) -> String {
    text.trim().to_lowercase()
}

fn tokenize(text: &str) -> Vec<String> {
    text.split_whitespace()
        .map(|token| token.trim_matches(|c: char| ".,!?;:\"'".contains(c)).to_string())
        .filter(|token| !token.is_empty())
        .collect()
}

fn extract_destination(text: &str, aliases: &[DestinationAlias]) -> Option<String> {
    // alias table first: most keyword hits wins, ties keep list order
    let mut best: Option<(&DestinationAlias, usize)> = None;
    for alias in aliases {
        let hits =
            alias.keywords.iter().filter(|keyword| contains_phrase(text, keyword)).count();
        if hits > 0 && best.map_or(true, |(_, best_hits)| hits > best_hits) {
            best = Some((alias, hits));
        }
    }
    if let Some((alias, _)) = best {
        return Some(alias.canonical.clone());
    }

    const MARKERS: [&str; 6] = ["take me to", "go to", "head to", "towards", "toward", "near"];
    let remainder = MARKERS
        .iter()
        .find_map(|marker| find_after_marker(text, marker))
        .or_else(|| find_after_marker(text, "to"))?;

    let destination = cut_at_qualifier(remainder);
    (!destination.is_empty()).then(|| destination.to_string())
}

/// Text following `marker` when the marker appears as its own words,
/// e.g. "toward" does not match inside "towards".
fn find_after_marker<'a>(text: &'a str, marker: &str) -> Option<&'a str> {
    let mut search_from = 0;
    while let Some(found) = text[search_from..].find(marker) {
        let start = search_from + found;
        let end = start + marker.len();
        let boundary_before = start == 0 || text.as_bytes()[start - 1] == b' ';
        let boundary_after = end < text.len() && text.as_bytes()[end] == b' ';
        if boundary_before && boundary_after {
            return Some(text[end..].trim_start());
        }
        search_from = end;
    }
    None
}

fn cut_at_qualifier(fragment: &str) -> &str {
    const QUALIFIERS: [&str; 12] = [
        ",", " as ", " in ", " by ", " using ", " with ", " under ", " within ", " for ",
        " need", " please", " now",
    ];

    let mut end = fragment.len();
    for qualifier in QUALIFIERS {
        if let Some(position) = fragment.find(qualifier) {
            end = end.min(position);
        }
    }

    fragment[..end]
        .trim()
        .trim_start_matches("the ")
        .trim()
        .trim_end_matches(['.', '!', '?'])
}

fn extract_ride_type(text: &str) -> Option<RideType> {
    const RICKSHAW: [&str; 4] = ["auto-rickshaw", "auto rickshaw", "rickshaw", "auto"];
    const TWO_WHEELER: [&str; 5] = ["two-wheeler", "two wheeler", "motorcycle", "scooter", "bike"];
    const PREMIUM: [&str; 4] = ["premium", "comfort", "suv", "xl"];
    const STANDARD: [&str; 4] = ["economy", "sedan", "car", "cab"];

    let matches_any = |phrases: &[&str]| phrases.iter().any(|phrase| contains_phrase(text, phrase));

    if matches_any(&RICKSHAW) {
        Some(RideType::Rickshaw)
    } else if matches_any(&TWO_WHEELER) {
        Some(RideType::TwoWheeler)
    } else if matches_any(&PREMIUM) {
        Some(RideType::Premium)
    } else if matches_any(&STANDARD) {
        Some(RideType::Standard)
    } else {
        None
    }
}

fn extract_passengers(tokens: &[String]) -> Option<u32> {
    const UNITS: [&str; 4] = ["people", "passengers", "persons", "pax"];

    for (index, token) in tokens.iter().enumerate() {
        let Ok(count) = token.parse::<u32>() else { continue };
        if count == 0 {
            continue;
        }

        let next = tokens.get(index + 1).map(String::as_str);
        if next.is_some_and(|word| UNITS.contains(&word)) {
            return Some(count);
        }
        if next == Some("of") && tokens.get(index + 2).map(String::as_str) == Some("us") {
            return Some(count);
        }
    }

    None
}

fn extract_luggage(text: &str) -> Option<bool> {
    const KEYWORDS: [&str; 6] = ["luggage", "baggage", "suitcases", "suitcase", "bags", "bag"];
    KEYWORDS.iter().any(|keyword| contains_phrase(text, keyword)).then_some(true)
}

fn extract_ac_preference(text: &str) -> Option<bool> {
    // negative forms first so "no ac" is not read as an AC request
    const NEGATIVE: [&str; 4] = ["no ac", "non-ac", "non ac", "without ac"];
    const POSITIVE: [&str; 4] = ["ac", "air conditioning", "air-conditioned", "air conditioned"];

    if NEGATIVE.iter().any(|phrase| contains_phrase(text, phrase)) {
        return Some(false);
    }
    if POSITIVE.iter().any(|phrase| contains_phrase(text, phrase)) {
        return Some(true);
    }
    None
}

fn extract_budget(tokens: &[String]) -> Option<Decimal> {
    const BEFORE: [&str; 7] = ["under", "within", "max", "budget", "rs", "inr", "₹"];
    const AFTER: [&str; 4] = ["rupees", "rs", "inr", "budget"];

    for (index, token) in tokens.iter().enumerate() {
        let (currency_prefixed, number) = match token.strip_prefix('₹') {
            Some(rest) => (true, rest),
            None => (false, token.as_str()),
        };

        let Ok(amount) = number.parse::<Decimal>() else { continue };
        if amount <= Decimal::ZERO {
            continue;
        }

        if currency_prefixed {
            return Some(amount);
        }

        let previous =
            index.checked_sub(1).and_then(|prior| tokens.get(prior)).map(String::as_str);
        let next = tokens.get(index + 1).map(String::as_str);
        if previous.is_some_and(|word| BEFORE.contains(&word))
            || next.is_some_and(|word| AFTER.contains(&word))
        {
            return Some(amount);
        }
    }

    None
}

/// Substring search constrained to word boundaries: `ac` matches in
/// "need ac auto" but not inside "black".
fn contains_phrase(text: &str, phrase: &str) -> bool {
    let mut search_from = 0;
    while let Some(found) = text[search_from..].find(phrase) {
        let start = search_from + found;
        let end = start + phrase.len();
        let boundary_before =
            !text[..start].chars().next_back().is_some_and(|c| c.is_alphanumeric());
        let boundary_after = !text[end..].chars().next().is_some_and(|c| c.is_alphanumeric());
        if boundary_before && boundary_after {
            return true;
        }
        search_from = end;
    }
    false
}
