use cabby_agent::extractor::PreferenceExtractor;
use cabby_agent::orchestrator::{Orchestrator, OrchestratorConfig};
use cabby_core::config::AppConfig;

use super::{build_sessions, runtime, CommandResult};

const DEFAULT_PICKUP: &str = "current location";

pub fn run(
    config: &AppConfig,
    text: &str,
    pickup: Option<&str>,
    simulate: bool,
    confirmed: bool,
) -> CommandResult {
    let preferences = PreferenceExtractor::new().extract(text);
    if !preferences.has_destination() {
        return CommandResult::failure(
            "book",
            "unspecified_destination",
            "no destination recognized in the request; say where to go, e.g. \"go to airport\"",
            1,
        );
    }

    let quote_sessions = match build_sessions("book", config, simulate) {
        Ok(sessions) => sessions,
        Err(result) => return result,
    };
    let runtime = match runtime("book") {
        Ok(runtime) => runtime,
        Err(result) => return result,
    };

    let orchestrator = Orchestrator::new(OrchestratorConfig::from_app(config));
    let pickup = pickup.unwrap_or(DEFAULT_PICKUP);
    let destination = preferences.destination.clone();

    let comparison = match runtime.block_on(orchestrator.compare(
        pickup,
        &destination,
        &preferences,
        quote_sessions,
    )) {
        Ok(comparison) => comparison,
        Err(error) => return CommandResult::failure("book", "no_quotes", error.to_string(), 1),
    };

    if comparison.is_empty() {
        return CommandResult::failure(
            "book",
            "no_quotes",
            "every quote was filtered out by availability or budget",
            1,
        );
    }

    if !confirmed {
        let data = serde_json::to_value(&comparison).ok();
        return CommandResult::success(
            "book",
            "confirmation required: re-run with --yes to book the cheapest quote",
            data,
        );
    }

    // Booking uses a fresh session for the winning provider only.
    let booking_sessions = match build_sessions("book", config, simulate) {
        Ok(sessions) => sessions,
        Err(result) => return result,
    };

    match runtime.block_on(orchestrator.book_cheapest(
        pickup,
        &destination,
        &preferences,
        &comparison,
        booking_sessions,
    )) {
        Ok(booking) => match serde_json::to_value(&booking) {
            Ok(data) => CommandResult::success(
                "book",
                format!("booked `{}` on `{}`", booking.ride_type, booking.provider),
                Some(data),
            ),
            Err(error) => CommandResult::failure("book", "serialization", error.to_string(), 1),
        },
        Err(error) => CommandResult::failure("book", "booking_failure", error.to_string(), 1),
    }
}

#[cfg(test)]
mod tests {
    use cabby_core::config::{AppConfig, LoadOptions};

    use super::run;

    fn config() -> AppConfig {
        AppConfig::load(LoadOptions::default()).expect("default config")
    }

    #[test]
    fn unconfirmed_booking_only_runs_the_comparison() {
        let result = run(&config(), "go to airport as rickshaw", None, true, false);

        let parsed: serde_json::Value =
            serde_json::from_str(&result.output).expect("valid json");
        assert_eq!(parsed["status"], "ok");
        assert!(parsed["message"]
            .as_str()
            .expect("message")
            .contains("confirmation required"));
        assert!(parsed["data"]["quotes"].is_array());
    }

    #[test]
    fn confirmed_booking_returns_a_booking_record() {
        let result = run(&config(), "go to airport as rickshaw", None, true, true);

        let parsed: serde_json::Value =
            serde_json::from_str(&result.output).expect("valid json");
        assert_eq!(parsed["status"], "ok");
        assert_eq!(parsed["data"]["status"], "confirmed");
        assert!(parsed["data"]["booking_id"].as_str().is_some());
    }
}
