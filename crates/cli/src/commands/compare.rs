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
) -> CommandResult {
    let preferences = PreferenceExtractor::new().extract(text);
    if !preferences.has_destination() {
        return CommandResult::failure(
            "compare",
            "unspecified_destination",
            "no destination recognized in the request; say where to go, e.g. \"go to airport\"",
            1,
        );
    }

    let sessions = match build_sessions("compare", config, simulate) {
        Ok(sessions) => sessions,
        Err(result) => return result,
    };
    let runtime = match runtime("compare") {
        Ok(runtime) => runtime,
        Err(result) => return result,
    };

    let orchestrator = Orchestrator::new(OrchestratorConfig::from_app(config));
    let pickup = pickup.unwrap_or(DEFAULT_PICKUP);
    let destination = preferences.destination.clone();

    match runtime.block_on(orchestrator.compare(pickup, &destination, &preferences, sessions)) {
        Ok(comparison) => match serde_json::to_value(&comparison) {
            Ok(data) => CommandResult::success(
                "compare",
                format!("{} eligible quote(s) for `{destination}`", comparison.quotes.len()),
                Some(data),
            ),
            Err(error) => {
                CommandResult::failure("compare", "serialization", error.to_string(), 1)
            }
        },
        Err(error) => CommandResult::failure("compare", "no_quotes", error.to_string(), 1),
    }
}
