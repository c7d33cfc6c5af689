use cabby_agent::extractor::PreferenceExtractor;

use super::CommandResult;

pub fn run(text: &str) -> CommandResult {
    let preferences = PreferenceExtractor::new().extract(text);

    let message = if preferences.has_destination() {
        format!("preferences extracted for destination `{}`", preferences.destination)
    } else {
        "no destination recognized; the record uses the `unspecified` sentinel".to_string()
    };

    match serde_json::to_value(&preferences) {
        Ok(data) => CommandResult::success("extract", message, Some(data)),
        Err(error) => CommandResult::failure("extract", "serialization", error.to_string(), 1),
    }
}
