pub mod book;
pub mod compare;
pub mod extract;

use serde::Serialize;
use serde_json::Value;

use cabby_agent::provider::ProviderSession;
use cabby_agent::providers;
use cabby_agent::simulation::SimulatedBackend;
use cabby_core::config::AppConfig;
use cabby_core::domain::quote::ProviderId;

#[derive(Debug, Clone)]
pub struct CommandResult {
    pub exit_code: u8,
    pub output: String,
}

#[derive(Debug, Serialize)]
struct CommandOutcome {
    command: String,
    status: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    error_class: Option<String>,
    message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    data: Option<Value>,
}

impl CommandResult {
    pub fn success(command: &str, message: impl Into<String>, data: Option<Value>) -> Self {
        let payload = CommandOutcome {
            command: command.to_string(),
            status: "ok".to_string(),
            error_class: None,
            message: message.into(),
            data,
        };
        Self { exit_code: 0, output: serialize_payload(payload) }
    }

    pub fn failure(
        command: &str,
        error_class: &str,
        message: impl Into<String>,
        exit_code: u8,
    ) -> Self {
        let payload = CommandOutcome {
            command: command.to_string(),
            status: "error".to_string(),
            error_class: Some(error_class.to_string()),
            message: message.into(),
            data: None,
        };
        Self { exit_code, output: serialize_payload(payload) }
    }
}

fn serialize_payload(payload: CommandOutcome) -> String {
    serde_json::to_string(&payload).unwrap_or_else(|error| {
        format!(
            "{{\"command\":\"unknown\",\"status\":\"error\",\"error_class\":\"serialization\",\"message\":\"{}\"}}",
            error.to_string().replace('\\', "\\\\").replace('"', "\\\"")
        )
    })
}

/// One fresh session per configured provider. Sessions are never reused
/// across rounds, so every command phase builds its own set.
pub(crate) fn build_sessions(
    command: &str,
    config: &AppConfig,
    simulate: bool,
) -> Result<Vec<ProviderSession<SimulatedBackend>>, CommandResult> {
    if !simulate {
        return Err(CommandResult::failure(
            command,
            "automation_unavailable",
            "no device automation backend is configured; pass --simulate to use the built-in demo backend",
            2,
        ));
    }

    if config.providers.debug_mode {
        tracing::debug!("trajectory capture requested for automation sessions");
    }

    let mut sessions = Vec::with_capacity(config.providers.enabled.len());
    for entry in &config.providers.enabled {
        let provider = ProviderId::new(entry);
        let profile = providers::profile_for(&provider).ok_or_else(|| {
            CommandResult::failure(
                command,
                "unknown_provider",
                format!("no integration is registered for provider `{provider}`"),
                2,
            )
        })?;
        let backend = SimulatedBackend::for_provider(&provider).ok_or_else(|| {
            CommandResult::failure(
                command,
                "unknown_provider",
                format!("no simulation preset exists for provider `{provider}`"),
                2,
            )
        })?;
        sessions.push(ProviderSession::new(profile, backend));
    }

    Ok(sessions)
}

pub(crate) fn runtime(command: &str) -> Result<tokio::runtime::Runtime, CommandResult> {
    tokio::runtime::Builder::new_multi_thread().enable_all().build().map_err(|error| {
        CommandResult::failure(command, "runtime", error.to_string(), 2)
    })
}
