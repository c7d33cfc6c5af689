use async_trait::async_trait;
use serde_json::Value;
use thiserror::Error;

/// The structured output shape a goal run is expected to produce.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum OutputShape {
    Price,
    Booking,
}

#[derive(Clone, Debug, Error, PartialEq, Eq)]
pub enum AutomationError {
    #[error("automation session unreachable: {0}")]
    Connection(String),
    #[error("app `{0}` could not be opened")]
    AppNotFound(String),
    #[error("goal did not produce the expected output: {0}")]
    GoalFailed(String),
}

/// External capability that drives an application/device to obtain data or
/// perform an action. The core never depends on how goal text is executed;
/// it only hands over instructions and parses the structured result.
#[async_trait]
pub trait AutomationBackend: Send + Sync {
    async fn open_app(&self, package_id: &str) -> Result<(), AutomationError>;

    /// Execute a goal against the open app and return the structured
    /// result matching `shape`.
    async fn run_goal(&self, goal: &str, shape: OutputShape) -> Result<Value, AutomationError>;

    async fn close_app(&self) -> Result<(), AutomationError>;
}
