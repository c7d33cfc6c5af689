use thiserror::Error;

use crate::domain::quote::ProviderId;

/// Failure of a single provider during one lifecycle operation. These are
/// captured per provider during the quote phase and excluded from the
/// round, never propagated across the fan-out boundary.
#[derive(Clone, Debug, Error, PartialEq, Eq)]
pub enum ProviderError {
    #[error("automation session unreachable: {0}")]
    Connectivity(String),
    #[error("app `{app}` is not available on the device")]
    Unavailable { app: String },
    #[error("could not extract structured data from automation output: {0}")]
    Extraction(String),
    #[error("{phase} did not complete within its time budget")]
    Timeout { phase: String },
    #[error("operation requires the `{expected}` state but the session is `{actual}`")]
    Precondition { expected: String, actual: String },
    #[error("booking failed: {0}")]
    Booking(String),
}

/// Failure of a whole comparison round. The only fatal quote-phase
/// condition: every provider failed or produced nothing usable.
#[derive(Clone, Debug, Error, PartialEq, Eq)]
pub enum CompareError {
    #[error("no quotes available from any provider ({} attempted)", .attempted.len())]
    NoQuotes { attempted: Vec<ProviderId>, errors: Vec<(ProviderId, ProviderError)> },
}

#[derive(Clone, Debug, Error, PartialEq, Eq)]
pub enum BookError {
    #[error("comparison holds no quotes to book")]
    EmptyComparison,
    #[error("no provider session available for `{0}`")]
    SessionUnavailable(ProviderId),
    #[error("booking on `{provider}` failed")]
    Provider {
        provider: ProviderId,
        #[source]
        source: ProviderError,
    },
}
