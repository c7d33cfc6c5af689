pub mod comparator;
pub mod config;
pub mod domain;
pub mod errors;

pub use comparator::{rank, DeterministicRanker, ProviderPriority, QuoteRanker};
pub use config::{AppConfig, ConfigError, ConfigOverrides, LoadOptions, LogFormat};
pub use domain::booking::{Booking, BookingStatus};
pub use domain::comparison::{Comparison, ComparisonRequest};
pub use domain::preferences::{RidePreferences, RideType, UNSPECIFIED_DESTINATION};
pub use domain::quote::{ProviderId, RideQuote};
pub use errors::{BookError, CompareError, ProviderError};
