//! Concrete ride-hailing integrations. Each one only supplies identity,
//! tier vocabulary, and goal text; the lifecycle state machine is shared
//! (see [`crate::provider::ProviderSession`]).

mod ola;
mod rapido;
mod uber;

pub use ola::OlaProfile;
pub use rapido::RapidoProfile;
pub use uber::UberProfile;

use cabby_core::domain::quote::ProviderId;

use crate::provider::AppProfile;

/// Profile for a configured provider identifier, or `None` when the
/// identifier names no known integration.
pub fn profile_for(provider: &ProviderId) -> Option<Box<dyn AppProfile>> {
    match provider.as_str() {
        "uber" => Some(Box::new(UberProfile)),
        "ola" => Some(Box::new(OlaProfile)),
        "rapido" => Some(Box::new(RapidoProfile)),
        _ => None,
    }
}
