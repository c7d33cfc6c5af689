use cabby_core::domain::preferences::{RidePreferences, RideType};
use cabby_core::domain::quote::{ProviderId, RideQuote};

use crate::provider::AppProfile;

/// Rapido only runs autos and bikes, so every car-shaped tier falls back
/// to Auto. The comparator treats that as an acceptable substitute.
pub struct RapidoProfile;

impl AppProfile for RapidoProfile {
    fn id(&self) -> ProviderId {
        ProviderId::new("rapido")
    }

    fn app_name(&self) -> &'static str {
        "Rapido"
    }

    fn package_id(&self) -> &'static str {
        "com.rapido.android"
    }

    fn map_ride_type(&self, ride_type: RideType) -> &'static str {
        match ride_type {
            RideType::TwoWheeler => "Bike",
            RideType::Standard | RideType::Rickshaw | RideType::Premium => "Auto",
        }
    }

    fn price_goal(
        &self,
        pickup: &str,
        destination: &str,
        preferences: &RidePreferences,
    ) -> String {
        let tier = self.map_ride_type(preferences.ride_type);
        format!(
            "Get a Rapido fare estimate.\n\
             1. Confirm the pickup location is {pickup} (or current location).\n\
             2. Tap the destination field and type: {destination}.\n\
             3. Pick the first matching suggestion and wait for the fare screen.\n\
             4. Find the {tier} option.\n\
             Extract the option name, estimated fare in rupees, estimated arrival\n\
             time, and distance if visible."
        )
    }

    fn booking_goal(
        &self,
        pickup: &str,
        destination: &str,
        preferences: &RidePreferences,
        quote: &RideQuote,
    ) -> String {
        format!(
            "Complete a Rapido booking.\n\
             Pickup: {pickup}. Destination: {destination}. Option: {ride_type}.\n\
             Expected fare: {price} {currency}. Passengers: {passengers}.\n\
             Select the option, confirm the booking, and wait for captain\n\
             assignment. Extract the booking id, confirmation status, captain\n\
             details if shown, final fare, and arrival estimate.",
            ride_type = quote.offered_ride_type,
            price = quote.price,
            currency = quote.currency,
            passengers = preferences.passengers,
        )
    }
}

#[cfg(test)]
mod tests {
    use cabby_core::domain::preferences::RideType;

    use super::RapidoProfile;
    use crate::provider::AppProfile;

    #[test]
    fn car_shaped_tiers_fall_back_to_auto() {
        let profile = RapidoProfile;

        assert_eq!(profile.map_ride_type(RideType::Standard), "Auto");
        assert_eq!(profile.map_ride_type(RideType::Rickshaw), "Auto");
        assert_eq!(profile.map_ride_type(RideType::Premium), "Auto");
        assert_eq!(profile.map_ride_type(RideType::TwoWheeler), "Bike");
    }
}
