use cabby_core::domain::preferences::{RidePreferences, RideType};
use cabby_core::domain::quote::{ProviderId, RideQuote};

use crate::provider::AppProfile;

pub struct UberProfile;

impl AppProfile for UberProfile {
    fn id(&self) -> ProviderId {
        ProviderId::new("uber")
    }

    fn app_name(&self) -> &'static str {
        "Uber"
    }

    fn package_id(&self) -> &'static str {
        "com.ubercab"
    }

    fn map_ride_type(&self, ride_type: RideType) -> &'static str {
        match ride_type {
            RideType::Standard => "UberGo",
            RideType::Rickshaw => "Uber Auto",
            RideType::TwoWheeler => "Uber Moto",
            RideType::Premium => "Uber XL",
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
            "Get an Uber fare estimate.\n\
             1. Confirm the pickup location is {pickup} (or current location).\n\
             2. Tap the destination field (\"Where to?\") and type: {destination}.\n\
             3. Select the first matching suggestion and wait for the fare screen.\n\
             4. Find the {tier} option in the ride list.\n\
             Extract the ride type name, estimated fare in rupees, estimated arrival\n\
             time, distance if visible, and any surge or extra charges."
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
            "Complete an Uber booking.\n\
             Pickup: {pickup}. Destination: {destination}. Ride type: {ride_type}.\n\
             Expected fare: {price} {currency}. Passengers: {passengers}.\n\
             Select the ride type, proceed past the confirmation screen, and\n\
             complete the booking. Extract the booking id, confirmation status,\n\
             driver details if shown, final fare, and driver arrival estimate.",
            ride_type = quote.offered_ride_type,
            price = quote.price,
            currency = quote.currency,
            passengers = preferences.passengers,
        )
    }
}

#[cfg(test)]
mod tests {
    use cabby_core::domain::preferences::{RidePreferences, RideType};

    use super::UberProfile;
    use crate::provider::AppProfile;

    #[test]
    fn ride_types_map_to_uber_vocabulary() {
        let profile = UberProfile;

        assert_eq!(profile.map_ride_type(RideType::Standard), "UberGo");
        assert_eq!(profile.map_ride_type(RideType::Rickshaw), "Uber Auto");
        assert_eq!(profile.map_ride_type(RideType::TwoWheeler), "Uber Moto");
        assert_eq!(profile.map_ride_type(RideType::Premium), "Uber XL");
    }

    #[test]
    fn price_goal_names_the_destination_and_mapped_tier() {
        let preferences = RidePreferences {
            ride_type: RideType::Rickshaw,
            ..RidePreferences::to_destination("airport")
        };

        let goal = UberProfile.price_goal("current location", "airport", &preferences);

        assert!(goal.contains("airport"));
        assert!(goal.contains("Uber Auto"));
    }
}
