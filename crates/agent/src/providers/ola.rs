use cabby_core::domain::preferences::{RidePreferences, RideType};
use cabby_core::domain::quote::{ProviderId, RideQuote};

use crate::provider::AppProfile;

pub struct OlaProfile;

impl AppProfile for OlaProfile {
    fn id(&self) -> ProviderId {
        ProviderId::new("ola")
    }

    fn app_name(&self) -> &'static str {
        "Ola"
    }

    fn package_id(&self) -> &'static str {
        "com.olacabs.app"
    }

    fn map_ride_type(&self, ride_type: RideType) -> &'static str {
        match ride_type {
            RideType::Standard => "Ola Prime",
            RideType::Rickshaw => "Ola Auto",
            RideType::TwoWheeler => "Ola Bike",
            RideType::Premium => "Ola Plus",
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
            "Get an Ola fare estimate.\n\
             1. Confirm the pickup location is {pickup} (or current location).\n\
             2. Tap the search bar and type the destination: {destination}.\n\
             3. Pick the first matching suggestion and wait for the category list.\n\
             4. Find the {tier} category.\n\
             Extract the category name, estimated fare in rupees, estimated arrival\n\
             time, distance if visible, and any peak pricing charges."
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
            "Complete an Ola booking.\n\
             Pickup: {pickup}. Destination: {destination}. Category: {ride_type}.\n\
             Expected fare: {price} {currency}. Passengers: {passengers}.\n\
             Select the category, confirm the booking, and wait for driver\n\
             assignment. Extract the booking id, confirmation status, driver\n\
             details if shown, final fare, and driver arrival estimate.",
            ride_type = quote.offered_ride_type,
            price = quote.price,
            currency = quote.currency,
            passengers = preferences.passengers,
        )
    }
}
