use crate::models::{Alert, Listing};

/// Case-insensitive substring test for listing locations.
///
/// An empty `wanted` matches every location; that is how "any location"
/// subscriptions are expressed.
#[inline]
pub fn matches_location(listing_location: &str, wanted: &str) -> bool {
    listing_location
        .to_lowercase()
        .contains(&wanted.to_lowercase())
}

/// Inclusive price-range test. An inverted range matches nothing.
#[inline]
pub fn within_price_range(price: f64, min_price: f64, max_price: f64) -> bool {
    price >= min_price && price <= max_price
}

/// Full alert predicate: location substring plus inclusive price bounds.
#[inline]
pub fn matches_alert(listing: &Listing, alert: &Alert) -> bool {
    matches_location(&listing.location, &alert.location)
        && within_price_range(listing.price, alert.min_price, alert.max_price)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn listing(location: &str, price: f64) -> Listing {
        Listing {
            id: 1,
            name: format!("Apartment {}", location),
            location: location.to_string(),
            price,
            rating: 4.0,
            distance_km: 1.0,
        }
    }

    fn alert(location: &str, min_price: f64, max_price: f64) -> Alert {
        Alert {
            id: 1,
            user_id: "user-1".to_string(),
            location: location.to_string(),
            min_price,
            max_price,
            last_sent_at: None,
        }
    }

    #[test]
    fn test_location_match_case_insensitive() {
        assert!(matches_location("Maribor", "maribor"));
        assert!(matches_location("maribor", "MARIBOR"));
        assert!(matches_location("Novo Mesto", "mesto"));
    }

    #[test]
    fn test_location_no_match() {
        assert!(!matches_location("Piran", "Maribor"));
    }

    #[test]
    fn test_empty_location_matches_everything() {
        assert!(matches_location("Ljubljana", ""));
        assert!(matches_location("", ""));
    }

    #[test]
    fn test_price_bounds_inclusive() {
        assert!(within_price_range(50.0, 50.0, 100.0));
        assert!(within_price_range(100.0, 50.0, 100.0));
        assert!(within_price_range(75.0, 50.0, 100.0));
        assert!(!within_price_range(49.99, 50.0, 100.0));
        assert!(!within_price_range(100.01, 50.0, 100.0));
    }

    #[test]
    fn test_inverted_price_range_matches_nothing() {
        assert!(!within_price_range(75.0, 100.0, 50.0));
        assert!(!within_price_range(100.0, 100.0, 50.0));
        assert!(!within_price_range(50.0, 100.0, 50.0));
    }

    #[test]
    fn test_alert_predicate() {
        let l = listing("Maribor", 75.0);

        assert!(matches_alert(&l, &alert("maribor", 50.0, 100.0)));
        assert!(!matches_alert(&l, &alert("maribor", 80.0, 100.0)));
        assert!(!matches_alert(&l, &alert("Piran", 50.0, 100.0)));
    }
}
