use crate::core::filters::matches_alert;
use crate::models::{Alert, Listing};

/// Evaluate one alert against the catalog.
///
/// Pure and deterministic: the result preserves catalog order and the
/// catalog is never mutated, so this is safe to call concurrently for
/// different alerts. Listings are already unique by id, so no
/// deduplication is needed.
pub fn matching_listings<'a>(alert: &Alert, listings: &'a [Listing]) -> Vec<&'a Listing> {
    listings
        .iter()
        .filter(|listing| matches_alert(listing, alert))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn listing(id: i64, location: &str, price: f64) -> Listing {
        Listing {
            id,
            name: format!("Apartment {}", id),
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

    fn catalog() -> Vec<Listing> {
        vec![
            listing(1, "Maribor", 75.0),
            listing(2, "Piran", 150.0),
            listing(3, "Ljubljana", 120.0),
            listing(4, "Maribor", 95.0),
        ]
    }

    #[test]
    fn test_matches_location_and_price() {
        let listings = catalog();
        let matches = matching_listings(&alert("maribor", 50.0, 100.0), &listings);

        let ids: Vec<i64> = matches.iter().map(|l| l.id).collect();
        assert_eq!(ids, vec![1, 4]);
    }

    #[test]
    fn test_no_matches_outside_price_range() {
        let listings = vec![listing(1, "Maribor", 75.0), listing(2, "Piran", 150.0)];
        let matches = matching_listings(&alert("Ljubljana", 200.0, 300.0), &listings);

        assert!(matches.is_empty());
    }

    #[test]
    fn test_preserves_catalog_order() {
        let listings = catalog();
        let matches = matching_listings(&alert("", 0.0, 1000.0), &listings);

        let ids: Vec<i64> = matches.iter().map(|l| l.id).collect();
        assert_eq!(ids, vec![1, 2, 3, 4]);
    }

    #[test]
    fn test_empty_location_matches_all_within_price() {
        let listings = catalog();
        let matches = matching_listings(&alert("", 100.0, 200.0), &listings);

        let ids: Vec<i64> = matches.iter().map(|l| l.id).collect();
        assert_eq!(ids, vec![2, 3]);
    }

    #[test]
    fn test_deterministic_across_calls() {
        let listings = catalog();
        let a = alert("maribor", 50.0, 100.0);

        let first: Vec<i64> = matching_listings(&a, &listings).iter().map(|l| l.id).collect();
        let second: Vec<i64> = matching_listings(&a, &listings).iter().map(|l| l.id).collect();
        assert_eq!(first, second);
    }

    #[test]
    fn test_inverted_range_never_matches() {
        let listings = catalog();
        let matches = matching_listings(&alert("", 500.0, 100.0), &listings);

        assert!(matches.is_empty());
    }
}
