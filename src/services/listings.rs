use crate::core::filters::{matches_location, within_price_range};
use crate::models::{Listing, ListingQuery, SortKey};

/// Static apartment catalog
///
/// Loaded once at startup and never mutated; every search and every sweep
/// evaluates against the same snapshot.
pub struct ListingStore {
    listings: Vec<Listing>,
}

impl ListingStore {
    pub fn new(listings: Vec<Listing>) -> Self {
        Self { listings }
    }

    /// The built-in catalog the service ships with.
    pub fn with_catalog() -> Self {
        Self::new(catalog())
    }

    pub fn all(&self) -> &[Listing] {
        &self.listings
    }

    pub fn get(&self, id: i64) -> Option<&Listing> {
        self.listings.iter().find(|l| l.id == id)
    }

    /// Filter and sort the catalog for the search endpoint.
    ///
    /// Uses the same predicate helpers as the alert sweep, so a search and
    /// an alert with identical criteria see identical listings.
    pub fn search(&self, query: &ListingQuery) -> Vec<Listing> {
        let location = query.location.as_deref().unwrap_or("");
        let min_price = query.min_price.unwrap_or(0.0);
        let max_price = query.max_price.unwrap_or(f64::MAX);

        let mut results: Vec<Listing> = self
            .listings
            .iter()
            .filter(|l| matches_location(&l.location, location))
            .filter(|l| within_price_range(l.price, min_price, max_price))
            .cloned()
            .collect();

        match query.sort {
            Some(SortKey::Price) => {
                results.sort_by(|a, b| {
                    a.price
                        .partial_cmp(&b.price)
                        .unwrap_or(std::cmp::Ordering::Equal)
                });
            }
            Some(SortKey::Rating) => {
                results.sort_by(|a, b| {
                    b.rating
                        .partial_cmp(&a.rating)
                        .unwrap_or(std::cmp::Ordering::Equal)
                });
            }
            Some(SortKey::Distance) => {
                results.sort_by(|a, b| {
                    a.distance_km
                        .partial_cmp(&b.distance_km)
                        .unwrap_or(std::cmp::Ordering::Equal)
                });
            }
            None => {}
        }

        results
    }
}

fn catalog() -> Vec<Listing> {
    fn listing(id: i64, name: &str, location: &str, price: f64, rating: f64, distance_km: f64) -> Listing {
        Listing {
            id,
            name: name.to_string(),
            location: location.to_string(),
            price,
            rating,
            distance_km,
        }
    }

    vec![
        listing(1, "Center Apartment", "Ljubljana", 120.0, 4.7, 0.5),
        listing(2, "Old Town Studio", "Ljubljana", 85.0, 4.4, 1.2),
        listing(3, "Riverside Flat", "Maribor", 75.0, 4.2, 2.0),
        listing(4, "Pohorje View", "Maribor", 95.0, 4.5, 5.5),
        listing(5, "Seafront Suite", "Piran", 150.0, 4.9, 0.3),
        listing(6, "Marina Apartment", "Portorož", 140.0, 4.6, 1.0),
        listing(7, "Lake House", "Bled", 160.0, 4.8, 0.8),
        listing(8, "Castle View Rooms", "Celje", 65.0, 4.0, 1.5),
        listing(9, "Coastal Room", "Koper", 90.0, 4.1, 2.2),
        listing(10, "Alpine Loft", "Kranj", 70.0, 3.9, 3.0),
    ]
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_catalog_ids_unique() {
        let store = ListingStore::with_catalog();
        let mut ids: Vec<i64> = store.all().iter().map(|l| l.id).collect();
        ids.sort_unstable();
        ids.dedup();
        assert_eq!(ids.len(), store.all().len());
    }

    #[test]
    fn test_get_by_id() {
        let store = ListingStore::with_catalog();
        assert_eq!(store.get(5).map(|l| l.location.as_str()), Some("Piran"));
        assert!(store.get(999).is_none());
    }

    #[test]
    fn test_search_by_location_and_price() {
        let store = ListingStore::with_catalog();
        let query = ListingQuery {
            location: Some("maribor".to_string()),
            min_price: Some(50.0),
            max_price: Some(80.0),
            sort: None,
        };

        let results = store.search(&query);
        assert_eq!(results.len(), 1);
        assert_eq!(results[0].id, 3);
    }

    #[test]
    fn test_search_without_filters_returns_everything() {
        let store = ListingStore::with_catalog();
        let results = store.search(&ListingQuery::default());
        assert_eq!(results.len(), store.all().len());
    }

    #[test]
    fn test_search_sorted_by_price() {
        let store = ListingStore::with_catalog();
        let query = ListingQuery {
            sort: Some(SortKey::Price),
            ..ListingQuery::default()
        };

        let results = store.search(&query);
        for pair in results.windows(2) {
            assert!(pair[0].price <= pair[1].price);
        }
    }

    #[test]
    fn test_search_sorted_by_rating_descending() {
        let store = ListingStore::with_catalog();
        let query = ListingQuery {
            sort: Some(SortKey::Rating),
            ..ListingQuery::default()
        };

        let results = store.search(&query);
        for pair in results.windows(2) {
            assert!(pair[0].rating >= pair[1].rating);
        }
    }
}
