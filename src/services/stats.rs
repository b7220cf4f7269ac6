use std::collections::HashMap;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Mutex;

/// In-process usage counters backing the admin overview.
///
/// Counters reset on restart; they are operational signals, not durable
/// analytics.
#[derive(Debug, Default)]
pub struct UsageStats {
    registers: AtomicU64,
    logins: AtomicU64,
    searches: AtomicU64,
    locations: Mutex<HashMap<String, u64>>,
}

/// Snapshot of the usage counters
#[derive(Debug, Clone)]
pub struct UsageOverview {
    pub registers: u64,
    pub logins: u64,
    pub searches: u64,
    pub top_locations: Vec<(String, u64)>,
}

impl UsageStats {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn record_register(&self) {
        self.registers.fetch_add(1, Ordering::Relaxed);
    }

    pub fn record_login(&self) {
        self.logins.fetch_add(1, Ordering::Relaxed);
    }

    /// Count one search, attributing it to the searched location if any.
    pub fn record_search(&self, location: Option<&str>) {
        self.searches.fetch_add(1, Ordering::Relaxed);

        if let Some(location) = location.map(str::trim).filter(|l| !l.is_empty()) {
            if let Ok(mut map) = self.locations.lock() {
                *map.entry(location.to_lowercase()).or_insert(0) += 1;
            }
        }
    }

    /// Snapshot the counters, with the `top_n` most searched locations.
    pub fn overview(&self, top_n: usize) -> UsageOverview {
        let mut top_locations: Vec<(String, u64)> = self
            .locations
            .lock()
            .map(|map| map.iter().map(|(k, v)| (k.clone(), *v)).collect())
            .unwrap_or_default();

        top_locations.sort_by(|a, b| b.1.cmp(&a.1).then_with(|| a.0.cmp(&b.0)));
        top_locations.truncate(top_n);

        UsageOverview {
            registers: self.registers.load(Ordering::Relaxed),
            logins: self.logins.load(Ordering::Relaxed),
            searches: self.searches.load(Ordering::Relaxed),
            top_locations,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_counters_start_at_zero() {
        let stats = UsageStats::new();
        let overview = stats.overview(5);

        assert_eq!(overview.registers, 0);
        assert_eq!(overview.logins, 0);
        assert_eq!(overview.searches, 0);
        assert!(overview.top_locations.is_empty());
    }

    #[test]
    fn test_search_attribution_case_folded() {
        let stats = UsageStats::new();
        stats.record_search(Some("Maribor"));
        stats.record_search(Some("maribor"));
        stats.record_search(Some("Piran"));
        stats.record_search(None);

        let overview = stats.overview(5);
        assert_eq!(overview.searches, 4);
        assert_eq!(overview.top_locations[0], ("maribor".to_string(), 2));
        assert_eq!(overview.top_locations[1], ("piran".to_string(), 1));
    }

    #[test]
    fn test_blank_location_not_attributed() {
        let stats = UsageStats::new();
        stats.record_search(Some("   "));

        let overview = stats.overview(5);
        assert_eq!(overview.searches, 1);
        assert!(overview.top_locations.is_empty());
    }

    #[test]
    fn test_top_n_truncation() {
        let stats = UsageStats::new();
        for location in ["a", "b", "c", "d"] {
            stats.record_search(Some(location));
        }

        assert_eq!(stats.overview(2).top_locations.len(), 2);
    }
}
