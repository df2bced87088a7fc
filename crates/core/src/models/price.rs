use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// A single price data point (date → price).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PricePoint {
    pub date: NaiveDate,
    pub price: f64,
}

/// Local cache of historical price data, keyed by asset symbol.
///
/// Historical prices don't change once published, so every fetched point is
/// kept for the lifetime of the process: a (symbol, date range) is fetched
/// from the API at most once, and repeated queries are served locally.
///
/// Points alone can't answer "is this range complete?" — non-trading days
/// legitimately have no point, so a sparse cache is indistinguishable from a
/// partially fetched one. The cache therefore also records which date ranges
/// have been fully fetched (`coverage`), and only serves a range query when
/// the requested range lies inside a covered interval.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct PriceCache {
    /// Price entries: symbol → Vec of PricePoints, sorted by date
    pub entries: HashMap<String, Vec<PricePoint>>,

    /// Fully fetched date ranges per symbol: sorted, non-overlapping,
    /// inclusive intervals. Adjacent intervals are merged on insert.
    pub coverage: HashMap<String, Vec<(NaiveDate, NaiveDate)>>,
}

impl PriceCache {
    pub fn new() -> Self {
        Self::default()
    }

    /// Get a cached price for a specific (symbol, date).
    /// Returns None if not cached. Uses binary search (O(log n)).
    pub fn get_price(&self, symbol: &str, date: NaiveDate) -> Option<f64> {
        let entries = self.entries.get(&symbol.to_uppercase())?;
        entries
            .binary_search_by_key(&date, |p| p.date)
            .ok()
            .map(|idx| entries[idx].price)
    }

    /// Insert or update a price point in the cache.
    /// Maintains sorted order by date using binary search (O(log n) insertion).
    pub fn set_price(&mut self, symbol: &str, date: NaiveDate, price: f64) {
        let entries = self.entries.entry(symbol.to_uppercase()).or_default();

        match entries.binary_search_by_key(&date, |p| p.date) {
            Ok(idx) => {
                // Update existing entry at this date
                entries[idx].price = price;
            }
            Err(idx) => {
                // Insert at sorted position
                entries.insert(idx, PricePoint { date, price });
            }
        }
    }

    /// Insert multiple price points at once. Does NOT mark any range as
    /// covered — use `set_price_range` when the points are known to be the
    /// complete data for a date range.
    pub fn set_prices(&mut self, symbol: &str, points: &[PricePoint]) {
        for point in points {
            self.set_price(symbol, point.date, point.price);
        }
    }

    /// Insert the complete set of points for a date range (e.g., a
    /// historical range API response) and mark the range as covered.
    pub fn set_price_range(
        &mut self,
        symbol: &str,
        from: NaiveDate,
        to: NaiveDate,
        points: &[PricePoint],
    ) {
        self.set_prices(symbol, points);
        self.mark_covered(symbol, from, to);
    }

    /// Check whether a date range has been fully fetched for a symbol.
    pub fn is_covered(&self, symbol: &str, from: NaiveDate, to: NaiveDate) -> bool {
        self.coverage
            .get(&symbol.to_uppercase())
            .is_some_and(|intervals| {
                intervals
                    .iter()
                    .any(|&(start, end)| start <= from && to <= end)
            })
    }

    /// Record that [from, to] has been fully fetched for a symbol.
    /// Overlapping and directly adjacent intervals are merged.
    pub fn mark_covered(&mut self, symbol: &str, from: NaiveDate, to: NaiveDate) {
        let intervals = self.coverage.entry(symbol.to_uppercase()).or_default();

        let mut merged = (from, to);
        let mut result: Vec<(NaiveDate, NaiveDate)> = Vec::with_capacity(intervals.len() + 1);

        for &(start, end) in intervals.iter() {
            // Mergeable when intervals overlap or touch (1-day gap closes)
            if start <= merged.1 + chrono::Duration::days(1)
                && merged.0 <= end + chrono::Duration::days(1)
            {
                merged = (merged.0.min(start), merged.1.max(end));
            } else {
                result.push((start, end));
            }
        }

        result.push(merged);
        result.sort_by_key(|&(start, _)| start);
        *intervals = result;
    }

    /// Get all cached price points for a symbol in a date range (inclusive).
    /// Uses binary search to efficiently find the range boundaries.
    pub fn get_price_range(&self, symbol: &str, from: NaiveDate, to: NaiveDate) -> Vec<PricePoint> {
        self.entries
            .get(&symbol.to_uppercase())
            .map(|entries| {
                // Binary search for start index (first entry >= from)
                let start = entries
                    .binary_search_by_key(&from, |p| p.date)
                    .unwrap_or_else(|pos| pos);
                // Binary search for end index (first entry > to)
                let end = entries
                    .binary_search_by_key(&to, |p| p.date)
                    .map(|pos| pos + 1) // include the exact match
                    .unwrap_or_else(|pos| pos);
                entries[start..end].to_vec()
            })
            .unwrap_or_default()
    }

    /// Get the total number of cached price points across all symbols.
    pub fn total_entries(&self) -> usize {
        self.entries.values().map(|v| v.len()).sum()
    }

    /// Get the number of distinct symbols cached.
    pub fn symbol_count(&self) -> usize {
        self.entries.len()
    }

    /// Remove all cached price points older than `before` date.
    /// Returns the number of entries removed.
    pub fn prune_before(&mut self, before: NaiveDate) -> usize {
        let mut removed = 0;
        for entries in self.entries.values_mut() {
            let old_len = entries.len();
            // Binary search for the first entry >= before
            let split = entries
                .binary_search_by_key(&before, |p| p.date)
                .unwrap_or_else(|pos| pos);
            if split > 0 {
                entries.drain(..split);
                removed += old_len - entries.len();
            }
        }
        self.entries.retain(|_, v| !v.is_empty());

        // Trim coverage intervals that extend before the prune date
        for intervals in self.coverage.values_mut() {
            intervals.retain_mut(|(start, end)| {
                if *end < before {
                    return false;
                }
                if *start < before {
                    *start = before;
                }
                true
            });
        }
        self.coverage.retain(|_, v| !v.is_empty());

        removed
    }

    /// Clear all cached data.
    pub fn clear(&mut self) {
        self.entries.clear();
        self.coverage.clear();
    }
}
