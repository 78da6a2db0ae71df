// Dedupe & rank engine: merge provider output into a bounded, ordered list.

use std::collections::HashSet;

use crate::models::PlanItem;

pub const DEFAULT_LIMIT: usize = 12;

/// Composite identity: lower-cased title plus coordinates rounded to 4
/// decimal places (~11 m), so the same venue reported by two providers with
/// slightly different precision collapses to one entry.
fn dedupe_key(item: &PlanItem) -> String {
    format!(
        "{}|{:.4}|{:.4}",
        item.title.to_lowercase(),
        item.lat,
        item.lon
    )
}

/// Remove duplicates; first occurrence wins and input order is preserved.
pub fn dedupe(items: Vec<PlanItem>) -> Vec<PlanItem> {
    let mut seen = HashSet::new();
    let mut out = Vec::with_capacity(items.len());
    for item in items {
        if seen.insert(dedupe_key(&item)) {
            out.push(item);
        }
    }
    out
}

/// Order by source tier (events above places above fallback) and truncate.
///
/// Ties inside a tier keep their arrival order: a stable sort on the tier
/// weight alone replaces the random jitter the scoring originally used, so
/// identical inputs always produce identical output.
pub fn rank(mut items: Vec<PlanItem>, limit: usize) -> Vec<PlanItem> {
    items.sort_by(|a, b| b.source.weight().cmp(&a.source.weight()));
    items.truncate(limit);
    items
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::Source;

    fn item(title: &str, lat: f64, lon: f64, source: Source) -> PlanItem {
        PlanItem {
            title: title.to_string(),
            lat,
            lon,
            url: None,
            source,
            venue: None,
            address: None,
            when_iso: None,
        }
    }

    #[test]
    fn dedupe_collapses_same_title_and_rounded_coords() {
        let items = vec![
            item("Jazz Cafe", 42.36012, -71.05891, Source::PoiSearch),
            // Same venue from another provider, different case, sub-11m drift.
            item("JAZZ CAFE", 42.36014, -71.05893, Source::EventServiceA),
            item("Jazz Cafe", 40.0, -74.0, Source::PoiSearch),
        ];
        let out = dedupe(items);
        assert_eq!(out.len(), 2);
        // First occurrence wins.
        assert_eq!(out[0].source, Source::PoiSearch);
        assert_eq!(out[0].title, "Jazz Cafe");
    }

    #[test]
    fn dedupe_keeps_distinct_coords_past_rounding_precision() {
        let items = vec![
            item("Market", 42.3601, -71.0589, Source::PoiSearch),
            item("Market", 42.3602, -71.0589, Source::PoiSearch),
        ];
        assert_eq!(dedupe(items).len(), 2);
    }

    #[test]
    fn dedupe_output_never_longer_than_input_and_keys_unique() {
        let items = vec![
            item("A", 1.0, 1.0, Source::PoiSearch),
            item("a", 1.0, 1.0, Source::MapSearch),
            item("B", 2.0, 2.0, Source::Fallback),
            item("B", 2.0, 2.0, Source::Fallback),
        ];
        let input_len = items.len();
        let out = dedupe(items);
        assert!(out.len() <= input_len);

        let keys: HashSet<String> = out.iter().map(dedupe_key).collect();
        assert_eq!(keys.len(), out.len());
    }

    #[test]
    fn rank_orders_by_tier_descending() {
        let items = vec![
            item("place", 1.0, 1.0, Source::PoiSearch),
            item("fallback", 2.0, 2.0, Source::Fallback),
            item("event", 3.0, 3.0, Source::EventServiceA),
            item("map", 4.0, 4.0, Source::MapSearch),
        ];
        let ranked = rank(items, DEFAULT_LIMIT);
        let sources: Vec<Source> = ranked.iter().map(|i| i.source).collect();
        assert_eq!(
            sources,
            vec![
                Source::EventServiceA,
                Source::MapSearch,
                Source::PoiSearch,
                Source::Fallback
            ]
        );
    }

    #[test]
    fn rank_is_stable_within_a_tier() {
        let items = vec![
            item("first", 1.0, 1.0, Source::EventServiceA),
            item("second", 2.0, 2.0, Source::EventServiceB),
            item("third", 3.0, 3.0, Source::EventServiceA),
        ];
        let ranked = rank(items, DEFAULT_LIMIT);
        let titles: Vec<&str> = ranked.iter().map(|i| i.title.as_str()).collect();
        assert_eq!(titles, vec!["first", "second", "third"]);
    }

    #[test]
    fn rank_truncates_to_limit() {
        let items: Vec<PlanItem> = (0..30)
            .map(|i| item(&format!("item{i}"), i as f64, i as f64, Source::PoiSearch))
            .collect();
        assert_eq!(rank(items, DEFAULT_LIMIT).len(), DEFAULT_LIMIT);
    }

    #[test]
    fn rank_returns_min_of_limit_and_len() {
        let items = vec![item("only", 1.0, 1.0, Source::Fallback)];
        assert_eq!(rank(items, DEFAULT_LIMIT).len(), 1);
        assert_eq!(rank(vec![], DEFAULT_LIMIT).len(), 0);
    }
}
