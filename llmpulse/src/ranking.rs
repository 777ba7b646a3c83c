use chrono::{DateTime, Utc};

use crate::model::ContentItem;

/// Applies the cutoff window, orders most-recent-first and caps the bucket.
///
/// The sort is stable, so items sharing a timestamp keep their discovery
/// order and repeated runs over the same input produce identical output.
pub fn filter_and_rank(
    mut items: Vec<ContentItem>,
    cutoff: DateTime<Utc>,
    max_count: usize,
) -> Vec<ContentItem> {
    items.retain(|item| item.published >= cutoff);
    items.sort_by(|a, b| b.published.cmp(&a.published));
    items.truncate(max_count);
    items
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Duration;
    use common::Category;

    fn item(title: &str, published: DateTime<Utc>) -> ContentItem {
        ContentItem {
            title: title.to_string(),
            link: format!("https://example.com/{title}"),
            raw_summary: String::new(),
            published,
            source: "src".to_string(),
            category: Category::Industry,
            ai_summary: None,
        }
    }

    #[test]
    fn drops_items_before_cutoff() {
        let now = Utc::now();
        let cutoff = now - Duration::days(7);
        let items = vec![
            item("recent", now - Duration::days(1)),
            item("stale", now - Duration::days(30)),
            item("boundary", cutoff),
        ];

        let ranked = filter_and_rank(items, cutoff, 10);
        let titles: Vec<_> = ranked.iter().map(|i| i.title.as_str()).collect();
        assert_eq!(titles, vec!["recent", "boundary"]);
        assert!(ranked.iter().all(|i| i.published >= cutoff));
    }

    #[test]
    fn sorts_newest_first_and_truncates() {
        let now = Utc::now();
        let items = vec![
            item("c", now - Duration::hours(3)),
            item("a", now - Duration::hours(1)),
            item("d", now - Duration::hours(4)),
            item("b", now - Duration::hours(2)),
        ];

        let ranked = filter_and_rank(items, now - Duration::days(7), 3);
        let titles: Vec<_> = ranked.iter().map(|i| i.title.as_str()).collect();
        assert_eq!(titles, vec!["a", "b", "c"]);
    }

    #[test]
    fn ties_keep_discovery_order() {
        let now = Utc::now();
        let t = now - Duration::hours(2);
        let items = vec![
            item("first", t),
            item("second", t),
            item("newest", now - Duration::hours(1)),
            item("third", t),
        ];

        let ranked = filter_and_rank(items, now - Duration::days(7), 10);
        let titles: Vec<_> = ranked.iter().map(|i| i.title.as_str()).collect();
        assert_eq!(titles, vec!["newest", "first", "second", "third"]);
    }

    #[test]
    fn is_idempotent() {
        let now = Utc::now();
        let cutoff = now - Duration::days(7);
        let items = vec![
            item("a", now - Duration::hours(5)),
            item("b", now - Duration::hours(5)),
            item("c", now - Duration::hours(1)),
        ];

        let once = filter_and_rank(items, cutoff, 2);
        let twice = filter_and_rank(once.clone(), cutoff, 2);
        let once_titles: Vec<_> = once.iter().map(|i| i.title.as_str()).collect();
        let twice_titles: Vec<_> = twice.iter().map(|i| i.title.as_str()).collect();
        assert_eq!(once_titles, twice_titles);
    }

    #[test]
    fn empty_input_is_not_an_error() {
        let ranked = filter_and_rank(Vec::new(), Utc::now(), 10);
        assert!(ranked.is_empty());
    }
}
