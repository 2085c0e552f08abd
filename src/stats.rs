//! Label statistics derived from backend stats payloads
//!
//! The backend reports one `{class, amount}` entry per category, with the
//! empty class standing for images that are still unlabeled. A summary is
//! always rebuilt from the latest payload; nothing is patched incrementally.

use serde::{Deserialize, Serialize};

/// One entry of a backend stats payload
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StatsEntry {
    /// Category name; `""` means "not labeled yet"
    #[serde(rename = "class")]
    pub category: String,
    /// Number of images in this category
    pub amount: u64,
}

impl StatsEntry {
    /// Build an entry
    pub fn new(category: impl Into<String>, amount: u64) -> Self {
        Self {
            category: category.into(),
            amount,
        }
    }

    /// Whether this entry counts unlabeled images
    pub fn is_remaining(&self) -> bool {
        self.category.is_empty()
    }
}

/// Totals and per-category rows for display
///
/// `labeled + remaining == total` holds for every summary produced by
/// [`summarize`].
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct StatsSummary {
    /// Sum of all amounts
    pub total: u64,
    /// Images that already carry a label
    pub labeled: u64,
    /// Images still waiting for a label
    pub remaining: u64,
    /// Labeled categories in backend order, without the unlabeled entry
    pub rows: Vec<StatsEntry>,
}

impl StatsSummary {
    /// True for the reset state (no stats reported)
    pub fn is_empty(&self) -> bool {
        self.total == 0 && self.rows.is_empty()
    }

    /// One-line overview, e.g. `Total: 8 Labeled: 3 Remaining: 5`
    pub fn headline(&self) -> String {
        format!(
            "Total: {} Labeled: {} Remaining: {}",
            self.total, self.labeled, self.remaining
        )
    }
}

/// Summarize a raw stats payload
///
/// An absent payload yields the empty summary. A payload without an
/// unlabeled entry is treated as having nothing remaining.
///
/// # Examples
///
/// ```
/// use phototag::stats::{summarize, StatsEntry};
///
/// let raw = vec![StatsEntry::new("", 5), StatsEntry::new("keep", 3)];
/// let summary = summarize(Some(raw.as_slice()));
/// assert_eq!((summary.total, summary.labeled, summary.remaining), (8, 3, 5));
/// assert_eq!(summary.rows, vec![StatsEntry::new("keep", 3)]);
/// ```
pub fn summarize(raw: Option<&[StatsEntry]>) -> StatsSummary {
    let Some(entries) = raw else {
        return StatsSummary::default();
    };

    // Amounts come straight off the wire; clamp instead of overflowing
    let total = entries
        .iter()
        .fold(0u64, |acc, e| acc.saturating_add(e.amount));
    let remaining = entries
        .iter()
        .filter(|e| e.is_remaining())
        .fold(0u64, |acc, e| acc.saturating_add(e.amount));
    let rows = entries
        .iter()
        .filter(|e| !e.is_remaining())
        .cloned()
        .collect();

    StatsSummary {
        total,
        labeled: total.saturating_sub(remaining),
        remaining,
        rows,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn entries(pairs: &[(&str, u64)]) -> Vec<StatsEntry> {
        pairs.iter().map(|(c, a)| StatsEntry::new(*c, *a)).collect()
    }

    #[test]
    fn test_summarize_absent_is_empty() {
        let summary = summarize(None);
        assert_eq!(summary, StatsSummary::default());
        assert!(summary.is_empty());
        assert!(summary.rows.is_empty());
    }

    #[test]
    fn test_summarize_basic_counts() {
        let raw = entries(&[("", 5), ("keep", 3)]);
        let summary = summarize(Some(raw.as_slice()));
        assert_eq!(summary.total, 8);
        assert_eq!(summary.labeled, 3);
        assert_eq!(summary.remaining, 5);
        assert_eq!(summary.rows, entries(&[("keep", 3)]));
    }

    #[test]
    fn test_summarize_without_unlabeled_entry() {
        let raw = entries(&[("keep", 4), ("work", 2)]);
        let summary = summarize(Some(raw.as_slice()));
        assert_eq!(summary.total, 6);
        assert_eq!(summary.remaining, 0);
        assert_eq!(summary.labeled, 6);
        assert_eq!(summary.rows.len(), 2);
    }

    #[test]
    fn test_summarize_labeled_plus_remaining_is_total() {
        let cases = [
            entries(&[]),
            entries(&[("", 0)]),
            entries(&[("", 10)]),
            entries(&[("meme", 1), ("", 7), ("work", 9), ("keep", 0)]),
            entries(&[("", 2), ("", 3), ("keep", 1)]),
        ];
        for raw in cases {
            let summary = summarize(Some(raw.as_slice()));
            assert_eq!(summary.labeled + summary.remaining, summary.total);
            assert!(summary.rows.iter().all(|r| !r.category.is_empty()));
        }
    }

    #[test]
    fn test_summarize_keeps_backend_order() {
        let raw = entries(&[("work", 1), ("", 1), ("keep", 1), ("meme", 1)]);
        let names: Vec<_> = summarize(Some(raw.as_slice()))
            .rows
            .into_iter()
            .map(|r| r.category)
            .collect();
        assert_eq!(names, vec!["work", "keep", "meme"]);
    }

    #[test]
    fn test_summarize_is_idempotent() {
        let raw = entries(&[("", 2), ("keep", 3), ("work", 1)]);
        let before = raw.clone();
        let first = summarize(Some(raw.as_slice()));
        let second = summarize(Some(raw.as_slice()));
        assert_eq!(first, second);
        assert_eq!(raw, before);
    }

    #[test]
    fn test_empty_payload_is_not_absent() {
        let empty: Vec<StatsEntry> = Vec::new();
        let summary = summarize(Some(empty.as_slice()));
        assert_eq!(summary.total, 0);
        assert!(summary.is_empty());
    }

    #[test]
    fn test_headline() {
        let raw = entries(&[("", 0), ("keep", 8)]);
        assert_eq!(
            summarize(Some(raw.as_slice())).headline(),
            "Total: 8 Labeled: 8 Remaining: 0"
        );
    }

    #[test]
    fn test_huge_amounts_saturate() {
        let raw: Vec<StatsEntry> =
            serde_json::from_str(r#"[{"class":"","amount":18446744073709551615},{"class":"keep","amount":1}]"#)
                .unwrap();
        let summary = summarize(Some(raw.as_slice()));
        assert_eq!(summary.total, u64::MAX);
        assert_eq!(summary.remaining, u64::MAX);
        assert_eq!(summary.labeled, 0);
        assert_eq!(summary.labeled + summary.remaining, summary.total);
    }

    #[test]
    fn test_stats_entry_wire_name() {
        let entry: StatsEntry = serde_json::from_str(r#"{"class":"keep","amount":3}"#).unwrap();
        assert_eq!(entry, StatsEntry::new("keep", 3));
        let json = serde_json::to_string(&entry).unwrap();
        assert!(json.contains("\"class\""));
    }
}
