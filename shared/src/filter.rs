use serde::{Deserialize, Serialize};
use tracing::debug;

pub const NO_MATCHING_CASES: &str = "No matching cases found.";

/// A displayed case entry; the filter only reads `text` and flips `visible`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CaseItem {
    pub id: String,
    pub text: String,
    #[serde(default = "visible_by_default")]
    pub visible: bool,
}

fn visible_by_default() -> bool {
    true
}

impl CaseItem {
    pub fn new(id: impl Into<String>, text: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            text: text.into(),
            visible: true,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FilterOutcome {
    /// No list or an empty list; nothing changed.
    Skipped,
    Matched(usize),
    NoMatches,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CaseList {
    items: Vec<CaseItem>,
    /// `None` until the first filter run creates the advisory line; afterwards
    /// it is reused and only its text changes.
    advisory: Option<String>,
}

impl CaseList {
    pub fn new(items: Vec<CaseItem>) -> Self {
        Self {
            items,
            advisory: None,
        }
    }

    pub fn items(&self) -> &[CaseItem] {
        &self.items
    }

    pub fn advisory(&self) -> Option<&str> {
        self.advisory.as_deref()
    }

    pub fn visible_count(&self) -> usize {
        self.items.iter().filter(|item| item.visible).count()
    }

    /// Case-insensitive substring match over each item's text.
    pub fn filter(&mut self, query: &str) -> FilterOutcome {
        if self.items.is_empty() {
            debug!("case list is empty, nothing to filter");
            return FilterOutcome::Skipped;
        }

        let needle = query.to_lowercase();
        let mut matched = 0;
        for item in &mut self.items {
            item.visible = item.text.to_lowercase().contains(&needle);
            if item.visible {
                matched += 1;
            }
        }

        if matched == 0 {
            self.advisory = Some(NO_MATCHING_CASES.to_string());
            FilterOutcome::NoMatches
        } else {
            self.advisory = Some(String::new());
            FilterOutcome::Matched(matched)
        }
    }

    /// Swaps in a new result set, all visible.
    pub fn replace_items(&mut self, items: Vec<CaseItem>) {
        self.items = items
            .into_iter()
            .map(|item| CaseItem {
                visible: true,
                ..item
            })
            .collect();

        if self.items.is_empty() {
            self.advisory = Some(NO_MATCHING_CASES.to_string());
        } else if self.advisory.is_some() {
            self.advisory = Some(String::new());
        }
    }
}

/// Filters the displayed list, if there is one.
pub fn filter_cases(list: Option<&mut CaseList>, query: &str) -> FilterOutcome {
    match list {
        Some(list) => list.filter(query),
        None => {
            debug!("no case list on this page, nothing to filter");
            FilterOutcome::Skipped
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample() -> CaseList {
        CaseList::new(vec![
            CaseItem::new("1", "Robbery in Downtown"),
            CaseItem::new("2", "Fraud Investigation"),
            CaseItem::new("3", "Cybercrime Hacking"),
        ])
    }

    #[test]
    fn test_empty_query_shows_all_and_clears_advisory() {
        let mut list = sample();
        list.filter("xyz123");
        assert_eq!(list.filter(""), FilterOutcome::Matched(3));
        assert_eq!(list.visible_count(), 3);
        assert_eq!(list.advisory(), Some(""));
    }

    #[test]
    fn test_no_match_hides_all_and_sets_advisory() {
        let mut list = sample();
        assert_eq!(list.filter("xyz123"), FilterOutcome::NoMatches);
        assert_eq!(list.visible_count(), 0);
        assert_eq!(list.advisory(), Some(NO_MATCHING_CASES));
    }

    #[test]
    fn test_case_insensitive_substring() {
        let mut list = sample();
        assert_eq!(list.filter("FRAUD"), FilterOutcome::Matched(1));
        let visible: Vec<_> = list.items().iter().filter(|i| i.visible).map(|i| &i.id).collect();
        assert_eq!(visible, ["2"]);

        assert_eq!(list.filter("in"), FilterOutcome::Matched(3));
    }

    #[test]
    fn test_missing_or_empty_list_is_skipped() {
        assert_eq!(filter_cases(None, "fraud"), FilterOutcome::Skipped);

        let mut empty = CaseList::default();
        assert_eq!(filter_cases(Some(&mut empty), "fraud"), FilterOutcome::Skipped);
        assert_eq!(empty.advisory(), None);
    }

    #[test]
    fn test_advisory_absent_until_first_run() {
        let list = sample();
        assert_eq!(list.advisory(), None);
    }

    #[test]
    fn test_replace_items_resets_visibility() {
        let mut list = sample();
        list.filter("fraud");
        list.replace_items(vec![CaseItem {
            visible: false,
            ..CaseItem::new("9", "Arson Investigation")
        }]);
        assert_eq!(list.visible_count(), 1);
        assert_eq!(list.advisory(), Some(""));

        list.replace_items(Vec::new());
        assert_eq!(list.advisory(), Some(NO_MATCHING_CASES));
    }
}
