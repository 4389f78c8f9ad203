//! Page-transition planning.
//!
//! Works out how many pages the record listing has and which
//! `__EVENTTARGET` value makes the server render each of them.

use std::collections::BTreeSet;
use std::ops::RangeInclusive;
use std::sync::LazyLock;

use regex::Regex;
use scraper::{Html, Selector};

use crate::models::{Diagnostic, SiteConfig};

static TRAILING_DIGITS: LazyLock<Option<Regex>> = LazyLock::new(|| Regex::new(r"(\d+)$").ok());

/// Total page count plus the event-target naming scheme.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PagePlan {
    total_pages: u32,
    event_target_prefix: String,
}

impl PagePlan {
    pub fn new(total_pages: u32, event_target_prefix: impl Into<String>) -> Self {
        Self {
            total_pages: total_pages.max(1),
            event_target_prefix: event_target_prefix.into(),
        }
    }

    pub fn total_pages(&self) -> u32 {
        self.total_pages
    }

    /// Event target for `page`: the prefix immediately followed by the number.
    pub fn target_for(&self, page: u32) -> String {
        format!("{}{}", self.event_target_prefix, page)
    }

    /// Pages reached by postback, in visiting order.
    pub fn postback_pages(&self) -> RangeInclusive<u32> {
        2..=self.total_pages
    }
}

/// Reads the pager controls off the first page.
#[derive(Debug, Clone)]
pub struct PageTransitionPlanner {
    pager_id_prefix: String,
    event_target_prefix: String,
}

impl PageTransitionPlanner {
    pub fn new(pager_id_prefix: impl Into<String>, event_target_prefix: impl Into<String>) -> Self {
        Self {
            pager_id_prefix: pager_id_prefix.into(),
            event_target_prefix: event_target_prefix.into(),
        }
    }

    pub fn from_site(site: &SiteConfig) -> Self {
        Self::new(&site.pager_id_prefix, &site.event_target_prefix)
    }

    /// Plan the traversal.
    ///
    /// An explicit page count wins and the markup is not inspected. Without
    /// one, the highest page number among the pager controls is the total;
    /// no controls means a single page plus a `PagerNotFound` diagnostic.
    pub fn plan(
        &self,
        document: &Html,
        explicit_max_pages: Option<u32>,
    ) -> (PagePlan, Option<Diagnostic>) {
        if let Some(max_pages) = explicit_max_pages {
            return (PagePlan::new(max_pages, &self.event_target_prefix), None);
        }

        match self.pager_numbers(document).last() {
            Some(&highest) => (PagePlan::new(highest, &self.event_target_prefix), None),
            None => (
                PagePlan::new(1, &self.event_target_prefix),
                Some(Diagnostic::PagerNotFound),
            ),
        }
    }

    /// Distinct positive page numbers encoded in pager control ids.
    pub fn pager_numbers(&self, document: &Html) -> BTreeSet<u32> {
        let Ok(with_id) = Selector::parse("[id]") else {
            return BTreeSet::new();
        };

        document
            .select(&with_id)
            .filter_map(|el| el.value().id())
            .filter_map(|id| id.strip_prefix(self.pager_id_prefix.as_str()))
            .map(numeric_suffix)
            .filter(|&n| n > 0)
            .collect()
    }
}

/// Trailing number of a control id; 0 when there is none.
fn numeric_suffix(rest: &str) -> u32 {
    TRAILING_DIGITS
        .as_ref()
        .and_then(|re| re.captures(rest))
        .and_then(|caps| caps.get(1))
        .and_then(|m| m.as_str().parse().ok())
        .unwrap_or(0)
}

#[cfg(test)]
mod tests {
    use super::*;

    const PAGER: &str = "cphContents_ucPager_btnNo";
    const TARGET: &str = "ctl00$cphContents$ucPager$btnNo";

    fn planner() -> PageTransitionPlanner {
        PageTransitionPlanner::new(PAGER, TARGET)
    }

    fn pager_doc(numbers: &[&str]) -> Html {
        let links: String = numbers
            .iter()
            .map(|n| format!(r#"<a id="{PAGER}{n}" href="javascript:__doPostBack()">{n}</a>"#))
            .collect();
        Html::parse_document(&format!(
            r#"<html><body><div class="paging">{links}</div></body></html>"#
        ))
    }

    #[test]
    fn test_total_is_highest_pager_number() {
        let (plan, diagnostic) = planner().plan(&pager_doc(&["3", "7", "12"]), None);
        assert_eq!(plan.total_pages(), 12);
        assert_eq!(diagnostic, None);
    }

    #[test]
    fn test_explicit_max_pages_is_authoritative() {
        let (plan, diagnostic) = planner().plan(&pager_doc(&["1", "2", "9"]), Some(4));
        assert_eq!(plan.total_pages(), 4);
        assert_eq!(diagnostic, None);
    }

    #[test]
    fn test_explicit_zero_clamps_to_single_page() {
        let (plan, _) = planner().plan(&pager_doc(&[]), Some(0));
        assert_eq!(plan.total_pages(), 1);
        assert!(plan.postback_pages().is_empty());
    }

    #[test]
    fn test_no_pager_is_single_page_with_diagnostic() {
        let (plan, diagnostic) = planner().plan(&pager_doc(&[]), None);
        assert_eq!(plan.total_pages(), 1);
        assert_eq!(diagnostic, Some(Diagnostic::PagerNotFound));
    }

    #[test]
    fn test_ids_without_digits_are_ignored() {
        let numbers = planner().pager_numbers(&pager_doc(&["", "Next", "0", "2"]));
        assert_eq!(numbers.into_iter().collect::<Vec<_>>(), vec![2]);
    }

    #[test]
    fn test_only_matching_prefix_counts() {
        let html = Html::parse_document(&format!(
            r#"<div><a id="{PAGER}3">3</a><a id="otherPager_btnNo40">40</a></div>"#
        ));
        assert_eq!(planner().plan(&html, None).0.total_pages(), 3);
    }

    #[test]
    fn test_target_for_concatenates_exactly() {
        let plan = PagePlan::new(5, "P");
        assert_eq!(plan.target_for(5), "P5");

        let plan = PagePlan::new(12, TARGET);
        assert_eq!(plan.target_for(10), "ctl00$cphContents$ucPager$btnNo10");
    }

    #[test]
    fn test_postback_pages_in_order() {
        let plan = PagePlan::new(4, TARGET);
        assert_eq!(plan.postback_pages().collect::<Vec<_>>(), vec![2, 3, 4]);
    }
}
