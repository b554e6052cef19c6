//! Filtered, sorted and paginated views over the local user set.
//!
//! [`QueryView::apply`] is a pure function: the same records and parameters
//! always produce the same [`Projection`].

use serde::{Deserialize, Serialize};
use std::cmp::Reverse;
use std::fmt;
use std::num::NonZeroUsize;
use std::str::FromStr;
use thiserror::Error;
use usersync_protocol::UserRecord;

/// Default number of users per page.
pub const DEFAULT_PAGE_SIZE: NonZeroUsize = match NonZeroUsize::new(6) {
    Some(size) => size,
    None => unreachable!(),
};

/// Ordering applied to matching records.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum SortKey {
    /// First name, ascending, ignoring case.
    Name,
    /// Identity, ascending.
    #[default]
    Id,
    /// Local discovery time, newest first.
    DateAdded,
}

impl SortKey {
    /// Every sort key, in menu order.
    pub const ALL: [SortKey; 3] = [SortKey::Name, SortKey::Id, SortKey::DateAdded];

    /// Returns the key's textual form.
    pub fn as_str(&self) -> &'static str {
        match self {
            SortKey::Name => "name",
            SortKey::Id => "id",
            SortKey::DateAdded => "date-added",
        }
    }
}

impl fmt::Display for SortKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Error returned for an unknown sort key name.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
#[error("unknown sort key '{0}' (expected name, id or date-added)")]
pub struct ParseSortKeyError(String);

impl FromStr for SortKey {
    type Err = ParseSortKeyError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "name" => Ok(SortKey::Name),
            "id" => Ok(SortKey::Id),
            "date-added" | "date_added" | "date" => Ok(SortKey::DateAdded),
            _ => Err(ParseSortKeyError(s.to_string())),
        }
    }
}

/// One page of a filtered, sorted view.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Projection {
    /// Records on the requested page.
    pub items: Vec<UserRecord>,
    /// Requested page number (1-based).
    pub page: usize,
    /// Page size used.
    pub page_size: usize,
    /// Number of pages; at least 1, even when nothing matches.
    pub total_pages: usize,
    /// Number of records that passed the filter.
    pub total_matches: usize,
}

impl Projection {
    /// Returns true if a previous page exists.
    pub fn has_previous(&self) -> bool {
        self.page > 1
    }

    /// Returns true if a following page exists.
    pub fn has_next(&self) -> bool {
        self.page < self.total_pages
    }
}

/// Parameters for one view request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ViewQuery {
    /// Whitespace-separated name tokens; blank matches everything.
    pub search: String,
    /// Ordering.
    pub sort: SortKey,
    /// Page number, starting at 1.
    pub page: usize,
    /// Records per page.
    pub page_size: NonZeroUsize,
}

impl ViewQuery {
    /// Creates the default query: everything, by id, first page of six.
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets the search text.
    pub fn with_search(mut self, search: impl Into<String>) -> Self {
        self.search = search.into();
        self
    }

    /// Sets the sort key.
    pub fn with_sort(mut self, sort: SortKey) -> Self {
        self.sort = sort;
        self
    }

    /// Sets the page number.
    pub fn with_page(mut self, page: usize) -> Self {
        self.page = page;
        self
    }

    /// Sets the page size.
    pub fn with_page_size(mut self, page_size: NonZeroUsize) -> Self {
        self.page_size = page_size;
        self
    }
}

impl Default for ViewQuery {
    fn default() -> Self {
        Self {
            search: String::new(),
            sort: SortKey::Id,
            page: 1,
            page_size: DEFAULT_PAGE_SIZE,
        }
    }
}

/// Filter, sort and paginate operations over user records.
#[derive(Debug, Clone, Copy, Default)]
pub struct QueryView;

impl QueryView {
    /// Computes one page of the view.
    ///
    /// Records match when their lowercased full name contains every
    /// whitespace-separated token of `search`. Matches are sorted stably
    /// by `sort` and sliced into pages of `page_size`. A page outside
    /// `1..=total_pages` yields no items.
    pub fn apply(
        records: &[UserRecord],
        search: &str,
        sort: SortKey,
        page: usize,
        page_size: NonZeroUsize,
    ) -> Projection {
        let mut matches = Self::filter(records, search);
        Self::sort(&mut matches, sort);

        let total_matches = matches.len();
        let size = page_size.get();
        let total_pages = total_matches.div_ceil(size).max(1);

        let start = page
            .checked_sub(1)
            .and_then(|index| index.checked_mul(size))
            .filter(|start| *start < total_matches);
        let items = match start {
            Some(start) => {
                let end = start.saturating_add(size).min(total_matches);
                matches.drain(start..end).collect()
            }
            None => Vec::new(),
        };

        Projection {
            items,
            page,
            page_size: size,
            total_pages,
            total_matches,
        }
    }

    /// Computes the view described by `query`.
    pub fn apply_query(records: &[UserRecord], query: &ViewQuery) -> Projection {
        Self::apply(
            records,
            &query.search,
            query.sort,
            query.page,
            query.page_size,
        )
    }

    /// Returns the records whose full name contains every search token,
    /// in input order.
    pub fn filter(records: &[UserRecord], search: &str) -> Vec<UserRecord> {
        let tokens: Vec<String> = search.split_whitespace().map(str::to_lowercase).collect();
        if tokens.is_empty() {
            return records.to_vec();
        }

        records
            .iter()
            .filter(|record| {
                let name = record.full_name().to_lowercase();
                tokens.iter().all(|token| name.contains(token.as_str()))
            })
            .cloned()
            .collect()
    }

    /// Sorts records in place. Equal keys keep their relative order.
    pub fn sort(records: &mut [UserRecord], key: SortKey) {
        match key {
            SortKey::Name => records.sort_by_cached_key(|record| record.first_name.to_lowercase()),
            SortKey::Id => records.sort_by_key(|record| record.id),
            SortKey::DateAdded => records.sort_by_key(|record| Reverse(record.created_at)),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use usersync_protocol::{Timestamp, UserId};

    fn user(id: u64, first: &str, last: &str, created: i64) -> UserRecord {
        UserRecord::new(
            UserId::new(id),
            format!("{}@example.com", first.to_lowercase()),
            first,
            last,
            "",
            Timestamp::from_millis(created),
        )
    }

    fn ids(records: &[UserRecord]) -> Vec<u64> {
        records.iter().map(|record| record.id.get()).collect()
    }

    fn size(n: usize) -> NonZeroUsize {
        NonZeroUsize::new(n).unwrap()
    }

    #[test]
    fn filter_requires_every_token() {
        let records = vec![
            user(1, "Ann", "Lee", 0),
            user(2, "Anna", "Smith", 0),
            user(3, "Bob", "Lee", 0),
        ];

        let view = QueryView::apply(&records, "an le", SortKey::Id, 1, size(10));
        assert_eq!(ids(&view.items), vec![1]);
        assert_eq!(view.total_matches, 1);
    }

    #[test]
    fn filter_is_case_insensitive_and_spans_names() {
        let records = vec![user(1, "George", "Bluth", 0), user(2, "Janet", "Weaver", 0)];

        assert_eq!(ids(&QueryView::filter(&records, "GEORGE")), vec![1]);
        assert_eq!(ids(&QueryView::filter(&records, "ge bl")), vec![1]);
        assert_eq!(ids(&QueryView::filter(&records, "e b")), vec![1]);
        assert!(QueryView::filter(&records, "zed").is_empty());
    }

    #[test]
    fn blank_search_matches_everything() {
        let records = vec![user(1, "A", "B", 0), user(2, "C", "D", 0)];
        assert_eq!(QueryView::filter(&records, "").len(), 2);
        assert_eq!(QueryView::filter(&records, "  \t ").len(), 2);
    }

    #[test]
    fn sort_by_name_ignores_case_and_is_stable() {
        let mut records = vec![
            user(1, "bob", "One", 0),
            user(2, "Alice", "Two", 0),
            user(3, "Bob", "Three", 0),
            user(4, "alice", "Four", 0),
        ];
        QueryView::sort(&mut records, SortKey::Name);
        assert_eq!(ids(&records), vec![2, 4, 1, 3]);
    }

    #[test]
    fn sort_by_id_ascending() {
        let mut records = vec![user(3, "C", "", 0), user(1, "A", "", 0), user(2, "B", "", 0)];
        QueryView::sort(&mut records, SortKey::Id);
        assert_eq!(ids(&records), vec![1, 2, 3]);
    }

    #[test]
    fn sort_by_date_added_newest_first() {
        let mut records = vec![
            user(1, "A", "", 100),
            user(2, "B", "", 300),
            user(3, "C", "", 200),
            user(4, "D", "", 300),
        ];
        QueryView::sort(&mut records, SortKey::DateAdded);
        assert_eq!(ids(&records), vec![2, 4, 3, 1]);
    }

    #[test]
    fn pagination_boundaries() {
        let records: Vec<_> = (1..=11).map(|id| user(id, "U", "", 0)).collect();

        let page3 = QueryView::apply(&records, "", SortKey::Id, 3, size(5));
        assert_eq!(page3.total_pages, 3);
        assert_eq!(ids(&page3.items), vec![11]);
        assert!(page3.has_previous());
        assert!(!page3.has_next());

        let page4 = QueryView::apply(&records, "", SortKey::Id, 4, size(5));
        assert!(page4.items.is_empty());
        assert_eq!(page4.total_pages, 3);

        let page0 = QueryView::apply(&records, "", SortKey::Id, 0, size(5));
        assert!(page0.items.is_empty());

        let far = QueryView::apply(&records, "", SortKey::Id, usize::MAX, size(5));
        assert!(far.items.is_empty());
    }

    #[test]
    fn empty_set_has_one_page() {
        let view = QueryView::apply(&[], "", SortKey::Name, 1, DEFAULT_PAGE_SIZE);
        assert_eq!(view.total_pages, 1);
        assert_eq!(view.total_matches, 0);
        assert!(view.items.is_empty());
        assert!(!view.has_next());
    }

    #[test]
    fn view_query_defaults() {
        let query = ViewQuery::default();
        assert_eq!(query.search, "");
        assert_eq!(query.sort, SortKey::Id);
        assert_eq!(query.page, 1);
        assert_eq!(query.page_size.get(), 6);
    }

    #[test]
    fn apply_query_matches_apply() {
        let records: Vec<_> = (1..=8).map(|id| user(id, "Same", "", id as i64)).collect();
        let query = ViewQuery::new()
            .with_sort(SortKey::DateAdded)
            .with_page(2)
            .with_page_size(size(3));

        let view = QueryView::apply_query(&records, &query);
        assert_eq!(ids(&view.items), vec![5, 4, 3]);
        assert_eq!(view.total_pages, 3);
    }

    #[test]
    fn sort_key_parsing() {
        assert_eq!("name".parse::<SortKey>().unwrap(), SortKey::Name);
        assert_eq!("ID".parse::<SortKey>().unwrap(), SortKey::Id);
        assert_eq!("date-added".parse::<SortKey>().unwrap(), SortKey::DateAdded);
        assert!("age".parse::<SortKey>().is_err());

        for key in SortKey::ALL {
            assert_eq!(key.to_string().parse::<SortKey>().unwrap(), key);
        }
    }
}
