//! Query view behaviour over realistic and generated user sets.

use proptest::prelude::*;
use std::num::NonZeroUsize;
use usersync_engine::{Projection, QueryView, SortKey, ViewQuery, DEFAULT_PAGE_SIZE};
use usersync_protocol::UserRecord;
use usersync_testkit::{
    local_user, page_size_strategy, reqres_users, search_strategy, users_strategy,
};

fn ids(users: &[UserRecord]) -> Vec<u64> {
    users.iter().map(|u| u.id.get()).collect()
}

fn all_pages(
    records: &[UserRecord],
    search: &str,
    sort: SortKey,
    size: NonZeroUsize,
) -> Vec<Projection> {
    let first = QueryView::apply(records, search, sort, 1, size);
    (1..=first.total_pages)
        .map(|page| QueryView::apply(records, search, sort, page, size))
        .collect()
}

#[test]
fn tokens_must_all_match() {
    let records = vec![
        local_user(1, "Ann", "Lee", 0),
        local_user(2, "Anna", "Smith", 0),
        local_user(3, "Bob", "Lee", 0),
    ];
    let view = QueryView::apply(&records, "an le", SortKey::Id, 1, DEFAULT_PAGE_SIZE);
    assert_eq!(ids(&view.items), vec![1]);
}

#[test]
fn date_added_descending_id_ascending() {
    let records = vec![
        local_user(2, "B", "B", 10),
        local_user(1, "A", "A", 30),
        local_user(3, "C", "C", 20),
    ];
    let size = NonZeroUsize::new(10).unwrap();

    let by_date = QueryView::apply(&records, "", SortKey::DateAdded, 1, size);
    assert_eq!(ids(&by_date.items), vec![1, 3, 2]);

    let by_id = QueryView::apply(&records, "", SortKey::Id, 1, size);
    assert_eq!(ids(&by_id.items), vec![1, 2, 3]);
}

#[test]
fn eleven_records_in_pages_of_five() {
    let records: Vec<_> = (1..=11).map(|id| local_user(id, "U", "V", 0)).collect();
    let size = NonZeroUsize::new(5).unwrap();

    let page3 = QueryView::apply(&records, "", SortKey::Id, 3, size);
    assert_eq!(page3.total_pages, 3);
    assert_eq!(page3.items.len(), 1);
    assert!(QueryView::apply(&records, "", SortKey::Id, 4, size).items.is_empty());
}

#[test]
fn empty_set_is_one_empty_page() {
    let view = QueryView::apply_query(&[], &ViewQuery::default());
    assert_eq!(view.total_pages, 1);
    assert!(view.items.is_empty());
}

#[test]
fn reqres_directory_screens() {
    let users = reqres_users();

    let georges = QueryView::apply_query(&users, &ViewQuery::new().with_search("george"));
    assert_eq!(ids(&georges.items), vec![1, 11]);

    let by_name = QueryView::apply_query(&users, &ViewQuery::new().with_sort(SortKey::Name));
    assert_eq!(by_name.total_pages, 2);
    let first_names: Vec<&str> = by_name.items.iter().map(|u| u.first_name.as_str()).collect();
    assert_eq!(
        first_names,
        vec!["Byron", "Charles", "Emma", "Eve", "George", "George"]
    );
    assert_eq!(ids(&by_name.items[4..]), vec![1, 11]);
}

#[test]
fn projection_serializes_for_json_output() {
    let view = QueryView::apply_query(&reqres_users(), &ViewQuery::new().with_page(2));
    let json = serde_json::to_value(&view).unwrap();
    assert_eq!(json["page"], 2);
    assert_eq!(json["total_pages"], 2);
    assert_eq!(json["items"][0]["id"], 7);
    assert_eq!(json["items"][0]["created_at"], 0);
}

proptest! {
    #[test]
    fn filter_returns_only_matches(users in users_strategy(40), search in search_strategy()) {
        let matches = QueryView::filter(&users, &search);
        let tokens: Vec<String> = search.split_whitespace().map(str::to_lowercase).collect();

        for user in &matches {
            let name = user.full_name().to_lowercase();
            prop_assert!(tokens.iter().all(|t| name.contains(t.as_str())));
        }
        let expected = users.iter().filter(|u| {
            let name = u.full_name().to_lowercase();
            tokens.iter().all(|t| name.contains(t.as_str()))
        }).count();
        prop_assert_eq!(expected, matches.len());
    }

    #[test]
    fn pages_partition_the_matches(
        users in users_strategy(40),
        search in search_strategy(),
        size in page_size_strategy(),
        sort in prop::sample::select(SortKey::ALL.to_vec()),
    ) {
        let mut expected = QueryView::filter(&users, &search);
        QueryView::sort(&mut expected, sort);

        let pages = all_pages(&users, &search, sort, size);
        let joined: Vec<UserRecord> = pages.iter().flat_map(|p| p.items.clone()).collect();
        prop_assert_eq!(&joined, &expected);

        for page in &pages {
            prop_assert!(page.items.len() <= size.get());
            prop_assert_eq!(page.total_matches, expected.len());
        }
        let beyond = QueryView::apply(&users, &search, sort, pages.len() + 1, size);
        prop_assert!(beyond.items.is_empty());
    }

    #[test]
    fn sorts_are_ordered_and_stable(users in users_strategy(40)) {
        let mut by_name = users.clone();
        QueryView::sort(&mut by_name, SortKey::Name);
        for pair in by_name.windows(2) {
            let (a, b) = (pair[0].first_name.to_lowercase(), pair[1].first_name.to_lowercase());
            prop_assert!(a <= b);
            if a == b {
                let pos = |id| users.iter().position(|u| u.id == id);
                prop_assert!(pos(pair[0].id) < pos(pair[1].id));
            }
        }

        let mut by_date = users.clone();
        QueryView::sort(&mut by_date, SortKey::DateAdded);
        for pair in by_date.windows(2) {
            prop_assert!(pair[0].created_at >= pair[1].created_at);
        }
    }
}
