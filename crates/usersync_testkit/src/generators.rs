//! Property-based test generators using proptest.
//!
//! Provides strategies for generating user records that keep the store's
//! invariants (unique ids).

use proptest::prelude::*;
use std::num::NonZeroUsize;
use usersync_protocol::{Timestamp, UserId, UserRecord};

/// Strategy for generating names from a small alphabet, so searches hit.
pub fn name_strategy() -> impl Strategy<Value = String> {
    prop::string::string_regex("[A-Ca-c][a-c]{0,4}").expect("Invalid regex")
}

/// Strategy for generating search text: up to three short tokens with
/// arbitrary whitespace around them.
pub fn search_strategy() -> impl Strategy<Value = String> {
    prop::collection::vec(prop::string::string_regex("[a-cA-C]{1,2}").expect("Invalid regex"), 0..3)
        .prop_map(|tokens| format!(" {} ", tokens.join("  ")))
}

/// Strategy for generating one record with the given id.
pub fn user_with_id(id: u64) -> impl Strategy<Value = UserRecord> {
    (name_strategy(), name_strategy(), 0i64..50).prop_map(move |(first, last, created)| {
        UserRecord::new(
            UserId::new(id),
            format!("user{id}@example.com"),
            first,
            last,
            "",
            Timestamp::from_millis(created),
        )
    })
}

/// Strategy for generating up to `max` records with distinct ids, in
/// random id order.
pub fn users_strategy(max: usize) -> impl Strategy<Value = Vec<UserRecord>> {
    prop::collection::btree_set(1u64..10_000, 0..=max)
        .prop_flat_map(|ids| {
            ids.into_iter()
                .map(user_with_id)
                .collect::<Vec<_>>()
        })
        .prop_shuffle()
}

/// Strategy for generating page sizes.
pub fn page_size_strategy() -> impl Strategy<Value = NonZeroUsize> {
    (1usize..10).prop_map(|size| NonZeroUsize::new(size).expect("size is positive"))
}
