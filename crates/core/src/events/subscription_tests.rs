// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use super::*;
use yare::parameterized;

#[parameterized(
    exact = { "spool:transfer", "spool:transfer", true },
    exact_other_name = { "spool:transfer", "spool:error", false },
    exact_other_namespace = { "spool:transfer", "segment:transfer", false },
    one_segment = { "spool:*", "spool:open", true },
    one_segment_not_two = { "spool:*", "spool:segment:moved", false },
    one_segment_not_zero = { "spool:*", "spool", false },
    one_segment_wrong_namespace = { "spool:*", "other:open", false },
    rest_many = { "spool:**", "spool:segment:moved", true },
    rest_one = { "spool:**", "spool:error", true },
    rest_none = { "spool:**", "spool", true },
    rest_wrong_namespace = { "spool:**", "other:error", false },
    bare_star = { "*", "spool:close", true },
    bare_double_star = { "**", "anything:at:all", true },
    leading_star = { "*:close", "spool:close", true },
    empty = { "", "spool:open", false },
)]
fn pattern_matching(pattern: &str, event: &str, expected: bool) {
    assert_eq!(EventPattern::new(pattern).matches(event), expected);
}

#[test]
fn pattern_displays_its_source() {
    let pattern = EventPattern::new("spool:*");
    assert_eq!(pattern.to_string(), "spool:*");
    assert_eq!(pattern.as_str(), "spool:*");
}

#[test]
fn subscription_matches_any_pattern() {
    let sub = Subscription::new("test-sub", ["spool:open", "spool:error"]);

    assert!(sub.matches("spool:open"));
    assert!(sub.matches("spool:error"));
    assert!(!sub.matches("spool:transfer"));
    assert_eq!(sub.id(), &SubscriberId::from("test-sub"));
    assert_eq!(sub.patterns().len(), 2);
}

#[test]
fn subscription_without_patterns_matches_nothing() {
    let sub = Subscription::new("silent", []);

    assert!(!sub.matches("spool:open"));
}

#[test]
fn subscription_all_covers_every_spool_event() {
    let sub = Subscription::all("everything");
    for name in ["spool:open", "spool:transfer", "spool:error", "spool:close"] {
        assert!(sub.matches(name), "{} should match", name);
    }
}
