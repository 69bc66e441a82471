// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Event name patterns and subscriptions
//!
//! Event names are colon-separated (`spool:transfer`). A pattern is split
//! the same way once, at construction: `*` stands for exactly one segment
//! and `**` for every remaining segment, including none.

use std::fmt;

#[derive(Clone, Debug, PartialEq, Eq)]
enum Segment {
    Literal(String),
    One,
    Rest,
}

/// Compiled event name pattern
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct EventPattern {
    source: String,
    segments: Vec<Segment>,
}

impl EventPattern {
    pub fn new(pattern: &str) -> Self {
        let segments = if pattern.is_empty() {
            Vec::new()
        } else {
            pattern
                .split(':')
                .map(|part| match part {
                    "*" if pattern == "*" => Segment::Rest,
                    "*" => Segment::One,
                    "**" => Segment::Rest,
                    literal => Segment::Literal(literal.to_string()),
                })
                .collect()
        };
        Self {
            source: pattern.to_string(),
            segments,
        }
    }

    /// Whether `event_name` matches; the empty pattern matches nothing
    pub fn matches(&self, event_name: &str) -> bool {
        if self.segments.is_empty() {
            return false;
        }

        let mut parts = event_name.split(':');
        for segment in &self.segments {
            match segment {
                Segment::Rest => return true,
                Segment::One => {
                    if parts.next().is_none() {
                        return false;
                    }
                }
                Segment::Literal(literal) => {
                    if parts.next() != Some(literal.as_str()) {
                        return false;
                    }
                }
            }
        }
        parts.next().is_none()
    }

    pub fn as_str(&self) -> &str {
        &self.source
    }
}

impl fmt::Display for EventPattern {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.source)
    }
}

/// Identifies a subscriber for unsubscribing
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub struct SubscriberId(String);

impl SubscriberId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl From<&str> for SubscriberId {
    fn from(id: &str) -> Self {
        Self::new(id)
    }
}

/// A named set of patterns; an event is delivered if any pattern matches
#[derive(Clone, Debug)]
pub struct Subscription {
    id: SubscriberId,
    patterns: Vec<EventPattern>,
}

impl Subscription {
    pub fn new<'a>(id: impl Into<String>, patterns: impl IntoIterator<Item = &'a str>) -> Self {
        Self {
            id: SubscriberId::new(id),
            patterns: patterns.into_iter().map(EventPattern::new).collect(),
        }
    }

    /// Subscription to every spool event
    pub fn all(id: impl Into<String>) -> Self {
        Self::new(id, ["spool:*"])
    }

    pub fn id(&self) -> &SubscriberId {
        &self.id
    }

    pub fn patterns(&self) -> &[EventPattern] {
        &self.patterns
    }

    pub fn matches(&self, event_name: &str) -> bool {
        self.patterns.iter().any(|p| p.matches(event_name))
    }
}

#[cfg(test)]
#[path = "subscription_tests.rs"]
mod tests;
