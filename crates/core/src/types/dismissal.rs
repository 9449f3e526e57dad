//! Dismissed-suggestion types.

use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::fmt;

/// User meta key holding the list of dismissed suggestion slugs.
pub const DISMISSED_META_KEY: &str = "wc_marketplace_suggestions_dismissed_suggestions";

/// Nonce action guarding the dismissal endpoint.
pub const DISMISS_NONCE_ACTION: &str = "add_dismissed_marketplace_suggestion";

/// Identity of the user a request acts on behalf of.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct UserId(pub String);

impl UserId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for UserId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<&str> for UserId {
    fn from(s: &str) -> Self {
        Self(s.to_string())
    }
}

/// What was found under a user's dismissal meta key.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StoredDismissals {
    /// A list; only its string elements are kept as slugs.
    Valid(Vec<String>),
    /// Nothing stored yet.
    Missing,
    /// Something is stored but it is not a list.
    Malformed,
}

impl StoredDismissals {
    /// Classify a raw stored value.
    pub fn from_stored(value: Option<Value>) -> Self {
        match value {
            None | Some(Value::Null) => Self::Missing,
            Some(Value::Array(items)) => Self::Valid(
                items
                    .into_iter()
                    .filter_map(|item| match item {
                        Value::String(s) => Some(s),
                        _ => None,
                    })
                    .collect(),
            ),
            Some(_) => Self::Malformed,
        }
    }

    /// Collapse to a usable list; missing and malformed values read as empty.
    pub fn into_list(self) -> Vec<String> {
        match self {
            Self::Valid(list) => list,
            Self::Missing | Self::Malformed => Vec::new(),
        }
    }
}

/// Result of a dismissal request.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DismissOutcome {
    /// The slug was appended and the list persisted.
    Recorded,
    /// The slug was already in the list; nothing was written.
    AlreadyDismissed,
    /// The slug was empty after sanitization; nothing was read or written.
    Rejected,
}

impl DismissOutcome {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Recorded => "recorded",
            Self::AlreadyDismissed => "already_dismissed",
            Self::Rejected => "rejected",
        }
    }
}
