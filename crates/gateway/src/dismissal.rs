//! Per-user record of dismissed suggestions.

use serde_json::Value;
use std::sync::Arc;

use marketplace_core::{
    traits::UserMetaStore,
    types::{DismissOutcome, StoredDismissals, UserId, DISMISSED_META_KEY},
    Result,
};
use marketplace_governance::TextSanitizer;

/// Appends dismissed suggestion slugs to a user's list.
///
/// The read-modify-write is not atomic; two concurrent dismissals for the
/// same user can lose one of the slugs.
pub struct DismissalRecorder {
    store: Arc<dyn UserMetaStore>,
    sanitizer: TextSanitizer,
}

impl DismissalRecorder {
    pub fn new(store: Arc<dyn UserMetaStore>) -> Self {
        Self {
            store,
            sanitizer: TextSanitizer::new(),
        }
    }

    /// Slugs the user has dismissed, oldest first.
    pub async fn dismissed_suggestions(&self, user_id: &UserId) -> Result<Vec<String>> {
        let raw = self.store.get(user_id, DISMISSED_META_KEY).await?;
        let stored = StoredDismissals::from_stored(raw);
        if stored == StoredDismissals::Malformed {
            tracing::warn!(user_id = %user_id, "Stored dismissal list is malformed, reading as empty");
        }
        Ok(stored.into_list())
    }

    /// Record that `user_id` dismissed `slug`.
    pub async fn dismiss(&self, user_id: &UserId, slug: &str) -> Result<DismissOutcome> {
        let slug = self.sanitizer.sanitize(slug);
        if slug.is_empty() {
            tracing::debug!(user_id = %user_id, "Ignoring dismissal with empty slug");
            return Ok(DismissOutcome::Rejected);
        }

        let mut dismissed = self.dismissed_suggestions(user_id).await?;
        if dismissed.contains(&slug) {
            return Ok(DismissOutcome::AlreadyDismissed);
        }

        dismissed.push(slug);
        let value = Value::from(dismissed);
        self.store.set(user_id, DISMISSED_META_KEY, &value).await?;

        tracing::info!(user_id = %user_id, "Recorded dismissed suggestion");
        Ok(DismissOutcome::Recorded)
    }
}
