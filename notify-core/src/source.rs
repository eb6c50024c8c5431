//! Notification sources feeding the aggregation pipeline.
//!
//! The pipeline only depends on the [`NotificationSource`] trait, so a persistence
//! backed implementation can be substituted without touching the aggregator. The
//! built-in [`SyntheticNotificationSource`] generates deterministic per-category
//! records the way the demo services do.

use async_trait::async_trait;
use chrono::{Duration, Utc};

use crate::error::StreamResult;
use crate::types::{NotificationCategory, NotificationRecord};

/// Upper bound on the number of records a single source produces per request,
/// regardless of a larger requested limit. The cross-category limit is enforced
/// later by the aggregator.
pub const MAX_PER_SOURCE: usize = 3;

/// A provider of candidate notification records for one user.
#[async_trait]
pub trait NotificationSource: Send + Sync {
    /// Name of the source, used in error reports and logs.
    fn name(&self) -> &str;

    /// Lists candidate records for `user_id`.
    ///
    /// `limit` is a hint; sources may produce fewer records but never need to
    /// produce more. Returned records are unfiltered and unordered with respect to
    /// other sources.
    async fn list_candidates(
        &self,
        user_id: i64,
        limit: Option<usize>,
    ) -> StreamResult<Vec<NotificationRecord>>;
}

/// Synthesizes unread records for one category, timestamped so that interleaving
/// categories produces a meaningful chronological order once merged.
///
/// Pure and total: no side effects, no failure modes.
#[derive(Debug, Clone, Copy)]
pub struct SyntheticNotificationSource {
    category: NotificationCategory,
}

impl SyntheticNotificationSource {
    /// Creates a synthetic source for the given category.
    pub fn new(category: NotificationCategory) -> Self {
        Self { category }
    }

    /// One synthetic source per built-in category.
    pub fn all() -> Vec<SyntheticNotificationSource> {
        NotificationCategory::ALL
            .into_iter()
            .map(SyntheticNotificationSource::new)
            .collect()
    }
}

#[async_trait]
impl NotificationSource for SyntheticNotificationSource {
    fn name(&self) -> &str {
        self.category.as_str()
    }

    async fn list_candidates(
        &self,
        user_id: i64,
        limit: Option<usize>,
    ) -> StreamResult<Vec<NotificationRecord>> {
        let size = limit.map_or(MAX_PER_SOURCE, |limit| limit.min(MAX_PER_SOURCE));
        let now = Utc::now().naive_utc();
        let category = self.category;

        let records = (0..size)
            .map(|index| NotificationRecord {
                id: category.id_base() + index as i64,
                user_id,
                kind: category.as_str().to_owned(),
                title: format!("{} Notification {}", category.display_name(), index + 1),
                message: format!("{} message {}", category.display_name(), index + 1),
                source: category.as_str().to_owned(),
                read: false,
                created_at: now - Duration::hours(index as i64 + category.hour_offset()),
                read_at: None,
            })
            .collect();

        Ok(records)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn caps_record_count_regardless_of_larger_limit() {
        let source = SyntheticNotificationSource::new(NotificationCategory::System);

        let records = source.list_candidates(42, Some(50)).await.unwrap();
        assert_eq!(records.len(), MAX_PER_SOURCE);

        let records = source.list_candidates(42, None).await.unwrap();
        assert_eq!(records.len(), MAX_PER_SOURCE);

        let records = source.list_candidates(42, Some(1)).await.unwrap();
        assert_eq!(records.len(), 1);
    }

    #[tokio::test]
    async fn records_are_unread_and_chronologically_decreasing() {
        let source = SyntheticNotificationSource::new(NotificationCategory::Social);
        let records = source.list_candidates(7, None).await.unwrap();

        for record in &records {
            assert!(!record.read);
            assert!(record.read_at.is_none());
            assert_eq!(record.user_id, 7);
            assert_eq!(record.kind, "SOCIAL");
            assert_eq!(record.source, "SOCIAL");
        }

        for pair in records.windows(2) {
            assert!(pair[0].created_at > pair[1].created_at);
        }
    }

    #[tokio::test]
    async fn categories_produce_distinct_id_ranges() {
        let mut ids = Vec::new();
        for source in SyntheticNotificationSource::all() {
            for record in source.list_candidates(1, None).await.unwrap() {
                ids.push(record.id);
            }
        }

        let before = ids.len();
        ids.sort_unstable();
        ids.dedup();
        assert_eq!(ids.len(), before);
    }
}
