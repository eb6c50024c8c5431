use std::sync::Arc;

use async_trait::async_trait;
use chrono::Timelike;
use futures::{StreamExt, TryStreamExt};
use notify_config::shared::StreamConfig;
use notify_core::error::{StreamError, StreamResult};
use notify_core::source::{MAX_PER_SOURCE, NotificationSource};
use notify_core::stream::NotificationStreamBuilder;
use notify_core::types::NotificationRecord;

fn builder() -> NotificationStreamBuilder {
    NotificationStreamBuilder::with_synthetic_sources(StreamConfig::default())
}

async fn collect(
    builder: &NotificationStreamBuilder,
    user_id: i64,
    limit: Option<usize>,
    filter: Option<&str>,
) -> Vec<NotificationRecord> {
    builder
        .build_stream(user_id, limit, filter.map(str::to_owned))
        .try_collect()
        .await
        .expect("stream should complete")
}

#[tokio::test]
async fn emits_only_unread_records_newest_first() {
    let records = collect(&builder(), 42, None, None).await;

    assert!(!records.is_empty());
    for record in &records {
        assert!(!record.read);
        assert_eq!(record.user_id, 42);
    }

    for pair in records.windows(2) {
        assert!(
            pair[0].created_at >= pair[1].created_at,
            "sequence must be sorted descending by createdAt"
        );
    }
}

#[tokio::test]
async fn respects_the_requested_limit() {
    let records = collect(&builder(), 42, Some(5), None).await;

    assert_eq!(records.len(), 5);
    for pair in records.windows(2) {
        assert!(pair[0].created_at >= pair[1].created_at);
    }
}

#[tokio::test]
async fn filters_by_category_case_insensitively() {
    let records = collect(&builder(), 42, None, Some("system")).await;

    assert!(!records.is_empty());
    assert!(records.len() <= MAX_PER_SOURCE);
    for record in &records {
        assert_eq!(record.kind, "SYSTEM");
    }
}

#[tokio::test]
async fn empty_filter_passes_all_categories() {
    let unfiltered = collect(&builder(), 42, None, None).await;
    let blank = collect(&builder(), 42, None, Some("")).await;

    assert_eq!(unfiltered.len(), blank.len());
}

#[tokio::test]
async fn titles_carry_exactly_one_category_prefix() {
    let records = collect(&builder(), 42, None, None).await;

    for record in &records {
        let prefix = format!("[{}] ", record.kind);
        assert!(
            record.title.starts_with(&prefix),
            "title `{}` should start with `{prefix}`",
            record.title
        );
        assert!(
            !record.title[prefix.len()..].starts_with(&prefix),
            "prefix must never be doubled in `{}`",
            record.title
        );
    }
}

#[tokio::test]
async fn enrichment_collapses_time_of_day_to_noon() {
    let records = collect(&builder(), 42, None, None).await;

    for record in &records {
        assert_eq!(record.created_at.hour(), 12);
        assert_eq!(record.created_at.minute(), 0);
        assert_eq!(record.created_at.second(), 0);
    }
}

#[tokio::test]
async fn small_batches_still_reassemble_global_order() {
    let config = StreamConfig {
        batch_max_size: 2,
        max_concurrent_batches: 4,
        max_concurrent_enrichments: 4,
    };
    let builder = NotificationStreamBuilder::with_synthetic_sources(config);

    let records = collect(&builder, 42, None, None).await;

    assert_eq!(records.len(), 3 * MAX_PER_SOURCE);
    for pair in records.windows(2) {
        assert!(
            pair[0].created_at >= pair[1].created_at,
            "batched enrichment must not reorder the sequence"
        );
    }
}

struct FailingSource;

#[async_trait]
impl NotificationSource for FailingSource {
    fn name(&self) -> &str {
        "failing"
    }

    async fn list_candidates(
        &self,
        _user_id: i64,
        _limit: Option<usize>,
    ) -> StreamResult<Vec<NotificationRecord>> {
        Err(StreamError::Source {
            source_name: "failing".to_owned(),
            reason: "backing store unavailable".to_owned(),
        })
    }
}

#[tokio::test]
async fn source_failure_aborts_the_sequence() {
    let builder = NotificationStreamBuilder::new(
        vec![Arc::new(FailingSource) as Arc<dyn NotificationSource>],
        StreamConfig::default(),
    );

    let mut stream = Box::pin(builder.build_stream(42, None, None));

    let first = stream.next().await.expect("stream should yield an error");
    assert!(matches!(first, Err(StreamError::Source { .. })));
    assert!(stream.next().await.is_none(), "error must end the sequence");
}
