//! Aggregation pipeline turning per-category candidate records into one ordered,
//! enriched outbound sequence.
//!
//! The pipeline is pull-based end to end: sources are gathered when the first poll
//! arrives, and enrichment batches are only scheduled while the consumer keeps
//! demanding records. Ordering is established once per request by a full sort over
//! the materialized candidate set; bounded-concurrency enrichment afterwards never
//! changes the externally observable order.

mod lifecycle;

pub use lifecycle::LifecycleStream;

use std::sync::Arc;

use futures::stream::{self, Stream, StreamExt, TryStreamExt};
use notify_config::shared::StreamConfig;
use tracing::{debug, info};

use crate::error::{StreamError, StreamResult};
use crate::source::{NotificationSource, SyntheticNotificationSource};
use crate::types::{NotificationRecord, title_prefix_for};

/// Builds per-request notification streams from a fixed set of sources.
#[derive(Clone)]
pub struct NotificationStreamBuilder {
    sources: Arc<[Arc<dyn NotificationSource>]>,
    config: StreamConfig,
}

impl NotificationStreamBuilder {
    /// Creates a builder over the given sources.
    pub fn new(sources: Vec<Arc<dyn NotificationSource>>, config: StreamConfig) -> Self {
        Self {
            sources: sources.into(),
            config,
        }
    }

    /// Creates a builder backed by the three built-in synthetic sources.
    pub fn with_synthetic_sources(config: StreamConfig) -> Self {
        let sources = SyntheticNotificationSource::all()
            .into_iter()
            .map(|source| Arc::new(source) as Arc<dyn NotificationSource>)
            .collect();

        Self::new(sources, config)
    }

    /// Builds the outbound record sequence for one request.
    ///
    /// Gathers all sources, drops read records, applies the optional case-insensitive
    /// category filter, sorts descending by creation time, truncates to `limit`, and
    /// enriches in bounded-concurrency batches whose output is reassembled in order.
    /// The first error aborts the remaining sequence.
    pub fn build_stream(
        &self,
        user_id: i64,
        limit: Option<usize>,
        filter: Option<String>,
    ) -> impl Stream<Item = StreamResult<NotificationRecord>> + Send + use<> {
        debug!(user_id, ?limit, ?filter, "building notification stream");

        let sources = Arc::clone(&self.sources);
        let config = self.config;

        let stream = stream::once(async move {
            let ordered = collect_ordered(&sources, user_id, limit, filter.as_deref()).await?;
            Ok::<_, StreamError>(enriched_stream(ordered, config))
        })
        .try_flatten();

        LifecycleStream::new(stream, user_id)
    }
}

/// Gathers, filters, orders, and truncates the candidate set.
///
/// Sources are listed concurrently with no ordering dependency between them. The
/// filtered set is fully materialized before sorting: independently produced
/// sub-sequences carry no global time order, so ordering requires a complete view.
/// Memory is therefore bounded by the result set size, not by a fixed constant.
async fn collect_ordered(
    sources: &[Arc<dyn NotificationSource>],
    user_id: i64,
    limit: Option<usize>,
    filter: Option<&str>,
) -> StreamResult<Vec<NotificationRecord>> {
    let listed = futures::future::try_join_all(
        sources
            .iter()
            .map(|source| source.list_candidates(user_id, limit)),
    )
    .await?;

    let mut records: Vec<NotificationRecord> = listed
        .into_iter()
        .flatten()
        .filter(|record| !record.read)
        .filter(|record| match filter {
            Some(filter) if !filter.is_empty() => record.kind.eq_ignore_ascii_case(filter),
            _ => true,
        })
        .collect();

    // Stable sort keeps ties in their merged order.
    records.sort_by(|a, b| b.created_at.cmp(&a.created_at));

    if let Some(limit) = limit {
        records.truncate(limit);
    }

    info!(user_id, count = records.len(), "aggregated notifications");

    Ok(records)
}

/// Streams the ordered records through batched, bounded-concurrency enrichment.
///
/// `buffered` runs up to `max_concurrent_batches` batch futures (and, inside each
/// batch, up to `max_concurrent_enrichments` record futures) while re-emitting
/// results strictly in input order, so concurrency controls when enrichment happens
/// but never the order of the emitted sequence.
fn enriched_stream(
    ordered: Vec<NotificationRecord>,
    config: StreamConfig,
) -> impl Stream<Item = StreamResult<NotificationRecord>> + Send {
    let batches = partition_batches(ordered, config.batch_max_size);
    let per_batch = config.max_concurrent_enrichments;

    stream::iter(batches)
        .map(move |batch| enrich_batch(batch, per_batch))
        .buffered(config.max_concurrent_batches)
        .map_ok(|batch| stream::iter(batch.into_iter().map(Ok)))
        .try_flatten()
}

/// Partitions the ordered sequence into batches of at most `batch_max_size`,
/// preserving intra-batch and inter-batch order.
fn partition_batches(
    mut records: Vec<NotificationRecord>,
    batch_max_size: usize,
) -> Vec<Vec<NotificationRecord>> {
    // Zero would never terminate below; validated configs guarantee non-zero.
    let batch_max_size = batch_max_size.max(1);
    let mut batches = Vec::with_capacity(records.len().div_ceil(batch_max_size));

    while records.len() > batch_max_size {
        let rest = records.split_off(batch_max_size);
        batches.push(std::mem::replace(&mut records, rest));
    }

    if !records.is_empty() {
        batches.push(records);
    }

    batches
}

/// Enriches one batch, failing the whole batch on the first record error.
async fn enrich_batch(
    batch: Vec<NotificationRecord>,
    max_concurrent: usize,
) -> StreamResult<Vec<NotificationRecord>> {
    stream::iter(batch)
        .map(|record| async move { enrich_record(record) })
        .buffered(max_concurrent)
        .try_collect()
        .await
}

/// Enriches a single record: collapses the creation time to noon for display and
/// prepends the category prefix when it is not already present.
///
/// Prefixing is idempotent; unrecognized kinds map to the empty prefix and pass
/// through unchanged.
pub fn enrich_record(mut record: NotificationRecord) -> StreamResult<NotificationRecord> {
    let normalized = record
        .created_at
        .date()
        .and_hms_opt(12, 0, 0)
        .ok_or_else(|| StreamError::Enrichment {
            id: record.id,
            reason: "creation date does not admit a noon timestamp".to_owned(),
        })?;
    record.created_at = normalized;

    let prefix = title_prefix_for(&record.kind);
    if !prefix.is_empty() && !record.title.starts_with(prefix) {
        record.title = format!("{prefix}{}", record.title);
    }

    Ok(record)
}
