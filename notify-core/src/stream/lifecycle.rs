use std::fmt;
use std::pin::Pin;
use std::task::{Context, Poll};

use futures::Stream;
use tracing::{error, info};

/// Stream wrapper emitting lifecycle signals for one notification stream.
///
/// Logs completion when the inner stream ends and cancellation when the wrapper is
/// dropped before reaching the end. Cancellation is an intentional early
/// termination, never reported as a failure; an item-level error is logged once,
/// ends the sequence, and marks the stream finished so the drop path stays quiet
/// and the inner stream is never polled again.
#[must_use = "streams do nothing unless polled"]
pub struct LifecycleStream<S> {
    inner: Pin<Box<S>>,
    user_id: i64,
    finished: bool,
}

impl<S: Stream> LifecycleStream<S> {
    /// Wraps `inner`, logging the stream start.
    pub fn new(inner: S, user_id: i64) -> Self {
        info!(user_id, "notification stream started");

        Self {
            inner: Box::pin(inner),
            user_id,
            finished: false,
        }
    }
}

impl<S, T, E> Stream for LifecycleStream<S>
where
    S: Stream<Item = Result<T, E>>,
    E: fmt::Display,
{
    type Item = Result<T, E>;

    fn poll_next(self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<Option<Self::Item>> {
        let this = self.get_mut();

        if this.finished {
            return Poll::Ready(None);
        }

        match this.inner.as_mut().poll_next(cx) {
            Poll::Ready(None) => {
                if !this.finished {
                    this.finished = true;
                    info!(user_id = this.user_id, "notification stream completed");
                }

                Poll::Ready(None)
            }
            Poll::Ready(Some(Err(err))) => {
                this.finished = true;
                error!(user_id = this.user_id, error = %err, "notification stream aborted");

                Poll::Ready(Some(Err(err)))
            }
            other => other,
        }
    }
}

impl<S> Drop for LifecycleStream<S> {
    fn drop(&mut self) {
        if !self.finished {
            info!(
                user_id = self.user_id,
                "notification stream cancelled before completion"
            );
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use futures::{StreamExt, stream};

    #[tokio::test]
    async fn error_ends_the_sequence() {
        let inner = stream::iter(vec![Ok::<_, String>(1), Err("broken".to_owned()), Ok(2)]);
        let mut stream = LifecycleStream::new(inner, 42);

        assert_eq!(stream.next().await, Some(Ok(1)));
        assert_eq!(stream.next().await, Some(Err("broken".to_owned())));
        assert!(
            stream.next().await.is_none(),
            "items after an error must not be emitted"
        );
    }

    #[tokio::test]
    async fn clean_completion_yields_every_item() {
        let inner = stream::iter(vec![Ok::<_, String>(1), Ok(2)]);
        let items: Vec<_> = LifecycleStream::new(inner, 42).collect().await;

        assert_eq!(items, vec![Ok(1), Ok(2)]);
    }
}
