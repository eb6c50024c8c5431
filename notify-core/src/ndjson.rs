//! Newline-delimited JSON framing for streamed notification responses.
//!
//! Each line is one independently decodable record, so a consumer can begin
//! processing before the full sequence completes.

use std::marker::PhantomData;
use std::pin::Pin;
use std::task::{Context, Poll};

use bytes::{Bytes, BytesMut};
use futures::stream::Stream;
use futures::{StreamExt, ready};
use pin_project_lite::pin_project;
use serde::Serialize;
use serde::de::DeserializeOwned;

/// Content type of a newline-delimited JSON stream.
pub const NDJSON_CONTENT_TYPE: &str = "application/x-ndjson";

/// Encodes a record stream as newline-terminated JSON lines.
///
/// Errors pass through untouched; a serialization failure surfaces as the stream's
/// own error type and terminates the framed body.
pub fn encode<T, E, S>(stream: S) -> impl Stream<Item = Result<Bytes, E>>
where
    S: Stream<Item = Result<T, E>>,
    T: Serialize,
    E: From<serde_json::Error>,
{
    stream.map(|item| {
        item.and_then(|record| {
            let mut line = serde_json::to_vec(&record).map_err(E::from)?;
            line.push(b'\n');

            Ok(Bytes::from(line))
        })
    })
}

pin_project! {
    /// Incrementally decodes records from a newline-delimited byte-chunk stream.
    ///
    /// Chunk boundaries carry no meaning: lines split across chunks are buffered
    /// until their terminator arrives, multiple lines in one chunk are emitted one
    /// poll at a time, and a trailing unterminated line is flushed at end of input.
    /// Blank lines and `\r\n` terminators are tolerated. The first error, whether
    /// a transport failure or a malformed line, ends the sequence.
    #[must_use = "streams do nothing unless polled"]
    #[derive(Debug)]
    pub struct NdjsonDecoder<T, S> {
        #[pin]
        stream: S,
        buffer: BytesMut,
        inner_done: bool,
        errored: bool,
        _record: PhantomData<T>,
    }
}

impl<T, S> NdjsonDecoder<T, S> {
    /// Wraps a byte-chunk stream.
    pub fn wrap(stream: S) -> Self {
        Self {
            stream,
            buffer: BytesMut::new(),
            inner_done: false,
            errored: false,
            _record: PhantomData,
        }
    }
}

/// Strips the line terminator and returns [`None`] for blank lines.
fn trim_line(line: &[u8]) -> Option<&[u8]> {
    let line = line.strip_suffix(b"\n").unwrap_or(line);
    let line = line.strip_suffix(b"\r").unwrap_or(line);

    (!line.is_empty()).then_some(line)
}

impl<T, S, E> Stream for NdjsonDecoder<T, S>
where
    S: Stream<Item = Result<Bytes, E>>,
    T: DeserializeOwned,
    E: From<serde_json::Error>,
{
    type Item = Result<T, E>;

    fn poll_next(self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<Option<Self::Item>> {
        let mut this = self.project();

        if *this.errored {
            return Poll::Ready(None);
        }

        loop {
            // Drain complete lines before pulling more bytes.
            if let Some(pos) = this.buffer.iter().position(|&byte| byte == b'\n') {
                let line = this.buffer.split_to(pos + 1);

                match trim_line(&line) {
                    Some(line) => {
                        let item = serde_json::from_slice(line).map_err(E::from);
                        *this.errored = item.is_err();

                        return Poll::Ready(Some(item));
                    }
                    None => continue,
                }
            }

            if *this.inner_done {
                if this.buffer.is_empty() {
                    return Poll::Ready(None);
                }

                // Flush the trailing unterminated line.
                let line = this.buffer.split();
                return match trim_line(&line) {
                    Some(line) => {
                        let item = serde_json::from_slice(line).map_err(E::from);
                        *this.errored = item.is_err();

                        Poll::Ready(Some(item))
                    }
                    None => Poll::Ready(None),
                };
            }

            match ready!(this.stream.as_mut().poll_next(cx)) {
                Some(Ok(chunk)) => this.buffer.extend_from_slice(&chunk),
                Some(Err(err)) => {
                    *this.errored = true;

                    return Poll::Ready(Some(Err(err)));
                }
                None => *this.inner_done = true,
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::StreamError;
    use futures::stream;
    use serde::Deserialize;

    #[derive(Debug, PartialEq, Serialize, Deserialize)]
    struct Item {
        id: i64,
    }

    fn chunks(parts: &[&str]) -> impl Stream<Item = Result<Bytes, StreamError>> {
        let parts: Vec<_> = parts
            .iter()
            .map(|part| Ok(Bytes::copy_from_slice(part.as_bytes())))
            .collect();

        stream::iter(parts)
    }

    #[tokio::test]
    async fn decodes_lines_split_across_chunks() {
        let decoder =
            NdjsonDecoder::<Item, _>::wrap(chunks(&["{\"id\"", ":1}\n{\"id\":2}\n"]));
        let items: Vec<_> = decoder.map(Result::unwrap).collect().await;

        assert_eq!(items, vec![Item { id: 1 }, Item { id: 2 }]);
    }

    #[tokio::test]
    async fn decodes_multiple_lines_from_one_chunk() {
        let decoder =
            NdjsonDecoder::<Item, _>::wrap(chunks(&["{\"id\":1}\r\n\n{\"id\":2}\n"]));
        let items: Vec<_> = decoder.map(Result::unwrap).collect().await;

        assert_eq!(items, vec![Item { id: 1 }, Item { id: 2 }]);
    }

    #[tokio::test]
    async fn flushes_trailing_unterminated_line() {
        let decoder = NdjsonDecoder::<Item, _>::wrap(chunks(&["{\"id\":1}\n{\"id\":2}"]));
        let items: Vec<_> = decoder.map(Result::unwrap).collect().await;

        assert_eq!(items, vec![Item { id: 1 }, Item { id: 2 }]);
    }

    #[tokio::test]
    async fn propagates_transport_errors_in_place() {
        let inner = stream::iter(vec![
            Ok(Bytes::from_static(b"{\"id\":1}\n")),
            Err(StreamError::Enrichment {
                id: 9,
                reason: "broken".to_owned(),
            }),
        ]);

        let mut decoder = NdjsonDecoder::<Item, _>::wrap(inner);

        assert_eq!(decoder.next().await.unwrap().unwrap(), Item { id: 1 });
        assert!(decoder.next().await.unwrap().is_err());
        assert!(decoder.next().await.is_none(), "error must end the sequence");
    }

    #[tokio::test]
    async fn malformed_line_ends_the_sequence() {
        let mut decoder =
            NdjsonDecoder::<Item, _>::wrap(chunks(&["{\"id\":1}\nnot-json\n{\"id\":2}\n"]));

        assert_eq!(decoder.next().await.unwrap().unwrap(), Item { id: 1 });
        assert!(decoder.next().await.unwrap().is_err());
        assert!(
            decoder.next().await.is_none(),
            "records after a malformed line must not be emitted"
        );
    }

    #[tokio::test]
    async fn encode_terminates_every_record_with_a_newline() {
        let records = stream::iter(vec![
            Ok::<_, StreamError>(Item { id: 1 }),
            Ok(Item { id: 2 }),
        ]);

        let lines: Vec<_> = encode(records).map(Result::unwrap).collect().await;

        assert_eq!(lines.len(), 2);
        for line in &lines {
            assert_eq!(line.last(), Some(&b'\n'));
        }
    }
}
