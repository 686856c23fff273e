//! `ReplyStream` — the uniform lazy fragment sequence.
//!
//! Wraps whichever provider-specific stream produced the fragments,
//! accumulates every fragment so the full reply is available once the
//! stream is exhausted, and guarantees the underlying scoped resource
//! (the provider's HTTP response body) is released however consumption
//! ends: natural completion, mid-stream error, or the caller dropping the
//! stream early. [`CloseProbe`] makes that release observable.

use std::pin::Pin;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::task::{Context, Poll};

use futures::stream::BoxStream;
use futures::{Stream, StreamExt};

use parley_core::ChatError;

/// Handle that outlives its [`ReplyStream`] and reports whether the
/// underlying streaming resource has been released.
#[derive(Clone, Debug)]
pub struct CloseProbe(Arc<AtomicBool>);

impl CloseProbe {
    pub fn is_closed(&self) -> bool {
        self.0.load(Ordering::SeqCst)
    }
}

/// Lazy sequence of text fragments from one completion call.
///
/// Implements [`Stream`]; each `Ok` item is one fragment, concatenating in
/// emission order to the full reply. After the stream yields `None` (or an
/// error), [`reply`](ReplyStream::reply) holds everything emitted so far.
pub struct ReplyStream {
    /// `None` once the underlying resource has been released.
    inner: Option<BoxStream<'static, Result<String, ChatError>>>,
    reply: String,
    closed: Arc<AtomicBool>,
}

impl ReplyStream {
    pub fn new<S>(inner: S) -> Self
    where
        S: Stream<Item = Result<String, ChatError>> + Send + 'static,
    {
        ReplyStream {
            inner: Some(inner.boxed()),
            reply: String::new(),
            closed: Arc::new(AtomicBool::new(false)),
        }
    }

    /// The concatenation of all fragments emitted so far. Equals the full
    /// generated reply once the stream is exhausted.
    pub fn reply(&self) -> &str {
        &self.reply
    }

    /// Probe for observing release of the underlying resource.
    pub fn close_probe(&self) -> CloseProbe {
        CloseProbe(Arc::clone(&self.closed))
    }

    /// Drain the stream and return the full reply, or the first error.
    pub async fn collect(mut self) -> Result<String, ChatError> {
        while let Some(fragment) = self.next().await {
            fragment?;
        }
        Ok(std::mem::take(&mut self.reply))
    }

    fn release(&mut self) {
        // Dropping the boxed stream drops the HTTP response body with it,
        // closing the provider connection.
        self.inner = None;
        self.closed.store(true, Ordering::SeqCst);
    }
}

impl Stream for ReplyStream {
    type Item = Result<String, ChatError>;

    fn poll_next(self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<Option<Self::Item>> {
        let this = self.get_mut();
        let inner = match this.inner.as_mut() {
            Some(inner) => inner,
            None => return Poll::Ready(None),
        };

        match inner.as_mut().poll_next(cx) {
            Poll::Ready(Some(Ok(fragment))) => {
                this.reply.push_str(&fragment);
                Poll::Ready(Some(Ok(fragment)))
            }
            Poll::Ready(Some(Err(e))) => {
                // Fragments already emitted stay valid in `reply`.
                this.release();
                Poll::Ready(Some(Err(e)))
            }
            Poll::Ready(None) => {
                this.release();
                Poll::Ready(None)
            }
            Poll::Pending => Poll::Pending,
        }
    }
}

impl Drop for ReplyStream {
    fn drop(&mut self) {
        self.release();
    }
}

impl std::fmt::Debug for ReplyStream {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ReplyStream")
            .field("accumulated", &self.reply.len())
            .field("closed", &self.closed.load(Ordering::SeqCst))
            .finish()
    }
}

// ─────────────────────────────────────────────
// Tests
// ─────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;
    use futures::stream;

    fn fragments(parts: &[&str]) -> ReplyStream {
        let items: Vec<Result<String, ChatError>> =
            parts.iter().map(|p| Ok(p.to_string())).collect();
        ReplyStream::new(stream::iter(items))
    }

    #[tokio::test]
    async fn test_fragments_concatenate_to_reply() {
        let mut stream = fragments(&["My ", "grandfather's ", "workshop."]);
        let mut seen = Vec::new();
        while let Some(fragment) = stream.next().await {
            seen.push(fragment.unwrap());
        }
        assert_eq!(seen.concat(), "My grandfather's workshop.");
        assert_eq!(stream.reply(), "My grandfather's workshop.");
    }

    #[tokio::test]
    async fn test_collect_matches_fragments() {
        let stream = fragments(&["a", "b", "c"]);
        assert_eq!(stream.collect().await.unwrap(), "abc");
    }

    #[tokio::test]
    async fn test_error_preserves_earlier_fragments() {
        let items: Vec<Result<String, ChatError>> = vec![
            Ok("one ".to_string()),
            Ok("two".to_string()),
            Err(ChatError::Stream("connection reset".into())),
        ];
        let mut stream = ReplyStream::new(stream::iter(items));

        assert_eq!(stream.next().await.unwrap().unwrap(), "one ");
        assert_eq!(stream.next().await.unwrap().unwrap(), "two");
        assert!(stream.next().await.unwrap().is_err());
        // Emitted fragments are not retracted.
        assert_eq!(stream.reply(), "one two");
        // Stream is terminal after the error.
        assert!(stream.next().await.is_none());
    }

    #[tokio::test]
    async fn test_probe_closed_on_exhaustion() {
        let mut stream = fragments(&["x"]);
        let probe = stream.close_probe();
        assert!(!probe.is_closed());
        while stream.next().await.is_some() {}
        assert!(probe.is_closed());
    }

    #[tokio::test]
    async fn test_probe_closed_on_early_drop() {
        let mut stream = fragments(&["one", "two", "three"]);
        let probe = stream.close_probe();

        // Consume a single fragment, then abandon the stream.
        let first = stream.next().await.unwrap().unwrap();
        assert_eq!(first, "one");
        assert!(!probe.is_closed());
        drop(stream);

        assert!(probe.is_closed());
    }
}
