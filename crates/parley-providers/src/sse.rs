//! Server-sent-events decoding shared by both provider clients.
//!
//! Both wire formats arrive as `data: {json}` lines over a chunked HTTP
//! body, with chunk boundaries falling anywhere — including mid-line. The
//! decoder buffers bytes and yields complete `data:` payloads; the
//! provider-specific meaning of each payload is supplied as a closure to
//! [`fragment_stream`].

use std::collections::VecDeque;

use futures::{Stream, StreamExt};
use tracing::debug;

use parley_core::ChatError;

/// Incremental SSE line decoder.
///
/// Feed raw body bytes, get back the complete `data:` payloads framed so
/// far. Blank lines, comments (`:` prefix) and field lines other than
/// `data:` (e.g. Anthropic's `event:`) are skipped — event types are
/// carried inside the JSON payloads themselves.
#[derive(Debug, Default)]
pub struct SseDecoder {
    /// Raw bytes, so a multi-byte character split across network chunks
    /// is only decoded once its line is complete.
    buffer: Vec<u8>,
}

impl SseDecoder {
    pub fn new() -> Self {
        SseDecoder::default()
    }

    pub fn feed(&mut self, bytes: &[u8]) -> Vec<String> {
        self.buffer.extend_from_slice(bytes);

        let mut payloads = Vec::new();
        while let Some(pos) = self.buffer.iter().position(|&b| b == b'\n') {
            let line_bytes: Vec<u8> = self.buffer.drain(..=pos).collect();
            let line = String::from_utf8_lossy(&line_bytes);
            let line = line.trim();
            if line.is_empty() || line.starts_with(':') {
                continue;
            }
            if let Some(data) = line.strip_prefix("data:") {
                payloads.push(data.trim_start().to_string());
            }
        }
        payloads
    }
}

/// Outcome of decoding one `data:` payload.
pub(crate) enum Decoded {
    /// Emit this text as a fragment.
    Text(String),
    /// Payload carries no text (role preamble, ping, usage chunk) — skip.
    Skip,
    /// Normal end of stream.
    Done,
    /// Remote-side error event; the stream fails here.
    Fail(String),
}

struct StreamState<B, F> {
    body: B,
    decoder: SseDecoder,
    decode: F,
    pending: VecDeque<Result<String, ChatError>>,
    done: bool,
}

/// Turn a streaming HTTP response into a fragment stream, one `decode`
/// call per `data:` payload. Fragments come out in wire order; the stream
/// terminates on [`Decoded::Done`], body exhaustion, or the first error.
pub(crate) fn fragment_stream<F>(
    response: reqwest::Response,
    decode: F,
) -> impl Stream<Item = Result<String, ChatError>> + Send + 'static
where
    F: FnMut(&str) -> Decoded + Send + 'static,
{
    let state = StreamState {
        body: response.bytes_stream().boxed(),
        decoder: SseDecoder::new(),
        decode,
        pending: VecDeque::new(),
        done: false,
    };

    futures::stream::unfold(state, |mut st| async move {
        loop {
            if let Some(item) = st.pending.pop_front() {
                if item.is_err() {
                    st.done = true;
                }
                return Some((item, st));
            }
            if st.done {
                return None;
            }

            match st.body.next().await {
                Some(Ok(chunk)) => {
                    for payload in st.decoder.feed(&chunk) {
                        match (st.decode)(&payload) {
                            Decoded::Text(text) => st.pending.push_back(Ok(text)),
                            Decoded::Skip => {}
                            Decoded::Done => {
                                st.done = true;
                                break;
                            }
                            Decoded::Fail(message) => {
                                st.pending.push_back(Err(ChatError::Stream(message)));
                                st.done = true;
                                break;
                            }
                        }
                    }
                }
                Some(Err(e)) => {
                    debug!("stream body read failed: {e}");
                    st.done = true;
                    return Some((Err(ChatError::Stream(e.to_string())), st));
                }
                None => {
                    st.done = true;
                    return None;
                }
            }
        }
    })
}

// ─────────────────────────────────────────────
// Tests
// ─────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_complete_lines() {
        let mut decoder = SseDecoder::new();
        let payloads = decoder.feed(b"data: {\"a\":1}\n\ndata: [DONE]\n");
        assert_eq!(payloads, vec!["{\"a\":1}", "[DONE]"]);
    }

    #[test]
    fn test_split_across_chunks() {
        let mut decoder = SseDecoder::new();
        assert!(decoder.feed(b"data: {\"text\":\"hel").is_empty());
        let payloads = decoder.feed(b"lo\"}\n");
        assert_eq!(payloads, vec!["{\"text\":\"hello\"}"]);
    }

    #[test]
    fn test_skips_comments_and_event_lines() {
        let mut decoder = SseDecoder::new();
        let payloads =
            decoder.feed(b": keepalive\nevent: content_block_delta\ndata: {\"x\":1}\n");
        assert_eq!(payloads, vec!["{\"x\":1}"]);
    }

    #[test]
    fn test_no_space_after_colon() {
        let mut decoder = SseDecoder::new();
        let payloads = decoder.feed(b"data:{\"x\":1}\n");
        assert_eq!(payloads, vec!["{\"x\":1}"]);
    }

    #[test]
    fn test_multibyte_char_split_across_chunks() {
        let mut decoder = SseDecoder::new();
        let line = "data: {\"text\":\"héllo\"}\n".as_bytes();
        // Split inside the two-byte 'é'.
        let split = line.iter().position(|&b| b == 0xc3).unwrap() + 1;
        assert!(decoder.feed(&line[..split]).is_empty());
        let payloads = decoder.feed(&line[split..]);
        assert_eq!(payloads, vec!["{\"text\":\"héllo\"}"]);
    }
}
