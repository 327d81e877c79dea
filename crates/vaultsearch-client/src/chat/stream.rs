//! Streaming answer consumer.
//!
//! Turns the arbitrarily-chunked byte stream of a chat response into text
//! deltas that are safe to display immediately. Chunk boundaries can fall
//! inside a multi-byte code point, so the decoder state must persist across
//! reads; decoding each chunk in isolation would corrupt the output.

use encoding_rs::{Decoder, UTF_8};
use futures::StreamExt;

use crate::transport::{ByteStream, TransportResult};

/// Pull-based consumer of one chat answer body.
///
/// Not restartable: a new chat request always gets a new consumer. After
/// the underlying stream ends or fails, every further pull returns `None`.
pub struct AnswerStream {
    inner: ByteStream,
    decoder: Decoder,
    finished: bool,
}

impl AnswerStream {
    /// Wrap a transport byte stream.
    pub fn new(inner: ByteStream) -> Self {
        Self {
            inner,
            decoder: UTF_8.new_decoder(),
            finished: false,
        }
    }

    /// Pull the next decoded text delta, in arrival order.
    ///
    /// Yields `Some(Err(_))` exactly once if the transport fails mid-stream,
    /// then `None` forever. A clean end of stream flushes the decoder (an
    /// incomplete trailing sequence becomes a replacement character) before
    /// yielding `None`.
    pub async fn next_delta(&mut self) -> Option<TransportResult<String>> {
        if self.finished {
            return None;
        }

        loop {
            match self.inner.next().await {
                Some(Ok(chunk)) => {
                    let delta = self.decode(&chunk, false);
                    // A chunk ending inside a multi-byte sequence can decode
                    // to nothing; its bytes surface with the next chunk.
                    if !delta.is_empty() {
                        return Some(Ok(delta));
                    }
                }
                Some(Err(err)) => {
                    self.finished = true;
                    return Some(Err(err));
                }
                None => {
                    self.finished = true;
                    let tail = self.decode(&[], true);
                    if !tail.is_empty() {
                        return Some(Ok(tail));
                    }
                    return None;
                }
            }
        }
    }

    fn decode(&mut self, bytes: &[u8], last: bool) -> String {
        let capacity = self
            .decoder
            .max_utf8_buffer_length(bytes.len())
            .unwrap_or(bytes.len() * 3 + 4);
        let mut decoded = String::with_capacity(capacity);
        let _ = self.decoder.decode_to_string(bytes, &mut decoded, last);
        decoded
    }
}
