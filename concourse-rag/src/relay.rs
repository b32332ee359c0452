//! SSE-to-byte-stream relay.
//!
//! [`SseRelay`] is the state machine at the heart of the pipeline: it decodes
//! server-sent-event frames from the completion response, extracts the
//! incremental text deltas, and re-emits them as bytes. It is a synchronous
//! pull-based machine so it can be driven by scripted chunks in tests;
//! [`relay_stream`] adapts it onto an async chunk stream.

use async_stream::try_stream;
use bytes::Bytes;
use futures::{Stream, StreamExt};
use serde::Deserialize;
use tracing::debug;

use crate::error::{ChatError, Result};
use crate::sse::SseParser;

/// The provider's explicit end-of-stream sentinel.
pub const DONE_SENTINEL: &str = "[DONE]";

/// Relay lifecycle state.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RelayState {
    /// Decoding deltas from the upstream frames.
    Streaming,
    /// Terminal: the end sentinel was observed.
    Done,
    /// Terminal: a parse error was surfaced.
    Failed,
}

impl Default for RelayState {
    fn default() -> Self {
        Self::Streaming
    }
}

/// One step of relay output.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RelayStep {
    /// A decoded text delta, ready to append to the output stream.
    Delta(Bytes),
    /// The stream ended on the provider's sentinel; no further bytes follow.
    End,
    /// More upstream input is required before another step can be produced.
    Pending,
}

// ── Completion chunk payload ───────────────────────────────────────

// Every field defaults so that control deltas without text decode to an
// empty delta instead of failing the stream.
#[derive(Debug, Default, Deserialize)]
struct CompletionChunk {
    #[serde(default)]
    choices: Vec<ChunkChoice>,
}

#[derive(Debug, Default, Deserialize)]
struct ChunkChoice {
    #[serde(default)]
    delta: ChunkDelta,
}

#[derive(Debug, Default, Deserialize)]
struct ChunkDelta {
    #[serde(default)]
    content: Option<String>,
}

/// The SSE-to-byte-stream relay state machine.
///
/// Feed raw network chunks with [`feed`](SseRelay::feed) and pull decoded
/// steps with [`next`](SseRelay::next). Frames are processed strictly in
/// arrival order with no reordering buffer, so output bytes are observed in
/// the order the provider emitted them. Once terminal, further input is
/// discarded: after the sentinel nothing is processed even if more bytes are
/// already buffered.
#[derive(Debug, Default)]
pub struct SseRelay {
    parser: SseParser,
    state: RelayState,
}

impl SseRelay {
    /// Create a relay in the initial `Streaming` state.
    pub fn new() -> Self {
        Self::default()
    }

    /// Return the current lifecycle state.
    pub fn state(&self) -> RelayState {
        self.state
    }

    /// Buffer a raw network chunk. Ignored once the relay is terminal.
    pub fn feed(&mut self, chunk: &[u8]) {
        if self.state == RelayState::Streaming {
            self.parser.push(chunk);
        }
    }

    /// Produce the next relay step.
    ///
    /// Returns [`RelayStep::Pending`] when the buffered input holds no
    /// further complete frame, and [`RelayStep::End`] once (and after) the
    /// sentinel has been observed.
    ///
    /// # Errors
    ///
    /// Returns [`ChatError::StreamParse`] on a malformed frame or a `data`
    /// payload that is not valid JSON; the relay transitions to `Failed` and
    /// stays there. Deltas already produced are not retracted.
    pub fn next(&mut self) -> Result<RelayStep> {
        match self.state {
            RelayState::Done => return Ok(RelayStep::End),
            RelayState::Failed => {
                return Err(ChatError::StreamParse("relay already failed".into()));
            }
            RelayState::Streaming => {}
        }

        loop {
            let payload = match self.parser.next_event() {
                Ok(Some(payload)) => payload,
                Ok(None) => return Ok(RelayStep::Pending),
                Err(e) => {
                    self.state = RelayState::Failed;
                    return Err(e);
                }
            };

            if payload == DONE_SENTINEL {
                debug!("completion stream finished");
                self.state = RelayState::Done;
                return Ok(RelayStep::End);
            }

            let chunk: CompletionChunk = match serde_json::from_str(&payload) {
                Ok(chunk) => chunk,
                Err(e) => {
                    self.state = RelayState::Failed;
                    return Err(ChatError::StreamParse(format!(
                        "malformed completion payload: {e}"
                    )));
                }
            };

            let text = chunk
                .choices
                .into_iter()
                .next()
                .and_then(|choice| choice.delta.content)
                .unwrap_or_default();

            if !text.is_empty() {
                return Ok(RelayStep::Delta(Bytes::from(text)));
            }
            // Control delta with no text: emit nothing, keep draining.
        }
    }
}

/// Adapt an async chunk stream through an [`SseRelay`].
///
/// One upstream chunk is pulled per consumer poll, so backpressure is
/// cooperative and nothing is read ahead of the consumer. Dropping the
/// returned stream stops pulling and releases the upstream connection; after
/// the sentinel the upstream is dropped without draining whatever the
/// provider may still send.
pub fn relay_stream<S>(upstream: S) -> impl Stream<Item = Result<Bytes>>
where
    S: Stream<Item = Result<Bytes>>,
{
    try_stream! {
        let mut relay = SseRelay::new();
        futures::pin_mut!(upstream);

        'upstream: while let Some(chunk) = upstream.next().await {
            relay.feed(&chunk?);
            loop {
                match relay.next()? {
                    RelayStep::Delta(bytes) => yield bytes,
                    RelayStep::End => break 'upstream,
                    RelayStep::Pending => break,
                }
            }
        }
    }
}
