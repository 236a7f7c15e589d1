use std::future::Future;
use std::mem;
use std::pin::Pin;
use std::sync::Arc;
use std::task::{Context, Poll, ready};

use bytes::Bytes;
use doc_store::{ChunkRecord, FileQuery, FileRecord, FindFileOptions, StoreClient, StoreError};
use futures::Stream;
use futures::future::BoxFuture;
use tracing::{debug, info, warn};

use crate::cursor::ChunkCursorAdapter;
use crate::error::{FileReadError, Result};
use crate::range::ChunkBounds;
use crate::resolve::{Resolved, resolve_metadata};
use crate::validate::ChunkSequenceValidator;

/// Requested byte window, adjustable until the first demand signal.
#[derive(Debug, Clone, Copy, Default)]
struct WindowConfig {
    start: Option<u64>,
    end: Option<u64>,
}

type PullOutcome = (ChunkCursorAdapter, std::result::Result<Option<ChunkRecord>, StoreError>);
type CloseResult = std::result::Result<(), StoreError>;

/// Whether a chunk fetch is in flight. The adapter lives either here or
/// inside the pull future, which hands it back on completion; there is never
/// more than one fetch outstanding.
enum PullPhase {
    Idle(ChunkCursorAdapter),
    InFlight(BoxFuture<'static, PullOutcome>),
}

impl PullPhase {
    /// Placeholder installed for the instant between taking the adapter out
    /// and installing the real pull future. Never polled.
    fn vacant() -> Self {
        PullPhase::InFlight(Box::pin(std::future::pending()))
    }
}

struct Flowing {
    bounds: ChunkBounds,
    validator: ChunkSequenceValidator,
    phase: PullPhase,
}

/// What the resolution step produced: either an empty file (complete
/// immediately) or everything needed to start streaming chunks.
enum ResolveOutcome {
    Empty(FileRecord),
    Flowing {
        file: FileRecord,
        bounds: ChunkBounds,
        adapter: ChunkCursorAdapter,
    },
}

/// Lifecycle of the stream, held as one tagged value rather than a set of
/// flags. `Closed`, `Errored` and `Aborted` are terminal: no chunk fetch or
/// data event happens after entering any of them.
enum StreamState {
    /// No demand yet; the window may still be configured.
    Created,
    /// Metadata lookup (and cursor open) in flight after the first demand.
    Resolving(BoxFuture<'static, Result<ResolveOutcome>>),
    Streaming(Flowing),
    /// End of the chunk sequence reached; cursor release in flight. The
    /// terminal `None` is emitted once the release completes.
    Draining(BoxFuture<'static, CloseResult>),
    /// A data-path error has already been delivered; best-effort cursor
    /// release in flight before going terminal.
    FailingClose(BoxFuture<'static, CloseResult>),
    Closed,
    Errored,
    Aborted,
}

/// A pull-based byte stream over one stored file.
///
/// Obtained from a [`FileReader`](crate::FileReader). Each `poll_next` is a
/// demand signal: the first triggers the one-time metadata lookup, and every
/// later one drives at most one chunk fetch, so there is never more than one
/// store round trip in flight. Items are the file's bytes in order, already
/// windowed to the configured range; the terminal `None` is emitted only
/// after the chunk cursor has been released.
///
/// Dropping the stream mid-read drops the cursor without its close round
/// trip; call [`abort`](Self::abort) for an orderly release.
pub struct FileReadStream {
    client: Arc<dyn StoreClient>,
    query: FileQuery,
    find_options: FindFileOptions,
    window: WindowConfig,
    file: Option<FileRecord>,
    bytes_out: u64,
    state: StreamState,
}

impl FileReadStream {
    pub(crate) fn new(client: Arc<dyn StoreClient>, query: FileQuery, find_options: FindFileOptions) -> Self {
        Self {
            client,
            query,
            find_options,
            window: WindowConfig::default(),
            file: None,
            bytes_out: 0,
            state: StreamState::Created,
        }
    }

    /// Set the window's inclusive start offset. Valid only before the first
    /// demand signal; afterwards fails with
    /// [`ConfigurationAfterFlowing`](FileReadError::ConfigurationAfterFlowing)
    /// and leaves the stream untouched. The offset itself is validated
    /// against the file's length at resolution time.
    pub fn set_start(&mut self, start: u64) -> Result<&mut Self> {
        self.ensure_not_flowing()?;
        self.window.start = Some(start);
        Ok(self)
    }

    /// Set the window's exclusive end offset. Same rules as
    /// [`set_start`](Self::set_start).
    pub fn set_end(&mut self, end: u64) -> Result<&mut Self> {
        self.ensure_not_flowing()?;
        self.window.end = Some(end);
        Ok(self)
    }

    /// The resolved metadata record, available once resolution has completed
    /// (including for empty files).
    pub fn metadata(&self) -> Option<&FileRecord> {
        self.file.as_ref()
    }

    /// Cancel the read. Production stops immediately; if a chunk fetch is in
    /// flight its result is discarded rather than delivered, and an open
    /// cursor is released before this returns. Idempotent, and synchronous
    /// when no cursor was ever opened.
    pub async fn abort(&mut self) -> Result<()> {
        if matches!(
            self.state,
            StreamState::Closed | StreamState::Errored | StreamState::Aborted
        ) {
            return Ok(());
        }

        info!(query = %self.query, bytes_out = self.bytes_out, "aborting read stream");

        match mem::replace(&mut self.state, StreamState::Aborted) {
            StreamState::Created | StreamState::Resolving(_) => {
                // No cursor is open; dropping an in-flight resolution
                // cancels it. Nothing to release.
                Ok(())
            }
            StreamState::Streaming(flowing) => {
                let mut adapter = match flowing.phase {
                    PullPhase::Idle(adapter) => adapter,
                    PullPhase::InFlight(fut) => {
                        let (adapter, _discarded) = fut.await;
                        adapter
                    }
                };
                adapter.close().await.map_err(FileReadError::Cursor)
            }
            StreamState::Draining(fut) | StreamState::FailingClose(fut) => {
                fut.await.map_err(FileReadError::Cursor)
            }
            StreamState::Closed | StreamState::Errored | StreamState::Aborted => unreachable!(),
        }
    }

    fn ensure_not_flowing(&self) -> Result<()> {
        match self.state {
            StreamState::Created => Ok(()),
            _ => Err(FileReadError::ConfigurationAfterFlowing),
        }
    }

    /// Build the resolution future for the first demand signal: one metadata
    /// lookup, then bounds computation, then the cursor open. Later demand
    /// signals arriving while this is in flight poll the same future, so
    /// only one resolution is ever started.
    fn begin_resolve(&self) -> BoxFuture<'static, Result<ResolveOutcome>> {
        let client = self.client.clone();
        let query = self.query.clone();
        let options = self.find_options;
        let window = self.window;

        Box::pin(async move {
            match resolve_metadata(client.as_ref(), &query, &options).await? {
                Resolved::Empty(file) => Ok(ResolveOutcome::Empty(file)),
                Resolved::File(file) => {
                    let bounds = ChunkBounds::compute(file.length, file.chunk_size, window.start, window.end)?;
                    let adapter =
                        ChunkCursorAdapter::open(client.as_ref(), file.id, &bounds, options.read_preference).await?;
                    Ok(ResolveOutcome::Flowing { file, bounds, adapter })
                }
            }
        })
    }
}

impl Stream for FileReadStream {
    type Item = Result<Bytes>;

    fn poll_next(self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<Option<Self::Item>> {
        let this = self.get_mut();

        loop {
            match &mut this.state {
                StreamState::Created => {
                    debug!(query = %this.query, "first demand signal; resolving file metadata");
                    let fut = this.begin_resolve();
                    this.state = StreamState::Resolving(fut);
                }

                StreamState::Resolving(fut) => match ready!(fut.as_mut().poll(cx)) {
                    Ok(ResolveOutcome::Empty(file)) => {
                        info!(file_id = %file.id, "empty file; completing with no data");
                        this.file = Some(file);
                        this.state = StreamState::Closed;
                        return Poll::Ready(None);
                    }
                    Ok(ResolveOutcome::Flowing { file, bounds, adapter }) => {
                        info!(
                            file_id = %file.id,
                            length = file.length,
                            byte_range = ?(bounds.start, bounds.end),
                            "file resolved; streaming chunks"
                        );
                        let validator =
                            ChunkSequenceValidator::new(file.length, file.chunk_size, bounds.first_chunk_index);
                        this.file = Some(file);
                        this.state = StreamState::Streaming(Flowing {
                            bounds,
                            validator,
                            phase: PullPhase::Idle(adapter),
                        });
                    }
                    Err(err) => {
                        this.state = StreamState::Errored;
                        return Poll::Ready(Some(Err(err)));
                    }
                },

                StreamState::Streaming(flowing) => {
                    if matches!(flowing.phase, PullPhase::Idle(_)) {
                        let PullPhase::Idle(adapter) = mem::replace(&mut flowing.phase, PullPhase::vacant()) else {
                            unreachable!()
                        };
                        flowing.phase = PullPhase::InFlight(pull_future(adapter));
                    }
                    let PullPhase::InFlight(fut) = &mut flowing.phase else {
                        unreachable!()
                    };

                    let (adapter, pulled) = ready!(fut.as_mut().poll(cx));
                    match pulled {
                        Err(err) => {
                            this.state = StreamState::FailingClose(close_future(adapter));
                            return Poll::Ready(Some(Err(FileReadError::Cursor(err))));
                        }
                        Ok(None) => {
                            debug!(bytes_out = this.bytes_out, "chunk cursor exhausted; releasing");
                            this.state = StreamState::Draining(close_future(adapter));
                        }
                        Ok(Some(chunk)) => match flowing.validator.validate(chunk) {
                            Err(err) => {
                                this.state = StreamState::FailingClose(close_future(adapter));
                                return Poll::Ready(Some(Err(err)));
                            }
                            Ok(chunk) => {
                                let window = flowing.bounds.delivered_range(chunk.seq, chunk.data.len());
                                debug!(seq = chunk.seq, raw_len = chunk.data.len(), delivered = window.len(), "chunk validated");
                                if window.is_empty() {
                                    // A zero-byte trimmed result marks the end
                                    // of the window; complete without a data
                                    // event.
                                    this.state = StreamState::Draining(close_future(adapter));
                                } else {
                                    let data = chunk.data.slice(window);
                                    this.bytes_out += data.len() as u64;
                                    flowing.phase = PullPhase::Idle(adapter);
                                    return Poll::Ready(Some(Ok(data)));
                                }
                            }
                        },
                    }
                }

                StreamState::Draining(fut) => match ready!(fut.as_mut().poll(cx)) {
                    Ok(()) => {
                        info!(query = %this.query, bytes_out = this.bytes_out, "read stream complete");
                        this.state = StreamState::Closed;
                        return Poll::Ready(None);
                    }
                    Err(err) => {
                        this.state = StreamState::Errored;
                        return Poll::Ready(Some(Err(FileReadError::Cursor(err))));
                    }
                },

                StreamState::FailingClose(fut) => {
                    if let Err(err) = ready!(fut.as_mut().poll(cx)) {
                        warn!(%err, "cursor close failed after stream error");
                    }
                    this.state = StreamState::Errored;
                    return Poll::Ready(None);
                }

                StreamState::Closed | StreamState::Errored | StreamState::Aborted => return Poll::Ready(None),
            }
        }
    }
}

/// The fetch itself starts only when this future is first polled, so
/// installing it does not get ahead of consumer demand.
fn pull_future(mut adapter: ChunkCursorAdapter) -> BoxFuture<'static, PullOutcome> {
    Box::pin(async move {
        let result = adapter.pull_next().await;
        (adapter, result)
    })
}

fn close_future(mut adapter: ChunkCursorAdapter) -> BoxFuture<'static, CloseResult> {
    Box::pin(async move { adapter.close().await })
}
