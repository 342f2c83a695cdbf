//! Incremental decoding of streamed HTTP response bodies.
//!
//! Two decoder variants share one capability, [`StreamDecoder`]:
//!
//! - [`EventStreamDecoder`] turns the chat event stream into [`Chunk`]s.
//!   Frames are separated by a blank line; frames starting with `data: `
//!   carry a JSON chunk, anything else is ignored.
//! - [`RawTextDecoder`] turns document streams into plain text pieces.
//!
//! [`DecodedStream`] drives either one over a byte stream, so both are
//! consumed the same way: a lazy, single-pass `Stream` of
//! `Result<Item>` in byte-arrival order.

mod event;
mod frame;
mod text;
mod utf8;

use std::collections::VecDeque;
use std::pin::Pin;
use std::task::{Context, Poll, ready};

use futures_util::Stream;
use pin_project_lite::pin_project;

use crate::Result;
use crate::types::Chunk;

pub use event::{DATA_PREFIX, EventStreamDecoder, parse_frame};
pub use frame::{FRAME_SEPARATOR, FrameSplitter};
pub use text::RawTextDecoder;
pub use utf8::Utf8Decoder;

/// Boxed stream of chat chunks.
pub type ChunkStream = Pin<Box<dyn Stream<Item = Result<Chunk>> + Send>>;

/// Boxed stream of document text pieces.
pub type TextStream = Pin<Box<dyn Stream<Item = Result<String>> + Send>>;

/// Turns successive reads of a byte stream into decoded items.
pub trait StreamDecoder {
    type Item;

    /// Decode one read. Items complete so far are returned in order;
    /// incomplete input is retained for the next call.
    fn decode(&mut self, bytes: &[u8]) -> Vec<Self::Item>;

    /// Called once at end-of-data.
    fn finish(&mut self) -> Vec<Self::Item>;
}

pin_project! {
    /// A byte stream decoded through a [`StreamDecoder`].
    ///
    /// The body is dropped as soon as it ends or fails, and with the
    /// `DecodedStream` itself if the consumer stops early. A body error is
    /// yielded once, after every item decoded before it, and ends the
    /// stream.
    pub struct DecodedStream<S, D>
    where
        D: StreamDecoder,
    {
        #[pin]
        body: Option<S>,
        decoder: D,
        ready: VecDeque<D::Item>,
    }
}

impl<S, D> DecodedStream<S, D>
where
    D: StreamDecoder,
{
    pub fn new(body: S, decoder: D) -> Self {
        Self {
            body: Some(body),
            decoder,
            ready: VecDeque::new(),
        }
    }

    /// Whether the underlying body has been released.
    pub fn is_released(&self) -> bool {
        self.body.is_none()
    }
}

impl<S, B, D> Stream for DecodedStream<S, D>
where
    S: Stream<Item = Result<B>>,
    B: AsRef<[u8]>,
    D: StreamDecoder,
{
    type Item = Result<D::Item>;

    fn poll_next(self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<Option<Self::Item>> {
        let mut this = self.project();
        loop {
            if let Some(item) = this.ready.pop_front() {
                return Poll::Ready(Some(Ok(item)));
            }
            let Some(body) = this.body.as_mut().as_pin_mut() else {
                return Poll::Ready(None);
            };
            match ready!(body.poll_next(cx)) {
                Some(Ok(bytes)) => {
                    let items = this.decoder.decode(bytes.as_ref());
                    this.ready.extend(items);
                }
                Some(Err(err)) => {
                    this.body.set(None);
                    return Poll::Ready(Some(Err(err)));
                }
                None => {
                    this.body.set(None);
                    let items = this.decoder.finish();
                    this.ready.extend(items);
                }
            }
        }
    }
}

/// Decode a chat event stream body into chunks.
pub fn chunks<S, B>(body: S) -> DecodedStream<S, EventStreamDecoder>
where
    S: Stream<Item = Result<B>>,
    B: AsRef<[u8]>,
{
    DecodedStream::new(body, EventStreamDecoder::new())
}

/// Decode a raw document body into text pieces.
pub fn text<S, B>(body: S) -> DecodedStream<S, RawTextDecoder>
where
    S: Stream<Item = Result<B>>,
    B: AsRef<[u8]>,
{
    DecodedStream::new(body, RawTextDecoder::new())
}
