use std::{
  pin::Pin,
  task::{Context, Poll},
};

use bytes::Bytes;
use futures::Stream;

use crate::pipeline::StagedFile;
use crate::Result;

// slices an inner byte stream to a [skip, skip+limit) window, and
// optionally owns the staged file backing it. the file guard is dropped
// together with the stream, i.e. when the response body completes or the
// connection goes away, which is exactly when the temp file must die.
pub struct ByteStream<T> {
  stream: T,
  skip_bytes: usize,
  // inclusive
  limit_bytes: Option<usize>,
  _cleanup: Option<StagedFile>,
}

impl<T> ByteStream<T> {
  pub fn new(stream: T) -> Self {
    ByteStream {
      stream,
      skip_bytes: 0,
      limit_bytes: None,
      _cleanup: None,
    }
  }

  pub fn skip_bytes(self, bytes: usize) -> Self {
    ByteStream {
      skip_bytes: bytes,
      ..self
    }
  }

  pub fn limit_bytes(self, bytes: usize) -> Self {
    ByteStream {
      limit_bytes: Some(bytes),
      ..self
    }
  }

  pub fn with_cleanup(self, file: StagedFile) -> Self {
    ByteStream {
      _cleanup: Some(file),
      ..self
    }
  }
}

impl<T> Stream for ByteStream<T>
where
  T: Stream<Item = Result<Bytes>> + Unpin,
{
  type Item = Result<Bytes>;

  fn poll_next(
    mut self: Pin<&mut Self>,
    cx: &mut Context<'_>,
  ) -> Poll<Option<Self::Item>> {
    let this = &mut *self;
    let poll = Pin::new(&mut this.stream).poll_next(cx);
    match poll {
      Poll::Ready(Some(Ok(bytes))) => {
        if bytes.len() <= this.skip_bytes {
          this.skip_bytes -= bytes.len();
          cx.waker().wake_by_ref();
          return Poll::Pending;
        }

        let bytes = bytes.slice(this.skip_bytes..);
        this.skip_bytes = 0;

        match this.limit_bytes {
          None => Poll::Ready(Some(Ok(bytes))),
          Some(0) => Poll::Ready(None),
          Some(limit_bytes) => {
            if bytes.len() > limit_bytes {
              let bytes = bytes.slice(..limit_bytes);
              this.limit_bytes = Some(0);
              Poll::Ready(Some(Ok(bytes)))
            } else {
              this.limit_bytes = Some(limit_bytes - bytes.len());
              Poll::Ready(Some(Ok(bytes)))
            }
          }
        }
      }
      Poll::Ready(Some(Err(err))) => Poll::Ready(Some(Err(err))),
      Poll::Ready(None) => Poll::Ready(None),
      Poll::Pending => Poll::Pending,
    }
  }
}
