//! Lazily buffered response payloads.

use std::fmt;
use std::io::Cursor;
use std::pin::Pin;
use std::sync::{Mutex, MutexGuard, OnceLock, PoisonError};

use bytes::{Bytes, BytesMut};
use futures::{Stream, StreamExt};
use tokio::io::{AsyncWrite, AsyncWriteExt};
use tokio::sync::OnceCell;
use tracing::{debug, warn};

use crate::error::ClientError;

/// Chunked payload produced by a transport.
pub type BodyStream = Pin<Box<dyn Stream<Item = Result<Bytes, ClientError>> + Send>>;

enum Source {
    Unread(BodyStream),
    Reading,
    Drained,
    Disposed,
}

impl Source {
    fn label(&self) -> &'static str {
        match self {
            Self::Unread(_) => "unread",
            Self::Reading => "reading",
            Self::Drained => "drained",
            Self::Disposed => "disposed",
        }
    }
}

/// A response payload that is copied from the transport at most once.
///
/// The first `read_as_*` call drains the underlying stream into memory;
/// every later call, in any representation, is served from that buffer.
/// Concurrent first reads wait on the same copy.
///
/// A failure while copying never surfaces through the accessors: they return
/// empty data and the failure is kept in [`error`](Self::error).
///
/// ## Examples
///
/// ```rust
/// use resty::ResponseBody;
///
/// let body = ResponseBody::from_bytes("hello", None);
/// assert_eq!(body.read_as_string_blocking(), "hello");
/// assert_eq!(body.read_as_bytes_blocking().as_ref(), b"hello");
/// assert!(body.error().is_none());
/// ```
pub struct ResponseBody {
    source: Mutex<Source>,
    charset: Option<String>,
    bytes: OnceCell<Bytes>,
    text: OnceCell<String>,
    error: OnceLock<ClientError>,
}

impl ResponseBody {
    /// Wraps a transport stream; `charset` selects the text decoding.
    pub fn new(stream: BodyStream, charset: Option<String>) -> Self {
        Self {
            source: Mutex::new(Source::Unread(stream)),
            charset,
            bytes: OnceCell::new(),
            text: OnceCell::new(),
            error: OnceLock::new(),
        }
    }

    /// Creates an already buffered body.
    pub fn from_bytes(bytes: impl Into<Bytes>, charset: Option<String>) -> Self {
        Self {
            source: Mutex::new(Source::Drained),
            charset,
            bytes: OnceCell::new_with(Some(bytes.into())),
            text: OnceCell::new(),
            error: OnceLock::new(),
        }
    }

    /// Creates a body with no content, as for failed requests.
    pub fn empty() -> Self {
        Self::from_bytes(Bytes::new(), None)
    }

    /// Returns the payload bytes, copying the stream on first use.
    pub async fn read_as_bytes(&self) -> &Bytes {
        self.bytes.get_or_init(|| self.copy_source()).await
    }

    /// Returns the payload decoded as text using the response charset.
    ///
    /// UTF-8 is assumed when no charset was declared. `ISO-8859-1` maps
    /// each byte to the same code point, `US-ASCII` replaces bytes above
    /// `0x7F` with `?`, and unknown charsets fall back to lossy UTF-8.
    pub async fn read_as_string(&self) -> &str {
        self.text
            .get_or_init(|| async {
                let bytes = self.read_as_bytes().await;
                decode_text(bytes, self.charset.as_deref())
            })
            .await
    }

    /// Returns a reader over the buffered payload.
    pub async fn read_as_stream(&self) -> Cursor<Bytes> {
        Cursor::new(self.read_as_bytes().await.clone())
    }

    /// Writes the payload to `writer` and flushes it.
    ///
    /// ## Errors
    ///
    /// Returns the writer's error, or an error wrapping the fault captured
    /// while copying the payload; nothing is written in that case.
    pub async fn copy_to<W>(&self, writer: &mut W) -> std::io::Result<()>
    where
        W: AsyncWrite + Unpin + ?Sized,
    {
        let bytes = self.read_as_bytes().await;
        if let Some(error) = self.error() {
            return Err(std::io::Error::other(error.to_string()));
        }
        writer.write_all(bytes).await?;
        writer.flush().await
    }

    /// Blocking form of [`read_as_bytes`](Self::read_as_bytes).
    ///
    /// Must not be called from inside an async runtime. Bodies returned by
    /// [`RestRequest::send_blocking`](crate::RestRequest::send_blocking) are
    /// already buffered and never block.
    pub fn read_as_bytes_blocking(&self) -> &Bytes {
        futures::executor::block_on(self.read_as_bytes())
    }

    /// Blocking form of [`read_as_string`](Self::read_as_string).
    pub fn read_as_string_blocking(&self) -> &str {
        futures::executor::block_on(self.read_as_string())
    }

    /// Blocking form of [`read_as_stream`](Self::read_as_stream).
    pub fn read_as_stream_blocking(&self) -> Cursor<Bytes> {
        futures::executor::block_on(self.read_as_stream())
    }

    /// Returns the failure captured while copying the payload, if any.
    pub fn error(&self) -> Option<&ClientError> {
        self.error.get()
    }

    /// Returns the charset used for text decoding.
    pub fn charset(&self) -> Option<&str> {
        self.charset.as_deref()
    }

    /// Returns `true` once the payload has been copied into memory.
    pub fn is_buffered(&self) -> bool {
        self.bytes.initialized()
    }

    /// Releases the underlying stream. Repeated calls do nothing.
    ///
    /// Data already buffered stays readable; an unread body reads as empty.
    pub fn dispose(&self) {
        let mut source = self.lock_source();
        if !matches!(*source, Source::Disposed) {
            debug!(state = source.label(), "disposing response body");
            *source = Source::Disposed;
        }
    }

    /// Returns `true` after [`dispose`](Self::dispose).
    pub fn is_disposed(&self) -> bool {
        matches!(*self.lock_source(), Source::Disposed)
    }

    fn lock_source(&self) -> MutexGuard<'_, Source> {
        self.source.lock().unwrap_or_else(PoisonError::into_inner)
    }

    fn record_error(&self, error: ClientError) {
        warn!(error = %error, "failed to read response body");
        let _ = self.error.set(error);
    }

    async fn copy_source(&self) -> Bytes {
        let taken = std::mem::replace(&mut *self.lock_source(), Source::Reading);
        let mut stream = match taken {
            Source::Unread(stream) => stream,
            // A previous copy was dropped mid-flight and took the stream with it.
            Source::Reading => {
                *self.lock_source() = Source::Drained;
                self.record_error(ClientError::Canceled);
                return Bytes::new();
            }
            state @ (Source::Drained | Source::Disposed) => {
                *self.lock_source() = state;
                return Bytes::new();
            }
        };

        let mut buffer = BytesMut::new();
        let mut failed = false;
        while let Some(chunk) = stream.next().await {
            match chunk {
                Ok(chunk) => buffer.extend_from_slice(&chunk),
                Err(error) => {
                    self.record_error(error);
                    failed = true;
                    break;
                }
            }
        }
        drop(stream);

        let mut source = self.lock_source();
        if matches!(*source, Source::Reading) {
            *source = Source::Drained;
        }
        if failed {
            return Bytes::new();
        }
        debug!(bytes = buffer.len(), "buffered response body");
        buffer.freeze()
    }
}

impl fmt::Debug for ResponseBody {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ResponseBody")
            .field("state", &self.lock_source().label())
            .field("charset", &self.charset)
            .field("buffered", &self.bytes.get().map(Bytes::len))
            .field("error", &self.error.get())
            .finish()
    }
}

fn decode_text(bytes: &[u8], charset: Option<&str>) -> String {
    let charset = charset.map(str::to_ascii_lowercase);
    match charset.as_deref() {
        Some("iso-8859-1" | "latin1" | "latin-1" | "l1") => {
            bytes.iter().map(|&b| b as char).collect()
        }
        Some("us-ascii" | "ascii") => bytes
            .iter()
            .map(|&b| if b.is_ascii() { b as char } else { '?' })
            .collect(),
        _ => {
            let bytes = bytes.strip_prefix(b"\xEF\xBB\xBF").unwrap_or(bytes);
            String::from_utf8_lossy(bytes).into_owned()
        }
    }
}
