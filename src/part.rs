use std::borrow::Cow;
use std::io::{self, Read};
use std::sync::Arc;

use bytes::{Bytes, BytesMut};
use encoding_rs::{Encoding, UTF_8};
use http::header;
#[cfg(feature = "json")]
use serde::de::DeserializeOwned;
use spin::mutex::spin::SpinMutex as Mutex;

use crate::content_disposition::ContentDisposition;
use crate::headers::Headers;
use crate::state::{BodyActivity, MultipartState};

/// A single part of a multipart stream: its headers and a handle to its body.
///
/// The body is read through the [`Read`] implementation or the
/// [`chunk`](Part::chunk), [`bytes`](Part::bytes) and [`text`](Part::text)
/// methods. It ends exactly before the line terminator that precedes the next
/// boundary.
///
/// # Warning about stale parts
///
/// A `Part` is only readable until [`Multipart::next_part`](crate::Multipart::next_part)
/// is called again. The parser discards whatever was left of the body at that
/// point, and every later read fails with
/// [`Error::StreamAlreadyAdvanced`](crate::Error::StreamAlreadyAdvanced)
/// instead of reporting an empty body.
///
/// # Examples
///
/// ```
/// use mimepart::Multipart;
/// use std::io::Read;
///
/// let data = "--X-BOUNDARY\r\nContent-Disposition: form-data; name=\"my_text_field\"\r\n\r\nabcd\r\n--X-BOUNDARY--\r\n";
/// let mut multipart = Multipart::new(data.as_bytes(), "X-BOUNDARY");
///
/// while let Some(mut part) = multipart.next_part().unwrap() {
///     let mut content = String::new();
///     part.read_to_string(&mut content).unwrap();
///     assert_eq!(content, "abcd");
/// }
/// ```
pub struct Part<R> {
    state: Arc<Mutex<MultipartState<R>>>,
    headers: Headers,
    meta: PartMeta,
}

struct PartMeta {
    name: Option<String>,
    file_name: Option<String>,
    content_type: Option<mime::Mime>,
    idx: usize,
}

impl<R: Read> Part<R> {
    pub(crate) fn new(
        state: Arc<Mutex<MultipartState<R>>>,
        headers: Headers,
        idx: usize,
        content_disposition: ContentDisposition,
    ) -> Self {
        let content_type = headers
            .get(header::CONTENT_TYPE)
            .and_then(|val| val.parse::<mime::Mime>().ok());

        Part {
            state,
            headers,
            meta: PartMeta {
                name: content_disposition.part_name,
                file_name: content_disposition.file_name,
                content_type,
                idx,
            },
        }
    }

    /// The part name found in the
    /// [`Content-Disposition`](https://developer.mozilla.org/en-US/docs/Web/HTTP/Headers/Content-Disposition) header.
    pub fn name(&self) -> Option<&str> {
        self.meta.name.as_deref()
    }

    /// The file name found in the
    /// [`Content-Disposition`](https://developer.mozilla.org/en-US/docs/Web/HTTP/Headers/Content-Disposition) header.
    pub fn file_name(&self) -> Option<&str> {
        self.meta.file_name.as_deref()
    }

    /// Get the content type of the part.
    pub fn content_type(&self) -> Option<&mime::Mime> {
        self.meta.content_type.as_ref()
    }

    /// Get the part's header block as [`Headers`].
    pub fn headers(&self) -> &Headers {
        &self.headers
    }

    /// Get the index of this part in order they appeared in the stream.
    pub fn index(&self) -> usize {
        self.meta.idx
    }

    /// Whether the body can still be read, i.e. the parser has not moved past
    /// this part.
    pub fn is_active(&self) -> bool {
        self.state.lock().activity(self.meta.idx) == BodyActivity::Active
    }

    /// Get the next run of body bytes, or `None` once the part is complete.
    pub fn chunk(&mut self) -> crate::Result<Option<Bytes>> {
        self.state.lock().read_part_chunk(self.meta.idx)
    }

    /// Get the full body as [`Bytes`].
    pub fn bytes(mut self) -> crate::Result<Bytes> {
        let mut buf = BytesMut::new();

        while let Some(bytes) = self.chunk()? {
            buf.extend_from_slice(&bytes);
        }

        Ok(buf.freeze())
    }

    /// Get the full body as text, decoded with the charset of the part's
    /// `Content-Type`, falling back to `utf-8`.
    pub fn text(self) -> crate::Result<String> {
        self.text_with_charset("utf-8")
    }

    /// Get the full body as text, decoded with the charset of the part's
    /// `Content-Type`, falling back to `default_encoding`.
    ///
    /// Unknown encoding labels decode as `utf-8`; malformed sequences are
    /// replaced.
    pub fn text_with_charset(self, default_encoding: &str) -> crate::Result<String> {
        let encoding_name = self
            .content_type()
            .and_then(|mime| mime.get_param(mime::CHARSET))
            .map(|charset| charset.as_str())
            .unwrap_or(default_encoding);

        let encoding = Encoding::for_label(encoding_name.as_bytes()).unwrap_or(UTF_8);

        let bytes = self.bytes()?;

        let (text, _, _) = encoding.decode(&bytes);

        match text {
            Cow::Owned(s) => Ok(s),
            Cow::Borrowed(s) => Ok(String::from(s)),
        }
    }

    /// Try to deserialize the body as JSON.
    ///
    /// # Optional
    ///
    /// This requires the optional `json` feature to be enabled.
    #[cfg(feature = "json")]
    #[cfg_attr(nightly, doc(cfg(feature = "json")))]
    pub fn json<T: DeserializeOwned>(self) -> crate::Result<T> {
        serde_json::from_slice(&self.bytes()?).map_err(crate::Error::DecodeJson)
    }
}

impl<R: Read> Read for Part<R> {
    fn read(&mut self, buf: &mut [u8]) -> io::Result<usize> {
        self.state
            .lock()
            .read_part_data(self.meta.idx, buf)
            .map_err(io::Error::from)
    }
}

impl<R> std::fmt::Debug for Part<R> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Part")
            .field("index", &self.meta.idx)
            .field("name", &self.meta.name)
            .field("file_name", &self.meta.file_name)
            .field("headers", &self.headers)
            .finish()
    }
}
