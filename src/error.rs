use std::fmt::{self, Debug, Display, Formatter};
use std::io;

use derive_more::Display;

/// A set of errors that can occur while parsing a multipart stream and in other
/// operations.
#[derive(Display)]
#[non_exhaustive]
pub enum Error {
    /// A part's body was read after the parser had already moved on to a
    /// later part.
    #[display(fmt = "part {} was read after the parser advanced past it", part_index)]
    StreamAlreadyAdvanced { part_index: usize },

    /// A header line does not contain a `:` separator.
    #[display(fmt = "malformed header line: {:?}", "String::from_utf8_lossy(line)")]
    MalformedHeader { line: Vec<u8> },

    /// The stream ended before the blank line that terminates a header block.
    #[display(fmt = "failed to read part complete headers")]
    IncompleteHeaders,

    /// A single header line does not fit into the parser buffer.
    #[display(fmt = "part headers exceed the buffer capacity: {} bytes", limit)]
    HeadersTooLarge { limit: usize },

    /// The stream ended before the terminating boundary was found.
    #[display(fmt = "incomplete multipart stream")]
    IncompleteStream,

    /// The body of a part exceeded the maximum size limit.
    #[display(
        fmt = "part {:?} exceeded the maximum size limit: {} bytes",
        "part_name.as_deref().unwrap_or(\"<unknown>\")",
        limit
    )]
    PartSizeExceeded { limit: u64, part_name: Option<String> },

    /// The incoming stream size exceeded the maximum limit.
    #[display(fmt = "stream size exceeded the maximum limit: {} bytes", limit)]
    StreamSizeExceeded { limit: u64 },

    /// Reading from the underlying stream failed.
    #[display(fmt = "stream read failed: {}", _0)]
    StreamReadFailed(io::Error),

    /// The `Content-Type` is not a `multipart/*` type.
    #[display(fmt = "Content-Type is not multipart")]
    NoMultipart,

    /// Failed to convert the `Content-Type` to [`mime::Mime`] type.
    #[display(fmt = "Failed to decode Content-Type: {}", _0)]
    DecodeContentType(mime::FromStrError),

    /// No boundary found in the `Content-Type` header.
    #[display(fmt = "multipart boundary not found in Content-Type")]
    NoBoundary,

    /// Failed to decode the part data as `JSON` in
    /// [`part.json()`](crate::Part::json) method.
    #[cfg(feature = "json")]
    #[cfg_attr(nightly, doc(cfg(feature = "json")))]
    #[display(fmt = "failed to decode part data as JSON: {}", _0)]
    DecodeJson(serde_json::Error),
}

impl Debug for Error {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        Display::fmt(self, f)
    }
}

impl std::error::Error for Error {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Error::StreamReadFailed(err) => Some(err),
            Error::DecodeContentType(err) => Some(err),
            #[cfg(feature = "json")]
            Error::DecodeJson(err) => Some(err),
            _ => None,
        }
    }
}

impl PartialEq for Error {
    fn eq(&self, other: &Self) -> bool {
        self.to_string().eq(&other.to_string())
    }
}

impl Eq for Error {}

impl From<io::Error> for Error {
    fn from(err: io::Error) -> Self {
        // Errors that crossed a `Read` boundary come back as themselves.
        if err.get_ref().map_or(false, |inner| inner.is::<Error>()) {
            return err
                .into_inner()
                .and_then(|inner| inner.downcast::<Error>().ok())
                .map_or(Error::IncompleteStream, |err| *err);
        }

        Error::StreamReadFailed(err)
    }
}

impl From<Error> for io::Error {
    fn from(err: Error) -> Self {
        match err {
            Error::StreamReadFailed(err) => err,
            Error::IncompleteStream | Error::IncompleteHeaders => io::Error::new(io::ErrorKind::UnexpectedEof, err),
            Error::MalformedHeader { .. } | Error::HeadersTooLarge { .. } => {
                io::Error::new(io::ErrorKind::InvalidData, err)
            }
            err => io::Error::new(io::ErrorKind::Other, err),
        }
    }
}
