//! A streaming parser for MIME multipart bodies (`multipart/form-data`,
//! `multipart/mixed` and friends) over any [`std::io::Read`] source.
//!
//! The parser pulls the input through a fixed-size buffer and never holds a
//! whole message in memory. Each [`Part`] exposes its headers and a body that
//! reads like an ordinary byte stream ending exactly at the next boundary.
//!
//! # Examples
//!
//! ```
//! use mimepart::Multipart;
//! use std::io::Read;
//!
//! # fn run() -> Result<(), Box<dyn std::error::Error>> {
//! let data = "--X-BOUNDARY\r\nContent-Disposition: form-data; name=\"my_text_field\"\r\n\r\nabcd\r\n--X-BOUNDARY--\r\n";
//! let mut multipart = Multipart::new(data.as_bytes(), "X-BOUNDARY");
//!
//! while let Some(mut part) = multipart.next_part()? {
//!     let mut body = Vec::new();
//!     part.read_to_end(&mut body)?;
//!
//!     println!("Part {:?}: {} bytes", part.name(), body.len());
//! }
//! # Ok(())
//! # }
//! # run().unwrap();
//! ```
//!
//! ## Optional features
//!
//! * `json`: adds [`Part::json`].
//! * `log`: emits parser events through the [`log`](https://docs.rs/log) facade.

#![forbid(unsafe_code)]
#![warn(
    missing_debug_implementations,
    rust_2018_idioms,
    trivial_casts,
    unused_qualifications
)]
#![cfg_attr(nightly, feature(doc_cfg))]

pub use bytes;
pub use constraints::Constraints;
pub use error::Error;
pub use headers::Headers;
pub use multipart::Multipart;
pub use part::Part;
pub use size_limit::SizeLimit;

macro_rules! trace {
    ($($arg:tt)+) => {
        #[cfg(feature = "log")]
        log::trace!($($arg)+);
    };
}

macro_rules! debug {
    ($($arg:tt)+) => {
        #[cfg(feature = "log")]
        log::debug!($($arg)+);
    };
}

mod boundary;
mod buffer;
mod constants;
mod constraints;
mod content_disposition;
mod error;
mod headers;
mod multipart;
mod part;
mod size_limit;
mod state;

/// A Result type often returned from methods that can have `mimepart` errors.
pub type Result<T, E = Error> = std::result::Result<T, E>;

/// Parses the `Content-Type` header to extract the boundary value.
///
/// Any `multipart/*` media type is accepted.
///
/// # Examples
///
/// ```
/// let content_type = "multipart/form-data; boundary=ABCDEFG";
///
/// assert_eq!(mimepart::parse_boundary(content_type), Ok("ABCDEFG".to_owned()));
/// ```
pub fn parse_boundary<T: AsRef<str>>(content_type: T) -> Result<String> {
    let m = content_type
        .as_ref()
        .parse::<mime::Mime>()
        .map_err(Error::DecodeContentType)?;

    if m.type_() != mime::MULTIPART {
        return Err(Error::NoMultipart);
    }

    m.get_param(mime::BOUNDARY)
        .map(|name| name.as_str().to_owned())
        .ok_or(Error::NoBoundary)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_boundary() {
        let content_type = "multipart/form-data; boundary=ABCDEFG";
        assert_eq!(parse_boundary(content_type), Ok("ABCDEFG".to_owned()));

        let content_type = "multipart/form-data; boundary=------ABCDEFG";
        assert_eq!(parse_boundary(content_type), Ok("------ABCDEFG".to_owned()));

        let content_type = "multipart/mixed; boundary=simple";
        assert_eq!(parse_boundary(content_type), Ok("simple".to_owned()));

        let content_type = "boundary=------ABCDEFG";
        assert!(parse_boundary(content_type).is_err());

        let content_type = "text/plain";
        assert!(parse_boundary(content_type).is_err());

        let content_type = "text/plain; boundary=------ABCDEFG";
        assert_eq!(parse_boundary(content_type), Err(Error::NoMultipart));

        let content_type = "multipart/form-data";
        assert_eq!(parse_boundary(content_type), Err(Error::NoBoundary));
    }
}
