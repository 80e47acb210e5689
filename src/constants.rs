use lazy_static::lazy_static;
use regex::Regex;

pub(crate) const DEFAULT_WHOLE_STREAM_SIZE_LIMIT: u64 = u64::MAX;
pub(crate) const DEFAULT_PER_PART_SIZE_LIMIT: u64 = u64::MAX;
pub(crate) const DEFAULT_BUFFER_SIZE: usize = 8 * 1024;

pub(crate) const BOUNDARY_EXT: &[u8] = b"--";
pub(crate) const CR: u8 = b'\r';
pub(crate) const LF: u8 = b'\n';

/// Number of line terminator bytes that may precede a boundary marker.
pub(crate) const MAX_NEWLINE_LEN: usize = 2;

lazy_static! {
    pub(crate) static ref CONTENT_DISPOSITION_PART_NAME_RE: Regex =
        Regex::new(r#"(?i)(?:^|[;\s])name\s*=\s*(?:"((?:[^"\\]|\\.)*)"|([^";\s]+))"#).unwrap();
    pub(crate) static ref CONTENT_DISPOSITION_FILE_NAME_RE: Regex =
        Regex::new(r#"(?i)(?:^|[;\s])filename\s*=\s*(?:"((?:[^"\\]|\\.)*)"|([^";\s]+))"#).unwrap();
    pub(crate) static ref QUOTED_PAIR_RE: Regex = Regex::new(r"\\(.)").unwrap();
}

/// Builds the `--boundary` marker searched for in the stream.
pub(crate) fn boundary_marker(boundary: &str) -> Box<[u8]> {
    let mut marker = Vec::with_capacity(BOUNDARY_EXT.len() + boundary.len());
    marker.extend_from_slice(BOUNDARY_EXT);
    marker.extend_from_slice(boundary.as_bytes());
    marker.into_boxed_slice()
}

/// The smallest buffer that can hold a marker split across two fills.
pub(crate) fn min_buffer_size(marker_len: usize) -> usize {
    2 * (marker_len + MAX_NEWLINE_LEN)
}
