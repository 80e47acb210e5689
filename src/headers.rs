use std::io::Read;

use crate::buffer::StreamBuffer;
use crate::constants::{CR, LF};

/// The header block of a part.
///
/// Names and values are kept as written, trimmed of surrounding whitespace and
/// in stream order. Lookups compare names case-insensitively and a repeated
/// header keeps every value.
///
/// # Examples
///
/// ```
/// use mimepart::Multipart;
///
/// let data = "--B\r\nX-Tag: a\r\nx-tag: b\r\n\r\nbody\r\n--B--\r\n";
/// let mut multipart = Multipart::new(data.as_bytes(), "B");
///
/// let part = multipart.next_part().unwrap().unwrap();
/// assert_eq!(part.headers().get("X-TAG"), Some("a"));
/// assert_eq!(part.headers().get_all("x-tag").collect::<Vec<_>>(), ["a", "b"]);
/// ```
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Headers {
    entries: Vec<(String, String)>,
}

impl Headers {
    /// Creates an empty header block.
    pub fn new() -> Headers {
        Headers::default()
    }

    pub(crate) fn append(&mut self, name: String, value: String) {
        self.entries.push((name, value));
    }

    /// Returns the first value of the header `name`.
    pub fn get<K: AsRef<str>>(&self, name: K) -> Option<&str> {
        let name = name.as_ref();

        self.entries
            .iter()
            .find(|(key, _)| key.eq_ignore_ascii_case(name))
            .map(|(_, value)| value.as_str())
    }

    /// Returns every value of the header `name` in stream order.
    pub fn get_all<'a>(&'a self, name: &'a str) -> impl Iterator<Item = &'a str> + 'a {
        self.entries
            .iter()
            .filter(move |(key, _)| key.eq_ignore_ascii_case(name))
            .map(|(_, value)| value.as_str())
    }

    pub fn contains_key<K: AsRef<str>>(&self, name: K) -> bool {
        self.get(name).is_some()
    }

    /// Iterates over all `(name, value)` pairs in stream order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> + '_ {
        self.entries.iter().map(|(key, value)| (key.as_str(), value.as_str()))
    }

    /// Number of header lines, counting repeated names once per line.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Number of distinct header names.
    pub fn keys_len(&self) -> usize {
        self.entries
            .iter()
            .enumerate()
            .filter(|(idx, (key, _))| {
                !self.entries[..*idx]
                    .iter()
                    .any(|(prev, _)| prev.eq_ignore_ascii_case(key))
            })
            .count()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl<R: Read> StreamBuffer<R> {
    /// Reads `name: value` lines up to and including the blank line that ends
    /// a part's header block.
    pub fn read_headers(&mut self) -> crate::Result<Headers> {
        let mut headers = Headers::new();

        loop {
            let (len, newline) = self.read_line()?;

            if len == 0 {
                self.advance(newline);
                return Ok(headers);
            }

            let (name, value) = split_header(&self.buf[self.idx..self.idx + len])?;
            headers.append(name, value);

            self.advance(len + newline);
        }
    }

    /// Finds the end of the line at the read position without consuming it.
    /// Returns the line length and the length of its terminator.
    fn read_line(&mut self) -> crate::Result<(usize, usize)> {
        let mut scanned = 0;

        loop {
            let unread = self.unread();

            if let Some(pos) = memchr::memchr2(CR, LF, &unread[scanned..]) {
                let end = scanned + pos;

                if unread[end] == LF {
                    return Ok((end, 1));
                }

                if end + 1 < unread.len() {
                    let newline = if unread[end + 1] == LF { 2 } else { 1 };
                    return Ok((end, newline));
                }

                // A trailing CR needs one more byte to tell `\r` from `\r\n`.
                if self.fill_line(end + 2)? < end + 2 {
                    return Ok((end, 1));
                }

                scanned = end;
                continue;
            }

            scanned = unread.len();

            if self.fill_line(scanned + 1)? <= scanned {
                return Err(crate::Error::IncompleteHeaders);
            }
        }
    }

    fn fill_line(&mut self, want: usize) -> crate::Result<usize> {
        if want > self.capacity() {
            return Err(crate::Error::HeadersTooLarge { limit: self.capacity() });
        }

        self.ensure(want)
    }
}

fn split_header(line: &[u8]) -> crate::Result<(String, String)> {
    let colon = memchr::memchr(b':', line).ok_or_else(|| crate::Error::MalformedHeader { line: line.to_vec() })?;

    let name = String::from_utf8_lossy(trim(&line[..colon])).into_owned();
    let value = String::from_utf8_lossy(trim(&line[colon + 1..])).into_owned();

    Ok((name, value))
}

fn trim(bytes: &[u8]) -> &[u8] {
    let start = bytes.iter().position(|b| !b.is_ascii_whitespace()).unwrap_or(bytes.len());
    let end = bytes.iter().rposition(|b| !b.is_ascii_whitespace()).map_or(start, |pos| pos + 1);

    &bytes[start..end]
}
