use std::io::Read;

use crate::buffer::StreamBuffer;
use crate::constants::{self, CR, LF};

/// What follows a located boundary marker.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum BoundaryKind {
    /// A new part follows.
    Start,
    /// `--boundary--`, the message is complete.
    End,
}

impl<R: Read> StreamBuffer<R> {
    /// Searches the unscanned region for the boundary marker.
    ///
    /// On a hit, `save_idx` is pulled back over the line terminator in front of
    /// the marker so the terminator never reaches the part body. On a miss,
    /// `save_idx` moves up to the last `marker.len() + 2` bytes, which may
    /// still hold the beginning of a marker split across two reads.
    pub fn scan_boundary(&mut self, marker: &[u8]) {
        if self.boundary_idx.is_some() {
            return;
        }

        let region = &self.buf[self.save_idx..self.filled];

        match find_marker(region, marker) {
            Some(pos) => {
                let newline = newline_len_before(&region[..pos]);
                let idx = self.save_idx + pos;

                trace!("boundary located at {} after a {} byte line terminator", idx, newline);

                self.boundary_idx = Some(idx);
                self.save_idx = idx - newline;
            }
            None => {
                let keep = marker.len() + constants::MAX_NEWLINE_LEN;
                self.save_idx = self.save_idx.max(self.filled.saturating_sub(keep));
            }
        }
    }

    /// Consumes the located boundary and tells whether it starts a new part.
    ///
    /// The read position must sit at the line terminator of the boundary, i.e.
    /// the previous body has been fully consumed. For a start boundary the
    /// transport padding and line terminator after the marker are consumed as
    /// well; an end boundary is left in place.
    pub fn read_boundary(&mut self, marker: &[u8]) -> crate::Result<BoundaryKind> {
        let boundary_idx = self.boundary_idx.ok_or(crate::Error::IncompleteStream)?;

        self.advance(boundary_idx + marker.len() - self.idx);
        self.boundary_idx = None;

        if self.ensure(constants::BOUNDARY_EXT.len())? == 0 {
            return Err(crate::Error::IncompleteStream);
        }

        if self.unread().starts_with(constants::BOUNDARY_EXT) {
            return Ok(BoundaryKind::End);
        }

        self.skip_transport_padding()?;
        self.skip_newline()?;

        Ok(BoundaryKind::Start)
    }

    fn skip_transport_padding(&mut self) -> crate::Result<()> {
        while self.ensure(1)? > 0 {
            match self.unread()[0] {
                b' ' | b'\t' => self.advance(1),
                _ => break,
            }
        }

        Ok(())
    }

    fn skip_newline(&mut self) -> crate::Result<()> {
        self.ensure(2)?;

        let len = match self.unread() {
            [CR, LF, ..] => 2,
            [CR, ..] | [LF, ..] => 1,
            _ => 0,
        };
        self.advance(len);

        Ok(())
    }
}

/// Forward scan for `marker`, comparing the first byte before the rest.
fn find_marker(haystack: &[u8], marker: &[u8]) -> Option<usize> {
    let (&first, rest) = marker.split_first()?;
    let mut offset = 0;

    while let Some(pos) = memchr::memchr(first, &haystack[offset..]) {
        let start = offset + pos;
        let end = start + marker.len();

        if end > haystack.len() {
            return None;
        }

        if &haystack[start + 1..end] == rest {
            return Some(start);
        }

        offset = start + 1;
    }

    None
}

/// Length of the line terminator ending `content`: `\r\n`, a bare `\r` or
/// `\n`, or nothing.
fn newline_len_before(content: &[u8]) -> usize {
    match content {
        [.., CR, LF] => 2,
        [.., CR] | [.., LF] => 1,
        _ => 0,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::buffer::tests::Chunked;

    #[test]
    fn test_find_marker() {
        assert_eq!(find_marker(b"--B", b"--B"), Some(0));
        assert_eq!(find_marker(b"abc\r\n--B", b"--B"), Some(5));
        assert_eq!(find_marker(b"a-b--c--Bd", b"--B"), Some(6));
        assert_eq!(find_marker(b"--A --", b"--B"), None);
        assert_eq!(find_marker(b"", b"--B"), None);
    }

    #[test]
    fn test_newline_len_before() {
        assert_eq!(newline_len_before(b""), 0);
        assert_eq!(newline_len_before(b"abc"), 0);
        assert_eq!(newline_len_before(b"\n"), 1);
        assert_eq!(newline_len_before(b"abc\n"), 1);
        assert_eq!(newline_len_before(b"abc\r"), 1);
        assert_eq!(newline_len_before(b"\r\n"), 2);
        assert_eq!(newline_len_before(b"abc\n\r\n"), 2);
        assert_eq!(newline_len_before(b"abc\n\r"), 1);
    }

    #[test]
    fn test_scan_at_first_byte() {
        let mut buffer = StreamBuffer::new(&b"--B\r\n"[..], 32, u64::MAX);
        buffer.ensure(5).unwrap();
        buffer.scan_boundary(b"--B");

        assert_eq!(buffer.boundary_idx, Some(0));
        assert_eq!(buffer.save_idx, 0);
    }

    #[test]
    fn test_scan_strips_line_terminator() {
        for (data, save_idx) in [
            (&b"ab\r\n--B"[..], 2),
            (&b"ab\n--B"[..], 2),
            (&b"ab\r--B"[..], 2),
            (&b"ab--B"[..], 2),
        ]
        .iter()
        {
            let mut buffer = StreamBuffer::new(*data, 32, u64::MAX);
            buffer.ensure(data.len()).unwrap();
            buffer.scan_boundary(b"--B");

            assert_eq!(buffer.save_idx, *save_idx, "{:?}", String::from_utf8_lossy(data));
        }
    }

    #[test]
    fn test_scan_miss_keeps_possible_partial_marker() {
        let mut buffer = StreamBuffer::new(&b"0123456789\r\n--"[..], 32, u64::MAX);
        buffer.ensure(14).unwrap();
        buffer.scan_boundary(b"--BOUNDARY");

        assert_eq!(buffer.boundary_idx, None);
        assert_eq!(buffer.save_idx, 2);
    }

    #[test]
    fn test_read_boundary_kinds() {
        let mut buffer = StreamBuffer::new(Chunked { data: b"--B \t\r\nX: 1", chunk: 1 }, 16, u64::MAX);
        buffer.body_available(b"--B").unwrap();
        assert_eq!(buffer.read_boundary(b"--B").unwrap(), BoundaryKind::Start);
        assert_eq!(buffer.ensure(1).unwrap(), 1);
        assert_eq!(buffer.unread()[0], b'X');

        let mut buffer = StreamBuffer::new(Chunked { data: b"\r\n--B--\r\n", chunk: 1 }, 16, u64::MAX);
        buffer.skip_body(b"--B").unwrap();
        assert_eq!(buffer.read_boundary(b"--B").unwrap(), BoundaryKind::End);
    }

    #[test]
    fn test_read_boundary_at_end_of_stream() {
        let mut buffer = StreamBuffer::new(&b"--B"[..], 16, u64::MAX);
        buffer.skip_body(b"--B").unwrap();

        assert_eq!(buffer.read_boundary(b"--B").unwrap_err(), crate::Error::IncompleteStream);
    }
}
