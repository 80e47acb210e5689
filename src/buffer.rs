use std::io::{self, Read};

/// A fixed-capacity window over the underlying reader.
///
/// The cursors always satisfy `idx <= save_idx <= filled <= buf.len()`:
///
/// * `idx` is the next unread byte.
/// * `save_idx` is the first byte not yet proven to be free of a boundary
///   marker. Everything in `idx..save_idx` may be handed out as part body.
/// * `filled` is the end of the valid bytes.
/// * `boundary_idx` caches the start of the next located marker.
pub(crate) struct StreamBuffer<R> {
    pub(crate) eof: bool,
    pub(crate) buf: Box<[u8]>,
    pub(crate) idx: usize,
    pub(crate) save_idx: usize,
    pub(crate) filled: usize,
    pub(crate) boundary_idx: Option<usize>,
    pub(crate) stream: R,
    pub(crate) whole_stream_size_limit: u64,
    pub(crate) stream_size_counter: u64,
}

impl<R: Read> StreamBuffer<R> {
    pub fn new(stream: R, capacity: usize, whole_stream_size_limit: u64) -> Self {
        StreamBuffer {
            eof: false,
            buf: vec![0; capacity].into_boxed_slice(),
            idx: 0,
            save_idx: 0,
            filled: 0,
            boundary_idx: None,
            stream,
            whole_stream_size_limit,
            stream_size_counter: 0,
        }
    }

    pub fn capacity(&self) -> usize {
        self.buf.len()
    }

    pub fn available(&self) -> usize {
        self.filled - self.idx
    }

    pub fn unread(&self) -> &[u8] {
        &self.buf[self.idx..self.filled]
    }

    /// Makes at least `n` unread bytes available, reading from the stream as
    /// needed. Returns the number of unread bytes, which is less than `n` only
    /// at the end of the stream or when `n` exceeds the capacity.
    pub fn ensure(&mut self, n: usize) -> crate::Result<usize> {
        if self.available() >= n || self.eof {
            return Ok(self.available());
        }

        if self.buf.len() - self.filled < n - self.available() {
            self.compact();
        }

        while self.available() < n && self.filled < self.buf.len() {
            let read = match self.stream.read(&mut self.buf[self.filled..]) {
                Ok(0) => {
                    self.eof = true;
                    break;
                }
                Ok(read) => read,
                Err(err) if err.kind() == io::ErrorKind::Interrupted => continue,
                Err(err) => return Err(crate::Error::StreamReadFailed(err)),
            };

            self.filled += read;
            self.stream_size_counter += read as u64;

            if self.stream_size_counter > self.whole_stream_size_limit {
                return Err(crate::Error::StreamSizeExceeded {
                    limit: self.whole_stream_size_limit,
                });
            }
        }

        Ok(self.available())
    }

    /// Shifts the unread bytes to the front and moves every cursor with them.
    fn compact(&mut self) {
        let shift = self.idx;
        if shift == 0 {
            return;
        }

        trace!("compacting buffer: shifting {} unread bytes by {}", self.available(), shift);

        self.buf.copy_within(shift..self.filled, 0);
        self.filled -= shift;
        self.save_idx -= shift;
        // A located marker never precedes the read position.
        debug_assert!(self.boundary_idx.map_or(true, |idx| idx >= shift));
        self.boundary_idx = self.boundary_idx.map(|idx| idx - shift);
        self.idx = 0;
    }

    pub fn advance(&mut self, n: usize) {
        debug_assert!(n <= self.available());

        self.idx += n;
        if self.save_idx < self.idx {
            self.save_idx = self.idx;
        }
    }

    /// Consumes `len` bytes and returns them.
    pub fn take(&mut self, len: usize) -> &[u8] {
        let start = self.idx;
        self.advance(len);
        &self.buf[start..start + len]
    }

    /// Returns how many body bytes can be released before the next boundary,
    /// scanning and refilling as needed. Zero means the boundary starts at the
    /// read position.
    pub fn body_available(&mut self, marker: &[u8]) -> crate::Result<usize> {
        loop {
            self.scan_boundary(marker);

            let safe = self.save_idx - self.idx;
            if safe > 0 || self.boundary_idx.is_some() {
                return Ok(safe);
            }

            // Only a possible partial marker is left; it needs at least one more byte.
            let want = self.available() + 1;
            if self.ensure(want)? < want {
                return Err(crate::Error::IncompleteStream);
            }
        }
    }

    /// Discards body bytes up to the next boundary and returns how many were dropped.
    pub fn skip_body(&mut self, marker: &[u8]) -> crate::Result<u64> {
        let mut skipped = 0;

        loop {
            let len = self.body_available(marker)?;
            if len == 0 {
                return Ok(skipped);
            }

            self.advance(len);
            skipped += len as u64;
        }
    }

    /// Marks the read position as the start of a part body.
    pub fn begin_body(&mut self, marker: &[u8]) {
        self.save_idx = self.idx;
        self.boundary_idx = None;
        self.scan_boundary(marker);
    }
}
