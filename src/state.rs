use std::io::Read;

use bytes::Bytes;

use crate::buffer::StreamBuffer;

pub(crate) struct MultipartState<R> {
    pub(crate) buffer: StreamBuffer<R>,
    pub(crate) marker: Box<[u8]>,
    pub(crate) stage: StreamingStage,
    pub(crate) next_part_idx: usize,
    pub(crate) curr_part_name: Option<String>,
    pub(crate) curr_part_size_limit: u64,
    pub(crate) curr_part_size_counter: u64,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum StreamingStage {
    /// Before the first boundary, bytes are discarded.
    Preamble,
    /// Positioned at a boundary, headers are being read.
    AtPart,
    /// The body of the part with this index is readable.
    InBody { part_idx: usize },
    /// The terminating boundary has been consumed.
    Done,
}

/// Whether a part body may still be read.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum BodyActivity {
    Active,
    Inactive,
}

impl<R: Read> MultipartState<R> {
    pub(crate) fn activity(&self, part_idx: usize) -> BodyActivity {
        match self.stage {
            StreamingStage::InBody { part_idx: curr } if curr == part_idx => BodyActivity::Active,
            _ => BodyActivity::Inactive,
        }
    }

    fn ensure_active(&self, part_idx: usize) -> crate::Result<()> {
        match self.activity(part_idx) {
            BodyActivity::Active => Ok(()),
            BodyActivity::Inactive => Err(crate::Error::StreamAlreadyAdvanced { part_index: part_idx }),
        }
    }

    /// Copies body bytes of the given part into `out`. Zero means the part is
    /// complete.
    pub(crate) fn read_part_data(&mut self, part_idx: usize, out: &mut [u8]) -> crate::Result<usize> {
        self.ensure_active(part_idx)?;

        if out.is_empty() {
            return Ok(0);
        }

        let len = self.buffer.body_available(&self.marker)?.min(out.len());
        self.count_part_bytes(len as u64)?;
        out[..len].copy_from_slice(self.buffer.take(len));

        Ok(len)
    }

    /// Returns every body byte of the given part that is already known to
    /// precede the next boundary.
    pub(crate) fn read_part_chunk(&mut self, part_idx: usize) -> crate::Result<Option<Bytes>> {
        self.ensure_active(part_idx)?;

        let len = self.buffer.body_available(&self.marker)?;
        if len == 0 {
            return Ok(None);
        }

        self.count_part_bytes(len as u64)?;
        Ok(Some(Bytes::copy_from_slice(self.buffer.take(len))))
    }

    /// Discards whatever is left before the next boundary: the preamble or the
    /// unread rest of the current part.
    pub(crate) fn drain_current(&mut self) -> crate::Result<()> {
        if let StreamingStage::InBody { .. } = self.stage {
            let skipped = self.buffer.skip_body(&self.marker)?;
            self.stage = StreamingStage::AtPart;

            // The parser already sits at the next boundary when this fails.
            self.count_part_bytes(skipped)?;
        } else {
            let skipped = self.buffer.skip_body(&self.marker)?;
            if skipped > 0 {
                trace!("discarded {} bytes before the boundary", skipped);
            }
        }

        Ok(())
    }

    /// Adds `len` bytes to the current part, leaving the counter untouched if
    /// that would exceed the part's limit.
    fn count_part_bytes(&mut self, len: u64) -> crate::Result<()> {
        let counter = self.curr_part_size_counter.saturating_add(len);

        if counter > self.curr_part_size_limit {
            return Err(crate::Error::PartSizeExceeded {
                limit: self.curr_part_size_limit,
                part_name: self.curr_part_name.clone(),
            });
        }

        self.curr_part_size_counter = counter;
        Ok(())
    }
}
