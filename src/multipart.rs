use std::io::Read;
use std::sync::Arc;

use spin::mutex::spin::SpinMutex as Mutex;

use crate::boundary::BoundaryKind;
use crate::buffer::StreamBuffer;
use crate::constants;
use crate::constraints::Constraints;
use crate::content_disposition::ContentDisposition;
use crate::state::{MultipartState, StreamingStage};
use crate::Part;

/// Represents the implementation of a MIME multipart body parser.
///
/// This will parse the source reader into [`Part`] instances, one at a time
/// and in stream order, through [`next_part`](Multipart::next_part) or its
/// [`Iterator`] implementation. Memory use is bounded by the buffer size set in
/// [`Constraints`], no matter how large the parts are.
///
/// Only the most recently returned [`Part`] is readable. Asking for the next
/// part discards the unread rest of the current one.
///
/// # Examples
///
/// ```
/// use mimepart::Multipart;
///
/// let data = "--X-BOUNDARY\r\nContent-Disposition: form-data; name=\"my_text_field\"\r\n\r\nabcd\r\n--X-BOUNDARY--\r\n";
/// let mut multipart = Multipart::new(data.as_bytes(), "X-BOUNDARY");
///
/// while let Some(part) = multipart.next_part().unwrap() {
///     println!("Part: {:?}", part.text())
/// }
/// ```
pub struct Multipart<R> {
    state: Arc<Mutex<MultipartState<R>>>,
    constraints: Constraints,
    fused: bool,
}

impl<R: Read> Multipart<R> {
    /// Construct a new `Multipart` instance with the given reader and the
    /// boundary.
    ///
    /// The boundary is used verbatim; see [`parse_boundary`](crate::parse_boundary)
    /// to extract it from a `Content-Type` value.
    pub fn new<B: Into<String>>(reader: R, boundary: B) -> Multipart<R> {
        Multipart::with_constraints(reader, boundary, Constraints::default())
    }

    /// Construct a new `Multipart` instance with the given reader, the
    /// boundary and some [`Constraints`].
    pub fn with_constraints<B: Into<String>>(reader: R, boundary: B, constraints: Constraints) -> Multipart<R> {
        let marker = constants::boundary_marker(&boundary.into());
        let buffer_size = constraints.buffer_size_for(marker.len());

        let state = MultipartState {
            buffer: StreamBuffer::new(reader, buffer_size, constraints.size_limit.whole_stream),
            marker,
            stage: StreamingStage::Preamble,
            next_part_idx: 0,
            curr_part_name: None,
            curr_part_size_limit: constraints.size_limit.per_part,
            curr_part_size_counter: 0,
        };

        Multipart {
            state: Arc::new(Mutex::new(state)),
            constraints,
            fused: false,
        }
    }

    /// Yields the next [`Part`] if available.
    ///
    /// The first call discards the preamble. Every later call first drains
    /// the body of the previous part, which then stops being readable. Once the
    /// terminating boundary has been seen this keeps returning `Ok(None)`.
    pub fn next_part(&mut self) -> crate::Result<Option<Part<R>>> {
        let mut state = self.state.lock();

        if state.stage == StreamingStage::Done {
            return Ok(None);
        }

        state.drain_current()?;
        state.stage = StreamingStage::AtPart;

        let state = &mut *state;
        if state.buffer.read_boundary(&state.marker)? == BoundaryKind::End {
            debug!("terminating boundary reached after {} parts", state.next_part_idx);
            state.stage = StreamingStage::Done;
            return Ok(None);
        }

        let headers = state.buffer.read_headers()?;
        state.buffer.begin_body(&state.marker);

        let part_idx = state.next_part_idx;
        state.next_part_idx += 1;

        let content_disposition = ContentDisposition::parse(&headers);

        state.curr_part_size_limit = self
            .constraints
            .size_limit
            .extract_size_limit_for(content_disposition.part_name.as_deref());
        state.curr_part_name = content_disposition.part_name.clone();
        state.curr_part_size_counter = 0;
        state.stage = StreamingStage::InBody { part_idx };

        debug!("part {} started with {} headers", part_idx, headers.len());

        Ok(Some(Part::new(
            Arc::clone(&self.state),
            headers,
            part_idx,
            content_disposition,
        )))
    }

    /// Yields the next [`Part`] with its positioning index as a tuple
    /// `(usize, Part)`.
    ///
    /// # Examples
    ///
    /// ```
    /// use mimepart::Multipart;
    ///
    /// let data = "--X-BOUNDARY\r\nContent-Disposition: form-data; name=\"my_text_field\"\r\n\r\nabcd\r\n--X-BOUNDARY--\r\n";
    /// let mut multipart = Multipart::new(data.as_bytes(), "X-BOUNDARY");
    ///
    /// while let Some((idx, part)) = multipart.next_part_with_idx().unwrap() {
    ///     println!("Index: {:?}, Content: {:?}", idx, part.text())
    /// }
    /// ```
    pub fn next_part_with_idx(&mut self) -> crate::Result<Option<(usize, Part<R>)>> {
        self.next_part().map(|part| part.map(|part| (part.index(), part)))
    }
}

impl<R> std::fmt::Debug for Multipart<R> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Multipart")
            .field("constraints", &self.constraints)
            .field("fused", &self.fused)
            .finish()
    }
}

/// Yields parts until the terminating boundary. Stops after the first error.
impl<R: Read> Iterator for Multipart<R> {
    type Item = crate::Result<Part<R>>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.fused {
            return None;
        }

        let next = self.next_part().transpose();
        if !matches!(next, Some(Ok(_))) {
            self.fused = true;
        }

        next
    }
}
