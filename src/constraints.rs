use crate::constants;
use crate::size_limit::SizeLimit;

/// Represents the parser configuration: the capacity of its internal buffer
/// and the size limits applied to the incoming stream.
///
/// # Examples
///
/// ```
/// use mimepart::{Constraints, Multipart, SizeLimit};
///
/// let data = "--X-BOUNDARY\r\nContent-Disposition: form-data; name=\"my_text_field\"\r\n\r\nabcd\r\n--X-BOUNDARY--\r\n";
///
/// let constraints = Constraints::new()
///     .buffer_size(16 * 1024)
///     .size_limit(
///         SizeLimit::new()
///             // Set 15mb as size limit for the whole stream body.
///             .whole_stream(15 * 1024 * 1024)
///             // Set 10mb as size limit for all parts.
///             .per_part(10 * 1024 * 1024)
///             // Set 30kb as size limit for a specific part.
///             .for_part("my_text_field", 30 * 1024),
///     );
///
/// let mut multipart = Multipart::with_constraints(data.as_bytes(), "X-BOUNDARY", constraints);
///
/// while let Some(part) = multipart.next_part().unwrap() {
///     println!("Part: {:?}", part.text())
/// }
/// ```
#[derive(Debug, Clone)]
pub struct Constraints {
    pub(crate) buffer_size: usize,
    pub(crate) size_limit: SizeLimit,
}

impl Constraints {
    /// Creates a set of rules with default behaviour.
    pub fn new() -> Constraints {
        Constraints::default()
    }

    /// Sets the capacity of the parser buffer. A single header line must fit
    /// into it.
    ///
    /// Values too small to hold a boundary marker split across two reads are
    /// raised to that minimum.
    pub fn buffer_size(mut self, buffer_size: usize) -> Constraints {
        self.buffer_size = buffer_size;
        self
    }

    /// Applies rules on the stream and part sizes.
    pub fn size_limit(mut self, size_limit: SizeLimit) -> Constraints {
        self.size_limit = size_limit;
        self
    }

    pub(crate) fn buffer_size_for(&self, marker_len: usize) -> usize {
        self.buffer_size.max(constants::min_buffer_size(marker_len))
    }
}

impl Default for Constraints {
    fn default() -> Self {
        Constraints {
            buffer_size: constants::DEFAULT_BUFFER_SIZE,
            size_limit: SizeLimit::default(),
        }
    }
}
