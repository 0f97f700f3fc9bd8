//! Scatter-gather accumulator
//!
//! Collects an ordered list of descriptors for one message without copying
//! the bytes they describe. A descriptor records *where* its bytes live
//! (a static literal, the instance scratch region, the caller's key or
//! value, or one of the two ownership slots) and is resolved into a
//! [`std::io::IoSlice`] only when the caller asks for the output.
//!
//! ## Invariants
//! - At most `N` descriptors; appending more panics.
//! - `total_len` always equals the sum of descriptor lengths.
//! - At most one owned payload and one owned string per message.

use std::fmt;
use std::io::{self, Cursor, IoSlice, Write};

use bytes::Bytes;

/// Location of a descriptor's bytes
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum Segment {
    /// Protocol literal
    Static(&'static [u8]),

    /// Range of the instance scratch region
    Scratch { start: usize, end: usize },

    /// The caller's key
    Key,

    /// The caller's value, borrowed in place
    Value,

    /// The owned payload slot
    Payload,

    /// The owned string slot
    Text,
}

/// Fixed-capacity descriptor list plus its scratch region and ownership slots
///
/// `N` is the descriptor capacity, `S` the scratch capacity in bytes.
pub struct IovAccumulator<const N: usize, const S: usize> {
    segments: [Segment; N],
    count: usize,
    total_len: usize,

    scratch: [u8; S],
    scratch_len: usize,

    /// Keeps a value's bytes alive while a descriptor references them
    payload: Option<Bytes>,

    /// Keeps generated text (messages, joined stats) alive
    text: Option<String>,
}

impl<const N: usize, const S: usize> IovAccumulator<N, S> {
    /// Descriptor capacity
    pub const CAPACITY: usize = N;

    /// Scratch capacity in bytes
    pub const SCRATCH_CAPACITY: usize = S;

    pub fn new() -> Self {
        Self {
            segments: [Segment::Static(b""); N],
            count: 0,
            total_len: 0,
            scratch: [0u8; S],
            scratch_len: 0,
            payload: None,
            text: None,
        }
    }

    /// Reset to the empty state and release both ownership slots
    pub fn clear(&mut self) {
        self.count = 0;
        self.total_len = 0;
        self.scratch_len = 0;
        self.payload = None;
        self.text = None;
    }

    /// True when nothing is accumulated and no slot is held
    pub fn is_clear(&self) -> bool {
        self.count == 0
            && self.total_len == 0
            && self.scratch_len == 0
            && self.payload.is_none()
            && self.text.is_none()
    }

    /// Number of descriptors
    pub fn len(&self) -> usize {
        self.count
    }

    pub fn is_empty(&self) -> bool {
        self.count == 0
    }

    /// Running sum of descriptor lengths
    pub fn total_len(&self) -> usize {
        self.total_len
    }

    pub fn holds_payload(&self) -> bool {
        self.payload.is_some()
    }

    pub fn holds_text(&self) -> bool {
        self.text.is_some()
    }

    // -------------------------------------------------------------------------
    // Appending
    // -------------------------------------------------------------------------

    /// Add one descriptor of `len` bytes
    ///
    /// # Panics
    /// When the descriptor capacity is exhausted. Capacities are derived from
    /// the largest message any operation produces, so this is a sizing bug.
    pub(crate) fn append(&mut self, segment: Segment, len: usize) {
        assert!(
            self.count < N,
            "descriptor capacity {} exceeded appending {:?}",
            N,
            segment
        );
        self.segments[self.count] = segment;
        self.count += 1;
        self.total_len += len;
    }

    pub(crate) fn append_static(&mut self, bytes: &'static [u8]) {
        self.append(Segment::Static(bytes), bytes.len());
    }

    /// Copy raw bytes into scratch and reference them
    pub(crate) fn append_scratch(&mut self, bytes: &[u8]) {
        let start = self.scratch_len;
        let end = start + bytes.len();
        assert!(
            end <= S,
            "scratch capacity {} exceeded: need {} bytes",
            S,
            end
        );
        self.scratch[start..end].copy_from_slice(bytes);
        self.scratch_len = end;
        self.append(Segment::Scratch { start, end }, bytes.len());
    }

    /// Format into scratch and reference the result.
    ///
    /// `budget` is the worst-case width of this call site.
    ///
    /// # Panics
    /// If the budget does not fit the remaining scratch, or the formatted
    /// text is wider than the budget.
    pub(crate) fn append_fmt(&mut self, budget: usize, args: fmt::Arguments<'_>) {
        let start = self.scratch_len;
        assert!(
            start + budget <= S,
            "scratch capacity {} exceeded: {} used, budget {}",
            S,
            start,
            budget
        );

        let mut cursor = Cursor::new(&mut self.scratch[start..start + budget]);
        if cursor.write_fmt(args).is_err() {
            panic!("formatted field wider than its {} byte budget", budget);
        }

        let end = start + cursor.position() as usize;
        self.scratch_len = end;
        self.append(Segment::Scratch { start, end }, end - start);
    }

    /// Take ownership of a payload and reference it
    ///
    /// # Panics
    /// If a payload is already held since the last clear.
    pub(crate) fn append_payload(&mut self, payload: Bytes) {
        assert!(self.payload.is_none(), "payload slot already filled");
        let len = payload.len();
        self.payload = Some(payload);
        self.append(Segment::Payload, len);
    }

    /// Take ownership of a string and reference it
    ///
    /// # Panics
    /// If a string is already held since the last clear.
    pub(crate) fn append_text(&mut self, text: String) {
        assert!(self.text.is_none(), "string slot already filled");
        let len = text.len();
        self.text = Some(text);
        self.append(Segment::Text, len);
    }

    // -------------------------------------------------------------------------
    // Output
    // -------------------------------------------------------------------------

    /// Resolve descriptors against the caller's key and value
    pub(crate) fn iovecs<'a>(&'a self, key: &'a [u8], value: &'a [u8]) -> IoVecs<'a, N> {
        let mut slices = [IoSlice::new(&[]); N];
        for (slot, segment) in slices.iter_mut().zip(&self.segments[..self.count]) {
            let bytes: &'a [u8] = match *segment {
                Segment::Static(bytes) => bytes,
                Segment::Scratch { start, end } => &self.scratch[start..end],
                Segment::Key => key,
                Segment::Value => value,
                Segment::Payload => self.payload.as_deref().unwrap_or_default(),
                Segment::Text => self.text.as_deref().map(str::as_bytes).unwrap_or_default(),
            };
            *slot = IoSlice::new(bytes);
        }

        IoVecs {
            slices,
            count: self.count,
            total_len: self.total_len,
        }
    }
}

impl<const N: usize, const S: usize> Default for IovAccumulator<N, S> {
    fn default() -> Self {
        Self::new()
    }
}

impl<const N: usize, const S: usize> fmt::Debug for IovAccumulator<N, S> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("IovAccumulator")
            .field("segments", &&self.segments[..self.count])
            .field("total_len", &self.total_len)
            .field("scratch_len", &self.scratch_len)
            .field("payload", &self.payload.as_ref().map(Bytes::len))
            .field("text", &self.text.as_ref().map(String::len))
            .finish()
    }
}

// =============================================================================
// IoVecs
// =============================================================================

/// Descriptors for one prepared message.
///
/// Borrows the encoder and the caller's key/value, so the encoder cannot be
/// reused until this is dropped.
#[derive(Clone, Copy)]
pub struct IoVecs<'a, const N: usize> {
    slices: [IoSlice<'a>; N],
    count: usize,
    total_len: usize,
}

impl<'a, const N: usize> IoVecs<'a, N> {
    /// Descriptors ready for `write_vectored`
    pub fn as_slices(&self) -> &[IoSlice<'a>] {
        &self.slices[..self.count]
    }

    /// Number of descriptors
    pub fn len(&self) -> usize {
        self.count
    }

    pub fn is_empty(&self) -> bool {
        self.count == 0
    }

    /// Total bytes described
    pub fn total_len(&self) -> usize {
        self.total_len
    }

    /// Gather into one buffer
    pub fn to_vec(&self) -> Vec<u8> {
        let mut out = Vec::with_capacity(self.total_len);
        for slice in self.as_slices() {
            out.extend_from_slice(slice);
        }
        out
    }

    /// Write every descriptor, retrying partial vectored writes
    pub fn write_to<W: Write>(&self, writer: &mut W) -> io::Result<()> {
        let mut slices = self.slices;
        let mut bufs: &mut [IoSlice<'a>] = &mut slices[..self.count];
        IoSlice::advance_slices(&mut bufs, 0);

        while !bufs.is_empty() {
            match writer.write_vectored(bufs) {
                Ok(0) => {
                    return Err(io::Error::new(
                        io::ErrorKind::WriteZero,
                        "failed to write whole message",
                    ));
                }
                Ok(n) => IoSlice::advance_slices(&mut bufs, n),
                Err(e) if e.kind() == io::ErrorKind::Interrupted => {}
                Err(e) => return Err(e),
            }
        }
        Ok(())
    }
}

impl<const N: usize> fmt::Debug for IoVecs<'_, N> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("IoVecs")
            .field("count", &self.count)
            .field("total_len", &self.total_len)
            .finish()
    }
}
