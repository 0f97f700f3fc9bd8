//! Value payloads
//!
//! A value may arrive as several fragments (e.g. chained receive buffers).
//! Encoders reference it with a single descriptor, so it is coalesced first;
//! a value that is already one fragment is handed over without copying.

use bytes::{Bytes, BytesMut};

/// A possibly fragmented byte payload
#[derive(Debug, Clone, Default)]
pub struct Value {
    /// Non-empty fragments in order
    fragments: Vec<Bytes>,
}

impl Value {
    /// Create an empty value
    pub fn new() -> Self {
        Self::default()
    }

    /// Build a value from fragments, dropping empty ones
    pub fn from_fragments<I>(fragments: I) -> Self
    where
        I: IntoIterator<Item = Bytes>,
    {
        Self {
            fragments: fragments.into_iter().filter(|f| !f.is_empty()).collect(),
        }
    }

    /// Total length across all fragments
    pub fn len(&self) -> usize {
        self.fragments.iter().map(Bytes::len).sum()
    }

    pub fn is_empty(&self) -> bool {
        self.fragments.is_empty()
    }

    pub fn fragment_count(&self) -> usize {
        self.fragments.len()
    }

    /// The fragments in order
    pub fn fragments(&self) -> &[Bytes] {
        &self.fragments
    }

    /// True when the value can be referenced by one descriptor as-is
    pub fn is_contiguous(&self) -> bool {
        self.fragments.len() <= 1
    }

    /// Borrow the bytes if the value is contiguous
    pub fn as_contiguous(&self) -> Option<&[u8]> {
        match self.fragments.as_slice() {
            [] => Some(&[][..]),
            [single] => Some(single.as_ref()),
            _ => None,
        }
    }

    /// Merge all fragments into one region, consuming the value.
    ///
    /// Zero-copy for empty and single-fragment values.
    pub fn coalesce(mut self) -> Bytes {
        match self.fragments.len() {
            0 => Bytes::new(),
            1 => self.fragments.swap_remove(0),
            _ => Self::concat(&self.fragments),
        }
    }

    /// Contiguous copy of the value without consuming it.
    ///
    /// Only copies data when there is more than one fragment.
    pub fn to_bytes(&self) -> Bytes {
        match self.fragments.as_slice() {
            [] => Bytes::new(),
            [single] => single.clone(),
            many => Self::concat(many),
        }
    }

    fn concat(fragments: &[Bytes]) -> Bytes {
        let total = fragments.iter().map(Bytes::len).sum();
        let mut merged = BytesMut::with_capacity(total);
        for fragment in fragments {
            merged.extend_from_slice(fragment);
        }
        merged.freeze()
    }
}

/// Values compare by content, not by fragmentation
impl PartialEq for Value {
    fn eq(&self, other: &Self) -> bool {
        self.len() == other.len()
            && self
                .fragments
                .iter()
                .flat_map(|f| f.iter())
                .eq(other.fragments.iter().flat_map(|f| f.iter()))
    }
}

impl Eq for Value {}

impl From<Bytes> for Value {
    fn from(bytes: Bytes) -> Self {
        Self::from_fragments([bytes])
    }
}

impl From<Vec<u8>> for Value {
    fn from(bytes: Vec<u8>) -> Self {
        Self::from(Bytes::from(bytes))
    }
}

impl From<String> for Value {
    fn from(text: String) -> Self {
        Self::from(Bytes::from(text))
    }
}

impl From<&'static [u8]> for Value {
    fn from(bytes: &'static [u8]) -> Self {
        Self::from(Bytes::from_static(bytes))
    }
}

impl From<&'static str> for Value {
    fn from(text: &'static str) -> Self {
        Self::from(Bytes::from_static(text.as_bytes()))
    }
}
