//! Multipart units
//!
//! A unit is an ordered list of opaque frames delivered atomically.

use bytes::Bytes;
use std::collections::VecDeque;

/// An ordered, atomically delivered list of frames
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Multipart {
    frames: VecDeque<Bytes>,
}

impl Multipart {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            frames: VecDeque::with_capacity(capacity),
        }
    }

    /// Append a frame
    pub fn push_back(&mut self, frame: impl Into<Bytes>) {
        self.frames.push_back(frame.into());
    }

    /// Prepend a frame (used by routers to tag the sender identity)
    pub fn push_front(&mut self, frame: impl Into<Bytes>) {
        self.frames.push_front(frame.into());
    }

    /// Take the next frame in order
    pub fn pop_front(&mut self) -> Option<Bytes> {
        self.frames.pop_front()
    }

    pub fn front(&self) -> Option<&Bytes> {
        self.frames.front()
    }

    pub fn len(&self) -> usize {
        self.frames.len()
    }

    pub fn is_empty(&self) -> bool {
        self.frames.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &Bytes> {
        self.frames.iter()
    }

    /// Size of the unit on the wire: frame count prefix plus a length prefix per frame
    pub fn encoded_len(&self) -> usize {
        4 + self.frames.iter().map(|f| 4 + f.len()).sum::<usize>()
    }
}

impl From<Vec<Bytes>> for Multipart {
    fn from(frames: Vec<Bytes>) -> Self {
        Self {
            frames: frames.into(),
        }
    }
}

impl FromIterator<Bytes> for Multipart {
    fn from_iter<I: IntoIterator<Item = Bytes>>(iter: I) -> Self {
        Self {
            frames: iter.into_iter().collect(),
        }
    }
}

impl IntoIterator for Multipart {
    type Item = Bytes;
    type IntoIter = std::collections::vec_deque::IntoIter<Bytes>;

    fn into_iter(self) -> Self::IntoIter {
        self.frames.into_iter()
    }
}
