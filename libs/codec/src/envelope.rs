//! Envelopes
//!
//! [`Envelope`] is what a reactor sends; [`RoutedUnit`] is the same unit as
//! the router receives it, with the sender identity in front and nothing
//! decoded.

use crate::constants::{ENVELOPE_FRAMES, FAIL_TO_DELIVER};
use crate::identity::{decode_attempts, encode_attempts, ReactorId};
use crate::{CodecError, Result};
use bytes::Bytes;
use network::Multipart;

/// Destination, attempt count and opaque payload
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Envelope {
    pub destination: ReactorId,
    pub attempts: u32,
    pub payload: Bytes,
}

impl Envelope {
    /// First attempt at delivering `payload`
    pub fn new(destination: ReactorId, payload: impl Into<Bytes>) -> Self {
        Self::with_attempts(destination, 0, payload)
    }

    pub fn with_attempts(destination: ReactorId, attempts: u32, payload: impl Into<Bytes>) -> Self {
        Self {
            destination,
            attempts,
            payload: payload.into(),
        }
    }

    pub fn into_multipart(self) -> Multipart {
        Multipart::from(vec![
            self.destination.to_frame(),
            encode_attempts(self.attempts),
            self.payload,
        ])
    }

    pub fn from_multipart(mut unit: Multipart) -> Result<Self> {
        if unit.len() != ENVELOPE_FRAMES {
            return Err(CodecError::FrameCount {
                context: "envelope",
                expected: ENVELOPE_FRAMES,
                got: unit.len(),
            });
        }
        let (destination, attempts, payload) = take_three(&mut unit);
        Ok(Self {
            destination: ReactorId::from_frame(&destination)?,
            attempts: decode_attempts(&attempts)?,
            payload,
        })
    }
}

/// An envelope as received by the router: raw frames tagged with the sender
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RoutedUnit {
    pub sender: Bytes,
    pub destination: Bytes,
    pub attempts: Bytes,
    pub payload: Bytes,
}

impl RoutedUnit {
    /// Split `[sender, destination, attempts, payload]` without decoding
    pub fn split(mut unit: Multipart) -> Result<Self> {
        if unit.len() != ENVELOPE_FRAMES + 1 {
            return Err(CodecError::FrameCount {
                context: "routed unit",
                expected: ENVELOPE_FRAMES + 1,
                got: unit.len(),
            });
        }
        let sender = unit.pop_front().unwrap_or_default();
        let (destination, attempts, payload) = take_three(&mut unit);
        Ok(Self {
            sender,
            destination,
            attempts,
            payload,
        })
    }

    /// What the destination receives
    pub fn delivery(&self) -> Multipart {
        Multipart::from(vec![self.payload.clone()])
    }

    /// What the sender receives when delivery fails; frames are echoed verbatim
    pub fn into_failure_notice(self) -> Multipart {
        Multipart::from(vec![
            Bytes::from_static(FAIL_TO_DELIVER.as_bytes()),
            self.destination,
            self.attempts,
            self.payload,
        ])
    }
}

// Callers check the frame count first
fn take_three(unit: &mut Multipart) -> (Bytes, Bytes, Bytes) {
    let first = unit.pop_front().unwrap_or_default();
    let second = unit.pop_front().unwrap_or_default();
    let third = unit.pop_front().unwrap_or_default();
    (first, second, third)
}
