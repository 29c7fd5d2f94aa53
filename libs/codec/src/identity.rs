//! Reactor identities and attempt counts
//!
//! An identity is encoded the same way whether it is presented to the
//! transport at connect time or carried as a destination frame, so the router
//! can route on the raw destination bytes without decoding them.

use crate::constants::{ATTEMPTS_WIDTH, IDENTITY_WIDTH};
use crate::{CodecError, Result};
use bytes::Bytes;
use std::fmt;

/// Stable numeric address of one reactor
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ReactorId(u64);

impl ReactorId {
    pub const fn new(id: u64) -> Self {
        Self(id)
    }

    pub const fn get(self) -> u64 {
        self.0
    }

    /// Big-endian fixed-width frame
    pub fn to_frame(self) -> Bytes {
        Bytes::copy_from_slice(&self.0.to_be_bytes())
    }

    pub fn from_frame(frame: &[u8]) -> Result<Self> {
        let bytes: [u8; IDENTITY_WIDTH] =
            frame.try_into().map_err(|_| CodecError::InvalidWidth {
                field: "identity",
                expected: IDENTITY_WIDTH,
                got: frame.len(),
            })?;
        Ok(Self(u64::from_be_bytes(bytes)))
    }
}

impl From<u64> for ReactorId {
    fn from(id: u64) -> Self {
        Self(id)
    }
}

impl fmt::Display for ReactorId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

pub fn encode_attempts(attempts: u32) -> Bytes {
    Bytes::copy_from_slice(&attempts.to_be_bytes())
}

pub fn decode_attempts(frame: &[u8]) -> Result<u32> {
    let bytes: [u8; ATTEMPTS_WIDTH] = frame.try_into().map_err(|_| CodecError::InvalidWidth {
        field: "attempts",
        expected: ATTEMPTS_WIDTH,
        got: frame.len(),
    })?;
    Ok(u32::from_be_bytes(bytes))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_identity_frame_is_big_endian() {
        let frame = ReactorId::new(7).to_frame();
        assert_eq!(&frame[..], &[0, 0, 0, 0, 0, 0, 0, 7]);
        assert_eq!(ReactorId::from_frame(&frame).unwrap(), ReactorId::new(7));
    }

    #[test]
    fn test_identity_rejects_wrong_width() {
        let err = ReactorId::from_frame(&[1, 2, 3]).unwrap_err();
        assert_eq!(
            err,
            CodecError::InvalidWidth {
                field: "identity",
                expected: 8,
                got: 3
            }
        );
    }

    #[test]
    fn test_attempts_codec() {
        assert_eq!(decode_attempts(&encode_attempts(3)).unwrap(), 3);
        assert_eq!(&encode_attempts(0)[..], &[0, 0, 0, 0]);
        assert!(decode_attempts(&[]).is_err());
        assert!(decode_attempts(&[0; 8]).is_err());
    }
}
