//! Failure notices and inbound classification

use crate::constants::{FAIL_TO_DELIVER, NOTICE_FRAMES};
use crate::identity::{decode_attempts, encode_attempts, ReactorId};
use crate::{CodecError, Result};
use bytes::Bytes;
use network::Multipart;

/// Report that an envelope could not be delivered
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FailureNotice {
    pub destination: ReactorId,
    pub attempts: u32,
    pub payload: Bytes,
}

impl FailureNotice {
    pub fn into_multipart(self) -> Multipart {
        Multipart::from(vec![
            Bytes::from_static(FAIL_TO_DELIVER.as_bytes()),
            self.destination.to_frame(),
            encode_attempts(self.attempts),
            self.payload,
        ])
    }

    pub fn from_multipart(mut unit: Multipart) -> Result<Self> {
        if unit.len() != NOTICE_FRAMES {
            return Err(CodecError::FrameCount {
                context: "failure notice",
                expected: NOTICE_FRAMES,
                got: unit.len(),
            });
        }
        let marker = unit.pop_front().unwrap_or_default();
        if marker != FAIL_TO_DELIVER.as_bytes() {
            return Err(CodecError::MissingMarker);
        }

        let destination = unit.pop_front().unwrap_or_default();
        let attempts = unit.pop_front().unwrap_or_default();
        let payload = unit.pop_front().unwrap_or_default();
        Ok(Self {
            destination: ReactorId::from_frame(&destination)?,
            attempts: decode_attempts(&attempts)?,
            payload,
        })
    }
}

/// A unit arriving at a reactor
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Inbound {
    Message(Bytes),
    Failure(FailureNotice),
}

impl Inbound {
    /// Classify by shape
    ///
    /// A single frame is always a payload, even if its bytes equal the failure
    /// marker. A multi-frame unit must be a well-formed failure notice.
    pub fn classify(mut unit: Multipart) -> Result<Self> {
        match unit.len() {
            1 => Ok(Inbound::Message(unit.pop_front().unwrap_or_default())),
            _ if is_notice(&unit) => FailureNotice::from_multipart(unit).map(Inbound::Failure),
            got => Err(CodecError::FrameCount {
                context: "inbound unit",
                expected: 1,
                got,
            }),
        }
    }
}

fn is_notice(unit: &Multipart) -> bool {
    unit.front()
        .is_some_and(|marker| marker == FAIL_TO_DELIVER.as_bytes())
}
