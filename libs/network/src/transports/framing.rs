//! Unit framing
//!
//! On the stream a unit is a big-endian `u32` frame count followed by each
//! frame as a big-endian `u32` length and its bytes.

use super::{BoxedReader, BoxedWriter};
use crate::{Multipart, Result, TransportError};
use bytes::{BufMut, Bytes, BytesMut};
use tokio::io::{AsyncRead, AsyncReadExt, AsyncWrite, AsyncWriteExt};
use tokio::sync::mpsc;
use tokio_util::sync::CancellationToken;
use tracing::{debug, warn};

/// Frame slots reserved up front; the header count is untrusted
const PREALLOCATED_FRAMES: usize = 8;

/// Read one complete unit
///
/// Returns `Ok(None)` when the stream ends cleanly on a unit boundary.
pub(crate) async fn read_unit<R: AsyncRead + Unpin>(
    reader: &mut R,
    max_unit_size: usize,
) -> Result<Option<Multipart>> {
    let frame_count = match reader.read_u32().await {
        Ok(count) => count as usize,
        Err(e) if e.kind() == std::io::ErrorKind::UnexpectedEof => return Ok(None),
        Err(e) => return Err(e.into()),
    };

    let overhead = frame_count.saturating_mul(4).saturating_add(4);
    if overhead > max_unit_size {
        return Err(TransportError::protocol(format!(
            "Unit with {} frames exceeds maximum size {}",
            frame_count, max_unit_size
        )));
    }

    let mut budget = max_unit_size - overhead;
    let mut unit = Multipart::with_capacity(frame_count.min(PREALLOCATED_FRAMES));
    for _ in 0..frame_count {
        let len = reader.read_u32().await? as usize;
        if len > budget {
            return Err(TransportError::protocol(format!(
                "Unit exceeds maximum size {}",
                max_unit_size
            )));
        }
        budget -= len;

        // Grows with the bytes that actually arrive, not the declared length
        let mut frame = Vec::new();
        (&mut *reader).take(len as u64).read_to_end(&mut frame).await?;
        if frame.len() != len {
            return Err(std::io::Error::from(std::io::ErrorKind::UnexpectedEof).into());
        }
        unit.push_back(Bytes::from(frame));
    }

    Ok(Some(unit))
}

pub(crate) fn encode_unit(unit: &Multipart, buffer: &mut BytesMut) {
    buffer.reserve(unit.encoded_len());
    buffer.put_u32(unit.len() as u32);
    for frame in unit.iter() {
        buffer.put_u32(frame.len() as u32);
        buffer.extend_from_slice(frame);
    }
}

/// Write one unit with a single `write_all`, reusing `buffer`
pub(crate) async fn write_unit<W: AsyncWrite + Unpin>(
    writer: &mut W,
    unit: &Multipart,
    buffer: &mut BytesMut,
    max_unit_size: usize,
) -> Result<()> {
    ensure_within_limit(unit, max_unit_size)?;

    buffer.clear();
    encode_unit(unit, buffer);
    writer.write_all(buffer).await?;
    writer.flush().await?;
    Ok(())
}

pub(crate) fn ensure_within_limit(unit: &Multipart, max_unit_size: usize) -> Result<()> {
    let size = unit.encoded_len();
    if size > max_unit_size {
        return Err(TransportError::protocol(format!(
            "Unit size {} exceeds maximum {}",
            size, max_unit_size
        )));
    }
    Ok(())
}

/// Drain an outbound queue onto a stream until cancelled or the queue closes
pub(crate) async fn write_loop(
    mut writer: BoxedWriter,
    mut outbound: mpsc::Receiver<Multipart>,
    max_unit_size: usize,
    shutdown: CancellationToken,
) {
    let mut buffer = BytesMut::with_capacity(64 * 1024);
    loop {
        let unit = tokio::select! {
            _ = shutdown.cancelled() => break,
            unit = outbound.recv() => unit,
        };
        let Some(unit) = unit else { break };

        if let Err(e) = write_unit(&mut writer, &unit, &mut buffer, max_unit_size).await {
            warn!(error = %e, "Write failed, closing connection");
            break;
        }
    }

    let _ = writer.shutdown().await;
}

/// Forward every unit read from a stream into `inbound` until EOF, error or cancellation
///
/// A full `inbound` queue stops reading, which pushes back on the remote writer.
pub(crate) async fn read_loop(
    mut reader: BoxedReader,
    inbound: mpsc::Sender<Multipart>,
    max_unit_size: usize,
    shutdown: CancellationToken,
) {
    loop {
        let unit = tokio::select! {
            _ = shutdown.cancelled() => break,
            unit = read_unit(&mut reader, max_unit_size) => unit,
        };

        match unit {
            Ok(Some(unit)) => {
                let forwarded = tokio::select! {
                    _ = shutdown.cancelled() => break,
                    sent = inbound.send(unit) => sent,
                };
                if forwarded.is_err() {
                    break;
                }
            }
            Ok(None) => {
                debug!("Connection closed by remote");
                break;
            }
            Err(e) => {
                warn!(error = %e, "Read failed, closing connection");
                break;
            }
        }
    }
}
