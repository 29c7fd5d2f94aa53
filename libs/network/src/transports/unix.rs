//! Unix Domain Socket Transport
//!
//! Local IPC transport for routers and reactors on the same machine.

use super::{BoxedReader, BoxedWriter};
use std::io;
use std::path::{Path, PathBuf};
use tokio::net::{UnixListener, UnixStream};
use tracing::{debug, info};

/// A bound Unix socket that removes its socket file on drop
pub(crate) struct UnixBinding {
    listener: UnixListener,
    path: PathBuf,
}

impl UnixBinding {
    /// Bind to a socket path
    ///
    /// A leftover socket file from a dead process is removed; a socket file
    /// with a live listener behind it is reported as `AddrInUse`.
    pub(crate) async fn bind(path: &Path) -> io::Result<Self> {
        if path.exists() {
            if UnixStream::connect(path).await.is_ok() {
                return Err(io::Error::new(
                    io::ErrorKind::AddrInUse,
                    format!("socket {} already has a listener", path.display()),
                ));
            }
            std::fs::remove_file(path)?;
            info!("Removed stale socket file: {}", path.display());
        }

        if let Some(parent) = path.parent() {
            if !parent.as_os_str().is_empty() {
                std::fs::create_dir_all(parent)?;
            }
        }

        let listener = UnixListener::bind(path)?;
        Ok(Self {
            listener,
            path: path.to_path_buf(),
        })
    }

    pub(crate) async fn accept(&self) -> io::Result<(BoxedReader, BoxedWriter, String)> {
        let (stream, _) = self.listener.accept().await?;
        let (reader, writer) = stream.into_split();
        Ok((
            Box::new(reader),
            Box::new(writer),
            self.path.display().to_string(),
        ))
    }
}

impl Drop for UnixBinding {
    fn drop(&mut self) {
        if self.path.exists() {
            let _ = std::fs::remove_file(&self.path);
        }
    }
}

pub(crate) async fn connect(path: &Path) -> io::Result<(BoxedReader, BoxedWriter)> {
    let stream = UnixStream::connect(path).await?;
    debug!("Connected to Unix socket: {:?}", path);
    let (reader, writer) = stream.into_split();
    Ok((Box::new(reader), Box::new(writer)))
}
