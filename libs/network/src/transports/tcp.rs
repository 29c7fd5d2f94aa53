//! TCP Network Transport Implementation

use super::{BoxedReader, BoxedWriter};
use std::net::SocketAddr;
use tokio::net::{TcpListener, TcpStream};
use tracing::debug;

pub(crate) async fn bind(host_port: &str) -> std::io::Result<(TcpListener, SocketAddr)> {
    let listener = TcpListener::bind(host_port).await?;
    let local = listener.local_addr()?;
    Ok((listener, local))
}

pub(crate) async fn accept(
    listener: &TcpListener,
) -> std::io::Result<(BoxedReader, BoxedWriter, String)> {
    let (stream, peer_addr) = listener.accept().await?;
    let (reader, writer) = split(stream)?;
    Ok((reader, writer, peer_addr.to_string()))
}

pub(crate) async fn connect(host_port: &str) -> std::io::Result<(BoxedReader, BoxedWriter)> {
    let stream = TcpStream::connect(host_port).await?;
    debug!(remote = %host_port, "TCP connection established");
    split(stream)
}

fn split(stream: TcpStream) -> std::io::Result<(BoxedReader, BoxedWriter)> {
    // Units are small and latency sensitive
    stream.set_nodelay(true)?;
    let (reader, writer) = stream.into_split();
    Ok((Box::new(reader), Box::new(writer)))
}
