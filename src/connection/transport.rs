//! Transport abstraction (plain TCP, TLS over TCP, or UDP)

use crate::{Error, Result};
use std::time::Duration;
use tokio::io::AsyncWriteExt;
use tokio::net::{TcpStream, UdpSocket};

/// Transport layer abstraction
pub enum Transport {
    /// Plain TCP connection
    Tcp(TcpStream),
    /// TLS-encrypted TCP connection
    Tls(Box<tokio_rustls::client::TlsStream<TcpStream>>),
    /// Connected UDP socket (one frame per datagram)
    Udp(UdpSocket),
}

impl std::fmt::Debug for Transport {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Transport::Tcp(_) => f.write_str("Transport::Tcp(TcpStream)"),
            Transport::Tls(_) => f.write_str("Transport::Tls(TlsStream)"),
            Transport::Udp(_) => f.write_str("Transport::Udp(UdpSocket)"),
        }
    }
}

impl Transport {
    /// Connect via plain TCP, applying the OS-level keepalive interval.
    pub async fn connect_tcp(host: &str, port: u16, keepalive: Duration) -> Result<Self> {
        let stream = TcpStream::connect((host, port)).await?;

        if keepalive > Duration::ZERO {
            let params = socket2::TcpKeepalive::new().with_time(keepalive);
            socket2::SockRef::from(&stream).set_tcp_keepalive(&params)?;
        }

        Ok(Transport::Tcp(stream))
    }

    /// Connect via UDP (bind an ephemeral local port, then connect).
    pub async fn connect_udp(host: &str, port: u16) -> Result<Self> {
        let addr = tokio::net::lookup_host((host, port))
            .await?
            .next()
            .ok_or_else(|| Error::Config(format!("host '{}' did not resolve", host)))?;

        let bind_addr = if addr.is_ipv4() { "0.0.0.0:0" } else { "[::]:0" };
        let socket = UdpSocket::bind(bind_addr).await?;
        socket.connect(addr).await?;

        Ok(Transport::Udp(socket))
    }

    /// Upgrade a plain TCP transport to TLS.
    ///
    /// Consumes `self` and returns a new `Transport` with a TLS-encrypted
    /// stream. The handshake is performed before returning; on failure the
    /// raw connection is dropped (closed) and only the error propagates.
    pub async fn upgrade_to_tls(
        self,
        tls_config: &super::TlsConfig,
        server_name: &str,
    ) -> Result<Self> {
        match self {
            Transport::Tcp(tcp_stream) => {
                let parsed = super::parse_server_name(server_name)?;
                let sni = rustls_pki_types::ServerName::try_from(parsed).map_err(|_| {
                    Error::Config(format!("invalid server name for TLS: {}", server_name))
                })?;

                let client_config = tls_config.client_config();
                let tls_connector = tokio_rustls::TlsConnector::from(client_config);
                let tls_stream = tls_connector
                    .connect(sni, tcp_stream)
                    .await
                    .map_err(|e| Error::Tls(format!("TLS handshake failed: {}", e)))?;

                Ok(Transport::Tls(Box::new(tls_stream)))
            }
            Transport::Tls(_) => Err(Error::Config(
                "transport is already TLS-encrypted".into(),
            )),
            Transport::Udp(_) => Err(Error::Config(
                "TLS is only supported for TCP connections".into(),
            )),
        }
    }

    /// Write all bytes to the transport.
    pub async fn write_all(&mut self, buf: &[u8]) -> Result<()> {
        match self {
            Transport::Tcp(stream) => stream.write_all(buf).await?,
            Transport::Tls(stream) => stream.write_all(buf).await?,
            Transport::Udp(socket) => {
                socket.send(buf).await?;
            }
        }
        Ok(())
    }

    /// Flush the transport.
    pub async fn flush(&mut self) -> Result<()> {
        match self {
            Transport::Tcp(stream) => stream.flush().await?,
            Transport::Tls(stream) => stream.flush().await?,
            // Datagrams are not buffered
            Transport::Udp(_) => {}
        }
        Ok(())
    }

    /// Shutdown the transport.
    pub async fn shutdown(&mut self) -> Result<()> {
        match self {
            Transport::Tcp(stream) => stream.shutdown().await?,
            Transport::Tls(stream) => stream.shutdown().await?,
            // UDP sockets release on drop
            Transport::Udp(_) => {}
        }
        Ok(())
    }
}
