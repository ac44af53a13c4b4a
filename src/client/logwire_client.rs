//! LogwireClient implementation

use crate::connection::{ConnectOptions, ConnectionState, Protocol, Transport};
use crate::framing;
use crate::metrics::{counters, histograms, labels};
use crate::{Error, Result};
use bytes::BytesMut;
use std::time::{Duration, Instant};
use tokio::sync::Mutex;

/// Inner connection slot: everything mutated by a write lives behind one
/// lock so concurrent writers never interleave partial frames and the
/// redial swap cannot race an in-flight write.
struct Conn {
    transport: Transport,
    state: ConnectionState,
    /// Reserved for response decoding; the wire protocol is write-only today.
    #[allow(dead_code)]
    read_buf: BytesMut,
}

/// Client handle for a Logstash-style collector connection.
///
/// One handle owns exactly one active transport. The handle is designed to
/// be shared: wrap it in an `Arc` and call [`write`](Self::write) from as
/// many tasks as needed; each framed write is atomic on the wire.
///
/// # Examples
///
/// ```no_run
/// # async fn example() -> logwire::Result<()> {
/// use logwire::{ConnectOptions, LogwireClient};
///
/// let client = LogwireClient::connect("logs.example.com", 5000, ConnectOptions::default()).await?;
/// client.write(br#"{"level":"info","msg":"service started"}"#).await?;
/// client.close().await?;
/// # Ok(())
/// # }
/// ```
pub struct LogwireClient {
    host: String,
    port: u16,
    address: String,
    options: ConnectOptions,
    conn: Mutex<Conn>,
}

impl LogwireClient {
    /// Connect to a collector at `host:port` with the given options.
    ///
    /// Dials with the selected protocol and, if TLS is enabled, performs the
    /// handshake before returning, so a returned client is always fully
    /// usable. The SNI server name comes from the TLS configuration when
    /// set, otherwise it is derived from `host`.
    ///
    /// # Errors
    ///
    /// * [`Error::Config`] - empty host, zero port, or TLS requested over UDP
    /// * [`Error::Io`] - dial failure (refused, unresolvable, unreachable)
    /// * [`Error::Tls`] - handshake failure (the raw socket is closed first)
    pub async fn connect(
        host: impl Into<String>,
        port: u16,
        options: ConnectOptions,
    ) -> Result<Self> {
        let host = host.into();
        if host.is_empty() {
            return Err(Error::Config("host must not be empty".into()));
        }
        if port == 0 {
            return Err(Error::Config("port must be a positive integer".into()));
        }
        if options.use_tls && options.protocol == Protocol::Udp {
            return Err(Error::Config(
                "TLS is only supported for TCP connections".into(),
            ));
        }

        let address = format!("{}:{}", host, port);
        let transport = dial(&host, port, &options).await?;

        tracing::info!(
            address = %address,
            protocol = %options.protocol,
            tls = options.use_tls,
            "connected to collector"
        );

        Ok(Self {
            host,
            port,
            address,
            options,
            conn: Mutex::new(Conn {
                transport,
                state: ConnectionState::Connected,
                read_buf: BytesMut::with_capacity(8192),
            }),
        })
    }

    /// The `host:port` address this client dials.
    pub fn address(&self) -> &str {
        &self.address
    }

    /// The resolved option set this client was established with.
    pub fn options(&self) -> &ConnectOptions {
        &self.options
    }

    /// Current connection state.
    pub async fn state(&self) -> ConnectionState {
        self.conn.lock().await.state
    }

    /// Frame and write one record.
    ///
    /// Any CR/LF bytes at either end of `payload` are trimmed, one CRLF is
    /// appended, and the frame is written as a single logical write bounded
    /// by the configured write timeout. On success the total byte count
    /// written (trimmed payload + delimiter) is returned.
    ///
    /// If the write fails with a broken pipe, the client redials the stored
    /// address with the stored options exactly once so *subsequent* writes
    /// find a live transport. The failed write itself is never retried and
    /// its error is returned: a record that did not reach the collector is
    /// the caller's to resubmit.
    ///
    /// # Errors
    ///
    /// * [`Error::ConnectionClosed`] - the client was closed
    /// * [`Error::WriteTimeout`] - the write deadline elapsed
    /// * [`Error::Io`] - transport failure (broken pipe included)
    pub async fn write(&self, payload: &[u8]) -> Result<usize> {
        let mut conn = self.conn.lock().await;
        if conn.state.is_closed() {
            return Err(Error::ConnectionClosed);
        }

        let framed = framing::frame(payload);
        let started = Instant::now();

        match self.write_frame(&mut conn, &framed).await {
            Ok(()) => {
                counters::write_completed(labels::OUTCOME_OK);
                histograms::write_duration(started.elapsed().as_millis() as u64);
                Ok(framed.len())
            }
            Err(err) => {
                if err.is_broken_pipe() {
                    counters::write_completed(labels::OUTCOME_BROKEN_PIPE);
                    tracing::warn!(
                        address = %self.address,
                        error = %err,
                        "broken pipe during write, redialing"
                    );
                    self.redial(&mut conn).await;
                } else {
                    let outcome = match &err {
                        Error::WriteTimeout(_) => labels::OUTCOME_TIMEOUT,
                        _ => labels::OUTCOME_ERROR,
                    };
                    counters::write_completed(outcome);
                }
                Err(err)
            }
        }
    }

    /// Write the framed bytes under the per-call write deadline.
    async fn write_frame(&self, conn: &mut Conn, framed: &[u8]) -> Result<()> {
        let write_timeout = self.options.write_timeout;
        if write_timeout > Duration::ZERO {
            // The deadline is a point in time derived on every call, not a
            // persistent timer on the socket.
            match tokio::time::timeout(write_timeout, write_and_flush(&mut conn.transport, framed))
                .await
            {
                Ok(result) => result,
                Err(_) => Err(Error::WriteTimeout(write_timeout)),
            }
        } else {
            write_and_flush(&mut conn.transport, framed).await
        }
    }

    /// Redial the stored address with the stored options, swapping the
    /// transport in place under the connection lock.
    ///
    /// Failures are logged rather than propagated: the triggering write's
    /// error already carries the caller-visible failure.
    async fn redial(&self, conn: &mut Conn) {
        counters::redial_attempted();
        match dial(&self.host, self.port, &self.options).await {
            Ok(transport) => {
                conn.transport = transport;
                if conn.state.transition(ConnectionState::Connected).is_err() {
                    // Closed handles never reach the redial path while the
                    // lock is held.
                    tracing::debug!("state transition rejected after redial");
                }
                counters::redial_completed(labels::OUTCOME_OK);
                tracing::info!(address = %self.address, "redial succeeded, transport replaced");
            }
            Err(err) => {
                let _ = conn.state.transition(ConnectionState::Degraded);
                counters::redial_completed(labels::OUTCOME_ERROR);
                tracing::warn!(address = %self.address, error = %err, "redial failed");
            }
        }
    }

    /// Close the connection.
    ///
    /// Subsequent writes fail with [`Error::ConnectionClosed`]. A second
    /// `close` errors on the already-closed state.
    pub async fn close(&self) -> Result<()> {
        let mut conn = self.conn.lock().await;
        conn.state.transition(ConnectionState::Closed)?;
        conn.transport.shutdown().await?;
        tracing::debug!(address = %self.address, "connection closed");
        Ok(())
    }

    /// Shut down the transport write-half without touching state, so tests
    /// can provoke a broken pipe deterministically.
    #[cfg(test)]
    async fn sever_transport(&self) {
        let mut conn = self.conn.lock().await;
        let _ = conn.transport.shutdown().await;
    }
}

/// Dial `host:port` per the option set, TLS handshake included.
async fn dial(host: &str, port: u16, options: &ConnectOptions) -> Result<Transport> {
    let transport = match options.protocol {
        Protocol::Tcp => Transport::connect_tcp(host, port, options.keepalive).await?,
        Protocol::Udp => Transport::connect_udp(host, port).await?,
    };

    match options.resolve_tls()? {
        Some(tls) => {
            let server_name = tls
                .server_name()
                .map(str::to_owned)
                .unwrap_or_else(|| host.to_string());
            transport.upgrade_to_tls(&tls, &server_name).await
        }
        None => Ok(transport),
    }
}

async fn write_and_flush(transport: &mut Transport, framed: &[u8]) -> Result<()> {
    transport.write_all(framed).await?;
    transport.flush().await
}

#[cfg(test)]
mod tests {
    use super::*;
    use tokio::io::AsyncReadExt;
    use tokio::net::TcpListener;

    #[tokio::test]
    async fn test_connect_rejects_empty_host() {
        let result = LogwireClient::connect("", 5000, ConnectOptions::default()).await;
        assert!(matches!(result, Err(Error::Config(_))));
    }

    #[tokio::test]
    async fn test_connect_rejects_zero_port() {
        let result = LogwireClient::connect("localhost", 0, ConnectOptions::default()).await;
        assert!(matches!(result, Err(Error::Config(_))));
    }

    #[tokio::test]
    async fn test_connect_rejects_tls_over_udp() {
        let options = ConnectOptions::builder()
            .protocol(Protocol::Udp)
            .tls(true)
            .tls_skip_verify(true)
            .build();

        let result = LogwireClient::connect("localhost", 5000, options).await;
        assert!(matches!(result, Err(Error::Config(_))));
    }

    #[tokio::test]
    async fn test_broken_pipe_surfaces_error_and_redials() {
        let listener = TcpListener::bind("127.0.0.1:0").await.expect("bind");
        let addr = listener.local_addr().expect("local addr");

        let server = tokio::spawn(async move {
            let (first, _) = listener.accept().await.expect("first accept");
            let (mut second, _) = listener.accept().await.expect("second accept");
            drop(first);

            let mut buf = Vec::new();
            second.read_to_end(&mut buf).await.expect("read frame");
            buf
        });

        let client = LogwireClient::connect("127.0.0.1", addr.port(), ConnectOptions::default())
            .await
            .expect("connect");

        client.sever_transport().await;

        // The failed write surfaces its own error; the redial only repairs
        // the connection for the next write.
        let err = client
            .write(b"lost record")
            .await
            .expect_err("severed write must fail");
        assert!(err.is_broken_pipe());
        assert_eq!(client.state().await, ConnectionState::Connected);

        let written = client.write(b"recovered").await.expect("write after redial");
        assert_eq!(written, b"recovered".len() + 2);

        client.close().await.expect("close");
        let received = server.await.expect("server task");
        assert_eq!(&received, b"recovered\r\n");
    }

    #[tokio::test]
    async fn test_redial_failure_degrades_handle() {
        let listener = TcpListener::bind("127.0.0.1:0").await.expect("bind");
        let addr = listener.local_addr().expect("local addr");

        let client = LogwireClient::connect("127.0.0.1", addr.port(), ConnectOptions::default())
            .await
            .expect("connect");

        // Hold the accepted connection so no reset reaches the client, then
        // take the listener down so the redial has nowhere to go.
        let (server_conn, _) = listener.accept().await.expect("accept");
        drop(listener);

        client.sever_transport().await;

        let err = client
            .write(b"first")
            .await
            .expect_err("severed write must fail");
        assert!(err.is_broken_pipe());
        assert_eq!(client.state().await, ConnectionState::Degraded);

        // Still failing, still not panicking, until a redial succeeds.
        let err = client
            .write(b"second")
            .await
            .expect_err("degraded write must fail");
        assert!(err.is_broken_pipe());

        drop(server_conn);
    }

    #[tokio::test]
    async fn test_close_twice_errors() {
        let listener = TcpListener::bind("127.0.0.1:0").await.expect("bind");
        let addr = listener.local_addr().expect("local addr");

        let client = LogwireClient::connect("127.0.0.1", addr.port(), ConnectOptions::default())
            .await
            .expect("connect");

        client.close().await.expect("first close");
        assert!(client.close().await.is_err());
    }

    #[tokio::test]
    async fn test_accessors() {
        let listener = TcpListener::bind("127.0.0.1:0").await.expect("bind");
        let addr = listener.local_addr().expect("local addr");

        let client = LogwireClient::connect("127.0.0.1", addr.port(), ConnectOptions::default())
            .await
            .expect("connect");

        assert_eq!(client.address(), format!("127.0.0.1:{}", addr.port()));
        assert_eq!(client.options().protocol, Protocol::Tcp);
        assert_eq!(client.state().await, ConnectionState::Connected);
    }
}
