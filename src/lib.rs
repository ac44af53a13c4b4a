//! # logwire
//!
//! Async client transport for shipping structured log records to a
//! Logstash-style collector over TCP or TLS.
//!
//! The crate is the connection and framing layer only: it dials the
//! collector, frames each record with a trailing CRLF, and exposes a
//! byte-sink write interface. What the bytes contain (JSON, msgpack,
//! plain text) is the caller's business; any logging front-end that can
//! produce a serialized record can ship it through a [`LogwireClient`].
//!
//! Writes are safe to issue from many tasks sharing one client: each frame
//! is written atomically, and a broken connection detected mid-write is
//! transparently redialed for the writes that follow (the failed write
//! itself is reported, never silently retried).
//!
//! # Examples
//!
//! ```no_run
//! use logwire::{ConnectOptions, LogwireClient};
//!
//! # async fn example() -> logwire::Result<()> {
//! let client = LogwireClient::connect("logs.example.com", 5000, ConnectOptions::default()).await?;
//! client.write(br#"{"level":"info","msg":"service started"}"#).await?;
//! client.close().await?;
//! # Ok(())
//! # }
//! ```
//!
//! With TLS:
//!
//! ```no_run
//! use logwire::connection::TlsConfig;
//! use logwire::{ConnectOptions, LogwireClient};
//!
//! # async fn example() -> logwire::Result<()> {
//! let tls = TlsConfig::builder()
//!     .ca_cert_path("/etc/logwire/ca.pem")
//!     .build()?;
//!
//! let options = ConnectOptions::builder().tls(true).tls_config(tls).build();
//! let client = LogwireClient::connect("logs.example.com", 5001, options).await?;
//! # Ok(())
//! # }
//! ```

pub mod client;
pub mod connection;
pub mod error;
pub mod framing;
pub mod metrics;

pub use client::LogwireClient;
pub use connection::{ConnectOptions, Protocol};
pub use error::{Error, Result};
