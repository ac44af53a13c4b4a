//! Connection management
//!
//! This module handles:
//! * Transport abstraction (plain TCP, TLS over TCP, UDP)
//! * Connection options and their defaults
//! * State machine enforcement
//! * TLS configuration and support

mod options;
mod state;
mod tls;
mod transport;

pub use options::{ConnectOptions, ConnectOptionsBuilder, Protocol, DEFAULT_KEEPALIVE, DEFAULT_TIMEOUT};
pub use state::ConnectionState;
pub use tls::{parse_server_name, TlsConfig, TlsConfigBuilder};
pub use transport::Transport;
