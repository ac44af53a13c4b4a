//! Connection options
//!
//! The option set is resolved once at connect time and stored on the handle
//! so the redial path can re-dial the same address the same way. Options are
//! an explicit struct with documented defaults rather than a list of setter
//! closures; use `ConnectOptions::builder()` to set only what you need.

use super::tls::TlsConfig;
use crate::Result;
use std::time::Duration;

/// Default TCP keepalive interval (5 minutes)
pub const DEFAULT_KEEPALIVE: Duration = Duration::from_secs(300);

/// Default read/write timeout (30 seconds)
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(30);

/// Dial protocol
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum Protocol {
    /// Stream socket (default)
    #[default]
    Tcp,
    /// Datagram socket; one frame per datagram, TLS unavailable
    Udp,
}

impl std::fmt::Display for Protocol {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Tcp => write!(f, "tcp"),
            Self::Udp => write!(f, "udp"),
        }
    }
}

/// Connection options
///
/// Immutable after construction. Defaults: TCP, no TLS, 5 minute keepalive,
/// 30 second read/write timeouts.
#[derive(Debug, Clone)]
pub struct ConnectOptions {
    /// Dial protocol (default: TCP)
    pub protocol: Protocol,
    /// Perform a TLS handshake after the raw dial
    pub use_tls: bool,
    /// Disable certificate verification when no explicit TLS config is given
    pub tls_skip_verify: bool,
    /// Explicit TLS configuration (certificates, server name, verification)
    pub tls_config: Option<TlsConfig>,
    /// OS-level TCP keepalive interval applied during dial
    pub keepalive: Duration,
    /// Deadline duration for read operations (reserved; no read path yet)
    pub read_timeout: Duration,
    /// Deadline duration applied before each write; zero disables the deadline
    pub write_timeout: Duration,
}

impl Default for ConnectOptions {
    fn default() -> Self {
        Self {
            protocol: Protocol::Tcp,
            use_tls: false,
            tls_skip_verify: false,
            tls_config: None,
            keepalive: DEFAULT_KEEPALIVE,
            read_timeout: DEFAULT_TIMEOUT,
            write_timeout: DEFAULT_TIMEOUT,
        }
    }
}

impl ConnectOptions {
    /// Create a builder for customized options
    ///
    /// # Examples
    ///
    /// ```ignore
    /// let options = ConnectOptions::builder()
    ///     .tls(true)
    ///     .write_timeout(Duration::from_secs(5))
    ///     .build();
    /// ```
    pub fn builder() -> ConnectOptionsBuilder {
        ConnectOptionsBuilder {
            options: ConnectOptions::default(),
        }
    }

    /// Resolve the TLS configuration to use for the handshake.
    ///
    /// Returns `None` when TLS is disabled. When TLS is enabled and no
    /// explicit configuration was supplied, a default one is synthesized
    /// honoring the skip-verify flag.
    pub(crate) fn resolve_tls(&self) -> Result<Option<TlsConfig>> {
        if !self.use_tls {
            return Ok(None);
        }
        match &self.tls_config {
            Some(config) => Ok(Some(config.clone())),
            None => {
                let config = TlsConfig::builder()
                    .danger_accept_invalid_certs(self.tls_skip_verify)
                    .build()?;
                Ok(Some(config))
            }
        }
    }
}

/// Builder for `ConnectOptions`
pub struct ConnectOptionsBuilder {
    options: ConnectOptions,
}

impl ConnectOptionsBuilder {
    /// Select the dial protocol
    ///
    /// Default: `Protocol::Tcp`
    pub fn protocol(mut self, protocol: Protocol) -> Self {
        self.options.protocol = protocol;
        self
    }

    /// Enable or disable TLS
    ///
    /// Default: disabled
    pub fn tls(mut self, use_tls: bool) -> Self {
        self.options.use_tls = use_tls;
        self
    }

    /// Skip certificate verification when no explicit TLS config is given
    ///
    /// Default: verification enabled
    pub fn tls_skip_verify(mut self, skip: bool) -> Self {
        self.options.tls_skip_verify = skip;
        self
    }

    /// Supply a full TLS configuration
    ///
    /// Takes precedence over `tls_skip_verify`. Implies nothing about the
    /// `tls` flag; enable TLS separately.
    pub fn tls_config(mut self, config: TlsConfig) -> Self {
        self.options.tls_config = Some(config);
        self
    }

    /// Set the OS-level TCP keepalive interval used during dial
    ///
    /// Default: 5 minutes
    pub fn keepalive(mut self, interval: Duration) -> Self {
        self.options.keepalive = interval;
        self
    }

    /// Set the deadline duration for read operations (reserved)
    ///
    /// Default: 30 seconds
    pub fn read_timeout(mut self, timeout: Duration) -> Self {
        self.options.read_timeout = timeout;
        self
    }

    /// Set the deadline duration applied before each write
    ///
    /// Default: 30 seconds. Zero disables the write deadline.
    pub fn write_timeout(mut self, timeout: Duration) -> Self {
        self.options.write_timeout = timeout;
        self
    }

    /// Build the options
    pub fn build(self) -> ConnectOptions {
        self.options
    }
}
