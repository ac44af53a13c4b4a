//! TLS configuration and support for secure connections to log collectors.
//!
//! TLS is recommended for any collector reachable over an untrusted network:
//! log records routinely carry credentials, session identifiers, and other
//! material worth protecting in transit. Both one-way TLS (server
//! verification only) and mutual TLS (client certificate + key) are
//! supported.

use crate::{Error, Result};
use rustls::ClientConfig;
use rustls::RootCertStore;
use rustls_pemfile::Item;
use std::fs;
use std::sync::Arc;

/// TLS configuration for secure collector connections.
///
/// Provides a builder for creating TLS configurations with various
/// certificate handling options. By default, server certificates are
/// validated against system root certificates.
///
/// # Examples
///
/// ```ignore
/// use logwire::connection::TlsConfig;
///
/// // With system root certificates (production)
/// let tls = TlsConfig::builder().build()?;
///
/// // With custom CA certificate and mutual TLS
/// let tls = TlsConfig::builder()
///     .ca_cert_path("/etc/logwire/ca.pem")
///     .client_cert_path("/etc/logwire/client.pem")
///     .client_key_path("/etc/logwire/client.key")
///     .build()?;
///
/// // For development (danger: disables verification)
/// let tls = TlsConfig::builder()
///     .danger_accept_invalid_certs(true)
///     .build()?;
/// ```
#[derive(Clone)]
pub struct TlsConfig {
    /// Path to CA certificate file (None = use system roots)
    ca_cert_path: Option<String>,
    /// Path to client certificate file for mutual TLS
    client_cert_path: Option<String>,
    /// Path to client private key file for mutual TLS
    client_key_path: Option<String>,
    /// Server name presented for SNI (None = derive from target host)
    server_name: Option<String>,
    /// Whether to accept invalid certificates (development only)
    danger_accept_invalid_certs: bool,
    /// Compiled rustls ClientConfig
    client_config: Arc<ClientConfig>,
}

impl TlsConfig {
    /// Create a new TLS configuration builder.
    pub fn builder() -> TlsConfigBuilder {
        TlsConfigBuilder::default()
    }

    /// Get the rustls ClientConfig for this TLS configuration.
    pub fn client_config(&self) -> Arc<ClientConfig> {
        self.client_config.clone()
    }

    /// The explicit server name, if one was configured.
    pub fn server_name(&self) -> Option<&str> {
        self.server_name.as_deref()
    }

    /// Check if invalid certificates are accepted (development only).
    pub fn danger_accept_invalid_certs(&self) -> bool {
        self.danger_accept_invalid_certs
    }
}

impl std::fmt::Debug for TlsConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TlsConfig")
            .field("ca_cert_path", &self.ca_cert_path)
            .field("client_cert_path", &self.client_cert_path)
            .field("client_key_path", &self.client_key_path)
            .field("server_name", &self.server_name)
            .field(
                "danger_accept_invalid_certs",
                &self.danger_accept_invalid_certs,
            )
            .field("client_config", &"<ClientConfig>")
            .finish()
    }
}

/// Builder for TLS configuration.
#[derive(Default)]
pub struct TlsConfigBuilder {
    ca_cert_path: Option<String>,
    client_cert_path: Option<String>,
    client_key_path: Option<String>,
    server_name: Option<String>,
    danger_accept_invalid_certs: bool,
}

impl TlsConfigBuilder {
    /// Set the path to a custom CA certificate file (PEM format).
    ///
    /// If not set, system root certificates will be used.
    pub fn ca_cert_path(mut self, path: impl Into<String>) -> Self {
        self.ca_cert_path = Some(path.into());
        self
    }

    /// Set the path to a client certificate file (PEM format) for mutual TLS.
    ///
    /// Must be paired with `client_key_path`.
    pub fn client_cert_path(mut self, path: impl Into<String>) -> Self {
        self.client_cert_path = Some(path.into());
        self
    }

    /// Set the path to the client private key file (PEM format) for mutual TLS.
    ///
    /// Must be paired with `client_cert_path`.
    pub fn client_key_path(mut self, path: impl Into<String>) -> Self {
        self.client_key_path = Some(path.into());
        self
    }

    /// Set the server name presented during the handshake (SNI).
    ///
    /// If not set, the name is derived from the target host at connect time.
    pub fn server_name(mut self, name: impl Into<String>) -> Self {
        self.server_name = Some(name.into());
        self
    }

    /// ⚠️ **DANGER**: Accept invalid certificates (development only).
    ///
    /// **NEVER use in production.** This disables certificate and hostname
    /// validation entirely, making the connection vulnerable to
    /// man-in-the-middle attacks. Only use for testing with self-signed
    /// certificates.
    pub fn danger_accept_invalid_certs(mut self, accept: bool) -> Self {
        self.danger_accept_invalid_certs = accept;
        self
    }

    /// Build the TLS configuration.
    ///
    /// # Errors
    ///
    /// Returns an error if:
    /// - the CA certificate file cannot be read or contains no certificates
    /// - the client certificate/key files cannot be read or parsed
    /// - only one of `client_cert_path`/`client_key_path` is set
    pub fn build(self) -> Result<TlsConfig> {
        let builder = if self.danger_accept_invalid_certs {
            ClientConfig::builder()
                .dangerous()
                .with_custom_certificate_verifier(Arc::new(danger::NoVerification::new()))
        } else {
            let root_store = if let Some(ca_path) = &self.ca_cert_path {
                self.load_custom_ca(ca_path)?
            } else {
                // System root certificates via rustls-native-certs
                let result = rustls_native_certs::load_native_certs();

                let mut store = RootCertStore::empty();
                for cert in result.certs {
                    let _ = store.add_parsable_certificates(std::iter::once(cert));
                }

                if !result.errors.is_empty() && store.is_empty() {
                    return Err(Error::Config(
                        "failed to load any system root certificates".to_string(),
                    ));
                }

                store
            };

            ClientConfig::builder().with_root_certificates(root_store)
        };

        let client_config = match (&self.client_cert_path, &self.client_key_path) {
            (Some(cert_path), Some(key_path)) => {
                let (certs, key) = self.load_client_identity(cert_path, key_path)?;
                builder.with_client_auth_cert(certs, key).map_err(|e| {
                    Error::Config(format!("invalid client certificate/key: {}", e))
                })?
            }
            (None, None) => builder.with_no_client_auth(),
            _ => {
                return Err(Error::Config(
                    "mutual TLS requires both client_cert_path and client_key_path".to_string(),
                ));
            }
        };

        Ok(TlsConfig {
            ca_cert_path: self.ca_cert_path,
            client_cert_path: self.client_cert_path,
            client_key_path: self.client_key_path,
            server_name: self.server_name,
            danger_accept_invalid_certs: self.danger_accept_invalid_certs,
            client_config: Arc::new(client_config),
        })
    }

    /// Load a custom CA certificate from a PEM file.
    fn load_custom_ca(&self, ca_path: &str) -> Result<RootCertStore> {
        let ca_cert_data = fs::read(ca_path).map_err(|e| {
            Error::Config(format!(
                "failed to read CA certificate file '{}': {}",
                ca_path, e
            ))
        })?;

        let mut reader = std::io::Cursor::new(&ca_cert_data);
        let mut root_store = RootCertStore::empty();
        let mut found_certs = 0;

        // Parse PEM file and extract certificates
        loop {
            match rustls_pemfile::read_one(&mut reader) {
                Ok(Some(Item::X509Certificate(cert))) => {
                    let _ = root_store.add_parsable_certificates(std::iter::once(cert));
                    found_certs += 1;
                }
                Ok(Some(_)) => {
                    // Skip non-certificate items (private keys, etc.)
                }
                Ok(None) => {
                    break;
                }
                Err(_) => {
                    return Err(Error::Config(format!(
                        "failed to parse CA certificate from '{}'",
                        ca_path
                    )));
                }
            }
        }

        if found_certs == 0 {
            return Err(Error::Config(format!(
                "no valid certificates found in '{}'",
                ca_path
            )));
        }

        Ok(root_store)
    }

    /// Load the client certificate chain and private key for mutual TLS.
    fn load_client_identity(
        &self,
        cert_path: &str,
        key_path: &str,
    ) -> Result<(
        Vec<rustls_pki_types::CertificateDer<'static>>,
        rustls_pki_types::PrivateKeyDer<'static>,
    )> {
        let cert_data = fs::read(cert_path).map_err(|e| {
            Error::Config(format!(
                "failed to read client certificate file '{}': {}",
                cert_path, e
            ))
        })?;
        let mut reader = std::io::Cursor::new(&cert_data);
        let certs = rustls_pemfile::certs(&mut reader)
            .collect::<std::result::Result<Vec<_>, _>>()
            .map_err(|e| {
                Error::Config(format!(
                    "failed to parse client certificate from '{}': {}",
                    cert_path, e
                ))
            })?;
        if certs.is_empty() {
            return Err(Error::Config(format!(
                "no valid certificates found in '{}'",
                cert_path
            )));
        }

        let key_data = fs::read(key_path).map_err(|e| {
            Error::Config(format!(
                "failed to read client key file '{}': {}",
                key_path, e
            ))
        })?;
        let mut reader = std::io::Cursor::new(&key_data);
        let key = rustls_pemfile::private_key(&mut reader)
            .map_err(|e| {
                Error::Config(format!(
                    "failed to parse client key from '{}': {}",
                    key_path, e
                ))
            })?
            .ok_or_else(|| {
                Error::Config(format!("no private key found in '{}'", key_path))
            })?;

        Ok((certs, key))
    }
}

/// Parse server name from hostname for TLS SNI (Server Name Indication).
///
/// # Errors
///
/// Returns an error if the hostname is empty, too long, or contains
/// characters invalid in a DNS name.
pub fn parse_server_name(hostname: &str) -> Result<String> {
    // Remove trailing dot if present
    let hostname = hostname.trim_end_matches('.');

    if hostname.is_empty() || hostname.len() > 253 {
        return Err(Error::Config(format!(
            "invalid hostname for TLS: '{}'",
            hostname
        )));
    }

    if !hostname
        .chars()
        .all(|c| c.is_alphanumeric() || c == '-' || c == '.')
    {
        return Err(Error::Config(format!(
            "invalid hostname for TLS: '{}'",
            hostname
        )));
    }

    Ok(hostname.to_string())
}

mod danger {
    //! Certificate verifier that accepts anything. Wired in only when
    //! `danger_accept_invalid_certs` is set.

    use rustls::client::danger::{
        HandshakeSignatureValid, ServerCertVerified, ServerCertVerifier,
    };
    use rustls::crypto::CryptoProvider;
    use rustls::{DigitallySignedStruct, SignatureScheme};
    use rustls_pki_types::{CertificateDer, ServerName, UnixTime};

    #[derive(Debug)]
    pub(super) struct NoVerification {
        provider: CryptoProvider,
    }

    impl NoVerification {
        pub(super) fn new() -> Self {
            Self {
                provider: rustls::crypto::ring::default_provider(),
            }
        }
    }

    impl ServerCertVerifier for NoVerification {
        fn verify_server_cert(
            &self,
            _end_entity: &CertificateDer<'_>,
            _intermediates: &[CertificateDer<'_>],
            _server_name: &ServerName<'_>,
            _ocsp_response: &[u8],
            _now: UnixTime,
        ) -> std::result::Result<ServerCertVerified, rustls::Error> {
            Ok(ServerCertVerified::assertion())
        }

        fn verify_tls12_signature(
            &self,
            _message: &[u8],
            _cert: &CertificateDer<'_>,
            _dss: &DigitallySignedStruct,
        ) -> std::result::Result<HandshakeSignatureValid, rustls::Error> {
            Ok(HandshakeSignatureValid::assertion())
        }

        fn verify_tls13_signature(
            &self,
            _message: &[u8],
            _cert: &CertificateDer<'_>,
            _dss: &DigitallySignedStruct,
        ) -> std::result::Result<HandshakeSignatureValid, rustls::Error> {
            Ok(HandshakeSignatureValid::assertion())
        }

        fn supported_verify_schemes(&self) -> Vec<SignatureScheme> {
            self.provider
                .signature_verification_algorithms
                .supported_schemes()
        }
    }
}
