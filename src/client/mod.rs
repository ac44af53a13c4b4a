//! Client interface
//!
//! `LogwireClient` is the connection handle: it owns the active transport,
//! the resolved options, and the redial policy.

mod logwire_client;

pub use logwire_client::LogwireClient;
