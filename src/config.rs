//! Relay server configuration

use crate::channels::Namespace;
use std::fmt;
use std::net::SocketAddr;
use thiserror::Error;

pub const DEFAULT_BIND: &str = "0.0.0.0:4433";
pub const DEFAULT_OUTBOUND_BUFFER: usize = 100;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum ConfigError {
    #[error("token secret must not be empty")]
    EmptySecret,

    #[error("outbound buffer must hold at least one message")]
    ZeroBuffer,
}

/// Configuration for the relay server
#[derive(Clone)]
pub struct RelayConfig {
    /// Address to bind to
    pub bind_addr: SocketAddr,
    /// Secret that bearer tokens are signed with
    pub token_secret: Vec<u8>,
    /// Namespace every connection joins and every broadcast targets
    pub namespace: Namespace,
    /// Per-connection outbound queue length
    pub outbound_buffer: usize,
}

impl RelayConfig {
    pub fn new(bind_addr: SocketAddr, token_secret: impl Into<Vec<u8>>) -> Self {
        Self {
            bind_addr,
            token_secret: token_secret.into(),
            namespace: Namespace::root(),
            outbound_buffer: DEFAULT_OUTBOUND_BUFFER,
        }
    }

    /// Set the namespace
    pub fn namespace(mut self, namespace: Namespace) -> Self {
        self.namespace = namespace;
        self
    }

    /// Set the per-connection outbound queue length
    pub fn outbound_buffer(mut self, len: usize) -> Self {
        self.outbound_buffer = len;
        self
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.token_secret.is_empty() {
            return Err(ConfigError::EmptySecret);
        }
        if self.outbound_buffer == 0 {
            return Err(ConfigError::ZeroBuffer);
        }
        Ok(())
    }
}

impl fmt::Debug for RelayConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RelayConfig")
            .field("bind_addr", &self.bind_addr)
            .field("token_secret", &"[REDACTED]")
            .field("namespace", &self.namespace)
            .field("outbound_buffer", &self.outbound_buffer)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn addr() -> SocketAddr {
        "127.0.0.1:4433".parse().unwrap()
    }

    #[test]
    fn test_config_new_defaults() {
        let config = RelayConfig::new(addr(), "secret");

        assert_eq!(config.bind_addr, addr());
        assert_eq!(config.token_secret, b"secret".to_vec());
        assert!(config.namespace.is_root());
        assert_eq!(config.outbound_buffer, DEFAULT_OUTBOUND_BUFFER);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_default_bind_parses() {
        assert!(DEFAULT_BIND.parse::<SocketAddr>().is_ok());
    }

    #[test]
    fn test_config_builder_chain() {
        let config = RelayConfig::new(addr(), "secret")
            .namespace("/dashboard".parse().unwrap())
            .outbound_buffer(16);

        assert_eq!(config.namespace.as_str(), "/dashboard");
        assert_eq!(config.outbound_buffer, 16);
    }

    #[test]
    fn test_config_rejects_empty_secret() {
        let config = RelayConfig::new(addr(), Vec::<u8>::new());
        assert_eq!(config.validate(), Err(ConfigError::EmptySecret));
    }

    #[test]
    fn test_config_rejects_zero_buffer() {
        let config = RelayConfig::new(addr(), "secret").outbound_buffer(0);
        assert_eq!(config.validate(), Err(ConfigError::ZeroBuffer));
    }

    #[test]
    fn test_config_debug_redacts_secret() {
        let debug = format!("{:?}", RelayConfig::new(addr(), "hunter2"));
        assert!(debug.contains("[REDACTED]"));
        assert!(!debug.contains("hunter2"));
    }
}
