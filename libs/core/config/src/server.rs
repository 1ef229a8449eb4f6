use crate::{env_parse, ConfigError, FromEnv};
use std::net::{IpAddr, Ipv4Addr, SocketAddr};

const DEFAULT_PORT: u16 = 8080;

/// Listener address, validated when loaded
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct ServerConfig {
    pub addr: SocketAddr,
}

impl ServerConfig {
    pub fn new(ip: IpAddr, port: u16) -> Self {
        Self {
            addr: SocketAddr::new(ip, port),
        }
    }

    pub fn port(&self) -> u16 {
        self.addr.port()
    }
}

impl FromEnv for ServerConfig {
    /// HOST must be an IP literal (default 0.0.0.0); PORT defaults to 8080
    fn from_env() -> Result<Self, ConfigError> {
        let ip = env_parse("HOST", IpAddr::V4(Ipv4Addr::UNSPECIFIED))?;
        let port = env_parse("PORT", DEFAULT_PORT)?;
        Ok(Self::new(ip, port))
    }
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self::new(IpAddr::V4(Ipv4Addr::UNSPECIFIED), DEFAULT_PORT)
    }
}
