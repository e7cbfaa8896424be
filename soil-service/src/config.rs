//! Service configuration from environment variables.

use std::net::{IpAddr, Ipv4Addr, SocketAddr};

/// Default blocking pool size; bounds how many raster reads run at once.
pub const DEFAULT_BLOCKING_THREADS: usize = 64;

/// Network and runtime settings of the service binary.
///
/// Raster settings (`SOIL_DATA_DIR`, `SOIL_RASTER_EXTENSION`) are read by
/// [`soil::SoilServiceBuilder::from_env`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ServiceConfig {
    pub host: IpAddr,
    pub port: u16,
    pub blocking_threads: usize,
}

impl Default for ServiceConfig {
    fn default() -> Self {
        Self {
            host: IpAddr::V4(Ipv4Addr::UNSPECIFIED),
            port: 8080,
            blocking_threads: DEFAULT_BLOCKING_THREADS,
        }
    }
}

impl ServiceConfig {
    /// Read the configuration from the environment.
    ///
    /// # Environment Variables
    ///
    /// | Variable | Description | Default |
    /// |----------|-------------|---------|
    /// | `SOIL_HOST` | Address to bind | 0.0.0.0 |
    /// | `SOIL_PORT` | HTTP server port | 8080 |
    /// | `SOIL_BLOCKING_THREADS` | Maximum concurrent raster reads | 64 |
    ///
    /// Unset or unparsable values fall back to the defaults.
    pub fn from_env() -> Self {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        let defaults = Self::default();
        Self {
            host: lookup("SOIL_HOST")
                .and_then(|s| s.parse().ok())
                .unwrap_or(defaults.host),
            port: lookup("SOIL_PORT")
                .and_then(|s| s.parse().ok())
                .unwrap_or(defaults.port),
            blocking_threads: lookup("SOIL_BLOCKING_THREADS")
                .and_then(|s| s.parse().ok())
                .filter(|n| *n > 0)
                .unwrap_or(defaults.blocking_threads),
        }
    }

    pub fn socket_addr(&self) -> SocketAddr {
        SocketAddr::new(self.host, self.port)
    }
}
