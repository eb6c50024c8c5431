use serde::{Deserialize, Serialize};

/// Network settings for an HTTP service binary.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct ApplicationConfig {
    /// Interface the server binds to.
    pub host: String,
    /// Port the server listens on. Port 0 asks the OS for a free port.
    pub port: u16,
}

impl ApplicationConfig {
    /// Returns the `host:port` address to bind the listener to.
    pub fn address(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}
