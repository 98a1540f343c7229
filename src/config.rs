//! Device configuration and identity reporting.

use std::time::Duration;

/// Runtime configuration for a strip controller.
///
/// # Examples
///
/// ```
/// use std::time::Duration;
/// use rgbw_strip_rs::DeviceConfig;
///
/// let config = DeviceConfig::new()
///     .with_port(8080)
///     .with_tick_interval(Duration::from_millis(20));
/// assert_eq!(config.port, 8080);
/// ```
#[derive(Debug, Clone)]
pub struct DeviceConfig {
    /// TCP port the control endpoint listens on.
    pub port: u16,
    /// Minimum pause after each scheduler tick's work completes.
    pub tick_interval: Duration,
}

impl Default for DeviceConfig {
    fn default() -> Self {
        Self {
            port: 80,
            tick_interval: Duration::from_millis(10),
        }
    }
}

impl DeviceConfig {
    /// Create a configuration with the stock values (port 80, 10 ms ticks).
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the listening port.
    #[must_use]
    pub fn with_port(mut self, port: u16) -> Self {
        self.port = port;
        self
    }

    /// Set the tick interval.
    #[must_use]
    pub fn with_tick_interval(mut self, tick_interval: Duration) -> Self {
        self.tick_interval = tick_interval;
        self
    }
}

/// Source of the device identity reported by `get_info`.
///
/// MAC retrieval belongs to the network platform, so the server only asks
/// for the finished string. Implement this against your adapter, or use
/// [`StaticIdentity`] when the address is known up front.
pub trait DeviceIdentity {
    /// MAC address formatted as six colon-separated hex octets.
    fn mac(&self) -> &str;
}

/// A fixed device identity.
#[derive(Debug, Clone)]
pub struct StaticIdentity {
    mac: String,
}

impl StaticIdentity {
    /// Create an identity from an already-formatted MAC string.
    pub fn new(mac: &str) -> Self {
        Self {
            mac: mac.to_string(),
        }
    }

    /// Create an identity from raw MAC octets.
    ///
    /// # Examples
    ///
    /// ```
    /// use rgbw_strip_rs::{DeviceIdentity, StaticIdentity};
    ///
    /// let id = StaticIdentity::from_octets([0xAA, 0xBB, 0xCC, 0x00, 0x11, 0x22]);
    /// assert_eq!(id.mac(), "AA:BB:CC:00:11:22");
    /// ```
    pub fn from_octets(octets: [u8; 6]) -> Self {
        Self {
            mac: format!(
                "{:02X}:{:02X}:{:02X}:{:02X}:{:02X}:{:02X}",
                octets[0], octets[1], octets[2], octets[3], octets[4], octets[5],
            ),
        }
    }
}

impl DeviceIdentity for StaticIdentity {
    fn mac(&self) -> &str {
        &self.mac
    }
}
