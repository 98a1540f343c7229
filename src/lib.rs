//! # rgbw_strip_rs
//!
//! Async firmware core for a network-controllable RGBW LED strip.
//!
//! This crate implements the control plane of a four-channel (red, green,
//! blue, white) LED strip: a tiny HTTP-shaped command endpoint on TCP and a
//! tick-driven transition engine that fades the physical output toward the
//! last commanded color. Everything runs on **one cooperative control
//! loop**, with no worker tasks and no locks, which is exactly how the
//! hardware it drives behaves.
//!
//! ## Quick Start
//!
//! ```ignore
//! use rgbw_strip_rs::{DeviceConfig, DeviceServer, LogDriver, StaticIdentity};
//!
//! #[tokio::main(flavor = "current_thread")]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let config = DeviceConfig::new().with_port(8080);
//!     let identity = StaticIdentity::from_octets([0xAA, 0xBB, 0xCC, 0x00, 0x11, 0x22]);
//!
//!     // LogDriver traces duty cycles; implement LedDriver for real PWM pins.
//!     let mut server = DeviceServer::new(config, LogDriver::new(), identity);
//!     server.run().await?;
//!     Ok(())
//! }
//! ```
//!
//! ## Protocol
//!
//! Commands are JSON documents sent as `POST /command`:
//!
//! ```json
//! { "method": "set_rgbw", "param": { "r": 0.5, "g": 0.2, "b": 0.0, "w": 1.0, "time": 2000 } }
//! { "method": "set_power", "param": { "value": true } }
//! { "method": "get_status" }
//! { "method": "get_info" }
//! ```
//!
//! - `set_rgbw` aims the strip at a color, fading over `time` milliseconds
//!   (default 1000 when omitted or zero)
//! - `set_power` switches the strip on or off; the change is always a
//!   visible fade to or from black, and the last commanded color survives
//!   power-off
//! - `get_status` answers `{"power": ..., "r": ..., "g": ..., "b": ..., "w": ...}`
//!   with the commanded target, not the color currently mid-fade
//! - `get_info` answers `{"mac": "AA:BB:CC:DD:EE:FF"}`
//!
//! Anything else (other routes, other HTTP methods, unknown command
//! names) is a `404 Not Found` with no body, and a command that fails
//! validation is a `400 Bad Request` with no state change. Every
//! connection is closed after one response; this is not a general HTTP
//! server and does not try to be one.
//!
//! ## Features
//!
//! - **Runtime Agnostic**: Works with tokio, async-std, or smol async runtimes
//! - **RGBW Color**: Normalized four-channel [`Color`] with the arithmetic
//!   the fade engine needs and 12-bit PWM quantization
//! - **Smooth Fades**: Linear time-based interpolation resilient to
//!   irregular tick spacing, in [`engine`]
//! - **Pluggable Output**: Implement [`LedDriver`] for your hardware;
//!   [`LogDriver`] traces duty cycles for bring-up
//! - **Pluggable Identity**: Implement [`DeviceIdentity`] against your
//!   network adapter, or use [`StaticIdentity`]
//!
//! ## Runtime Selection
//!
//! This library is runtime-agnostic. Select your preferred runtime using
//! feature flags:
//!
//! ### Using tokio (default)
//!
//! ```toml
//! [dependencies]
//! rgbw-strip-rs = "0.1"
//! tokio = { version = "1", features = ["rt", "macros"] }
//! ```
//!
//! ### Using async-std
//!
//! ```toml
//! [dependencies]
//! rgbw-strip-rs = { version = "0.1", default-features = false, features = ["runtime-async-std"] }
//! async-std = { version = "1.12", features = ["attributes"] }
//! ```
//!
//! ### Using smol
//!
//! ```toml
//! [dependencies]
//! rgbw-strip-rs = { version = "0.1", default-features = false, features = ["runtime-smol"] }
//! smol = "2"
//! ```
//!
//! ## Feature Flags
//!
//! - `runtime-tokio` (default): Use the tokio async runtime
//! - `runtime-async-std`: Use the async-std runtime
//! - `runtime-smol`: Use the smol runtime

mod command;
mod config;
mod device;
mod driver;
pub mod engine;
mod errors;
pub mod http;
pub mod runtime;
mod server;
mod types;

// Re-export public API
pub use command::{Command, CommandRequest, MethodName, PowerParams, ResponseBody, RgbwParams};
pub use config::{DeviceConfig, DeviceIdentity, StaticIdentity};
pub use device::DeviceState;
pub use driver::{LedDriver, LogDriver};
pub use errors::Error;
pub use http::{HttpMethod, ParsedRequest, Response, Route, StatusCode};
pub use server::{COMMAND_ROUTE, DeviceServer};
pub use types::{Color, FadeTime, PWM_MAX};
