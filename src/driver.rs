//! LED output drivers.

use log::trace;

use crate::types::Color;

/// Trait for the physical output stage of the strip.
///
/// Implement this for your hardware (PWM pins, SPI, a test double) to let
/// the server drive it. The server calls [`apply`](LedDriver::apply) once
/// per scheduler tick with the live color, whether or not a fade is
/// running, so output hardware that loses state is re-asserted
/// continuously.
pub trait LedDriver {
    /// Assert the given color on the output.
    ///
    /// Implementations convert to their native format (for 12-bit PWM,
    /// [`Color::quantize`]) and handle any hardware errors internally -
    /// this method cannot fail.
    fn apply(&mut self, color: &Color);
}

/// A driver that traces duty cycles instead of touching hardware.
///
/// Useful while bringing a board up, and as the output stage of the demo
/// binary.
#[derive(Debug, Default)]
pub struct LogDriver;

impl LogDriver {
    pub fn new() -> Self {
        Self
    }
}

impl LedDriver for LogDriver {
    fn apply(&mut self, color: &Color) {
        trace!("pwm duty {:?}", color.quantize());
    }
}
