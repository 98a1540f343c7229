//! Mutable device state and command dispatch.

use std::time::Duration;

use log::debug;

use crate::command::{Command, ResponseBody};
use crate::config::DeviceIdentity;
use crate::types::{Color, FadeTime};

/// The single mutable object shared by the dispatcher and the transition
/// engine.
///
/// `current` is the live displayed color and only ever moves under
/// [`advance`](crate::engine::advance); commands steer it indirectly by
/// replacing the target and the remaining fade time. The stored target
/// survives power-off, so switching back on resumes toward the last
/// commanded color.
#[derive(Debug, Clone, PartialEq)]
pub struct DeviceState {
    pub(crate) is_on: bool,
    pub(crate) target: Color,
    pub(crate) current: Color,
    pub(crate) remaining: Duration,
}

impl Default for DeviceState {
    fn default() -> Self {
        Self::new()
    }
}

impl DeviceState {
    /// A powered-off strip showing black, with no fade in progress.
    pub fn new() -> Self {
        DeviceState {
            is_on: false,
            target: Color::OFF,
            current: Color::OFF,
            remaining: Duration::ZERO,
        }
    }

    /// Whether the strip is switched on.
    pub fn is_on(&self) -> bool {
        self.is_on
    }

    /// The last commanded color.
    pub fn target(&self) -> &Color {
        &self.target
    }

    /// The color currently being displayed.
    pub fn current(&self) -> &Color {
        &self.current
    }

    /// Time left on the running fade; zero when idle.
    pub fn remaining(&self) -> Duration {
        self.remaining
    }

    /// The color the transition engine pulls toward: the stored target
    /// while on, black while off.
    pub fn effective_target(&self) -> Color {
        if self.is_on { self.target } else { Color::OFF }
    }

    /// Apply a command, returning whatever response fields it produced.
    ///
    /// # Examples
    ///
    /// ```
    /// use rgbw_strip_rs::{Command, DeviceState, StaticIdentity};
    ///
    /// let identity = StaticIdentity::new("AA:BB:CC:DD:EE:FF");
    /// let mut state = DeviceState::new();
    ///
    /// let cmd = Command::parse(br#"{"method": "set_rgbw", "param": {"r":1,"g":0,"b":0,"w":0}}"#).unwrap();
    /// assert!(!state.dispatch(&cmd, &identity).is_populated());
    ///
    /// let cmd = Command::parse(br#"{"method": "get_status"}"#).unwrap();
    /// let body = state.dispatch(&cmd, &identity);
    /// assert_eq!(body.r, Some(1.0));
    /// ```
    pub fn dispatch<I: DeviceIdentity>(&mut self, command: &Command, identity: &I) -> ResponseBody {
        match command {
            Command::SetRgbw(params) => {
                self.set_rgbw(params.color(), params.fade());
                ResponseBody::new()
            }
            Command::SetPower(params) => {
                self.set_power(params.value);
                ResponseBody::new()
            }
            Command::GetStatus => ResponseBody::status(self.is_on, &self.target),
            Command::GetInfo => ResponseBody::info(identity.mac()),
        }
    }

    /// Aim the strip at a new color, fading over the given duration.
    pub fn set_rgbw(&mut self, target: Color, fade: FadeTime) {
        debug!("target {:?} over {} ms", target, fade.millis());
        self.target = target;
        self.remaining = fade.duration();
    }

    /// Switch the strip on or off.
    ///
    /// Turning off, or switching with less than the default fade left,
    /// restarts the fade at the default length so the change is always a
    /// visible ramp rather than a cut.
    pub fn set_power(&mut self, on: bool) {
        debug!("power {}", on);
        self.is_on = on;
        let floor = FadeTime::default().duration();
        if !on || self.remaining < floor {
            self.remaining = floor;
        }
    }
}
