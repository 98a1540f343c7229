//! Tick-driven color transition engine.

use std::time::Duration;

use crate::device::DeviceState;

/// Advance the running fade by one scheduler tick.
///
/// While time remains on the fade, `current` moves toward the effective
/// target by the fraction of the remaining time this tick consumed; the
/// tick that consumes the rest lands exactly on the target. With the strip
/// switched off the pull is toward black, whatever the stored target says.
/// Once the remaining time hits zero the engine is idle and `current`
/// holds its exact value until a command starts a new fade.
///
/// The blend weight is derived from the measured elapsed time, not the
/// nominal tick length, so the perceived fade rate does not depend on
/// scheduler jitter.
///
/// # Examples
///
/// ```
/// use std::time::Duration;
/// use rgbw_strip_rs::{engine, Color, DeviceState, FadeTime};
///
/// let mut state = DeviceState::new();
/// state.set_power(true);
/// state.set_rgbw(Color::rgbw(1.0, 0.0, 0.0, 0.0), FadeTime::create(100).unwrap());
///
/// engine::advance(&mut state, Duration::from_millis(100));
/// assert_eq!(*state.current(), Color::rgbw(1.0, 0.0, 0.0, 0.0));
/// assert_eq!(state.remaining(), Duration::ZERO);
/// ```
pub fn advance(state: &mut DeviceState, elapsed: Duration) {
    if state.remaining.is_zero() {
        return;
    }

    let target = state.effective_target();
    let ratio = (elapsed.as_secs_f32() / state.remaining.as_secs_f32()).clamp(0.0, 1.0);
    state.current = state.current.blend(&target, ratio);
    state.remaining = state.remaining.saturating_sub(elapsed);
}
