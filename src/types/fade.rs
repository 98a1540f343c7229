//! Fade durations for commanded color changes.

use std::time::Duration;

/// How long a commanded change fades before it completes.
///
/// Commands that omit a duration, or send 0, fall back to the default of
/// 1000 ms so every change stays a visible fade rather than a hard cut.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FadeTime {
    pub(crate) millis: u64,
}

impl Default for FadeTime {
    fn default() -> Self {
        Self::new()
    }
}

impl FadeTime {
    const DEFAULT_MS: u64 = 1000;

    /// Create a new FadeTime with the default duration (1000 ms).
    pub fn new() -> Self {
        FadeTime {
            millis: Self::DEFAULT_MS,
        }
    }

    /// Get the fade duration in milliseconds.
    pub fn millis(&self) -> u64 {
        self.millis
    }

    /// Get the fade duration as a [`Duration`].
    pub fn duration(&self) -> Duration {
        Duration::from_millis(self.millis)
    }

    /// Create a new FadeTime with the given duration in milliseconds.
    ///
    /// Returns `None` for 0, which callers treat the same as an omitted
    /// duration.
    ///
    /// # Examples
    ///
    /// ```
    /// use rgbw_strip_rs::FadeTime;
    ///
    /// assert!(FadeTime::create(250).is_some());
    /// assert!(FadeTime::create(0).is_none());
    /// assert_eq!(FadeTime::create(0).unwrap_or_default().millis(), 1000);
    /// ```
    pub fn create(millis: u64) -> Option<Self> {
        if millis > 0 {
            Some(FadeTime { millis })
        } else {
            None
        }
    }
}
