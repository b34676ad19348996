//! Renderer settings and brightness scaling
//!
//! The render task owns the output cadence (tick period) and a global
//! brightness. Out-of-range requests are rejected silently and the
//! previous value retained; callers (UDP control records, the control
//! surface) have no error channel for them.

use crate::point::Point;

/// Shortest allowed tick period in microseconds (100 kpps).
pub const MIN_TICK_PERIOD_US: u32 = 10;

/// Brightness is a percentage; values above this are rejected.
pub const MAX_BRIGHTNESS: u8 = 100;

/// Validated output settings shared by the tick and render tasks.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct RenderSettings {
    period_us: u32,
    brightness: u8,
}

impl Default for RenderSettings {
    fn default() -> Self {
        Self::new()
    }
}

impl RenderSettings {
    pub const fn new() -> Self {
        Self {
            period_us: MIN_TICK_PERIOD_US,
            brightness: MAX_BRIGHTNESS,
        }
    }

    pub fn period_us(&self) -> u32 {
        self.period_us
    }

    pub fn brightness(&self) -> u8 {
        self.brightness
    }

    /// Set the tick period. Periods below [`MIN_TICK_PERIOD_US`] are
    /// rejected and the previous value kept; returns whether the value
    /// was accepted.
    pub fn set_period_us(&mut self, val: u32) -> bool {
        if val < MIN_TICK_PERIOD_US {
            return false;
        }
        self.period_us = val;
        true
    }

    /// Set the brightness percentage. Values above [`MAX_BRIGHTNESS`]
    /// are rejected and the previous value kept.
    pub fn set_brightness(&mut self, val: u8) -> bool {
        if val > MAX_BRIGHTNESS {
            return false;
        }
        self.brightness = val;
        true
    }
}

/// Scale each colour channel linearly by `brightness` percent.
///
/// Identity at 100 and above; position channels are never touched.
pub fn scale_brightness(p: Point, brightness: u8) -> Point {
    if brightness >= MAX_BRIGHTNESS {
        return p;
    }
    let scale = |c: u16| ((c as u32 * brightness as u32) / 100) as u16;
    Point {
        x: p.x,
        y: p.y,
        r: scale(p.r),
        g: scale(p.g),
        b: scale(p.b),
    }
}
