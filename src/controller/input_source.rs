//! Raw input capability set
//!
//! Everything the conditioner needs from a device: two axes, twelve
//! 1-based buttons and a POV hat. Hardware adapters and simulators both
//! implement [`RawInputSource`], so the conditioner never knows which one
//! it is talking to.

use std::fmt;

/// Number of buttons addressable by index (1..=BUTTON_COUNT)
pub const BUTTON_COUNT: usize = 12;

/// POV reading when no direction is held
pub const POV_CENTERED: i32 = -1;

pub const POV_UP: i32 = 0;
pub const POV_DOWN: i32 = 180;

/// A polled joystick-like device
///
/// Reads are expected to be cheap and side-effect free. Sources that have
/// to pump an event queue before their state is current do so in
/// [`RawInputSource::refresh`], which the caller invokes once per tick.
pub trait RawInputSource: fmt::Debug {
    /// Bring the cached device state up to date. No-op by default.
    fn refresh(&mut self) {}

    /// Horizontal axis in [-1, 1]
    fn x(&self) -> f64;

    /// Vertical axis in [-1, 1], forward is negative
    fn y(&self) -> f64;

    /// State of the button at a 1-based `index`. Unknown indices read as released.
    fn raw_button(&self, index: u8) -> bool;

    /// Hat direction in degrees (0 = up, 180 = down), [`POV_CENTERED`] when idle
    fn pov(&self) -> i32;
}

impl<S: RawInputSource + ?Sized> RawInputSource for Box<S> {
    fn refresh(&mut self) {
        (**self).refresh()
    }

    fn x(&self) -> f64 {
        (**self).x()
    }

    fn y(&self) -> f64 {
        (**self).y()
    }

    fn raw_button(&self, index: u8) -> bool {
        (**self).raw_button(index)
    }

    fn pov(&self) -> i32 {
        (**self).pov()
    }
}

/// Convert a 1-based button index into an array slot
pub(crate) fn button_slot(index: u8) -> Option<usize> {
    let index = index as usize;
    if (1..=BUTTON_COUNT).contains(&index) {
        Some(index - 1)
    } else {
        None
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_button_slot_bounds() {
        assert_eq!(button_slot(0), None);
        assert_eq!(button_slot(1), Some(0));
        assert_eq!(button_slot(12), Some(11));
        assert_eq!(button_slot(13), None);
        assert_eq!(button_slot(u8::MAX), None);
    }
}
