//! Input Conditioner - deadband normalization and edge detection
//!
//! Wraps a [`RawInputSource`] and adds the two pieces of state a control
//! loop usually wants on top of raw polling:
//!
//! - **Banded axes**: readings inside the configured deadband are zeroed,
//!   readings outside are rescaled by `1 / (1 - deadband)`
//! - **Edges**: per-button rising/falling detection and POV up/down toggles,
//!   each remembering the sample seen on its previous call
//!
//! Detection is exactly as fine-grained as the calling loop. Every call
//! samples the source once and overwrites the remembered value for that
//! detector, so call each detector once per tick.
//!
//! The conditioner is single-writer: all stateful reads take `&mut self`.

use std::fmt;
use tracing::{debug, error, info};

use super::input_source::{button_slot, RawInputSource, BUTTON_COUNT, POV_DOWN, POV_UP};

/// Which stick axis a deadband belongs to
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum AxisType {
    X,
    Y,
}

impl fmt::Display for AxisType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AxisType::X => write!(f, "x"),
            AxisType::Y => write!(f, "y"),
        }
    }
}

/// Per-axis deadbands, each a fraction in [0, 1)
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct DeadbandSettings {
    pub x: f64,
    pub y: f64,
}

impl DeadbandSettings {
    pub fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }

    /// Reject deadbands that would make the rescale undefined
    pub fn validate(&self) -> Result<(), ConditionerError> {
        check_deadband(AxisType::X, self.x)?;
        check_deadband(AxisType::Y, self.y)
    }
}

fn check_deadband(axis: AxisType, value: f64) -> Result<(), ConditionerError> {
    if value.is_finite() && (0.0..1.0).contains(&value) {
        Ok(())
    } else {
        error!("Rejecting {} deadband {}: must be in [0, 1)", axis, value);
        Err(ConditionerError::InvalidDeadband { axis, value })
    }
}

// Conditioner errors
#[derive(Debug, thiserror::Error, PartialEq)]
pub enum ConditionerError {
    #[error("Invalid button index {0}: expected 1..={max}", max = BUTTON_COUNT)]
    InvalidButton(u8),

    #[error("Invalid {axis} deadband {value}: expected a value in [0, 1)")]
    InvalidDeadband { axis: AxisType, value: f64 },
}

/// Stateful wrapper adding deadbands and edge detection to a raw source
#[derive(Debug)]
pub struct InputConditioner<S: RawInputSource> {
    source: S,
    deadbands: DeadbandSettings,

    // Last samples seen by each detector; rising and falling are tracked apart
    last_rising: [bool; BUTTON_COUNT],
    last_falling: [bool; BUTTON_COUNT],
    last_top: bool,
    last_down: bool,
}

impl<S: RawInputSource> InputConditioner<S> {
    /// Create a conditioner with validated deadbands
    pub fn new(source: S, deadbands: DeadbandSettings) -> Result<Self, ConditionerError> {
        deadbands.validate()?;
        info!(
            "Creating input conditioner with deadbands x={} y={}",
            deadbands.x, deadbands.y
        );

        Ok(Self {
            source,
            deadbands,
            last_rising: [false; BUTTON_COUNT],
            last_falling: [false; BUTTON_COUNT],
            last_top: false,
            last_down: false,
        })
    }

    pub fn with_deadbands(
        source: S,
        deadband_x: f64,
        deadband_y: f64,
    ) -> Result<Self, ConditionerError> {
        Self::new(source, DeadbandSettings::new(deadband_x, deadband_y))
    }

    /// Create a conditioner that passes axis values through unchanged
    pub fn without_deadband(source: S) -> Self {
        Self {
            source,
            deadbands: DeadbandSettings::default(),
            last_rising: [false; BUTTON_COUNT],
            last_falling: [false; BUTTON_COUNT],
            last_top: false,
            last_down: false,
        }
    }

    pub fn deadbands(&self) -> DeadbandSettings {
        self.deadbands
    }

    pub fn source(&self) -> &S {
        &self.source
    }

    pub fn source_mut(&mut self) -> &mut S {
        &mut self.source
    }

    /// Let the source pull in the latest device state
    pub fn refresh(&mut self) {
        self.source.refresh();
    }

    /// Forget every remembered sample, as if freshly constructed
    pub fn reset_edges(&mut self) {
        debug!("Resetting edge detector state");
        self.last_rising = [false; BUTTON_COUNT];
        self.last_falling = [false; BUTTON_COUNT];
        self.last_top = false;
        self.last_down = false;
    }

    /// X axis with the x deadband applied
    pub fn banded_x(&self) -> f64 {
        apply_deadband(self.source.x(), self.deadbands.x)
    }

    /// Y axis with the y deadband applied
    pub fn banded_y(&self) -> f64 {
        apply_deadband(self.source.y(), self.deadbands.y)
    }

    /// True when `button` is held now but was released on the previous call
    pub fn rising_edge(&mut self, button: u8) -> Result<bool, ConditionerError> {
        let slot = button_slot(button).ok_or(ConditionerError::InvalidButton(button))?;
        let cur = self.source.raw_button(button);
        let edge = !self.last_rising[slot] && cur;
        self.last_rising[slot] = cur;

        if edge {
            debug!("Rising edge on button {}", button);
        }
        Ok(edge)
    }

    /// True when `button` was held on the previous call and is released now
    pub fn falling_edge(&mut self, button: u8) -> Result<bool, ConditionerError> {
        let slot = button_slot(button).ok_or(ConditionerError::InvalidButton(button))?;
        let cur = self.source.raw_button(button);
        let edge = self.last_falling[slot] && !cur;
        self.last_falling[slot] = cur;

        if edge {
            debug!("Falling edge on button {}", button);
        }
        Ok(edge)
    }

    /// True when the hat leaves the up position
    pub fn top_toggle(&mut self) -> bool {
        let cur = self.source.pov() == POV_UP;
        let toggled = self.last_top && !cur;
        self.last_top = cur;
        toggled
    }

    /// True when the hat leaves the down position
    pub fn down_toggle(&mut self) -> bool {
        let cur = self.source.pov() == POV_DOWN;
        let toggled = self.last_down && !cur;
        self.last_down = cur;
        toggled
    }
}

/// Zero values inside the deadband and rescale the rest.
///
/// Outside the band the result is `sign(v) * |v - deadband| / (1 - deadband)`.
/// The offset is subtracted from the signed value, so negative inputs land
/// further from zero than positive ones and may exceed -1. Nothing is clamped.
pub fn apply_deadband(value: f64, deadband: f64) -> f64 {
    if value.abs() < deadband {
        0.0
    } else {
        signum(value) * ((value - deadband).abs() / (1.0 - deadband))
    }
}

// f64::signum maps 0.0 to 1.0; a centered stick must stay at 0
fn signum(value: f64) -> f64 {
    if value > 0.0 {
        1.0
    } else if value < 0.0 {
        -1.0
    } else {
        0.0
    }
}
