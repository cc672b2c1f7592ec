//! Controller subsystem for joystick input conditioning
//!
//! 1. [`input_source`] - Raw device capability set
//! 2. [`gilrs_source`] / [`scripted_source`] - Hardware and simulated devices
//! 3. [`conditioner`] - Deadbands and edge detection
//! 4. [`poll_loop`] - Fixed-tick driver
//!
//! # Architecture
//!
//! ```text
//! Gamepad ──► RawInputSource ──► InputConditioner ──► PollLoop ──► TickReport
//!             (x, y, buttons, pov)  (banded, edges)     (20ms)
//! ```
//!
//! Everything runs on one task. The conditioner takes `&mut self` for every
//! stateful read, so one owner polls it per tick.

pub mod conditioner;
pub mod gilrs_source;
pub mod input_source;
pub mod poll_loop;
pub mod scripted_source;

pub use conditioner::{AxisType, ConditionerError, DeadbandSettings, InputConditioner};
pub use gilrs_source::{GilrsSource, SourceError};
pub use input_source::{RawInputSource, BUTTON_COUNT, POV_CENTERED, POV_DOWN, POV_UP};
pub use poll_loop::{DynConditioner, PollError, PollLoop, PollSettings, PollSummary, TickReport};
pub use scripted_source::{Frame, ScriptedSource};
