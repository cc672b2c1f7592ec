//! Joystick input conditioning: per-axis deadbands plus rising/falling edge
//! detection for buttons and the POV hat, on top of any polled device.
//!
//! ```rust
//! use joystick_conditioner::controller::{InputConditioner, ScriptedSource};
//!
//! let source = ScriptedSource::from_button_sequence(1, &[false, true, true]);
//! let mut cond = InputConditioner::with_deadbands(source, 0.05, 0.05)?;
//!
//! let mut presses = 0;
//! for _ in 0..3 {
//!     cond.refresh();
//!     if cond.rising_edge(1)? {
//!         presses += 1;
//!     }
//! }
//! assert_eq!(presses, 1);
//! # Ok::<(), joystick_conditioner::controller::ConditionerError>(())
//! ```

pub mod config;
pub mod controller;
