//! Gamepad input source backed by gilrs
//!
//! Selects one connected gamepad by its position in gilrs' device list and
//! exposes it through [`RawInputSource`] with driver-station style numbering:
//!
//! | Index | gilrs button   |
//! |-------|----------------|
//! | 1     | South (A)      |
//! | 2     | East (B)       |
//! | 3     | North (Y)      |
//! | 4     | West (X)       |
//! | 5     | LeftTrigger    |
//! | 6     | RightTrigger   |
//! | 7     | Select         |
//! | 8     | Start          |
//! | 9     | LeftThumb      |
//! | 10    | RightThumb     |
//! | 11    | LeftTrigger2   |
//! | 12    | RightTrigger2  |
//!
//! The D-pad is folded into a single POV angle.

use gilrs::{Axis, Button, Event, EventType, Gamepad, GamepadId, Gilrs};
use tracing::{debug, error, info, warn};

use super::input_source::{RawInputSource, POV_CENTERED};

// Source errors
#[derive(Debug, thiserror::Error)]
pub enum SourceError {
    #[error("Failed to initialize gamepad backend: {0}")]
    Initialization(String),

    #[error("No gamepad at index {index} ({available} connected)")]
    NoDevice { index: usize, available: usize },
}

#[derive(Debug)]
pub struct GilrsSource {
    gilrs: Gilrs,
    gamepad_id: GamepadId,
    connected: bool,
}

impl GilrsSource {
    /// Open the gamepad at `device_index` among the currently connected ones
    pub fn open(device_index: usize) -> Result<Self, SourceError> {
        info!("Initializing gilrs controller interface");
        let gilrs = match Gilrs::new() {
            Ok(g) => {
                info!("Successfully initialized gilrs");
                g
            }
            Err(e) => {
                error!("Failed to initialize gilrs: {}", e);
                return Err(SourceError::Initialization(e.to_string()));
            }
        };

        let gamepads: Vec<(GamepadId, Gamepad<'_>)> = gilrs.gamepads().collect();
        info!("Found {} gamepads:", gamepads.len());
        for (idx, (id, gamepad)) in gamepads.iter().enumerate() {
            info!(
                "  [{}] ID: {}, Name: {}, UUID: {:?}",
                idx,
                id,
                gamepad.name(),
                gamepad.uuid()
            );
        }

        let Some((gamepad_id, gamepad)) = gamepads.get(device_index) else {
            warn!("No gamepad at index {}", device_index);
            return Err(SourceError::NoDevice {
                index: device_index,
                available: gamepads.len(),
            });
        };
        let gamepad_id = *gamepad_id;
        info!("Selected gamepad: {} ({})", gamepad.name(), gamepad_id);
        drop(gamepads);

        Ok(Self {
            gilrs,
            gamepad_id,
            connected: true,
        })
    }

    fn gamepad(&self) -> Option<Gamepad<'_>> {
        if self.connected {
            self.gilrs.connected_gamepad(self.gamepad_id)
        } else {
            None
        }
    }
}

impl RawInputSource for GilrsSource {
    // gilrs only updates its cached gamepad state while events are consumed
    fn refresh(&mut self) {
        while let Some(Event { id, event, .. }) = self.gilrs.next_event() {
            if id != self.gamepad_id {
                continue;
            }
            match event {
                EventType::Connected => {
                    info!("Gamepad {} reconnected", id);
                    self.connected = true;
                }
                EventType::Disconnected => {
                    warn!("Gamepad {} disconnected, reading neutral state", id);
                    self.connected = false;
                }
                _ => debug!("Gamepad event: {:?}", event),
            }
        }
    }

    fn x(&self) -> f64 {
        self.gamepad()
            .map(|g| g.value(Axis::LeftStickX) as f64)
            .unwrap_or(0.0)
    }

    // gilrs reports up as positive
    fn y(&self) -> f64 {
        self.gamepad()
            .map(|g| -(g.value(Axis::LeftStickY) as f64))
            .unwrap_or(0.0)
    }

    fn raw_button(&self, index: u8) -> bool {
        match (self.gamepad(), map_button(index)) {
            (Some(g), Some(button)) => g.is_pressed(button),
            _ => false,
        }
    }

    fn pov(&self) -> i32 {
        self.gamepad()
            .map(|g| {
                pov_from_dpad(
                    g.is_pressed(Button::DPadUp),
                    g.is_pressed(Button::DPadRight),
                    g.is_pressed(Button::DPadDown),
                    g.is_pressed(Button::DPadLeft),
                )
            })
            .unwrap_or(POV_CENTERED)
    }
}

/// Map a 1-based button index to the gilrs button
pub fn map_button(index: u8) -> Option<Button> {
    match index {
        1 => Some(Button::South),
        2 => Some(Button::East),
        3 => Some(Button::North),
        4 => Some(Button::West),
        5 => Some(Button::LeftTrigger),
        6 => Some(Button::RightTrigger),
        7 => Some(Button::Select),
        8 => Some(Button::Start),
        9 => Some(Button::LeftThumb),
        10 => Some(Button::RightThumb),
        11 => Some(Button::LeftTrigger2),
        12 => Some(Button::RightTrigger2),
        _ => None,
    }
}

/// Fold D-pad buttons into a POV angle; conflicting presses read as centered
pub fn pov_from_dpad(up: bool, right: bool, down: bool, left: bool) -> i32 {
    match (up, right, down, left) {
        (true, false, false, false) => 0,
        (true, true, false, false) => 45,
        (false, true, false, false) => 90,
        (false, true, true, false) => 135,
        (false, false, true, false) => 180,
        (false, false, true, true) => 225,
        (false, false, false, true) => 270,
        (true, false, false, true) => 315,
        _ => POV_CENTERED,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_button_mapping() {
        assert_eq!(map_button(0), None);
        assert_eq!(map_button(1), Some(Button::South));
        assert_eq!(map_button(4), Some(Button::West));
        assert_eq!(map_button(8), Some(Button::Start));
        assert_eq!(map_button(12), Some(Button::RightTrigger2));
        assert_eq!(map_button(13), None);
    }

    #[test]
    fn test_pov_cardinals_and_diagonals() {
        assert_eq!(pov_from_dpad(false, false, false, false), POV_CENTERED);
        assert_eq!(pov_from_dpad(true, false, false, false), 0);
        assert_eq!(pov_from_dpad(false, true, true, false), 135);
        assert_eq!(pov_from_dpad(false, false, true, false), 180);
        assert_eq!(pov_from_dpad(true, false, false, true), 315);
    }

    #[test]
    fn test_pov_conflicting_presses() {
        assert_eq!(pov_from_dpad(true, false, true, false), POV_CENTERED);
        assert_eq!(pov_from_dpad(true, true, true, true), POV_CENTERED);
    }
}
