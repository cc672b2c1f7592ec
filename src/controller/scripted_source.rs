//! Scripted input source
//!
//! Replays a fixed list of frames, one per [`RawInputSource::refresh`].
//! The first refresh exposes the first frame and the last frame repeats
//! once the script runs out. Used for tests and the `--simulate` mode.

use tracing::debug;

use super::input_source::{button_slot, RawInputSource, BUTTON_COUNT, POV_CENTERED};

/// One sampled device state
#[derive(Clone, Debug, PartialEq)]
pub struct Frame {
    pub x: f64,
    pub y: f64,
    pub buttons: [bool; BUTTON_COUNT],
    pub pov: i32,
}

impl Default for Frame {
    fn default() -> Self {
        Self {
            x: 0.0,
            y: 0.0,
            buttons: [false; BUTTON_COUNT],
            pov: POV_CENTERED,
        }
    }
}

#[derive(Clone, Debug)]
pub struct ScriptedSource {
    frames: Vec<Frame>,
    cursor: usize,
    started: bool,
}

impl ScriptedSource {
    /// Replay `frames` in order. An empty script reads as a neutral device.
    pub fn from_frames(frames: Vec<Frame>) -> Self {
        let frames = if frames.is_empty() {
            vec![Frame::default()]
        } else {
            frames
        };
        debug!("Created scripted source with {} frames", frames.len());

        Self {
            frames,
            cursor: 0,
            started: false,
        }
    }

    /// Toggle a single button through `states`, everything else neutral
    pub fn from_button_sequence(button: u8, states: &[bool]) -> Self {
        let frames = states
            .iter()
            .map(|&pressed| {
                let mut frame = Frame::default();
                if let Some(slot) = button_slot(button) {
                    frame.buttons[slot] = pressed;
                }
                frame
            })
            .collect();
        Self::from_frames(frames)
    }

    pub fn from_pov_sequence(povs: &[i32]) -> Self {
        let frames = povs
            .iter()
            .map(|&pov| Frame {
                pov,
                ..Frame::default()
            })
            .collect();
        Self::from_frames(frames)
    }

    /// A stick resting at a constant position
    pub fn from_axis(x: f64, y: f64) -> Self {
        Self::from_frames(vec![Frame {
            x,
            y,
            ..Frame::default()
        }])
    }

    /// Overwrite the frame currently being read
    pub fn set_frame(&mut self, frame: Frame) {
        self.frames[self.cursor] = frame;
    }

    pub fn current(&self) -> &Frame {
        &self.frames[self.cursor]
    }

    /// True once the last frame is being read
    pub fn is_exhausted(&self) -> bool {
        self.started && self.cursor + 1 == self.frames.len()
    }
}

impl RawInputSource for ScriptedSource {
    fn refresh(&mut self) {
        if !self.started {
            self.started = true;
        } else if self.cursor + 1 < self.frames.len() {
            self.cursor += 1;
        }
    }

    fn x(&self) -> f64 {
        self.current().x
    }

    fn y(&self) -> f64 {
        self.current().y
    }

    fn raw_button(&self, index: u8) -> bool {
        button_slot(index)
            .map(|slot| self.current().buttons[slot])
            .unwrap_or(false)
    }

    fn pov(&self) -> i32 {
        self.current().pov
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_first_refresh_exposes_first_frame() {
        let mut source = ScriptedSource::from_pov_sequence(&[90, 180]);
        source.refresh();
        assert_eq!(source.pov(), 90);
        source.refresh();
        assert_eq!(source.pov(), 180);
        assert!(source.is_exhausted());
    }

    #[test]
    fn test_last_frame_repeats() {
        let mut source = ScriptedSource::from_button_sequence(4, &[false, true]);
        for _ in 0..5 {
            source.refresh();
        }
        assert!(source.raw_button(4));
        assert!(!source.raw_button(3));
    }

    #[test]
    fn test_empty_script_is_neutral() {
        let mut source = ScriptedSource::from_frames(Vec::new());
        source.refresh();
        assert_eq!(source.x(), 0.0);
        assert_eq!(source.pov(), POV_CENTERED);
        assert!(!source.raw_button(1));
    }

    #[test]
    fn test_out_of_range_button_reads_released() {
        let source = ScriptedSource::from_button_sequence(1, &[true]);
        assert!(!source.raw_button(0));
        assert!(!source.raw_button(13));
    }

    #[test]
    fn test_set_frame() {
        let mut source = ScriptedSource::from_axis(0.0, 0.0);
        source.set_frame(Frame {
            x: 0.5,
            ..Frame::default()
        });
        assert_eq!(source.x(), 0.5);
    }
}
