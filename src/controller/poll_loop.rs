//! Fixed-tick poll loop
//!
//! Drives an [`InputConditioner`] at a constant interval, the way a robot
//! control loop would: refresh the source once, read the banded axes, run
//! every edge detector once, report.
//!
//! ```text
//! PollLoop<Initializing> ──initialize()──► PollLoop<Polling> ──tick()/run()──► TickReport
//! ```

use chrono::Local;
use statum::{machine, state};
use std::time::Duration;
use tracing::{debug, error, info};

use super::conditioner::{ConditionerError, InputConditioner};
use super::input_source::{RawInputSource, BUTTON_COUNT};

/// Conditioner over whichever source the caller picked at runtime
pub type DynConditioner = InputConditioner<Box<dyn RawInputSource>>;

// Poll settings
#[derive(Clone, Debug)]
pub struct PollSettings {
    pub poll_interval_ms: u64,
}

impl Default for PollSettings {
    fn default() -> Self {
        Self {
            poll_interval_ms: 20,
        }
    }
}

// Poll loop errors
#[derive(Debug, thiserror::Error)]
pub enum PollError {
    #[error("Conditioner error: {0}")]
    Conditioner(#[from] ConditionerError),

    #[error("Poll interval must be greater than zero")]
    InvalidInterval,
}

/// Everything observed during a single tick
#[derive(Clone, Debug, Default, PartialEq)]
pub struct TickReport {
    pub x: f64,
    pub y: f64,
    /// Buttons that went down this tick
    pub rising: Vec<u8>,
    /// Buttons that came up this tick
    pub falling: Vec<u8>,
    pub top_toggle: bool,
    pub down_toggle: bool,
}

impl TickReport {
    pub fn has_edges(&self) -> bool {
        !self.rising.is_empty() || !self.falling.is_empty() || self.top_toggle || self.down_toggle
    }
}

/// Totals for a finished [`PollLoop::run`]
#[derive(Clone, Debug, Default, PartialEq)]
pub struct PollSummary {
    pub ticks: u64,
    pub edges: u64,
}

#[state]
#[derive(Debug, Clone)]
pub enum PollState {
    Initializing,
    Polling,
}

#[machine]
#[derive(Debug)]
pub struct PollLoop<S: PollState> {
    conditioner: DynConditioner,
    settings: PollSettings,
}

impl PollLoop<Initializing> {
    pub fn create(
        conditioner: DynConditioner,
        settings: Option<PollSettings>,
    ) -> Result<Self, PollError> {
        let settings = settings.unwrap_or_default();
        debug!("Creating poll loop with settings: {:?}", settings);

        if settings.poll_interval_ms == 0 {
            error!("Refusing to poll with a zero interval");
            return Err(PollError::InvalidInterval);
        }

        Ok(Self::new(conditioner, settings))
    }

    /// Discard anything the detectors remember and start polling
    pub fn initialize(mut self) -> PollLoop<Polling> {
        info!(
            "Poll loop initialized: interval {}ms, deadbands {:?}",
            self.settings.poll_interval_ms,
            self.conditioner.deadbands()
        );
        self.conditioner.reset_edges();
        self.transition()
    }
}

impl PollLoop<Polling> {
    /// Sample the device once and run every detector
    pub fn tick(&mut self) -> Result<TickReport, PollError> {
        self.conditioner.refresh();

        let mut report = TickReport {
            x: self.conditioner.banded_x(),
            y: self.conditioner.banded_y(),
            ..TickReport::default()
        };

        for button in 1..=BUTTON_COUNT as u8 {
            if self.conditioner.rising_edge(button)? {
                report.rising.push(button);
            }
            if self.conditioner.falling_edge(button)? {
                report.falling.push(button);
            }
        }
        report.top_toggle = self.conditioner.top_toggle();
        report.down_toggle = self.conditioner.down_toggle();

        debug!("Tick: x={:.4} y={:.4}", report.x, report.y);
        Ok(report)
    }

    /// Tick at the configured interval, forever or for `max_ticks` ticks
    pub async fn run(&mut self, max_ticks: Option<u64>) -> Result<PollSummary, PollError> {
        info!("Starting poll loop");

        let mut ticker =
            tokio::time::interval(Duration::from_millis(self.settings.poll_interval_ms));
        let mut summary = PollSummary::default();

        let mut window_ticks = 0u64;
        let mut last_log_time = Local::now();
        let log_interval = chrono::Duration::seconds(10);

        while max_ticks.map_or(true, |max| summary.ticks < max) {
            ticker.tick().await;

            let report = self.tick()?;
            summary.ticks += 1;
            window_ticks += 1;

            if report.has_edges() {
                let now = Local::now();
                for button in &report.rising {
                    info!("Button {} pressed at {}", button, now.format("%H:%M:%S.%3f"));
                }
                for button in &report.falling {
                    info!("Button {} released at {}", button, now.format("%H:%M:%S.%3f"));
                }
                if report.top_toggle {
                    info!("POV left up at {}", now.format("%H:%M:%S.%3f"));
                }
                if report.down_toggle {
                    info!("POV left down at {}", now.format("%H:%M:%S.%3f"));
                }
                summary.edges += (report.rising.len()
                    + report.falling.len()
                    + report.top_toggle as usize
                    + report.down_toggle as usize) as u64;
            }

            let now = Local::now();
            if now - last_log_time > log_interval {
                info!(
                    "Poll loop stats: {} ticks in last {} seconds (avg {:.2}/sec), stick x={:.3} y={:.3}",
                    window_ticks,
                    log_interval.num_seconds(),
                    window_ticks as f64 / log_interval.num_seconds() as f64,
                    report.x,
                    report.y
                );
                window_ticks = 0;
                last_log_time = now;
            }
        }

        info!(
            "Poll loop finished after {} ticks with {} edges",
            summary.ticks, summary.edges
        );
        Ok(summary)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::controller::scripted_source::{Frame, ScriptedSource};

    fn polling(source: ScriptedSource, deadband: f64) -> PollLoop<Polling> {
        let source: Box<dyn RawInputSource> = Box::new(source);
        let conditioner = InputConditioner::with_deadbands(source, deadband, deadband).unwrap();
        PollLoop::create(conditioner, Some(PollSettings { poll_interval_ms: 1 }))
            .unwrap()
            .initialize()
    }

    fn frame_with(buttons: &[u8], pov: i32) -> Frame {
        let mut frame = Frame {
            pov,
            ..Frame::default()
        };
        for &b in buttons {
            frame.buttons[b as usize - 1] = true;
        }
        frame
    }

    #[test]
    fn test_zero_interval_rejected() {
        let conditioner = InputConditioner::without_deadband(
            Box::new(ScriptedSource::from_axis(0.0, 0.0)) as Box<dyn RawInputSource>,
        );
        let result = PollLoop::create(conditioner, Some(PollSettings { poll_interval_ms: 0 }));
        assert!(matches!(result, Err(PollError::InvalidInterval)));
    }

    #[test]
    fn test_tick_reports_edges() {
        let source = ScriptedSource::from_frames(vec![
            frame_with(&[1], 0),
            frame_with(&[1, 2], 0),
            frame_with(&[2], 90),
        ]);
        let mut poll = polling(source, 0.0);

        let first = poll.tick().unwrap();
        assert_eq!(first.rising, vec![1]);
        assert!(first.falling.is_empty());
        assert!(!first.top_toggle);

        let second = poll.tick().unwrap();
        assert_eq!(second.rising, vec![2]);
        assert!(second.falling.is_empty());

        let third = poll.tick().unwrap();
        assert!(third.rising.is_empty());
        assert_eq!(third.falling, vec![1]);
        assert!(third.top_toggle);
        assert!(!third.down_toggle);
    }

    #[test]
    fn test_tick_applies_deadband() {
        let mut poll = polling(ScriptedSource::from_axis(0.05, 0.6), 0.2);
        let report = poll.tick().unwrap();
        assert_eq!(report.x, 0.0);
        assert!((report.y - 0.5).abs() < 1e-12);
        assert!(!report.has_edges());
    }

    #[tokio::test]
    async fn test_run_stops_after_max_ticks() {
        let source = ScriptedSource::from_button_sequence(7, &[false, true, false, true]);
        let mut poll = polling(source, 0.0);

        let summary = poll.run(Some(4)).await.unwrap();
        // two presses and one release
        assert_eq!(summary, PollSummary { ticks: 4, edges: 3 });
    }
}
