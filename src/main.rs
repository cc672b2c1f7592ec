use clap::Parser;
use color_eyre::{eyre::eyre, Result};
use joystick_conditioner::config::ConditionerConfig;
use joystick_conditioner::controller::{
    Frame, GilrsSource, InputConditioner, PollLoop, RawInputSource, ScriptedSource,
};
use std::path::PathBuf;
use tracing::{debug, info, Level};
use tracing_subscriber::FmtSubscriber;

/// Poll a gamepad through deadbands and edge detectors
#[derive(Debug, Parser)]
#[command(version, about)]
struct Args {
    /// Path to the TOML configuration (defaults to the user config dir)
    #[arg(long)]
    config: Option<PathBuf>,

    /// Replay a scripted demo device instead of opening a gamepad
    #[arg(long)]
    simulate: bool,

    /// Stop after this many ticks
    #[arg(long)]
    ticks: Option<u64>,
}

#[tokio::main]
async fn main() -> Result<()> {
    setup()?;

    let args = Args::parse();
    debug!("Arguments: {:?}", args);

    let config_path = args
        .config
        .clone()
        .unwrap_or_else(ConditionerConfig::default_path);
    let config = ConditionerConfig::load_or_default(&config_path).await?;
    config.validate()?;
    info!("Using configuration: {:?}", config);

    let source: Box<dyn RawInputSource> = if args.simulate {
        info!("Running against simulated input");
        Box::new(demo_source())
    } else {
        Box::new(
            GilrsSource::open(config.device_index)
                .map_err(|e| eyre!("Failed to open gamepad: {}", e))?,
        )
    };

    let conditioner = InputConditioner::new(source, config.deadbands())?;
    let mut poll_loop = PollLoop::create(conditioner, Some(config.poll_settings()))?.initialize();

    let ticks = args.ticks.or(if args.simulate { Some(8) } else { None });
    let summary = poll_loop.run(ticks).await?;
    info!("Done: {} ticks, {} edges", summary.ticks, summary.edges);

    Ok(())
}

fn setup() -> Result<()> {
    if std::env::var("RUST_LIB_BACKTRACE").is_err() {
        std::env::set_var("RUST_LIB_BACKTRACE", "0")
    }
    color_eyre::install()?;
    if std::env::var("RUST_LOG").is_err() {
        std::env::set_var("RUST_LOG", "info")
    }
    setup_logging_env();
    Ok(())
}

fn setup_logging_env() {
    FmtSubscriber::builder()
        .with_max_level(Level::INFO)
        .with_target(false)
        .with_thread_ids(true)
        .with_file(true)
        .with_line_number(true)
        .pretty()
        .init();
}

// Stick sweep with a button tap and a POV flick
fn demo_source() -> ScriptedSource {
    let mut frames = Vec::new();
    for (i, x) in [0.02, 0.3, 0.7, 1.0, -0.5, 0.0, 0.0, 0.0].into_iter().enumerate() {
        let mut frame = Frame {
            x,
            y: -x / 2.0,
            ..Frame::default()
        };
        frame.buttons[0] = (2..4).contains(&i);
        frame.pov = if i == 5 { 0 } else { -1 };
        frames.push(frame);
    }
    ScriptedSource::from_frames(frames)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_args_defaults() {
        let args = Args::try_parse_from(["joystick-conditioner"]).unwrap();
        assert!(args.config.is_none());
        assert!(!args.simulate);
        assert!(args.ticks.is_none());
    }

    #[test]
    fn test_args_all_flags() {
        let args = Args::try_parse_from([
            "joystick-conditioner",
            "--config",
            "/tmp/pad.toml",
            "--simulate",
            "--ticks",
            "5",
        ])
        .unwrap();
        assert_eq!(args.config, Some(PathBuf::from("/tmp/pad.toml")));
        assert!(args.simulate);
        assert_eq!(args.ticks, Some(5));
    }

    #[test]
    fn test_args_reject_bad_input() {
        assert!(Args::try_parse_from(["joystick-conditioner", "--ticks", "many"]).is_err());
        assert!(Args::try_parse_from(["joystick-conditioner", "--bogus"]).is_err());
    }

    #[test]
    fn test_demo_source_taps_button_one() {
        let mut source = demo_source();
        let mut pressed = Vec::new();
        for _ in 0..8 {
            source.refresh();
            pressed.push(source.raw_button(1));
        }
        assert_eq!(pressed.iter().filter(|&&p| p).count(), 2);
    }
}
