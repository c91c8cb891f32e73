use std::time::Instant;

use anyhow::Context;
use clap::Parser;
use colored::*;
use tracing::{error, info, warn};
use tracing_subscriber::EnvFilter;

use hand_sign::announcer::Announcer;
use hand_sign::args::Args;
use hand_sign::camera::{print_cameras, CameraSource};
use hand_sign::config::AppConfig;
use hand_sign::inference::create_tracker;
use hand_sign::output::WindowOutput;
use hand_sign::overlay::{overlay_lines, OverlayPainter, SIMULATED_NOTICE};
use hand_sign::recognizer::GestureRecognizer;
use hand_sign::speech::{CommandSpeech, LogSpeech, SpeechEngine};
use hand_sign::stabilizer::GestureStabilizer;

fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("hand_sign=info")),
        )
        .init();

    let args = Args::parse();

    if args.list {
        return print_cameras();
    }

    // 0. Load Config
    let mut config = AppConfig::load(&args.config)?;
    if let Some(index) = args.cam_index {
        config.camera.index = index;
    }
    config.camera.mirror |= args.mirror;

    // 1. Setup Camera
    let mut camera = CameraSource::new(&config.camera).context("Error: Could not open webcam")?;
    info!("Capturing from {} at {}x{}", camera.name(), camera.width(), camera.height());

    // 2. Setup Hand Tracking
    let mut tracker = create_tracker(args.tracker, &config.tracker, args.allow_simulated)?;
    println!("Active Tracker: {}", tracker.name().cyan());
    if tracker.is_simulated() {
        warn!("Hands are scripted; announcements do not reflect the camera");
    }

    // 3. Setup Speech
    let engine: Box<dyn SpeechEngine> = if args.mute {
        Box::new(LogSpeech)
    } else {
        Box::new(CommandSpeech::new(&config.speech))
    };
    let announcer = Announcer::spawn(engine, config.speech.queue_depth)?;
    let mut recognizer = GestureRecognizer::new(
        GestureStabilizer::new(config.stabilizer.clone()),
        announcer,
    );

    // 4. Setup Output
    let mut window = WindowOutput::new(
        "Hand Gesture Recognition",
        camera.width() as usize,
        camera.height() as usize,
    )?;
    let painter = OverlayPainter::new(&config.ui);

    println!("{}", "Controls: [Q]/[Esc] Quit".yellow());

    // 5. Loop
    while !window.poll_quit() {
        let frame = match camera.capture() {
            Ok(frame) => frame,
            Err(e) => {
                error!("No frame captured: {:#}", e);
                break;
            }
        };

        let hands = match tracker.detect(&frame) {
            Ok(hands) => hands,
            Err(e) => {
                error!("Hand tracking failed: {:#}", e);
                break;
            }
        };
        let outcome = recognizer.process(&hands, Instant::now());

        let mut lines = overlay_lines(recognizer.current(), outcome.classification.confidence, &hands);
        if tracker.is_simulated() {
            lines.insert(0, SIMULATED_NOTICE.to_string());
        }
        window.render(&frame, &hands, &lines, &painter)?;
    }

    info!("Shutting down");
    recognizer.shutdown();
    Ok(())
}
