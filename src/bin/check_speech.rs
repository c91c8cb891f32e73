use anyhow::Result;
use hand_sign::config::AppConfig;
use hand_sign::gesture::Gesture;
use hand_sign::speech::{CommandSpeech, SpeechEngine};

/// Speak every gesture phrase through the configured TTS program.
fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_max_level(tracing::Level::DEBUG)
        .init();

    let config = AppConfig::load(AppConfig::DEFAULT_PATH)?;
    let mut engine = CommandSpeech::new(&config.speech);
    println!("Speech engine: {}", engine.name());

    let gestures = [
        Gesture::Hello,
        Gesture::Fine,
        Gesture::NotGood,
        Gesture::Cool,
        Gesture::Help,
        Gesture::ThankYou,
    ];

    let mut failures = 0;
    for gesture in gestures {
        let Some(phrase) = gesture.phrase() else {
            println!("{:<10} | (no phrase)", gesture.label());
            continue;
        };
        match engine.speak(phrase) {
            Ok(()) => println!("{:<10} | \"{}\" OK", gesture.label(), phrase),
            Err(e) => {
                failures += 1;
                println!("{:<10} | \"{}\" FAILED: {}", gesture.label(), phrase, e);
            }
        }
    }

    if failures > 0 {
        anyhow::bail!("{} phrase(s) failed", failures);
    }
    Ok(())
}
