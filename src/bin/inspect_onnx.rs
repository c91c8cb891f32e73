use anyhow::Result;
use hand_sign::config::AppConfig;
use hand_sign::inference::load_session;
use std::env;

/// Print input/output signatures of the hand models (or of the paths given).
fn main() -> Result<()> {
    let mut paths: Vec<String> = env::args().skip(1).collect();
    if paths.is_empty() {
        let config = AppConfig::load(AppConfig::DEFAULT_PATH)?;
        paths.push(config.tracker.palm_model);
        paths.push(config.tracker.landmark_model);
    }

    for model_path in paths {
        println!("Inspecting model: {}", model_path);
        let session = match load_session(&model_path) {
            Ok(s) => s,
            Err(e) => {
                println!("  {:#}\n", e);
                continue;
            }
        };

        println!("--- Inputs ---");
        for (i, input) in session.inputs.iter().enumerate() {
            println!("#{}: {} ({:?})", i, input.name, input.input_type);
        }

        println!("--- Outputs ---");
        for (i, output) in session.outputs.iter().enumerate() {
            println!("#{}: {} ({:?})", i, output.name, output.output_type);
        }
        println!();
    }

    Ok(())
}
