use clap::{Parser, ValueEnum};

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum TrackerKind {
    /// ONNX palm detector + hand landmark model
    Onnx,
    /// Scripted hands, no models needed
    Simulated,
}

#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
pub struct Args {
    /// Camera index (overrides config)
    #[arg(short, long)]
    pub cam_index: Option<u32>,

    /// Hand tracker backend
    #[arg(long, value_enum, default_value_t = TrackerKind::Onnx)]
    pub tracker: TrackerKind,

    /// Use scripted hands if the ONNX models cannot be loaded
    #[arg(long, default_value_t = false)]
    pub allow_simulated: bool,

    /// Mirror the camera output
    #[arg(long, default_value_t = false)]
    pub mirror: bool,

    /// Log phrases instead of speaking them
    #[arg(long, default_value_t = false)]
    pub mute: bool,

    /// Configuration file
    #[arg(long, default_value = "config.json")]
    pub config: String,

    /// List available cameras
    #[arg(long)]
    pub list: bool,
}
