pub mod announcer;
pub mod args;
pub mod camera;
pub mod config;
pub mod detector;
pub mod font;
pub mod geometry;
pub mod gesture;
pub mod inference;
pub mod output;
pub mod overlay;
pub mod pipeline;
pub mod recognizer;
pub mod speech;
pub mod stabilizer;
pub mod ttf;
pub mod types;
