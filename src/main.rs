mod app;
mod audio;
mod catalog;
mod config;
mod error;
mod logging;
mod progress;
mod runtime;
mod transport;
mod ui;
mod visualizer;

fn main() -> Result<(), Box<dyn std::error::Error>> {
    runtime::run()?;
    Ok(())
}
