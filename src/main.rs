mod app;
mod audio;
mod catalog;
mod config;
mod mpris;
mod playback;
mod runtime;
mod store;
mod ui;

fn main() -> Result<(), Box<dyn std::error::Error>> {
    runtime::run()
}
