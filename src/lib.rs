#![warn(missing_docs)]
#![warn(rustdoc::missing_crate_level_docs)]
#![warn(rustdoc::invalid_rust_codeblocks)]

//! # Blockfield
//!
//! An interactive voxel sandbox rendered with WGPU: a fixed-size world of unit blocks
//! that can be placed and removed under the crosshair, with a batched immediate-mode UI
//! drawn on top.
//!
//! ## Key Modules
//!
//! * `application_state` - Manages the application lifecycle, window and input
//! * `config` - Runtime configuration loaded from an optional JSON file
//! * `core` - The stable-id dense pool shared by blocks and textures
//! * `engine_state` - The world, camera, rendering pipelines and UI
//! * `error` - The top-level error type
//!
//! ## Usage
//!
//! ```rust,no_run
//! fn main() -> Result<(), blockfield::error::EngineError> {
//!     blockfield::run()
//! }
//! ```

use application_state::ApplicationState;
use log::info;
use winit::event_loop::EventLoop;

mod application_state;
pub mod config;
mod core;
mod engine_state;
pub mod error;

use config::EngineConfig;
use error::EngineError;

/// Initializes logging, loads the configuration and runs the event loop until the window
/// closes or a fatal error occurs.
///
/// # Errors
/// The error that stopped the application
pub fn run() -> Result<(), EngineError> {
    let mut log_builder = env_logger::Builder::new();
    log_builder
        .target(env_logger::Target::Stdout)
        .filter_level(log::LevelFilter::Info)
        .parse_env("RUST_LOG")
        .init();

    info!(
        "{} {} ({} build)",
        env!("CARGO_PKG_NAME"),
        env!("CARGO_PKG_VERSION"),
        if cfg!(debug_assertions) { "debug" } else { "release" }
    );

    let config = EngineConfig::load()?;
    let event_loop = EventLoop::new()?;

    let mut state = ApplicationState::new(config);
    event_loop.run_app(&mut state)?;

    state.into_result()
}
