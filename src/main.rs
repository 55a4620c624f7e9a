//! # Blockfield Entry Point
//!
//! Calls into the library's `run()` function and turns a fatal error into exit code 1.
//!
//! ## Usage
//!
//! ```bash
//! cargo run --release
//! ```

fn main() {
    if let Err(err) = blockfield::run() {
        log::error!("Fatal: {}", err);
        eprintln!("blockfield: {err}");
        std::process::exit(1);
    }
}
