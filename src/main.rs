//! yield-zones CLI entry point
//!
//! Yield map interpolation and management zone delineation

use yield_zones::cli;

fn main() {
    if let Err(e) = cli::run() {
        eprintln!("Error: {}", e);
        std::process::exit(1);
    }
}
