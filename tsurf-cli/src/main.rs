//! tsurf2obj - GOCAD TSurf to OBJ converter
//!
//! Usage: tsurf2obj <GOCAD_TSURF_FILE> [-o <DIR>] [--config <FILE>] [--log-level <LEVEL>]

use std::process::ExitCode;

fn main() -> ExitCode {
    tsurf_cli::run()
}
