//! Example: List the surfaces in a TSurf file without writing anything
//!
//! Usage: cargo run --example list_surfaces -- path/to/model.ts

use std::env;
use std::process::ExitCode;

use tsurf_core::{naming, read_tsurf_file};

fn main() -> ExitCode {
    let args: Vec<String> = env::args().collect();

    if args.len() < 2 {
        eprintln!("Usage: {} <tsurf-file>", args[0]);
        return ExitCode::FAILURE;
    }

    let path = &args[1];
    println!("Loading TSurf file: {}", path);

    let surfaces = match read_tsurf_file(path) {
        Ok(surfaces) => surfaces,
        Err(err) => {
            eprintln!("Failed to read TSurf: {}", err);
            return ExitCode::FAILURE;
        }
    };

    println!("Found {} surfaces", surfaces.len());
    for (position, surface) in surfaces.iter().enumerate() {
        let index = surface.vertex_index();
        let kept = surface
            .faces
            .iter()
            .filter(|face| index.remap_face(face).is_some())
            .count();

        println!(
            "{:>4}  {:<32} {:>8} vertices {:>8} faces ({} resolvable)",
            position + 1,
            naming::base_name(surface, position + 1),
            surface.vertex_count(),
            surface.face_count(),
            kept
        );
    }

    ExitCode::SUCCESS
}
